//! Catalog browsing commands.

use duka_core::CategoryId;
use duka_storefront::api::types::ProductQuery;
use duka_storefront::error::Result;
use duka_storefront::state::AppState;

use super::money;

/// List products, optionally filtered.
///
/// # Errors
///
/// Returns an error if the API is not configured or the request fails.
pub async fn products(state: &AppState, category: Option<String>, featured: bool) -> Result<()> {
    let query = ProductQuery {
        category_id: category.map(CategoryId::new),
        is_featured: featured.then_some(true),
    };
    let products = state.catalog()?.products(&query).await?;
    let currency = state.config().currency;

    let visible: Vec<_> = products.iter().filter(|p| !p.is_archived).collect();
    if visible.is_empty() {
        println!("No products found");
        return Ok(());
    }

    for product in visible {
        let category = product
            .category
            .as_ref()
            .map_or("", |c| c.name.as_str());
        println!(
            "{:<12} {:<32} {:>14}  {}{}",
            product.id.as_str(),
            product.name,
            money(product.price, currency),
            category,
            if product.is_featured { "  *" } else { "" },
        );
    }
    Ok(())
}

/// List categories.
///
/// # Errors
///
/// Returns an error if the API is not configured or the request fails.
pub async fn categories(state: &AppState) -> Result<()> {
    let categories = state.catalog()?.categories().await?;

    if categories.is_empty() {
        println!("No categories found");
        return Ok(());
    }

    for category in &categories {
        let label = category.billboard.as_ref().map_or("", |b| b.label.as_str());
        println!("{:<12} {:<24} {}", category.id.as_str(), category.name, label);
    }
    Ok(())
}
