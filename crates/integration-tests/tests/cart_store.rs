//! Integration tests for the cart store.
//!
//! Drives the store through its public API with in-memory storage and checks
//! the items, totals, notifications and written snapshots.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use duka_core::ProductId;
use duka_integration_tests::{ids, product};
use duka_storefront::cart::persist::decode;
use duka_storefront::cart::{CART_STORAGE_KEY, CartEvent, CartStore, MemoryStorage};
use proptest::prelude::*;
use rust_decimal::Decimal;

fn empty_cart() -> (CartStore<MemoryStorage>, MemoryStorage) {
    let storage = MemoryStorage::new();
    (CartStore::open(storage.clone()), storage)
}

#[test]
fn test_add_twice_then_increase() {
    let (mut cart, _) = empty_cart();
    let p1 = product("p1", 100);

    assert_eq!(
        cart.add_item(&p1),
        CartEvent::ItemAdded {
            id: ProductId::new("p1")
        }
    );
    cart.add_item(&p1);
    cart.increase_quantity(&p1.id);

    assert_eq!(cart.items().len(), 1);
    assert_eq!(cart.items()[0].quantity, 3);
    assert_eq!(cart.total_quantity(), 3);
    assert_eq!(cart.total_price(), Decimal::from(300));
}

#[test]
fn test_remove_keeps_other_lines_in_order() {
    let (mut cart, _) = empty_cart();
    cart.add_item(&product("p1", 100));
    cart.add_item(&product("p2", 250));
    cart.add_item(&product("p3", 50));

    let event = cart.remove_item(&ProductId::new("p1"));

    assert_eq!(event.message(), Some("Product removed from cart"));
    assert_eq!(ids(&cart), vec!["p2", "p3"]);
}

#[test]
fn test_decrease_at_one_removes_line() {
    let (mut cart, _) = empty_cart();
    let p1 = product("p1", 100);
    cart.add_item(&p1);
    cart.add_item(&product("p2", 100));
    let before = cart.total_quantity();

    let event = cart.decrease_quantity(&p1.id);

    assert_eq!(event, CartEvent::ItemRemoved { id: p1.id.clone() });
    assert_eq!(cart.total_quantity(), before - 1);
    assert!(cart.get(&p1.id).is_none());
}

#[test]
fn test_unknown_ids_leave_cart_unchanged() {
    let (mut cart, _) = empty_cart();
    cart.add_item(&product("p1", 100));
    let missing = ProductId::new("nope");

    assert_eq!(cart.decrease_quantity(&missing), CartEvent::Unchanged);
    assert_eq!(cart.increase_quantity(&missing), CartEvent::Unchanged);
    assert_eq!(cart.total_quantity(), 1);
    assert_eq!(cart.remove_item(&missing), CartEvent::ItemRemoved { id: missing.clone() });
    assert_eq!(cart.total_quantity(), 1);
    assert_eq!(CartEvent::Unchanged.message(), None);
}

#[test]
fn test_remove_all() {
    let (mut cart, storage) = empty_cart();
    cart.add_item(&product("p1", 100));
    cart.add_item(&product("p2", 100));

    assert_eq!(cart.remove_all(), CartEvent::Cleared);
    assert!(cart.items().is_empty());
    assert_eq!(cart.total_quantity(), 0);

    let saved = decode(&storage.get(CART_STORAGE_KEY).unwrap()).unwrap();
    assert!(saved.items.is_empty());
}

#[test]
fn test_every_mutation_writes_snapshot() {
    let (mut cart, storage) = empty_cart();
    let p1 = product("p1", 100);

    cart.add_item(&p1);
    assert_eq!(decode(&storage.get(CART_STORAGE_KEY).unwrap()).unwrap().items[0].quantity, 1);

    cart.increase_quantity(&p1.id);
    assert_eq!(decode(&storage.get(CART_STORAGE_KEY).unwrap()).unwrap().items[0].quantity, 2);

    cart.decrease_quantity(&p1.id);
    assert_eq!(decode(&storage.get(CART_STORAGE_KEY).unwrap()).unwrap().items[0].quantity, 1);
}

#[test]
fn test_write_failures_keep_in_memory_state() {
    let (mut cart, storage) = empty_cart();
    cart.add_item(&product("p1", 100));
    storage.set_fail_writes(true);

    cart.add_item(&product("p2", 100));

    assert_eq!(ids(&cart), vec!["p1", "p2"]);
    let saved = decode(&storage.get(CART_STORAGE_KEY).unwrap()).unwrap();
    assert_eq!(saved.items.len(), 1);
}

#[test]
fn test_checkout_lines_match_items() {
    let (mut cart, _) = empty_cart();
    let p1 = product("p1", 100);
    cart.add_item(&p1);
    cart.add_item(&p1);
    cart.add_item(&product("p2", 100));

    let lines = cart.checkout_lines();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].id, p1.id);
    assert_eq!(lines[0].quantity, 2);
}

#[derive(Debug, Clone)]
enum Op {
    Add(u8),
    Remove(u8),
    Increase(u8),
    Decrease(u8),
}

fn op() -> impl Strategy<Value = Op> {
    let id = 0u8..4;
    prop_oneof![
        id.clone().prop_map(Op::Add),
        id.clone().prop_map(Op::Remove),
        id.clone().prop_map(Op::Increase),
        id.prop_map(Op::Decrease),
    ]
}

proptest! {
    #[test]
    fn test_reopened_cart_matches_after_any_sequence(ops in prop::collection::vec(op(), 0..40)) {
        let (mut cart, storage) = empty_cart();

        for op in ops {
            match op {
                Op::Add(n) => { cart.add_item(&product(&format!("p{n}"), i64::from(n) + 1)); }
                Op::Remove(n) => { cart.remove_item(&ProductId::new(format!("p{n}"))); }
                Op::Increase(n) => { cart.increase_quantity(&ProductId::new(format!("p{n}"))); }
                Op::Decrease(n) => { cart.decrease_quantity(&ProductId::new(format!("p{n}"))); }
            }
        }

        let reopened = CartStore::open(storage);
        prop_assert_eq!(reopened.items(), cart.items());
        prop_assert_eq!(reopened.total_quantity(), cart.total_quantity());
        prop_assert!(reopened.items().iter().all(|item| item.quantity >= 1));
    }
}
