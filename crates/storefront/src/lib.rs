//! Duka storefront library.
//!
//! The client side of a small online store: a persistent shopping cart plus
//! clients for the storefront API's catalog, checkout and order endpoints.
//! The `duka` binary is a thin command layer over this crate.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod config;
pub mod error;
pub mod state;
