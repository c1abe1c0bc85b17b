//! Integration tests for file-backed cart persistence.
//!
//! Each test gets its own temporary data directory.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::fs;

use duka_core::ProductId;
use duka_integration_tests::{ids, product};
use duka_storefront::cart::{CART_STORAGE_KEY, CartStorage, CartStore, FileStorage};
use serde_json::Value;

fn slot_path(dir: &tempfile::TempDir) -> std::path::PathBuf {
    dir.path().join(format!("{CART_STORAGE_KEY}.json"))
}

#[test]
fn test_cart_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();

    {
        let mut cart = CartStore::open(FileStorage::new(dir.path()));
        cart.add_item(&product("p1", 100));
        cart.add_item(&product("p1", 100));
        cart.add_item(&product("p2", 40));
    }

    let cart = CartStore::open(FileStorage::new(dir.path()));
    assert_eq!(ids(&cart), vec!["p1", "p2"]);
    assert_eq!(cart.items()[0].quantity, 2);
    assert_eq!(cart.items()[1].images[0].url, "https://cdn.example.com/p2.png");
}

#[test]
fn test_slot_uses_versioned_envelope() {
    let dir = tempfile::tempdir().unwrap();
    let mut cart = CartStore::open(FileStorage::new(dir.path()));
    cart.add_item(&product("p1", 1500));

    let raw = fs::read_to_string(slot_path(&dir)).unwrap();
    let value: Value = serde_json::from_str(&raw).unwrap();

    assert_eq!(value["version"], 0);
    let item = &value["state"]["items"][0];
    assert_eq!(item["id"], "p1");
    assert_eq!(item["name"], "Product p1");
    assert_eq!(item["quantity"], 1);
    assert_eq!(item["images"][0]["url"], "https://cdn.example.com/p1.png");
}

#[test]
fn test_missing_data_dir_is_created_on_first_write() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("a").join("b");

    let mut cart = CartStore::open(FileStorage::new(&nested));
    assert!(cart.is_empty());
    cart.add_item(&product("p1", 100));

    assert!(nested.join(format!("{CART_STORAGE_KEY}.json")).exists());
}

#[test]
fn test_corrupt_slot_loads_empty_and_is_replaced() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(slot_path(&dir), "{\"state\": {\"items\": [").unwrap();

    let mut cart = CartStore::open(FileStorage::new(dir.path()));
    assert!(cart.is_empty());

    cart.add_item(&product("p9", 10));
    let reopened = CartStore::open(FileStorage::new(dir.path()));
    assert_eq!(ids(&reopened), vec!["p9"]);
}

#[test]
fn test_non_utf8_slot_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(slot_path(&dir), [0xff, 0xfe, 0x00, 0x7b]).unwrap();

    let cart = CartStore::open(FileStorage::new(dir.path()));
    assert!(cart.is_empty());
}

#[test]
fn test_unreadable_slot_loads_empty_and_keeps_working_in_memory() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(slot_path(&dir)).unwrap();
    let storage = FileStorage::new(dir.path());
    assert!(storage.read(CART_STORAGE_KEY).is_err());

    let mut cart = CartStore::open(storage);
    assert!(cart.is_empty());

    cart.add_item(&product("p1", 100));
    cart.add_item(&product("p1", 100));

    assert_eq!(cart.total_quantity(), 2);
    assert!(slot_path(&dir).is_dir());
}

#[test]
fn test_unknown_version_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        slot_path(&dir),
        r#"{"state":{"items":[{"id":"p1","name":"X","price":"1","images":[],"quantity":1}]},"version":7}"#,
    )
    .unwrap();

    let cart = CartStore::open(FileStorage::new(dir.path()));
    assert!(cart.is_empty());
}

#[test]
fn test_rehydration_normalizes_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        slot_path(&dir),
        r#"{"state":{"items":[
            {"id":"p1","name":"A","price":"10","images":[],"quantity":2},
            {"id":"p2","name":"B","price":"5","images":[],"quantity":0},
            {"id":"p1","name":"A","price":"10","images":[],"quantity":1}
        ]},"version":0}"#,
    )
    .unwrap();

    let cart = CartStore::open(FileStorage::new(dir.path()));
    assert_eq!(ids(&cart), vec!["p1"]);
    assert_eq!(cart.total_quantity(), 3);
}

#[test]
fn test_two_stores_on_one_slot_last_writer_wins() {
    let dir = tempfile::tempdir().unwrap();
    let mut first = CartStore::open(FileStorage::new(dir.path()));
    let mut second = CartStore::open(FileStorage::new(dir.path()));

    first.add_item(&product("p1", 100));
    second.add_item(&product("p2", 100));

    // The second store never saw p1, so its write drops it.
    let reopened = CartStore::open(FileStorage::new(dir.path()));
    assert_eq!(ids(&reopened), vec!["p2"]);
    assert!(reopened.get(&ProductId::new("p1")).is_none());
}

#[test]
fn test_no_temp_files_left_behind() {
    let dir = tempfile::tempdir().unwrap();
    let mut cart = CartStore::open(FileStorage::new(dir.path()));
    cart.add_item(&product("p1", 100));
    cart.remove_all();

    let names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec![format!("{CART_STORAGE_KEY}.json")]);
}

#[test]
fn test_storage_rejects_path_like_keys() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(dir.path());

    assert!(storage.write("../escape", "{}").is_err());
    assert!(storage.read("a/b").is_err());
    assert!(storage.read("missing").unwrap().is_none());
}
