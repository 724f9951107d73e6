//! Integration tests for flush, whole-store save and rehydration.

mod support;

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use record_keeper::{
    fields, Codec, Fields, FileStore, InMemoryStore, RecordError, RecordManager, RecordStore, Result,
    Value,
};
use support::product::{product, supplier, Product, PRODUCT, SUPPLIER};

fn open(path: &Path) -> RecordManager {
    RecordManager::open(path, &[&PRODUCT, &SUPPLIER]).unwrap()
}

fn triples(manager: &RecordManager) -> BTreeSet<(String, String, String)> {
    let mut triples = BTreeSet::new();
    for entity_type in ["product", "supplier"] {
        for record in manager.records(entity_type).unwrap() {
            let snapshot = serde_json::to_string(&record.snapshot().unwrap()).unwrap();
            triples.insert((
                entity_type.to_string(),
                record.primary_key().unwrap(),
                snapshot,
            ));
        }
    }
    triples
}

#[test]
fn reopen_reconstructs_live_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("inventory.json");

    let expected = {
        let manager = open(&path);
        let products = manager.entities::<Product>();
        let widget = products.create(product("A-1", "Widget", 0)).unwrap();
        let gizmo = products.create(product("A-2", "Gizmo", 9)).unwrap();
        products.create(product("A-3", "Doohickey", 1)).unwrap();
        manager.create("supplier", supplier("S-1", "Acme")).unwrap();

        widget.increase(20).unwrap();
        widget.decrease(16).unwrap();
        gizmo.rename_sku("A-9").unwrap();
        let doomed = products.find("A-3").unwrap().unwrap();
        products.delete(doomed).unwrap();

        assert_eq!(manager.flush().unwrap(), 3);
        triples(&manager)
    };

    let reopened = open(&path);
    assert_eq!(triples(&reopened), expected);
    assert_eq!(reopened.len(), 3);
    assert_eq!(reopened.pending_len(), 0);
    assert!(reopened.find_by_primary_key("product", "A-2").unwrap().is_none());
    assert!(reopened.find_by_primary_key("product", "A-3").unwrap().is_none());

    let widget = reopened
        .entities::<Product>()
        .find("A-1")
        .unwrap()
        .unwrap();
    assert_eq!(widget.quantity().unwrap(), 4);
}

#[test]
fn bitcode_store_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("inventory.bin");
    let open = || {
        RecordManager::builder()
            .path(&path)
            .codec(Codec::Bitcode)
            .schema(&PRODUCT)
            .open()
            .unwrap()
    };

    {
        let manager = open();
        manager.create("product", product("A-1", "Widget", 7)).unwrap();
        manager.flush().unwrap();
    }

    let manager = open();
    let widget = manager.find_by_primary_key("product", "A-1").unwrap().unwrap();
    assert_eq!(widget.get("quantity").unwrap(), Value::Int(7));
}

#[test]
fn unflushed_changes_are_not_durable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("inventory.json");

    {
        let manager = open(&path);
        let widget = manager.create("product", product("A-1", "Widget", 1)).unwrap();
        manager.flush().unwrap();
        widget.set("quantity", 50).unwrap();
        manager.create("product", product("A-2", "Gizmo", 2)).unwrap();
        assert_eq!(manager.pending_len(), 2);
    }

    let manager = open(&path);
    assert_eq!(manager.len(), 1);
    let widget = manager.find_by_primary_key("product", "A-1").unwrap().unwrap();
    assert_eq!(widget.get("quantity").unwrap(), Value::Int(1));
}

#[test]
fn rekeyed_records_leave_no_stale_entry() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("inventory.json");

    {
        let manager = open(&path);
        let widget = manager.create("product", product("A-1", "Widget", 1)).unwrap();
        manager.flush().unwrap();
        widget.set("sku", "B-1").unwrap();
        manager.flush().unwrap();
    }

    let store = FileStore::open(&path, Codec::Json).unwrap();
    assert_eq!(store.list_keys("product"), vec!["B-1"]);
}

#[test]
fn empty_backing_file_opens_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("inventory.json");
    File::create(&path).unwrap();

    let manager = open(&path);
    assert!(manager.is_empty());
    assert_eq!(manager.flush().unwrap(), 0);
    assert!(fs::metadata(&path).unwrap().len() > 0);
}

#[test]
fn uncreatable_store_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    File::create(&blocker).unwrap();

    let err = RecordManager::open(blocker.join("inventory.json"), &[&PRODUCT])
        .err()
        .unwrap();
    assert!(matches!(err, RecordError::StoreUnavailable { .. }));
}

#[test]
fn existing_resource_without_read_write_access_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();

    let err = RecordManager::open(dir.path(), &[&PRODUCT]).err().unwrap();
    assert!(matches!(err, RecordError::StoreUnavailable { .. }));
}

#[test]
fn float_members_round_trip_through_both_codecs() {
    for codec in [Codec::Json, Codec::Bitcode] {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventory.db");
        let open = || {
            RecordManager::builder()
                .path(path.clone())
                .codec(codec)
                .schema(&PRODUCT)
                .open()
                .unwrap()
        };

        {
            let manager = open();
            manager
                .create("product", fields! { "sku" => "A-1", "name" => "Widget", "quantity" => 2.5 })
                .unwrap();
            let err = manager
                .create("product", fields! { "sku" => "A-2", "name" => f64::INFINITY, "quantity" => 1 })
                .unwrap_err();
            assert!(matches!(err, RecordError::NonFiniteValue { .. }));
            assert_eq!(manager.flush().unwrap(), 1);
        }

        let manager = open();
        let widget = manager.find_by_primary_key("product", "A-1").unwrap().unwrap();
        assert_eq!(widget.get("quantity").unwrap(), Value::Float(2.5));
        assert!(manager.find_by_primary_key("product", "A-2").unwrap().is_none());
    }
}

#[test]
fn entries_filed_under_a_stale_key_are_rekeyed() {
    let mut durable = InMemoryStore::new();
    durable.put("product", "X", product("Y", "Widget", 6));

    let manager = RecordManager::builder()
        .schema(&PRODUCT)
        .store(durable.clone())
        .open()
        .unwrap();
    assert!(manager.find_by_primary_key("product", "X").unwrap().is_none());
    let widget = manager.find_by_primary_key("product", "Y").unwrap().unwrap();
    assert!(manager.is_pending(&widget));

    widget.set("quantity", 2).unwrap();
    assert_eq!(manager.flush().unwrap(), 1);
    assert_eq!(durable.saved().unwrap().keys("product"), vec!["Y".to_string()]);

    let reopened = RecordManager::builder()
        .schema(&PRODUCT)
        .store(durable.reopen().unwrap())
        .open()
        .unwrap();
    let widget = reopened.find_by_primary_key("product", "Y").unwrap().unwrap();
    assert_eq!(widget.get("quantity").unwrap(), Value::Int(2));
    assert_eq!(reopened.len(), 1);
}

#[test]
fn stored_snapshots_must_match_the_schema() {
    let mut store = InMemoryStore::new();
    let mut legacy = product("A-1", "Widget", 1);
    legacy.insert("colour".into(), Value::from("red"));
    store.put("product", "A-1", legacy);

    let err = RecordManager::builder()
        .schema(&PRODUCT)
        .store(store)
        .open()
        .err()
        .unwrap();
    assert!(matches!(err, RecordError::UnknownMember { .. }));
}

/// Store whose saves fail while the switch is on.
struct FlakyStore {
    inner: InMemoryStore,
    failing: Arc<AtomicBool>,
}

impl RecordStore for FlakyStore {
    fn get(&self, entity_type: &str, key: &str) -> Option<&Fields> {
        self.inner.get(entity_type, key)
    }

    fn put(&mut self, entity_type: &str, key: &str, snapshot: Fields) {
        self.inner.put(entity_type, key, snapshot);
    }

    fn remove(&mut self, entity_type: &str, key: &str) -> bool {
        self.inner.remove(entity_type, key)
    }

    fn list_entity_types(&self) -> Vec<String> {
        self.inner.list_entity_types()
    }

    fn list_keys(&self, entity_type: &str) -> Vec<String> {
        self.inner.list_keys(entity_type)
    }

    fn save(&mut self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RecordError::PersistFailed("disk unplugged".into()));
        }
        self.inner.save()
    }
}

#[test]
fn failed_flush_keeps_pending_and_can_be_retried() {
    let durable = InMemoryStore::new();
    let failing = Arc::new(AtomicBool::new(true));
    let manager = RecordManager::builder()
        .schema(&PRODUCT)
        .store(FlakyStore {
            inner: durable.clone(),
            failing: Arc::clone(&failing),
        })
        .open()
        .unwrap();

    let widget = manager.create("product", product("A-1", "Widget", 3)).unwrap();
    let err = manager.flush().unwrap_err();
    assert!(matches!(err, RecordError::PersistFailed(_)));
    assert_eq!(manager.pending_len(), 1);
    assert!(manager.is_pending(&widget));
    assert_eq!(widget.get("quantity").unwrap(), Value::Int(3));
    assert!(durable.saved().unwrap().is_empty());

    failing.store(false, Ordering::SeqCst);
    assert_eq!(manager.flush().unwrap(), 1);
    assert_eq!(manager.pending_len(), 0);
    assert_eq!(durable.saved().unwrap().len(), 1);
}

#[test]
fn deletes_reach_the_store_on_flush() {
    let durable = InMemoryStore::new();
    let manager = RecordManager::builder()
        .schema(&SUPPLIER)
        .store(durable.clone())
        .open()
        .unwrap();

    let acme = manager.create("supplier", supplier("S-1", "Acme")).unwrap();
    manager.flush().unwrap();
    assert_eq!(durable.saved().unwrap().len(), 1);

    manager.delete(acme).unwrap();
    manager.flush().unwrap();
    assert!(durable.saved().unwrap().is_empty());
}
