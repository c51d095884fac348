use stickynote_core::{
    KeyValueStorage, MemoryStorage, NoteCollection, NoteRecord, NoteStore, StorageError,
    StoreError,
};

const KEY: &str = "sticky-notes";

fn record(x: &str, y: &str, color: &str, content: &str) -> NoteRecord {
    let mut note = NoteRecord::new(x, y, "200px", "200px", color);
    note.content = content.to_string();
    note
}

#[test]
fn empty_storage_loads_empty_collection() {
    let store = NoteStore::open(MemoryStorage::new(), KEY);
    assert_eq!(store.key(), KEY);
    assert!(store.notes().is_empty());
    assert!(store.try_load().unwrap().is_empty());
}

#[test]
fn save_then_load_roundtrips_field_for_field() {
    let mut store = NoteStore::open(MemoryStorage::new(), KEY);
    store.append(record("50px", "60px", "#ff7eb9", "<b>hello</b>"));
    store.append(record("0px", "-4.5px", "#7afcff", ""));
    let mut wide = record("10px", "10px", "#feff9c", "line<br>two \"quoted\"");
    wide.width = "320px".to_string();
    store.append(wide);
    store.save().unwrap();

    let before = store.notes().to_records();
    let reopened = NoteStore::open(store.into_storage(), KEY);
    assert_eq!(reopened.notes().to_records(), before);
}

#[test]
fn save_is_idempotent() {
    let mut store = NoteStore::open(MemoryStorage::new(), KEY);
    store.append(record("1px", "2px", "#ff7eb9", "x"));
    store.save().unwrap();
    let first = store.storage().get(KEY).unwrap();
    store.save().unwrap();
    assert_eq!(store.storage().get(KEY).unwrap(), first);
}

#[test]
fn corrupt_payload_falls_back_to_empty_but_try_load_reports_it() {
    let storage = MemoryStorage::new();
    storage.insert_raw(KEY, "[{\"x\": ");
    let store = NoteStore::open(storage, KEY);

    assert!(store.notes().is_empty());
    assert!(matches!(store.try_load(), Err(StoreError::Corrupt(_))));
}

#[test]
fn legacy_numeric_coordinates_are_loaded_as_px() {
    let storage = MemoryStorage::new();
    storage.insert_raw(
        KEY,
        r##"[{"x":50,"y":60,"height":"200px","width":"200px","color":"#feff9c","content":""}]"##,
    );
    let store = NoteStore::open(storage, KEY);
    let records = store.notes().to_records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].x, "50px");
    assert_eq!(records[0].y, "60px");
}

#[test]
fn write_failure_is_returned_and_memory_state_is_kept() {
    let mut store = NoteStore::open(MemoryStorage::with_quota(16), KEY);
    let id = store.append(record("1px", "2px", "#ff7eb9", "too big to fit"));

    let err = store.save().unwrap_err();
    assert!(matches!(
        err,
        StoreError::Storage(StorageError::QuotaExceeded { .. })
    ));
    assert!(store.get(id).is_some());
    assert_eq!(store.storage().get(KEY).unwrap(), None);
}

#[test]
fn collection_from_records_keeps_order() {
    let collection = NoteCollection::from_records(vec![
        record("1px", "1px", "#ff7eb9", "a"),
        record("2px", "2px", "#7afcff", "b"),
    ]);
    let contents: Vec<String> = collection
        .to_records()
        .into_iter()
        .map(|note| note.content)
        .collect();
    assert_eq!(contents, vec!["a", "b"]);
}
