//! Note store and its serialized format.
//!
//! # Responsibility
//! - Load the collection from storage, falling back to empty.
//! - Save the whole collection after each mutation that must survive reload.
//! - Hand out session-scoped `NoteId`s to records entering the collection.
//!
//! # Invariants
//! - The stored value is a JSON array of records, with no ids and no
//!   version field.
//! - Records failing to decode or validate are skipped on load.
//! - `save` is idempotent for an unchanged collection.

use crate::model::note::{NoteId, NoteRecord};
use crate::storage::{KeyValueStorage, StorageError};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level failure while loading or saving notes.
#[derive(Debug)]
pub enum StoreError {
    Storage(StorageError),
    /// Collection could not be serialized.
    Encode(serde_json::Error),
    /// Stored value is not a JSON array.
    Corrupt(serde_json::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode notes: {err}"),
            Self::Corrupt(err) => write!(f, "stored notes are corrupt: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Encode(err) | Self::Corrupt(err) => Some(err),
        }
    }
}

impl From<StorageError> for StoreError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// One record together with the id its visual element refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteEntry {
    pub id: NoteId,
    pub record: NoteRecord,
}

/// Ordered notes, insertion order = creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteCollection {
    entries: Vec<NoteEntry>,
}

impl NoteCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a collection assigning fresh ids in iteration order.
    pub fn from_records(records: impl IntoIterator<Item = NoteRecord>) -> Self {
        let mut collection = Self::new();
        for record in records {
            collection.push(record);
        }
        collection
    }

    /// Appends a record and returns its new id.
    pub fn push(&mut self, record: NoteRecord) -> NoteId {
        let id = Uuid::new_v4();
        self.entries.push(NoteEntry { id, record });
        id
    }

    pub fn get(&self, id: NoteId) -> Option<&NoteRecord> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| &entry.record)
    }

    pub fn get_mut(&mut self, id: NoteId) -> Option<&mut NoteRecord> {
        self.entries
            .iter_mut()
            .find(|entry| entry.id == id)
            .map(|entry| &mut entry.record)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NoteEntry> {
        self.entries.iter()
    }

    pub fn ids(&self) -> Vec<NoteId> {
        self.entries.iter().map(|entry| entry.id).collect()
    }

    /// Records in order, without ids.
    pub fn to_records(&self) -> Vec<NoteRecord> {
        self.entries
            .iter()
            .map(|entry| entry.record.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Serializes records in collection order.
pub fn encode_notes(collection: &NoteCollection) -> Result<String, serde_json::Error> {
    let records: Vec<&NoteRecord> = collection.iter().map(|entry| &entry.record).collect();
    serde_json::to_string(&records)
}

/// Decodes a stored array, skipping (and logging) unusable elements.
///
/// Returns `Err` only when the payload is not a JSON array at all.
pub fn decode_notes(raw: &str) -> Result<NoteCollection, serde_json::Error> {
    let values: Vec<serde_json::Value> = serde_json::from_str(raw)?;
    let mut collection = NoteCollection::new();

    for (index, value) in values.into_iter().enumerate() {
        let record = match serde_json::from_value::<NoteRecord>(value) {
            Ok(record) => record,
            Err(err) => {
                warn!(
                    "event=note_decode module=store status=skipped index={index} error_code=malformed_record error={err}"
                );
                continue;
            }
        };
        if let Err(err) = record.validate() {
            warn!(
                "event=note_decode module=store status=skipped index={index} error_code=invalid_record error={err}"
            );
            continue;
        }
        collection.push(record);
    }

    Ok(collection)
}

/// Owns the note collection and keeps one storage entry consistent with it.
pub struct NoteStore<S: KeyValueStorage> {
    storage: S,
    key: String,
    notes: NoteCollection,
}

impl<S: KeyValueStorage> NoteStore<S> {
    /// Creates a store and loads any previously saved notes under `key`.
    pub fn open(storage: S, key: impl Into<String>) -> Self {
        let mut store = Self {
            storage,
            key: key.into(),
            notes: NoteCollection::new(),
        };
        store.notes = store.load();
        store
    }

    /// Reads the stored collection, treating any failure as "no notes".
    pub fn load(&self) -> NoteCollection {
        match self.try_load() {
            Ok(notes) => notes,
            Err(err) => {
                warn!(
                    "event=notes_load module=store status=fallback key={} error={}",
                    self.key, err
                );
                NoteCollection::new()
            }
        }
    }

    /// Reads the stored collection, surfacing storage and format errors.
    ///
    /// An absent entry is not an error and yields an empty collection.
    pub fn try_load(&self) -> StoreResult<NoteCollection> {
        let Some(raw) = self.storage.get(&self.key)? else {
            info!(
                "event=notes_load module=store status=ok key={} count=0 source=absent",
                self.key
            );
            return Ok(NoteCollection::new());
        };

        let notes = decode_notes(&raw).map_err(StoreError::Corrupt)?;
        info!(
            "event=notes_load module=store status=ok key={} count={}",
            self.key,
            notes.len()
        );
        Ok(notes)
    }

    /// Serializes the full collection and overwrites the storage entry.
    pub fn save(&self) -> StoreResult<()> {
        let payload = encode_notes(&self.notes).map_err(StoreError::Encode)?;
        match self.storage.set(&self.key, &payload) {
            Ok(()) => {
                debug!(
                    "event=notes_save module=store status=ok key={} count={} bytes={}",
                    self.key,
                    self.notes.len(),
                    payload.len()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=notes_save module=store status=error key={} count={} error={}",
                    self.key,
                    self.notes.len(),
                    err
                );
                Err(err.into())
            }
        }
    }

    /// Appends a record without saving; callers persist afterwards.
    pub fn append(&mut self, record: NoteRecord) -> NoteId {
        self.notes.push(record)
    }

    pub fn notes(&self) -> &NoteCollection {
        &self.notes
    }

    pub fn get(&self, id: NoteId) -> Option<&NoteRecord> {
        self.notes.get(id)
    }

    pub fn get_mut(&mut self, id: NoteId) -> Option<&mut NoteRecord> {
        self.notes.get_mut(id)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }
}
