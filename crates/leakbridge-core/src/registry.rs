// ── Accessory registry ──
//
// Single-writer map of device ID -> accessory record. Mutated only by
// the reconciliation engine from within one pass; at most one record
// per device ID at any time.

use std::collections::HashMap;

use crate::model::AccessoryRecord;

/// In-memory registry of exposed accessories, keyed by device ID.
#[derive(Debug, Default)]
pub struct AccessoryRegistry {
    records: HashMap<String, AccessoryRecord>,
}

impl AccessoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, device_id: &str) -> Option<&AccessoryRecord> {
        self.records.get(device_id)
    }

    pub fn get_mut(&mut self, device_id: &str) -> Option<&mut AccessoryRecord> {
        self.records.get_mut(device_id)
    }

    /// Insert a record under its device ID. Returns the previous record
    /// if one existed (which a correct reconcile pass never does).
    pub fn insert(&mut self, record: AccessoryRecord) -> Option<AccessoryRecord> {
        self.records.insert(record.device_id().to_owned(), record)
    }

    pub fn remove(&mut self, device_id: &str) -> Option<AccessoryRecord> {
        self.records.remove(device_id)
    }

    pub fn contains(&self, device_id: &str) -> bool {
        self.records.contains_key(device_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Device IDs currently registered.
    pub fn device_ids(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    /// Owned copy of every record, for host persistence and tests.
    pub fn snapshot(&self) -> Vec<AccessoryRecord> {
        self.records.values().cloned().collect()
    }

    /// Seed the registry from host-cached records at startup, before
    /// the first reconcile pass. Later passes recognize the cached
    /// device IDs and update in place instead of re-registering.
    pub fn restore(&mut self, records: Vec<AccessoryRecord>) {
        for record in records {
            self.records.insert(record.device_id().to_owned(), record);
        }
    }
}
