// ── Accessory cache host ──
//
// File-backed stand-in for the host framework's accessory
// persistence: every registry mutation is mirrored into a JSON cache
// file, and the cache is restored into the bridge before the first
// poll so known devices update in place instead of re-registering.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::{info, warn};

use leakbridge_core::{AccessoryHost, AccessoryRecord};

/// JSON-file accessory cache implementing the host contract.
pub struct JsonCacheHost {
    path: PathBuf,
    records: Mutex<HashMap<String, AccessoryRecord>>,
}

impl JsonCacheHost {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            records: Mutex::new(HashMap::new()),
        }
    }

    /// Restore cached accessories from disk. Missing or unreadable
    /// cache means a cold start, not an error.
    pub fn load(&self) -> Vec<AccessoryRecord> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return Vec::new(),
        };

        match serde_json::from_str::<Vec<AccessoryRecord>>(&raw) {
            Ok(cached) => {
                info!(count = cached.len(), "loaded accessory cache");
                let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
                for record in &cached {
                    records.insert(record.device_id().to_owned(), record.clone());
                }
                cached
            }
            Err(e) => {
                warn!(error = %e, "accessory cache unreadable; starting cold");
                Vec::new()
            }
        }
    }

    /// Write the current record set to disk. Best-effort.
    fn save(&self, records: &HashMap<String, AccessoryRecord>) {
        let snapshot: Vec<&AccessoryRecord> = records.values().collect();
        match serde_json::to_string_pretty(&snapshot) {
            Ok(rendered) => {
                if let Err(e) = std::fs::write(&self.path, rendered) {
                    warn!(error = %e, "failed to write accessory cache");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize accessory cache"),
        }
    }

    fn apply(&self, accessories: &[AccessoryRecord], remove: bool) {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        for record in accessories {
            if remove {
                records.remove(record.device_id());
            } else {
                records.insert(record.device_id().to_owned(), record.clone());
            }
        }
        self.save(&records);
    }
}

impl AccessoryHost for JsonCacheHost {
    fn register_accessories(&self, accessories: &[AccessoryRecord]) {
        self.apply(accessories, false);
    }

    fn update_accessories(&self, accessories: &[AccessoryRecord]) {
        self.apply(accessories, false);
    }

    fn unregister_accessories(&self, accessories: &[AccessoryRecord]) {
        self.apply(accessories, true);
    }
}
