// ── Reconciliation engine ──
//
// Diffs a freshly fetched inventory against the accessory registry:
// create on first sighting, update in place on every later sighting,
// remove when a registered device vanishes upstream. One pass, one
// writer -- concurrent passes against the same registry could
// double-register or double-unregister, so the bridge serializes them.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use leakbridge_api::DeviceRecord;

use crate::host::AccessoryHost;
use crate::model::{AccessoryRecord, ServiceSet};
use crate::registry::AccessoryRegistry;

/// Outcome of one reconcile pass: device IDs per event kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileResult {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub removed: Vec<String>,
}

impl ReconcileResult {
    /// `true` when the pass changed registry membership.
    pub fn is_steady(&self) -> bool {
        self.created.is_empty() && self.removed.is_empty()
    }
}

/// Owns the registry and applies inventory diffs to it.
pub struct ReconciliationEngine {
    registry: AccessoryRegistry,
    host: Arc<dyn AccessoryHost>,
    services: ServiceSet,
}

impl ReconciliationEngine {
    pub fn new(host: Arc<dyn AccessoryHost>, services: ServiceSet) -> Self {
        Self {
            registry: AccessoryRegistry::new(),
            host,
            services,
        }
    }

    pub fn registry(&self) -> &AccessoryRegistry {
        &self.registry
    }

    /// Seed the registry from host-cached records before the first pass.
    pub fn restore(&mut self, records: Vec<AccessoryRecord>) {
        info!(count = records.len(), "restoring cached accessories");
        self.registry.restore(records);
    }

    /// Reconcile the latest inventory against the registry.
    pub fn reconcile(&mut self, inventory: Vec<DeviceRecord>) -> ReconcileResult {
        self.reconcile_at(inventory, Utc::now())
    }

    /// Reconcile with an explicit clock, for deterministic tests.
    pub fn reconcile_at(
        &mut self,
        inventory: Vec<DeviceRecord>,
        now: DateTime<Utc>,
    ) -> ReconcileResult {
        let mut result = ReconcileResult::default();
        let mut created = Vec::new();
        let mut updated = Vec::new();

        // Only live leak detectors are bridged; everything else is
        // invisible to the registry.
        let filtered: Vec<DeviceRecord> = inventory
            .into_iter()
            .filter(|d| d.is_leak_detector() && d.is_alive)
            .collect();

        let seen: HashSet<String> = filtered.iter().map(|d| d.device_id.clone()).collect();

        for device in filtered {
            if let Some(record) = self.registry.get_mut(&device.device_id) {
                debug!(device_id = %device.device_id, "updating accessory");
                result.updated.push(device.device_id.clone());
                record.apply_update(device, now);
                updated.push(record.clone());
            } else {
                info!(
                    device_id = %device.device_id,
                    name = %device.display_name(),
                    "adding new accessory"
                );
                let record = AccessoryRecord::new(device, self.services, now);
                result.created.push(record.device_id().to_owned());
                created.push(record.clone());
                self.registry.insert(record);
            }
        }

        // Churn detection: registered devices absent from the filtered
        // inventory were decommissioned or removed upstream.
        let gone: Vec<String> = self
            .registry
            .device_ids()
            .filter(|id| !seen.contains(*id))
            .map(str::to_owned)
            .collect();

        let mut removed = Vec::new();
        for device_id in gone {
            if let Some(record) = self.registry.remove(&device_id) {
                info!(device_id = %device_id, "removing vanished accessory");
                result.removed.push(device_id);
                removed.push(record);
            }
        }

        if !created.is_empty() {
            self.host.register_accessories(&created);
        }
        if !updated.is_empty() {
            self.host.update_accessories(&updated);
        }
        if !removed.is_empty() {
            self.host.unregister_accessories(&removed);
        }

        debug!(
            created = result.created.len(),
            updated = result.updated.len(),
            removed = result.removed.len(),
            registered = self.registry.len(),
            "reconcile pass complete"
        );

        result
    }
}
