// ── Accessory record ──
//
// Plain data owned exclusively by the registry. The host framework's
// mutable, identity-bearing accessory objects are reduced to this
// record; all host interaction goes through the AccessoryHost trait.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use leakbridge_api::DeviceRecord;

use super::state::SensorState;

/// Namespace for deterministic accessory UUIDs. Never change this:
/// previously registered accessories are matched by UUID across
/// restarts.
const ACCESSORY_NAMESPACE: Uuid = Uuid::from_u128(0x6c65_616b_6272_6964_6765_2d61_6363_7379);

/// Derive the stable accessory UUID for a device.
///
/// v5 (namespaced SHA-1) over the device ID alone. The user-defined
/// name is deliberately excluded: renaming a sensor upstream must not
/// produce a duplicate accessory.
pub fn accessory_uuid(device_id: &str) -> Uuid {
    Uuid::new_v5(&ACCESSORY_NAMESPACE, device_id.as_bytes())
}

/// Which services an accessory exposes. Leak and battery are always
/// present; temperature and humidity follow the hide flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSet {
    pub leak: bool,
    pub temperature: bool,
    pub humidity: bool,
    pub battery: bool,
}

impl ServiceSet {
    pub fn from_flags(hide_temperature: bool, hide_humidity: bool) -> Self {
        Self {
            leak: true,
            temperature: !hide_temperature,
            humidity: !hide_humidity,
            battery: true,
        }
    }
}

/// One registered accessory: stable identity, the last-known device
/// snapshot, and the characteristics derived from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessoryRecord {
    pub uuid: Uuid,
    pub display_name: String,
    /// Last-known device snapshot ("context" in host terms).
    pub device: DeviceRecord,
    pub services: ServiceSet,
    pub state: SensorState,
}

impl AccessoryRecord {
    /// Build a record for a newly sighted device.
    pub fn new(device: DeviceRecord, services: ServiceSet, now: DateTime<Utc>) -> Self {
        Self {
            uuid: accessory_uuid(&device.device_id),
            display_name: device.display_name().to_owned(),
            state: SensorState::derive(&device, now),
            services,
            device,
        }
    }

    /// The registry key.
    pub fn device_id(&self) -> &str {
        &self.device.device_id
    }

    /// Overwrite the device snapshot and recompute derived state.
    pub fn apply_update(&mut self, device: DeviceRecord, now: DateTime<Utc>) {
        self.display_name = device.display_name().to_owned();
        self.state = SensorState::derive(&device, now);
        self.device = device;
    }
}
