// ── Accessory domain types ──

mod accessory;
mod state;

pub use accessory::{accessory_uuid, AccessoryRecord, ServiceSet};
pub use state::{ChargingState, SensorState, FRESHNESS_WINDOW_SECS, LOW_BATTERY_THRESHOLD};
