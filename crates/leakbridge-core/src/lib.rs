// leakbridge-core: domain layer between leakbridge-api and the host.
//
// Owns the token lifecycle, the accessory registry, and the
// reconciliation engine. All host interaction goes through the narrow
// collaborator traits in `host` and `persist` -- the core never touches
// the host framework or the config file directly.

pub mod bridge;
pub mod config;
pub mod engine;
pub mod error;
pub mod host;
pub mod model;
pub mod persist;
pub mod registry;
pub mod token;

// ── Primary re-exports ──────────────────────────────────────────────
pub use bridge::Bridge;
pub use config::BridgeConfig;
pub use engine::{ReconcileResult, ReconciliationEngine};
pub use error::CoreError;
pub use host::{AccessoryHost, NullHost};
pub use model::{accessory_uuid, AccessoryRecord, ChargingState, SensorState, ServiceSet};
pub use persist::{NullSink, RefreshTokenSink};
pub use registry::AccessoryRegistry;
pub use token::TokenStore;

// Re-export the wire models consumers need to construct test inventories.
pub use leakbridge_api::{DeviceRecord, Location, SensorReadings};
