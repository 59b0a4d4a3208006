//! leakbridge-api: raw HTTP layer for the leak sensor cloud API.
//!
//! Two small clients -- [`AuthClient`] for the OAuth2 refresh-token
//! exchange and [`DeviceClient`] for the location/device inventory.
//! Neither holds token state; callers pass the access token in and
//! `leakbridge-core` owns the refresh lifecycle.

pub mod auth;
pub mod devices;
pub mod error;
pub mod models;
pub mod transport;

pub use auth::{AuthClient, TokenResponse};
pub use devices::DeviceClient;
pub use error::Error;
pub use models::{DeviceRecord, Location, SensorReadings};
pub use transport::TransportConfig;
