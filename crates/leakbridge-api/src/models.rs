// ── Wire models for the inventory API ──
//
// Field names mirror the upstream JSON (camelCase). Unknown fields are
// tolerated and dropped; optional fields default so a sparse payload
// from older firmware still deserializes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A location as returned by `GET /v2/locations`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(rename = "locationID")]
    pub location_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub devices: Vec<DeviceRecord>,
}

/// The latest sensor readings reported by a device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReadings {
    #[serde(default)]
    pub temperature: f64,
    #[serde(default)]
    pub humidity: f64,
}

/// A device as returned by the inventory endpoints.
///
/// Ephemeral: produced fresh on every poll cycle and retained only as
/// the last-known snapshot inside a matched accessory record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct DeviceRecord {
    #[serde(rename = "deviceID")]
    pub device_id: String,
    #[serde(default)]
    pub user_defined_device_name: String,
    #[serde(default)]
    pub device_type: String,
    /// Upstream vendor category. Only `"LeakDetector"` is bridged.
    #[serde(default)]
    pub device_class: String,
    #[serde(default)]
    pub is_alive: bool,
    #[serde(default)]
    pub water_present: bool,
    #[serde(default)]
    pub current_sensor_readings: SensorReadings,
    /// Percent remaining, 0-100. Non-rechargeable hardware.
    #[serde(default)]
    pub battery_remaining: i64,
    #[serde(default)]
    pub is_device_offline: bool,
    #[serde(default)]
    pub has_device_checked_in: bool,
    #[serde(default)]
    pub last_checkin: Option<DateTime<Utc>>,
    #[serde(default)]
    pub firmware_ver: Option<String>,
}

impl DeviceRecord {
    /// Whether this device belongs to the bridged device class.
    pub fn is_leak_detector(&self) -> bool {
        self.device_class == "LeakDetector"
    }

    /// Display name: the user-assigned name, falling back to the ID.
    pub fn display_name(&self) -> &str {
        if self.user_defined_device_name.is_empty() {
            &self.device_id
        } else {
            &self.user_defined_device_name
        }
    }
}
