// ── Derived sensor characteristics ──
//
// Pure derivation from a device snapshot. Recomputed on every create
// and update; never mutated outside a reconcile pass. Read accessors
// are synchronous -- all network I/O happens in the polling bridge.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use leakbridge_api::DeviceRecord;

/// Battery percentage below which the low-battery flag is raised.
pub const LOW_BATTERY_THRESHOLD: i64 = 30;

/// How old a reading may be before the freshness flag drops (seconds).
pub const FRESHNESS_WINDOW_SECS: i64 = 3600;

/// Battery charging state. Leak sensors run on non-rechargeable cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargingState {
    Charging,
    NotCharging,
    #[default]
    NotChargeable,
}

/// The characteristic values exposed for one accessory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorState {
    pub leak_detected: bool,
    pub status_active: bool,
    /// Percent, clamped to 0-100.
    pub battery_level: u8,
    pub status_low_battery: bool,
    pub charging_state: ChargingState,
    /// Celsius, rounded to the nearest 0.5 degree.
    pub current_temperature: f64,
    /// Relative humidity percent, as reported.
    pub current_relative_humidity: f64,
    /// Whether the reading is younger than [`FRESHNESS_WINDOW_SECS`].
    /// Devices without a check-in timestamp count as fresh.
    pub readings_fresh: bool,
}

impl SensorState {
    /// Derive the full characteristic set from a device snapshot.
    pub fn derive(device: &DeviceRecord, now: DateTime<Utc>) -> Self {
        let battery = device.battery_remaining.clamp(0, 100);

        Self {
            leak_detected: device.water_present,
            status_active: device.has_device_checked_in || !device.is_device_offline,
            battery_level: u8::try_from(battery).unwrap_or(0),
            status_low_battery: device.battery_remaining < LOW_BATTERY_THRESHOLD,
            charging_state: ChargingState::NotChargeable,
            current_temperature: to_celsius(device.current_sensor_readings.temperature),
            current_relative_humidity: device.current_sensor_readings.humidity,
            readings_fresh: is_fresh(device.last_checkin, now),
        }
    }
}

/// Convert a Fahrenheit reading to Celsius, rounded to the nearest
/// 0.5 degree. The vendor reports imperial units on the wire.
pub fn to_celsius(fahrenheit: f64) -> f64 {
    ((fahrenheit - 32.0) * 5.0 / 9.0 * 2.0).round() / 2.0
}

fn is_fresh(last_checkin: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match last_checkin {
        Some(ts) => now - ts < Duration::seconds(FRESHNESS_WINDOW_SECS),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn celsius_conversion_rounds_to_half_degree() {
        assert!((to_celsius(32.0) - 0.0).abs() < f64::EPSILON);
        assert!((to_celsius(98.6) - 37.0).abs() < f64::EPSILON);
        assert!((to_celsius(68.0) - 20.0).abs() < f64::EPSILON);
        // 70F = 21.11C, rounds to 21.0
        assert!((to_celsius(70.0) - 21.0).abs() < f64::EPSILON);
        // 71F = 21.67C, rounds to 21.5
        assert!((to_celsius(71.0) - 21.5).abs() < f64::EPSILON);
    }

    #[test]
    fn freshness_window_is_one_hour() {
        let now = Utc::now();
        assert!(is_fresh(None, now));
        assert!(is_fresh(Some(now - Duration::minutes(59)), now));
        assert!(!is_fresh(Some(now - Duration::minutes(61)), now));
    }
}
