// End-to-end bridge tests: auth + inventory + reconcile against
// wiremock, through the public `Bridge` surface.

use std::sync::{Arc, Mutex};

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use leakbridge_core::{
    AccessoryHost, AccessoryRecord, Bridge, BridgeConfig, CoreError, NullHost, NullSink,
    RefreshTokenSink, ServiceSet,
};

// ── Helpers ─────────────────────────────────────────────────────────

#[derive(Default)]
struct RecordingHost {
    registered: Mutex<Vec<String>>,
    updated: Mutex<Vec<String>>,
    unregistered: Mutex<Vec<String>>,
}

impl AccessoryHost for RecordingHost {
    fn register_accessories(&self, accessories: &[AccessoryRecord]) {
        let mut ids = self.registered.lock().unwrap();
        ids.extend(accessories.iter().map(|r| r.device_id().to_owned()));
    }

    fn update_accessories(&self, accessories: &[AccessoryRecord]) {
        let mut ids = self.updated.lock().unwrap();
        ids.extend(accessories.iter().map(|r| r.device_id().to_owned()));
    }

    fn unregister_accessories(&self, accessories: &[AccessoryRecord]) {
        let mut ids = self.unregistered.lock().unwrap();
        ids.extend(accessories.iter().map(|r| r.device_id().to_owned()));
    }
}

#[derive(Default)]
struct CountingSink {
    persisted: Mutex<Vec<String>>,
}

impl RefreshTokenSink for CountingSink {
    fn persist(&self, refresh_token: &str) -> Result<(), CoreError> {
        self.persisted.lock().unwrap().push(refresh_token.to_owned());
        Ok(())
    }
}

fn test_config(server: &MockServer) -> BridgeConfig {
    BridgeConfig {
        consumer_key: "k".to_owned(),
        consumer_secret: Some(SecretString::from("s".to_string())),
        refresh_token: SecretString::from("r0".to_string()),
        api_base_url: Url::parse(&server.uri()).unwrap(),
        token_url: Url::parse(&format!("{}/oauth2/token", server.uri())).unwrap(),
        ..BridgeConfig::default()
    }
}

async fn mount_auth(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "a1",
            "refresh_token": "r1",
            "expires_in": 1800
        })))
        .mount(server)
        .await;
}

fn one_sensor_inventory() -> serde_json::Value {
    json!([{
        "locationID": "L1",
        "name": "Home",
        "devices": [{
            "deviceID": "D1",
            "userDefinedDeviceName": "Basement",
            "deviceType": "WaterLeakDetector",
            "deviceClass": "LeakDetector",
            "isAlive": true,
            "waterPresent": false,
            "currentSensorReadings": { "temperature": 68.0, "humidity": 45.0 },
            "batteryRemaining": 80,
            "isDeviceOffline": false,
            "hasDeviceCheckedIn": true
        }]
    }])
}

// ── Scenarios ───────────────────────────────────────────────────────

#[tokio::test]
async fn full_cycle_registers_one_accessory_and_persists_rotation() {
    let server = MockServer::start().await;
    mount_auth(&server).await;

    Mock::given(method("GET"))
        .and(path("/v2/locations"))
        .and(query_param("apikey", "k"))
        .and(header("authorization", "Bearer a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(one_sensor_inventory()))
        .mount(&server)
        .await;

    let host = Arc::new(RecordingHost::default());
    let sink = Arc::new(CountingSink::default());
    let bridge = Bridge::new(test_config(&server), host.clone(), sink.clone()).unwrap();

    let result = bridge.run_inventory_cycle().await.unwrap();

    assert_eq!(result.created, vec!["D1"]);
    assert!(result.updated.is_empty());
    assert!(result.removed.is_empty());

    let accessories = bridge.accessories().await;
    assert_eq!(accessories.len(), 1);
    let record = &accessories[0];
    assert_eq!(record.display_name, "Basement");
    assert!(!record.state.leak_detected);
    assert_eq!(record.state.battery_level, 80);
    assert!(!record.state.status_low_battery);
    assert!((record.state.current_temperature - 20.0).abs() < f64::EPSILON);
    assert!(record.state.status_active);

    // Auth rotated r0 -> r1: persisted exactly once.
    assert_eq!(sink.persisted.lock().unwrap().clone(), vec!["r1"]);
    assert_eq!(bridge.current_refresh_token().await, "r1");
    assert_eq!(host.registered.lock().unwrap().clone(), vec!["D1"]);
}

#[tokio::test]
async fn failed_fetch_leaves_last_known_state_untouched() {
    let server = MockServer::start().await;
    mount_auth(&server).await;

    Mock::given(method("GET"))
        .and(path("/v2/locations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(one_sensor_inventory()))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/locations"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let host = Arc::new(RecordingHost::default());
    let bridge = Bridge::new(test_config(&server), host.clone(), Arc::new(NullSink)).unwrap();

    bridge.run_inventory_cycle().await.unwrap();
    let before = bridge.accessories().await;

    let second = bridge.run_inventory_cycle().await;
    assert!(
        matches!(second, Err(CoreError::FetchFailed { status: Some(500), .. })),
        "expected FetchFailed, got: {second:?}"
    );

    // Stale but intact: no removal, no state corruption.
    let after = bridge.accessories().await;
    assert_eq!(after.len(), before.len());
    assert_eq!(after[0].state, before[0].state);
    assert!(host.unregistered.lock().unwrap().is_empty());
}

#[tokio::test]
async fn restored_accessory_is_updated_on_first_cycle() {
    let server = MockServer::start().await;
    mount_auth(&server).await;

    Mock::given(method("GET"))
        .and(path("/v2/locations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(one_sensor_inventory()))
        .mount(&server)
        .await;

    let host = Arc::new(RecordingHost::default());
    let bridge = Bridge::new(test_config(&server), host.clone(), Arc::new(NullSink)).unwrap();

    // Simulate the host handing back a cached accessory before ready.
    let cached: AccessoryRecord = serde_json::from_value(json!({
        "uuid": leakbridge_core::accessory_uuid("D1"),
        "display_name": "Basement",
        "device": {
            "deviceID": "D1",
            "deviceClass": "LeakDetector",
            "isAlive": true,
            "batteryRemaining": 10
        },
        "services": { "leak": true, "temperature": true, "humidity": true, "battery": true },
        "state": {
            "leak_detected": false,
            "status_active": false,
            "battery_level": 10,
            "status_low_battery": true,
            "charging_state": "NotChargeable",
            "current_temperature": 0.0,
            "current_relative_humidity": 0.0,
            "readings_fresh": true
        }
    }))
    .unwrap();
    bridge.restore(vec![cached]).await;

    let result = bridge.run_inventory_cycle().await.unwrap();

    assert!(result.created.is_empty());
    assert_eq!(result.updated, vec!["D1"]);
    assert!(host.registered.lock().unwrap().is_empty());

    // The cached snapshot was replaced by the live one.
    let record = &bridge.accessories().await[0];
    assert_eq!(record.state.battery_level, 80);
    assert!(!record.state.status_low_battery);
}

#[tokio::test]
async fn start_and_shutdown_survive_an_unreachable_api() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let bridge =
        Bridge::new(test_config(&server), Arc::new(NullHost), Arc::new(NullSink)).unwrap();

    // Initial discovery fails; start logs and keeps running.
    bridge.start().await;
    assert_eq!(bridge.accessory_count().await, 0);
    bridge.shutdown().await;
}

// ── Construction ────────────────────────────────────────────────────

#[tokio::test]
async fn missing_credentials_are_fatal_at_construction() {
    let server = MockServer::start().await;

    let mut config = test_config(&server);
    config.consumer_key = String::new();
    let result = Bridge::new(config, Arc::new(NullHost), Arc::new(NullSink));
    assert!(matches!(result, Err(CoreError::Config { .. })));

    let mut config = test_config(&server);
    config.refresh_token = SecretString::from(String::new());
    let result = Bridge::new(config, Arc::new(NullHost), Arc::new(NullSink));
    assert!(matches!(result, Err(CoreError::Config { .. })));
}
