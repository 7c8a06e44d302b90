use pretty_assertions::assert_eq;
use weft::BridgeConfig;

#[test]
fn config_round_trips_through_json() {
  let cfg = BridgeConfig::default()
    .thread_name("ingest")
    .stack_size(256 * 1024)
    .split_capacity(4);
  let json = serde_json::to_string(&cfg).unwrap();
  let back: BridgeConfig = serde_json::from_str(&json).unwrap();
  assert_eq!(back, cfg);
}

#[test]
fn missing_fields_take_defaults() {
  let cfg: BridgeConfig = serde_json::from_str(r#"{ "split_capacity": 2 }"#).unwrap();
  assert_eq!(cfg, BridgeConfig::default().split_capacity(2));
}
