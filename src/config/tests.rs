use super::*;
use std::io::Write;

fn sample_toml() -> &'static str {
    r#"
        [server]
        bind_addr = "127.0.0.1:9090"

        [source]
        kind = "http"
        url = "http://localhost:5000"
        timeout_ms = 2000

        [sampling]
        history_backend = "source"

        [[entity]]
        name = "leader"
        index = "statefield_report_123"

        [[entity]]
        name = "follower"
        index = "statefield_report_456"
        enabled = false

        [[field]]
        name = "gomspace.vbatt"
        default = "76"

        [[field]]
        name = "attitude.quat"
        shape = "quaternion4"
        default = "0,0,0,1,0"

        [[field]]
        name = "gomspace.counters"
        shape = "nested"
        default = "0"
        leaves = ["counter_boot", "counter_wdt"]
    "#
}

#[test]
fn parses_full_config() {
    let config: DownlinkConfig = toml::from_str(sample_toml()).unwrap();
    config.validate().unwrap();

    assert_eq!(config.server.bind_addr, "127.0.0.1:9090");
    assert_eq!(config.source.kind, SourceKind::Http);
    assert_eq!(config.sampling.history_backend, HistoryBackend::Source);
    assert_eq!(config.entities.len(), 2);
    assert!(config.entities[0].enabled);
    assert!(!config.entities[1].enabled);
    assert_eq!(config.fields.len(), 3);
    assert_eq!(config.fields[1].shape, FieldShape::Quaternion4);
}

#[test]
fn multi_entity_defaults_to_five_second_ticks() {
    let config: DownlinkConfig = toml::from_str(sample_toml()).unwrap();
    assert_eq!(config.tick_interval(), std::time::Duration::from_millis(5000));
}

#[test]
fn single_entity_defaults_to_one_second_ticks() {
    let toml = r#"
        [[entity]]
        name = "sim"
        index = "statefield_report_123"
    "#;
    let config: DownlinkConfig = toml::from_str(toml).unwrap();
    assert_eq!(config.tick_interval(), std::time::Duration::from_millis(1000));
}

#[test]
fn interval_override_wins() {
    let toml = r#"
        [sampling]
        interval_ms = 250

        [[entity]]
        name = "sim"
        index = "i"
    "#;
    let config: DownlinkConfig = toml::from_str(toml).unwrap();
    assert_eq!(config.tick_interval(), std::time::Duration::from_millis(250));
}

#[test]
fn nested_state_keys_expand_leaves() {
    let config: DownlinkConfig = toml::from_str(sample_toml()).unwrap();
    assert_eq!(
        config.fields[2].state_keys(),
        vec!["gomspace.counters.counter_boot", "gomspace.counters.counter_wdt"]
    );
    assert_eq!(config.fields[0].state_keys(), vec!["gomspace.vbatt"]);
}

#[test]
fn validate_rejects_empty_entity_table() {
    let config: DownlinkConfig = toml::from_str("").unwrap();
    assert_eq!(config.validate(), Err(ConfigError::NoEntities));
}

#[test]
fn validate_rejects_duplicate_entities() {
    let toml = r#"
        [[entity]]
        name = "leader"
        index = "a"

        [[entity]]
        name = "leader"
        index = "b"
    "#;
    let config: DownlinkConfig = toml::from_str(toml).unwrap();
    assert_eq!(
        config.validate(),
        Err(ConfigError::DuplicateEntity("leader".to_string()))
    );
}

#[test]
fn validate_rejects_nested_without_leaves() {
    let toml = r#"
        [[entity]]
        name = "sim"
        index = "i"

        [[field]]
        name = "gomspace.counters"
        shape = "nested"
    "#;
    let config: DownlinkConfig = toml::from_str(toml).unwrap();
    assert_eq!(
        config.validate(),
        Err(ConfigError::NestedWithoutLeaves("gomspace.counters".to_string()))
    );
}

#[test]
fn validate_rejects_leaves_on_scalar() {
    let toml = r#"
        [[entity]]
        name = "sim"
        index = "i"

        [[field]]
        name = "batt.lvl"
        leaves = ["oops"]
    "#;
    let config: DownlinkConfig = toml::from_str(toml).unwrap();
    assert_eq!(
        config.validate(),
        Err(ConfigError::LeavesOnFlatField("batt.lvl".to_string()))
    );
}

#[test]
fn load_config_reads_and_validates_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(sample_toml().as_bytes()).unwrap();
    let config = load_config(file.path().to_str().unwrap()).unwrap();
    assert_eq!(config.entities.len(), 2);
}

#[test]
fn load_config_fails_on_invalid_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"[[entity]]\nname = \"\"\nindex = \"i\"\n").unwrap();
    assert!(load_config(file.path().to_str().unwrap()).is_err());
}
