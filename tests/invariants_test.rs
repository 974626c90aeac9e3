//! Properties the configuration engine keeps for every configuration

use adminserver_config::{ConfigError, ConfigManager, Environment};
use adminserver_core::items::{
    CFG_CACHE_INTERVAL_SECONDS, EMAIL_PASSWORD, EMAIL_PORT, LDAP_SEARCH_PASSWORD, LDAP_TIMEOUT,
    LDAP_URL, TOKEN_EXPIRATION,
};
use adminserver_core::Scope;
use adminserver_integration_tests::{memory_manager, registry};
use adminserver_storage::{DriverOptions, Encryptor, InMemoryDriver, SecretCodec};
use serde_json::{json, Map, Value};
use std::sync::Arc;

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn test_every_stored_value_satisfies_its_type() {
    let (manager, _) = memory_manager(Environment::snapshot([
        ("LDAP_TIMEOUT", "not-a-number"),
        ("EMAIL_PORT", "70000"),
    ]));
    manager.load().await.unwrap();
    manager
        .update(object(json!({
            "ldap_timeout": "ten",
            "ldap_verify_cert": "maybe",
            "token_expiration": 45,
        })))
        .await
        .unwrap();
    assert!(manager.set(EMAIL_PORT, "-1").is_err());

    let registry = manager.registry();
    for (name, raw) in manager.store().to_raw_map() {
        let item = registry.get(&name).unwrap();
        assert!(
            item.item_type.validate(&raw).is_ok(),
            "{} holds invalid value {:?}",
            name,
            raw
        );
    }
    assert_eq!(manager.get_int(LDAP_TIMEOUT).unwrap(), 5);
    assert_eq!(manager.get_int(EMAIL_PORT).unwrap(), 25);
    assert_eq!(manager.get_int(TOKEN_EXPIRATION).unwrap(), 45);
}

#[test]
fn test_password_encryption_round_trips() {
    let encryptor = Arc::new(Encryptor::from_key(b"integration-key"));
    let codec = SecretCodec::new(encryptor.clone(), &registry());

    for plaintext in ["s3cr3t", "with spaces and ünïcode", "x"] {
        let sealed = codec
            .encode(EMAIL_PASSWORD, plaintext.to_string())
            .unwrap();
        assert_ne!(sealed, plaintext);
        assert!(Encryptor::is_encrypted(&sealed));
        assert_eq!(encryptor.decrypt(&sealed).unwrap(), plaintext);
        assert_eq!(codec.decode(EMAIL_PASSWORD, sealed).as_deref(), Some(plaintext));
    }

    // Values of other types pass through untouched
    assert_eq!(codec.encode(LDAP_URL, "ldap://x".to_string()).unwrap(), "ldap://x");
}

#[test]
fn test_environment_overrides_defaults_before_load() {
    let manager = ConfigManager::local(
        registry(),
        Arc::new(InMemoryDriver::new()),
        Environment::snapshot([
            ("CFG_CACHE_INTERVAL_SECONDS", "30"),
            ("LDAP_URL", "ldap://ignored-until-load"),
        ]),
        DriverOptions::default(),
    );

    // System scope: environment wins over the default
    assert_eq!(manager.get_int(CFG_CACHE_INTERVAL_SECONDS).unwrap(), 30);
    // Default when no environment value exists
    assert_eq!(manager.get_int(LDAP_TIMEOUT).unwrap(), 5);
    // User scope items are not taken from the environment before load
    assert!(matches!(manager.get(LDAP_URL), Err(ConfigError::NotSet(_))));
    // Password items without default or environment value
    assert!(matches!(
        manager.get(LDAP_SEARCH_PASSWORD),
        Err(ConfigError::NotSet(_))
    ));
}

#[tokio::test]
async fn test_reset_twice_yields_identical_persisted_state() {
    let env = || Environment::snapshot([("LDAP_URL", "ldap://a"), ("EMAIL_PWD", "pw")]);
    let (manager, driver) = memory_manager(env());
    manager.load().await.unwrap();
    manager.set(LDAP_TIMEOUT, "77").unwrap();
    manager.save().await.unwrap();

    manager.reset().await.unwrap();
    let first = driver.snapshot();
    manager.reset().await.unwrap();
    let second = driver.snapshot();

    assert_eq!(first, second);
    assert_eq!(first.get(LDAP_TIMEOUT).map(String::as_str), Some("5"));
}

#[tokio::test]
async fn test_bulk_update_applies_valid_entries_only() {
    let (manager, driver) = memory_manager(Environment::empty());
    manager.load().await.unwrap();

    let outcome = manager
        .update(object(json!({"ldap_timeout": 12, "email_port": "not-a-port"})))
        .await
        .unwrap();

    assert_eq!(outcome.applied, vec![LDAP_TIMEOUT.to_string()]);
    assert_eq!(outcome.dropped.len(), 1);
    assert_eq!(manager.get_int(LDAP_TIMEOUT).unwrap(), 12);
    assert_eq!(manager.get_int(EMAIL_PORT).unwrap(), 25);

    let persisted = driver.snapshot();
    for (name, raw) in &persisted {
        assert_eq!(manager.get(name).unwrap().raw(), raw);
    }
    assert_eq!(persisted.get(LDAP_TIMEOUT).map(String::as_str), Some("12"));
}

#[tokio::test]
async fn test_system_scope_values_are_never_persisted() {
    let (manager, driver) = memory_manager(Environment::snapshot([("CORE_URL", "http://core:9090")]));
    manager.load().await.unwrap();
    manager.set("core_url", "http://elsewhere").unwrap();
    manager.save().await.unwrap();
    manager.reset().await.unwrap();

    let registry = manager.registry();
    let persisted = driver.snapshot();
    assert!(!persisted.is_empty());
    for name in persisted.keys() {
        assert_eq!(registry.get(name).unwrap().scope, Scope::User, "{} was persisted", name);
    }
}
