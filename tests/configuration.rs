use std::fs;

use activity_json::config::EngineConfig;
use activity_json::engine::Engine;
use activity_json::vocab::ActivityModule;
use activity_json::ActivityError;
use tracing_subscriber::EnvFilter;

#[test]
fn defaults() {
    let config = EngineConfig::default();
    assert!(!config.pretty);
    assert_eq!(config.discriminator_field, "objectType");
    assert_eq!(config.default_language, "und");
    assert!(!config.silent_resolution);
    assert!(config.resolve_on_decode);
    assert!(config.validate().is_ok());
}

#[test]
fn invalid_settings_fail_assembly() {
    let config = EngineConfig { discriminator_field: String::new(), ..EngineConfig::default() };
    let err = Engine::builder().config(config).build().unwrap_err();
    assert!(matches!(err, ActivityError::Configuration(_)));

    let config = EngineConfig { default_language: String::from("en_US"), ..EngineConfig::default() };
    assert!(config.validate().unwrap_err().to_string().contains("en_US"));
}

#[test]
fn custom_discriminator_and_language() {
    let config = EngineConfig {
        discriminator_field: String::from("kind"),
        default_language: String::from("en"),
        ..EngineConfig::default()
    };
    let engine = Engine::builder()
        .module(ActivityModule)
        .config(config)
        .build()
        .unwrap();
    let note = engine.decode(r#"{"kind":"note","title":"Hello","published":"2020-01-01T00:00:00Z"}"#).unwrap();
    let title = note.get("title").and_then(|v| v.as_language_map()).expect("title is a language map");
    assert_eq!(title.get("en"), Some("Hello"));
    assert!(note.get("published").and_then(|v| v.as_date_time()).is_some());
    assert_eq!(
        engine.encode(&note).unwrap(),
        r#"{"kind":"note","title":"Hello","published":"2020-01-01T00:00:00Z"}"#
    );

    let greeting = engine.decode(r#"{"kind":"note","title":{"sv":"Hej","en":"Hi"}}"#).unwrap();
    let default_language = engine.config().default_language.as_str();
    assert_eq!(greeting.text_or("title", "de", default_language), Some("Hi"));
    assert_eq!(greeting.text("title", "de"), Some("Hej"));
}

// Files and the environment are read in one test, since the environment is process wide.
#[test]
fn load_from_file_and_environment() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let path = std::env::temp_dir().join(format!("activity-json-{}.toml", std::process::id()));
    fs::write(&path, "pretty = true\ndefault_language = \"sv\"\n").unwrap();
    let loaded = EngineConfig::load(Some(path.as_path())).expect("file loads");
    assert!(loaded.pretty);
    assert_eq!(loaded.default_language, "sv");
    assert_eq!(loaded.discriminator_field, "objectType");

    unsafe { std::env::set_var("ACTIVITY_JSON_DISCRIMINATOR_FIELD", "kind") };
    let overridden = EngineConfig::load(Some(path.as_path())).expect("file and environment load");
    unsafe { std::env::remove_var("ACTIVITY_JSON_DISCRIMINATOR_FIELD") };
    assert_eq!(overridden.discriminator_field, "kind");
    assert!(overridden.pretty);

    fs::write(&path, "default_language = \"not a tag\"\n").unwrap();
    let err = EngineConfig::load(Some(path.as_path())).unwrap_err();
    assert!(matches!(err, ActivityError::Configuration(_)));

    fs::remove_file(&path).unwrap();
    assert!(matches!(EngineConfig::load(Some(path.as_path())), Err(ActivityError::Config(_))));
}
