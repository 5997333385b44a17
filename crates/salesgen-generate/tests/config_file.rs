use std::path::PathBuf;

use salesgen_generate::locales::LocaleKey;
use salesgen_generate::{GenerationConfig, IdentityPolicy, TimestampMode, build_catalog};

#[test]
fn demo_config_loads_and_validates() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../demos/salesgen.toml");
    let config = GenerationConfig::from_toml_path(&path).expect("parse demo config");

    config.validate().expect("demo config is valid");
    assert_eq!(config.sales, 5000);
    assert_eq!(config.identity, IdentityPolicy::DeterministicHash);
    assert_eq!(config.timestamps, TimestampMode::DistinctSorted);
    assert_eq!(config.locales, vec![LocaleKey::PtBr, LocaleKey::EnUs]);

    let catalog = build_catalog(&config.taxonomy);
    assert_eq!(catalog.len(), 6);
    assert_eq!(catalog.get(4).map(|p| p.name.as_str()), Some("Carregador USB-C"));
}

#[test]
fn unknown_keys_are_rejected() {
    let result = GenerationConfig::from_toml_str("sales = 10\nsale_count = 10\n");
    assert!(result.is_err());
}

#[test]
fn duplicate_product_in_toml_is_rejected() {
    let result = GenerationConfig::from_toml_str(
        r#"
[[taxonomy.categories]]
name = "A"
products = [{ name = "X", unit_price = "1.00" }]

[[taxonomy.categories]]
name = "B"
products = [{ name = "X", unit_price = "2.00" }]
"#,
    );
    assert!(result.is_err());
}
