//! Property-based tests for settings persistence.
//!
//! Any valid settings document written through the engine reads back equal.

use jobboard::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use jobboard::types::settings::{ClientSettings, PaymentMode};
use proptest::prelude::*;
use serde_json::json;
use tempfile::TempDir;

fn arb_url() -> impl Strategy<Value = String> {
    ("[a-z]{3,10}", prop_oneof![Just(".com"), Just(".co.ke"), Just(".io")])
        .prop_map(|(host, tld)| format!("https://{}{}", host, tld))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn set_values_survive_reload(
        url in arb_url(),
        jobs_page in 1usize..100,
        blogs_page in 1usize..100,
        live in any::<bool>(),
        rate in (50u32..500).prop_map(f64::from),
    ) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json").to_string_lossy().to_string();

        let mut engine = SettingsEngine::new(Some(path.clone()));
        engine.load().unwrap();
        engine.set_value("api.base_url", json!(url)).unwrap();
        engine.set_value("views.jobs_page_size", json!(jobs_page)).unwrap();
        engine.set_value("views.blogs_page_size", json!(blogs_page)).unwrap();
        engine.set_value("payment.mode", json!(if live { "live" } else { "mock" })).unwrap();
        engine.set_value("payment.usd_to_kes_rate", json!(rate)).unwrap();

        let mut reloaded = SettingsEngine::new(Some(path));
        let settings: ClientSettings = reloaded.load().unwrap();
        prop_assert_eq!(&settings, engine.get_settings());
        prop_assert_eq!(settings.api.base_url, url);
        prop_assert_eq!(settings.views.jobs_page_size, jobs_page);
        prop_assert_eq!(settings.payment.mode, if live { PaymentMode::Live } else { PaymentMode::Mock });
    }
}
