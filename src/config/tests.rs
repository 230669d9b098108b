use super::load::{default_config_path, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_redtune_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("REDTUNE_CONFIG_PATH", "/tmp/redtune-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/redtune-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    assert_eq!(
        default_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("redtune")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    assert_eq!(
        default_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("redtune")
            .join("config.toml")
    );
}

#[test]
fn defaults_match_catalog_contract() {
    let s = Settings::default();
    assert_eq!(s.catalog.category_id, "10");
    assert_eq!(s.catalog.search_suffix, " official music video");
    assert_eq!(s.ui.min_query_len, 3);
    assert_eq!(s.ui.search_limit, 24);
    assert_eq!(s.ui.trending_limit, 18);
    assert_eq!(s.storage.cache_dir, std::path::PathBuf::from(".cache"));
}

#[test]
fn file_values_are_read_and_env_wins() {
    let _lock = env_lock();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[catalog]
api_key = "from-file"
region_code = "GB"

[ui]
search_limit = 10
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("REDTUNE_CONFIG_PATH", path.to_str().unwrap());
    let _g2 = EnvGuard::set("REDTUNE__CATALOG__API_KEY", "from-env");

    let s = Settings::load().unwrap();
    assert_eq!(s.catalog.api_key, "from-env");
    assert_eq!(s.catalog.region_code, "GB");
    assert_eq!(s.ui.search_limit, 10);
    // untouched sections keep their defaults
    assert_eq!(s.ui.trending_limit, 18);
}

#[test]
fn validate_requires_credentials() {
    let mut s = Settings::default();
    assert!(s.validate().is_err());

    s.catalog.api_key = "key".into();
    s.backend.url = "https://example.supabase.co".into();
    assert!(s.validate().is_err());

    s.backend.anon_key = "anon".into();
    assert!(s.validate().is_ok());
}
