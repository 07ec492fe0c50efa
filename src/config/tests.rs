use super::load::{default_config_path, default_data_path, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap()
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
fn resolve_config_path_prefers_attacca_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("ATTACCA_CONFIG_PATH", "/tmp/attacca-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/attacca-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("attacca")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("attacca")
            .join("config.toml")
    );
}

#[test]
fn default_data_path_follows_xdg_data_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_DATA_HOME", "/tmp/xdg-data-home");

    let p = default_data_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-data-home")
            .join("attacca")
            .join("queue.redb")
    );

    let _g2 = EnvGuard::remove("XDG_DATA_HOME");
    let _g3 = EnvGuard::set("HOME", "/tmp/home-dir");
    let p = default_data_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".local")
            .join("share")
            .join("attacca")
            .join("queue.redb")
    );
}

#[test]
fn settings_load_from_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[storage]
path = "/tmp/attacca-test/queue.redb"
autosave_debounce_ms = 100

[library]
extensions = ["mp3"]
recursive = false
include_hidden = false
follow_links = false

[controls]
seek_seconds = 9
volume_step = 0.1

[ui]
header_text = "hello"
toast_ms = 1234
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("ATTACCA_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("ATTACCA__STORAGE__AUTOSAVE_DEBOUNCE_MS");

    let s = Settings::load().unwrap();
    assert_eq!(
        s.storage.path,
        Some(std::path::PathBuf::from("/tmp/attacca-test/queue.redb"))
    );
    assert_eq!(s.storage.autosave_debounce_ms, 100);
    assert_eq!(s.library.extensions, vec!["mp3".to_string()]);
    assert!(!s.library.recursive);
    assert!(!s.library.include_hidden);
    assert!(!s.library.follow_links);
    assert_eq!(s.controls.seek_seconds, 9);
    assert!((s.controls.volume_step - 0.1).abs() < f32::EPSILON);
    assert_eq!(s.ui.header_text, "hello");
    assert_eq!(s.ui.toast_ms, 1234);
    assert!(s.validate().is_ok());
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[storage]
autosave_debounce_ms = 250
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("ATTACCA_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("ATTACCA__STORAGE__AUTOSAVE_DEBOUNCE_MS", "42");

    let s = Settings::load().unwrap();
    assert_eq!(s.storage.autosave_debounce_ms, 42);
}

#[test]
fn validate_rejects_bad_values() {
    let mut s = Settings::default();
    s.controls.volume_step = 0.0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.storage.autosave_debounce_ms = 0;
    assert!(s.validate().is_err());
}
