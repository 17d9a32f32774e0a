use super::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|e| e.into_inner())
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

fn write_config(body: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    std::io::Write::write_all(&mut file, body.as_bytes()).unwrap();
    file
}

#[test]
fn defaults_are_sane() {
    let s = Settings::default();
    assert!(!s.playback.shuffle);
    assert_eq!(s.playback.repeat_mode, RepeatMode::Off);
    assert!(s.library.recursive);
    assert!(!s.library.include_hidden);
    assert_eq!(s.log.level, "info");
    assert!(s.validate().is_ok());
}

#[test]
fn resolve_config_path_prefers_hover_config_path() {
    let _lock = env_lock();
    let _g = EnvGuard::set("HOVER_CONFIG_PATH", "/tmp/hover-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        PathBuf::from("/tmp/hover-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");
    assert_eq!(
        default_config_path().unwrap(),
        PathBuf::from("/tmp/xdg-config-home/hover/config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");
    assert_eq!(
        default_config_path().unwrap(),
        PathBuf::from("/tmp/home-dir/.config/hover/config.toml")
    );
}

#[test]
fn load_reads_explicit_file() {
    let _lock = env_lock();
    let file = write_config(
        r#"
[playback]
shuffle = true
repeat_mode = "repeat-all"
seed = 42

[library]
recursive = false
max_depth = 2
"#,
    );
    let s = Settings::load(Some(file.path())).unwrap();
    assert!(s.playback.shuffle);
    assert_eq!(s.playback.repeat_mode, RepeatMode::All);
    assert_eq!(s.playback.seed, Some(42));
    assert!(!s.library.recursive);
    assert_eq!(s.library.scan_options().max_depth, Some(2));
    assert!(s.library.probe_durations);
}

#[test]
fn env_overrides_file() {
    let _lock = env_lock();
    let file = write_config("[playback]\nrepeat_mode = \"one\"\n");
    let _g = EnvGuard::set("HOVER__PLAYBACK__REPEAT_MODE", "all");
    let s = Settings::load(Some(file.path())).unwrap();
    assert_eq!(s.playback.repeat_mode, RepeatMode::All);
}

#[test]
fn missing_explicit_file_is_an_error() {
    let _lock = env_lock();
    let dir = tempfile::tempdir().unwrap();
    assert!(Settings::load(Some(&dir.path().join("nope.toml"))).is_err());
}

#[test]
fn validate_rejects_unknown_log_level() {
    let mut s = Settings::default();
    s.log.level = "chatty".to_string();
    assert!(s.validate().is_err());
}

#[test]
fn repeat_mode_accepts_aliases_and_rejects_nonsense() {
    let _lock = env_lock();
    let file = write_config("[playback]\nrepeat_mode = \"single\"\n");
    let s = Settings::load(Some(file.path())).unwrap();
    assert_eq!(s.playback.repeat_mode, RepeatMode::One);

    let file = write_config("[playback]\nrepeat_mode = \"twice\"\n");
    assert!(Settings::load(Some(file.path())).is_err());
}

#[test]
fn follow_links_can_be_disabled() {
    let _lock = env_lock();
    let file = write_config("[library]\nfollow_links = false\n");
    let s = Settings::load(Some(file.path())).unwrap();
    assert!(!s.library.scan_options().follow_links);
    assert!(Settings::default().library.follow_links);
}
