use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

pub const CONFIG_ENV: &str = "TALKPOINTS_CONFIG";
const BIND_ENV: &str = "TALKPOINTS_BIND";
const PORT_ENV: &str = "TALKPOINTS_PORT";
const DATA_DIR_ENV: &str = "TALKPOINTS_DATA_DIR";
const COOKIE_ENV: &str = "TALKPOINTS_COOKIE";
const SESSION_TTL_ENV: &str = "TALKPOINTS_SESSION_TTL";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub bind_address: String,
    pub port: u16,
    /// Directory holding `cat.json` and the per-category content files.
    pub data_dir: PathBuf,
    pub session_cookie: String,
    /// Seconds a session may sit idle before its history is dropped. 0 keeps
    /// sessions for the life of the process.
    pub session_ttl_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".into(),
            port: 8080,
            data_dir: PathBuf::from("data"),
            session_cookie: "talk_session".into(),
            session_ttl_secs: 1440,
        }
    }
}

impl Settings {
    /// Defaults, then the JSON file named by `TALKPOINTS_CONFIG`, then
    /// `TALKPOINTS_*` environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    pub fn load_with(env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut settings = match env(CONFIG_ENV).filter(|path| !path.is_empty()) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        settings.apply_overrides(&env)?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings in {}", path.display()))
    }

    fn apply_overrides(&mut self, env: &impl Fn(&str) -> Option<String>) -> Result<()> {
        let var = |key: &str| env(key).filter(|value| !value.is_empty());

        if let Some(bind) = var(BIND_ENV) {
            self.bind_address = bind;
        }
        if let Some(port) = var(PORT_ENV) {
            self.port = port
                .parse()
                .with_context(|| format!("{PORT_ENV} must be a port number, got {port:?}"))?;
        }
        if let Some(dir) = var(DATA_DIR_ENV) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(cookie) = var(COOKIE_ENV) {
            self.session_cookie = cookie;
        }
        if let Some(ttl) = var(SESSION_TTL_ENV) {
            self.session_ttl_secs = ttl.parse().with_context(|| {
                format!("{SESSION_TTL_ENV} must be a number of seconds, got {ttl:?}")
            })?;
        }
        Ok(())
    }

    pub fn socket_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    pub fn session_ttl(&self) -> Option<Duration> {
        (self.session_ttl_secs > 0).then(|| Duration::from_secs(self.session_ttl_secs))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let settings = Settings::load_with(env(&[])).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.socket_address(), "0.0.0.0:8080");
    }

    #[test]
    fn env_overrides_win() {
        let settings = Settings::load_with(env(&[
            (PORT_ENV, "9000"),
            (DATA_DIR_ENV, "/srv/talk"),
            (COOKIE_ENV, "sid"),
            (BIND_ENV, ""),
        ]))
        .unwrap();
        assert_eq!(settings.port, 9000);
        assert_eq!(settings.data_dir, PathBuf::from("/srv/talk"));
        assert_eq!(settings.session_cookie, "sid");
        assert_eq!(settings.bind_address, "0.0.0.0");
    }

    #[test]
    fn bad_port_is_an_error() {
        assert!(Settings::load_with(env(&[(PORT_ENV, "eighty")])).is_err());
    }

    #[test]
    fn session_ttl_defaults_and_overrides() {
        let defaults = Settings::default();
        assert_eq!(defaults.session_ttl(), Some(Duration::from_secs(1440)));

        let settings = Settings::load_with(env(&[(SESSION_TTL_ENV, "90")])).unwrap();
        assert_eq!(settings.session_ttl(), Some(Duration::from_secs(90)));

        let forever = Settings::load_with(env(&[(SESSION_TTL_ENV, "0")])).unwrap();
        assert_eq!(forever.session_ttl(), None);

        assert!(Settings::load_with(env(&[(SESSION_TTL_ENV, "soon")])).is_err());
    }

    #[test]
    fn file_fills_missing_fields_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("talk.json");
        fs::write(&path, r#"{"port": 3000, "data_dir": "content"}"#).unwrap();

        let path_str = path.to_string_lossy().into_owned();
        let settings =
            Settings::load_with(env(&[(CONFIG_ENV, path_str.as_str()), (PORT_ENV, "3001")]))
                .unwrap();
        assert_eq!(settings.port, 3001);
        assert_eq!(settings.data_dir, PathBuf::from("content"));
        assert_eq!(settings.session_cookie, "talk_session");
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        let missing = missing.to_string_lossy().into_owned();
        assert!(Settings::load_with(env(&[(CONFIG_ENV, missing.as_str())])).is_err());
    }
}
