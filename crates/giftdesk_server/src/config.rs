use std::{
    env,
    fmt::Display,
    fs::read_to_string,
    path::{Path, PathBuf},
    str::FromStr,
};

use giftdesk_core::{default_log_level, DEFAULT_MAX_UPLOAD_BYTES};
use log::{info, warn};
use thiserror::Error;

const SECRETS_DIR: &str = "/run/secrets";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {key} value `{value}`: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("Cannot resolve working directory: {0}")]
    WorkingDir(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub db_path: PathBuf,
    pub media_dir: PathBuf,
    pub media_base_url: String,
    pub max_upload_bytes: usize,
    pub log_level: String,
    pub log_dir: PathBuf,
    pub log_to_stderr: bool,
    /// Raw `token=email` pairs for the static identity provider.
    pub session_tokens: String,
    /// `(name, email)` of an admin created at startup when missing.
    pub bootstrap_admin: Option<(String, String)>,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let cwd = env::current_dir()?;
        let port = try_load("GIFTDESK_PORT", "8080")?;

        Ok(Self {
            port,
            db_path: PathBuf::from(load_or("GIFTDESK_DB_PATH", "giftdesk.sqlite3")),
            media_dir: PathBuf::from(load_or("GIFTDESK_MEDIA_DIR", "media")),
            media_base_url: load_or(
                "GIFTDESK_MEDIA_BASE_URL",
                &format!("http://localhost:{port}/media"),
            ),
            max_upload_bytes: try_load(
                "GIFTDESK_MAX_UPLOAD_BYTES",
                &DEFAULT_MAX_UPLOAD_BYTES.to_string(),
            )?,
            log_level: load_or("GIFTDESK_LOG_LEVEL", default_log_level()),
            log_dir: absolute(&cwd, load_or("GIFTDESK_LOG_DIR", "logs")),
            log_to_stderr: try_load("GIFTDESK_LOG_STDERR", "true")?,
            session_tokens: read_secret("GIFTDESK_SESSION_TOKENS").unwrap_or_default(),
            bootstrap_admin: parse_bootstrap_admin(var("GIFTDESK_BOOTSTRAP_ADMIN").as_deref())?,
        })
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn load_or(key: &str, default: &str) -> String {
    var(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    })
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = load_or(key, default);
    value.parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");
        ConfigError::Invalid {
            key,
            value,
            reason: e.to_string(),
        }
    })
}

/// Reads `/run/secrets/<name>`, then falls back to the environment.
fn read_secret(secret_name: &str) -> Option<String> {
    let path = Path::new(SECRETS_DIR).join(secret_name);

    match read_to_string(&path) {
        Ok(value) => Some(value.trim().to_string()),
        Err(e) => {
            info!("Secret {secret_name} not readable from file ({e}), checking environment");
            let value = var(secret_name);
            if value.is_none() {
                warn!("{secret_name} not configured; every session will be rejected");
            }
            value
        }
    }
}

fn absolute(cwd: &Path, value: String) -> PathBuf {
    let path = PathBuf::from(value);
    if path.is_absolute() {
        path
    } else {
        cwd.join(path)
    }
}

pub(crate) fn parse_bootstrap_admin(
    raw: Option<&str>,
) -> Result<Option<(String, String)>, ConfigError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    match raw.split_once('=') {
        Some((name, email)) if !name.trim().is_empty() && !email.trim().is_empty() => {
            Ok(Some((name.trim().to_string(), email.trim().to_string())))
        }
        _ => Err(ConfigError::Invalid {
            key: "GIFTDESK_BOOTSTRAP_ADMIN",
            value: raw.to_string(),
            reason: "expected `name=email`".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::{absolute, parse_bootstrap_admin};
    use std::path::Path;

    #[test]
    fn bootstrap_admin_requires_name_and_email() {
        assert_eq!(parse_bootstrap_admin(None).unwrap(), None);
        assert_eq!(
            parse_bootstrap_admin(Some(" Root = root@example.com ")).unwrap(),
            Some(("Root".to_string(), "root@example.com".to_string()))
        );
        assert!(parse_bootstrap_admin(Some("root@example.com")).is_err());
        assert!(parse_bootstrap_admin(Some("=root@example.com")).is_err());
    }

    #[test]
    fn relative_paths_resolve_against_cwd() {
        let cwd = Path::new("/srv/giftdesk");
        assert_eq!(absolute(cwd, "logs".to_string()), cwd.join("logs"));
        assert_eq!(
            absolute(cwd, "/var/log/giftdesk".to_string()),
            Path::new("/var/log/giftdesk")
        );
    }
}
