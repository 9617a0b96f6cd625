//! Runtime configuration, read from the environment (and an optional `.env`).
//!
//! | Variable           | Default               |
//! |--------------------|-----------------------|
//! | `MOVIES_FILE`      | `movies.txt`          |
//! | `USERS_FILE`       | `users.json`          |
//! | `WATCHED_FILE`     | `watched_movies.json` |
//! | `BIND_ADDRESS`     | `127.0.0.1:8080`      |
//! | `PASSWORD_STORAGE` | `plaintext`           |
//! | `SESSION_KEY`      | random per process    |

use crate::error::ConfigError;
use actix_web::cookie::Key;
use log::warn;
use std::path::PathBuf;
use std::str::FromStr;

const SESSION_KEY_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordStorage {
    Plaintext,
    Bcrypt,
}

impl FromStr for PasswordStorage {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plaintext" => Ok(PasswordStorage::Plaintext),
            "bcrypt" => Ok(PasswordStorage::Bcrypt),
            _ => Err(ConfigError::InvalidPasswordStorage(s.to_owned())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub movies_file: PathBuf,
    pub users_file: PathBuf,
    pub watched_file: PathBuf,
    pub bind_address: String,
    pub password_storage: PasswordStorage,
    pub session_key: Option<Vec<u8>>,
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        Config::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = |key: &str, default: &str| {
            lookup(key)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(default))
        };
        let password_storage = match lookup("PASSWORD_STORAGE") {
            Some(value) => value.parse()?,
            None => PasswordStorage::Plaintext,
        };
        let session_key = match lookup("SESSION_KEY") {
            Some(key) if key.len() < SESSION_KEY_LEN => {
                return Err(ConfigError::SessionKeyTooShort(key.len()))
            }
            key => key.map(String::into_bytes),
        };
        Ok(Config {
            movies_file: path("MOVIES_FILE", "movies.txt"),
            users_file: path("USERS_FILE", "users.json"),
            watched_file: path("WATCHED_FILE", "watched_movies.json"),
            bind_address: lookup("BIND_ADDRESS")
                .unwrap_or_else(|| "127.0.0.1:8080".to_owned()),
            password_storage,
            session_key,
        })
    }

    /// Key for the identity cookie. Without `SESSION_KEY` a fresh random key
    /// is generated, so logins do not survive a restart.
    pub fn cookie_key(&self) -> Vec<u8> {
        match &self.session_key {
            Some(key) => key.clone(),
            None => {
                warn!("SESSION_KEY is not set; using a random session key");
                Key::generate().master().to_vec()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.movies_file, PathBuf::from("movies.txt"));
        assert_eq!(config.users_file, PathBuf::from("users.json"));
        assert_eq!(config.watched_file, PathBuf::from("watched_movies.json"));
        assert_eq!(config.bind_address, "127.0.0.1:8080");
        assert_eq!(config.password_storage, PasswordStorage::Plaintext);
        assert_eq!(config.session_key, None);
    }

    #[test]
    fn unset_session_key_is_random() {
        let config = config(&[]).unwrap();
        let first = config.cookie_key();
        let second = config.cookie_key();
        assert!(first.len() >= SESSION_KEY_LEN);
        assert_ne!(first, second);
        assert!(first.iter().any(|b| *b != 0));
    }

    #[test]
    fn overrides() {
        let key = "k".repeat(40);
        let config = config(&[
            ("MOVIES_FILE", "/data/movies.txt"),
            ("PASSWORD_STORAGE", "BCrypt"),
            ("BIND_ADDRESS", "0.0.0.0:9000"),
            ("SESSION_KEY", key.as_str()),
        ])
        .unwrap();
        assert_eq!(config.movies_file, PathBuf::from("/data/movies.txt"));
        assert_eq!(config.password_storage, PasswordStorage::Bcrypt);
        assert_eq!(config.bind_address, "0.0.0.0:9000");
        assert_eq!(config.cookie_key(), key.into_bytes());
    }

    #[test]
    fn invalid_values() {
        assert_eq!(
            config(&[("PASSWORD_STORAGE", "md5")]).unwrap_err(),
            ConfigError::InvalidPasswordStorage("md5".to_owned())
        );
        assert_eq!(
            config(&[("SESSION_KEY", "short")]).unwrap_err(),
            ConfigError::SessionKeyTooShort(5)
        );
    }
}
