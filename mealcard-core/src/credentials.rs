//! Login credentials, read from the environment only.

use std::fmt;

use thiserror::Error;

pub const USER_VAR: &str = "USER";
pub const PASSWORD_VAR: &str = "PASS";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user_id: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user_id", &self.user_id)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build credentials from `USER` and `PASS` as returned by `lookup`.
    /// Unset and empty values are both treated as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        Ok(Credentials {
            user_id: required(USER_VAR)?,
            password: required(PASSWORD_VAR)?,
        })
    }
}
