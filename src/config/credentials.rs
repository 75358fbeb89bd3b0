//! Store credentials, read from the environment rather than the config file

use std::fmt;

pub const HOST_VAR: &str = "SITEMAP_SYNC_DB_HOST";
pub const USER_VAR: &str = "SITEMAP_SYNC_DB_USER";
pub const PASSWORD_VAR: &str = "SITEMAP_SYNC_DB_PASSWORD";

/// Host, user and password for the relational store
///
/// Each field is optional at load time. A missing value is only an error
/// once a backend that needs it tries to connect.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct StoreCredentials {
    pub host: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl StoreCredentials {
    /// Reads the credentials from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the credentials through an arbitrary key lookup
    ///
    /// Empty values are treated as absent.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            host: read(HOST_VAR),
            user: read(USER_VAR),
            password: read(PASSWORD_VAR),
        }
    }

    /// Returns the names of the variables that are still unset
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.host.is_none() {
            missing.push(HOST_VAR);
        }
        if self.user.is_none() {
            missing.push(USER_VAR);
        }
        if self.password.is_none() {
            missing.push(PASSWORD_VAR);
        }
        missing
    }
}

impl fmt::Debug for StoreCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreCredentials")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_reads_all_three() {
        let creds = StoreCredentials::from_lookup(lookup_from(&[
            (HOST_VAR, "db.internal"),
            (USER_VAR, "crawler"),
            (PASSWORD_VAR, "hunter2"),
        ]));
        assert_eq!(creds.host.as_deref(), Some("db.internal"));
        assert_eq!(creds.user.as_deref(), Some("crawler"));
        assert!(creds.missing().is_empty());
    }

    #[test]
    fn test_blank_values_are_missing() {
        let creds =
            StoreCredentials::from_lookup(lookup_from(&[(HOST_VAR, "db"), (USER_VAR, "  ")]));
        assert_eq!(creds.missing(), vec![USER_VAR, PASSWORD_VAR]);
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = StoreCredentials::from_lookup(lookup_from(&[(PASSWORD_VAR, "hunter2")]));
        let rendered = format!("{:?}", creds);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }
}
