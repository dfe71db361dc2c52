use std::str::FromStr;

use anyhow::{Context, Result};

use super::config_model::{Auth, Database, DotEnvyConfig, Server};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    from_lookup(|key| std::env::var(key).ok())
}

/// Builds the config from any key lookup, so parsing does not depend on the
/// process environment.
pub fn from_lookup<F>(lookup: F) -> Result<DotEnvyConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let server = Server {
        port: parse_or(&lookup, "SERVER_PORT", 8080)?,
        body_limit: parse_or(&lookup, "SERVER_BODY_LIMIT", 10)?,
        timeout: parse_or(&lookup, "SERVER_TIMEOUT", 30)?,
    };

    let database = Database {
        url: required(&lookup, "DATABASE_URL")?,
    };

    let auth = Auth {
        jwt_secret: required(&lookup, "JWT_SECRET")?,
        jwt_ttl_seconds: parse_or(&lookup, "JWT_TTL_SECONDS", 86_400)?,
        admin_username: non_empty(&lookup, "ADMIN_USERNAME")
            .unwrap_or_else(|| "admin".to_string()),
    };

    Ok(DotEnvyConfig {
        server,
        database,
        auth,
    })
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup, key).with_context(|| format!("{key} is invalid"))
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match non_empty(lookup, key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} is invalid")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_fill_optional_values() {
        let config = from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost:5432/subscriptions"),
            ("JWT_SECRET", "supersecretjwtsecretforunittesting123"),
        ]))
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.body_limit, 10);
        assert_eq!(config.server.timeout, 30);
        assert_eq!(config.auth.jwt_ttl_seconds, 86_400);
        assert_eq!(config.auth.admin_username, "admin");
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = from_lookup(lookup_from(&[
            ("SERVER_PORT", "9000"),
            ("SERVER_TIMEOUT", "5"),
            ("DATABASE_URL", "postgres://db/subscriptions"),
            ("JWT_SECRET", "secret"),
            ("JWT_TTL_SECONDS", "3600"),
            ("ADMIN_USERNAME", "root"),
        ]))
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.timeout, 5);
        assert_eq!(config.auth.jwt_ttl_seconds, 3600);
        assert_eq!(config.auth.admin_username, "root");
    }

    #[test]
    fn missing_secret_names_the_variable() {
        let err = from_lookup(lookup_from(&[("DATABASE_URL", "postgres://db/x")])).unwrap_err();

        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn unparsable_port_is_an_error() {
        let err = from_lookup(lookup_from(&[
            ("SERVER_PORT", "eighty"),
            ("DATABASE_URL", "postgres://db/x"),
            ("JWT_SECRET", "secret"),
        ]))
        .unwrap_err();

        assert!(err.to_string().contains("SERVER_PORT"));
    }
}
