use crate::cache::CacheWritePolicy;
use anyhow::{Context, Result, anyhow};
use shared::config::RedisConfig;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub run_migrations: bool,
    pub port: u16,
    pub db_max_conn: u32,
    pub db_min_conn: u32,
    /// `None` runs the distributed tier in memory.
    pub redis: Option<RedisConfig>,
    pub cache_ttl: Duration,
    pub cache_write_policy: CacheWritePolicy,
    pub request_timeout: Duration,
    pub otel_endpoint: Option<String>,
    pub is_dev: bool,
    pub enable_file_log: bool,
}

impl Config {
    pub fn init() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| anyhow!("Missing environment variable: {key}"))
        };

        let database_url = required("DATABASE_URL")?;
        let jwt_secret = required("JWT_SECRET")?;
        let port = required("PORT")?
            .parse::<u16>()
            .context("PORT must be a valid u16 integer")?;

        let run_migrations = match lookup("RUN_MIGRATIONS").as_deref() {
            None | Some("true") => true,
            Some("false") => false,
            Some(other) => {
                return Err(anyhow!(
                    "RUN_MIGRATIONS must be 'true' or 'false', got '{}'",
                    other
                ));
            }
        };

        let db_max_conn: u32 = parse_or(&lookup, "DB_MAX_CONNECTION", 5)?;
        let db_min_conn: u32 = parse_or(&lookup, "DB_MIN_CONNECTION", 1)?;

        let redis = match lookup("REDIS_HOST") {
            Some(host) if !host.is_empty() => Some(RedisConfig::new(
                host,
                parse_or(&lookup, "REDIS_PORT", 6379)?,
                parse_or(&lookup, "REDIS_DB", 0)?,
                lookup("REDIS_PASSWORD").filter(|pw| !pw.is_empty()),
                parse_or(&lookup, "REDIS_POOL_SIZE", 16)?,
            )),
            _ => None,
        };

        let cache_ttl = Duration::from_secs(parse_or(&lookup, "CACHE_TTL_SECS", 1800)?);
        let request_timeout = Duration::from_secs(parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 10)?);

        let cache_write_policy = match lookup("CACHE_WRITE_POLICY") {
            Some(raw) => raw.parse::<CacheWritePolicy>().map_err(|e| anyhow!(e))?,
            None => CacheWritePolicy::default(),
        };

        let otel_endpoint = lookup("OTEL_ENDPOINT").filter(|v| !v.is_empty());

        let is_dev = lookup("DEV_MODE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);
        let enable_file_log = lookup("ENABLE_FILE_LOG")
            .map(|v| v == "true")
            .unwrap_or(false);

        Ok(Self {
            database_url,
            jwt_secret,
            run_migrations,
            port,
            db_max_conn,
            db_min_conn,
            redis,
            cache_ttl,
            cache_write_policy,
            request_timeout,
            otel_endpoint,
            is_dev,
            enable_file_log,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Unable to parse {key}: '{raw}'")),
        None => Ok(default),
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

    const BASE: [(&str, &str); 3] = [
        ("DATABASE_URL", "postgres://localhost/orders"),
        ("JWT_SECRET", "secret"),
        ("PORT", "8080"),
    ];

    #[test]
    fn defaults_apply_when_optional_vars_are_missing() {
        let config = Config::from_lookup(lookup_from(&BASE)).unwrap();

        assert!(config.run_migrations);
        assert_eq!(config.db_max_conn, 5);
        assert_eq!(config.db_min_conn, 1);
        assert!(config.redis.is_none());
        assert_eq!(config.cache_ttl, Duration::from_secs(1800));
        assert_eq!(config.cache_write_policy, CacheWritePolicy::Strict);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert!(config.otel_endpoint.is_none());
    }

    #[test]
    fn missing_required_var_is_reported() {
        let err = Config::from_lookup(lookup_from(&BASE[..2])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn redis_and_policy_are_read() {
        let mut pairs = BASE.to_vec();
        pairs.extend([
            ("REDIS_HOST", "redis"),
            ("REDIS_PASSWORD", "pw"),
            ("REDIS_DB", "2"),
            ("CACHE_WRITE_POLICY", "best-effort"),
        ]);

        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();
        let redis = config.redis.unwrap();

        assert_eq!(redis.url(), "redis://:pw@redis:6379/2");
        assert_eq!(redis.pool_size, 16);
        assert_eq!(config.cache_write_policy, CacheWritePolicy::BestEffort);
    }

    #[test]
    fn bad_values_are_rejected() {
        let mut pairs = BASE.to_vec();
        pairs.push(("RUN_MIGRATIONS", "yes"));
        assert!(Config::from_lookup(lookup_from(&pairs)).is_err());

        let mut pairs = BASE.to_vec();
        pairs.push(("CACHE_WRITE_POLICY", "lazy"));
        assert!(Config::from_lookup(lookup_from(&pairs)).is_err());
    }
}
