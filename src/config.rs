use std::{net::SocketAddr, str::FromStr};

use anyhow::Context;

/// How malformed numeric query parameters are treated.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ParamPolicy {
    /// Unparsable values constrain nothing.
    #[default]
    Lenient,
    /// Unparsable values are rejected with a 400.
    Strict,
}

impl FromStr for ParamPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(ParamPolicy::Lenient),
            "strict" => Ok(ParamPolicy::Strict),
            other => anyhow::bail!("unknown QUERY_PARAM_POLICY {other:?}"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    pub site_url: String,
    pub tmdb_access_token: String,
    pub tmdb_base_url: String,
    pub tmdb_rps: u32,
    pub tmdb_region: String,
    pub dr_list_url: Option<String>,
    pub admin_token: Option<String>,
    pub cron_secret: Option<String>,
    pub resend_api_key: Option<String>,
    pub resend_base_url: String,
    pub contact_from: String,
    pub contact_to: String,
    pub review_api_url: Option<String>,
    pub review_api_key: Option<String>,
    pub review_model: String,
    pub param_policy: ParamPolicy,
    pub cache_ttl_seconds: i64,
    pub streaming_refresh_batch: u64,
    pub review_batch: u64,
    pub health_check_batch: u64,
    pub icon_repair_batch: u64,
    pub import_max_pages: u32,
    pub max_concurrent: usize,
    pub blocked_tmdb_ids: Vec<i32>,
    pub blocked_dr_ids: Vec<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        let host = or("HOST", "0.0.0.0");
        let port: u16 = or("PORT", "3000").parse().context("PORT")?;

        let param_policy = match var("QUERY_PARAM_POLICY") {
            Some(raw) => raw.parse()?,
            None => ParamPolicy::default(),
        };

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            database_url: or("DATABASE_URL", "sqlite://boernespil.db?mode=rwc"),
            site_url: or("SITE_URL", "https://boernespil.dk").trim_end_matches('/').to_string(),
            tmdb_access_token: or("TMDB_ACCESS_TOKEN", ""),
            tmdb_base_url: or("TMDB_BASE_URL", "https://api.themoviedb.org/3"),
            tmdb_rps: parse_or(&var, "TMDB_RPS", 4),
            tmdb_region: or("TMDB_REGION", "DK").to_uppercase(),
            dr_list_url: var("DR_LIST_URL"),
            admin_token: var("ADMIN_TOKEN"),
            cron_secret: var("CRON_SECRET"),
            resend_api_key: var("RESEND_API_KEY"),
            resend_base_url: or("RESEND_BASE_URL", "https://api.resend.com"),
            contact_from: or("CONTACT_FROM", "Børnespil <kontakt@boernespil.dk>"),
            contact_to: or("CONTACT_TO", "redaktion@boernespil.dk"),
            review_api_url: var("REVIEW_API_URL"),
            review_api_key: var("REVIEW_API_KEY"),
            review_model: or("REVIEW_MODEL", "gpt-4o-mini"),
            param_policy,
            cache_ttl_seconds: parse_or(&var, "CACHE_TTL_SECONDS", 3600),
            streaming_refresh_batch: parse_or(&var, "STREAMING_REFRESH_BATCH", 50),
            review_batch: parse_or(&var, "REVIEW_BATCH", 5),
            health_check_batch: parse_or(&var, "HEALTH_CHECK_BATCH", 100),
            icon_repair_batch: parse_or(&var, "ICON_REPAIR_BATCH", 20),
            import_max_pages: parse_or(&var, "IMPORT_MAX_PAGES", 5),
            max_concurrent: parse_or(&var, "MAX_CONCURRENT_REQUESTS", 5),
            blocked_tmdb_ids: var("BLOCKED_TMDB_IDS")
                .map(|raw| split_list(&raw).filter_map(|id| id.parse().ok()).collect())
                .unwrap_or_default(),
            blocked_dr_ids: var("BLOCKED_DR_IDS")
                .map(|raw| split_list(&raw).map(str::to_string).collect())
                .unwrap_or_default(),
        })
    }
}

fn parse_or<T: FromStr>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    var(key).and_then(|s| s.trim().parse().ok()).unwrap_or(default)
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.addr.port(), 3000);
        assert_eq!(cfg.param_policy, ParamPolicy::Lenient);
        assert_eq!(cfg.tmdb_region, "DK");
        assert!(cfg.admin_token.is_none());
        assert_eq!(cfg.review_batch, 5);
    }

    #[test]
    fn blank_secrets_count_as_unset() {
        let cfg = config(&[("ADMIN_TOKEN", "  "), ("CRON_SECRET", "")]).unwrap();
        assert!(cfg.admin_token.is_none());
        assert!(cfg.cron_secret.is_none());
    }

    #[test]
    fn parses_blocklists_and_policy() {
        let cfg = config(&[
            ("BLOCKED_TMDB_IDS", "12, 34,x,"),
            ("BLOCKED_DR_IDS", "urn:dr:1 , urn:dr:2"),
            ("QUERY_PARAM_POLICY", "Strict"),
            ("SITE_URL", "https://example.dk/"),
        ])
        .unwrap();
        assert_eq!(cfg.blocked_tmdb_ids, vec![12, 34]);
        assert_eq!(cfg.blocked_dr_ids, vec!["urn:dr:1", "urn:dr:2"]);
        assert_eq!(cfg.param_policy, ParamPolicy::Strict);
        assert_eq!(cfg.site_url, "https://example.dk");
    }

    #[test]
    fn rejects_unknown_policy_and_bad_port() {
        assert!(config(&[("QUERY_PARAM_POLICY", "loose")]).is_err());
        assert!(config(&[("PORT", "http")]).is_err());
    }
}
