use std::time::Duration;

use sales_assistant_core::query::RevenuePeriod;
use thiserror::Error;
use url::Url;

const DEFAULT_CARD_IMAGE_URL: &str =
    "https://s3.amazonaws.com/alexa-salesforce-demo-skill-images/sales_image.png";
const DEFAULT_LOGIN_URL: &str = "https://login.salesforce.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be set")]
    Missing { name: &'static str },
    #[error("{name} has invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Postgres schema holding the synced `opportunity` and `period` tables.
///
/// Interpolated into SQL text, so only plain identifiers are accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaName(String);

impl SchemaName {
    pub fn parse(value: &str) -> Option<Self> {
        let mut chars = value.chars();
        let first_ok = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        let rest_ok = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
        (first_ok && rest_ok && value.len() <= 63).then(|| Self(value.to_lowercase()))
    }

    /// Qualified table name, e.g. `salesforce.opportunity`.
    pub fn table(&self, table: &str) -> String {
        format!("{}.{}", self.0, table)
    }
}

/// Revenue report policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevenuePolicy {
    pub period: RevenuePeriod,
    pub probability_floor: f64,
    /// Count only opportunities that are still open. Off by default.
    pub open_only: bool,
}

impl Default for RevenuePolicy {
    fn default() -> Self {
        Self {
            period: RevenuePeriod::Quarter,
            probability_floor: 0.0,
            open_only: false,
        }
    }
}

/// Settings the dialog handlers read on every turn.
#[derive(Debug, Clone)]
pub struct DialogSettings {
    pub card_image_url: String,
    pub revenue: RevenuePolicy,
}

impl Default for DialogSettings {
    fn default() -> Self {
        Self {
            card_image_url: DEFAULT_CARD_IMAGE_URL.to_string(),
            revenue: RevenuePolicy::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SkillConfig {
    pub database_url: String,
    pub port: u16,
    pub schema: SchemaName,
    pub login_url: Url,
    pub session_ttl: Duration,
    pub dialog: DialogSettings,
}

impl SkillConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let invalid = |name: &'static str, value: String, reason: &'static str| {
            ConfigError::Invalid { name, value, reason }
        };

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing {
            name: "DATABASE_URL",
        })?;

        let port = match get("PORT") {
            Some(v) => v
                .parse()
                .map_err(|_| invalid("PORT", v, "expected a port number"))?,
            None => 8080,
        };

        let schema = {
            let v = get("SCHEMA_NAME").unwrap_or_else(|| "salesforce".to_string());
            SchemaName::parse(&v).ok_or_else(|| invalid("SCHEMA_NAME", v, "expected a plain SQL identifier"))?
        };

        let login_url = {
            let v = get("SALESFORCE_LOGIN_URL").unwrap_or_else(|| DEFAULT_LOGIN_URL.to_string());
            Url::parse(&v).map_err(|_| invalid("SALESFORCE_LOGIN_URL", v, "expected an absolute URL"))?
        };

        let session_ttl = match get("SESSION_TTL_SECS") {
            Some(v) => Duration::from_secs(
                v.parse()
                    .map_err(|_| invalid("SESSION_TTL_SECS", v, "expected whole seconds"))?,
            ),
            None => Duration::from_secs(3600),
        };

        let period = match get("REVENUE_PERIOD") {
            Some(v) => RevenuePeriod::parse(&v)
                .ok_or_else(|| invalid("REVENUE_PERIOD", v, "expected Month, Quarter or Year"))?,
            None => RevenuePeriod::Quarter,
        };

        let probability_floor = match get("REVENUE_PROBABILITY_FLOOR") {
            Some(v) => v
                .parse::<f64>()
                .ok()
                .filter(|p| (0.0..=100.0).contains(p))
                .ok_or_else(|| invalid("REVENUE_PROBABILITY_FLOOR", v, "expected a percentage between 0 and 100"))?,
            None => 0.0,
        };

        let open_only = get("REVENUE_OPEN_ONLY")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(Self {
            database_url,
            port,
            schema,
            login_url,
            session_ttl,
            dialog: DialogSettings {
                card_image_url: get("CARD_IMAGE_URL")
                    .unwrap_or_else(|| DEFAULT_CARD_IMAGE_URL.to_string()),
                revenue: RevenuePolicy {
                    period,
                    probability_floor,
                    open_only,
                },
            },
        })
    }
}
