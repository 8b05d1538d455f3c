use std::env;
use std::path::PathBuf;

use serde::Serialize;

use crate::error::ConfigError;

/// Campus-wide billing constants handed to the calculation engine at
/// construction. Immutable once loaded, so tests can run against alternate
/// rate schedules without touching globals.
#[derive(Debug, Clone, Serialize)]
pub struct CampusRates {
    /// Denominator for every pro-rata share. Must be positive.
    pub total_sqft: u32,
    /// Campus-wide weekly rate in force during the arrears lookback window.
    pub historic_weekly_rate: f64,
    /// Campus-wide weekly rate for forward billing.
    pub current_weekly_rate: f64,
    /// Arrears lookback, in weeks (156 weeks = 36 months).
    pub arrears_weeks: u32,
    /// Cure period granted by the recorded declaration, in days.
    pub cure_period_days: u32,
}

impl Default for CampusRates {
    fn default() -> Self {
        Self {
            total_sqft: 672_718,
            historic_weekly_rate: 6_069.52,
            current_weekly_rate: 9_000.00,
            arrears_weeks: 156,
            cure_period_days: 15,
        }
    }
}

/// A named constant with its effective date, as persisted in the rates table.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RateEntry {
    pub label: &'static str,
    pub value: f64,
    pub effective_date: &'static str,
}

impl CampusRates {
    /// Load rates from `TRACKER_*` environment variables, falling back to the
    /// campaign defaults for anything unset.
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Self {
            total_sqft: env_u32("TRACKER_TOTAL_SQFT", defaults.total_sqft)?,
            historic_weekly_rate: env_f64(
                "TRACKER_HISTORIC_WEEKLY_RATE",
                defaults.historic_weekly_rate,
            )?,
            current_weekly_rate: env_f64(
                "TRACKER_CURRENT_WEEKLY_RATE",
                defaults.current_weekly_rate,
            )?,
            arrears_weeks: env_u32("TRACKER_ARREARS_WEEKS", defaults.arrears_weeks)?,
            cure_period_days: env_u32("TRACKER_CURE_PERIOD_DAYS", defaults.cure_period_days)?,
        }
        .validated()
    }

    /// Reject configurations the proration formula cannot work with.
    pub fn validated(self) -> Result<Self, ConfigError> {
        if self.total_sqft == 0 {
            return Err(ConfigError::ZeroCampusArea);
        }
        Ok(self)
    }

    /// The rows seeded into the persisted rates table on first open.
    pub fn rate_entries(&self) -> Vec<RateEntry> {
        vec![
            RateEntry {
                label: "Historic Campus Weekly Rate",
                value: self.historic_weekly_rate,
                effective_date: "2022-12-01",
            },
            RateEntry {
                label: "Current Campus Weekly Rate",
                value: self.current_weekly_rate,
                effective_date: "2026-01-01",
            },
            RateEntry {
                label: "Total Campus SqFt",
                value: f64::from(self.total_sqft),
                effective_date: "2022-12-01",
            },
            RateEntry {
                label: "Arrears Period (weeks)",
                value: f64::from(self.arrears_weeks),
                effective_date: "2022-12-01",
            },
            RateEntry {
                label: "Cure Period (days)",
                value: f64::from(self.cure_period_days),
                effective_date: "2011-05-05",
            },
        ]
    }
}

/// Top-level configuration for the tracker.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub rates: CampusRates,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let path = env::var("TRACKER_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("covenant-tracker.db"));
        let log_level = env::var("TRACKER_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            database: DatabaseConfig { path },
            rates: CampusRates::load()?,
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Location of the SQLite ledger file.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

fn env_u32(name: &'static str, default: u32) -> Result<u32, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidNumber { name, value: raw }),
        Err(_) => Ok(default),
    }
}

fn env_f64(name: &'static str, default: f64) -> Result<f64, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .map_err(|_| ConfigError::InvalidNumber { name, value: raw }),
        Err(_) => Ok(default),
    }
}
