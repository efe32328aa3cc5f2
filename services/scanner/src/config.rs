//! Scanner service configuration

use anyhow::Result;
use chrono::NaiveTime;
use chrono_tz::Tz;
use mess::cutoff::MealWindows;
use std::env;

/// Minimum length of the credential signing secret
const MIN_SECRET_LEN: usize = 32;

/// Scanner service configuration
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Address the HTTP server binds to
    pub bind_addr: String,
    /// Shared secret signing member QR credentials
    pub qr_secret: String,
    /// Static bearer token guarding the admin routes
    pub admin_token: String,
    /// Facility timezone; all cutoff and meal-window arithmetic happens here
    pub timezone: Tz,
    /// Time of day after which next-day mess cuts are locked in
    pub cutoff_time: NaiveTime,
    /// Serving window per meal
    pub meal_windows: MealWindows,
}

impl ScannerConfig {
    /// Create a new ScannerConfig from environment variables
    ///
    /// # Environment Variables
    /// - `QR_SECRET`: credential signing secret, at least 32 characters
    /// - `ADMIN_TOKEN`: bearer token for the admin routes
    /// - `MESS_TIMEZONE`: IANA timezone name (default: "Asia/Kolkata")
    /// - `MESS_CUTOFF_TIME`: cutoff time of day, `HH:MM` (default: "23:00")
    /// - `MEAL_WINDOW_BREAKFAST` / `MEAL_WINDOW_LUNCH` / `MEAL_WINDOW_DINNER`:
    ///   serving windows as `HH:MM-HH:MM` (defaults: 07:00-09:30,
    ///   12:00-14:30, 19:00-21:30)
    /// - `BIND_ADDR`: listen address (default: "0.0.0.0:3000")
    pub fn from_env() -> Result<Self> {
        let qr_secret = env::var("QR_SECRET")
            .map_err(|_| anyhow::anyhow!("QR_SECRET environment variable not set"))?;
        if qr_secret.len() < MIN_SECRET_LEN {
            anyhow::bail!("QR_SECRET must be at least {} characters", MIN_SECRET_LEN);
        }

        let admin_token = env::var("ADMIN_TOKEN")
            .map_err(|_| anyhow::anyhow!("ADMIN_TOKEN environment variable not set"))?;

        let timezone: Tz = env::var("MESS_TIMEZONE")
            .unwrap_or_else(|_| "Asia/Kolkata".to_string())
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid MESS_TIMEZONE: {}", e))?;

        let cutoff_time = parse_time(
            &env::var("MESS_CUTOFF_TIME").unwrap_or_else(|_| "23:00".to_string()),
        )
        .map_err(|e| anyhow::anyhow!("Invalid MESS_CUTOFF_TIME: {}", e))?;

        let defaults = MealWindows::default();
        let meal_windows = MealWindows {
            breakfast: window_from_env("MEAL_WINDOW_BREAKFAST", defaults.breakfast)?,
            lunch: window_from_env("MEAL_WINDOW_LUNCH", defaults.lunch)?,
            dinner: window_from_env("MEAL_WINDOW_DINNER", defaults.dinner)?,
        };

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        Ok(Self {
            bind_addr,
            qr_secret,
            admin_token,
            timezone,
            cutoff_time,
            meal_windows,
        })
    }
}

fn window_from_env(key: &str, default: (NaiveTime, NaiveTime)) -> Result<(NaiveTime, NaiveTime)> {
    match env::var(key) {
        Ok(raw) => parse_window(&raw).map_err(|e| anyhow::anyhow!("Invalid {}: {}", key, e)),
        Err(_) => Ok(default),
    }
}

fn parse_window(raw: &str) -> Result<(NaiveTime, NaiveTime), String> {
    let (start, end) = raw
        .split_once('-')
        .ok_or_else(|| format!("expected HH:MM-HH:MM, got {}", raw))?;
    let start = parse_time(start)?;
    let end = parse_time(end)?;
    if start >= end {
        return Err(format!("window start {} is not before end {}", start, end));
    }
    Ok((start, end))
}

fn parse_time(raw: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|_| format!("expected HH:MM, got {}", raw))
}
