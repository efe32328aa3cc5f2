//! Scan event model and the verdict/meal enums

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Meal slot declared by the scanning terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Meal {
    Breakfast,
    Lunch,
    Dinner,
}

impl Meal {
    /// Database/wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Meal::Breakfast => "BREAKFAST",
            Meal::Lunch => "LUNCH",
            Meal::Dinner => "DINNER",
        }
    }
}

impl fmt::Display for Meal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Meal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BREAKFAST" => Ok(Meal::Breakfast),
            "LUNCH" => Ok(Meal::Lunch),
            "DINNER" => Ok(Meal::Dinner),
            other => Err(format!(
                "invalid meal: {} (expected BREAKFAST, LUNCH or DINNER)",
                other
            )),
        }
    }
}

/// Outcome of one access decision, in strict precedence order
///
/// The ordering is a business-rule contract: the first matching rule wins
/// and determines the reason a denied member is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScanResult {
    Allowed,
    BlockedNoPayment,
    BlockedCut,
    BlockedStatus,
}

impl ScanResult {
    /// Database/wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanResult::Allowed => "ALLOWED",
            ScanResult::BlockedNoPayment => "BLOCKED_NO_PAYMENT",
            ScanResult::BlockedCut => "BLOCKED_CUT",
            ScanResult::BlockedStatus => "BLOCKED_STATUS",
        }
    }
}

impl fmt::Display for ScanResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScanResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ALLOWED" => Ok(ScanResult::Allowed),
            "BLOCKED_NO_PAYMENT" => Ok(ScanResult::BlockedNoPayment),
            "BLOCKED_CUT" => Ok(ScanResult::BlockedCut),
            "BLOCKED_STATUS" => Ok(ScanResult::BlockedStatus),
            other => Err(format!("unknown scan result: {}", other)),
        }
    }
}

/// Scan event entity: one immutable record per scan attempt, denials
/// included
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanEvent {
    pub id: Uuid,
    pub member_id: Uuid,
    pub meal: Meal,
    pub result: ScanResult,
    /// Server time of the scan, never client-supplied
    pub scanned_at: DateTime<Utc>,
    pub staff_token_id: Option<Uuid>,
    pub device_info: String,
}

/// New scan event payload
#[derive(Debug, Clone)]
pub struct NewScanEvent {
    pub member_id: Uuid,
    pub meal: Meal,
    pub result: ScanResult,
    pub staff_token_id: Option<Uuid>,
    pub device_info: String,
}
