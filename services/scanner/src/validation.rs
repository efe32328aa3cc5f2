//! Input validation utilities

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use std::sync::OnceLock;

/// Validate a staff token label
pub fn validate_token_label(label: &str) -> Result<(), String> {
    let label = label.trim();

    if label.len() < 3 {
        return Err("Token label must be at least 3 characters long".to_string());
    }

    if label.len() > 100 {
        return Err("Token label must be at most 100 characters long".to_string());
    }

    static LABEL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = LABEL_REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9\s\-_]+$").expect("Failed to compile label regex")
    });

    if !regex.is_match(label) {
        return Err(
            "Token label can only contain letters, numbers, spaces, hyphens, and underscores"
                .to_string(),
        );
    }

    Ok(())
}

/// Validate a payment cycle date range
pub fn validate_payment_cycle(
    cycle_start: NaiveDate,
    cycle_end: NaiveDate,
    today: NaiveDate,
) -> Result<(), String> {
    if cycle_start >= cycle_end {
        return Err("Cycle start date must be before cycle end date".to_string());
    }

    let duration = (cycle_end - cycle_start).num_days();
    if duration < 15 {
        return Err("Payment cycle must be at least 15 days".to_string());
    }
    if duration > 365 {
        return Err("Payment cycle cannot exceed 365 days".to_string());
    }

    if cycle_start < today - chrono::Duration::days(30) {
        return Err("Cycle start date cannot be more than 30 days in the past".to_string());
    }
    if cycle_end > today + chrono::Duration::days(365) {
        return Err("Cycle end date cannot be more than 365 days in the future".to_string());
    }

    Ok(())
}

/// Validate a payment amount
pub fn validate_payment_amount(amount: Decimal) -> Result<(), String> {
    if amount < Decimal::new(100, 0) {
        return Err("Payment amount is below the minimum of 100".to_string());
    }
    if amount > Decimal::new(50_000, 0) {
        return Err("Payment amount exceeds the maximum of 50000".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).expect("valid date")
    }

    #[test]
    fn test_token_label_rules() {
        assert!(validate_token_label("Front gate tablet").is_ok());
        assert!(validate_token_label("scanner_02").is_ok());
        assert!(validate_token_label("ab").is_err());
        assert!(validate_token_label("front@gate").is_err());
        assert!(validate_token_label(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_payment_cycle_rules() {
        let today = d(2026, 3, 5);
        assert!(validate_payment_cycle(d(2026, 3, 1), d(2026, 3, 31), today).is_ok());
        // Inverted and degenerate ranges
        assert!(validate_payment_cycle(d(2026, 3, 31), d(2026, 3, 1), today).is_err());
        assert!(validate_payment_cycle(d(2026, 3, 1), d(2026, 3, 1), today).is_err());
        // Too short, too long
        assert!(validate_payment_cycle(d(2026, 3, 1), d(2026, 3, 10), today).is_err());
        assert!(validate_payment_cycle(d(2026, 3, 1), d(2027, 3, 15), today).is_err());
        // Too far in the past
        assert!(validate_payment_cycle(d(2026, 1, 1), d(2026, 1, 31), today).is_err());
    }

    #[test]
    fn test_payment_amount_bounds() {
        assert!(validate_payment_amount(Decimal::new(3_500, 0)).is_ok());
        assert!(validate_payment_amount(Decimal::new(99, 0)).is_err());
        assert!(validate_payment_amount(Decimal::new(50_001, 0)).is_err());
    }
}
