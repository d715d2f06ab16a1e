//! Page text to numbers
//!
//! Each parser accepts exactly one documented text shape. Anything else is an
//! `UnexpectedPageFormat`, never a default value.

use crate::error::{RefreshError, Result};
use regex::Regex;
use std::sync::LazyLock;

static RELATIVE_DIFFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^\s*(?P<subject>.+?)\s+(?:is|are)\s+(?P<delta>[0-9][0-9,]*(?:\.[0-9]+)?)\s*%\s+(?P<qualifier>[a-z]+)\s+than\s+(?:in\s+)?(?P<reference>.+?)\.?\s*$")
        .expect("valid regex")
});

static EQUIVALENT_SALARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)you would need around\s+(?P<target>\S+)\s+in\s+.+?\s+to maintain the same standard of life that you can have with\s+(?P<reference>\S+)\s+in\s+")
        .expect("valid regex")
});

/// Direction of a relative cost difference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Higher,
    Lower,
}

/// `"<subject> is N% higher|lower than <reference>"`
#[derive(Debug, Clone, PartialEq)]
pub struct RelativeDifference {
    pub percent: f64,
    pub direction: Direction,
}

impl RelativeDifference {
    /// Ratio of subject to reference cost
    pub fn ratio(&self) -> f64 {
        match self.direction {
            Direction::Higher => 1.0 + self.percent / 100.0,
            Direction::Lower => 1.0 - self.percent / 100.0,
        }
    }
}

/// Parse `"Cost of Living Including Rent in Netherlands is 2.05% lower than in United States"`
pub fn parse_relative_difference(text: &str) -> Result<RelativeDifference> {
    const EXPECTED: &str = "'<location> is N% higher|lower than <reference>'";
    let unexpected = || RefreshError::UnexpectedPageFormat { expected: EXPECTED, text: text.trim().to_string() };

    let caps = RELATIVE_DIFFERENCE.captures(text).ok_or_else(unexpected)?;
    let percent = parse_number(&caps["delta"]).ok_or_else(unexpected)?;
    let direction = match caps["qualifier"].to_ascii_lowercase().as_str() {
        "higher" => Direction::Higher,
        "lower" => Direction::Lower,
        _ => return Err(unexpected()),
    };
    // A cost cannot drop by all of it or more
    if direction == Direction::Lower && percent >= 100.0 {
        return Err(unexpected());
    }

    Ok(RelativeDifference { percent, direction })
}

/// Parse numbeo's equivalent salary sentence into `target / reference`
///
/// `"You would need around 3,806.8$ in Lisbon to maintain the same standard of
/// life that you can have with 7,930.0$ in New York, NY (assuming you rent in both cities)."`
pub fn parse_equivalent_salary_ratio(text: &str) -> Result<f64> {
    const EXPECTED: &str = "'You would need around X in <city> to maintain the same standard of life that you can have with Y in <reference>'";
    let unexpected = || RefreshError::UnexpectedPageFormat { expected: EXPECTED, text: text.trim().to_string() };

    let caps = EQUIVALENT_SALARY.captures(text).ok_or_else(unexpected)?;
    let target = parse_amount(&caps["target"]).ok_or_else(unexpected)?;
    let reference = parse_amount(&caps["reference"]).ok_or_else(unexpected)?;

    if reference <= 0.0 {
        return Err(unexpected());
    }
    Ok(target / reference)
}

/// Parse a plain decimal such as `"1.123456"`
pub fn parse_exchange_rate(text: &str) -> Result<f64> {
    let unexpected = || RefreshError::UnexpectedPageFormat { expected: "a positive decimal", text: text.trim().to_string() };

    let rate: f64 = text.trim().parse().map_err(|_| unexpected())?;
    if !rate.is_finite() || rate <= 0.0 {
        return Err(unexpected());
    }
    Ok(rate)
}

/// Parse a dollar amount such as `"$123,456"`
pub fn parse_salary(text: &str) -> Result<f64> {
    let unexpected = || RefreshError::UnexpectedPageFormat { expected: "a dollar amount like '$123,456'", text: text.trim().to_string() };

    let trimmed = text.trim();
    let digits = trimmed.strip_prefix('$').unwrap_or(trimmed);
    let salary = parse_number(digits).ok_or_else(unexpected)?;
    if salary <= 0.0 {
        return Err(unexpected());
    }
    Ok(salary)
}

/// Digits with optional thousands separators and decimal point
fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit() || c == ',' || c == '.') {
        return None;
    }
    text.replace(',', "").parse().ok().filter(|v: &f64| v.is_finite())
}

/// Amount with a currency symbol on either side, e.g. `"3,806.8$"` or `"€1,200"`
fn parse_amount(token: &str) -> Option<f64> {
    let number = token.trim_matches(|c: char| !c.is_ascii_digit());
    parse_number(number)
}
