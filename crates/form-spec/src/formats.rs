use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use url::Url;

use crate::spec::validation::ValidationFormat;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));
static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[1-9][0-9]{0,15}$").expect("phone pattern"));
static DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("date pattern"));
static TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([01]?[0-9]|2[0-3]):[0-5][0-9]$").expect("time pattern"));
static DATETIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}$").expect("datetime pattern")
});
static POSTAL_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9\s-]{3,10}$").expect("postal code pattern"));
static CARD_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{13,19}$").expect("card number pattern"));

/// Checks `value` against a built-in format, returning the default message on failure.
pub fn check_format(value: &str, format: ValidationFormat) -> Result<(), &'static str> {
    match format {
        ValidationFormat::Email => require(EMAIL.is_match(value), "Invalid email format"),
        ValidationFormat::Url => require(Url::parse(value).is_ok(), "Invalid URL format"),
        ValidationFormat::Phone => {
            let digits = strip(value, |ch| ch.is_whitespace() || matches!(ch, '-' | '(' | ')'));
            require(PHONE.is_match(&digits), "Invalid phone number")
        }
        ValidationFormat::Date => {
            if !DATE.is_match(value) {
                return Err("Invalid date format (YYYY-MM-DD)");
            }
            let round_trips = NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .is_ok_and(|date| date.format("%Y-%m-%d").to_string() == value);
            require(round_trips, "Invalid date")
        }
        ValidationFormat::Time => require(TIME.is_match(value), "Invalid time format (HH:MM)"),
        ValidationFormat::Datetime => require(
            DATETIME.is_match(value),
            "Invalid datetime format (YYYY-MM-DDTHH:MM)",
        ),
        ValidationFormat::PostalCode => require(POSTAL_CODE.is_match(value), "Invalid postal code"),
        ValidationFormat::CreditCard => {
            let digits = strip(value, |ch| ch.is_whitespace() || ch == '-');
            require(CARD_NUMBER.is_match(&digits), "Invalid credit card number")
        }
    }
}

fn require(ok: bool, message: &'static str) -> Result<(), &'static str> {
    if ok { Ok(()) } else { Err(message) }
}

fn strip(value: &str, drop: impl Fn(char) -> bool) -> String {
    value.chars().filter(|ch| !drop(*ch)).collect()
}
