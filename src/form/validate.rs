use std::sync::LazyLock;

use regex::Regex;

use crate::domain::ValidationKind;

use super::entity::{EntityValue, Scalar};
use super::error::{FormatIssue, SubmitError};
use super::notify::{Notice, Notifier};

const EMAIL_MAX_CHARS: usize = 100;
const NUMBER_MAX_CHARS: usize = 10;
const NUMBER_MAX: f64 = 999.0;
const PRICE_MAX_CHARS: usize = 100;
const PRICE_MAX_DECIMALS: usize = 2;
const PRICE_MAX: f64 = 9999.0;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern compiles"));
static USER_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_]+$").expect("user name pattern compiles"));
static DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d*\.?\d*$").expect("decimal pattern compiles"));
static LEADING_INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?\d+").expect("integer prefix pattern compiles"));
static LEADING_FLOAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?").expect("float prefix pattern compiles")
});

/// Report-through-notifier form of [`check_value`]: `true` means no
/// objection.
pub fn validate(
    value: Option<&EntityValue>,
    display_name: &str,
    kind: ValidationKind,
    notifier: &dyn Notifier,
) -> bool {
    match check_value(value, display_name, kind) {
        Ok(()) => true,
        Err(err) => {
            notifier.notify(Notice::Error(err.to_string()));
            false
        }
    }
}

/// Run one rule against a resolved value. Rules are independent and
/// stateless.
pub fn check_value(
    value: Option<&EntityValue>,
    display_name: &str,
    kind: ValidationKind,
) -> Result<(), SubmitError> {
    let format_err = |reason| SubmitError::FormatInvalid {
        field: display_name.to_string(),
        reason,
    };
    let present = value.filter(|value| value.is_truthy());

    match kind {
        ValidationKind::Email => {
            let Some(value) = present else {
                return Ok(());
            };
            let text = value.string_form().ok_or(format_err(FormatIssue::Email))?;
            if !is_email_shaped(&text) {
                return Err(format_err(FormatIssue::Email));
            }
        }
        ValidationKind::PhoneNumber => {
            let Some(value) = present else {
                return Ok(());
            };
            let text = value
                .string_form()
                .ok_or(format_err(FormatIssue::PhoneNumber))?;
            let digits = text.chars().filter(char::is_ascii_digit).count();
            if !(10..=11).contains(&digits) {
                return Err(format_err(FormatIssue::PhoneNumber));
            }
        }
        ValidationKind::UserName => match value {
            None | Some(EntityValue::Scalar(Scalar::Null)) => {}
            Some(EntityValue::Scalar(Scalar::Text(_))) => {
                return Err(format_err(FormatIssue::UserNameType));
            }
            Some(other) => {
                let matches = other
                    .string_form()
                    .is_some_and(|text| USER_NAME.is_match(&text));
                if !matches {
                    return Err(format_err(FormatIssue::UserNameCharset));
                }
            }
        },
        ValidationKind::CheckboxChecked => {
            if present.is_none() {
                return Err(SubmitError::Unchecked {
                    field: display_name.to_string(),
                });
            }
        }
        ValidationKind::Required => {
            if present.is_none() {
                return Err(SubmitError::MissingRequiredField {
                    field: display_name.to_string(),
                });
            }
        }
        ValidationKind::MaxLength(max) => {
            let Some(value) = present else {
                return Ok(());
            };
            let fits = value.as_text().is_some_and(|text| text.chars().count() <= max);
            if !fits {
                return Err(SubmitError::LengthExceeded {
                    field: display_name.to_string(),
                    max,
                });
            }
        }
        ValidationKind::Number => {
            if let Some(value) = present {
                let text = value
                    .string_form()
                    .ok_or(format_err(FormatIssue::NumberShape))?;
                if text.chars().count() > NUMBER_MAX_CHARS || !DECIMAL.is_match(&text) {
                    return Err(format_err(FormatIssue::NumberShape));
                }
            }
            if let Some(number) = value.and_then(leading_integer)
                && (number <= 0.0 || number > NUMBER_MAX)
            {
                return Err(format_err(FormatIssue::NumberRange));
            }
        }
        ValidationKind::Price => {
            if let Some(value) = present {
                let text = value
                    .string_form()
                    .ok_or(format_err(FormatIssue::PriceShape))?;
                if text.chars().count() > PRICE_MAX_CHARS || !DECIMAL.is_match(&text) {
                    return Err(format_err(FormatIssue::PriceShape));
                }
                let decimals = text.split('.').nth(1).map_or(0, str::len);
                if decimals > PRICE_MAX_DECIMALS {
                    return Err(format_err(FormatIssue::PriceShape));
                }
            }
            if let Some(price) = value.and_then(leading_float)
                && (price <= 0.0 || price > PRICE_MAX)
            {
                return Err(format_err(FormatIssue::PriceRange));
            }
        }
    }
    Ok(())
}

/// Text the Email rule accepts. Catalog inference uses the same test.
pub(crate) fn is_email_shaped(text: &str) -> bool {
    text.chars().count() <= EMAIL_MAX_CHARS && EMAIL.is_match(text)
}

/// Integer prefix of the value's string form; `None` when there is none.
fn leading_integer(value: &EntityValue) -> Option<f64> {
    let text = value.string_form()?;
    let prefix = LEADING_INTEGER.find(text.trim_start())?;
    prefix.as_str().parse::<f64>().ok()
}

/// Float prefix of the value's string form; `None` when there is none.
fn leading_float(value: &EntityValue) -> Option<f64> {
    let text = value.string_form()?;
    let prefix = LEADING_FLOAT.find(text.trim_start())?;
    prefix.as_str().parse::<f64>().ok()
}
