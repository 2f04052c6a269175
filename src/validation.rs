//! Canonical input rules shared by every form of the application.
//!
//! Each check is a pure function returning the [`ValidationError`] whose text
//! is shown to the user. The `*_rule` adapters expose the same checks to
//! `validator` derives.

use crate::error::ValidationError;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use lazy_static::lazy_static;
use regex::Regex;
use std::borrow::Cow;

pub const MIN_SLOT_MINUTES: i64 = 60;
pub const MAX_SLOT_MINUTES: i64 = 720;
pub const MIN_DESCRIPTION_CHARS: usize = 50;
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
pub const ACCEPTED_IMAGE_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

const PHONE_DIGITS: usize = 9;
const RUT_MIN_DIGITS: usize = 7;
// 8 body digits plus the check digit
const RUT_MAX_CHARS: usize = 9;

lazy_static! {
    static ref PHONE: Regex = Regex::new(r"^(9\d{8}|22\d{7})$").unwrap();
    static ref NON_DIGIT: Regex = Regex::new(r"\D").unwrap();
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::MissingDate => "missing_date",
            ValidationError::PastDate => "past_date",
            ValidationError::StartBeforeNow => "start_before_now",
            ValidationError::TooShort => "too_short",
            ValidationError::TooLong => "too_long",
            ValidationError::InvalidPhone => "invalid_phone",
            ValidationError::DescriptionTooShort => "description_too_short",
            ValidationError::InvalidRut => "invalid_rut",
            ValidationError::UnsupportedImageType => "unsupported_image_type",
            ValidationError::ImageTooLarge => "image_too_large",
            ValidationError::MissingService => "missing_service",
            ValidationError::InvalidPrice => "invalid_price",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        let err = match code {
            "missing_date" => ValidationError::MissingDate,
            "past_date" => ValidationError::PastDate,
            "start_before_now" => ValidationError::StartBeforeNow,
            "too_short" => ValidationError::TooShort,
            "too_long" => ValidationError::TooLong,
            "invalid_phone" => ValidationError::InvalidPhone,
            "description_too_short" => ValidationError::DescriptionTooShort,
            "invalid_rut" => ValidationError::InvalidRut,
            "unsupported_image_type" => ValidationError::UnsupportedImageType,
            "image_too_large" => ValidationError::ImageTooLarge,
            "missing_service" => ValidationError::MissingService,
            "invalid_price" => ValidationError::InvalidPrice,
            _ => return None,
        };
        Some(err)
    }
}

/// Checks a slot about to be created.
///
/// The date is required and may not lie before `now`'s day. For today the
/// start has to be at or after the current time. The window has to last
/// between one and twelve hours; an end before the start counts as too short.
pub fn validate_slot_window(
    date: Option<NaiveDate>,
    start: NaiveTime,
    end: NaiveTime,
    now: NaiveDateTime,
) -> Result<(), ValidationError> {
    let date = date.ok_or(ValidationError::MissingDate)?;
    let today = now.date();

    if date < today {
        return Err(ValidationError::PastDate);
    }
    if date == today && start < now.time() {
        return Err(ValidationError::StartBeforeNow);
    }

    let minutes = (end - start).num_minutes();
    if minutes < MIN_SLOT_MINUTES {
        return Err(ValidationError::TooShort);
    }
    if minutes > MAX_SLOT_MINUTES {
        return Err(ValidationError::TooLong);
    }
    Ok(())
}

/// A date can be picked in the calendar when it is today or later.
pub fn validate_selectable_date(date: NaiveDate, today: NaiveDate) -> Result<(), ValidationError> {
    if date < today {
        return Err(ValidationError::PastDate);
    }
    Ok(())
}

pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if PHONE.is_match(phone.trim()) {
        Ok(())
    } else {
        Err(ValidationError::InvalidPhone)
    }
}

pub fn validate_description(description: &str) -> Result<(), ValidationError> {
    if description.trim().chars().count() < MIN_DESCRIPTION_CHARS {
        return Err(ValidationError::DescriptionTooShort);
    }
    Ok(())
}

pub fn validate_image(mime: &str, size: usize) -> Result<(), ValidationError> {
    if !ACCEPTED_IMAGE_TYPES.contains(&mime) {
        return Err(ValidationError::UnsupportedImageType);
    }
    if size > MAX_IMAGE_BYTES {
        return Err(ValidationError::ImageTooLarge);
    }
    Ok(())
}

pub fn validate_price(price: f64) -> Result<(), ValidationError> {
    if price.is_finite() && price > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidPrice)
    }
}

/// What the phone input keeps while typing: digits only, at most nine.
pub fn sanitize_phone_input(raw: &str) -> String {
    NON_DIGIT.replace_all(raw, "").chars().take(PHONE_DIGITS).collect()
}

/// Validates and prefixes the country code, `912345678` -> `+56912345678`.
pub fn normalize_phone(phone: &str) -> Result<String, ValidationError> {
    let phone = phone.trim();
    validate_phone(phone)?;
    Ok(format!("+56{phone}"))
}

/// `912345678` or `+56912345678` -> `+56 9 1234 5678`. Anything else is
/// returned unchanged.
pub fn format_phone_display(phone: &str) -> String {
    let digits = NON_DIGIT.replace_all(phone, "");
    let local = match digits.strip_prefix("56") {
        Some(rest) if digits.len() == 11 => rest,
        _ => &digits[..],
    };
    if local.len() != PHONE_DIGITS {
        return phone.to_string();
    }
    format!("+56 {} {} {}", &local[..1], &local[1..5], &local[5..])
}

/// Digits plus an optional trailing `K` check digit, uppercased.
fn clean_rut(raw: &str) -> String {
    let upper = raw.trim().to_uppercase();
    let ends_with_k = upper.ends_with('K');
    let mut cleaned: String = upper.chars().filter(char::is_ascii_digit).collect();
    if ends_with_k {
        cleaned.push('K');
    }
    cleaned
}

/// What the RUT input keeps while typing.
pub fn sanitize_rut_input(raw: &str) -> String {
    clean_rut(raw).chars().take(RUT_MAX_CHARS).collect()
}

pub fn validate_rut(rut: &str) -> Result<(), ValidationError> {
    let digits = clean_rut(rut).chars().filter(char::is_ascii_digit).count();
    if digits < RUT_MIN_DIGITS {
        return Err(ValidationError::InvalidRut);
    }
    Ok(())
}

/// `123456785` -> `12.345.678-5`.
pub fn format_rut(rut: &str) -> String {
    let cleaned = sanitize_rut_input(rut);
    if cleaned.len() < 2 {
        return cleaned;
    }
    let (body, check_digit) = cleaned.split_at(cleaned.len() - 1);

    let mut grouped = String::with_capacity(body.len() + body.len() / 3);
    for (index, digit) in body.chars().enumerate() {
        if index > 0 && (body.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }
    format!("{grouped}-{check_digit}")
}

pub fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

fn into_field_error(err: ValidationError) -> validator::ValidationError {
    validator::ValidationError::new(err.code()).with_message(Cow::Owned(err.to_string()))
}

pub(crate) fn phone_rule(phone: &str) -> Result<(), validator::ValidationError> {
    validate_phone(phone).map_err(into_field_error)
}

pub(crate) fn description_rule(description: &str) -> Result<(), validator::ValidationError> {
    validate_description(description).map_err(into_field_error)
}

pub(crate) fn price_rule(price: f64) -> Result<(), validator::ValidationError> {
    validate_price(price).map_err(into_field_error)
}

/// First failing rule of `fields`, checked in the given order.
pub(crate) fn first_failure(
    errors: &validator::ValidationErrors,
    fields: &[&str],
) -> Option<ValidationError> {
    let field_errors = errors.field_errors();
    fields.iter().find_map(|field| {
        field_errors
            .get(*field)
            .and_then(|errs| errs.first())
            .and_then(|err| ValidationError::from_code(&err.code))
    })
}
