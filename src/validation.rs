use crate::error::AppError;
use crate::models::types::DebrisType;
use base64::Engine;
use chrono::{DateTime, NaiveDateTime, Utc};

const MAX_NAME_LEN: usize = 64;
const MIN_PASSWORD_LEN: usize = 8;
const MAX_PHOTO_SIZE: usize = 2 * 1024 * 1024; // 2MiB decoded
const MAX_WEIGHT_KG: f64 = 10_000.0;
const MAX_REQUIRED_VOLUNTEERS: i64 = 500;
const MAX_PHOTOS_PER_LOG: usize = 10;
const VALID_LANGUAGES: &[&str] = &["en", "ms", "zh", "ta"];

pub fn validate_name(name: &str, field: &str) -> Result<String, AppError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest(format!("{} is required", field)));
    }
    Ok(trimmed.chars().take(MAX_NAME_LEN).collect())
}

pub fn validate_email(email: &str) -> Result<String, AppError> {
    let email = email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    };
    if valid {
        Ok(email)
    } else {
        Err(AppError::BadRequest(format!("Invalid email: {}", email)))
    }
}

pub fn validate_password(password: &str, confirm: &str) -> Result<(), AppError> {
    if password != confirm {
        return Err(AppError::BadRequest("Passwords don't match".into()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), AppError> {
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        Err(AppError::BadRequest("GPS coordinates out of range".into()))
    } else {
        Ok(())
    }
}

pub fn decode_photo(photo: Option<&str>) -> Result<Option<Vec<u8>>, AppError> {
    let encoded = match photo {
        Some(p) if !p.trim().is_empty() => p.trim(),
        _ => return Ok(None),
    };
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|_| AppError::BadRequest("Invalid photo encoding".into()))?;
    if decoded.len() > MAX_PHOTO_SIZE {
        return Err(AppError::BadRequest("Photo too large".into()));
    }
    Ok(Some(decoded))
}

pub fn validate_weight(weight: f64) -> Result<(), AppError> {
    if !weight.is_finite() || weight <= 0.0 {
        Err(AppError::BadRequest("Please enter the collected weight".into()))
    } else if weight > MAX_WEIGHT_KG {
        Err(AppError::BadRequest("Collected weight is implausibly large".into()))
    } else {
        Ok(())
    }
}

pub fn validate_photos(photos: &[String]) -> Result<(), AppError> {
    if photos.iter().all(|p| p.trim().is_empty()) {
        Err(AppError::BadRequest(
            "Please add at least one photo of the collected debris".into(),
        ))
    } else if photos.len() > MAX_PHOTOS_PER_LOG {
        Err(AppError::BadRequest(format!(
            "At most {} photos per task log",
            MAX_PHOTOS_PER_LOG
        )))
    } else {
        Ok(())
    }
}

pub fn validate_required_volunteers(count: i64) -> Result<(), AppError> {
    if count < 1 || count > MAX_REQUIRED_VOLUNTEERS {
        Err(AppError::BadRequest(format!(
            "Required volunteers must be 1-{}",
            MAX_REQUIRED_VOLUNTEERS
        )))
    } else {
        Ok(())
    }
}

pub fn validate_estimated_quantity(quantity: f64) -> Result<(), AppError> {
    if !quantity.is_finite() || quantity < 0.0 {
        Err(AppError::BadRequest("Estimated quantity cannot be negative".into()))
    } else {
        Ok(())
    }
}

/// Accepts RFC 3339, or a form-style `YYYY-MM-DDTHH:MM[:SS]` read as UTC.
pub fn parse_scheduled_at(value: &str) -> Result<DateTime<Utc>, AppError> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }
    Err(AppError::BadRequest(format!("Invalid date/time: {}", value)))
}

pub fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

pub fn parse_debris_types(csv: &str) -> Result<Vec<DebrisType>, AppError> {
    csv.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            DebrisType::parse(s)
                .ok_or_else(|| AppError::BadRequest(format!("Invalid debris type: {}", s)))
        })
        .collect()
}

pub fn validate_language(language: &str) -> Result<String, AppError> {
    let language = language.trim().to_lowercase();
    if VALID_LANGUAGES.contains(&language.as_str()) {
        Ok(language)
    } else {
        Err(AppError::BadRequest(format!("Unsupported language: {}", language)))
    }
}

pub fn clamp_limit(limit: Option<i64>, default: i64) -> i64 {
    limit.unwrap_or(default).min(100).max(1)
}
