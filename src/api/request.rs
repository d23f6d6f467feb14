//! Request bodies and their validation.
//!
//! Every body deserializes into a struct of optional fields so that a missing
//! field is reported with the endpoint's own message, then `validate()` turns
//! it into an already-checked value for the service layer.

use chrono::NaiveDateTime;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::date::parse_iso8601;
use crate::database::models::{EventChanges, NewEvent};
use crate::database::repository::EVENT_NOT_FOUND;
use crate::error::ApiError;

pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MAX_EMAIL_LENGTH: usize = 120;
pub const MAX_TITLE_LENGTH: usize = 200;

const INVALID_DATE: &str = "Invalid date format. Use ISO 8601 (YYYY-MM-DDTHH:MM:SS)";

#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateEventRequest {
    pub title: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateParticipantRequest {
    pub event_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateParticipantRequest {
    pub event_id: Option<String>,
}

/// Checked registration input, password still in clear text
#[derive(Debug)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(self) -> Result<Credentials, ApiError> {
        let (email, password) = match (self.email, self.password) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => (email, password),
            _ => return Err(ApiError::validation("Email and password are required")),
        };

        validate_email(&email)?;

        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ApiError::validation(format!(
                "Password must be at least {} characters long",
                MIN_PASSWORD_LENGTH
            )));
        }

        Ok(Credentials { email, password })
    }
}

impl LoginRequest {
    pub fn validate(self) -> Result<Credentials, ApiError> {
        match (self.email, self.password) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Ok(Credentials { email, password })
            }
            _ => Err(ApiError::validation("Email and password are required")),
        }
    }
}

impl CreateEventRequest {
    pub fn validate(self) -> Result<NewEvent, ApiError> {
        let (title, date) = match (self.title, self.date) {
            (Some(title), Some(date)) if !title.trim().is_empty() && !date.trim().is_empty() => (title, date),
            _ => return Err(ApiError::validation("Title and date are required")),
        };

        Ok(NewEvent {
            title: validate_title(title)?,
            date: validate_date(&date)?,
        })
    }
}

impl UpdateEventRequest {
    pub fn validate(self) -> Result<EventChanges, ApiError> {
        Ok(EventChanges {
            title: self.title.map(validate_title).transpose()?,
            date: self.date.as_deref().map(validate_date).transpose()?,
        })
    }
}

impl CreateParticipantRequest {
    pub fn validate(self) -> Result<Uuid, ApiError> {
        match self.event_id {
            Some(raw) if !raw.trim().is_empty() => parse_event_id(&raw),
            _ => Err(ApiError::validation("event_id is required")),
        }
    }
}

impl UpdateParticipantRequest {
    pub fn validate(self) -> Result<Option<Uuid>, ApiError> {
        self.event_id.as_deref().map(parse_event_id).transpose()
    }
}

/// `local@domain.tld`: one `@`, no whitespace, dotted domain with an alphabetic TLD.
pub fn validate_email(email: &str) -> Result<(), ApiError> {
    let invalid = || ApiError::validation("Invalid email format");

    if email.len() > MAX_EMAIL_LENGTH || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(invalid());
    }

    let tld = labels[labels.len() - 1];
    if tld.len() < 2 || !tld.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(invalid());
    }

    Ok(())
}

fn validate_title(title: String) -> Result<String, ApiError> {
    if title.trim().is_empty() {
        return Err(ApiError::validation("Title cannot be empty"));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(ApiError::validation(format!(
            "Title must be at most {} characters",
            MAX_TITLE_LENGTH
        )));
    }
    Ok(title)
}

fn validate_date(raw: &str) -> Result<NaiveDateTime, ApiError> {
    parse_iso8601(raw).ok_or_else(|| ApiError::validation(INVALID_DATE))
}

/// A string that is not a UUID cannot name an existing event.
fn parse_event_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::not_found(EVENT_NOT_FOUND))
}
