use std::sync::{Arc, LazyLock};

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use regex::Regex;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::{
    AppState,
    error::{AppError, AppResult},
};

pub const MISSING_FIELDS: &str = "Alle felter skal udfyldes";
pub const INVALID_EMAIL: &str = "Ugyldig e-mailadresse";

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

/// A contact message with every field present and trimmed.
#[derive(Debug, PartialEq)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactRequest {
    pub fn validate(self) -> AppResult<ContactMessage> {
        let field = |v: Option<String>| {
            v.map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .ok_or_else(|| AppError::validation(MISSING_FIELDS))
        };
        let msg = ContactMessage {
            name: field(self.name)?,
            email: field(self.email)?,
            subject: field(self.subject)?,
            message: field(self.message)?,
        };
        if !EMAIL.is_match(&msg.email) {
            return Err(AppError::validation(INVALID_EMAIL));
        }
        Ok(msg)
    }
}

pub async fn submit(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ContactRequest>, JsonRejection>,
) -> AppResult<Json<Value>> {
    let Json(req) = body.map_err(|_| AppError::validation(MISSING_FIELDS))?;
    let msg = req.validate()?;

    let email = state.mailer.email(
        &state.config.contact_to,
        format!("Kontaktformular: {}", msg.subject),
        format!("Fra: {} <{}>\n\n{}", msg.name, msg.email, msg.message),
        Some(msg.email.clone()),
    );
    let delivery = state.mailer.deliver(&email).await;
    info!(from = %msg.email, ?delivery, "contact message received");

    Ok(Json(json!({ "success": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, email: &str, subject: &str, message: &str) -> ContactRequest {
        ContactRequest {
            name: Some(name.into()),
            email: Some(email.into()),
            subject: Some(subject.into()),
            message: Some(message.into()),
        }
    }

    fn message_of(err: AppError) -> String {
        err.to_string()
    }

    #[test]
    fn blank_or_missing_fields_are_rejected() {
        let blank = request("Ida", "ida@example.dk", "   ", "Hej");
        assert_eq!(message_of(blank.validate().unwrap_err()), MISSING_FIELDS);

        let missing = ContactRequest { name: Some("Ida".into()), ..ContactRequest::default() };
        assert_eq!(message_of(missing.validate().unwrap_err()), MISSING_FIELDS);
    }

    #[test]
    fn email_shape_is_checked() {
        for bad in ["ida", "ida@example", "ida @example.dk", "@example.dk"] {
            let err = request("Ida", bad, "Emne", "Hej").validate().unwrap_err();
            assert_eq!(message_of(err), INVALID_EMAIL, "{bad}");
        }
    }

    #[test]
    fn valid_message_is_trimmed() {
        let msg = request(" Ida ", "ida@example.dk", "Emne", " Hej ").validate().unwrap();
        assert_eq!(msg.name, "Ida");
        assert_eq!(msg.message, "Hej");
    }
}
