//! Screening of caller-supplied contact forms.
//!
//! A submission goes through three gates, in order: the honeypot check,
//! the email shape check and the message presence check. Only then is a
//! sanitized [`Inquiry`] handed to the mailer.

use std::sync::LazyLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::Result;

/// Longest address the SMTP path accepts.
const MAX_EMAIL_LEN: usize = 254;
/// Message cap, matching the front-end form.
const MAX_MESSAGE_LEN: usize = 4000;
const MAX_NAME_LEN: usize = 100;

static EMAIL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("invalid email pattern")
});

/// Raw `POST /api/contact` body. `website` is the honeypot: it is hidden
/// on the form, so any content means an automated submission.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct ContactBody {
    #[validate(custom(
        function = "validate_email_shape",
        message = "Invalid email."
    ))]
    pub email: String,
    #[validate(custom(
        function = "validate_message",
        message = "Message required."
    ))]
    pub message: String,
    pub name: Option<String>,
    pub website: Option<String>,
}

/// Sanitized, validated form data. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Inquiry {
    pub sender_email: String,
    pub message: String,
    pub name: Option<String>,
}

/// Outcome of screening a submission.
#[derive(Debug)]
pub enum Screening {
    /// Honeypot triggered. Acknowledge without sending anything.
    Spam,
    Inquiry(Inquiry),
}

/// Trim and cap a field to `max` characters, as the form does client-side.
fn clamp(value: &str, max: usize) -> String {
    value.chars().take(max).collect::<String>().trim().to_owned()
}

fn validate_email_shape(value: &str) -> std::result::Result<(), ValidationError> {
    if EMAIL_SHAPE.is_match(&clamp(value, MAX_EMAIL_LEN)) {
        Ok(())
    } else {
        Err(ValidationError::new("email"))
    }
}

fn validate_message(value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("message"))
    } else {
        Ok(())
    }
}

impl ContactBody {
    /// Screen the submission: honeypot first, then field validation.
    pub fn screen(self) -> Result<Screening> {
        if self
            .website
            .as_deref()
            .is_some_and(|site| !site.trim().is_empty())
        {
            return Ok(Screening::Spam);
        }

        self.validate()?;

        Ok(Screening::Inquiry(Inquiry {
            sender_email: clamp(&self.email, MAX_EMAIL_LEN),
            message: clamp(&self.message, MAX_MESSAGE_LEN),
            name: self
                .name
                .as_deref()
                .map(|name| clamp(name, MAX_NAME_LEN))
                .filter(|name| !name.is_empty()),
        }))
    }
}
