//! Field validation for the checkout form.
//!
//! Validators are pure: they run on every edit for live feedback and once more,
//! authoritatively, right before a submission is allowed to start.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum number of digits accepted in a phone number.
pub const MIN_PHONE_DIGITS: usize = 6;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    #[error("Name is required")]
    NameRequired,
    #[error("Name must contain only letters and spaces")]
    NameInvalidCharacters,
    #[error("Phone number is required")]
    PhoneRequired,
    #[error("Phone must contain only digits")]
    PhoneNotNumeric,
    #[error("Phone must be at least 6 digits")]
    PhoneTooShort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Phone,
}

pub fn validate_name(raw: &str) -> Result<(), FieldError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(FieldError::NameRequired);
    }
    if !name.chars().all(|c| c.is_ascii_alphabetic() || c == ' ') {
        return Err(FieldError::NameInvalidCharacters);
    }
    Ok(())
}

pub fn validate_phone(raw: &str) -> Result<(), FieldError> {
    let phone = raw.trim();
    if phone.is_empty() {
        return Err(FieldError::PhoneRequired);
    }
    if !phone.chars().all(|c| c.is_ascii_digit()) {
        return Err(FieldError::PhoneNotNumeric);
    }
    if phone.len() < MIN_PHONE_DIGITS {
        return Err(FieldError::PhoneTooShort);
    }
    Ok(())
}

/// Identity details typed in by the customer during checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub name: String,
    pub phone: String,
}

impl CustomerDetails {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
        }
    }
}

/// Per-field outcome of the most recent validation pass. `None` means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationState {
    pub name: Option<FieldError>,
    pub phone: Option<FieldError>,
}

impl ValidationState {
    pub fn check(details: &CustomerDetails) -> Self {
        Self {
            name: validate_name(&details.name).err(),
            phone: validate_phone(&details.phone).err(),
        }
    }

    pub fn revalidate(&mut self, field: Field, details: &CustomerDetails) {
        match field {
            Field::Name => self.name = validate_name(&details.name).err(),
            Field::Phone => self.phone = validate_phone(&details.phone).err(),
        }
    }

    /// The error text for `field`, or an empty string when it is valid.
    pub fn message(&self, field: Field) -> String {
        let error = match field {
            Field::Name => self.name,
            Field::Phone => self.phone,
        };
        error.map(|e| e.to_string()).unwrap_or_default()
    }

    pub fn is_valid(&self) -> bool {
        self.name.is_none() && self.phone.is_none()
    }

    /// All field errors joined into one line.
    pub fn summary(&self) -> String {
        [self.name, self.phone]
            .into_iter()
            .flatten()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Whether the form may be submitted: both fields filled in and both valid.
pub fn is_form_valid(details: &CustomerDetails) -> bool {
    !details.name.is_empty()
        && !details.phone.is_empty()
        && ValidationState::check(details).is_valid()
}
