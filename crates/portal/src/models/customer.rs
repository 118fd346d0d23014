//! Customer domain types.
//!
//! [`Customer`] is the read model returned to clients; it has no password
//! field, so no serialization path can leak a hash. Request bodies arrive as
//! loosely-typed inputs ([`Registration`], [`CustomerPatch`]) and become a
//! validated [`CustomerFields`] only after every constraint has been checked,
//! with all violations reported together.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use broker_portal_core::{CustomerId, CustomerType, Email, EmailError, Password};

/// Postal address attached to a customer.
///
/// Every component is optional. When used as patch input, a component that
/// is `None` is left untouched and an empty string clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl Address {
    /// Merge the components present in `patch` into this address.
    pub fn merge(&mut self, patch: &Self) {
        merge_component(&mut self.street, patch.street.as_deref());
        merge_component(&mut self.city, patch.city.as_deref());
        merge_component(&mut self.state, patch.state.as_deref());
        merge_component(&mut self.zip_code, patch.zip_code.as_deref());
        merge_component(&mut self.country, patch.country.as_deref());
    }

    /// Build a trimmed address from raw input.
    #[must_use]
    pub fn normalized(raw: &Self) -> Self {
        let mut address = Self::default();
        address.merge(raw);
        address
    }

    /// Returns `true` if no component is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.street.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.zip_code.is_none()
            && self.country.is_none()
    }
}

fn merge_component(slot: &mut Option<String>, value: Option<&str>) {
    if let Some(value) = value {
        *slot = optional_text(value);
    }
}

/// A stored customer, as returned by every read path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    pub address: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    pub customer_type: CustomerType,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// The mutable field set of this customer.
    #[must_use]
    pub fn fields(&self) -> CustomerFields {
        CustomerFields {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            phone_number: self.phone_number.clone(),
            address: self.address.clone(),
            date_of_birth: self.date_of_birth,
            customer_type: self.customer_type,
            is_active: self.is_active,
        }
    }
}

/// A fully validated set of customer fields, ready to be written.
///
/// Excludes the identifier, timestamps and password, which the store and the
/// password flow manage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerFields {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone_number: Option<String>,
    pub address: Address,
    pub date_of_birth: Option<NaiveDate>,
    pub customer_type: CustomerType,
    pub is_active: bool,
}

/// A customer to insert, with its password already hashed.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub fields: CustomerFields,
    pub password_hash: String,
}

/// Registration request body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<Address>,
    pub date_of_birth: Option<String>,
    pub customer_type: Option<String>,
}

impl Registration {
    /// Validate the registration, returning the normalised fields and the
    /// accepted plaintext password.
    ///
    /// # Errors
    ///
    /// Returns every violated constraint as a human-readable message.
    pub fn validate(&self) -> Result<(CustomerFields, Password), Vec<String>> {
        let mut errors = Vec::new();

        let first_name = collect(
            &mut errors,
            required_text(self.first_name.as_deref(), "First name"),
        );
        let last_name = collect(
            &mut errors,
            required_text(self.last_name.as_deref(), "Last name"),
        );
        let email = collect(&mut errors, required_email(self.email.as_deref()));
        let password = collect(&mut errors, required_password(self.password.as_deref()));
        let date_of_birth = collect(
            &mut errors,
            self.date_of_birth
                .as_deref()
                .map_or(Ok(None), parse_date_of_birth),
        );
        let customer_type = collect(
            &mut errors,
            self.customer_type
                .as_deref()
                .map_or(Ok(CustomerType::default()), parse_customer_type),
        );

        match (
            first_name,
            last_name,
            email,
            password,
            date_of_birth,
            customer_type,
        ) {
            (
                Some(first_name),
                Some(last_name),
                Some(email),
                Some(password),
                Some(date_of_birth),
                Some(customer_type),
            ) if errors.is_empty() => Ok((
                CustomerFields {
                    first_name,
                    last_name,
                    email,
                    phone_number: self.phone_number.as_deref().and_then(optional_text),
                    address: self
                        .address
                        .as_ref()
                        .map(Address::normalized)
                        .unwrap_or_default(),
                    date_of_birth,
                    customer_type,
                    is_active: true,
                },
                password,
            )),
            _ => Err(errors),
        }
    }
}

/// Self-service profile update body.
///
/// Only these keys can be changed by the customer; anything else in the
/// body (including `email` and `password`) is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<Address>,
    pub date_of_birth: Option<String>,
    pub customer_type: Option<String>,
}

impl From<ProfileUpdate> for CustomerPatch {
    fn from(update: ProfileUpdate) -> Self {
        Self {
            first_name: update.first_name,
            last_name: update.last_name,
            email: None,
            phone_number: update.phone_number,
            address: update.address,
            date_of_birth: update.date_of_birth,
            customer_type: update.customer_type,
            is_active: None,
        }
    }
}

/// Errors raised while reading an admin update payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatchPayloadError {
    /// The payload tried to set the password.
    #[error("password cannot be updated through this route")]
    PasswordNotAllowed,
    /// The payload has the wrong shape (e.g. a number where text belongs).
    #[error("invalid request body: {0}")]
    Malformed(String),
}

/// A partial update over every mutable customer field except the password.
///
/// Fields left as `None` keep their stored value. `address` is merged
/// component by component.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<Address>,
    pub date_of_birth: Option<String>,
    pub customer_type: Option<String>,
    pub is_active: Option<bool>,
}

impl CustomerPatch {
    /// Read an admin update payload.
    ///
    /// # Errors
    ///
    /// Returns [`PatchPayloadError::PasswordNotAllowed`] if the payload has a
    /// `password` key (whatever its value), and
    /// [`PatchPayloadError::Malformed`] if a known key has the wrong type.
    pub fn from_admin_payload(payload: Map<String, Value>) -> Result<Self, PatchPayloadError> {
        if payload.contains_key("password") {
            return Err(PatchPayloadError::PasswordNotAllowed);
        }

        serde_json::from_value(Value::Object(payload))
            .map_err(|e| PatchPayloadError::Malformed(e.to_string()))
    }

    /// Apply this patch on top of `current`, validating the merged result.
    ///
    /// # Errors
    ///
    /// Returns every violated constraint; `current` is never modified.
    pub fn apply_to(&self, current: &CustomerFields) -> Result<CustomerFields, Vec<String>> {
        let mut errors = Vec::new();
        let mut merged = current.clone();

        if let Some(value) = self.first_name.as_deref()
            && let Some(name) = collect(&mut errors, required_text(Some(value), "First name"))
        {
            merged.first_name = name;
        }
        if let Some(value) = self.last_name.as_deref()
            && let Some(name) = collect(&mut errors, required_text(Some(value), "Last name"))
        {
            merged.last_name = name;
        }
        if let Some(value) = self.email.as_deref()
            && let Some(email) = collect(&mut errors, required_email(Some(value)))
        {
            merged.email = email;
        }
        if let Some(value) = self.phone_number.as_deref() {
            merged.phone_number = optional_text(value);
        }
        if let Some(address) = &self.address {
            merged.address.merge(address);
        }
        if let Some(value) = self.date_of_birth.as_deref()
            && let Some(date) = collect(&mut errors, parse_date_of_birth(value))
        {
            merged.date_of_birth = date;
        }
        if let Some(value) = self.customer_type.as_deref()
            && let Some(kind) = collect(&mut errors, parse_customer_type(value))
        {
            merged.customer_type = kind;
        }
        if let Some(active) = self.is_active {
            merged.is_active = active;
        }

        if errors.is_empty() {
            Ok(merged)
        } else {
            Err(errors)
        }
    }
}

// =============================================================================
// Field rules
// =============================================================================

fn collect<T>(errors: &mut Vec<String>, result: Result<T, String>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(message) => {
            errors.push(message);
            None
        }
    }
}

/// Trim a value, mapping blank input to `None`.
fn optional_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

fn required_text(value: Option<&str>, label: &str) -> Result<String, String> {
    value
        .and_then(optional_text)
        .ok_or_else(|| format!("{label} is required"))
}

fn required_email(value: Option<&str>) -> Result<Email, String> {
    match Email::parse(value.unwrap_or_default()) {
        Ok(email) => Ok(email),
        Err(EmailError::Empty) => Err("Email is required".to_owned()),
        Err(_) => Err("Please provide a valid email".to_owned()),
    }
}

fn required_password(value: Option<&str>) -> Result<Password, String> {
    match value {
        None | Some("") => Err("Password is required".to_owned()),
        Some(raw) => Password::parse(raw).map_err(|_| {
            format!(
                "Password must be at least {} characters",
                Password::MIN_LENGTH
            )
        }),
    }
}

/// Parse a date of birth given as `YYYY-MM-DD` or as an RFC 3339 timestamp
/// (what a browser `Date` serializes to). Blank input clears the date.
fn parse_date_of_birth(value: &str) -> Result<Option<NaiveDate>, String> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|dt| dt.date_naive()))
        .map(Some)
        .map_err(|_| "Date of birth must be a valid date (YYYY-MM-DD)".to_owned())
}

fn parse_customer_type(value: &str) -> Result<CustomerType, String> {
    value
        .parse()
        .map_err(|_| "Customer type must be either Individual or Business".to_owned())
}
