//! Structural checks run on inbound DTOs before they reach a service.
//!
//! Violations are collected in evaluation order; a field may appear more than once and every
//! entry is reported.

use std::fmt;

use chrono::Utc;
use serde::Serialize;

use crate::dto::{CategoryDto, ProductDto, UserDto, UserInsertDto};

pub const PASSWORD_MIN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMessage {
    pub field_name: String,
    pub message: String,
}

/// Ordered list of field violations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldMessage>);

impl ValidationErrors {
    pub fn new() -> Self { Self::default() }

    /// Single-entry list, for violations detected outside a `Validate` impl.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut e = Self::new();
        e.add(field, message);
        e
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldMessage { field_name: field.into(), message: message.into() });
    }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn iter(&self) -> impl Iterator<Item = &FieldMessage> { self.0.iter() }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|m| format!("{}: {}", m.field_name, m.message)).collect();
        write!(f, "{}", parts.join("; "))
    }
}

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

fn is_blank(s: &str) -> bool { s.trim().is_empty() }

/// Lightweight shape check: one `@`, non-empty local part, dotted domain without spaces.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else { return false };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain.split('.').count() >= 2
        && domain.split('.').all(|label| !label.is_empty())
}

impl Validate for CategoryDto {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if is_blank(&self.name) {
            errors.add("name", "Required field");
        }
        errors.into_result()
    }
}

impl Validate for ProductDto {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if is_blank(&self.name) {
            errors.add("name", "Required field");
        }
        if !self.price.is_finite() || self.price < 0.0 {
            errors.add("price", "Price must not be negative");
        }
        if let Some(date) = self.date {
            if date > Utc::now() {
                errors.add("date", "Product date cannot be in the future");
            }
        }
        for (i, c) in self.categories.iter().enumerate() {
            if c.id.is_none() {
                errors.add(format!("categories[{}].id", i), "Category id is required");
            }
        }
        errors.into_result()
    }
}

impl UserDto {
    fn collect_violations(&self, errors: &mut ValidationErrors) {
        if is_blank(&self.first_name) {
            errors.add("firstName", "Required field");
        }
        if !is_valid_email(&self.email) {
            errors.add("email", "Please enter a valid email");
        }
        for (i, r) in self.roles.iter().enumerate() {
            if r.id.is_none() {
                errors.add(format!("roles[{}].id", i), "Role id is required");
            }
        }
    }
}

impl Validate for UserDto {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        self.collect_violations(&mut errors);
        errors.into_result()
    }
}

impl Validate for UserInsertDto {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        self.user.collect_violations(&mut errors);
        if self.password.chars().count() < PASSWORD_MIN {
            errors.add("password", format!("Password must have at least {} characters", PASSWORD_MIN));
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::{CategoryDto, RoleDto};
    use chrono::Duration;

    fn product() -> ProductDto {
        ProductDto {
            id: None,
            name: "Keyboard".into(),
            description: "Mechanical".into(),
            price: 50.0,
            img_url: "https://img.example.com/kb.png".into(),
            date: None,
            categories: vec![CategoryDto { id: Some(10), name: String::new() }],
        }
    }

    #[test]
    fn valid_product_passes() {
        assert!(product().validate().is_ok());
    }

    #[test]
    fn empty_name_is_required() {
        let mut p = product();
        p.name = String::new();
        let errors = p.validate().unwrap_err();
        let fields: Vec<_> = errors.iter().map(|m| m.field_name.as_str()).collect();
        assert_eq!(fields, vec!["name"]);
        assert_eq!(errors.iter().next().unwrap().message, "Required field");
    }

    #[test]
    fn short_name_and_empty_description_are_accepted() {
        let mut p = product();
        p.name = "TV".into();
        p.description = String::new();
        assert!(p.validate().is_ok());
    }

    #[test]
    fn negative_price_and_future_date_rejected() {
        let mut p = product();
        p.price = -1.0;
        p.date = Some(Utc::now() + Duration::days(1));
        let errors = p.validate().unwrap_err();
        let fields: Vec<_> = errors.iter().map(|m| m.field_name.clone()).collect();
        assert_eq!(fields, vec!["price".to_string(), "date".to_string()]);
    }

    #[test]
    fn zero_price_is_allowed() {
        let mut p = product();
        p.price = 0.0;
        assert!(p.validate().is_ok());
    }

    #[test]
    fn category_without_id_is_rejected() {
        let mut p = product();
        p.categories.push(CategoryDto { id: None, name: "x".into() });
        let errors = p.validate().unwrap_err();
        assert_eq!(errors.iter().next().unwrap().field_name, "categories[1].id");
    }

    #[test]
    fn user_insert_checks_user_fields_then_password() {
        let dto = UserInsertDto {
            user: UserDto {
                id: None,
                first_name: " ".into(),
                last_name: "Silva".into(),
                email: "not-an-email".into(),
                roles: vec![RoleDto { id: Some(1), authority: String::new() }],
            },
            password: "short".into(),
        };
        let errors = dto.validate().unwrap_err();
        let fields: Vec<_> = errors.iter().map(|m| m.field_name.as_str()).collect();
        assert_eq!(fields, vec!["firstName", "email", "password"]);
        assert_eq!(errors.to_string().matches(';').count(), 2);
    }

    #[test]
    fn email_shape() {
        assert!(is_valid_email("maria@gmail.com"));
        assert!(!is_valid_email("maria@gmail"));
        assert!(!is_valid_email("@gmail.com"));
        assert!(!is_valid_email("ma ria@gmail.com"));
        assert!(!is_valid_email("a@b@c.com"));
    }

    #[test]
    fn serializes_as_plain_list() {
        let e = ValidationErrors::single("name", "Required field");
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json, serde_json::json!([{"fieldName": "name", "message": "Required field"}]));
    }
}
