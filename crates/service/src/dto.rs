//! Transfer objects exchanged across the service boundary (JSON, camelCase).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category summary; also the element type of `ProductDto::categories`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDto {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub img_url: String,
    /// Creation instant. Optional on insert (defaults to now), ignored on update.
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    /// Only `id` is read on write; the full summary is returned on read.
    #[serde(default)]
    pub categories: Vec<CategoryDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleDto {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub authority: String,
}

/// Read/update view of a user. Never carries the password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub roles: Vec<RoleDto>,
}

/// Creation payload: the user fields plus the plaintext password.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserInsertDto {
    #[serde(flatten)]
    pub user: UserDto,
    #[serde(default)]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_insert_reads_flat_json() {
        let dto: UserInsertDto = serde_json::from_value(serde_json::json!({
            "firstName": "Maria",
            "lastName": "Green",
            "email": "maria@gmail.com",
            "password": "123456789",
            "roles": [{"id": 1}]
        }))
        .unwrap();
        assert_eq!(dto.user.first_name, "Maria");
        assert_eq!(dto.user.roles, vec![RoleDto { id: Some(1), authority: String::new() }]);
        assert_eq!(dto.password, "123456789");
    }

    #[test]
    fn product_uses_camel_case() {
        let dto = ProductDto {
            id: Some(1),
            name: "The Lord of the Rings".into(),
            description: "Lorem ipsum".into(),
            price: 90.5,
            img_url: "https://img.example.com/1.png".into(),
            date: None,
            categories: vec![],
        };
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["imgUrl"], "https://img.example.com/1.png");
        assert!(json.get("img_url").is_none());
    }
}
