//! Pure conversions between persisted entities and transfer objects.
//!
//! Nothing here touches a store; association lists on the read side are emitted ordered by id
//! so responses are deterministic.

use std::collections::HashSet;

use chrono::Utc;
use models::{category, product, role, user};

use crate::dto::{CategoryDto, ProductDto, RoleDto, UserDto};
use crate::errors::ServiceError;
use crate::product::repository::ProductFields;
use crate::user::repository::UserFields;

pub fn category_to_dto(c: &category::Model) -> CategoryDto {
    CategoryDto { id: Some(c.id), name: c.name.clone() }
}

pub fn role_to_dto(r: &role::Model) -> RoleDto {
    RoleDto { id: Some(r.id), authority: r.authority.clone() }
}

pub fn product_to_dto(p: &product::Model, categories: &[category::Model]) -> ProductDto {
    let mut categories: Vec<CategoryDto> = categories.iter().map(category_to_dto).collect();
    categories.sort_by_key(|c| c.id);
    ProductDto {
        id: Some(p.id),
        name: p.name.clone(),
        description: p.description.clone(),
        price: p.price,
        img_url: p.img_url.clone(),
        date: Some(p.date.with_timezone(&Utc)),
        categories,
    }
}

pub fn user_to_dto(u: &user::Model, roles: &[role::Model]) -> UserDto {
    let mut roles: Vec<RoleDto> = roles.iter().map(role_to_dto).collect();
    roles.sort_by_key(|r| r.id);
    UserDto {
        id: Some(u.id),
        first_name: u.first_name.clone(),
        last_name: u.last_name.clone(),
        email: u.email.clone(),
        roles,
    }
}

pub fn product_fields(dto: &ProductDto) -> ProductFields {
    ProductFields {
        name: dto.name.clone(),
        description: dto.description.clone(),
        price: dto.price,
        img_url: dto.img_url.clone(),
    }
}

pub fn user_fields(dto: &UserDto) -> UserFields {
    UserFields { first_name: dto.first_name.clone(), last_name: dto.last_name.clone(), email: dto.email.clone() }
}

/// Distinct identifiers in first-seen order; entries without an id are skipped.
pub fn association_ids(ids: impl IntoIterator<Item = Option<i64>>) -> Vec<i64> {
    let mut seen = HashSet::new();
    ids.into_iter().flatten().filter(|id| seen.insert(*id)).collect()
}

/// Pair requested ids with the rows a store returned for them.
///
/// Fails with `NotFound` naming the first id that has no row. The result follows the order
/// of `ids`.
pub fn resolve_associations<T>(
    entity: &str,
    ids: &[i64],
    found: Vec<T>,
    id_of: impl Fn(&T) -> i64,
) -> Result<Vec<T>, ServiceError> {
    let mut found = found;
    let mut resolved = Vec::with_capacity(ids.len());
    for id in ids {
        let pos = found.iter().position(|row| id_of(row) == *id).ok_or_else(|| ServiceError::not_found(entity, *id))?;
        resolved.push(found.swap_remove(pos));
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset};

    fn notebooks() -> category::Model { category::Model { id: 10, name: "Notebooks".into() } }

    fn product_row() -> product::Model {
        product::Model {
            id: 1,
            name: "Notebook Dell".into(),
            description: "Good Notebook".into(),
            price: 3000.0,
            img_url: "https://img.com/favicon".into(),
            date: DateTime::<FixedOffset>::parse_from_rfc3339("2017-09-27T15:53:42Z").unwrap(),
        }
    }

    #[test]
    fn product_to_dto_flattens_categories() {
        let electronics = category::Model { id: 2, name: "Electronics".into() };
        let dto = product_to_dto(&product_row(), &[notebooks(), electronics]);
        assert_eq!(dto.id, Some(1));
        assert_eq!(dto.price, 3000.0);
        assert_eq!(dto.date.unwrap().to_rfc3339(), "2017-09-27T15:53:42+00:00");
        let ids: Vec<_> = dto.categories.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![Some(2), Some(10)]);
        assert_eq!(dto.categories[1].name, "Notebooks");
    }

    #[test]
    fn user_to_dto_never_exposes_password() {
        let u = user::Model {
            id: 3,
            first_name: "Alex".into(),
            last_name: "Brown".into(),
            email: "alex@gmail.com".into(),
            password: "$argon2id$v=19$secret".into(),
        };
        let dto = user_to_dto(&u, &[role::Model { id: 1, authority: "ROLE_OPERATOR".into() }]);
        let json = serde_json::to_string(&dto).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password"));
        assert_eq!(dto.roles[0].authority, "ROLE_OPERATOR");
    }

    #[test]
    fn fields_copy_scalars_only() {
        let mut dto = product_to_dto(&product_row(), &[notebooks()]);
        dto.name = "Renamed".into();
        let fields = product_fields(&dto);
        assert_eq!(fields.name, "Renamed");
        assert_eq!(fields.img_url, "https://img.com/favicon");
    }

    #[test]
    fn association_ids_dedup_and_skip_missing() {
        assert_eq!(association_ids([Some(3), None, Some(1), Some(3)]), vec![3, 1]);
    }

    #[test]
    fn resolve_reports_first_missing_id() {
        let rows = vec![notebooks()];
        let err = resolve_associations("Category", &[10, 99, 98], rows, |c| c.id).unwrap_err();
        assert_eq!(err.to_string(), "Category 99 not found");
    }

    #[test]
    fn resolve_follows_requested_order() {
        let rows = vec![notebooks(), category::Model { id: 2, name: "Electronics".into() }];
        let resolved = resolve_associations("Category", &[2, 10], rows, |c| c.id).unwrap();
        assert_eq!(resolved.iter().map(|c| c.id).collect::<Vec<_>>(), vec![2, 10]);
    }
}
