use serde::Serialize;
use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(Serialize, ToSchema)]
pub struct CategoryDoc { pub id: Option<i64>, pub name: String }

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductDoc {
    pub id: Option<i64>,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub img_url: String,
    /// RFC 3339 creation instant; defaults to now on insert, ignored on update
    pub date: Option<String>,
    pub categories: Vec<CategoryDoc>,
}

#[derive(Serialize, ToSchema)]
pub struct RoleDoc { pub id: Option<i64>, pub authority: String }

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDoc {
    pub id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub roles: Vec<RoleDoc>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserInsertDoc {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub roles: Vec<RoleDoc>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[aliases(ProductPageDoc = PageDoc<ProductDoc>, CategoryPageDoc = PageDoc<CategoryDoc>, UserPageDoc = PageDoc<UserDoc>)]
pub struct PageDoc<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u64,
    pub number: u64,
    pub size: u64,
    pub number_of_elements: u64,
    pub first: bool,
    pub last: bool,
    pub empty: bool,
}

#[derive(Serialize, ToSchema)]
pub struct StandardErrorDoc {
    pub timestamp: String,
    pub status: u16,
    pub error: String,
    pub message: String,
    pub path: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldMessageDoc { pub field_name: String, pub message: String }

#[derive(Serialize, ToSchema)]
pub struct ValidationErrorDoc {
    pub timestamp: String,
    pub status: u16,
    pub error: String,
    pub message: String,
    pub path: String,
    pub errors: Vec<FieldMessageDoc>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::products::find_all,
        crate::routes::products::find_by_id,
        crate::routes::products::insert,
        crate::routes::products::update,
        crate::routes::products::delete,
        crate::routes::categories::find_all,
        crate::routes::categories::find_by_id,
        crate::routes::categories::insert,
        crate::routes::categories::update,
        crate::routes::categories::delete,
        crate::routes::users::find_all,
        crate::routes::users::find_by_id,
        crate::routes::users::insert,
        crate::routes::users::update,
        crate::routes::users::delete,
        crate::routes::roles::find_all,
    ),
    components(
        schemas(
            HealthResponse,
            CategoryDoc,
            ProductDoc,
            RoleDoc,
            UserDoc,
            UserInsertDoc,
            ProductPageDoc,
            CategoryPageDoc,
            UserPageDoc,
            StandardErrorDoc,
            FieldMessageDoc,
            ValidationErrorDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "products"),
        (name = "categories"),
        (name = "users")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_resource() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let paths = doc["paths"].as_object().unwrap();
        for p in ["/health", "/products", "/products/{id}", "/categories/{id}", "/users", "/roles"] {
            assert!(paths.contains_key(p), "missing {}", p);
        }
        assert!(doc["components"]["schemas"]["ProductPageDoc"].is_object());
    }
}
