use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::models::{User, UserWithRole};

#[derive(Deserialize, Debug, ToSchema, Default)]
pub struct CreateUserRequest {
    #[serde(alias = "firstName", alias = "prenom")]
    pub first_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(alias = "numero", default, deserialize_with = "phone_text")]
    #[schema(value_type = Option<String>)]
    pub phone: Option<String>,
    /// Role id.
    pub role: Option<String>,
}

#[derive(Deserialize, Debug, ToSchema, Default)]
pub struct UpdateUserRequest {
    #[serde(alias = "firstName", alias = "prenom")]
    pub first_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(alias = "numero", default, deserialize_with = "phone_text")]
    #[schema(value_type = Option<String>)]
    pub phone: Option<String>,
    pub role: Option<String>,
}

#[derive(Deserialize, Debug, ToSchema, Default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Deserialize, Serialize, ToSchema, Clone, PartialEq)]
pub struct Claims {
    /// User id.
    pub sub: String,
    /// Role id.
    pub role: String,
    pub exp: usize,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct UserList {
    #[schema(value_type = Vec<UserWithRole>)]
    pub items: Vec<UserWithRole>,
}

/// Phone numbers arrive as JSON strings or as plain numbers.
fn phone_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Phone {
        Text(String),
        Number(u64),
    }

    Ok(Option::<Phone>::deserialize(deserializer)?.map(|phone| match phone {
        Phone::Text(text) => text,
        Phone::Number(number) => number.to_string(),
    }))
}
