use serde::Serialize;
use utoipa::ToSchema;

use crate::models::Role;

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct RoleList {
    #[schema(value_type = Vec<Role>)]
    pub items: Vec<Role>,
}
