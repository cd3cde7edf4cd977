use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::contract::model::{User, UserId};

pub const USER_DELETED_MESSAGE: &str = "User deleted successfully";

/// REST DTO for user representation with serde/utoipa
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub company: String,
    pub address: String,
    pub city: String,
    pub created_at: DateTime<Utc>,
}

/// Confirmation returned by a successful delete, with the removed record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteUserResponse {
    pub message: String,
    pub user: UserDto,
}

/// Structured part of an error payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetails {
    /// Taxonomy tag, e.g. `invalid_id_format` or `store_error`.
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

/// JSON body of every failed user operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ErrorDetails>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            company: user.company,
            address: user.address,
            city: user.city,
            created_at: user.created_at,
        }
    }
}

impl DeleteUserResponse {
    pub fn deleted(user: User) -> Self {
        Self {
            message: USER_DELETED_MESSAGE.to_owned(),
            user: user.into(),
        }
    }
}
