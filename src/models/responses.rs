use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::UserRecord;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SavedUserResponse {
    pub message: String,
    pub saved_user: UserRecord,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedUserResponse {
    pub message: String,
    pub updated_user: UserRecord,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeletedUserResponse {
    pub message: String,
    pub deleted_user: UserRecord,
}

/// Body of every error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}
