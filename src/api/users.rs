use actix_web::{error::JsonPayloadError, web, HttpRequest, HttpResponse};

use crate::{
    models::{
        DeletedUserResponse, ErrorResponse, SavedUserResponse, UpdatedUserResponse, UserPayload,
        UserRecord,
    },
    services::UserStore,
    utils::AppError,
};

/// Turns body extraction failures into a 400 `{message}` response
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    log::warn!("⚠️  Rejected request body: {}", err);
    AppError::Validation(err.to_string()).into()
}

/// GET /users - Lists every user
#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    responses(
        (status = 200, description = "All users", body = Vec<UserRecord>),
        (status = 500, description = "Store unavailable", body = ErrorResponse)
    )
)]
pub async fn list_users(store: web::Data<dyn UserStore>) -> Result<HttpResponse, AppError> {
    log::info!("📋 GET /users");

    let users = store
        .list()
        .await
        .inspect_err(|e| log::error!("❌ Error listing users: {}", e))?;

    log::info!("✅ Listed {} users", users.len());
    Ok(HttpResponse::Ok().json(users))
}

/// POST /users - Creates a user, the store assigns `_id`
#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    request_body = UserPayload,
    responses(
        (status = 201, description = "User created", body = SavedUserResponse),
        (status = 400, description = "Malformed body", body = ErrorResponse),
        (status = 500, description = "Store unavailable", body = ErrorResponse)
    )
)]
pub async fn create_user(
    store: web::Data<dyn UserStore>,
    body: web::Json<UserPayload>,
) -> Result<HttpResponse, AppError> {
    let payload = body.into_inner().validate()?;
    log::info!("📝 POST /users - Creating {}", payload.name);

    let saved_user = store
        .insert(payload)
        .await
        .inspect_err(|e| log::error!("❌ Error creating user: {}", e))?;

    log::info!("✅ User created: {}", saved_user.id);
    Ok(HttpResponse::Created().json(SavedUserResponse {
        message: "User created".to_string(),
        saved_user,
    }))
}

/// PUT /users/{id} - Replaces every field except `_id`
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "User ObjectId (hex)")),
    request_body = UserPayload,
    responses(
        (status = 200, description = "User updated", body = UpdatedUserResponse),
        (status = 400, description = "Malformed body", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Store unavailable", body = ErrorResponse)
    )
)]
pub async fn update_user(
    store: web::Data<dyn UserStore>,
    id: web::Path<String>,
    body: web::Json<UserPayload>,
) -> Result<HttpResponse, AppError> {
    let payload = body.into_inner().validate()?;
    log::info!("🔧 PUT /users/{}", id);

    let updated_user = store
        .replace(&id, payload)
        .await
        .inspect_err(|e| log::error!("❌ Error updating user {}: {}", id, e))?
        .ok_or_else(AppError::user_not_found)?;

    log::info!("✅ User updated: {}", updated_user.id);
    Ok(HttpResponse::Ok().json(UpdatedUserResponse {
        message: "User updated".to_string(),
        updated_user,
    }))
}

/// DELETE /users/{id} - Removes a user and returns it
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "User ObjectId (hex)")),
    responses(
        (status = 200, description = "User deleted", body = DeletedUserResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Store unavailable", body = ErrorResponse)
    )
)]
pub async fn delete_user(
    store: web::Data<dyn UserStore>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    log::info!("🗑️  DELETE /users/{}", id);

    let deleted_user = store
        .remove(&id)
        .await
        .inspect_err(|e| log::error!("❌ Error deleting user {}: {}", id, e))?
        .ok_or_else(AppError::user_not_found)?;

    log::info!("✅ User deleted: {}", deleted_user.id);
    Ok(HttpResponse::Ok().json(DeletedUserResponse {
        message: "User deleted".to_string(),
        deleted_user,
    }))
}
