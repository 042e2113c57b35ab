use async_trait::async_trait;

use crate::{
    models::{UserPayload, UserRecord},
    utils::AppError,
};

/// Persistence for user records.
///
/// `replace` and `remove` return `Ok(None)` when no record has the given id;
/// ids that are not valid ObjectIds are treated the same way.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn list(&self) -> Result<Vec<UserRecord>, AppError>;

    async fn insert(&self, user: UserPayload) -> Result<UserRecord, AppError>;

    async fn replace(&self, id: &str, user: UserPayload) -> Result<Option<UserRecord>, AppError>;

    async fn remove(&self, id: &str) -> Result<Option<UserRecord>, AppError>;

    /// Backend name reported by /health
    fn backend(&self) -> &'static str;

    async fn ping(&self) -> Result<(), AppError>;
}
