use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

use crate::{
    models::{UserPayload, UserRecord},
    services::UserStore,
    utils::AppError,
};

/// In-process store with the same id shape as MongoDB. Keeps insertion order.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<UserRecord>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

// Ids are stored as lowercase hex; accept any id MongoDB would accept
fn canonical_id(id: &str) -> Option<String> {
    ObjectId::parse_str(id).ok().map(|oid| oid.to_hex())
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn list(&self) -> Result<Vec<UserRecord>, AppError> {
        Ok(self.users.read().await.clone())
    }

    async fn insert(&self, user: UserPayload) -> Result<UserRecord, AppError> {
        let record = UserRecord::with_id(ObjectId::new().to_hex(), user);
        self.users.write().await.push(record.clone());
        Ok(record)
    }

    async fn replace(&self, id: &str, user: UserPayload) -> Result<Option<UserRecord>, AppError> {
        let Some(id) = canonical_id(id) else {
            return Ok(None);
        };
        let mut users = self.users.write().await;

        Ok(users.iter_mut().find(|u| u.id == id).map(|existing| {
            *existing = UserRecord::with_id(existing.id.clone(), user);
            existing.clone()
        }))
    }

    async fn remove(&self, id: &str) -> Result<Option<UserRecord>, AppError> {
        let Some(id) = canonical_id(id) else {
            return Ok(None);
        };
        let mut users = self.users.write().await;

        Ok(users
            .iter()
            .position(|u| u.id == id)
            .map(|index| users.remove(index)))
    }

    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
