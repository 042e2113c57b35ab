// ==================== MONGODB USER STORE ====================
// Users live in a single collection; `_id` is assigned by MongoDB on insert.

use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::{
    bson::{doc, from_document, oid::ObjectId, Document},
    options::ReturnDocument,
    Collection,
};

use crate::{
    database::MongoDB,
    models::{UserDocument, UserPayload, UserRecord},
    services::UserStore,
    utils::AppError,
};

pub const DEFAULT_COLLECTION: &str = "users";

pub struct MongoUserStore {
    db: MongoDB,
    users: Collection<UserDocument>,
    // Mesma coleção sem tipo, para listar sem falhar em documentos antigos
    raw_users: Collection<Document>,
}

impl MongoUserStore {
    pub fn new(db: MongoDB, collection: &str) -> Self {
        let users = db.collection::<UserDocument>(collection);
        let raw_users = users.clone_with_type::<Document>();
        Self { db, users, raw_users }
    }
}

/// Decodes listed documents, skipping (and logging) the ones that do not fit
/// the user shape so one bad document cannot hide the rest of the collection.
fn decode_users(docs: Vec<Document>) -> Vec<UserRecord> {
    docs.into_iter()
        .filter_map(|raw| {
            let id = raw.get_object_id("_id").map(|id| id.to_hex()).unwrap_or_default();
            match from_document::<UserDocument>(raw) {
                Ok(user) => Some(UserRecord::from(user)),
                Err(e) => {
                    log::warn!("⚠️  Skipping unreadable user document {}: {}", id, e);
                    None
                }
            }
        })
        .collect()
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn list(&self) -> Result<Vec<UserRecord>, AppError> {
        let cursor = self.raw_users.find(doc! {}).await?;
        let docs: Vec<Document> = cursor.try_collect().await?;

        Ok(decode_users(docs))
    }

    async fn insert(&self, user: UserPayload) -> Result<UserRecord, AppError> {
        let document = UserDocument::from_payload(user);
        let result = self.users.insert_one(&document).await?;

        let id = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| AppError::Storage("Inserted user has no ObjectId".to_string()))?;

        let mut saved = document;
        saved.id = Some(id);
        Ok(UserRecord::from(saved))
    }

    async fn replace(&self, id: &str, user: UserPayload) -> Result<Option<UserRecord>, AppError> {
        let Ok(object_id) = ObjectId::parse_str(id) else {
            return Ok(None);
        };

        let replaced = self
            .users
            .find_one_and_replace(doc! { "_id": object_id }, UserDocument::from_payload(user))
            .return_document(ReturnDocument::After)
            .await?;

        Ok(replaced.map(UserRecord::from))
    }

    async fn remove(&self, id: &str) -> Result<Option<UserRecord>, AppError> {
        let Ok(object_id) = ObjectId::parse_str(id) else {
            return Ok(None);
        };

        let deleted = self
            .users
            .find_one_and_delete(doc! { "_id": object_id })
            .await?;

        Ok(deleted.map(UserRecord::from))
    }

    fn backend(&self) -> &'static str {
        "mongodb"
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.db.ping().await?;
        Ok(())
    }
}
