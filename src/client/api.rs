use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::fmt;

use crate::models::{
    DeletedUserResponse, ErrorResponse, SavedUserResponse, UpdatedUserResponse, UserPayload,
    UserRecord,
};

#[derive(Debug)]
pub enum ClientError {
    /// Request never got an HTTP answer, or the answer was not the expected JSON
    Transport(String),
    /// Server answered with a non-2xx status
    Api { status: u16, message: String },
    /// Form input that cannot become a request body
    InvalidInput(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Transport(msg) => write!(f, "Transport error: {}", msg),
            ClientError::Api { status, message } => write!(f, "API error {}: {}", status, message),
            ClientError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

/// The four users endpoints, as seen from a client
#[async_trait]
pub trait UsersApi: Send + Sync {
    async fn list(&self) -> Result<Vec<UserRecord>, ClientError>;

    async fn create(&self, user: &UserPayload) -> Result<UserRecord, ClientError>;

    async fn update(&self, id: &str, user: &UserPayload) -> Result<UserRecord, ClientError>;

    async fn delete(&self, id: &str) -> Result<UserRecord, ClientError>;
}

/// `UsersApi` over HTTP/JSON
pub struct HttpUsersApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpUsersApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn users_url(&self) -> String {
        format!("{}/users", self.base_url)
    }

    fn user_url(&self, id: &str) -> String {
        format!("{}/users/{}", self.base_url, urlencoding::encode(id))
    }
}

/// Decodes a success body, or turns the `{message}` error body into `ClientError::Api`
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();

    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&text)
            .map(|body| body.message)
            .unwrap_or(text);
        return Err(ClientError::Api {
            status: status.as_u16(),
            message,
        });
    }

    Ok(response.json::<T>().await?)
}

#[async_trait]
impl UsersApi for HttpUsersApi {
    async fn list(&self) -> Result<Vec<UserRecord>, ClientError> {
        log::debug!("GET {}", self.users_url());
        let response = self.client.get(self.users_url()).send().await?;
        read_json(response).await
    }

    async fn create(&self, user: &UserPayload) -> Result<UserRecord, ClientError> {
        log::debug!("POST {}", self.users_url());
        let response = self.client.post(self.users_url()).json(user).send().await?;
        let body: SavedUserResponse = read_json(response).await?;
        Ok(body.saved_user)
    }

    async fn update(&self, id: &str, user: &UserPayload) -> Result<UserRecord, ClientError> {
        let url = self.user_url(id);
        log::debug!("PUT {}", url);
        let response = self.client.put(url).json(user).send().await?;
        let body: UpdatedUserResponse = read_json(response).await?;
        Ok(body.updated_user)
    }

    async fn delete(&self, id: &str) -> Result<UserRecord, ClientError> {
        let url = self.user_url(id);
        log::debug!("DELETE {}", url);
        let response = self.client.delete(url).send().await?;
        let body: DeletedUserResponse = read_json(response).await?;
        Ok(body.deleted_user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api;
    use crate::services::{MemoryUserStore, UserStore};
    use actix_web::{dev::ServerHandle, web, App, HttpServer};
    use std::sync::Arc;

    async fn spawn_server() -> (String, ServerHandle) {
        let store: Arc<dyn UserStore> = Arc::new(MemoryUserStore::new());
        let data = web::Data::from(store);

        let server = HttpServer::new(move || {
            App::new().app_data(data.clone()).configure(api::configure)
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .expect("bind ephemeral port");

        let addr = server.addrs()[0];
        let server = server.run();
        let handle = server.handle();
        actix_rt::spawn(server);

        (format!("http://{}", addr), handle)
    }

    fn payload(name: &str, hobbies: &[&str]) -> UserPayload {
        UserPayload {
            name: name.to_string(),
            age: 30,
            city: "X".to_string(),
            email: "a@x.com".to_string(),
            hobbies: hobbies.iter().map(|h| h.to_string()).collect(),
        }
    }

    #[actix_web::test]
    async fn test_crud_over_http() {
        let (base_url, handle) = spawn_server().await;
        let api = HttpUsersApi::new(&format!("{}/", base_url));

        assert!(api.list().await.unwrap().is_empty());

        let saved = api.create(&payload("A", &["x", "y"])).await.unwrap();
        assert_eq!(saved.hobbies, vec!["x", "y"]);
        assert_eq!(api.list().await.unwrap(), vec![saved.clone()]);

        let updated = api.update(&saved.id, &payload("B", &[])).await.unwrap();
        assert_eq!(updated.id, saved.id);
        assert_eq!(updated.name, "B");

        let deleted = api.delete(&saved.id).await.unwrap();
        assert_eq!(deleted, updated);
        assert!(api.list().await.unwrap().is_empty());

        handle.stop(true).await;
    }

    #[actix_web::test]
    async fn test_not_found_carries_server_message() {
        let (base_url, handle) = spawn_server().await;
        let api = HttpUsersApi::new(&base_url);

        match api.update("6650f1c2a7b3c94e1d2f0a11", &payload("A", &[])).await {
            Err(ClientError::Api { status, message }) => {
                assert_eq!(status, 404);
                assert_eq!(message, "User not found");
            }
            other => panic!("expected 404, got {:?}", other),
        }

        handle.stop(true).await;
    }

    #[actix_web::test]
    async fn test_unreachable_server_is_transport_error() {
        // Port 9 (discard) is not served here
        let api = HttpUsersApi::new("http://127.0.0.1:9");
        assert!(matches!(api.list().await, Err(ClientError::Transport(_))));
    }
}
