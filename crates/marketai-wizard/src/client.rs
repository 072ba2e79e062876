//! Typed HTTP client for the MarketAI backend.
//!
//! Each call carries a per-action in-flight flag so a UI can disable the
//! control that triggered it; a second call while the flag is set is
//! rejected with [`ClientError::Busy`] instead of sending a duplicate.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, warn};

use marketai_types::api::{
    AuthResponse, ConnectRequest, ConnectionsResponse, DisconnectRequest, EditImageRequest,
    EditImageResponse, ErrorBody, LoginRequest, PostsResponse, RegisterRequest, SavePostRequest,
    SavePostResponse, SuccessResponse, UploadRequest, UploadResponse,
};
use marketai_types::{Platform, SavedPost};

use crate::wizard::WizardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Register,
    Login,
    SavePost,
    LoadCatalog,
    DeletePost,
    Connect,
    Disconnect,
    LoadConnections,
    Upload,
    EditImage,
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request never produced a response (network, DNS, TLS, decoding).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("{message} ({status})")]
    Api { status: u16, message: String },

    #[error(transparent)]
    Wizard(#[from] WizardError),

    #[error("Please connect your {0} account first")]
    NotConnected(Platform),

    #[error("invalid server address {0}")]
    InvalidUrl(String),

    #[error("post {0} is not in the loaded catalog")]
    UnknownPost(String),

    #[error("{0:?} is already in progress")]
    Busy(Action),

    #[error("session storage failed: {0:#}")]
    Session(anyhow::Error),
}

/// Clears its action's busy flag when dropped.
pub struct InFlightGuard {
    in_flight: Arc<Mutex<HashSet<Action>>>,
    action: Action,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        lock(&self.in_flight).remove(&self.action);
    }
}

fn lock(set: &Mutex<HashSet<Action>>) -> MutexGuard<'_, HashSet<Action>> {
    set.lock().unwrap_or_else(|e| e.into_inner())
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    in_flight: Arc<Mutex<HashSet<Action>>>,
}

impl ApiClient {
    /// `base_url` is the server root, e.g. `http://localhost:5000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            in_flight: Arc::default(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Mark `action` as in flight, or fail if it already is.
    pub fn try_begin(&self, action: Action) -> Result<InFlightGuard, ClientError> {
        if !lock(&self.in_flight).insert(action) {
            return Err(ClientError::Busy(action));
        }
        Ok(InFlightGuard {
            in_flight: Arc::clone(&self.in_flight),
            action,
        })
    }

    pub fn is_busy(&self, action: Action) -> bool {
        lock(&self.in_flight).contains(&action)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `/api/catalog/posts/{post_id}` with the id escaped as one segment.
    fn post_url(&self, post_id: &str) -> Result<reqwest::Url, ClientError> {
        let mut url = reqwest::Url::parse(&self.url("/api/catalog/posts"))
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.clone()))?
            .push(post_id);
        Ok(url)
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or(body);
            warn!("{} from server: {}", status, message);
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json().await?)
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<AuthResponse, ClientError> {
        let _guard = self.try_begin(Action::Register)?;
        let body = RegisterRequest {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
            name: Some(name.to_string()),
        };
        let response = self
            .http
            .post(self.url("/api/auth/register"))
            .json(&body)
            .send()
            .await?;
        Self::parse(response).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let _guard = self.try_begin(Action::Login)?;
        let body = LoginRequest {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        };
        let response = self
            .http
            .post(self.url("/api/auth/login"))
            .json(&body)
            .send()
            .await?;
        Self::parse(response).await
    }

    /// Returns the new post id.
    pub async fn save_post(
        &self,
        token: &str,
        request: &SavePostRequest,
    ) -> Result<String, ClientError> {
        let _guard = self.try_begin(Action::SavePost)?;
        let response = self
            .http
            .post(self.url("/api/catalog/save"))
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;
        let saved: SavePostResponse = Self::parse(response).await?;
        debug!("saved post {}", saved.post_id);
        Ok(saved.post_id)
    }

    pub async fn list_posts(&self, token: &str) -> Result<Vec<SavedPost>, ClientError> {
        let _guard = self.try_begin(Action::LoadCatalog)?;
        let response = self
            .http
            .get(self.url("/api/catalog/posts"))
            .bearer_auth(token)
            .send()
            .await?;
        let list: PostsResponse = Self::parse(response).await?;
        Ok(list.posts)
    }

    pub async fn delete_post(&self, token: &str, post_id: &str) -> Result<(), ClientError> {
        let _guard = self.try_begin(Action::DeletePost)?;
        let response = self
            .http
            .delete(self.post_url(post_id)?)
            .bearer_auth(token)
            .send()
            .await?;
        let _: SuccessResponse = Self::parse(response).await?;
        Ok(())
    }

    pub async fn connect(
        &self,
        token: &str,
        platform: Platform,
        access_token: &str,
    ) -> Result<(), ClientError> {
        let _guard = self.try_begin(Action::Connect)?;
        let body = ConnectRequest {
            platform: Some(platform),
            access_token: Some(access_token.to_string()),
        };
        let response = self
            .http
            .post(self.url("/api/social/connect"))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        let _: SuccessResponse = Self::parse(response).await?;
        Ok(())
    }

    pub async fn disconnect(&self, token: &str, platform: Platform) -> Result<(), ClientError> {
        let _guard = self.try_begin(Action::Disconnect)?;
        let body = DisconnectRequest {
            platform: Some(platform),
        };
        let response = self
            .http
            .post(self.url("/api/social/disconnect"))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        let _: SuccessResponse = Self::parse(response).await?;
        Ok(())
    }

    pub async fn connections(&self, token: &str) -> Result<ConnectionsResponse, ClientError> {
        let _guard = self.try_begin(Action::LoadConnections)?;
        let response = self
            .http
            .get(self.url("/api/social/connections"))
            .bearer_auth(token)
            .send()
            .await?;
        Self::parse(response).await
    }

    /// Publish a saved post. `platform` defaults server-side to the post's own.
    pub async fn upload(
        &self,
        token: &str,
        post_id: &str,
        platform: Option<Platform>,
    ) -> Result<UploadResponse, ClientError> {
        let _guard = self.try_begin(Action::Upload)?;
        let body = UploadRequest {
            post_id: Some(post_id.to_string()),
            platform,
        };
        let response = self
            .http
            .post(self.url("/api/social/upload"))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        Self::parse(response).await
    }

    /// Send a base64 image and an instruction to the edit proxy. Returns
    /// whatever the editing service produced.
    pub async fn edit_image(
        &self,
        image_base64: &str,
        prompt: &str,
    ) -> Result<serde_json::Value, ClientError> {
        let _guard = self.try_begin(Action::EditImage)?;
        let body = EditImageRequest {
            image_base64: Some(image_base64.to_string()),
            prompt: Some(prompt.to_string()),
        };
        let response = self
            .http
            .post(self.url("/api/edit"))
            .json(&body)
            .send()
            .await?;
        let edited: EditImageResponse = Self::parse(response).await?;
        Ok(edited.edited_image)
    }

    /// Liveness check.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let response = self.http.get(self.url("/health")).send().await?;
        let body: serde_json::Value = Self::parse(response).await?;
        Ok(body == json!({ "status": "ok" }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_releases_on_drop() {
        let client = ApiClient::new("http://localhost:5000/");
        assert_eq!(client.base_url(), "http://localhost:5000");

        let guard = client.try_begin(Action::SavePost).unwrap();
        assert!(client.is_busy(Action::SavePost));
        assert!(!client.is_busy(Action::Upload));
        assert!(matches!(
            client.try_begin(Action::SavePost),
            Err(ClientError::Busy(Action::SavePost))
        ));

        drop(guard);
        assert!(!client.is_busy(Action::SavePost));
        assert!(client.try_begin(Action::SavePost).is_ok());
    }

    #[test]
    fn post_id_is_escaped_as_one_path_segment() {
        let client = ApiClient::new("http://localhost:5000");
        let url = client.post_url("post_1_abc").unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/catalog/posts/post_1_abc");

        let url = client.post_url("a/b?c#d").unwrap();
        assert_eq!(url.path(), "/api/catalog/posts/a%2Fb%3Fc%23d");
        assert!(url.query().is_none());
        assert!(url.fragment().is_none());
    }

    #[test]
    fn unusable_base_url_is_an_error() {
        let client = ApiClient::new("not a url");
        assert!(matches!(client.post_url("p"), Err(ClientError::InvalidUrl(_))));
    }

    #[test]
    fn clones_share_busy_flags() {
        let client = ApiClient::new("http://localhost:5000");
        let other = client.clone();
        let _guard = client.try_begin(Action::Connect).unwrap();
        assert!(other.is_busy(Action::Connect));
    }
}
