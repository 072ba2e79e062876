use tracing::info;

use marketai_types::api::{ConnectionsResponse, UploadResponse};
use marketai_types::{Platform, SavedPost};

use crate::client::{ApiClient, ClientError};
use crate::session::{SessionContext, UserSession};
use crate::wizard::{Wizard, WizardError, WizardStep};

/// Image stored with every saved post until generated images are hosted.
pub const PLACEHOLDER_IMAGE_URL: &str =
    "https://images.unsplash.com/photo-1611162617474-5b21e879e113?w=500";

/// Application context: the session, the wizard, and the last known
/// catalog and connection state, tied to one backend client.
pub struct Studio {
    client: ApiClient,
    session: SessionContext,
    wizard: Wizard,
    catalog: Vec<SavedPost>,
    connections: ConnectionsResponse,
}

impl Studio {
    pub fn new(client: ApiClient, session: SessionContext, wizard: Wizard) -> Self {
        Self {
            client,
            session,
            wizard,
            catalog: Vec::new(),
            connections: ConnectionsResponse::default(),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn wizard(&self) -> &Wizard {
        &self.wizard
    }

    pub fn wizard_mut(&mut self) -> &mut Wizard {
        &mut self.wizard
    }

    pub fn catalog(&self) -> &[SavedPost] {
        &self.catalog
    }

    pub fn connections(&self) -> &ConnectionsResponse {
        &self.connections
    }

    fn token(&self) -> Result<String, ClientError> {
        self.session
            .access_token()
            .map(str::to_string)
            .ok_or(ClientError::Wizard(WizardError::NotSignedIn))
    }

    pub async fn register(
        &mut self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<&UserSession, ClientError> {
        let auth = self.client.register(email, password, name).await?;
        self.start_session(auth.into())
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<&UserSession, ClientError> {
        let auth = self.client.login(email, password).await?;
        self.start_session(auth.into())
    }

    fn start_session(&mut self, session: UserSession) -> Result<&UserSession, ClientError> {
        self.session.sign_in(session).map_err(ClientError::Session)?;
        self.session
            .current()
            .ok_or(ClientError::Wizard(WizardError::NotSignedIn))
    }

    /// Sign out and drop everything loaded for the previous user.
    pub fn logout(&mut self) -> Result<(), ClientError> {
        self.catalog.clear();
        self.connections = ConnectionsResponse::default();
        self.session.sign_out().map_err(ClientError::Session)
    }

    /// Save the finished draft to the catalog and start over. On failure
    /// the draft is left as it was.
    pub async fn save_draft(&mut self) -> Result<String, ClientError> {
        let token = self.token()?;
        if !self.wizard.is_final() {
            return Err(WizardError::StepNotReached {
                required: WizardStep::PreviewingFinal,
                current: self.wizard.step(),
            }
            .into());
        }
        let request = self
            .wizard
            .draft()
            .to_save_request(PLACEHOLDER_IMAGE_URL)
            .ok_or(WizardError::Incomplete("Choose a platform"))?;

        let post_id = self.client.save_post(&token, &request).await?;
        info!("saved {} post {} to catalog", request.platform, post_id);
        self.wizard.reset();
        Ok(post_id)
    }

    pub async fn refresh_catalog(&mut self) -> Result<&[SavedPost], ClientError> {
        let token = self.token()?;
        self.catalog = self.client.list_posts(&token).await?;
        Ok(&self.catalog)
    }

    pub async fn delete_post(&mut self, post_id: &str) -> Result<(), ClientError> {
        let token = self.token()?;
        self.client.delete_post(&token, post_id).await?;
        self.catalog.retain(|p| p.id != post_id);
        Ok(())
    }

    pub async fn refresh_connections(&mut self) -> Result<&ConnectionsResponse, ClientError> {
        let token = self.token()?;
        self.connections = self.client.connections(&token).await?;
        Ok(&self.connections)
    }

    /// Store a credential, then reload the connection map.
    pub async fn connect(
        &mut self,
        platform: Platform,
        access_token: &str,
    ) -> Result<&ConnectionsResponse, ClientError> {
        let token = self.token()?;
        self.client.connect(&token, platform, access_token).await?;
        info!("{} connected", platform);
        self.refresh_connections().await
    }

    pub async fn disconnect(&mut self, platform: Platform) -> Result<&ConnectionsResponse, ClientError> {
        let token = self.token()?;
        self.client.disconnect(&token, platform).await?;
        info!("{} disconnected", platform);
        self.refresh_connections().await
    }

    /// Publish a post from the loaded catalog to its own platform. Refuses
    /// locally when that platform is not connected.
    pub async fn upload(&self, post_id: &str) -> Result<UploadResponse, ClientError> {
        let token = self.token()?;
        let post = self
            .catalog
            .iter()
            .find(|p| p.id == post_id)
            .ok_or_else(|| ClientError::UnknownPost(post_id.to_string()))?;
        if !self.connections.is_connected(post.platform) {
            return Err(ClientError::NotConnected(post.platform));
        }
        self.client.upload(&token, &post.id, Some(post.platform)).await
    }

    /// Run the uploaded image and its edit instruction through the edit
    /// proxy.
    pub async fn enhance_image(&self) -> Result<serde_json::Value, ClientError> {
        let draft = self.wizard.draft();
        let image = draft
            .uploaded_image()
            .ok_or(WizardError::Incomplete("Upload an image to continue"))?;
        let prompt = draft
            .image_edit_description()
            .ok_or(WizardError::Incomplete("Describe how the image should change"))?;
        self.client.edit_image(&image.to_base64(), prompt).await
    }
}
