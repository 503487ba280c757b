use std::collections::HashMap;
use std::sync::Arc;

use stash_entities::Identity;
use stashx_identity::{IdentitySession, LoginResult};
use stashx_vault::{Vault, VaultBinder};
use tracing::{debug, warn};
use url::Url;

use crate::{
    ClientError, ClientSubscriber, ListingEvent, SessionEvent, StatusEvent,
};

/// Client-side upload cap. Checked before any network call; the remote
/// side is free to enforce its own policy on top.
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Which of the two recognized configurations the client runs under.
///
/// Outside production the transport's trust anchor is fetched from the
/// local service so a development deployment can be trusted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Deployment {
    Local,
    Production,
}

/// Where the client stands with the identity collaborator.
#[derive(Clone, Debug)]
pub enum SessionState {
    Anonymous,
    Authenticating,
    Authenticated(Identity),
}

/// The session & upload client.
///
/// Holds the identity session and, while authenticated, the single
/// transport handle bound to it. Constructed once at startup and passed
/// by reference to every front-end action; there is no global state.
pub struct UploadClient<S: IdentitySession, B: VaultBinder> {
    session: S,
    binder: B,
    provider: Url,
    deployment: Deployment,
    state: SessionState,
    vault: Option<B::Handle>,
    subscribers: HashMap<String, Arc<dyn ClientSubscriber>>,
}

impl<S: IdentitySession, B: VaultBinder> UploadClient<S, B> {
    pub fn new(
        session: S,
        binder: B,
        provider: Url,
        deployment: Deployment,
    ) -> Self {
        Self {
            session,
            binder,
            provider,
            deployment,
            state: SessionState::Anonymous,
            vault: None,
            subscribers: HashMap::new(),
        }
    }

    pub fn subscribe(&mut self, subscriber: Arc<dyn ClientSubscriber>) {
        self.subscribers
            .insert(subscriber.get_id(), subscriber);
    }

    pub fn unsubscribe(&mut self, subscriber: Arc<dyn ClientSubscriber>) {
        self.subscribers.remove(&subscriber.get_id());
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::Authenticated(_))
    }

    /// Startup check. Resumes a persisted session without user
    /// interaction when the identity collaborator still considers it
    /// valid; otherwise leaves the client anonymous. Never fails the
    /// process: problems surface only as a status line.
    pub async fn initialize(&mut self) {
        self.status("Initializing...");
        match self.session.is_valid().await {
            Ok(true) => self.handle_authenticated().await,
            Ok(false) => self.set_anonymous(),
            Err(e) => {
                warn!("Initialization error: {}", e);
                self.status("Error initializing. Please try again.");
                self.set_anonymous();
            }
        }
    }

    /// Delegate to the identity provider. The provider URL was selected
    /// by deployment at construction time.
    pub async fn login(&mut self) -> Result<(), ClientError> {
        self.status("Logging in...");
        self.state = SessionState::Authenticating;
        match self.session.login(&self.provider).await {
            LoginResult::Success(_) => {
                self.handle_authenticated().await;
                Ok(())
            }
            LoginResult::Failure(reason) => {
                warn!("Login error: {}", reason);
                self.status("Login failed. Please try again.");
                self.set_anonymous();
                Err(ClientError::Login(reason))
            }
        }
    }

    /// Revoke the session and return to the anonymous state, discarding
    /// the transport handle and the displayed listing.
    pub async fn logout(&mut self) -> Result<(), ClientError> {
        self.status("Logging out...");
        match self.session.logout().await {
            Ok(()) => {
                self.set_anonymous();
                self.status("Logged out successfully.");
                Ok(())
            }
            Err(e) => {
                warn!("Logout error: {}", e);
                self.status("Logout failed. Please try again.");
                Err(ClientError::Logout(e.to_string()))
            }
        }
    }

    /// Upload a single file and, once the acknowledgment is in, refresh
    /// the listing. Each call is atomic from the client's perspective:
    /// on failure nothing is recorded and the user simply retries.
    pub async fn upload_one(
        &mut self,
        name: &str,
        bytes: &[u8],
    ) -> Result<(), ClientError> {
        let Some(vault) = self.vault.as_ref() else {
            self.status("Please login first");
            return Err(ClientError::LoginRequired);
        };

        if name.is_empty() {
            self.status("Please select a file");
            return Err(ClientError::NoFileSelected);
        }

        if bytes.len() as u64 > MAX_UPLOAD_BYTES {
            self.status("File size exceeds 10MB limit");
            return Err(ClientError::SizeCapExceeded(MAX_UPLOAD_BYTES));
        }

        self.status("Uploading file...");
        match vault.upload_file(name, bytes).await {
            Ok(ack) => {
                // The acknowledgment is the status, verbatim.
                self.status(&ack);
                let _ = self.refresh_list().await;
                Ok(())
            }
            Err(e) => {
                warn!("Upload error: {}", e);
                self.status(&format!("Error uploading file: {}", e));
                Err(ClientError::RemoteUpload(e.to_string()))
            }
        }
    }

    /// Replace the displayed listing entirely with what the service
    /// returns now. Without a session this renders a login prompt and
    /// performs no remote call.
    pub async fn refresh_list(&mut self) -> Result<(), ClientError> {
        let Some(vault) = self.vault.as_ref() else {
            self.notify_listing(ListingEvent::LoginRequired);
            return Err(ClientError::LoginRequired);
        };

        self.status("Fetching files...");
        match vault.list_files().await {
            Ok(files) if files.is_empty() => {
                self.notify_listing(ListingEvent::Empty);
                Ok(())
            }
            Ok(files) => {
                self.notify_listing(ListingEvent::Files(files));
                Ok(())
            }
            Err(e) => {
                warn!("Error fetching files: {}", e);
                self.notify_listing(ListingEvent::Unavailable);
                self.status("Error fetching files.");
                Err(ClientError::RemoteList(e.to_string()))
            }
        }
    }

    /// Shared tail of `initialize` and a successful `login`: bind the
    /// transport to the identity, flip the session, show the listing.
    async fn handle_authenticated(&mut self) {
        self.status("Authenticating...");
        self.state = SessionState::Authenticating;

        let Some(identity) = self.session.identity() else {
            warn!("Authenticated session carries no identity");
            self.status("Authentication failed. Please try again.");
            self.set_anonymous();
            return;
        };

        let mut vault = match self.binder.bind(&identity) {
            Ok(vault) => vault,
            Err(e) => {
                warn!("Authentication error: {}", e);
                self.status("Authentication failed. Please try again.");
                self.set_anonymous();
                return;
            }
        };

        if self.deployment != Deployment::Production {
            // Local deployments only; a missing anchor is tolerated.
            if let Err(e) = vault.fetch_trust_anchor().await {
                warn!(
                    "Unable to fetch trust anchor. Check that your local service is running: {}",
                    e
                );
            }
        }

        debug!("Authenticated as {}", identity.principal);
        self.vault = Some(vault);
        self.state = SessionState::Authenticated(identity);
        self.notify_session(true);
        let _ = self.refresh_list().await;
        self.status("Authenticated successfully.");
    }

    fn set_anonymous(&mut self) {
        self.vault = None;
        self.state = SessionState::Anonymous;
        self.notify_session(false);
    }

    fn status(&self, message: &str) {
        self.subscribers.values().for_each(|s| {
            s.notify_status(StatusEvent {
                message: message.to_string(),
            });
        });
    }

    fn notify_session(&self, authenticated: bool) {
        self.subscribers.values().for_each(|s| {
            s.notify_session(SessionEvent { authenticated });
        });
    }

    fn notify_listing(&self, event: ListingEvent) {
        self.subscribers
            .values()
            .for_each(|s| s.notify_listing(event.clone()));
    }
}
