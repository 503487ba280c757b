use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use stash_client::{
    ClientError, ClientSubscriber, Deployment, ListingEvent, SessionEvent,
    StatusEvent, UploadClient, MAX_UPLOAD_BYTES,
};
use stash_entities::{FileRecord, Identity};
use stashx_identity::{IdentitySession, LoginResult};
use stashx_vault::{Vault, VaultBinder};
use url::Url;

fn identity() -> Identity {
    Identity {
        principal: "principal-abc".to_string(),
        credential: "tok-123".to_string(),
    }
}

fn provider() -> Url {
    Url::parse("http://127.0.0.1:4943").unwrap()
}

/// Mock implementation of IdentitySession for testing
#[derive(Default)]
struct SessionLog {
    login_calls: usize,
    logout_calls: usize,
}

struct MockSession {
    valid: bool,
    fail_login: bool,
    identity: Option<Identity>,
    log: Arc<Mutex<SessionLog>>,
}

impl MockSession {
    fn anonymous(log: Arc<Mutex<SessionLog>>) -> Self {
        Self {
            valid: false,
            fail_login: false,
            identity: None,
            log,
        }
    }

    fn persisted(log: Arc<Mutex<SessionLog>>) -> Self {
        Self {
            valid: true,
            fail_login: false,
            identity: Some(identity()),
            log,
        }
    }
}

impl IdentitySession for MockSession {
    async fn is_valid(&mut self) -> Result<bool> {
        Ok(self.valid)
    }

    async fn login(&mut self, _provider: &Url) -> LoginResult {
        self.log.lock().unwrap().login_calls += 1;
        if self.fail_login {
            return LoginResult::Failure("provider rejected".to_string());
        }
        self.identity = Some(identity());
        LoginResult::Success(identity())
    }

    async fn logout(&mut self) -> Result<()> {
        self.log.lock().unwrap().logout_calls += 1;
        self.identity = None;
        Ok(())
    }

    fn identity(&self) -> Option<Identity> {
        self.identity.clone()
    }
}

/// Mock implementation of Vault/VaultBinder recording every remote call
#[derive(Default)]
struct VaultLog {
    binds: usize,
    uploads: Vec<(String, Vec<u8>)>,
    list_calls: usize,
    anchor_fetches: usize,
}

#[derive(Clone, Default)]
struct VaultBehavior {
    listing: Vec<String>,
    ack: String,
    fail_upload: bool,
    fail_listing: bool,
    fail_anchor: bool,
}

struct MockVault {
    behavior: VaultBehavior,
    log: Arc<Mutex<VaultLog>>,
}

impl Vault for MockVault {
    async fn upload_file(&self, name: &str, bytes: &[u8]) -> Result<String> {
        self.log
            .lock()
            .unwrap()
            .uploads
            .push((name.to_string(), bytes.to_vec()));
        if self.behavior.fail_upload {
            bail!("service refused the upload");
        }
        Ok(self.behavior.ack.clone())
    }

    async fn list_files(&self) -> Result<Vec<FileRecord>> {
        self.log.lock().unwrap().list_calls += 1;
        if self.behavior.fail_listing {
            bail!("service refused the listing");
        }
        Ok(self
            .behavior
            .listing
            .iter()
            .cloned()
            .map(FileRecord::from)
            .collect())
    }

    async fn fetch_trust_anchor(&mut self) -> Result<()> {
        self.log.lock().unwrap().anchor_fetches += 1;
        if self.behavior.fail_anchor {
            bail!("no local service running");
        }
        Ok(())
    }
}

struct MockBinder {
    behavior: VaultBehavior,
    log: Arc<Mutex<VaultLog>>,
}

impl VaultBinder for MockBinder {
    type Handle = MockVault;

    fn bind(&self, _identity: &Identity) -> Result<MockVault> {
        self.log.lock().unwrap().binds += 1;
        Ok(MockVault {
            behavior: self.behavior.clone(),
            log: self.log.clone(),
        })
    }
}

/// Subscriber recording every surfaced event
#[derive(Default)]
struct SubscriberLog {
    statuses: Vec<String>,
    sessions: Vec<bool>,
    listings: Vec<ListingEvent>,
}

struct RecordingSubscriber {
    id: String,
    log: Arc<Mutex<SubscriberLog>>,
}

impl ClientSubscriber for RecordingSubscriber {
    fn get_id(&self) -> String {
        self.id.clone()
    }

    fn notify_status(&self, event: StatusEvent) {
        self.log.lock().unwrap().statuses.push(event.message);
    }

    fn notify_session(&self, event: SessionEvent) {
        self.log
            .lock()
            .unwrap()
            .sessions
            .push(event.authenticated);
    }

    fn notify_listing(&self, event: ListingEvent) {
        self.log.lock().unwrap().listings.push(event);
    }
}

struct Harness {
    session_log: Arc<Mutex<SessionLog>>,
    vault_log: Arc<Mutex<VaultLog>>,
    subscriber_log: Arc<Mutex<SubscriberLog>>,
    client: UploadClient<MockSession, MockBinder>,
}

fn harness(
    session: fn(Arc<Mutex<SessionLog>>) -> MockSession,
    behavior: VaultBehavior,
    deployment: Deployment,
) -> Harness {
    let session_log = Arc::new(Mutex::new(SessionLog::default()));
    let vault_log = Arc::new(Mutex::new(VaultLog::default()));
    let subscriber_log = Arc::new(Mutex::new(SubscriberLog::default()));

    let mut client = UploadClient::new(
        session(session_log.clone()),
        MockBinder {
            behavior,
            log: vault_log.clone(),
        },
        provider(),
        deployment,
    );
    client.subscribe(Arc::new(RecordingSubscriber {
        id: "recording".to_string(),
        log: subscriber_log.clone(),
    }));

    Harness {
        session_log,
        vault_log,
        subscriber_log,
        client,
    }
}

fn statuses(harness: &Harness) -> Vec<String> {
    harness.subscriber_log.lock().unwrap().statuses.clone()
}

#[tokio::test]
async fn upload_within_cap_issues_exactly_one_call_with_exact_arguments() {
    let mut h = harness(
        MockSession::persisted,
        VaultBehavior {
            ack: "stored".to_string(),
            ..Default::default()
        },
        Deployment::Local,
    );
    h.client.initialize().await;

    h.client.upload_one("a.txt", b"abc").await.unwrap();

    let uploads = h.vault_log.lock().unwrap().uploads.clone();
    assert_eq!(uploads, vec![("a.txt".to_string(), b"abc".to_vec())]);
}

#[tokio::test]
async fn upload_over_cap_issues_zero_calls_and_surfaces_the_limit() {
    let mut h = harness(
        MockSession::persisted,
        VaultBehavior::default(),
        Deployment::Local,
    );
    h.client.initialize().await;

    let oversized = vec![0u8; MAX_UPLOAD_BYTES as usize + 1];
    let result = h.client.upload_one("big.bin", &oversized).await;

    assert!(matches!(result, Err(ClientError::SizeCapExceeded(_))));
    assert!(h.vault_log.lock().unwrap().uploads.is_empty());
    assert!(statuses(&h)
        .iter()
        .any(|s| s == "File size exceeds 10MB limit"));
}

#[tokio::test]
async fn upload_at_exactly_the_cap_is_sent() {
    let mut h = harness(
        MockSession::persisted,
        VaultBehavior {
            ack: "stored".to_string(),
            ..Default::default()
        },
        Deployment::Local,
    );
    h.client.initialize().await;

    let capped = vec![0u8; MAX_UPLOAD_BYTES as usize];
    h.client.upload_one("cap.bin", &capped).await.unwrap();

    assert_eq!(h.vault_log.lock().unwrap().uploads.len(), 1);
}

#[tokio::test]
async fn upload_with_no_selection_is_rejected_before_any_call() {
    let mut h = harness(
        MockSession::persisted,
        VaultBehavior::default(),
        Deployment::Local,
    );
    h.client.initialize().await;

    let result = h.client.upload_one("", b"abc").await;

    assert!(matches!(result, Err(ClientError::NoFileSelected)));
    assert!(h.vault_log.lock().unwrap().uploads.is_empty());
    assert!(statuses(&h).iter().any(|s| s == "Please select a file"));
}

#[tokio::test]
async fn empty_remote_result_renders_an_explicit_empty_state() {
    let mut h = harness(
        MockSession::persisted,
        VaultBehavior::default(),
        Deployment::Local,
    );
    h.client.initialize().await;

    let listings = h.subscriber_log.lock().unwrap().listings.clone();
    assert!(
        matches!(listings.last(), Some(ListingEvent::Empty)),
        "an empty listing must be an explicit empty state, got {:?}",
        listings.last()
    );
}

#[tokio::test]
async fn listing_is_replaced_in_service_order() {
    let mut h = harness(
        MockSession::persisted,
        VaultBehavior {
            listing: vec!["b.txt".to_string(), "a.txt".to_string()],
            ..Default::default()
        },
        Deployment::Local,
    );
    h.client.initialize().await;

    let listings = h.subscriber_log.lock().unwrap().listings.clone();
    match listings.last() {
        Some(ListingEvent::Files(files)) => {
            let names: Vec<&str> =
                files.iter().map(|f| f.name.as_str()).collect();
            assert_eq!(names, vec!["b.txt", "a.txt"]);
        }
        other => panic!("expected a listing, got {:?}", other),
    }
}

#[tokio::test]
async fn operations_after_logout_are_noops_with_a_login_message() {
    let mut h = harness(
        MockSession::persisted,
        VaultBehavior::default(),
        Deployment::Local,
    );
    h.client.initialize().await;
    h.client.logout().await.unwrap();

    let uploads_before = h.vault_log.lock().unwrap().uploads.len();
    let lists_before = h.vault_log.lock().unwrap().list_calls;

    let upload = h.client.upload_one("a.txt", b"abc").await;
    let refresh = h.client.refresh_list().await;

    assert!(matches!(upload, Err(ClientError::LoginRequired)));
    assert!(matches!(refresh, Err(ClientError::LoginRequired)));
    assert_eq!(h.vault_log.lock().unwrap().uploads.len(), uploads_before);
    assert_eq!(h.vault_log.lock().unwrap().list_calls, lists_before);
    assert!(statuses(&h).iter().any(|s| s == "Please login first"));

    let listings = h.subscriber_log.lock().unwrap().listings.clone();
    assert!(matches!(listings.last(), Some(ListingEvent::LoginRequired)));
}

#[tokio::test]
async fn initialize_resumes_a_valid_session_without_login() {
    let mut h = harness(
        MockSession::persisted,
        VaultBehavior::default(),
        Deployment::Local,
    );
    h.client.initialize().await;

    assert!(h.client.is_authenticated());
    assert_eq!(h.session_log.lock().unwrap().login_calls, 0);
    assert_eq!(h.vault_log.lock().unwrap().list_calls, 1);
}

#[tokio::test]
async fn initialize_without_a_session_stays_anonymous() {
    let mut h = harness(
        MockSession::anonymous,
        VaultBehavior::default(),
        Deployment::Local,
    );
    h.client.initialize().await;

    assert!(!h.client.is_authenticated());
    assert_eq!(h.vault_log.lock().unwrap().binds, 0);
    let sessions = h.subscriber_log.lock().unwrap().sessions.clone();
    assert_eq!(sessions.last(), Some(&false));
}

#[tokio::test]
async fn successful_login_creates_one_transport_and_refreshes_once() {
    let mut h = harness(
        MockSession::anonymous,
        VaultBehavior::default(),
        Deployment::Local,
    );
    h.client.initialize().await;
    h.client.login().await.unwrap();

    assert!(h.client.is_authenticated());
    assert_eq!(h.session_log.lock().unwrap().login_calls, 1);
    assert_eq!(h.vault_log.lock().unwrap().binds, 1);
    assert_eq!(h.vault_log.lock().unwrap().list_calls, 1);
    let sessions = h.subscriber_log.lock().unwrap().sessions.clone();
    assert_eq!(sessions.last(), Some(&true));
}

#[tokio::test]
async fn failed_login_returns_to_anonymous() {
    let session_log = Arc::new(Mutex::new(SessionLog::default()));
    let vault_log = Arc::new(Mutex::new(VaultLog::default()));
    let subscriber_log = Arc::new(Mutex::new(SubscriberLog::default()));

    let mut client = UploadClient::new(
        MockSession {
            valid: false,
            fail_login: true,
            identity: None,
            log: session_log.clone(),
        },
        MockBinder {
            behavior: VaultBehavior::default(),
            log: vault_log.clone(),
        },
        provider(),
        Deployment::Local,
    );
    client.subscribe(Arc::new(RecordingSubscriber {
        id: "recording".to_string(),
        log: subscriber_log.clone(),
    }));

    let result = client.login().await;

    assert!(matches!(result, Err(ClientError::Login(_))));
    assert!(!client.is_authenticated());
    assert_eq!(vault_log.lock().unwrap().binds, 0);
    let statuses = subscriber_log.lock().unwrap().statuses.clone();
    assert!(statuses
        .iter()
        .any(|s| s == "Login failed. Please try again."));
}

#[tokio::test]
async fn upload_acknowledgment_is_displayed_verbatim() {
    let mut h = harness(
        MockSession::persisted,
        VaultBehavior {
            ack: "ok".to_string(),
            ..Default::default()
        },
        Deployment::Local,
    );
    h.client.initialize().await;

    h.client.upload_one("a.txt", b"abc").await.unwrap();

    assert!(statuses(&h).iter().any(|s| s == "ok"));
}

#[tokio::test]
async fn upload_failure_leaves_state_unchanged_and_surfaces_the_error() {
    let mut h = harness(
        MockSession::persisted,
        VaultBehavior {
            fail_upload: true,
            ..Default::default()
        },
        Deployment::Local,
    );
    h.client.initialize().await;

    let result = h.client.upload_one("a.txt", b"abc").await;

    assert!(matches!(result, Err(ClientError::RemoteUpload(_))));
    assert!(h.client.is_authenticated());
    assert!(statuses(&h)
        .iter()
        .any(|s| s.starts_with("Error uploading file:")));
}

#[tokio::test]
async fn trust_anchor_failure_is_tolerated_on_local_deployments() {
    let mut h = harness(
        MockSession::persisted,
        VaultBehavior {
            fail_anchor: true,
            ..Default::default()
        },
        Deployment::Local,
    );
    h.client.initialize().await;

    assert!(h.client.is_authenticated());
    assert_eq!(h.vault_log.lock().unwrap().anchor_fetches, 1);
    assert!(statuses(&h)
        .iter()
        .any(|s| s == "Authenticated successfully."));
}

#[tokio::test]
async fn trust_anchor_is_not_fetched_in_production() {
    let mut h = harness(
        MockSession::persisted,
        VaultBehavior::default(),
        Deployment::Production,
    );
    h.client.initialize().await;

    assert!(h.client.is_authenticated());
    assert_eq!(h.vault_log.lock().unwrap().anchor_fetches, 0);
}

#[tokio::test]
async fn listing_failure_surfaces_and_renders_unavailable() {
    let mut h = harness(
        MockSession::persisted,
        VaultBehavior {
            fail_listing: true,
            ..Default::default()
        },
        Deployment::Local,
    );
    h.client.initialize().await;

    let result = h.client.refresh_list().await;

    assert!(matches!(result, Err(ClientError::RemoteList(_))));
    assert!(statuses(&h).iter().any(|s| s == "Error fetching files."));
    let listings = h.subscriber_log.lock().unwrap().listings.clone();
    assert!(matches!(listings.last(), Some(ListingEvent::Unavailable)));
}

#[tokio::test]
async fn upload_refreshes_the_listing_only_after_the_acknowledgment() {
    let mut h = harness(
        MockSession::persisted,
        VaultBehavior {
            ack: "ok".to_string(),
            listing: vec!["a.txt".to_string()],
            ..Default::default()
        },
        Deployment::Local,
    );
    h.client.initialize().await;
    let lists_before = h.vault_log.lock().unwrap().list_calls;

    h.client.upload_one("a.txt", b"abc").await.unwrap();

    assert_eq!(h.vault_log.lock().unwrap().list_calls, lists_before + 1);
    let all = statuses(&h);
    let ack_at = all.iter().position(|s| s == "ok").unwrap();
    let fetch_at = all.iter().rposition(|s| s == "Fetching files...").unwrap();
    assert!(
        ack_at < fetch_at,
        "listing refresh must come strictly after the acknowledgment"
    );
}
