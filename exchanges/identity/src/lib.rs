//! Identity collaborator contract and its HTTP implementation.
//!
//! The identity collaborator is the external service that establishes and
//! validates a user's delegated session. This crate owns the contract the
//! upload client consumes:
//! - `IdentitySession`: create once at startup, then ask it whether a
//!   persisted session is still valid, log in against a provider URL, log
//!   out, and obtain the authenticated `Identity`.
//! - `LoginResult`: the outcome of a login attempt, consumed synchronously
//!   after the await point. Provider errors fold into `Failure`; a login
//!   never panics and never returns a transport error to match on.
//!
//! `HttpIdentitySession` talks to a provider over HTTP and persists the
//! established session under the user's config directory, so a later
//! process start can resume it without user interaction.

mod http;

use anyhow::Result;
use std::path::PathBuf;

use stash_entities::Identity;
use url::Url;

pub use http::HttpIdentitySession;

/// Outcome of a login attempt against the identity provider.
#[derive(Clone, Debug)]
pub enum LoginResult {
    /// The provider established a session for this principal.
    Success(Identity),
    /// The provider rejected the attempt or could not be reached.
    Failure(String),
}

/// Options for creating a session, mirroring what the provider accepts.
#[derive(Clone, Debug, Default)]
pub struct SessionOptions {
    /// Directory for the persisted session file. Defaults to the
    /// platform config directory when absent.
    pub storage_dir: Option<PathBuf>,
    /// Ask the provider not to expire the session on idle.
    pub disable_idle_timeout: bool,
}

/// A handle on the (possibly not yet established) session with the
/// identity provider.
///
/// Exactly one session handle exists per client. All methods are driven by
/// a single caller; no two provider round-trips are ever in flight at once,
/// so the returned futures carry no auto-trait bounds.
#[allow(async_fn_in_trait)]
pub trait IdentitySession: Send {
    /// Whether a previously established session is still accepted by the
    /// provider. `Ok(false)` means no session or an expired one; `Err` is
    /// reserved for not being able to ask at all.
    async fn is_valid(&mut self) -> Result<bool>;

    /// Establish a session with the given provider.
    async fn login(&mut self, provider: &Url) -> LoginResult;

    /// Revoke the session with the provider and forget it locally.
    async fn logout(&mut self) -> Result<()>;

    /// The identity of the established session, if any.
    fn identity(&self) -> Option<Identity>;
}
