//! Remote service contract and its HTTP implementation.
//!
//! The remote service is an opaque backend exposing exactly two
//! operations: upload a file, list the caller's files. This crate owns
//! the transport side of that boundary:
//! - `Vault`: the capability used to invoke the two operations under one
//!   authenticated identity.
//! - `VaultBinder`: constructs a `Vault` bound 1:1 to an `Identity`. The
//!   upload client holds at most one bound vault at a time and drops it
//!   on logout.
//!
//! Listings are identity-scoped: the transport always presents the bound
//! identity's credential, so the service only ever reports the caller's
//! own files.

mod http;

use anyhow::Result;

use stash_entities::{FileRecord, Identity};

pub use http::{HttpVault, HttpVaultBinder};

/// Capability to invoke the two remote operations under one identity.
///
/// Driven by a single caller with at most one call pending, so the
/// returned futures carry no auto-trait bounds.
#[allow(async_fn_in_trait)]
pub trait Vault: Send {
    /// Upload one file. Returns the service's textual acknowledgment.
    async fn upload_file(&self, name: &str, bytes: &[u8]) -> Result<String>;

    /// Fetch the full listing of the caller's files. The returned order
    /// is whatever the service produced.
    async fn list_files(&self) -> Result<Vec<FileRecord>>;

    /// Retrieve the local service's trust anchor so a development
    /// deployment can be trusted. Only called outside production; the
    /// caller tolerates failure.
    async fn fetch_trust_anchor(&mut self) -> Result<()>;
}

/// Constructs the vault capability for an authenticated identity.
pub trait VaultBinder: Send {
    type Handle: Vault;

    fn bind(&self, identity: &Identity) -> Result<Self::Handle>;
}
