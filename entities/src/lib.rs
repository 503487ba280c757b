//! Minimal models shared across the stash crates.
//!
//! This crate provides:
//! - `Identity`: the authenticated principal handed out by the identity
//!   collaborator, carrying the opaque credential the transport presents
//!   to the remote service.
//! - `FileRecord`: a single entry of the remote file listing. The listing
//!   is intentionally flat; a name is the only attribute the service
//!   reports back.
//!
//! These types carry no behavior and no dependencies so every other crate
//! (exchanges, client, front ends) can agree on them without pulling in
//! transport or serialization stacks.

mod file;
mod identity;

/// Re-export of a remote file listing entry.
pub use file::FileRecord;
/// Re-export of the authenticated principal.
pub use identity::Identity;
