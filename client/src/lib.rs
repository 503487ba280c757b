//! The session & upload client.
//!
//! One component owns the whole front-end behavior: it holds the session
//! with the identity collaborator and the transport handle for the remote
//! service, exposes the five user-facing operations (`initialize`,
//! `login`, `logout`, `upload_one`, `refresh_list`), and mediates every
//! visible consequence through subscriber events:
//! - status lines (`StatusEvent`),
//! - visibility transitions on login/logout (`SessionEvent`),
//! - full replacement listings and their placeholders (`ListingEvent`).
//!
//! The client is constructed exactly once at startup and driven by a
//! single caller; each operation is awaited to completion before the next
//! user action is processed, so at most one remote call is ever pending.
//! Every failure is recovered at the point of occurrence and surfaced as
//! a status line; nothing here is fatal to the running front end.

mod client;
mod error;
mod events;

pub use client::{Deployment, SessionState, UploadClient, MAX_UPLOAD_BYTES};
pub use error::ClientError;
pub use events::{ClientSubscriber, ListingEvent, SessionEvent, StatusEvent};
