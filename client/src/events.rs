use stash_entities::FileRecord;

/// A human-readable status line, surfaced verbatim.
#[derive(Clone, Debug)]
pub struct StatusEvent {
    pub message: String,
}

/// The session flipped between anonymous and authenticated.
///
/// Front ends use this to toggle which actions are visible. On
/// `authenticated == false` any cached listing must be cleared.
#[derive(Clone, Debug)]
pub struct SessionEvent {
    pub authenticated: bool,
}

/// A full replacement of the displayed listing. There is no incremental
/// diffing; each event supersedes the previous one entirely.
#[derive(Clone, Debug)]
pub enum ListingEvent {
    /// The caller's files, in the order the service returned them.
    Files(Vec<FileRecord>),
    /// The service returned zero files; render an explicit empty state.
    Empty,
    /// No session is active; render a login prompt instead of a listing.
    LoginRequired,
    /// The listing could not be fetched.
    Unavailable,
}

/// Receiver of the client's user-visible events.
pub trait ClientSubscriber: Send + Sync {
    fn get_id(&self) -> String;
    fn notify_status(&self, event: StatusEvent);
    fn notify_session(&self, event: SessionEvent);
    fn notify_listing(&self, event: ListingEvent);
}
