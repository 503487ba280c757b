use std::hash::Hash;

/// An authenticated principal obtained from the identity collaborator.
///
/// The credential is an opaque capability string. It is never inspected by
/// the client; the transport presents it verbatim to the remote service.
#[derive(Clone)]
pub struct Identity {
    pub principal: String,
    pub credential: String,
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The credential must not leak into logs.
        f.debug_struct("Identity")
            .field("principal", &self.principal)
            .finish()
    }
}

impl Hash for Identity {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.principal.hash(state);
    }
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.principal == other.principal
    }
}

impl Eq for Identity {}
