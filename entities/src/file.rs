use std::hash::Hash;

/// One entry of the remote file listing.
///
/// The remote service reports only a name per file; there is no size,
/// timestamp or content type. Ordering of a listing is whatever the
/// service returned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileRecord {
    pub name: String,
}

impl Hash for FileRecord {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl From<String> for FileRecord {
    fn from(name: String) -> Self {
        Self { name }
    }
}
