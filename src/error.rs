use thiserror::Error;

/// Errors reported by the index.
///
/// A missing key is not an error: lookups and removals return `None`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexError {
    /// The key is already stored; the existing payload is left untouched.
    #[error("key {key:#x} is already present")]
    DuplicateKey { key: u64 },

    /// The key is wider than the index height allows.
    #[error("key {key:#x} does not fit in an index of height {height}")]
    InvalidKey { key: u64, height: u8 },

    /// The requested height exceeds [MAX_HEIGHT](crate::MAX_HEIGHT).
    #[error("height {height} exceeds the maximum height {max}")]
    InvalidHeight { height: u8, max: u8 },
}
