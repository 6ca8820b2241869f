//! Internal compiler errors.
//!
//! These are never user diagnostics: they signal a broken invariant inside the
//! compiler and are expected to abort the compilation with a message that is
//! distinguishable from ordinary `error CSxxxx` output.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InternalError {
    /// A namespace node whose parent chain does not end at a registered root.
    #[error("namespace `{0}` is not attached to any root namespace")]
    OrphanNamespace(String),

    /// A conversion-table path that the table construction rules out.
    #[error("unreachable constant conversion from `{from}` to `{to}`")]
    UnreachableConversion { from: String, to: String },

    /// Locations were encoded before the file table was initialized.
    #[error("location table used before initialization")]
    LocationTableNotInitialized,

    /// An arena id that does not belong to the arena it was used with.
    #[error("unknown {kind} id {id}")]
    UnknownId { kind: &'static str, id: u32 },
}

impl InternalError {
    pub fn unknown(kind: &'static str, id: u32) -> Self {
        InternalError::UnknownId { kind, id }
    }
}
