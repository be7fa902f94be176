use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A non-binary record with no content on either side, which the
    /// scanner never produces for added or modified files.
    #[error("Malformed change record for {path}: {reason}")]
    MalformedRecord { path: String, reason: String },

    #[error("Nothing to assemble: no files selected and no README available")]
    MissingSelection,
}
