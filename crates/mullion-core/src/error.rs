use crate::platform::PlatformError;

/// Errors that can escape a modal loop. Logical misuse (out-of-order pops,
/// re-entering a loop concurrently) is a programming error and panics
/// instead of surfacing here.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Platform(#[from] PlatformError),
}
