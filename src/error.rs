use crate::FrameId;

/// Frame eviction policy error.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum EvictError<F: FrameId> {
    /// The frame is not tracked by the replacer.
    #[error("Unknown frame id: {0}")]
    UnknownFrame(F),

    /// Trying to remove a pinned frame.
    #[error("Trying to remove pinned frame: {0}")]
    PinnedFrameRemoval(F),
}

/// Frame eviction policy result type.
pub type EvictResult<T, F> = Result<T, EvictError<F>>;
