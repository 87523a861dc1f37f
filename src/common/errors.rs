use thiserror::Error;

/// Failures reported by the playback backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// A query or identifier could not be resolved into a playable track.
    #[error("track resolution failed: {0}")]
    Resolve(String),
    /// The backend could not be reached or rejected the request.
    #[error("player backend unavailable: {0}")]
    Unavailable(String),
}

/// Failures reported by the front-end message surface.
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// The referenced message no longer exists or is not visible.
    #[error("message not found")]
    NotFound,
    /// Any other send/edit/fetch failure.
    #[error("surface request failed: {0}")]
    Request(String),
}

/// Engine-level errors.
///
/// The first four variants are user-input rejections: commands answer them
/// synchronously as a refused acknowledgment and nothing else happens.
/// `Backend` failures are surfaced to the user once, with no retry.
/// `Surface` failures only escape on the primary action of a command; the
/// best-effort paths (panel retirement, refresh recovery) swallow them at
/// the call site.
#[derive(Debug, Error)]
pub enum Error {
    #[error("volume must be between 0 and 1000, got {0}")]
    VolumeOutOfRange(i32),

    #[error("nothing is playing")]
    NothingPlaying,

    #[error("nothing is playing or queued")]
    EmptyQueue,

    #[error("could not load `{0}`")]
    LoadFailed(String),

    #[error("no results for `{0}`")]
    NoMatches(String),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// Convenient Result alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// True for rejections caused by user input rather than a collaborator
    /// failure. Front-ends typically answer these ephemerally.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::VolumeOutOfRange(_)
                | Self::NothingPlaying
                | Self::EmptyQueue
                | Self::LoadFailed(_)
                | Self::NoMatches(_)
        )
    }
}
