pub mod errors;
pub mod types;

pub use errors::{BackendError, Error, Result, SurfaceError};
