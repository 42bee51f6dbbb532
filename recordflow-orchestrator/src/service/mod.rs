//! Service Module
//!
//! Run dispatch and status tracking behind the HTTP handlers.

pub mod dispatcher;
pub mod registry;

pub use dispatcher::{DispatchError, Dispatcher, Pipelines, RunRequest};
pub use registry::RunRegistry;
