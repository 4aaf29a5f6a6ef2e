pub mod authorization;
pub mod calendar;
pub mod clock;
pub mod error;
pub mod feedback;
pub mod memory;
pub mod notifications;
pub mod reminder;
pub mod scheduler;
pub mod service;
pub mod store;

pub use crate::error::{BallotError, BallotResult, PlatformError};
pub use crate::service::{BallotService, BallotServiceBuilder};

/// Callback a capability invokes once its asynchronous work finishes.
pub type Completion<T> = Box<dyn FnOnce(T) + Send + 'static>;
