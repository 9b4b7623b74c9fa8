//! Operator notification on unrecoverable failure.

pub mod email;

pub use email::{FailureNotifier, NotifyOutcome, SUBJECT_PREFIX};
