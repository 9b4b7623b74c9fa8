//! Message segmentation and webhook publishing.

pub mod segment;
pub mod webhook;

pub use segment::segment;
pub use webhook::{
    CHAR_LIMIT, DEFAULT_CHUNK_DELAY, PublishOutcome, SUFFIX_RESERVE, WebhookPublisher,
    with_part_suffix,
};
