mod envelope;

pub use envelope::{ERROR_SEVERITY_TAG, Envelope, Priority, TAG_RED_CIRCLE};
