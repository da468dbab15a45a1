//! Service layer.
//!
//! Services coordinate the codec with the bus and push capabilities:
//! forwarders move envelopes from the bus to the notification service, the
//! error publisher moves application errors onto the bus.

mod error_publisher;
pub mod forwarder;

pub use error_publisher::ErrorPublisher;
pub use forwarder::{
    ForwardMode, ForwardStats, Forwarder, ForwarderConfig, PullForwarder, StreamForwarder,
    build_forwarder,
};
