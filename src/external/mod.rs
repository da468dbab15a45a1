//! Clients for the systems the bridge talks to.

pub mod bus;
pub mod client;
pub mod ntfy;
