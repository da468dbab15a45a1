//! natsify
//!
//! Forwards notification envelopes from a NATS subject to an ntfy server and
//! lets other processes report their errors onto the bus.

use shadow_rs::shadow;
shadow!(build);

pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod external;
pub mod logger;
pub mod models;
pub mod services;
pub mod shutdown;

#[cfg(test)]
pub(crate) mod testing;

pub fn pkg_version() -> &'static str {
    build::PKG_VERSION
}

pub fn clap_long_version() -> &'static str {
    build::CLAP_LONG_VERSION
}
