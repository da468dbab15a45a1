//! Envelope encoding and decoding.
//!
//! - `decoder`: raw bus payload to validated envelope
//! - `error_encoder`: application error (with its cause chain) to error envelope

mod decoder;
mod error_encoder;

pub use decoder::{DecodeError, decode};
pub use error_encoder::{ErrorChain, encode_error, error_chain};
