#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

pub mod codec;
pub mod wire;

pub use codec::{DecodeError, EncodeError, decode_event, encode_intent};
