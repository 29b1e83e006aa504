//! Core types and traits for `wireup` library.
#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::must_use_candidate)]

pub mod error;
pub mod identifier;
pub mod instance;

pub use error::{Error, Result};
pub use identifier::Identifier;
pub use instance::Instance;
