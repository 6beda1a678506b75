//! Request execution engine.
//!
//! Keep the public surface small: [`OpenAiClient`] plus its builder. Registry internals
//! live in `inflight` and are never exposed.

pub mod builder;
pub mod core;
mod inflight;
pub mod signals;

pub use builder::ClientBuilder;
pub use core::OpenAiClient;
pub use signals::InflightSnapshot;
