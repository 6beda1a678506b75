//! # openai-kit
//!
//! Typed client for the OpenAI HTTP API with in-flight request coalescing.
//!
//! ## Overview
//!
//! Calls are described by [`Endpoint`] values tagged with the response type they decode
//! into. The client compiles an endpoint into a concrete HTTP request, sends it, and
//! decodes the JSON response. Concurrent calls that compile to the same request share
//! one network operation: every caller receives the same outcome, and the shared slot is
//! cleared as soon as the operation finishes so later calls go back to the network.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use openai_kit::{Credentials, OpenAiClient};
//!
//! #[tokio::main]
//! async fn main() -> openai_kit::Result<()> {
//!     let client = OpenAiClient::builder()
//!         .credentials(Credentials::new("sk-...", None)?)
//!         .build()?;
//!
//!     let model = client.models().retrieve("text-davinci-003").await?;
//!     println!("{}", model);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`endpoint`] | Declarative endpoint descriptors |
//! | [`request`] | Endpoint-to-request compiler and request identity |
//! | [`client`] | Execution engine with in-flight coalescing |
//! | [`codec`] | JSON encoding and typed response decoding |
//! | [`transport`] | HTTP abstraction and the reqwest implementation |
//! | [`providers`] | Models, completions and images helpers |
//! | [`config`] | Credentials and HTTP settings |

pub mod client;
pub mod codec;
pub mod config;
pub mod endpoint;
pub mod providers;
pub mod request;
pub mod transport;

pub use client::{ClientBuilder, InflightSnapshot, OpenAiClient};
pub use codec::JsonCodec;
pub use config::{Credentials, HttpConfig};
pub use endpoint::{Endpoint, Method};
pub use providers::completions::{CompletionModel, CompletionRequest, Prompt};
pub use providers::images::{CreateImageRequest, Image};
pub use providers::models::Model;
pub use request::{CompiledRequest, RequestIdentity};
pub use transport::{RawResponse, Transport, TransportError};

// Cancellation tokens accepted by `OpenAiClient::execute_with_cancel`.
pub use tokio_util::sync::CancellationToken;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
