//! Typed per-resource helpers built on [`OpenAiClient::execute`].
//!
//! Providers borrow the client; they hold no state of their own.

pub mod completions;
pub mod images;
pub mod models;

pub use completions::CompletionsProvider;
pub use images::ImagesProvider;
pub use models::ModelsProvider;

use crate::client::OpenAiClient;

impl OpenAiClient {
    /// List and describe the models available in the API.
    pub fn models(&self) -> ModelsProvider<'_> {
        ModelsProvider::new(self)
    }

    /// Create text completions for a prompt.
    pub fn completions(&self) -> CompletionsProvider<'_> {
        CompletionsProvider::new(self)
    }

    /// Generate images from a prompt.
    pub fn images(&self) -> ImagesProvider<'_> {
        ImagesProvider::new(self)
    }
}
