//! `POST /v1/images/generations`

use crate::client::OpenAiClient;
use crate::endpoint::{Endpoint, Method};
use crate::Result;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageSize {
    #[serde(rename = "256x256")]
    Res256,
    #[serde(rename = "512x512")]
    Res512,
    #[serde(rename = "1024x1024")]
    Res1024,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    #[serde(rename = "url")]
    Url,
    #[serde(rename = "b64_json")]
    Base64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateImageRequest {
    /// Text description of the desired image(s), at most 1000 characters.
    pub prompt: String,
    /// Number of images, 1 to 10.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<ImageSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ImageFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl CreateImageRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            n: None,
            size: None,
            response_format: None,
            user: None,
        }
    }

    pub fn n(mut self, n: u8) -> Self {
        self.n = Some(n);
        self
    }

    pub fn size(mut self, size: ImageSize) -> Self {
        self.size = Some(size);
        self
    }

    pub fn response_format(mut self, format: ImageFormat) -> Self {
        self.response_format = Some(format);
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }
}

/// A generated image: either a hosted URL or inline base64 data, depending on the
/// requested `response_format`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Image {
    Url { url: String },
    Base64 { b64_json: String },
}

impl Image {
    /// Raw image bytes for inline payloads; `None` for hosted images.
    pub fn bytes(&self) -> Option<std::result::Result<Vec<u8>, base64::DecodeError>> {
        match self {
            Image::Url { .. } => None,
            Image::Base64 { b64_json } => Some(STANDARD.decode(b64_json)),
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Image::Url { url } => Some(url),
            Image::Base64 { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImageResponse {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created: DateTime<Utc>,
    pub data: Vec<Image>,
}

pub fn create_image(client: &OpenAiClient, request: CreateImageRequest) -> Endpoint<ImageResponse> {
    client
        .endpoint(Method::Post, "/v1/images/generations")
        .with_body(request)
}

pub struct ImagesProvider<'a> {
    client: &'a OpenAiClient,
}

impl<'a> ImagesProvider<'a> {
    pub fn new(client: &'a OpenAiClient) -> Self {
        Self { client }
    }

    pub async fn create(&self, request: CreateImageRequest) -> Result<Vec<Image>> {
        let response = self
            .client
            .execute(&create_image(self.client, request))
            .await?;
        Ok(response.data)
    }

    pub fn create_with_callback<F>(
        &self,
        request: CreateImageRequest,
        completion: F,
    ) -> Option<JoinHandle<()>>
    where
        F: FnOnce(Option<Vec<Image>>) + Send + 'static,
    {
        self.client.execute_with_callback(
            create_image(self.client, request),
            move |response| completion(response.map(|r| r.data)),
        )
    }
}
