use crate::client::OpenAiClient;
use crate::endpoint::{Endpoint, Method};
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub id: String,
    pub object: String,
    pub owned_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission: Option<Vec<Permission>>,
}

impl Model {
    pub fn name(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.object, self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Permission {
    pub id: String,
    pub object: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created: DateTime<Utc>,
    pub allow_create_engine: bool,
    pub allow_sampling: bool,
    pub allow_logprobs: bool,
    pub allow_search_indices: bool,
    pub allow_view: bool,
    pub allow_fine_tuning: bool,
    pub organization: String,
    pub group: Option<String>,
    pub is_blocking: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelList {
    pub object: String,
    pub data: Vec<Model>,
}

/// `GET /v1/models`
pub fn list_models(client: &OpenAiClient) -> Endpoint<ModelList> {
    client.endpoint(Method::Get, "/v1/models")
}

/// `GET /v1/models/{model}`
pub fn retrieve_model(client: &OpenAiClient, model: &str) -> Endpoint<Model> {
    client.endpoint(Method::Get, format!("/v1/models/{}", model))
}

pub struct ModelsProvider<'a> {
    client: &'a OpenAiClient,
}

impl<'a> ModelsProvider<'a> {
    pub fn new(client: &'a OpenAiClient) -> Self {
        Self { client }
    }

    /// Currently available models, with owner and availability.
    pub async fn list(&self) -> Result<Vec<Model>> {
        let response = self.client.execute(&list_models(self.client)).await?;
        Ok(response.data)
    }

    pub fn list_with_callback<F>(&self, completion: F) -> Option<JoinHandle<()>>
    where
        F: FnOnce(Option<Vec<Model>>) + Send + 'static,
    {
        self.client
            .execute_with_callback(list_models(self.client), move |response| {
                completion(response.map(|list| list.data))
            })
    }

    /// A single model instance, with owner and permissioning.
    pub async fn retrieve(&self, model: &str) -> Result<Model> {
        self.client
            .execute(&retrieve_model(self.client, model))
            .await
    }

    pub fn retrieve_with_callback<F>(
        &self,
        model: &str,
        completion: F,
    ) -> Option<JoinHandle<()>>
    where
        F: FnOnce(Option<Model>) + Send + 'static,
    {
        self.client
            .execute_with_callback(retrieve_model(self.client, model), completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::JsonCodec;

    const MODEL_JSON: &str = r#"{
        "id": "text-davinci-003",
        "object": "model",
        "owned_by": "openai-internal",
        "permission": [{
            "id": "modelperm-1",
            "object": "model_permission",
            "created": 1674000000000,
            "allow_create_engine": false,
            "allow_sampling": true,
            "allow_logprobs": true,
            "allow_search_indices": false,
            "allow_view": true,
            "allow_fine_tuning": false,
            "organization": "*",
            "group": null,
            "is_blocking": false
        }]
    }"#;

    #[test]
    fn decodes_model_with_permissions() {
        let model: Model = JsonCodec::new().decode(MODEL_JSON.as_bytes(), 200).unwrap();
        assert_eq!(model.name(), "text-davinci-003");
        assert_eq!(model.to_string(), "model: text-davinci-003");
        let perm = &model.permission.as_ref().unwrap()[0];
        assert_eq!(perm.created.timestamp_millis(), 1_674_000_000_000);
        assert!(perm.allow_sampling);
        assert_eq!(perm.group, None);
    }

    #[test]
    fn permission_is_optional() {
        let body = br#"{"id":"ada","object":"model","owned_by":"openai"}"#;
        let model: Model = JsonCodec::new().decode(body, 200).unwrap();
        assert!(model.permission.is_none());
    }
}
