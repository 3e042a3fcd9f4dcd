//! `FeatureStore` over the REST contract, using `gloo::net::http`.

use gloo::net::http::{Request, RequestBuilder, Response};
use mapedit_core::api::{self, ErrorBody, Routes};
use mapedit_core::{FeatureId, FeatureRecord, FeatureStore, StoreError};
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct RestFeatureStore {
    base_url: String,
}

impl RestFeatureStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send<F: FeatureRecord>(
        &self,
        request: RequestBuilder,
        body: Option<&F>,
        id: Option<&FeatureId>,
    ) -> Result<Value, StoreError> {
        let request = match body {
            Some(feature) => request.json(feature),
            None => request.build(),
        }
        .map_err(|e| StoreError::Unexpected(e.to_string()))?;

        let response = request
            .send()
            .await
            .map_err(|e| StoreError::ServiceUnavailable(e.to_string()))?;

        let status = response.status();
        debug!(kind = %F::KIND, status, url = %response.url(), "response");

        if !response.ok() {
            return Err(failure::<F>(response, id).await);
        }

        let text = response
            .text()
            .await
            .map_err(|e| StoreError::Unexpected(e.to_string()))?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| StoreError::Unexpected(format!("malformed response: {e}")))
    }
}

async fn failure<F: FeatureRecord>(response: Response, id: Option<&FeatureId>) -> StoreError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    // Error bodies are JSON when the service produced them; proxies send plain text.
    let message = serde_json::from_str::<ErrorBody>(&text).map_or(text, |body| body.describe());
    StoreError::from_status(status, F::KIND, id, message)
}

fn decode_error(e: &serde_json::Error) -> StoreError {
    StoreError::Unexpected(format!("malformed response: {e}"))
}

impl FeatureStore for RestFeatureStore {
    async fn fetch_all<F: FeatureRecord>(&self) -> Result<Vec<F>, StoreError> {
        let routes = Routes::of(F::KIND);
        let body = self
            .send::<F>(Request::get(&self.url(&routes.list_path())), None, None)
            .await?;
        api::decode_list(body).map_err(|e| decode_error(&e))
    }

    async fn fetch_one<F: FeatureRecord>(&self, id: &FeatureId) -> Result<F, StoreError> {
        let routes = Routes::of(F::KIND);
        let body = self
            .send::<F>(Request::get(&self.url(&routes.one_path(id))), None, Some(id))
            .await?;
        api::decode_feature(body).map_err(|e| decode_error(&e))
    }

    async fn create<F: FeatureRecord>(&self, draft: &F) -> Result<F, StoreError> {
        let routes = Routes::of(F::KIND);
        let body = self
            .send(Request::post(&self.url(&routes.create_path())), Some(draft), None)
            .await?;
        api::decode_feature(body).map_err(|e| decode_error(&e))
    }

    async fn update<F: FeatureRecord>(&self, id: &FeatureId, draft: &F) -> Result<F, StoreError> {
        let routes = Routes::of(F::KIND);
        let mut draft = draft.clone();
        draft.set_id(Some(id.clone()));
        let body = self
            .send(Request::put(&self.url(&routes.update_path())), Some(&draft), Some(id))
            .await?;
        api::decode_feature(body).map_err(|e| decode_error(&e))
    }

    async fn delete<F: FeatureRecord>(&self, id: &FeatureId) -> Result<(), StoreError> {
        let routes = Routes::of(F::KIND);
        match self
            .send::<F>(Request::delete(&self.url(&routes.delete_path(id))), None, Some(id))
            .await
        {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e),
        }
    }
}
