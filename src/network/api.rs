use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::Form;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::common::{ChatRequest, Record, RecordId, TraceReport};

use super::error::ApiError;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
const CONNECT_TIMEOUT_SECS: u64 = 10;
const STATUS_SUCCESS: &str = "success";

/// Body returned by both chat endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiReply {
    pub status: String,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiReply {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}

/// `{status, data}` / `{status, message}` wrapper used by the read endpoints.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    status: String,
    data: Option<T>,
    message: Option<String>,
}

impl<T> Envelope<T> {
    fn into_data(self) -> Result<Option<T>, ApiError> {
        if self.status == STATUS_SUCCESS {
            Ok(self.data)
        } else {
            Err(ApiError::Rejected(
                self.message
                    .unwrap_or_else(|| format!("backend reported status `{}`", self.status)),
            ))
        }
    }
}

/// The slice of the AyurTrace HTTP API this client uses.
#[async_trait]
pub trait AyurApi: Send + Sync {
    /// Post a chat query to the endpoint selected by the request.
    async fn send_query(&self, request: &ChatRequest) -> Result<ApiReply, ApiError>;

    /// List every registered herb record.
    async fn fetch_records(&self) -> Result<Vec<Record>, ApiError>;

    /// Origin and processing history of one record.
    async fn trace_record(&self, id: RecordId) -> Result<TraceReport, ApiError>;
}

/// reqwest-backed [`AyurApi`].
pub struct HttpAyurApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpAyurApi {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| ApiError::ClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
            });
        }
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .http
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Self::read_json(response).await
    }
}

#[async_trait]
impl AyurApi for HttpAyurApi {
    async fn send_query(&self, request: &ChatRequest) -> Result<ApiReply, ApiError> {
        let fields = request.form_fields();
        log::debug!(
            "POST {} fields={:?}",
            request.endpoint.path(),
            fields.iter().map(|(name, _)| *name).collect::<Vec<_>>()
        );

        let form = fields
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value));

        let response = self
            .http
            .post(self.url(request.endpoint.path()))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Self::read_json(response).await
    }

    async fn fetch_records(&self) -> Result<Vec<Record>, ApiError> {
        log::debug!("GET /dashboard/");
        let envelope: Envelope<Vec<Record>> = self.get_json("/dashboard/").await?;
        Ok(envelope.into_data()?.unwrap_or_default())
    }

    async fn trace_record(&self, id: RecordId) -> Result<TraceReport, ApiError> {
        log::debug!("GET /trace_herb/{id}");
        let envelope: Envelope<TraceReport> = self.get_json(&format!("/trace_herb/{id}")).await?;
        envelope
            .into_data()?
            .ok_or_else(|| ApiError::Decode("trace response has no data".to_string()))
    }
}
