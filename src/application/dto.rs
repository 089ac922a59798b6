use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{
    detection::Detection,
    errors::{DomainError, DomainResult},
};

pub const MISSING_IMAGE_URL: &str = "No image URL provided";
pub const FETCH_FAILED_MESSAGE: &str = "Resim alınırken hata oluştu";
pub const DECODE_FAILED_MESSAGE: &str = "Resim yüklenemedi";

const ANONYMOUS: &str = "anonymous";

/// Caller identity, echoed back exactly as the client sent it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Value);

impl Default for UserId {
    fn default() -> Self {
        UserId(Value::String(ANONYMOUS.to_string()))
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::String(s) => f.write_str(s),
            other => write!(f, "{}", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetectRequest {
    pub image_url: String,
    pub user_id: UserId,
}

impl DetectRequest {
    /// Parses a raw `/detect` body. An empty, non-JSON or non-object body, or one
    /// without a string `image_url`, is reported as a missing URL.
    ///
    /// `user.id` may be any JSON value, `null` included. Only an absent `id`
    /// (or an absent / null `user`) falls back to `"anonymous"`.
    pub fn from_body(body: &[u8]) -> DomainResult<Self> {
        let missing = || DomainError::BadRequest(MISSING_IMAGE_URL.to_string());

        let value: Value = serde_json::from_slice(body).map_err(|_| missing())?;
        let image_url = value
            .get("image_url")
            .and_then(Value::as_str)
            .ok_or_else(missing)?
            .to_string();

        let user_id = match value.get("user") {
            None | Some(Value::Null) => UserId::default(),
            Some(Value::Object(user)) => user.get("id").cloned().map(UserId).unwrap_or_default(),
            Some(_) => {
                return Err(DomainError::BadRequest(
                    "invalid user: must be an object".to_string(),
                ))
            }
        };

        Ok(Self { image_url, user_id })
    }

    pub fn user_id(&self) -> UserId {
        self.user_id.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectResponse {
    pub status: ResponseStatus,
    pub user_id: UserId,
    pub objects: Vec<Detection>,
}

impl DetectResponse {
    pub fn success(user_id: UserId, objects: Vec<Detection>) -> Self {
        Self {
            status: ResponseStatus::Success,
            user_id,
            objects,
        }
    }
}

/// Body for malformed requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestErrorBody {
    pub error: String,
}

/// Body for fetch, decode and internal failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureBody {
    pub status: ResponseStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl FailureBody {
    pub fn new(message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            message: message.into(),
            details,
        }
    }
}
