use inferences::{Label, PredictionResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PredictResponse {
    pub filename: String,
    pub prediction: Label,
    pub confidence: f64,
}

impl PredictResponse {
    pub fn new(filename: String, result: PredictionResult) -> Self {
        PredictResponse {
            filename,
            prediction: result.label,
            confidence: result.confidence,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub detail: Option<String>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        HealthResponse {
            status: "healthy".to_string(),
            model: "loaded".to_string(),
            detail: None,
        }
    }

    pub fn unavailable(reason: Option<&str>) -> Self {
        HealthResponse {
            status: "unhealthy".to_string(),
            model: "not loaded".to_string(),
            detail: Some(
                reason
                    .unwrap_or("Model not loaded. Service unavailable.")
                    .to_string(),
            ),
        }
    }
}

/// Error body shared by every non-2xx response.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ErrorDetail {
    pub detail: String,
}

impl ErrorDetail {
    pub fn new(message: impl Into<String>) -> Self {
        ErrorDetail {
            detail: message.into(),
        }
    }

    pub fn processing(message: &str) -> Self {
        Self::new(format!("Error processing image: {}", message))
    }
}
