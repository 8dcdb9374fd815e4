use std::sync::Arc;

use inferences::Classifier;

use crate::config::DEFAULT_MAX_UPLOAD_BYTES;
use crate::metrics::Metrics;

/// Everything a request handler needs, built once at startup.
pub struct AppState {
    pub classifier: Option<Arc<dyn Classifier>>,
    pub load_error: Option<String>,
    pub metrics: Metrics,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(classifier: Option<Arc<dyn Classifier>>, load_error: Option<String>) -> Self {
        AppState {
            classifier,
            load_error,
            metrics: Metrics::new(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_classifier(classifier: Arc<dyn Classifier>) -> Self {
        Self::new(Some(classifier), None)
    }

    pub fn unloaded(reason: impl Into<String>) -> Self {
        Self::new(None, Some(reason.into()))
    }

    pub fn with_max_upload_bytes(mut self, limit: usize) -> Self {
        self.max_upload_bytes = limit;
        self
    }

    pub fn model_ready(&self) -> bool {
        self.classifier.is_some()
    }
}
