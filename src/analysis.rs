/// Client for the remote sentiment-analysis endpoint
use std::rc::Rc;
use std::time::Duration;

use futures::future::{FutureExt, LocalBoxFuture};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::error::Category;

use crate::comments::CommentBatch;
use crate::config::Config;
use crate::error::AnalysisError;
use crate::runtime::{with_timeout, Runtime};

/// Aggregate sentiment returned by the service. The three fractions are
/// expected to sum to 1; that is trusted, not checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentSummary {
    pub compound: f64,
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
    pub processed_comments: u64,
}

impl SentimentSummary {
    /// Finite numbers inside their documented ranges
    pub fn is_well_formed(&self) -> bool {
        let fraction = |v: f64| v.is_finite() && (0.0..=1.0).contains(&v);

        self.compound.is_finite()
            && (-1.0..=1.0).contains(&self.compound)
            && fraction(self.positive)
            && fraction(self.neutral)
            && fraction(self.negative)
    }
}

/// Anything that can score a batch of comments
pub trait AnalysisBackend {
    fn analyze<'a>(&'a self, batch: &'a CommentBatch) -> LocalBoxFuture<'a, Result<SentimentSummary, AnalysisError>>;
}

/// Map a raw HTTP outcome onto the single result shape
pub fn interpret_response(status: u16, body: &str) -> Result<SentimentSummary, AnalysisError> {
    if !(200..300).contains(&status) {
        return Err(AnalysisError::Status {
            status,
            body: body.to_string(),
        });
    }

    serde_json::from_str(body).map_err(|e| match e.classify() {
        Category::Data => AnalysisError::Malformed(e.to_string()),
        Category::Syntax | Category::Eof | Category::Io => AnalysisError::Unreadable(e.to_string()),
    })
}

/// POSTs `{ "comments": [...] }` as JSON, bounded by a client-side timeout
pub struct HttpAnalysisClient {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
    runtime: Rc<dyn Runtime>,
}

impl HttpAnalysisClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration, runtime: Rc<dyn Runtime>) -> Self {
        HttpAnalysisClient {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            timeout,
            runtime,
        }
    }

    pub fn from_config(config: &Config, runtime: Rc<dyn Runtime>) -> Self {
        Self::new(config.endpoint.clone(), config.request_timeout(), runtime)
    }

    async fn post(&self, batch: &CommentBatch) -> Result<SentimentSummary, AnalysisError> {
        let response = self.client.post(&self.endpoint).json(batch).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        interpret_response(status, &body)
    }
}

impl AnalysisBackend for HttpAnalysisClient {
    fn analyze<'a>(&'a self, batch: &'a CommentBatch) -> LocalBoxFuture<'a, Result<SentimentSummary, AnalysisError>> {
        async move {
            if batch.is_empty() {
                return Err(AnalysisError::EmptyBatch);
            }

            debug!("sending {} comments to {}", batch.len(), self.endpoint);
            let result = match with_timeout(self.runtime.as_ref(), self.timeout, self.post(batch)).await {
                Ok(result) => result,
                Err(limit) => Err(AnalysisError::TimedOut(limit.as_millis() as u64)),
            };

            if let Err(e) = &result {
                warn!("analysis request failed: {}", e);
            }
            result
        }
        .boxed_local()
    }
}

/// Body returned to the legacy `analyze_sentiment` background message
pub async fn legacy_analysis(backend: &dyn AnalysisBackend, comments: Vec<String>) -> serde_json::Value {
    let batch = CommentBatch::from_texts(comments);
    if batch.is_empty() {
        return serde_json::json!({ "error": "failed" });
    }

    match backend.analyze(&batch).await {
        Ok(summary) => serde_json::to_value(summary).unwrap_or_else(|_| serde_json::json!({ "error": "failed" })),
        Err(e) => {
            warn!("legacy analysis failed: {}", e);
            serde_json::json!({ "error": "failed" })
        }
    }
}
