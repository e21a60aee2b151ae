use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use tokio_util::codec::{BytesCodec, FramedRead};

use crate::app_config::ClassifierConfig;
use crate::entities;
use crate::ports::{Classifier, ClassifierError, Verdict};

#[derive(Debug, Deserialize)]
struct VerdictBody {
    confidence: f64,
    authenticity: String,
    #[serde(default)]
    details: serde_json::Value,
}

/// Gateway to the external ML authenticity-scoring service: one multipart
/// POST to `{base_url}/verify` per document.
#[derive(Debug, Clone)]
pub struct HttpClassifier {
    client: reqwest::Client,
    base_url: String,
}

impl HttpClassifier {
    pub fn new(config: &ClassifierConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("build classifier client")?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(
        &self,
        file_path: &str,
        certificate_type: entities::CertificateType,
    ) -> Result<Verdict, ClassifierError> {
        let file = tokio::fs::File::open(file_path)
            .await
            .with_context(|| format!("open stored file {file_path}"))?;
        let stream = FramedRead::new(file, BytesCodec::new());
        let file_name = std::path::Path::new(file_path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        let part = reqwest::multipart::Part::stream(reqwest::Body::wrap_stream(stream))
            .file_name(file_name);
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("certificate_type", certificate_type.as_str());

        let response = self
            .client
            .post(format!("{}/verify", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() || err.is_connect() {
                    ClassifierError::Unavailable(err.to_string())
                } else {
                    ClassifierError::Other(err.into())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClassifierError::InvalidResponse(format!(
                "unexpected status {status}"
            )));
        }

        let body: VerdictBody = response
            .json()
            .await
            .map_err(|err| ClassifierError::InvalidResponse(err.to_string()))?;

        Ok(Verdict {
            confidence: body.confidence,
            authenticity: body.authenticity,
            details: body.details,
        })
    }
}
