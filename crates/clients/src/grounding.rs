use serde::Serialize;

use ingest::DocumentChunk;

use crate::{ClientError, ClientResult, GroundingMetrics, GroundingVerifier};

/// HTTP client for an external grounding-verification service that checks
/// a generated response against its evidence text.
#[derive(Clone)]
pub struct HttpGroundingVerifier {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct VerifyRequest<'a> {
    response: &'a str,
    evidence: Vec<&'a str>,
}

impl HttpGroundingVerifier {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }
}

impl GroundingVerifier for HttpGroundingVerifier {
    async fn verify(
        &self,
        response: &str,
        evidence: &[DocumentChunk],
    ) -> ClientResult<GroundingMetrics> {
        let url = format!("{}/verify", self.base_url);

        let request = VerifyRequest {
            response,
            evidence: evidence.iter().map(|c| c.text.as_str()).collect(),
        };

        let http_response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(ClientError::from_reqwest)?;

        if !http_response.status().is_success() {
            return Err(ClientError::BadStatus(http_response.status().as_u16()));
        }

        let metrics: GroundingMetrics = http_response
            .json()
            .await
            .map_err(|e| ClientError::Malformed(e.to_string()))?;

        Ok(metrics)
    }
}
