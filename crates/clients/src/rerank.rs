use serde::{Deserialize, Serialize};

use crate::{ClientError, ClientResult, CrossEncoder};

/// HTTP client for a cross-encoder scoring service. Scores one
/// (query, document) pair per call; raw scores are unbounded.
#[derive(Clone)]
pub struct HttpCrossEncoder {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ScoreRequest<'a> {
    query: &'a str,
    document: &'a str,
}

#[derive(Deserialize)]
struct ScoreResponse {
    score: f32,
}

impl HttpCrossEncoder {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }
}

impl CrossEncoder for HttpCrossEncoder {
    async fn score(&self, query: &str, document: &str) -> ClientResult<f32> {
        let url = format!("{}/score", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&ScoreRequest { query, document })
            .send()
            .await
            .map_err(ClientError::from_reqwest)?;

        if !response.status().is_success() {
            return Err(ClientError::BadStatus(response.status().as_u16()));
        }

        let parsed: ScoreResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Malformed(e.to_string()))?;

        Ok(parsed.score)
    }
}
