use serde_json::json;

use ingest::DocumentChunk;

use crate::{ClientError, ClientResult, Embedder, OllamaEmbedder, SemanticIndex};

/// Qdrant-style REST vector search. Embeds the query, posts to the
/// collection's `points/search` endpoint, and rebuilds `DocumentChunk`s
/// from point payloads.
#[derive(Clone)]
pub struct VectorSearchClient {
    base_url: String,
    collection: String,
    embedder: OllamaEmbedder,
    client: reqwest::Client,
}

impl VectorSearchClient {
    pub fn new(base_url: String, collection: String, embedder: OllamaEmbedder) -> Self {
        Self {
            base_url,
            collection,
            embedder,
            client: reqwest::Client::new(),
        }
    }
}

impl SemanticIndex for VectorSearchClient {
    async fn search(&self, query: &str, top_k: usize) -> ClientResult<Vec<DocumentChunk>> {
        let query_embedding = self.embedder.embed(query).await?;

        let url = format!(
            "{}/collections/{}/points/search",
            self.base_url, self.collection
        );
        let body = json!({
            "vector": query_embedding,
            "limit": top_k,
            "with_payload": true
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(ClientError::from_reqwest)?;

        if !response.status().is_success() {
            return Err(ClientError::BadStatus(response.status().as_u16()));
        }

        let result: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ClientError::Malformed(e.to_string()))?;

        let points = result["result"]
            .as_array()
            .ok_or_else(|| ClientError::Malformed("missing result array".to_string()))?;

        let mut chunks = Vec::with_capacity(points.len());
        for point in points {
            let score = point["score"].as_f64().unwrap_or(0.0) as f32;
            let Some(payload) = point["payload"].as_object() else {
                continue;
            };

            let str_field = |key: &str| {
                payload
                    .get(key)
                    .and_then(|v| v.as_str())
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            };

            chunks.push(DocumentChunk {
                id: str_field("id").unwrap_or_default(),
                source: str_field("source").unwrap_or_default(),
                text: str_field("text").unwrap_or_default(),
                drug_name: str_field("drug_name"),
                interacting_drug: str_field("interacting_drug"),
                interaction_description: str_field("interaction_description"),
                relevance_score: score,
                graph_score: None,
                combined_score: None,
            });
        }

        Ok(chunks)
    }
}
