//! Classical retrieval baselines sharing the hybrid retriever's
//! `search(query, top_k) -> ranked chunks` shape, for head-to-head
//! comparison in the evaluation harness.

use std::collections::{HashMap, HashSet};

use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;

use ingest::DocumentChunk;

/// A ranked-search method under evaluation. Baselines are synchronous and
/// self-contained; the hybrid pipeline is evaluated through its own async
/// path.
pub trait SearchBackend {
    fn name(&self) -> &str;
    fn search(&self, query: &str, top_k: usize) -> Vec<DocumentChunk>;
}

fn token_pattern() -> Regex {
    // Infallible for a fixed literal pattern.
    Regex::new(r"[a-z0-9]+").unwrap_or_else(|_| unreachable!())
}

fn tokenize(pattern: &Regex, text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    pattern.find_iter(&lower).map(|m| m.as_str().to_string()).collect()
}

/// Word-overlap search: score is the fraction of query tokens present in
/// the document. Ties keep corpus order.
pub struct KeywordIndex {
    docs: Vec<DocumentChunk>,
    doc_tokens: Vec<HashSet<String>>,
    pattern: Regex,
}

impl KeywordIndex {
    pub fn build(docs: Vec<DocumentChunk>) -> Self {
        let pattern = token_pattern();
        let doc_tokens = docs
            .iter()
            .map(|d| tokenize(&pattern, &d.text).into_iter().collect())
            .collect();
        Self { docs, doc_tokens, pattern }
    }
}

impl SearchBackend for KeywordIndex {
    fn name(&self) -> &str {
        "keyword"
    }

    fn search(&self, query: &str, top_k: usize) -> Vec<DocumentChunk> {
        let query_tokens = tokenize(&self.pattern, query);
        if query_tokens.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(f32, &DocumentChunk)> = self
            .docs
            .iter()
            .zip(&self.doc_tokens)
            .map(|(doc, tokens)| {
                let matched = query_tokens.iter().filter(|t| tokens.contains(*t)).count();
                (matched as f32 / query_tokens.len() as f32, doc)
            })
            .filter(|(score, _)| *score > 0.0)
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored
            .into_iter()
            .take(top_k)
            .map(|(score, doc)| {
                let mut chunk = doc.clone();
                chunk.relevance_score = score;
                chunk
            })
            .collect()
    }
}

/// Okapi BM25 over the chunk texts.
pub struct Bm25Index {
    docs: Vec<DocumentChunk>,
    term_freqs: Vec<HashMap<String, usize>>,
    doc_lens: Vec<usize>,
    avg_doc_len: f64,
    doc_freq: HashMap<String, usize>,
    k1: f64,
    b: f64,
    pattern: Regex,
}

impl Bm25Index {
    pub fn build(docs: Vec<DocumentChunk>) -> Self {
        Self::build_with_params(docs, 1.5, 0.75)
    }

    pub fn build_with_params(docs: Vec<DocumentChunk>, k1: f64, b: f64) -> Self {
        let pattern = token_pattern();
        let mut term_freqs = Vec::with_capacity(docs.len());
        let mut doc_lens = Vec::with_capacity(docs.len());
        let mut doc_freq: HashMap<String, usize> = HashMap::new();

        for doc in &docs {
            let tokens = tokenize(&pattern, &doc.text);
            doc_lens.push(tokens.len());
            let mut tf: HashMap<String, usize> = HashMap::new();
            for token in tokens {
                *tf.entry(token).or_insert(0) += 1;
            }
            for term in tf.keys() {
                *doc_freq.entry(term.clone()).or_insert(0) += 1;
            }
            term_freqs.push(tf);
        }

        let avg_doc_len = if doc_lens.is_empty() {
            0.0
        } else {
            doc_lens.iter().sum::<usize>() as f64 / doc_lens.len() as f64
        };

        Self { docs, term_freqs, doc_lens, avg_doc_len, doc_freq, k1, b, pattern }
    }

    fn idf(&self, term: &str) -> f64 {
        let n = self.docs.len() as f64;
        let df = self.doc_freq.get(term).copied().unwrap_or(0) as f64;
        ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
    }

    fn score_doc(&self, doc_idx: usize, query_terms: &[String]) -> f64 {
        let tf_map = &self.term_freqs[doc_idx];
        let doc_len = self.doc_lens[doc_idx] as f64;
        let mut score = 0.0;

        for term in query_terms {
            let tf = tf_map.get(term).copied().unwrap_or(0) as f64;
            if tf == 0.0 {
                continue;
            }
            let norm = tf + self.k1 * (1.0 - self.b + self.b * doc_len / self.avg_doc_len);
            score += self.idf(term) * tf * (self.k1 + 1.0) / norm;
        }
        score
    }
}

impl SearchBackend for Bm25Index {
    fn name(&self) -> &str {
        "bm25"
    }

    fn search(&self, query: &str, top_k: usize) -> Vec<DocumentChunk> {
        let query_terms = tokenize(&self.pattern, query);
        if query_terms.is_empty() || self.docs.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(f64, usize)> = (0..self.docs.len())
            .map(|i| (self.score_doc(i, &query_terms), i))
            .filter(|(score, _)| *score > 0.0)
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored
            .into_iter()
            .take(top_k)
            .map(|(score, i)| {
                let mut chunk = self.docs[i].clone();
                chunk.relevance_score = score as f32;
                chunk
            })
            .collect()
    }
}

/// Uniform sample without replacement, random scores. A sanity floor, not
/// a method; deliberately non-deterministic.
pub struct RandomBaseline {
    docs: Vec<DocumentChunk>,
}

impl RandomBaseline {
    pub fn new(docs: Vec<DocumentChunk>) -> Self {
        Self { docs }
    }
}

impl SearchBackend for RandomBaseline {
    fn name(&self) -> &str {
        "random"
    }

    fn search(&self, _query: &str, top_k: usize) -> Vec<DocumentChunk> {
        let mut rng = rand::thread_rng();
        let mut indices: Vec<usize> = (0..self.docs.len()).collect();
        indices.shuffle(&mut rng);

        let mut sampled: Vec<DocumentChunk> = indices
            .into_iter()
            .take(top_k.min(self.docs.len()))
            .map(|i| {
                let mut chunk = self.docs[i].clone();
                chunk.relevance_score = rng.r#gen::<f32>();
                chunk
            })
            .collect();

        sampled.sort_by(|a, b| {
            b.relevance_score
                .partial_cmp(&a.relevance_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        sampled
    }
}
