use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use clients::{
    HttpCrossEncoder, HttpGroundingVerifier, OllamaEmbedder, OllamaGenerator, VectorSearchClient,
};
use eval::ablation::{self, AblationVariant};
use eval::baselines::{Bm25Index, KeywordIndex, RandomBaseline};
use eval::harness::{evaluate_answers, evaluate_backend, evaluate_retrieval, RetrievalMetrics};
use eval::{default_test_set, generate_plots, report};
use graph::{DrugMentionRecognizer, InteractionGraph, SubstringRecognizer};
use resolve::{ConfidenceAggregator, InteractionService, ServiceConfig, SeverityResolver};
use retrieve::{HybridRetriever, RetrieverConfig};

const K: usize = 5;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    println!("=== Drug Interaction Evaluation Suite ===\n");

    let data_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));
    let vector_url =
        std::env::var("VECTOR_URL").unwrap_or_else(|_| "http://localhost:6333".to_string());
    let rerank_url =
        std::env::var("RERANK_URL").unwrap_or_else(|_| "http://localhost:8001".to_string());
    let grounding_url =
        std::env::var("GROUNDING_URL").unwrap_or_else(|_| "http://localhost:8002".to_string());

    let records = ingest::load_interaction_records(&data_dir.join("interactions.json"))
        .await
        .context("Interaction records are required")?;
    let chunks = ingest::load_chunk_directory(&data_dir.join("chunks")).await?;
    let test_set = match ingest::load_ground_truth(&data_dir.join("ground_truth.json")).await {
        Ok(examples) => examples,
        Err(_) => {
            println!("No ground_truth.json found, using the built-in test set");
            default_test_set()
        }
    };

    println!(
        "Corpus: {} interaction records, {} chunks, {} test queries\n",
        records.len(),
        chunks.len(),
        test_set.len()
    );

    // Baselines run over the local chunk corpus.
    println!("Evaluating baselines...");
    let keyword = evaluate_backend(&KeywordIndex::build(chunks.clone()), &test_set, K);
    let bm25 = evaluate_backend(&Bm25Index::build(chunks.clone()), &test_set, K);
    let random = evaluate_backend(&RandomBaseline::new(chunks.clone()), &test_set, K);

    // The hybrid pipeline runs against the live vector index and services.
    println!("Evaluating hybrid pipeline...");
    let service = build_service(
        &records,
        &vector_url,
        &rerank_url,
        &grounding_url,
        ServiceConfig::default(),
    )
    .await?;
    let hybrid = evaluate_retrieval("hybrid", &test_set, K, |query| {
        let service = &service;
        async move { service.retrieve(&query, K).await }
    })
    .await;

    let methods = vec![hybrid.clone(), bm25, keyword, random];
    print_methods(&methods);

    println!("\nRunning ablation...");
    let graph = InteractionGraph::build(&records);
    let recognizer = SubstringRecognizer::from_graph(&graph);
    let mut variant_metrics = Vec::new();
    for variant in [AblationVariant::GraphFusion, AblationVariant::Reranking] {
        let config = variant.retriever_config(&RetrieverConfig::default());
        let retriever = HybridRetriever::new(
            VectorSearchClient::new(
                vector_url.clone(),
                "interaction_chunks".to_string(),
                OllamaEmbedder::default(),
            ),
            HttpCrossEncoder::new(rerank_url.clone()),
            config,
        );
        let metrics = evaluate_retrieval(variant.label(), &test_set, K, |query| {
            let retriever = &retriever;
            let recognizer = &recognizer;
            let graph = &graph;
            async move {
                let drugs = recognizer.extract_all(&query);
                retriever.retrieve(&query, &drugs, graph).await
            }
        })
        .await;
        println!("  {} done", variant.label());
        variant_metrics.push(metrics);
    }
    println!("\nEvaluating end-to-end answers...");
    let mut answers = Vec::with_capacity(test_set.len());
    for example in &test_set {
        answers.push(service.answer(&example.query).await);
    }
    let generation = evaluate_answers(&test_set, &answers);
    println!(
        "  Risk accuracy: {:.3}  Keyword coverage: {:.3}  Avg confidence: {:.3}",
        generation.risk_accuracy, generation.keyword_coverage, generation.avg_confidence
    );

    // Uncertainty and grounding verification live in the service layer, so
    // their variants rerun the full answer pipeline with the flag off.
    let mut service_runs = Vec::new();
    for variant in [AblationVariant::Uncertainty, AblationVariant::GroundingVerification] {
        let config = variant.service_config(&ServiceConfig::default());
        let ablated =
            build_service(&records, &vector_url, &rerank_url, &grounding_url, config).await?;
        let mut answers = Vec::with_capacity(test_set.len());
        for example in &test_set {
            answers.push(ablated.answer(&example.query).await);
        }
        let metrics = evaluate_answers(&test_set, &answers);
        println!("  {} done", variant.label());
        service_runs.push((variant.label().to_string(), metrics));
    }

    let ablation_report = ablation::compare(hybrid, variant_metrics)
        .with_service(ablation::compare_generation(generation.clone(), service_runs));

    report::write_json(Path::new("evaluation_results.json"), &methods)?;
    report::write_json(Path::new("ablation_results.json"), &ablation_report)?;
    report::write_markdown(
        Path::new("EVALUATION.md"),
        &methods,
        &ablation_report,
        Some(&generation),
    )?;
    println!("\nResults saved to evaluation_results.json / ablation_results.json / EVALUATION.md");

    generate_plots(&methods, "plots")?;
    println!("Plots saved to plots/");

    Ok(())
}

async fn build_service(
    records: &[ingest::InteractionRecord],
    vector_url: &str,
    rerank_url: &str,
    grounding_url: &str,
    config: ServiceConfig,
) -> Result<
    InteractionService<
        VectorSearchClient,
        HttpCrossEncoder,
        OllamaEmbedder,
        OllamaGenerator,
        HttpGroundingVerifier,
    >,
> {
    let index = VectorSearchClient::new(
        vector_url.to_string(),
        "interaction_chunks".to_string(),
        OllamaEmbedder::default(),
    );
    let retriever = HybridRetriever::new(
        index,
        HttpCrossEncoder::new(rerank_url.to_string()),
        RetrieverConfig::default(),
    );
    let resolver = SeverityResolver::init(OllamaEmbedder::default())
        .await
        .context("Failed to initialize the severity resolver")?;

    Ok(InteractionService::init(
        records,
        retriever,
        resolver,
        ConfidenceAggregator::default(),
        OllamaGenerator::default(),
        HttpGroundingVerifier::new(grounding_url.to_string()),
        config,
    ))
}

fn print_methods(methods: &[RetrievalMetrics]) {
    println!("\n=== RETRIEVAL RESULTS ===");
    for m in methods {
        println!(
            "  {:<12} P@{k}: {:.3}  R@{k}: {:.3}  NDCG@{k}: {:.3}  MRR: {:.3}  F1: {:.3}",
            m.method,
            m.precision_at_k,
            m.recall_at_k,
            m.ndcg_at_k,
            m.mrr,
            m.f1,
            k = K
        );
    }
}
