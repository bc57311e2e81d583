//! Integration tests for engine loading and the request surface.

mod support;

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use pretty_assertions::assert_eq;

use haqei_core::error::{InitializationError, LookupError};
use haqei_core::source::StaticContentSource;
use haqei_core::{
    Category, Engine, Error, LeafCode, LoadOptions, Readiness, Role, RoleAnswers, ScoredAnswer,
};

use support::{CountingSource, full_corpus};

fn options(timeout: Duration) -> LoadOptions {
    LoadOptions {
        timeout,
        strict_corpus: true,
    }
}

#[tokio::test]
async fn test_concurrent_requests_share_one_load() {
    let source = CountingSource::new(Duration::from_millis(50), 0);
    let engine = Arc::new(Engine::new(source.clone(), options(Duration::from_secs(5))));

    let tasks = (1..=16u8).map(|i| {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move { engine.generate(i, 1 + i % 6).await })
    });
    let results = join_all(tasks).await;

    for result in results {
        let tree = result.unwrap().unwrap();
        assert_eq!(tree.leaves.len(), 8);
    }
    assert_eq!(source.fetches(), 1);
    assert_eq!(engine.readiness(), Readiness::Ready);
}

#[tokio::test]
async fn test_readiness_reports_loading_while_in_flight() {
    let source = CountingSource::new(Duration::from_millis(200), 0);
    let engine = Arc::new(Engine::new(source, options(Duration::from_secs(5))));

    let loader = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move { engine.load().await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(engine.readiness(), Readiness::Loading);
    assert!(engine.try_context().is_err());

    loader.await.unwrap().unwrap();
    assert_eq!(engine.readiness(), Readiness::Ready);
}

#[tokio::test]
async fn test_failed_load_is_retryable() {
    let source = CountingSource::new(Duration::ZERO, 1);
    let engine = Engine::new(source.clone(), options(Duration::from_secs(5)));

    let err = engine.load().await.unwrap_err();
    assert!(err.is_retryable());
    assert!(matches!(
        err,
        Error::Initialization(InitializationError::Source(_))
    ));
    assert_eq!(engine.readiness(), Readiness::NotReady);

    engine.load().await.unwrap();
    assert_eq!(source.fetches(), 2);
    assert_eq!(engine.readiness(), Readiness::Ready);
}

#[tokio::test]
async fn test_timed_out_load_leaves_engine_not_ready() {
    let source = CountingSource::new(Duration::from_millis(500), 0);
    let engine = Engine::new(source.clone(), options(Duration::from_millis(20)));

    let err = engine.load().await.unwrap_err();
    assert!(matches!(
        err,
        Error::Initialization(InitializationError::Timeout { .. })
    ));
    assert_eq!(engine.readiness(), Readiness::NotReady);
    assert!(engine.try_context().is_err());
}

#[tokio::test]
async fn test_change_then_progress_scenario() {
    let engine = Engine::new(
        Arc::new(StaticContentSource::builtin(full_corpus())),
        LoadOptions::default(),
    );
    let tree = engine.generate(1, 1).await.unwrap();
    let code: LeafCode = "HPP".parse().unwrap();
    let leaf = tree.leaf(code).unwrap();

    assert_eq!(tree.root_name, "乾為天");
    assert_eq!(tree.root_line_name, "初九");
    assert_eq!(leaf.final_node().hexagram_id, 44);
    assert_eq!(leaf.final_node().line_position, 3);
    assert_eq!(leaf.narrative.text, "乾為天 初九 | HPP");
}

#[tokio::test]
async fn test_missing_scenario_key_raises_lookup_error() {
    let mut corpus = full_corpus();
    corpus.remove("乾為天 初九 | HPP");
    let engine = Engine::new(
        Arc::new(StaticContentSource::builtin(corpus)),
        LoadOptions {
            strict_corpus: false,
            ..LoadOptions::default()
        },
    );

    let err = engine.generate(1, 1).await.unwrap_err();
    assert!(!err.is_retryable());
    assert!(matches!(
        err,
        Error::Lookup(LookupError::NarrativeMissing { ref key }) if key == "乾為天 初九 | HPP"
    ));
}

#[tokio::test]
async fn test_classify_and_analyze_end_to_end() {
    let engine = Engine::new(
        Arc::new(StaticContentSource::builtin(full_corpus())),
        LoadOptions::default(),
    );
    let answers = RoleAnswers {
        engine: vec![ScoredAnswer::new([("乾_創造性", 2.0)])],
        interface: vec![ScoredAnswer::new([("坤_受容性", 1.0), ("坤_受容性", 1.0)])],
        safe_mode: vec![
            ScoredAnswer::new([("乾_創造性", 1.0)]),
            ScoredAnswer::new([("乾_創造性", 0.5)]),
        ],
    };

    let triple = engine.classify_all(&answers).await.unwrap();
    assert_eq!(triple.engine.profile.id(), 1);
    assert_eq!(triple.interface.profile.id(), 2);
    assert_eq!(triple.safe_mode.profile.id(), 1);

    let report = engine
        .analyze(&triple.engine, &triple.interface, &triple.safe_mode)
        .await
        .unwrap();
    let categories: Vec<Category> = report.pairs.iter().map(|p| p.category).collect();
    assert_eq!(
        categories,
        vec![Category::Synergy, Category::Chaos, Category::Synergy]
    );

    let shuffled = engine
        .analyze_results(&[
            triple.safe_mode.clone(),
            triple.interface.clone(),
            triple.engine.clone(),
        ])
        .await
        .unwrap();
    assert_eq!(shuffled, report);

    let again = engine.classify_all(&answers).await.unwrap();
    assert_eq!(again, triple);
}

#[tokio::test]
async fn test_request_errors_do_not_poison_the_engine() {
    let engine = Engine::new(
        Arc::new(StaticContentSource::builtin(full_corpus())),
        LoadOptions::default(),
    );

    assert!(matches!(
        engine.classify(&[], Role::Engine).await,
        Err(Error::Computation(_))
    ));
    assert!(matches!(engine.generate(1, 9).await, Err(Error::Validation(_))));

    let ranked = engine
        .rank(&[ScoredAnswer::new([("action", 1.0)])], Role::Engine, 4)
        .await
        .unwrap();
    assert_eq!(ranked[0].profile_id, 51);
    assert_eq!(engine.readiness(), Readiness::Ready);
}
