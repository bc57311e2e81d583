//! The engine: a lazily loaded, immutable reference context.
//!
//! The first request (or an explicit [`Engine::load`]) fetches the catalogue
//! and corpus from the [`ContentSource`]. The load is single-flight:
//! concurrent callers wait on the same attempt. A failed or timed-out attempt
//! leaves nothing cached, so the next caller retries from scratch. Once loaded,
//! the context is shared behind an [`Arc`] and read without locks.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::OnceCell;

use crate::catalog::ReferenceCatalog;
use crate::classifier::{
    Candidate, ClassificationResult, Role, RoleAnswers, ScoredAnswer, TripleClassification,
    VectorClassifier,
};
use crate::compatibility::{CompatibilityAnalyzer, CompatibilityReport};
use crate::config::EngineConfig;
use crate::error::{InitializationError, Result};
use crate::narrative::{CORPUS_SIZE, NarrativeCorpus};
use crate::source::{ContentSource, FileContentSource};
use crate::transformation::{TransformationTree, TransformationTreeGenerator};

/// Observable load state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Nothing loaded; the next request starts a load.
    NotReady,
    /// A load attempt is in flight.
    Loading,
    /// Reference data is loaded and immutable.
    Ready,
}

/// How the initial load behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    pub timeout: Duration,
    /// Require a narrative for every `(profile, line, code)` before becoming ready.
    pub strict_corpus: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        let config = EngineConfig::default();
        Self {
            timeout: config.load_timeout,
            strict_corpus: config.strict_corpus,
        }
    }
}

/// Everything derived from one successful load.
#[derive(Debug)]
pub struct ReferenceContext {
    catalog: Arc<ReferenceCatalog>,
    corpus: Arc<NarrativeCorpus>,
    classifier: VectorClassifier,
    analyzer: CompatibilityAnalyzer,
    generator: TransformationTreeGenerator,
}

impl ReferenceContext {
    /// Assemble a context from validated parts.
    pub fn new(catalog: ReferenceCatalog, corpus: NarrativeCorpus) -> Self {
        let catalog = Arc::new(catalog);
        let corpus = Arc::new(corpus);
        Self {
            classifier: VectorClassifier::new(Arc::clone(&catalog)),
            analyzer: CompatibilityAnalyzer::new(),
            generator: TransformationTreeGenerator::new(Arc::clone(&catalog), Arc::clone(&corpus)),
            catalog,
            corpus,
        }
    }

    pub fn catalog(&self) -> &ReferenceCatalog {
        &self.catalog
    }

    pub fn corpus(&self) -> &NarrativeCorpus {
        &self.corpus
    }

    pub fn classifier(&self) -> &VectorClassifier {
        &self.classifier
    }

    pub fn analyzer(&self) -> &CompatibilityAnalyzer {
        &self.analyzer
    }

    pub fn generator(&self) -> &TransformationTreeGenerator {
        &self.generator
    }
}

/// Resets the loading flag when a load attempt ends, including on cancellation.
struct LoadingGuard<'a>(&'a AtomicBool);

impl<'a> LoadingGuard<'a> {
    fn enter(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Classification, compatibility and transformation over lazily loaded data.
pub struct Engine {
    source: Arc<dyn ContentSource>,
    options: LoadOptions,
    context: OnceCell<Arc<ReferenceContext>>,
    loading: AtomicBool,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("source", &self.source.describe())
            .field("options", &self.options)
            .field("readiness", &self.readiness())
            .finish()
    }
}

impl Engine {
    pub fn new(source: Arc<dyn ContentSource>, options: LoadOptions) -> Self {
        Self {
            source,
            options,
            context: OnceCell::new(),
            loading: AtomicBool::new(false),
        }
    }

    /// File-backed engine from configuration.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            Arc::new(FileContentSource::new(config.content_dir.clone())),
            LoadOptions {
                timeout: config.load_timeout,
                strict_corpus: config.strict_corpus,
            },
        )
    }

    /// Current load state, without waiting.
    pub fn readiness(&self) -> Readiness {
        if self.context.initialized() {
            Readiness::Ready
        } else if self.loading.load(Ordering::Acquire) {
            Readiness::Loading
        } else {
            Readiness::NotReady
        }
    }

    /// The loaded context if ready, otherwise [`InitializationError::NotReady`].
    pub fn try_context(&self) -> Result<Arc<ReferenceContext>> {
        self.context
            .get()
            .cloned()
            .ok_or_else(|| InitializationError::NotReady.into())
    }

    /// The loaded context, loading it first if needed.
    pub async fn context(&self) -> Result<Arc<ReferenceContext>> {
        let context = self
            .context
            .get_or_try_init(|| self.load_with_timeout())
            .await?;
        Ok(Arc::clone(context))
    }

    /// Load now rather than on the first request.
    pub async fn load(&self) -> Result<()> {
        self.context().await.map(|_| ())
    }

    async fn load_with_timeout(&self) -> Result<Arc<ReferenceContext>> {
        let _guard = LoadingGuard::enter(&self.loading);
        let timeout = self.options.timeout;

        tracing::info!(source = %self.source.describe(), "Loading reference data");
        match tokio::time::timeout(timeout, self.load_context()).await {
            Ok(Ok(context)) => Ok(Arc::new(context)),
            Ok(Err(e)) => {
                tracing::warn!("Reference data load failed: {}", e);
                Err(e.into())
            }
            Err(_) => {
                tracing::warn!("Reference data load timed out after {:?}", timeout);
                Err(InitializationError::Timeout { timeout }.into())
            }
        }
    }

    async fn load_context(&self) -> std::result::Result<ReferenceContext, InitializationError> {
        let records = self.source.fetch_catalog().await?;
        let catalog = ReferenceCatalog::from_records(&records)?;

        let raw = self.source.fetch_narratives().await?;
        let corpus = NarrativeCorpus::from_raw(raw, &catalog)?;

        if self.options.strict_corpus {
            corpus.verify_complete(&catalog)?;
        } else {
            let missing = corpus.missing_keys(&catalog);
            if let Some(first) = missing.first() {
                tracing::warn!(
                    missing = missing.len(),
                    expected = CORPUS_SIZE,
                    first_missing = %first,
                    "Narrative corpus is incomplete; affected trees will fail"
                );
            }
        }

        tracing::info!(
            profiles = catalog.len(),
            narratives = corpus.len(),
            "Reference data loaded"
        );
        Ok(ReferenceContext::new(catalog, corpus))
    }

    pub async fn classify(&self, answers: &[ScoredAnswer], role: Role) -> Result<ClassificationResult> {
        self.context().await?.classifier().classify(answers, role)
    }

    pub async fn rank(
        &self,
        answers: &[ScoredAnswer],
        role: Role,
        top_n: usize,
    ) -> Result<Vec<Candidate>> {
        self.context().await?.classifier().rank(answers, role, top_n)
    }

    pub async fn classify_all(&self, answers: &RoleAnswers) -> Result<TripleClassification> {
        self.context().await?.classifier().classify_all(answers)
    }

    pub async fn analyze(
        &self,
        engine: &ClassificationResult,
        interface: &ClassificationResult,
        safe_mode: &ClassificationResult,
    ) -> Result<CompatibilityReport> {
        let context = self.context().await?;
        Ok(context.analyzer().analyze(engine, interface, safe_mode)?)
    }

    pub async fn analyze_results(
        &self,
        results: &[ClassificationResult],
    ) -> Result<CompatibilityReport> {
        let context = self.context().await?;
        Ok(context.analyzer().analyze_results(results)?)
    }

    pub async fn generate(&self, start_id: u8, start_position: u8) -> Result<TransformationTree> {
        self.context()
            .await?
            .generator()
            .generate(start_id, start_position)
    }
}
