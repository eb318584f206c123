// src/pipeline/mod.rs
//! # Pipeline orchestrator
//! Drives one run: probe → auth → fetch → classify → format → deliver.
//!
//! States: `Init → AuthAcquired → ListingsFetched → Classified → Formatted →
//! Delivered → Done`, with `Failed(stage)` reachable from every non-terminal
//! state. An empty listing batch goes straight from `ListingsFetched` to `Done`.
//! Nothing is retried; the first failing stage ends the run.

pub mod events;

use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::warn;

use crate::analyze::{untraced, Classifier, OpenAiClassifier, Verdict};
use crate::artifacts::{ArtifactSink, FileArtifacts};
use crate::config::{DigestConfig, Settings};
use crate::digest::{format_digest_for, DigestReport};
use crate::error::DigestError;
use crate::ingest::{
    CredentialProvider, Listing, ListingSource, OAuthCredentials, ProductHuntCatalog,
};
use crate::notify::{DeliveryAck, Publisher, SlackPublisher};

pub use events::{RunObserver, Stage, StageEvent, StageOutcome, TracingObserver};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Init,
    AuthAcquired,
    ListingsFetched,
    Classified,
    Formatted,
    Delivered,
    Done,
    Failed(Stage),
}

/// Stage-local error annotated with the stage it came from.
#[derive(Debug, Error)]
#[error("{stage} stage failed: {source}")]
pub struct PipelineFailure {
    pub stage: Stage,
    #[source]
    pub source: DigestError,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Delivered {
        report: DigestReport,
        ack: DeliveryAck,
    },
    /// The catalog returned nothing; classification, formatting and delivery were skipped.
    NoLaunches,
}

/// Everything a run accumulated. Owned by the orchestrator while running.
#[derive(Debug, Clone, PartialEq)]
pub struct RunContext {
    pub state: RunState,
    pub listings: Option<Vec<Listing>>,
    pub verdicts: Option<Vec<Verdict>>,
    pub report: Option<DigestReport>,
}

impl Default for RunContext {
    fn default() -> Self {
        Self {
            state: RunState::Init,
            listings: None,
            verdicts: None,
            report: None,
        }
    }
}

/// Terminal view of a run: its context (artifacts) plus how it ended.
#[derive(Debug)]
pub struct RunReport {
    pub context: RunContext,
    pub outcome: Result<RunOutcome, PipelineFailure>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Formatted digest, available even when delivery failed.
    pub fn report(&self) -> Option<&DigestReport> {
        self.context.report.as_ref()
    }

    /// One user-facing line describing how the run ended.
    pub fn summary(&self) -> String {
        match &self.outcome {
            Ok(RunOutcome::Delivered { report, ack }) => format!(
                "digest delivered to {} (ts {}): {} high, {} medium",
                ack.channel,
                ack.ts,
                report.high_count(),
                report.medium_count()
            ),
            Ok(RunOutcome::NoLaunches) => {
                "no launches returned by the catalog; no relevant launches found".to_string()
            }
            Err(f) => format!("run failed at stage `{}`: {}", f.stage, f.source),
        }
    }
}

/// Per-run parameters that are not components.
#[derive(Clone)]
pub struct RunParams {
    pub client_id: String,
    pub client_secret: String,
    pub batch_size: u32,
    pub company: String,
}

pub struct Pipeline {
    credentials: Arc<dyn CredentialProvider>,
    source: Arc<dyn ListingSource>,
    classifier: Arc<dyn Classifier>,
    publisher: Arc<dyn Publisher>,
    artifacts: Arc<dyn ArtifactSink>,
    observers: Vec<Arc<dyn RunObserver>>,
    params: RunParams,
}

impl Pipeline {
    pub fn new(
        credentials: Arc<dyn CredentialProvider>,
        source: Arc<dyn ListingSource>,
        classifier: Arc<dyn Classifier>,
        publisher: Arc<dyn Publisher>,
        artifacts: Arc<dyn ArtifactSink>,
        params: RunParams,
    ) -> Self {
        Self {
            credentials,
            source,
            classifier,
            publisher,
            artifacts,
            observers: Vec::new(),
            params,
        }
    }

    /// Wire the real HTTP-backed components from validated settings.
    pub fn production(settings: &Settings, cfg: &DigestConfig) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("launch-digest/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;

        let classifier = OpenAiClassifier::new(
            http.clone(),
            cfg.openai_url.clone(),
            settings.openai_api_key.clone(),
        )
        .with_model(cfg.model.clone())
        .with_temperature(cfg.temperature)
        .with_company(cfg.company.clone());

        Ok(Self::new(
            Arc::new(OAuthCredentials::new(http.clone(), cfg.token_url.clone())),
            Arc::new(ProductHuntCatalog::new(http.clone(), cfg.graphql_url.clone())),
            Arc::new(classifier),
            Arc::new(SlackPublisher::new(
                http,
                cfg.slack_api_base.clone(),
                settings.slack_bot_token.clone(),
                settings.slack_channel_id.clone(),
            )),
            Arc::new(FileArtifacts::new(cfg.artifact_dir.clone())),
            RunParams {
                client_id: settings.client_id.clone(),
                client_secret: settings.client_secret.clone(),
                batch_size: cfg.batch_size,
                company: cfg.company.clone(),
            },
        ))
    }

    pub fn with_observer(mut self, observer: Arc<dyn RunObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub async fn run(&self) -> RunReport {
        let mut context = RunContext::default();
        let outcome = self.drive(&mut context).await;
        context.state = match &outcome {
            Ok(_) => RunState::Done,
            Err(f) => RunState::Failed(f.stage),
        };
        RunReport { context, outcome }
    }

    async fn drive(&self, ctx: &mut RunContext) -> Result<RunOutcome, PipelineFailure> {
        // Init: make sure the destination is reachable before doing any work.
        let t = Instant::now();
        let destination = self.publisher.destination().to_string();
        let identity = self
            .publisher
            .probe()
            .await
            .map_err(|e| self.fail(Stage::Preflight, &destination, e, t))?;
        self.succeed(
            Stage::Preflight,
            format!("{destination} as {}@{}", identity.user, identity.team),
            0,
            t,
        );

        let t = Instant::now();
        let token = self
            .credentials
            .acquire_token(&self.params.client_id, &self.params.client_secret)
            .await
            .map_err(|e| self.fail(Stage::Auth, "client credentials", e, t))?;
        ctx.state = RunState::AuthAcquired;
        self.succeed(Stage::Auth, "client credentials".into(), 1, t);

        let t = Instant::now();
        let fetch_input = format!("{} batch of {}", self.source.name(), self.params.batch_size);
        let listings = self
            .source
            .fetch_recent(&token, self.params.batch_size)
            .await
            .map_err(|e| self.fail(Stage::Fetch, &fetch_input, e, t))?;
        ctx.state = RunState::ListingsFetched;
        ctx.listings = Some(listings.clone());
        self.succeed(Stage::Fetch, fetch_input, listings.len(), t);
        if let Err(e) = self.artifacts.store_listings(&listings).await {
            warn!(error = ?e, "could not save listings artifact");
        }

        if listings.is_empty() {
            for stage in [Stage::Classify, Stage::Format, Stage::Deliver] {
                self.emit(StageEvent {
                    stage,
                    input: "0 listings".into(),
                    outcome: StageOutcome::Skipped {
                        reason: "catalog returned no launches".into(),
                    },
                    items: 0,
                    elapsed: Duration::ZERO,
                });
            }
            return Ok(RunOutcome::NoLaunches);
        }

        let t = Instant::now();
        let classify_input = format!("{} listings via {}", listings.len(), self.classifier.model());
        let verdicts = self
            .classifier
            .classify(&listings)
            .await
            .map_err(|e| self.fail(Stage::Classify, &classify_input, e, t))?;
        for v in untraced(&verdicts, &listings) {
            warn!(name = %v.name, url = %v.url, "verdict does not match any fetched listing");
        }
        ctx.state = RunState::Classified;
        ctx.verdicts = Some(verdicts.clone());
        self.succeed(Stage::Classify, classify_input, verdicts.len(), t);

        let t = Instant::now();
        let report = format_digest_for(&self.params.company, &verdicts);
        ctx.state = RunState::Formatted;
        ctx.report = Some(report.clone());
        self.succeed(
            Stage::Format,
            format!("{} verdicts", verdicts.len()),
            report.high_count() + report.medium_count(),
            t,
        );
        if let Err(e) = self.artifacts.store_report(&report).await {
            warn!(error = ?e, "could not save digest artifact");
        }

        let t = Instant::now();
        let deliver_input = format!("{} bytes to {destination}", report.as_str().len());
        let ack = self
            .publisher
            .publish(&report)
            .await
            .map_err(|e| self.fail(Stage::Deliver, &deliver_input, e, t))?;
        ctx.state = RunState::Delivered;
        self.succeed(Stage::Deliver, deliver_input, 1, t);

        Ok(RunOutcome::Delivered { report, ack })
    }

    fn emit(&self, event: StageEvent) {
        for o in &self.observers {
            o.on_event(&event);
        }
    }

    fn succeed(&self, stage: Stage, input: String, items: usize, started: Instant) {
        self.emit(StageEvent {
            stage,
            input,
            outcome: StageOutcome::Succeeded,
            items,
            elapsed: started.elapsed(),
        });
    }

    fn fail(
        &self,
        stage: Stage,
        input: &str,
        source: DigestError,
        started: Instant,
    ) -> PipelineFailure {
        self.emit(StageEvent {
            stage,
            input: input.to_string(),
            outcome: StageOutcome::Failed {
                kind: source.kind(),
                cause: source.to_string(),
            },
            items: 0,
            elapsed: started.elapsed(),
        });
        PipelineFailure { stage, source }
    }
}
