// tests/pipeline_flow.rs
//
// Orchestrator behavior with in-memory stage doubles: transitions, short-circuits,
// failure containment and emitted stage events.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use launch_digest::analyze::{Classifier, Relevance, Verdict};
use launch_digest::artifacts::{ArtifactSink, NoArtifacts};
use launch_digest::digest::DigestReport;
use launch_digest::error::{DigestError, Result};
use launch_digest::ingest::{AccessToken, CredentialProvider, Listing, ListingSource};
use launch_digest::notify::{DeliveryAck, Identity, Publisher};
use launch_digest::pipeline::{
    Pipeline, RunObserver, RunOutcome, RunParams, RunState, Stage, StageEvent, StageOutcome,
};

#[derive(Default)]
struct Calls {
    log: Mutex<Vec<&'static str>>,
}

impl Calls {
    fn push(&self, c: &'static str) {
        self.log.lock().push(c);
    }
    fn all(&self) -> Vec<&'static str> {
        self.log.lock().clone()
    }
}

struct FakeAuth {
    calls: Arc<Calls>,
    fail: bool,
}

#[async_trait]
impl CredentialProvider for FakeAuth {
    async fn acquire_token(&self, client_id: &str, _secret: &str) -> Result<AccessToken> {
        self.calls.push("auth");
        assert_eq!(client_id, "cid");
        if self.fail {
            return Err(DigestError::auth(
                "token endpoint returned 401 Unauthorized",
                Some(r#"{"error":"invalid_client"}"#.into()),
            ));
        }
        Ok(AccessToken::new("tok"))
    }
}

struct FakeCatalog {
    calls: Arc<Calls>,
    reply: std::result::Result<Vec<Listing>, String>,
}

#[async_trait]
impl ListingSource for FakeCatalog {
    async fn fetch_recent(&self, token: &AccessToken, batch_size: u32) -> Result<Vec<Listing>> {
        self.calls.push("fetch");
        assert_eq!(token.as_str(), "tok");
        assert_eq!(batch_size, 20);
        self.reply.clone().map_err(DigestError::malformed)
    }
    fn name(&self) -> &'static str {
        "fake"
    }
}

struct FakeClassifier {
    calls: Arc<Calls>,
    reply: std::result::Result<Vec<Verdict>, String>,
    seen: Mutex<Vec<Listing>>,
}

#[async_trait]
impl Classifier for FakeClassifier {
    async fn classify(&self, listings: &[Listing]) -> Result<Vec<Verdict>> {
        self.calls.push("classify");
        *self.seen.lock() = listings.to_vec();
        self.reply.clone().map_err(DigestError::classification)
    }
    fn model(&self) -> &str {
        "fake-model"
    }
}

struct FakePublisher {
    calls: Arc<Calls>,
    probe_ok: bool,
    publish_ok: bool,
    published: Mutex<Vec<String>>,
}

#[async_trait]
impl Publisher for FakePublisher {
    async fn probe(&self) -> Result<Identity> {
        self.calls.push("probe");
        if !self.probe_ok {
            return Err(DigestError::delivery("slack auth.test: invalid_auth"));
        }
        Ok(Identity {
            user: "bot".into(),
            team: "acme".into(),
        })
    }
    async fn publish(&self, report: &DigestReport) -> Result<DeliveryAck> {
        self.calls.push("publish");
        if !self.publish_ok {
            return Err(DigestError::delivery("slack chat.postMessage: channel_not_found"));
        }
        self.published.lock().push(report.as_str().to_string());
        Ok(DeliveryAck {
            channel: "C1".into(),
            ts: "1.2".into(),
        })
    }
    fn destination(&self) -> &str {
        "C1"
    }
}

#[derive(Default)]
struct MemArtifacts {
    listings: Mutex<Option<Vec<Listing>>>,
    report: Mutex<Option<String>>,
}

#[async_trait]
impl ArtifactSink for MemArtifacts {
    async fn store_listings(&self, listings: &[Listing]) -> anyhow::Result<()> {
        *self.listings.lock() = Some(listings.to_vec());
        Ok(())
    }
    async fn store_report(&self, report: &DigestReport) -> anyhow::Result<()> {
        *self.report.lock() = Some(report.as_str().to_string());
        Ok(())
    }
}

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<StageEvent>>,
}

impl RunObserver for Recorder {
    fn on_event(&self, event: &StageEvent) {
        self.events.lock().push(event.clone());
    }
}

struct Harness {
    calls: Arc<Calls>,
    classifier: Arc<FakeClassifier>,
    publisher: Arc<FakePublisher>,
    artifacts: Arc<MemArtifacts>,
    recorder: Arc<Recorder>,
    pipeline: Pipeline,
}

struct Setup {
    auth_fails: bool,
    catalog: std::result::Result<Vec<Listing>, String>,
    verdicts: std::result::Result<Vec<Verdict>, String>,
    probe_ok: bool,
    publish_ok: bool,
}

impl Default for Setup {
    fn default() -> Self {
        Self {
            auth_fails: false,
            catalog: Ok(three_listings()),
            verdicts: Ok(vec![
                verdict("A", Relevance::High),
                verdict("B", Relevance::Medium),
            ]),
            probe_ok: true,
            publish_ok: true,
        }
    }
}

fn harness(s: Setup) -> Harness {
    let calls = Arc::new(Calls::default());
    let classifier = Arc::new(FakeClassifier {
        calls: calls.clone(),
        reply: s.verdicts,
        seen: Mutex::new(vec![]),
    });
    let publisher = Arc::new(FakePublisher {
        calls: calls.clone(),
        probe_ok: s.probe_ok,
        publish_ok: s.publish_ok,
        published: Mutex::new(vec![]),
    });
    let artifacts = Arc::new(MemArtifacts::default());
    let recorder = Arc::new(Recorder::default());

    let pipeline = Pipeline::new(
        Arc::new(FakeAuth {
            calls: calls.clone(),
            fail: s.auth_fails,
        }),
        Arc::new(FakeCatalog {
            calls: calls.clone(),
            reply: s.catalog,
        }),
        classifier.clone(),
        publisher.clone(),
        artifacts.clone(),
        RunParams {
            client_id: "cid".into(),
            client_secret: "secret".into(),
            batch_size: 20,
            company: "Headless Agents".into(),
        },
    )
    .with_observer(recorder.clone());

    Harness {
        calls,
        classifier,
        publisher,
        artifacts,
        recorder,
        pipeline,
    }
}

fn listing(name: &str) -> Listing {
    Listing::new(
        name,
        format!("{name} tagline"),
        format!("{name} description"),
        format!("https://ph/{name}"),
        vec!["Developer Tools".into()],
    )
}

fn three_listings() -> Vec<Listing> {
    vec![listing("A"), listing("B"), listing("C")]
}

fn verdict(name: &str, relevance: Relevance) -> Verdict {
    Verdict {
        name: name.into(),
        url: format!("https://ph/{name}"),
        relevance,
        overview: format!("{name} builds agent tooling."),
        reasoning: format!("{name} overlaps with our roadmap."),
    }
}

#[tokio::test]
async fn three_listings_two_verdicts_end_to_end() {
    let h = harness(Setup::default());
    let run = h.pipeline.run().await;

    assert!(run.is_success(), "{}", run.summary());
    assert_eq!(run.context.state, RunState::Done);
    assert_eq!(h.calls.all(), vec!["probe", "auth", "fetch", "classify", "publish"]);
    assert_eq!(h.classifier.seen.lock().len(), 3);

    let text = match &run.outcome {
        Ok(RunOutcome::Delivered { report, ack }) => {
            assert_eq!(ack.channel, "C1");
            report.as_str().to_string()
        }
        other => panic!("expected delivered outcome, got {other:?}"),
    };

    assert_eq!(text.matches("### [A](https://ph/A)").count(), 1);
    assert_eq!(text.matches("### [B](https://ph/B)").count(), 1);
    assert!(!text.contains("[C]"));
    assert!(!text.contains("https://ph/C"));

    let high = text.find("## 🔥 High Relevance").unwrap();
    let a = text.find("[A]").unwrap();
    let medium = text.find("## 👀 Medium Relevance").unwrap();
    let b = text.find("[B]").unwrap();
    assert!(high < a && a < medium && medium < b);

    // exactly one message, identical to the artifact
    assert_eq!(*h.publisher.published.lock(), vec![text.clone()]);
    assert_eq!(h.artifacts.report.lock().as_deref(), Some(text.as_str()));
    assert_eq!(h.artifacts.listings.lock().as_ref().map(|l| l.len()), Some(3));
}

#[tokio::test]
async fn empty_catalog_short_circuits_without_downstream_calls() {
    let h = harness(Setup {
        catalog: Ok(vec![]),
        ..Setup::default()
    });
    let run = h.pipeline.run().await;

    assert!(matches!(run.outcome, Ok(RunOutcome::NoLaunches)));
    assert_eq!(run.context.state, RunState::Done);
    assert_eq!(h.calls.all(), vec!["probe", "auth", "fetch"]);
    assert!(run.context.report.is_none());
    assert!(h.artifacts.report.lock().is_none());
    assert!(run.summary().contains("no relevant launches"));

    let skipped: Vec<Stage> = h
        .recorder
        .events
        .lock()
        .iter()
        .filter(|e| matches!(e.outcome, StageOutcome::Skipped { .. }))
        .map(|e| e.stage)
        .collect();
    assert_eq!(skipped, vec![Stage::Classify, Stage::Format, Stage::Deliver]);
}

#[tokio::test]
async fn malformed_catalog_fails_fetch_stage() {
    let h = harness(Setup {
        catalog: Err("response has no top-level data payload".into()),
        ..Setup::default()
    });
    let run = h.pipeline.run().await;

    let failure = run.outcome.as_ref().unwrap_err();
    assert_eq!(failure.stage, Stage::Fetch);
    assert!(matches!(failure.source, DigestError::MalformedResponse(_)));
    assert_eq!(run.context.state, RunState::Failed(Stage::Fetch));
    assert_eq!(h.calls.all(), vec!["probe", "auth", "fetch"]);
    assert!(run.summary().contains("`fetch`"));
}

#[tokio::test]
async fn probe_failure_stops_before_any_work() {
    let h = harness(Setup {
        probe_ok: false,
        ..Setup::default()
    });
    let run = h.pipeline.run().await;

    assert_eq!(run.outcome.as_ref().unwrap_err().stage, Stage::Preflight);
    assert_eq!(h.calls.all(), vec!["probe"]);
    assert!(run.context.listings.is_none());
}

#[tokio::test]
async fn auth_failure_is_fatal_and_carries_body() {
    let h = harness(Setup {
        auth_fails: true,
        ..Setup::default()
    });
    let run = h.pipeline.run().await;

    let failure = run.outcome.as_ref().unwrap_err();
    assert_eq!(failure.stage, Stage::Auth);
    match &failure.source {
        DigestError::Auth { body, .. } => {
            assert_eq!(body.as_deref(), Some(r#"{"error":"invalid_client"}"#))
        }
        other => panic!("expected auth error, got {other:?}"),
    }
    assert_eq!(h.calls.all(), vec!["probe", "auth"]);

    // the upstream reason reaches the operator, not just the error value
    assert!(run.summary().contains("invalid_client"), "{}", run.summary());
    let causes: Vec<String> = h
        .recorder
        .events
        .lock()
        .iter()
        .filter_map(|e| match &e.outcome {
            StageOutcome::Failed { cause, .. } => Some(cause.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(causes.len(), 1);
    assert!(causes[0].contains("invalid_client"), "{causes:?}");
}

#[tokio::test]
async fn classification_failure_keeps_listings_and_skips_delivery() {
    let h = harness(Setup {
        verdicts: Err("reply does not match schema".into()),
        ..Setup::default()
    });
    let run = h.pipeline.run().await;

    assert_eq!(run.outcome.as_ref().unwrap_err().stage, Stage::Classify);
    assert_eq!(run.context.state, RunState::Failed(Stage::Classify));
    assert_eq!(run.context.listings.as_ref().map(|l| l.len()), Some(3));
    assert!(run.report().is_none());
    assert!(!h.calls.all().contains(&"publish"));
}

#[tokio::test]
async fn delivery_failure_leaves_formatted_report_retrievable() {
    let h = harness(Setup {
        publish_ok: false,
        ..Setup::default()
    });
    let run = h.pipeline.run().await;

    let failure = run.outcome.as_ref().unwrap_err();
    assert_eq!(failure.stage, Stage::Deliver);
    assert_eq!(run.context.state, RunState::Failed(Stage::Deliver));

    let report = run.report().expect("report formatted before delivery");
    assert_eq!((report.high_count(), report.medium_count()), (1, 1));
    assert_eq!(
        h.artifacts.report.lock().as_deref(),
        Some(report.as_str()),
        "artifact written independent of delivery"
    );
    assert!(run.summary().contains("channel_not_found"));
}

#[tokio::test]
async fn zero_verdicts_still_delivers_empty_state_digest() {
    let h = harness(Setup {
        verdicts: Ok(vec![]),
        ..Setup::default()
    });
    let run = h.pipeline.run().await;

    assert!(run.is_success());
    let published = h.publisher.published.lock().clone();
    assert_eq!(published.len(), 1);
    assert!(published[0].contains("_No relevant launches found in the last 24 hours._"));
    assert!(!published[0].contains("## "));
}

#[tokio::test]
async fn observer_sees_one_event_per_stage_in_order() {
    let h = harness(Setup::default());
    let _ = h.pipeline.run().await;

    let events = h.recorder.events.lock().clone();
    let stages: Vec<Stage> = events.iter().map(|e| e.stage).collect();
    assert_eq!(
        stages,
        vec![
            Stage::Preflight,
            Stage::Auth,
            Stage::Fetch,
            Stage::Classify,
            Stage::Format,
            Stage::Deliver
        ]
    );
    assert!(events.iter().all(|e| e.outcome == StageOutcome::Succeeded));
    assert_eq!(events[2].items, 3);
    assert_eq!(events[3].items, 2);
    assert!(events[3].input.contains("fake-model"));
}

#[tokio::test]
async fn discarding_artifact_sink_does_not_change_the_run() {
    let calls = Arc::new(Calls::default());
    let publisher = Arc::new(FakePublisher {
        calls: calls.clone(),
        probe_ok: true,
        publish_ok: true,
        published: Mutex::new(vec![]),
    });
    let pipeline = Pipeline::new(
        Arc::new(FakeAuth {
            calls: calls.clone(),
            fail: false,
        }),
        Arc::new(FakeCatalog {
            calls: calls.clone(),
            reply: Ok(three_listings()),
        }),
        Arc::new(FakeClassifier {
            calls: calls.clone(),
            reply: Ok(vec![verdict("A", Relevance::High)]),
            seen: Mutex::new(vec![]),
        }),
        publisher.clone(),
        Arc::new(NoArtifacts),
        RunParams {
            client_id: "cid".into(),
            client_secret: "secret".into(),
            batch_size: 20,
            company: "Acme Robotics".into(),
        },
    );

    let run = pipeline.run().await;

    assert!(run.is_success(), "{}", run.summary());
    assert_eq!(calls.all(), vec!["probe", "auth", "fetch", "classify", "publish"]);
    assert_eq!(run.context.listings.as_ref().map(|l| l.len()), Some(3));
    let published = publisher.published.lock().clone();
    assert_eq!(published.len(), 1);
    assert!(published[0].starts_with("# Acme Robotics - Competitive Intelligence Digest"));
    assert_eq!(run.report().map(|r| r.as_str()), Some(published[0].as_str()));
}
