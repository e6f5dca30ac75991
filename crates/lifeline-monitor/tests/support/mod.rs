//! Test doubles shared by the monitor integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use lifeline_common::{EventRecord, LifelineError, LifelinePaths, LifelineResult};
use lifeline_monitor::{
    Classifier, ContainerRuntime, ContainerSnapshot, ContainerSummary, MonitorConfig, RawEvent,
};
use lifeline_notify::{DispatchReport, Notifier};
use lifeline_store::{AuditQuery, AuditStore, FileStore};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_stream::wrappers::UnboundedReceiverStream;

/// Runtime whose event feed and inspect results are scripted by the test.
#[derive(Default)]
pub struct FakeRuntime {
    feed: Mutex<Option<mpsc::UnboundedReceiver<LifelineResult<RawEvent>>>>,
    snapshots: Mutex<HashMap<String, ContainerSnapshot>>,
    inspected_at: Mutex<Vec<Instant>>,
    fail_inspect: AtomicBool,
}

impl FakeRuntime {
    /// A runtime plus the sender that feeds its event stream.
    pub fn new() -> (Arc<Self>, mpsc::UnboundedSender<LifelineResult<RawEvent>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let runtime = Self {
            feed: Mutex::new(Some(rx)),
            ..Self::default()
        };
        (Arc::new(runtime), tx)
    }

    pub fn set_container(&self, id: &str, name: &str, image: &str, running: bool) {
        self.snapshots.lock().unwrap().insert(
            id.to_string(),
            ContainerSnapshot {
                running,
                image: image.to_string(),
                name: name.to_string(),
            },
        );
    }

    pub fn fail_inspect(&self, fail: bool) {
        self.fail_inspect.store(fail, Ordering::SeqCst);
    }

    pub fn inspect_times(&self) -> Vec<Instant> {
        self.inspected_at.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    fn subscribe(&self) -> BoxStream<'static, LifelineResult<RawEvent>> {
        match self.feed.lock().unwrap().take() {
            Some(rx) => UnboundedReceiverStream::new(rx).boxed(),
            None => futures::stream::empty().boxed(),
        }
    }

    async fn inspect(&self, id: &str) -> LifelineResult<ContainerSnapshot> {
        self.inspected_at.lock().unwrap().push(Instant::now());
        if self.fail_inspect.load(Ordering::SeqCst) {
            return Err(LifelineError::runtime("connection refused"));
        }
        self.snapshots
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| LifelineError::EntityNotFound { id: id.to_string() })
    }

    async fn list(&self) -> LifelineResult<Vec<ContainerSummary>> {
        Ok(Vec::new())
    }

    async fn ping(&self) -> LifelineResult<()> {
        Ok(())
    }
}

/// Notifier that records every message.
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, message: &str) -> DispatchReport {
        self.messages.lock().unwrap().push(message.to_string());
        DispatchReport {
            delivered: vec!["recorder".to_string()],
            failed: Vec::new(),
        }
    }
}

/// Audit store that rejects every write.
pub struct FailingAudit;

#[async_trait]
impl AuditStore for FailingAudit {
    async fn append(&self, _record: EventRecord) -> LifelineResult<()> {
        Err(LifelineError::storage("disk full"))
    }

    async fn query(&self, _query: AuditQuery) -> LifelineResult<Vec<EventRecord>> {
        Ok(Vec::new())
    }

    async fn count(&self) -> LifelineResult<usize> {
        Ok(0)
    }
}

/// Everything a classifier test needs.
pub struct Harness {
    pub runtime: Arc<FakeRuntime>,
    pub feed: mpsc::UnboundedSender<LifelineResult<RawEvent>>,
    pub store: Arc<FileStore>,
    pub notifier: Arc<RecordingNotifier>,
    _dir: tempfile::TempDir,
}

impl Harness {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileStore::open(LifelinePaths::with_root(dir.path())).unwrap());
        let (runtime, feed) = FakeRuntime::new();

        Self {
            runtime,
            feed,
            store,
            notifier: Arc::new(RecordingNotifier::default()),
            _dir: dir,
        }
    }

    /// Config with a short settle delay so real-time tests stay fast.
    pub fn config() -> MonitorConfig {
        MonitorConfig::default().with_settle_delay(std::time::Duration::from_millis(10))
    }

    pub fn classifier(&self) -> Classifier {
        self.classifier_with(self.store.clone(), Self::config())
    }

    pub fn classifier_with(&self, audit: Arc<dyn AuditStore>, config: MonitorConfig) -> Classifier {
        Classifier::new(
            self.runtime.clone(),
            self.store.clone(),
            audit,
            self.notifier.clone(),
            config,
        )
    }

    pub async fn audit(&self) -> Vec<EventRecord> {
        self.store.query(AuditQuery::recent()).await.unwrap()
    }
}
