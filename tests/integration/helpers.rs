//! Shared generators and fixtures for integration tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use feedweave::config::{OrchestratorConfig, PoolConfig};
use feedweave::{
    Context, FeedOrchestrator, GenerationContext, Generator, GeneratorError, HandlePool, Item, ItemId, ItemPayload,
    Session, SessionFactory,
};

/// What a [`ScriptedGenerator`] does when invoked.
#[derive(Debug, Clone)]
pub(crate) enum Script {
    /// Sleep, then return the items.
    Items { delay: Duration, items: Vec<Item> },
    /// Sleep, then fail.
    Fail { delay: Duration, reason: String },
    /// Panic straight away.
    Panic,
}

/// A generator driven by a [`Script`] that records the handles it was given.
pub(crate) struct ScriptedGenerator {
    name: String,
    script: Script,
    handles: Arc<Mutex<Vec<u64>>>,
}

impl ScriptedGenerator {
    pub(crate) fn new(name: &str, script: Script) -> Self {
        Self {
            name: name.to_owned(),
            script,
            handles: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn items(name: &str, delay_secs: u64, items: Vec<Item>) -> Self {
        Self::new(
            name,
            Script::Items {
                delay: Duration::from_secs(delay_secs),
                items,
            },
        )
    }

    pub(crate) fn failing(name: &str, reason: &str) -> Self {
        Self::new(
            name,
            Script::Fail {
                delay: Duration::ZERO,
                reason: reason.to_owned(),
            },
        )
    }

    /// Record handle ids into `sink` instead of a private list.
    pub(crate) fn recording_into(mut self, sink: Arc<Mutex<Vec<u64>>>) -> Self {
        self.handles = sink;
        self
    }
}

#[async_trait]
impl Generator<Session> for ScriptedGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn produce(&self, ctx: &mut GenerationContext<Session>) -> Result<Vec<Item>, GeneratorError> {
        self.handles.lock().expect("handles lock").push(ctx.handle_id());
        ctx.resource().record_request();
        match &self.script {
            Script::Items { delay, items } => {
                tokio::time::sleep(*delay).await;
                Ok(items.clone())
            }
            Script::Fail { delay, reason } => {
                tokio::time::sleep(*delay).await;
                Err(GeneratorError::Upstream(reason.clone()))
            }
            Script::Panic => panic!("scripted panic"),
        }
    }
}

pub(crate) fn at_minute(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, minute, 0).single().expect("valid time")
}

/// A note item with the given id created at `minute` past the hour.
pub(crate) fn note(id: &str, minute: u32) -> Item {
    Item::new(ItemId::new(id), at_minute(minute), "en-IN", ItemPayload::Note { text: id.to_owned() })
}

/// `count` notes `{prefix}-0..` with strictly increasing timestamps starting at `first_minute`.
pub(crate) fn notes(prefix: &str, first_minute: u32, count: u32) -> Vec<Item> {
    (0..count)
        .map(|i| note(&format!("{prefix}-{i}"), first_minute + i))
        .collect()
}

pub(crate) fn context() -> Context {
    Context::new("consumer-42", "en-IN", 12.97, 77.59).with_postal_code("560001")
}

pub(crate) fn orchestrator() -> FeedOrchestrator<SessionFactory> {
    FeedOrchestrator::new(Arc::new(HandlePool::new(SessionFactory)))
}

pub(crate) fn bounded_orchestrator(max_handles: usize, acquire_timeout_ms: Option<u64>) -> FeedOrchestrator<SessionFactory> {
    let pool = HandlePool::with_config(
        SessionFactory,
        &PoolConfig {
            max_handles: Some(max_handles),
            acquire_timeout_ms,
        },
    );
    FeedOrchestrator::with_config(Arc::new(pool), &OrchestratorConfig::default())
}

/// Collects formatted tracing output in memory.
#[derive(Clone, Default)]
pub(crate) struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Lines written so far.
    pub(crate) fn lines(&self) -> Vec<String> {
        let bytes = self.0.lock().expect("log lock").clone();
        String::from_utf8(bytes).expect("utf8 logs").lines().map(str::to_owned).collect()
    }

    /// The single line containing `message`.
    pub(crate) fn line_with(&self, message: &str, generator: Option<&str>) -> String {
        let matching: Vec<String> = self
            .lines()
            .into_iter()
            .filter(|line| line.contains(message))
            .filter(|line| generator.is_none_or(|g| line.contains(&format!("generator={g} "))))
            .collect();
        assert_eq!(matching.len(), 1, "expected one {message:?} line, got {matching:?}");
        matching.into_iter().next().expect("one line")
    }
}

impl std::io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().expect("log lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
