//! Tests for the narrated event log under the default filter.
//!
//! Installs the default `EnvFilter` with a recording layer for the duration of
//! one current-thread run, so every actor task logs through it.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::EnvFilter;
use tutoring_center::config::Config;
use tutoring_center::observability::DEFAULT_LOG_FILTER;
use tutoring_center::simulation::Simulation;

// ============================================================================
// Recording layer
// ============================================================================

#[derive(Clone, Default)]
struct RecordedLines {
    events: Arc<Mutex<Vec<(String, String)>>>,
    spans: Arc<Mutex<Vec<String>>>,
}

impl RecordedLines {
    fn narration(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(target, _)| target.starts_with("tutoring.actor."))
            .map(|(_, message)| message.clone())
            .collect()
    }

    fn messages(&self) -> Vec<String> {
        let lines = self.events.lock().unwrap();
        lines.iter().map(|(_, message)| message.clone()).collect()
    }

    fn span_names(&self) -> Vec<String> {
        self.spans.lock().unwrap().clone()
    }
}

struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

impl<S: Subscriber> Layer<S> for RecordedLines {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        self.events
            .lock()
            .unwrap()
            .push((event.metadata().target().to_string(), visitor.0));
    }

    fn on_new_span(&self, attrs: &Attributes<'_>, _id: &Id, _ctx: Context<'_, S>) {
        let name = attrs.metadata().name().to_string();
        self.spans.lock().unwrap().push(name);
    }
}

async fn run_recorded(filter: &str) -> RecordedLines {
    let lines = RecordedLines::default();
    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::new(filter))
        .with(lines.clone());
    let _guard = tracing::subscriber::set_default(subscriber);

    let config = Config::new(1, 1, 1, 1)
        .unwrap()
        .with_delays(Duration::from_micros(100), Duration::from_micros(100))
        .with_seed(3);
    Simulation::new(config).run().await.unwrap();

    lines
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_default_filter_shows_every_actor_event() {
    let lines = run_recorded(DEFAULT_LOG_FILTER).await;

    assert_eq!(
        lines.narration(),
        vec![
            "S: Student 1 takes a seat. Empty chairs = 0",
            "C: Student 1 with priority 0 added to the queue. Waiting students now = 1. \
             Total requests = 1",
            "C: Student 1 dispatched to the tutors. Students awaiting a tutor = 1",
            "T: Student 1 tutored by Tutor 1. Students tutored now = 1. \
             Total sessions tutored = 1",
            "T: Tutor 1 finished with Student 1. Students tutored now = 0",
            "S: Student 1 received help from Tutor 1",
            "S: Student 1 leaves the chair. Empty chairs = 1",
        ]
    );
}

#[tokio::test]
async fn test_default_filter_hides_debug_lifecycle() {
    let lines = run_recorded(DEFAULT_LOG_FILTER).await;
    let messages = lines.messages();

    assert!(messages.iter().any(|m| m == "Simulation complete"));
    assert!(!messages.iter().any(|m| m == "StudentActor started"));
}

#[tokio::test]
async fn test_actor_spans_use_short_names() {
    let lines = run_recorded(DEFAULT_LOG_FILTER).await;
    let spans = lines.span_names();

    for name in ["simulation", "coordinator", "tutor", "student"] {
        assert!(spans.iter().any(|s| s == name), "missing span {name}");
    }
    assert!(!spans.iter().any(|s| s.starts_with("tutoring.")));
}

#[tokio::test]
async fn test_crate_only_filter_misses_narration() {
    let lines = run_recorded("tutoring_center=info").await;
    assert!(lines.narration().is_empty());
}
