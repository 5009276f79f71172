//! Test doubles shared by this crate's unit tests

use crate::event::Event;
use crate::event_manager::EventListener;
use crate::sink::ResponseSink;
use async_trait::async_trait;
use gridhunt_core::{GridError, Result};
use gridhunt_protocol::Response;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// Listener that records every event inline
#[derive(Default)]
pub struct RecordingListener {
    events: Mutex<Vec<Event>>,
}

impl RecordingListener {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }
}

impl EventListener for RecordingListener {
    fn process_event(&self, event: &Event) {
        self.events.lock().push(event.clone());
    }
}

/// Sink that records written lines and tracks overlapping writes
#[derive(Default)]
pub struct RecordingSink {
    lines: Mutex<Vec<String>>,
    failing: AtomicBool,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn fail_writes(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResponseSink for RecordingSink {
    async fn send(&self, responses: &[Response]) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(GridError::Network("sink closed".into()));
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.lines.lock().extend(responses.iter().map(Response::to_line));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}
