//! # Event Queue
//!
//! Per-listener asynchronous delivery buffer.
//!
//! # Lifecycle
//!
//! ```text
//! Idle --enqueue--> Draining --queue empty--> Idle
//!                      |
//!                  write error
//!                      v
//!                   Closed
//! ```
//!
//! A worker task is spawned on the first enqueue while idle. It pops events
//! in FIFO order, converts each to response lines and writes them to the
//! owner's sink. When the queue is empty the worker exits instead of
//! waiting, so an idle player costs no task at all. At most one worker runs
//! per queue because the `running` flag is flipped under the same lock as
//! the queue itself.
//!
//! # Failure
//!
//! A write error closes the queue: pending events are discarded and later
//! enqueues are refused. The sink is responsible for marking its connection
//! as disconnected.

use crate::event::Event;
use crate::event_manager::EventListener;
use crate::sink::ResponseSink;
use gridhunt_core::PlayerName;
use gridhunt_protocol::Response;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Maps an event to the lines written for it
pub type Converter = fn(&Event) -> Vec<Response>;

#[derive(Default)]
struct QueueState {
    pending: VecDeque<Event>,
    worker: Option<JoinHandle<()>>,
    running: bool,
    closed: bool,
}

struct QueueInner {
    owner: PlayerName,
    sink: Arc<dyn ResponseSink>,
    convert: Converter,
    state: Mutex<QueueState>,
    converted: AtomicU64,
}

/// Asynchronous delivery queue of one listener
///
/// Cloning yields another handle to the same queue.
#[derive(Clone)]
pub struct EventQueue {
    inner: Arc<QueueInner>,
}

impl EventQueue {
    /// Queue delivering to `sink` with the standard wire mapping
    pub fn new(owner: PlayerName, sink: Arc<dyn ResponseSink>) -> Self {
        Self::with_converter(owner, sink, Event::to_responses)
    }

    pub fn with_converter(owner: PlayerName, sink: Arc<dyn ResponseSink>, convert: Converter) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                owner,
                sink,
                convert,
                state: Mutex::new(QueueState::default()),
                converted: AtomicU64::new(0),
            }),
        }
    }

    /// Append `event`, spawning a worker if none is running
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Returns
    /// `false` if the queue is closed and the event was dropped
    pub fn enqueue(&self, event: Event) -> bool {
        let mut state = self.inner.state.lock();
        if state.closed {
            return false;
        }

        state.pending.push_back(event);
        if !state.running {
            state.running = true;
            state.worker = Some(tokio::spawn(self.inner.clone().drain()));
        }
        true
    }

    /// Refuse further events and wait for the current worker to finish
    ///
    /// Events already queued are still delivered. Once this returns, the
    /// queue will never write to its sink again.
    pub async fn shutdown(&self) {
        let worker = {
            let mut state = self.inner.state.lock();
            state.closed = true;
            state.worker.take()
        };

        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                tracing::error!("Event worker for {} panicked: {:?}", self.inner.owner, e);
            }
        }
    }

    /// No worker is running
    pub fn is_idle(&self) -> bool {
        !self.inner.state.lock().running
    }

    pub fn is_closed(&self) -> bool {
        self.inner.state.lock().closed
    }

    pub fn pending(&self) -> usize {
        self.inner.state.lock().pending.len()
    }

    /// Number of events converted so far
    pub fn converted(&self) -> u64 {
        self.inner.converted.load(Ordering::Relaxed)
    }
}

impl EventListener for EventQueue {
    fn process_event(&self, event: &Event) {
        if !self.enqueue(event.clone()) {
            tracing::debug!("Queue for {} is closed, dropping {}", self.inner.owner, event.subject());
        }
    }
}

impl QueueInner {
    /// Worker body: drain FIFO until empty or a write fails
    async fn drain(self: Arc<Self>) {
        loop {
            let event = {
                let mut state = self.state.lock();
                match state.pending.pop_front() {
                    Some(event) => event,
                    None => {
                        state.running = false;
                        return;
                    }
                }
            };

            let responses = (self.convert)(&event);
            self.converted.fetch_add(1, Ordering::Relaxed);
            if responses.is_empty() {
                continue;
            }

            if let Err(e) = self.sink.send(&responses).await {
                tracing::warn!("Async delivery to {} failed: {}", self.owner, e);
                let mut state = self.state.lock();
                state.closed = true;
                state.running = false;
                state.pending.clear();
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingSink;
    use std::time::Duration;

    fn ann() -> PlayerName {
        PlayerName::from("Ann")
    }

    async fn wait_idle(queue: &EventQueue) {
        for _ in 0..200 {
            if queue.is_idle() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("queue never went idle");
    }

    #[tokio::test]
    async fn test_delivers_in_fifo_order() {
        let sink = Arc::new(RecordingSink::new());
        let queue = EventQueue::new(ann(), sink.clone());

        for i in 0..50 {
            assert!(queue.enqueue(Event::SendMessage(format!("m{}", i))));
        }
        queue.shutdown().await;

        let expected: Vec<String> = (0..50).map(|i| format!("100:m{}", i)).collect();
        assert_eq!(sink.lines(), expected);
        assert_eq!(queue.converted(), 50);
    }

    #[tokio::test]
    async fn test_returns_to_idle_and_respawns() {
        let sink = Arc::new(RecordingSink::new());
        let queue = EventQueue::new(ann(), sink.clone());
        assert!(queue.is_idle());

        queue.enqueue(Event::SendMessage("one".into()));
        wait_idle(&queue).await;
        assert_eq!(sink.lines(), vec!["100:one"]);

        queue.enqueue(Event::SendMessage("two".into()));
        wait_idle(&queue).await;
        assert_eq!(sink.lines(), vec!["100:one", "100:two"]);
        assert_eq!(queue.pending(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_single_worker_under_concurrent_enqueue() {
        let sink = Arc::new(RecordingSink::with_delay(Duration::from_millis(1)));
        let queue = EventQueue::new(ann(), sink.clone());

        let producers: Vec<_> = (0..4)
            .map(|p| {
                let queue = queue.clone();
                tokio::spawn(async move {
                    for i in 0..25 {
                        queue.enqueue(Event::SendMessage(format!("{}-{}", p, i)));
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();
        for producer in producers {
            producer.await.unwrap();
        }
        wait_idle(&queue).await;

        assert_eq!(sink.max_in_flight(), 1);
        assert_eq!(queue.converted(), 100);

        // Each producer's events stay in its own order
        let lines = sink.lines();
        assert_eq!(lines.len(), 100);
        for p in 0..4 {
            let seen: Vec<usize> = lines
                .iter()
                .filter_map(|line| line.strip_prefix(&format!("100:{}-", p)))
                .map(|i| i.parse().unwrap())
                .collect();
            assert_eq!(seen, (0..25).collect::<Vec<_>>());
        }
    }

    #[tokio::test]
    async fn test_write_failure_closes_queue() {
        let sink = Arc::new(RecordingSink::new());
        sink.fail_writes();
        let queue = EventQueue::new(ann(), sink.clone());

        queue.enqueue(Event::SendMessage("lost".into()));
        wait_idle(&queue).await;

        assert!(queue.is_closed());
        assert!(!queue.enqueue(Event::SendMessage("refused".into())));
        assert!(sink.lines().is_empty());
    }

    #[tokio::test]
    async fn test_no_writes_after_shutdown() {
        let sink = Arc::new(RecordingSink::new());
        let queue = EventQueue::new(ann(), sink.clone());

        queue.enqueue(Event::SendMessage("before".into()));
        queue.shutdown().await;
        queue.process_event(&Event::SendMessage("after".into()));
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(sink.lines(), vec!["100:before"]);
    }

    #[tokio::test]
    async fn test_empty_conversion_still_counted() {
        let sink = Arc::new(RecordingSink::new());
        let queue = EventQueue::with_converter(ann(), sink.clone(), |_| Vec::new());

        queue.enqueue(Event::SendMessage("quiet".into()));
        queue.shutdown().await;

        assert_eq!(queue.converted(), 1);
        assert!(sink.lines().is_empty());
    }
}
