//! Structured client events.
//!
//! The catalog client reports what it does through an injected `EventSink`
//! instead of printing. The default sink writes `tracing` records; tests
//! install a recording sink and assert on the events themselves.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use http::StatusCode;
use tracing::{info, warn};

use crate::helpers::time::local_clock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ProductDetails,
    KeywordSearch,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::ProductDetails => "product_details",
            Operation::KeywordSearch => "keyword_search",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    TokenAcquired {
        acquired_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    },
    AuthenticationFailed {
        status: StatusCode,
    },
    SearchSucceeded {
        operation: Operation,
        elapsed_secs: f64,
    },
    RateLimited {
        operation: Operation,
        elapsed_secs: f64,
    },
    SearchFailed {
        operation: Operation,
        status: Option<StatusCode>,
        elapsed_secs: f64,
    },
}

pub trait EventSink: Send + Sync {
    fn on_event(&self, event: &ClientEvent);
}

/// Writes every event as a tracing record
#[derive(Debug, Clone, Default)]
pub struct TracingEvents;

impl EventSink for TracingEvents {
    fn on_event(&self, event: &ClientEvent) {
        match event {
            ClientEvent::TokenAcquired { acquired_at, expires_at } => {
                info!(
                    acquired_at = %acquired_at.to_rfc3339(),
                    expires_at = %local_clock(*expires_at),
                    "access token acquired"
                );
            }
            ClientEvent::AuthenticationFailed { status } => {
                warn!(status = %status, "error obtaining access token");
            }
            ClientEvent::SearchSucceeded { operation, elapsed_secs } => {
                info!(operation = operation.as_str(), elapsed_secs, "search succeeded");
            }
            ClientEvent::RateLimited { operation, elapsed_secs } => {
                warn!(operation = operation.as_str(), elapsed_secs, "rate limited (more than limit)");
            }
            ClientEvent::SearchFailed { operation, status, elapsed_secs } => {
                warn!(
                    operation = operation.as_str(),
                    status = ?status,
                    elapsed_secs,
                    "search failed"
                );
            }
        }
    }
}

/// Forwards each event to every inner sink, in order
#[derive(Clone, Default)]
pub struct FanoutEvents {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl FanoutEvents {
    pub fn with(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl EventSink for FanoutEvents {
    fn on_event(&self, event: &ClientEvent) {
        for sink in &self.sinks {
            sink.on_event(event);
        }
    }
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct RecordingEvents {
    events: Mutex<Vec<ClientEvent>>,
}

impl RecordingEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ClientEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn count(&self, pred: impl Fn(&ClientEvent) -> bool) -> usize {
        self.events().iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingEvents {
    fn on_event(&self, event: &ClientEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
