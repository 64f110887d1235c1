//! Bounded, time-expiring conversation window.
//!
//! Keeps the most recent exchanges for follow-up interpretation, resets
//! lazily when the next exchange arrives after the expiry window, and
//! decides whether the assistant should keep listening without a wake word.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Duration;
use serde::Serialize;
use uuid::Uuid;

use friday_core::config::ConversationConfig;
use friday_core::types::{ContextEntry, Entities, Intent, Timestamp};

use crate::clock::{Clock, SystemClock};
use crate::state::{exceeds, expiry_window, ContextPhase};

/// Mutable part of the conversation, guarded by a single lock.
#[derive(Debug)]
struct ConversationState {
    session_id: Uuid,
    history: VecDeque<ContextEntry>,
    last_interaction_time: Option<Timestamp>,
}

impl ConversationState {
    fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            history: VecDeque::new(),
            last_interaction_time: None,
        }
    }

    fn gap(&self, now: Timestamp) -> Option<Duration> {
        self.last_interaction_time.map(|last| now - last)
    }
}

/// Point-in-time view of the conversation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextSnapshot {
    pub session_id: Uuid,
    /// Committed exchanges, oldest first.
    pub history: Vec<ContextEntry>,
    /// Seconds since the last interaction; `None` if there never was one.
    pub context_age: Option<u64>,
    /// The most recent exchange.
    pub current: Option<ContextEntry>,
}

/// Conversation window shared by one session.
///
/// All mutations run under one lock so the expiry check and the append are
/// atomic with respect to concurrent callers.
pub struct ConversationContext {
    settings: ConversationConfig,
    clock: Arc<dyn Clock>,
    state: Mutex<ConversationState>,
}

impl ConversationContext {
    /// Create a context driven by the system clock.
    pub fn new(settings: &ConversationConfig) -> Self {
        Self::with_clock(settings, Arc::new(SystemClock))
    }

    pub fn with_clock(settings: &ConversationConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            settings: settings.clone(),
            clock,
            state: Mutex::new(ConversationState::new()),
        }
    }

    fn expiry(&self) -> Duration {
        expiry_window(self.settings.conversation_expiry_secs)
    }

    fn lock(&self) -> MutexGuard<'_, ConversationState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Commit one exchange.
    ///
    /// If the previous interaction is older than the expiry window the
    /// history is cleared first and a new session id is issued. The oldest
    /// entries are evicted once the history exceeds its capacity.
    pub fn update(&self, text: &str, intent: Intent, entities: Entities) {
        let now = self.clock.now();
        let mut state = self.lock();

        if let Some(gap) = state.gap(now) {
            if exceeds(gap, self.expiry()) {
                tracing::debug!(
                    gap_ms = gap.num_milliseconds(),
                    dropped = state.history.len(),
                    "Conversation expired; starting a new context"
                );
                state.history.clear();
                state.session_id = Uuid::new_v4();
            }
        }

        state.history.push_back(ContextEntry {
            text: text.to_string(),
            intent,
            entities,
            timestamp: now,
        });
        while state.history.len() > self.settings.context_memory_size {
            state.history.pop_front();
        }
        state.last_interaction_time = Some(now);
    }

    /// Snapshot of the history and its age.
    pub fn get_context(&self) -> ContextSnapshot {
        let now = self.clock.now();
        let state = self.lock();
        ContextSnapshot {
            session_id: state.session_id,
            history: state.history.iter().cloned().collect(),
            context_age: state
                .gap(now)
                .map(|gap| gap.num_seconds().max(0) as u64),
            current: state.history.back().cloned(),
        }
    }

    /// Whether the caller should keep listening for a follow-up.
    ///
    /// Requires a prior interaction strictly inside the expiry window and
    /// fewer than `max_conversation_turns` entries in the history.
    pub fn should_continue(&self) -> bool {
        let now = self.clock.now();
        let state = self.lock();
        let Some(gap) = state.gap(now) else {
            return false;
        };
        gap.max(Duration::zero()) < self.expiry()
            && state.history.len() < self.settings.max_conversation_turns
    }

    pub fn phase(&self) -> ContextPhase {
        let now = self.clock.now();
        let state = self.lock();
        ContextPhase::from_gap(state.gap(now), self.expiry())
    }

    /// Drop all history and return to the expired phase.
    pub fn reset(&self) {
        let mut state = self.lock();
        tracing::debug!(dropped = state.history.len(), "Conversation context reset");
        *state = ConversationState::new();
    }

    pub fn len(&self) -> usize {
        self.lock().history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().history.is_empty()
    }

    pub fn settings(&self) -> &ConversationConfig {
        &self.settings
    }
}

// =============================================================================
// Tests
// =============================================================================
