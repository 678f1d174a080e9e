// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Realtime Session Event
//!
//! An append-only log entry emitted while a realtime (WebSocket) model
//! session runs (spec.md §6.5). Events are strictly ordered by `sequence`
//! and timestamped against a per-session monotonic clock, never wall time,
//! so `elapsed_ms_since_audio_start` cannot go backwards under clock skew
//! (`services::clock::MonotonicBaseline`).

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// The realtime protocol event kinds a session can log, per spec.md §6.5's
/// state machine (`Connecting -> SessionConfigured -> AudioStreaming ->
/// Committed -> ResponseInFlight -> Done`). Tags are the literal wire
/// protocol strings the Azure OpenAI realtime API uses for its own frames
/// (spec.md §8 scenario 6), not an internal naming scheme — a consumer
/// diffing an event log against a protocol trace should see matching
/// strings. `AudioConversionDecision`, `ResponseAudioDelta`, `Error`, and
/// `Closed` have no corresponding outbound/inbound frame type and keep an
/// internal tag.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "session.connected")]
    SessionConnected,
    #[serde(rename = "session.update")]
    SessionUpdate,
    #[serde(rename = "audio.conversion_decision")]
    AudioConversionDecision,
    #[serde(rename = "input_audio_buffer.append")]
    InputAudioBufferAppend,
    #[serde(rename = "input_audio_buffer.commit")]
    InputAudioBufferCommit,
    #[serde(rename = "response.create")]
    ResponseCreate,
    #[serde(rename = "response.text.delta")]
    ResponseTextDelta,
    #[serde(rename = "response.audio.delta")]
    ResponseAudioDelta,
    #[serde(rename = "response.done")]
    ResponseDone,
    #[serde(rename = "error")]
    Error,
    #[serde(rename = "closed")]
    Closed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Strictly increasing within one session, starting at 0.
    pub sequence: u64,
    pub timestamp_utc: String,
    /// `None` until audio streaming has started (spec.md §6.5: elapsed is
    /// measured from first audio byte sent, not from connect).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_ms_since_audio_start: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Json>,
    /// True for `input_audio_buffer.append` events: the outbound payload
    /// carries raw audio bytes and must never be echoed into a log sink
    /// (spec.md §8 "No secret leakage" extends to raw audio, not just
    /// credentials).
    pub redacted: bool,
}

/// Appends events under a monotonically increasing `sequence`. Holds no
/// transport state; the realtime adapter (infrastructure) owns the socket
/// and pushes events here as they occur.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<RealtimeEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        EventLog { events: Vec::new() }
    }

    pub fn push(
        &mut self,
        kind: EventKind,
        elapsed_ms_since_audio_start: Option<u64>,
        size_bytes: Option<usize>,
        message: Option<String>,
        detail: Option<Json>,
    ) -> &RealtimeEvent {
        let redacted = kind == EventKind::InputAudioBufferAppend;
        let event = RealtimeEvent {
            kind,
            sequence: self.events.len() as u64,
            timestamp_utc: crate::services::clock::now_utc_iso(),
            elapsed_ms_since_audio_start,
            size_bytes,
            message,
            detail,
            redacted,
        };
        self.events.push(event);
        self.events.last().expect("just pushed")
    }

    pub fn events(&self) -> &[RealtimeEvent] {
        &self.events
    }

    pub fn as_json(&self) -> Json {
        serde_json::to_value(&self.events).expect("event log is always serializable")
    }
}
