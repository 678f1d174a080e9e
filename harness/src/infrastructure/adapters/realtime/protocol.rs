// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Realtime Wire Protocol
//!
//! Builds the outbound JSON frames and classifies inbound frames for the
//! Azure OpenAI realtime protocol (spec.md §4.G.3-4). Kept free of any
//! socket I/O so it can be unit tested without a connection.

use serde_json::{json, Value as Json};

use super::session_params::SessionParams;

pub fn session_update_frame(params: &SessionParams) -> Json {
    let mut session = json!({
        "modalities": params.modalities,
        "voice": params.voice,
        "input_audio_format": "pcm16",
        "output_audio_format": "pcm16",
        "turn_detection": params.turn_detection,
        "tools": [],
        "tool_choice": "auto",
    });
    if let Some(instructions) = &params.instructions {
        session["instructions"] = json!(instructions);
    }
    json!({"type": "session.update", "session": session})
}

pub fn audio_append_frame(audio_base64: &str) -> Json {
    json!({"type": "input_audio_buffer.append", "audio": audio_base64})
}

pub fn audio_commit_frame() -> Json {
    json!({"type": "input_audio_buffer.commit"})
}

pub fn response_create_frame() -> Json {
    json!({"type": "response.create"})
}

/// Classification of one inbound JSON text frame, per the receive-loop
/// rules in spec.md §4.G.6.
pub enum InboundFrame {
    /// A text delta to append to the aggregated response.
    TextDelta { delta: String, message: Json },
    /// The terminal frame: close the socket after recording it.
    ResponseDone { message: Json },
    /// `{"type": "error", ...}`.
    Error { message: Json },
    /// Anything else — recorded as ignored, not surfaced to the caller.
    Ignored,
}

pub fn classify(frame: &Json) -> InboundFrame {
    let kind = frame.get("type").and_then(Json::as_str).unwrap_or("");
    match kind {
        "error" => InboundFrame::Error { message: frame.clone() },
        "response.text.delta" | "response.output_text.delta" => InboundFrame::TextDelta {
            delta: frame.get("delta").and_then(Json::as_str).unwrap_or("").to_string(),
            message: frame.clone(),
        },
        "response.done" => InboundFrame::ResponseDone { message: frame.clone() },
        _ => InboundFrame::Ignored,
    }
}
