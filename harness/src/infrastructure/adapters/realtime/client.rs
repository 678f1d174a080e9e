// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Realtime Model Adapter
//!
//! A `ModelAdapter` that streams one turn of audio to an Azure OpenAI
//! realtime endpoint over a WebSocket and aggregates the text deltas it
//! streams back (spec.md §4.G). Grounded on `gotaglio/azure_openai_realtime.py`;
//! the state machine, timeouts, and event-log invariants follow that module
//! line for line, only the transport (`tokio-tungstenite` in place of a
//! Python `websockets` client) differs.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::Engine;
use futures::{SinkExt, StreamExt};
use harness_domain::entities::context::Context;
use harness_domain::error::{HarnessError, HarnessResult};
use harness_domain::events::{EventKind, EventLog};
use harness_domain::repositories::model_registry::{Message, ModelAdapter};
use serde_json::Value as Json;
use tokio_tungstenite::tungstenite::Message as WsMessage;

use super::protocol::{audio_append_frame, audio_commit_frame, classify, response_create_frame, session_update_frame, InboundFrame};
use super::session_params::resolve_session_params;

/// Converts captured audio to PCM16 mono 24kHz before streaming, when the
/// case asks for it (`context.convert_to_pcm16`). The default implementation
/// never transcodes: actual resampling is out of scope (spec.md §4.G.5), but
/// the attempt/redact/fall-back contract around it is fully implemented by
/// the adapter regardless of which `AudioConverter` is plugged in.
pub trait AudioConverter: Send + Sync {
    fn convert_to_pcm16_24k(&self, audio: &[u8]) -> Result<Vec<u8>, String>;
}

pub struct PassthroughAudioConverter;

impl AudioConverter for PassthroughAudioConverter {
    fn convert_to_pcm16_24k(&self, _audio: &[u8]) -> Result<Vec<u8>, String> {
        Err("PCM16 transcoding is not implemented".to_string())
    }
}

#[derive(Debug)]
pub struct RealtimeAdapterConfig {
    pub endpoint: String,
    pub api: String,
    pub deployment: String,
    pub key: String,
    pub timeout_s: u64,
}

impl RealtimeAdapterConfig {
    pub fn from_json(config: &HashMap<String, Json>) -> HarnessResult<Self> {
        let field = |name: &str| -> HarnessResult<String> {
            config
                .get(name)
                .and_then(Json::as_str)
                .map(str::to_string)
                .ok_or_else(|| HarnessError::Misconfigured(format!("realtime adapter missing required field '{name}'")))
        };
        Ok(Self {
            endpoint: field("endpoint")?,
            api: field("api")?,
            deployment: field("deployment")?,
            key: field("key")?,
            timeout_s: config.get("timeout_s").and_then(Json::as_u64).unwrap_or(60),
        })
    }

    fn websocket_url(&self) -> String {
        let trimmed = self.endpoint.trim_end_matches('/');
        let rewritten = trimmed.replacen("https://", "wss://", 1);
        format!("{rewritten}/openai/realtime?api-version={}&deployment={}", self.api, self.deployment)
    }
}

pub struct RealtimeModelAdapter {
    config: RealtimeAdapterConfig,
    converter: Box<dyn AudioConverter>,
}

impl RealtimeModelAdapter {
    pub fn new(config: RealtimeAdapterConfig) -> Self {
        Self {
            config,
            converter: Box::new(PassthroughAudioConverter),
        }
    }

    pub fn with_converter(config: RealtimeAdapterConfig, converter: Box<dyn AudioConverter>) -> Self {
        Self { config, converter }
    }
}

fn audio_source(context: &Context) -> HarnessResult<Vec<u8>> {
    if let Some(b64) = context.audio_bytes_b64() {
        return base64::engine::general_purpose::STANDARD
            .decode(b64)
            .map_err(|err| HarnessError::InvalidInput(format!("audio_bytes is not valid base64: {err}")));
    }
    if let Some(path) = context.audio_file() {
        return std::fs::read(path).map_err(|err| HarnessError::InvalidInput(format!("reading audio_file '{path}': {err}")));
    }
    Err(HarnessError::InvalidInput("no audio_bytes or audio_file set on context".to_string()))
}

#[async_trait]
impl ModelAdapter for RealtimeModelAdapter {
    async fn infer(&self, _messages: &[Message], context: &mut Context) -> HarnessResult<String> {
        let audio = audio_source(context)?;

        let case_context = context.get_extra("realtime").cloned().unwrap_or(Json::Object(Default::default()));
        let model_config = Json::Object(Default::default());
        let params = resolve_session_params(&case_context, &model_config)?;

        let mut events = EventLog::new();
        let timeout = Duration::from_secs(self.config.timeout_s);

        let url = self.config.websocket_url();
        let request = tokio_tungstenite::tungstenite::http::Request::builder()
            .uri(&url)
            .header("api-key", &self.config.key)
            .header("Host", url.as_str())
            .header("Connection", "Upgrade")
            .header("Upgrade", "websocket")
            .header("Sec-WebSocket-Version", "13")
            .header("Sec-WebSocket-Key", tokio_tungstenite::tungstenite::handshake::client::generate_key())
            .body(())
            .map_err(|err| HarnessError::ProtocolError(format!("building realtime request: {err}")))?;

        let (mut socket, _) = tokio::time::timeout(timeout, tokio_tungstenite::connect_async(request))
            .await
            .map_err(|_| HarnessError::ProtocolError("realtime connection timed out".to_string()))?
            .map_err(|err| HarnessError::ProtocolError(format!("realtime connection failed: {err}")))?;
        events.push(EventKind::SessionConnected, None, None, None, None);

        send_json(&mut socket, session_update_frame(&params)).await?;
        events.push(EventKind::SessionUpdate, None, None, None, None);

        let convert = context.get_extra("convert_to_pcm16").and_then(Json::as_bool).unwrap_or(false);
        let outgoing_audio = if convert {
            match self.converter.convert_to_pcm16_24k(&audio) {
                Ok(converted) => {
                    events.push(
                        EventKind::AudioConversionDecision,
                        None,
                        Some(converted.len()),
                        Some("audio.converted.pcm16_24k".to_string()),
                        None,
                    );
                    converted
                }
                Err(err) => {
                    events.push(EventKind::Error, None, None, Some(format!("audio.convert.error: {err}")), None);
                    audio
                }
            }
        } else {
            events.push(EventKind::AudioConversionDecision, None, None, Some("audio.convert.skip".to_string()), None);
            audio
        };

        let audio_started_at = Instant::now();
        let b64 = base64::engine::general_purpose::STANDARD.encode(&outgoing_audio);
        send_json(&mut socket, audio_append_frame(&b64)).await?;
        events.push(
            EventKind::InputAudioBufferAppend,
            Some(0),
            Some(outgoing_audio.len()),
            None,
            None,
        );

        send_json(&mut socket, audio_commit_frame()).await?;
        events.push(EventKind::InputAudioBufferCommit, Some(elapsed_ms(audio_started_at)), None, None, None);

        send_json(&mut socket, response_create_frame()).await?;
        events.push(EventKind::ResponseCreate, Some(elapsed_ms(audio_started_at)), None, None, None);

        let mut aggregated = String::new();
        loop {
            let next = tokio::time::timeout(timeout, socket.next()).await;
            let frame = match next {
                Err(_) => {
                    events.push(
                        EventKind::Error,
                        Some(elapsed_ms(audio_started_at)),
                        None,
                        Some("error.timeout".to_string()),
                        None,
                    );
                    break;
                }
                Ok(None) => break,
                Ok(Some(Err(err))) => {
                    events.push(
                        EventKind::Error,
                        Some(elapsed_ms(audio_started_at)),
                        None,
                        Some(err.to_string()),
                        None,
                    );
                    break;
                }
                Ok(Some(Ok(frame))) => frame,
            };

            match frame {
                WsMessage::Binary(bytes) => {
                    events.push(
                        EventKind::ResponseAudioDelta,
                        Some(elapsed_ms(audio_started_at)),
                        Some(bytes.len()),
                        None,
                        None,
                    );
                }
                WsMessage::Text(text) => {
                    let parsed: Option<Json> = serde_json::from_str(&text).ok();
                    let Some(parsed) = parsed else { continue };
                    match classify(&parsed) {
                        InboundFrame::Error { message } => {
                            events.push(EventKind::Error, Some(elapsed_ms(audio_started_at)), None, None, Some(message));
                        }
                        InboundFrame::TextDelta { delta, message } => {
                            aggregated.push_str(&delta);
                            events.push(
                                EventKind::ResponseTextDelta,
                                Some(elapsed_ms(audio_started_at)),
                                None,
                                None,
                                Some(message),
                            );
                        }
                        InboundFrame::ResponseDone { message } => {
                            events.push(
                                EventKind::ResponseDone,
                                Some(elapsed_ms(audio_started_at)),
                                None,
                                None,
                                Some(message),
                            );
                            if let Err(err) = socket.close(None).await {
                                events.push(
                                    EventKind::Error,
                                    Some(elapsed_ms(audio_started_at)),
                                    None,
                                    Some(format!("ws.close_error: {err}")),
                                    None,
                                );
                            }
                            events.push(EventKind::Closed, Some(elapsed_ms(audio_started_at)), None, None, None);
                            break;
                        }
                        InboundFrame::Ignored => {}
                    }
                }
                WsMessage::Close(_) => break,
                _ => {}
            }
        }

        context.set_extra("realtime_events", events.as_json());
        Ok(aggregated)
    }

    fn metadata(&self) -> HashMap<String, Json> {
        let mut map = HashMap::new();
        map.insert("type".to_string(), Json::String("AZURE_OPEN_AI_REALTIME".to_string()));
        map.insert("endpoint".to_string(), Json::String(self.config.endpoint.clone()));
        map.insert("api".to_string(), Json::String(self.config.api.clone()));
        map.insert("deployment".to_string(), Json::String(self.config.deployment.clone()));
        map
    }
}

fn elapsed_ms(since: Instant) -> u64 {
    since.elapsed().as_millis() as u64
}

async fn send_json(
    socket: &mut tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>,
    frame: Json,
) -> HarnessResult<()> {
    socket
        .send(WsMessage::Text(frame.to_string()))
        .await
        .map_err(|err| HarnessError::ProtocolError(format!("sending realtime frame: {err}")))
}
