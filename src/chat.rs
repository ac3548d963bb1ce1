// ABOUTME: Chat panel: turn delivery state machine with staged segment reveal
// ABOUTME: Splits model replies into segments and reveals them with timed typing pauses
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutria Wellness

//! # Chat Turn Delivery
//!
//! One conversational session with the assistant. A send appends the user
//! turn, enters `Sending` while the gateway call is in flight, then delivers
//! the reply in segments: segment 0 immediately, each later segment after a
//! typing pause. Events stream over a channel so a front-end can render them.
//!
//! A new send while a delivery is still in flight cancels the pending reveal
//! sequence before starting its own, so segments of two replies never
//! interleave.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::warn;

use crate::errors::{AppError, AppResult};
use crate::llm::Gateway;
use crate::models::ChatTurn;
use crate::store::ProfileHandle;

/// Fallback turn appended when the gateway call fails
pub const DELIVERY_FALLBACK: &str =
    "Ops… hubo un problema para generar mi respuesta. Intenta de nuevo en unos segundos.";

/// Default pause before each segment after the first
pub const DEFAULT_SEGMENT_DELAY: Duration = Duration::from_secs(3);

/// A single-paragraph reply longer than this is split on sentence boundaries
const SENTENCE_SPLIT_THRESHOLD: usize = 280;

/// Events emitted while a reply is delivered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// A turn became visible (user or model)
    TurnAppended(ChatTurn),
    /// The typing indicator turned on
    TypingStarted,
    /// The typing indicator turned off
    TypingStopped,
    /// All segments of the current reply are delivered
    DeliveryDone,
}

/// One chat session bound to the shared profile
pub struct ChatSession {
    gateway: Gateway,
    profile: ProfileHandle,
    turns: Arc<Mutex<Vec<ChatTurn>>>,
    events: mpsc::UnboundedSender<ChatEvent>,
    delivery: Option<JoinHandle<()>>,
    segment_delay: Duration,
}

impl ChatSession {
    /// Open a session, seeding the greeting turn
    ///
    /// Returns the session and the receiving end of its event stream.
    pub async fn open(
        gateway: Gateway,
        profile: ProfileHandle,
    ) -> (Self, mpsc::UnboundedReceiver<ChatEvent>) {
        Self::open_with_delay(gateway, profile, DEFAULT_SEGMENT_DELAY).await
    }

    /// Open a session with a custom segment delay (tests use a short one)
    pub async fn open_with_delay(
        gateway: Gateway,
        profile: ProfileHandle,
        segment_delay: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<ChatEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();

        let name = profile.snapshot().await.name;
        let greeting = ChatTurn::model(format!(
            "¡Hola {name}! Soy Nutria. ¿En qué puedo ayudarte con tu bienestar hoy?"
        ));
        let _ = events.send(ChatEvent::TurnAppended(greeting.clone()));

        let session = Self {
            gateway,
            profile,
            turns: Arc::new(Mutex::new(vec![greeting])),
            events,
            delivery: None,
            segment_delay,
        };
        (session, receiver)
    }

    /// Submit a user message
    ///
    /// Cancels any delivery still in flight, appends the user turn and spawns
    /// the reply delivery.
    ///
    /// # Errors
    ///
    /// Returns an error for empty or whitespace-only input.
    pub async fn send(&mut self, text: &str) -> AppResult<()> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::invalid_input("message text is empty"));
        }

        // a new send cleanly cancels a pending reveal sequence
        if let Some(delivery) = self.delivery.take() {
            if !delivery.is_finished() {
                delivery.abort();
                let _ = self.events.send(ChatEvent::TypingStopped);
            }
        }

        let user_turn = ChatTurn::user(text);
        self.turns.lock().await.push(user_turn.clone());
        let _ = self.events.send(ChatEvent::TurnAppended(user_turn));
        let _ = self.events.send(ChatEvent::TypingStarted);

        let gateway = self.gateway.clone();
        let profile = self.profile.snapshot().await;
        let turns = Arc::clone(&self.turns);
        let events = self.events.clone();
        let delay = self.segment_delay;
        let text = text.to_owned();

        self.delivery = Some(tokio::spawn(async move {
            match gateway.try_chat_reply(&text, &profile).await {
                Ok(reply) => {
                    let _ = events.send(ChatEvent::TypingStopped);
                    let segments = split_reply(&reply);
                    for (index, segment) in segments.into_iter().enumerate() {
                        if index > 0 {
                            let _ = events.send(ChatEvent::TypingStarted);
                            tokio::time::sleep(delay).await;
                            let _ = events.send(ChatEvent::TypingStopped);
                        }
                        let turn = ChatTurn::model(segment);
                        turns.lock().await.push(turn.clone());
                        let _ = events.send(ChatEvent::TurnAppended(turn));
                    }
                }
                Err(err) => {
                    warn!(error = %err, "chat reply failed, appending fallback turn");
                    let _ = events.send(ChatEvent::TypingStopped);
                    let turn = ChatTurn::model(DELIVERY_FALLBACK);
                    turns.lock().await.push(turn.clone());
                    let _ = events.send(ChatEvent::TurnAppended(turn));
                }
            }
            let _ = events.send(ChatEvent::DeliveryDone);
        }));

        Ok(())
    }

    /// Whether a reply is still being delivered
    #[must_use]
    pub fn is_delivering(&self) -> bool {
        self.delivery
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Wait until the current delivery, if any, completes
    pub async fn wait_idle(&mut self) {
        if let Some(delivery) = self.delivery.take() {
            // a JoinError here means the delivery was cancelled, which is fine
            let _ = delivery.await;
        }
    }

    /// All turns visible so far, in order
    pub async fn turns(&self) -> Vec<ChatTurn> {
        self.turns.lock().await.clone()
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        if let Some(delivery) = self.delivery.take() {
            delivery.abort();
        }
    }
}

/// Split a reply into delivery segments
///
/// Blank lines are the primary boundary. A single paragraph longer than the
/// threshold is split on sentence ends instead; a short single sentence
/// yields exactly one segment.
#[must_use]
pub fn split_reply(text: &str) -> Vec<String> {
    let paragraphs: Vec<String> = text
        .split("\n\n")
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_owned)
        .collect();

    if paragraphs.len() == 1 && paragraphs[0].len() > SENTENCE_SPLIT_THRESHOLD {
        return split_sentences(&paragraphs[0]);
    }
    paragraphs
}

/// Split on sentence-ending punctuation followed by whitespace and an
/// uppercase or inverted-punctuation opener
fn split_sentences(paragraph: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut start = 0;
    let chars: Vec<(usize, char)> = paragraph.char_indices().collect();

    for window in 0..chars.len() {
        let (_, ch) = chars[window];
        if !matches!(ch, '.' | '!' | '?') {
            continue;
        }
        // find the next non-whitespace character
        let mut next = window + 1;
        while next < chars.len() && chars[next].1.is_whitespace() {
            next += 1;
        }
        if next == window + 1 || next >= chars.len() {
            continue; // no whitespace gap, or end of text
        }
        let opener = chars[next].1;
        if opener.is_uppercase() || matches!(opener, '¡' | '¿') {
            let end = chars[window].0 + ch.len_utf8();
            let segment = paragraph[start..end].trim();
            if !segment.is_empty() {
                segments.push(segment.to_owned());
            }
            start = chars[next].0;
        }
    }

    let tail = paragraph[start..].trim();
    if !tail.is_empty() {
        segments.push(tail.to_owned());
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_paragraphs_yield_two_segments_in_order() {
        let segments = split_reply("Primero bebe agua.\n\nDespués toma el psyllium.");
        assert_eq!(
            segments,
            vec!["Primero bebe agua.", "Después toma el psyllium."]
        );
    }

    #[test]
    fn test_short_sentence_yields_one_segment() {
        assert_eq!(split_reply("¡Claro que sí!"), vec!["¡Claro que sí!"]);
    }

    #[test]
    fn test_blank_lines_with_whitespace_are_boundaries() {
        let segments = split_reply("uno\n\n   \n\ndos");
        assert_eq!(segments, vec!["uno", "dos"]);
    }

    #[test]
    fn test_long_single_paragraph_splits_on_sentences() {
        let sentence = "El psyllium es una fibra soluble que ayuda mucho a la digestión y la saciedad durante todo el programa de bienestar.";
        let long = format!("{sentence} ¿Quieres saber más sobre cómo tomarlo cada mañana? Puedo darte ideas sencillas para integrarlo en tu rutina diaria de cada mañana sin ninguna complicación extra y con ingredientes que seguramente ya tienes en casa.");
        assert!(long.len() > SENTENCE_SPLIT_THRESHOLD);

        let segments = split_reply(&long);
        assert_eq!(segments.len(), 3);
        assert!(segments[0].ends_with("programa de bienestar."));
        assert!(segments[1].starts_with("¿Quieres"));
    }

    #[test]
    fn test_short_single_paragraph_is_not_sentence_split() {
        let text = "Primera frase. Segunda frase corta.";
        assert_eq!(split_reply(text), vec![text.to_owned()]);
    }

    #[test]
    fn test_decimal_numbers_do_not_break_sentences() {
        let filler = "a".repeat(SENTENCE_SPLIT_THRESHOLD);
        let text = format!("Toma 1.5 cucharadas cada día {filler}. Hazlo en ayunas.");
        let segments = split_reply(&text);
        assert_eq!(segments.len(), 2);
        assert!(segments[0].contains("1.5 cucharadas"));
    }
}
