// ABOUTME: Integration tests for chat reply delivery
// ABOUTME: Staged segment reveal, cancellation on resend and the failure fallback turn

// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutria Wellness

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedReceiver;

use nutria::chat::{ChatEvent, ChatSession, DELIVERY_FALLBACK};
use nutria::errors::{AppError, AppResult};
use nutria::llm::{CompletionProvider, CompletionRequest, Gateway, Prompt};
use nutria::models::{Role, Sex, UserProfile};
use nutria::store::{LocalStore, ProfileHandle, ProfileStore};

struct ScriptedProvider {
    replies: Vec<&'static str>,
    delay: Duration,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    fn new(replies: Vec<&'static str>) -> Arc<Self> {
        Self::with_delay(replies, Duration::ZERO)
    }

    fn with_delay(replies: Vec<&'static str>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            replies,
            delay,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn complete(&self, _request: &CompletionRequest) -> AppResult<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call == 0 && !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.replies
            .get(call.min(self.replies.len() - 1))
            .map(|reply| (*reply).to_owned())
            .ok_or_else(|| AppError::internal("no scripted reply"))
    }
}

struct FailingProvider;

#[async_trait]
impl CompletionProvider for FailingProvider {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn complete(&self, _request: &CompletionRequest) -> AppResult<String> {
        Err(AppError::external_service("gemini", "offline"))
    }
}

async fn open_session(
    dir: &tempfile::TempDir,
    provider: Arc<dyn CompletionProvider>,
) -> (ChatSession, UnboundedReceiver<ChatEvent>) {
    let store = ProfileStore::new(LocalStore::new(dir.path()), None);
    let profile = UserProfile::new("Ana", 42, 170.0, 80.0, Some(70.0), Sex::Female);
    store.create(&profile).await.unwrap();
    let handle = ProfileHandle::new(profile, store);

    ChatSession::open_with_delay(Gateway::new(provider), handle, Duration::from_secs(3)).await
}

async fn events_until_done(events: &mut UnboundedReceiver<ChatEvent>) -> Vec<ChatEvent> {
    let mut collected = Vec::new();
    while let Some(event) = events.recv().await {
        let done = event == ChatEvent::DeliveryDone;
        collected.push(event);
        if done {
            break;
        }
    }
    collected
}

fn model_texts(events: &[ChatEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            ChatEvent::TurnAppended(turn) if turn.role == Role::Model => {
                Some(turn.text.clone())
            }
            _ => None,
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_two_paragraph_reply_arrives_as_two_turns_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let provider = ScriptedProvider::new(vec!["Primero bebe agua.\n\nLuego toma el psyllium."]);
    let (mut session, mut events) = open_session(&dir, provider).await;

    // greeting
    assert!(matches!(
        events.recv().await.unwrap(),
        ChatEvent::TurnAppended(turn) if turn.text.starts_with("¡Hola Ana!")
    ));

    session.send("¿qué hago primero?").await.unwrap();
    let collected = events_until_done(&mut events).await;

    assert_eq!(
        model_texts(&collected),
        vec!["Primero bebe agua.", "Luego toma el psyllium."]
    );

    // typing indicator wraps the delayed second segment
    let typing_starts = collected
        .iter()
        .filter(|event| **event == ChatEvent::TypingStarted)
        .count();
    assert_eq!(typing_starts, 2);

    session.wait_idle().await;
    let turns = session.turns().await;
    assert_eq!(turns.len(), 4); // greeting, user, two model segments
}

#[tokio::test(start_paused = true)]
async fn test_later_segments_wait_for_the_typing_delay() {
    let dir = tempfile::tempdir().unwrap();
    let provider = ScriptedProvider::new(vec!["uno\n\ndos\n\ntres"]);
    let (mut session, _events) = open_session(&dir, provider).await;

    let before = tokio::time::Instant::now();
    session.send("hola").await.unwrap();
    session.wait_idle().await;

    // two delayed segments after the immediate first one
    assert_eq!(before.elapsed(), Duration::from_secs(6));
}

#[tokio::test(start_paused = true)]
async fn test_new_send_cancels_the_pending_delivery() {
    let dir = tempfile::tempdir().unwrap();
    // the first reply is stuck in flight until long after the test window
    let provider = ScriptedProvider::with_delay(
        vec!["respuesta uno", "respuesta dos"],
        Duration::from_secs(3600),
    );
    let (mut session, _events) = open_session(&dir, provider).await;

    session.send("primera pregunta").await.unwrap();
    // let the delivery task reach the in-flight completion call
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }
    assert!(session.is_delivering());

    session.send("segunda pregunta").await.unwrap();
    session.wait_idle().await;

    let turns = session.turns().await;
    let texts: Vec<&str> = turns.iter().map(|turn| turn.text.as_str()).collect();
    assert!(!texts.contains(&"respuesta uno"));
    assert_eq!(*texts.last().unwrap(), "respuesta dos");

    // both user turns stay in the transcript
    assert!(texts.contains(&"primera pregunta"));
    assert!(texts.contains(&"segunda pregunta"));
}

#[tokio::test(start_paused = true)]
async fn test_failure_appends_the_single_fallback_turn() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, mut events) = open_session(&dir, Arc::new(FailingProvider)).await;
    let _greeting = events.recv().await.unwrap();

    session.send("hola").await.unwrap();
    let collected = events_until_done(&mut events).await;

    assert_eq!(model_texts(&collected), vec![DELIVERY_FALLBACK]);

    session.wait_idle().await;
    assert!(!session.is_delivering());
    assert_eq!(session.turns().await.len(), 3); // greeting, user, fallback
}

#[tokio::test]
async fn test_empty_input_is_rejected_without_a_turn() {
    let dir = tempfile::tempdir().unwrap();
    let provider = ScriptedProvider::new(vec!["nunca"]);
    let (mut session, _events) = open_session(&dir, provider).await;

    assert!(session.send("   ").await.is_err());
    assert_eq!(session.turns().await.len(), 1); // greeting only
}

#[tokio::test]
async fn test_chat_prompts_are_text_only() {
    struct AssertingProvider;

    #[async_trait]
    impl CompletionProvider for AssertingProvider {
        fn name(&self) -> &'static str {
            "asserting"
        }

        async fn complete(&self, request: &CompletionRequest) -> AppResult<String> {
            match &request.prompt {
                Prompt::Text(_) => Ok("ok".to_owned()),
                Prompt::TextWithImage { .. } => {
                    Err(AppError::invalid_input("chat must not attach images"))
                }
            }
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let (mut session, _events) = open_session(&dir, Arc::new(AssertingProvider)).await;

    session.send("hola").await.unwrap();
    session.wait_idle().await;
    assert_eq!(session.turns().await.last().unwrap().text, "ok");
}
