// ABOUTME: End-to-end flow test: onboarding, restart, weight tracking, quiz and recipe
// ABOUTME: Exercises the persisted profile across the dashboard surface

// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutria Wellness

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use nutria::dashboard::Dashboard;
use nutria::errors::{AppResult, ErrorCode};
use nutria::llm::{CompletionProvider, CompletionRequest, Gateway};
use nutria::models::{Sex, NO_INTOLERANCES};
use nutria::onboarding::{Biometrics, OnboardingFlow};
use nutria::store::{LocalStore, ProfileHandle, ProfileStore};

struct RecipeProvider {
    calls: AtomicUsize,
}

#[async_trait]
impl CompletionProvider for RecipeProvider {
    fn name(&self) -> &'static str {
        "recipe"
    }

    async fn complete(&self, request: &CompletionRequest) -> AppResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // the instruction carries the registered restrictions
        assert!(request.system_instruction.contains("Lactose"));
        Ok("## plano de hoje\n\n**psyllium** com água morna 🌿".to_owned())
    }
}

#[tokio::test]
async fn test_onboarding_then_dashboard_over_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let store = ProfileStore::new(LocalStore::new(dir.path()), None);

    // first run: no saved profile, onboarding is the only way in
    assert!(store.load().await.unwrap().is_none());

    let mut flow = OnboardingFlow::with_delay(store.clone(), Duration::ZERO);
    flow.submit_name("María José").unwrap();
    let assessment = flow
        .submit_biometrics(Biometrics {
            age: 51,
            height_cm: 170.0,
            weight_kg: 80.0,
            target_weight_kg: 70.0,
            sex: Sex::Female,
        })
        .await
        .unwrap();

    assert_eq!(assessment.day, 1);
    assert_eq!(assessment.phase, 1);
    assert_eq!(assessment.bmi_display(), "27.7");
    assert_eq!(assessment.category.label(), "Exceso de Peso");
    assert_eq!(assessment.weight_to_goal, "10.0");

    let first_id = flow.complete().await.unwrap().snapshot().await.id;

    // "restart": load the persisted document fresh from disk
    let reloaded = store.load().await.unwrap().unwrap();
    assert_eq!(reloaded.id, first_id);
    assert_eq!(reloaded.name, "María José");
    assert_eq!(reloaded.weight_history.len(), 1);

    let provider = Arc::new(RecipeProvider {
        calls: AtomicUsize::new(0),
    });
    let handle = ProfileHandle::new(reloaded, store.clone());
    let dashboard = Dashboard::with_min_wait(
        Gateway::new(provider.clone()),
        handle.clone(),
        Duration::ZERO,
    );

    // weight entries append in insertion order and survive on disk
    dashboard.record_weight(79.2).await.unwrap();
    dashboard.record_weight(78.4).await.unwrap();
    let summary = dashboard.summary().await;
    assert!((summary.assessment.current_weight - 78.4).abs() < f64::EPSILON);
    let weights: Vec<f64> = summary.chart.iter().map(|entry| entry.weight).collect();
    assert_eq!(weights, vec![80.0, 79.2, 78.4]);
    assert_eq!(store.load().await.unwrap().unwrap().weight_history.len(), 3);

    // the first recipe is gated on the quiz
    assert!(dashboard.needs_intolerance_quiz().await);
    let err = dashboard.request_recipe().await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceLocked);

    dashboard
        .save_intolerances(vec!["Lactose".to_owned()], Some("mariscos".to_owned()))
        .await
        .unwrap();

    let recipe = dashboard.request_recipe().await.unwrap();
    assert_eq!(recipe, "plano de hoje\n\npsyllium com água morna 🌿");

    // cached within the phase
    dashboard.request_recipe().await.unwrap();
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_quiz_with_no_selection_still_unlocks_recipes() {
    struct PlainProvider;

    #[async_trait]
    impl CompletionProvider for PlainProvider {
        fn name(&self) -> &'static str {
            "plain"
        }

        async fn complete(&self, request: &CompletionRequest) -> AppResult<String> {
            assert!(request
                .system_instruction
                .contains(&format!("INTOLERÂNCIAS REGISTRADAS: {NO_INTOLERANCES}")));
            Ok("receta sin restricciones".to_owned())
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let store = ProfileStore::new(LocalStore::new(dir.path()), None);
    let mut flow = OnboardingFlow::with_delay(store.clone(), Duration::ZERO);
    flow.submit_name("Ana").unwrap();
    flow.submit_biometrics(Biometrics {
        age: 42,
        height_cm: 165.0,
        weight_kg: 72.0,
        target_weight_kg: 65.0,
        sex: Sex::Female,
    })
    .await
    .unwrap();
    let handle = flow.complete().await.unwrap();

    let dashboard = Dashboard::with_min_wait(
        Gateway::new(Arc::new(PlainProvider)),
        handle.clone(),
        Duration::ZERO,
    );

    dashboard.save_intolerances(vec![], None).await.unwrap();
    assert!(!dashboard.needs_intolerance_quiz().await);

    let snapshot = handle.snapshot().await;
    assert_eq!(snapshot.intolerances, Some(vec![NO_INTOLERANCES.to_owned()]));

    let recipe = dashboard.request_recipe().await.unwrap();
    assert_eq!(recipe, "receta sin restricciones");
}
