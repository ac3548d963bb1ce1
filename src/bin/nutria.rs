// ABOUTME: Terminal front-end for the Nutria companion
// ABOUTME: Wires onboarding, dashboard, chat and the plate inspector to stdin/stdout

// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutria Wellness

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use nutria::chat::{ChatEvent, ChatSession};
use nutria::config::AppConfig;
use nutria::dashboard::Dashboard;
use nutria::inspector::{FileSource, InspectorState, PlateInspector};
use nutria::llm::{Gateway, GeminiClient};
use nutria::logging;
use nutria::models::{Role, Sex, INTOLERANCE_OPTIONS};
use nutria::onboarding::{Biometrics, OnboardingFlow};
use nutria::store::{HttpRemoteStore, LocalStore, ProfileHandle, ProfileStore, RemoteStore};

type Input = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env().context("configuration")?;
    logging::init(config.log_level);

    let remote: Option<Arc<dyn RemoteStore>> = config
        .remote_base_url
        .as_deref()
        .map(|url| Arc::new(HttpRemoteStore::new(url)) as Arc<dyn RemoteStore>);
    let store = ProfileStore::new(LocalStore::new(&config.data_dir), remote);
    let gateway = Gateway::new(Arc::new(GeminiClient::new(&config.gemini_api_key)));

    let mut input = BufReader::new(tokio::io::stdin()).lines();

    let profile = match store.load().await.context("loading saved profile")? {
        Some(profile) => ProfileHandle::new(profile, store),
        None => run_onboarding(&mut input, store).await?,
    };

    let dashboard = Dashboard::new(gateway.clone(), profile.clone());
    menu_loop(&mut input, gateway, profile, dashboard).await
}

async fn menu_loop(
    input: &mut Input,
    gateway: Gateway,
    profile: ProfileHandle,
    dashboard: Dashboard,
) -> Result<()> {
    loop {
        println!();
        println!("1) Resumen  2) Registrar peso  3) Receta del día  4) Chat  5) Analizar plato  0) Salir");
        match prompt(input, "> ").await?.as_str() {
            "1" => show_summary(&dashboard).await,
            "2" => record_weight(input, &dashboard).await?,
            "3" => show_recipe(input, &dashboard).await?,
            "4" => run_chat(input, gateway.clone(), profile.clone()).await?,
            "5" => inspect_plate(input, gateway.clone(), profile.clone()).await?,
            "0" => return Ok(()),
            other => println!("Opción desconocida: {other}"),
        }
    }
}

async fn run_onboarding(input: &mut Input, store: ProfileStore) -> Result<ProfileHandle> {
    println!("¡Bienvenida a Nutria! Vamos a crear tu perfil.");
    let mut flow = OnboardingFlow::new(store);

    loop {
        let name = prompt(input, "¿Cómo te llamas? ").await?;
        match flow.submit_name(&name) {
            Ok(()) => break,
            Err(err) => println!("{err}"),
        }
    }

    loop {
        let form = Biometrics {
            age: prompt_number(input, "Edad (años): ").await?,
            height_cm: prompt_number(input, "Altura (cm): ").await?,
            weight_kg: prompt_number(input, "Peso actual (kg): ").await?,
            target_weight_kg: prompt_number(input, "Peso meta (kg): ").await?,
            sex: prompt_sex(input).await?,
        };

        println!("Analizando tus datos...");
        match flow.submit_biometrics(form).await {
            Ok(assessment) => {
                println!(
                    "Día {} · Fase {} · IMC {} ({}) · {} kg hasta tu meta",
                    assessment.day,
                    assessment.phase,
                    assessment.bmi_display(),
                    assessment.category.label(),
                    assessment.weight_to_goal,
                );
                break;
            }
            Err(err) => println!("{err}"),
        }
    }

    flow.complete().await.context("saving the new profile")
}

async fn show_summary(dashboard: &Dashboard) {
    let summary = dashboard.summary().await;
    println!(
        "Hola {name} · Día {day} · Fase {phase}: {title} ({range})",
        name = summary.name,
        day = summary.assessment.day,
        phase = summary.phase.id,
        title = summary.phase.title,
        range = summary.phase.day_range,
    );
    println!(
        "Peso {weight} kg · IMC {bmi} ({category}) · {gap} kg hasta tu meta",
        weight = summary.assessment.current_weight,
        bmi = summary.assessment.bmi_display(),
        category = summary.assessment.category.label(),
        gap = summary.assessment.weight_to_goal,
    );
    println!("{}", summary.phase.description);
    for ingredient in summary.phase.ingredients {
        println!("  · {ingredient}");
    }
    println!("{}", summary.phase.instructions);

    if summary.chart.len() > 1 {
        let series: Vec<String> = summary
            .chart
            .iter()
            .map(|entry| format!("{:.1}", entry.weight))
            .collect();
        println!("Historial: {} kg", series.join(" → "));
    }
}

async fn record_weight(input: &mut Input, dashboard: &Dashboard) -> Result<()> {
    let weight: f64 = prompt_number(input, "Peso de hoy (kg): ").await?;
    match dashboard.record_weight(weight).await {
        Ok(entry) => println!("Registrado: {} kg", entry.weight),
        Err(err) => println!("{err}"),
    }
    Ok(())
}

async fn show_recipe(input: &mut Input, dashboard: &Dashboard) -> Result<()> {
    if dashboard.needs_intolerance_quiz().await {
        run_intolerance_quiz(input, dashboard).await?;
    }

    println!("Preparando tu receta...");
    match dashboard.request_recipe().await {
        Ok(recipe) => println!("\n{recipe}"),
        Err(err) => println!("{err}"),
    }
    Ok(())
}

async fn run_intolerance_quiz(input: &mut Input, dashboard: &Dashboard) -> Result<()> {
    println!("Antes de tu primera receta, cuéntanos sobre tus intolerancias.");
    for (i, option) in INTOLERANCE_OPTIONS.iter().enumerate() {
        println!("  {}) {option}", i + 1);
    }
    let raw = prompt(input, "Números separados por coma (vacío si ninguna): ").await?;

    let selections: Vec<String> = raw
        .split(',')
        .filter_map(|token| token.trim().parse::<usize>().ok())
        .filter_map(|n| INTOLERANCE_OPTIONS.get(n.wrapping_sub(1)))
        .map(|option| (*option).to_owned())
        .collect();

    let other = prompt(input, "¿Otra restricción? (vacío si ninguna): ").await?;
    let other = if other.trim().is_empty() {
        None
    } else {
        Some(other)
    };

    dashboard
        .save_intolerances(selections, other)
        .await
        .context("saving quiz results")
}

async fn run_chat(input: &mut Input, gateway: Gateway, profile: ProfileHandle) -> Result<()> {
    println!("Chat con Nutria. Escribe /salir para volver al menú.");
    let (mut session, mut events) = ChatSession::open(gateway, profile).await;

    // the greeting is already queued
    drain_events(&mut events);

    loop {
        let line = prompt(input, "tú> ").await?;
        if line.trim() == "/salir" {
            return Ok(());
        }
        if let Err(err) = session.send(&line).await {
            println!("{err}");
            continue;
        }

        // render this reply's delivery as it happens
        while let Some(event) = events.recv().await {
            match event {
                ChatEvent::TurnAppended(turn) if turn.role == Role::Model => {
                    println!("nutria> {}", turn.text);
                }
                ChatEvent::TurnAppended(_) => {}
                ChatEvent::TypingStarted => println!("nutria está escribiendo..."),
                ChatEvent::TypingStopped => {}
                ChatEvent::DeliveryDone => break,
            }
        }
    }
}

fn drain_events(events: &mut tokio::sync::mpsc::UnboundedReceiver<ChatEvent>) {
    while let Ok(event) = events.try_recv() {
        if let ChatEvent::TurnAppended(turn) = event {
            println!("nutria> {}", turn.text);
        }
    }
}

async fn inspect_plate(
    input: &mut Input,
    gateway: Gateway,
    profile: ProfileHandle,
) -> Result<()> {
    let mut inspector = PlateInspector::new(gateway, profile);

    let path = prompt(input, "Ruta de la foto (JPEG): ").await?;
    if let Err(err) = inspector.open(Arc::new(FileSource::new(path.trim()))).await {
        println!("{err}");
        return Ok(());
    }
    if let Err(err) = inspector.capture().await {
        println!("{err}");
        return Ok(());
    }

    if *inspector.state() == InspectorState::ImageReady {
        println!("Analizando tu plato...");
        match inspector.analyze().await {
            Ok(report) => println!("\n{report}"),
            Err(err) => println!("{err}"),
        }
    }
    Ok(())
}

async fn prompt(input: &mut Input, label: &str) -> Result<String> {
    use std::io::Write as _;
    print!("{label}");
    std::io::stdout().flush().ok();

    let line = input
        .next_line()
        .await
        .context("reading input")?
        .context("stdin closed")?;
    Ok(line.trim().to_owned())
}

async fn prompt_number<T>(input: &mut Input, label: &str) -> Result<T>
where
    T: std::str::FromStr,
{
    loop {
        let raw = prompt(input, label).await?;
        match raw.parse() {
            Ok(value) => return Ok(value),
            Err(_) => println!("Valor no válido, inténtalo de nuevo."),
        }
    }
}

async fn prompt_sex(input: &mut Input) -> Result<Sex> {
    let raw = prompt(input, "Sexo (1 femenino, 2 masculino, 3 prefiero no decir): ").await?;
    Ok(match raw.as_str() {
        "2" => Sex::Male,
        "3" => Sex::Unspecified,
        _ => Sex::Female,
    })
}
