mod common;
mod config;
mod network;
mod ui;

use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;
use eframe::egui;
use network::{BackendClient, HttpAyurApi};
use tokio::sync::mpsc;
use ui::AyurTraceApp;

use crate::common::UserRole;
use crate::config::AppConfig;

#[derive(Parser)]
#[command(
    name = "ayurtrace_desk",
    version,
    about = "Desktop client for the AyurTrace herb traceability service"
)]
struct Cli {
    /// Path to JSON config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: String,
    /// Base URL of the AyurTrace backend
    #[arg(long, env = "AYURTRACE_BACKEND_URL", value_name = "URL")]
    backend_url: Option<String>,
    /// Customer, Producer or Processor
    #[arg(long, value_name = "ROLE")]
    role: Option<String>,
    /// Signed-in user's email; the part before `@` is used in greetings
    #[arg(long, value_name = "EMAIL")]
    email: Option<String>,
    /// Use the dark theme
    #[arg(long)]
    dark: bool,
    /// Write the effective configuration back to the config file
    #[arg(long)]
    write_config: bool,
}

impl Cli {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(url) = &self.backend_url {
            config.backend_base_url = url.clone();
        }
        if let Some(role) = &self.role {
            config.role = UserRole::from_label(role);
        }
        if let Some(email) = &self.email {
            config.email = Some(email.clone());
        }
        if self.dark {
            config.dark_mode = true;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), eframe::Error> {
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let mut app_config = config::load_config(&cli.config);
    cli.apply(&mut app_config);

    if cli.write_config {
        match config::save_config(&cli.config, &app_config) {
            Ok(()) => log::info!("Wrote config to {}", cli.config),
            Err(err) => log::error!("Failed to write config {}: {err}", cli.config),
        }
    }

    // UI -> worker
    let (cmd_tx, cmd_rx) = mpsc::channel(100);
    // worker -> UI
    let (event_tx, event_rx) = mpsc::channel(100);

    match HttpAyurApi::new(&app_config.backend_base_url) {
        Ok(api) => {
            log::info!("Using backend {} as {}", api.base_url(), app_config.role);
            tokio::spawn(BackendClient::new(Arc::new(api), event_tx, cmd_rx).run());
        }
        Err(err) => {
            // Closing the command channel makes every request fail in the UI.
            log::error!("Backend client unavailable: {err}");
            drop(cmd_rx);
        }
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("AyurTrace")
            .with_inner_size([1100.0, 760.0]),
        ..Default::default()
    };
    let mut event_rx = Some(event_rx);

    eframe::run_native(
        "AyurTrace",
        options,
        Box::new(move |cc| {
            let event_receiver = event_rx
                .take()
                .ok_or("AyurTraceApp should only be initialized once")?;
            Ok(Box::new(AyurTraceApp::new(
                cc,
                &app_config,
                cmd_tx.clone(),
                event_receiver,
            )))
        }),
    )?;

    Ok(())
}
