// src/main.rs
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]
mod config;
mod drivers;
mod engine;
mod gui;
mod recorder;
mod types;
use anyhow::anyhow;
use clap::Parser;
use eframe::egui;
use log::info;
use crate::config::{Cli, DashboardConfig};

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = DashboardConfig::from_cli(&cli)?;
    if config.headless {
        return engine::run_headless(&config);
    }
    info!("starting dashboard in {:?} mode", config.mode);
    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([1280.0, 860.0])
        .with_min_inner_size([900.0, 600.0])
        .with_title("pulsewave");
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    eframe::run_native(
        "pulsewave",
        options,
        Box::new(|_cc| Box::new(gui::PulseWaveApp::new(config))),
    )
    .map_err(|err| anyhow!("window closed with error: {err}"))
}
