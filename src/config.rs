// src/config.rs
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use crate::drivers::{ControllerOptions, DashboardError, SimulatorSettings};
use crate::types::ConnectionMode;

/// Live dashboard for a WebSocket heart-rate / SpO2 monitor.
#[derive(Parser, Debug, Default)]
#[command(version, about)]
pub struct Cli {
    /// JSON configuration file; command-line flags win over its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Monitor host name or IP (connects to ws://<host>/ws)
    #[arg(long)]
    pub host: Option<String>,
    /// Full WebSocket URL, overrides --host
    #[arg(long)]
    pub url: Option<String>,
    /// Samples kept per chart
    #[arg(short = 'n', long)]
    pub capacity: Option<usize>,
    /// Use the built-in simulated monitor instead of a real device
    #[arg(long)]
    pub simulate: bool,
    /// Simulated monitor sends sample batches (heartRateDataArray)
    #[arg(long)]
    pub batched: bool,
    /// Do not track the SpO2 waveform chart
    #[arg(long)]
    pub no_spo2_wave: bool,
    /// Run without a window, writing chart PNGs instead
    #[arg(long)]
    pub headless: bool,
    /// Directory for headless chart snapshots
    #[arg(long)]
    pub snapshot_dir: Option<PathBuf>,
    /// Start recording immediately under this label
    #[arg(long)]
    pub record: Option<String>,
    /// Stop after this many messages (headless only)
    #[arg(long)]
    pub max_messages: Option<u64>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SimulatorConfig {
    pub sample_rate_hz: f64,
    pub interval_ms: u64,
    pub fft_size: usize,
    pub batched: bool,
    pub seed: u64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        let settings = SimulatorSettings::default();
        Self {
            sample_rate_hz: settings.sample_rate_hz,
            interval_ms: settings.interval.as_millis() as u64,
            fft_size: settings.fft_size,
            batched: settings.batched,
            seed: settings.seed,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    pub mode: ConnectionMode,
    pub host: String,
    pub url: Option<String>,
    pub capacity: usize,
    pub track_spo2_waveform: bool,
    pub headless: bool,
    pub snapshot_dir: PathBuf,
    pub record_dir: PathBuf,
    pub record_label: Option<String>,
    pub max_messages: Option<u64>,
    pub simulator: SimulatorConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            mode: ConnectionMode::Device,
            // ESP32 soft-AP address
            host: "192.168.4.1".to_owned(),
            url: None,
            capacity: 32,
            track_spo2_waveform: true,
            headless: false,
            snapshot_dir: PathBuf::from("snapshots"),
            record_dir: PathBuf::from("."),
            record_label: None,
            max_messages: None,
            simulator: SimulatorConfig::default(),
        }
    }
}

impl DashboardConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    /// File (if any) first, then command-line overrides, then validation.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(host) = &cli.host {
            self.host = host.clone();
        }
        if cli.url.is_some() {
            self.url = cli.url.clone();
        }
        if let Some(capacity) = cli.capacity {
            self.capacity = capacity;
        }
        if cli.simulate {
            self.mode = ConnectionMode::Simulation;
        }
        if cli.batched {
            self.simulator.batched = true;
        }
        if cli.no_spo2_wave {
            self.track_spo2_waveform = false;
        }
        if cli.headless {
            self.headless = true;
        }
        if let Some(dir) = &cli.snapshot_dir {
            self.snapshot_dir = dir.clone();
        }
        if cli.record.is_some() {
            self.record_label = cli.record.clone();
        }
        if cli.max_messages.is_some() {
            self.max_messages = cli.max_messages;
        }
    }

    pub fn validate(&self) -> Result<(), DashboardError> {
        if self.capacity == 0 {
            return Err(DashboardError::InvalidCapacity);
        }
        if self.simulator.sample_rate_hz <= 0.0 {
            return Err(DashboardError::InvalidConfig(
                "simulator.sample_rate_hz must be greater than zero".into(),
            ));
        }
        if self.simulator.fft_size < 2 {
            return Err(DashboardError::InvalidConfig(
                "simulator.fft_size must be at least 2".into(),
            ));
        }
        if self.mode == ConnectionMode::Device && self.url.is_none() && self.host.trim().is_empty() {
            return Err(DashboardError::InvalidConfig("no device host or url".into()));
        }
        Ok(())
    }

    pub fn device_url(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => format!("ws://{}/ws", self.host.trim()),
        }
    }

    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            capacity: self.capacity,
            track_spo2_waveform: self.track_spo2_waveform,
        }
    }

    pub fn simulator_settings(&self) -> SimulatorSettings {
        SimulatorSettings {
            sample_rate_hz: self.simulator.sample_rate_hz,
            interval: Duration::from_millis(self.simulator.interval_ms),
            fft_size: self.simulator.fft_size,
            batched: self.simulator.batched,
            seed: self.simulator.seed,
        }
    }
}
