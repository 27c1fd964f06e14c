// src/gui.rs
use std::sync::mpsc::{channel, sync_channel, Receiver, Sender};
use std::time::Duration;
use eframe::egui;
use egui::{Color32, RichText};
use egui_plot::{Bar, BarChart, Line, Plot, PlotPoints};
use crate::config::DashboardConfig;
use crate::drivers::spectrum::label_frequency;
use crate::drivers::{ChartKind, TextSlot};
use crate::engine;
use crate::types::*;

const CARDIOGRAM_COLOR: Color32 = Color32::from_rgb(0, 123, 255);
const SPO2_COLOR: Color32 = Color32::from_rgb(255, 0, 0);
const FREQS_COLOR: Color32 = Color32::from_rgb(0, 255, 0);

pub struct PulseWaveApp {
    // session state
    is_connected: bool,
    is_recording: bool,
    connection_label: String,
    track_spo2_waveform: bool,

    // readouts
    bpm: String,
    spo2: String,

    // latest chart data
    cardiogram: Vec<[f64; 2]>,
    spo2_wave: Vec<[f64; 2]>,
    frequencies: Vec<[f64; 2]>,
    peaks: Vec<(f64, f64)>,

    record_label: String,
    log_messages: Vec<String>,

    // worker channels
    rx: Receiver<DashboardMessage>,
    tx_cmd: Sender<GuiCommand>,
}

impl PulseWaveApp {
    pub fn new(config: DashboardConfig) -> Self {
        let (tx, rx) = sync_channel(engine::UI_QUEUE);
        let (tx_cmd, rx_cmd) = channel();
        let connection_label = match config.mode {
            ConnectionMode::Simulation => "simulated monitor".to_owned(),
            ConnectionMode::Device => config.device_url(),
        };
        let track_spo2_waveform = config.track_spo2_waveform;
        let record_label = config
            .record_label
            .clone()
            .unwrap_or_else(|| "session".to_owned());
        engine::spawn_thread(config, tx, rx_cmd);
        Self {
            is_connected: false,
            is_recording: false,
            connection_label,
            track_spo2_waveform,
            bpm: "Calculating BPM...".to_owned(),
            spo2: "Calculating SPO2...".to_owned(),
            cardiogram: Vec::new(),
            spo2_wave: Vec::new(),
            frequencies: Vec::new(),
            peaks: Vec::new(),
            record_label,
            log_messages: vec!["pulsewave ready.".to_owned()],
            rx,
            tx_cmd,
        }
    }

    fn log(&mut self, msg: &str) {
        self.log_messages.push(format!("> {}", msg));
        if self.log_messages.len() > 8 {
            self.log_messages.remove(0);
        }
    }

    fn apply(&mut self, msg: DashboardMessage) {
        match msg {
            DashboardMessage::Log(line) => self.log(&line),
            DashboardMessage::Status(connected) => self.is_connected = connected,
            DashboardMessage::RecordingStatus(on) => self.is_recording = on,
            DashboardMessage::Readout(TextSlot::HeartRate, text) => self.bpm = text,
            DashboardMessage::Readout(TextSlot::Spo2, text) => self.spo2 = text,
            DashboardMessage::Chart(update) => match update.kind {
                ChartKind::Cardiogram => self.cardiogram = update.points,
                ChartKind::Spo2 => self.spo2_wave = update.points,
                ChartKind::Frequencies => {
                    self.frequencies = update.points;
                    self.peaks = update.peaks;
                }
            },
        }
    }

    fn draw_line_chart(ui: &mut egui::Ui, id: &str, title: &str, points: &[[f64; 2]], color: Color32, height: f32) {
        ui.label(RichText::new(title).strong());
        Plot::new(id)
            .height(height)
            .allow_scroll(false)
            .allow_drag(false)
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(PlotPoints::from(points.to_vec()))
                        .color(color)
                        .name(title),
                );
            });
    }

    fn draw_frequency_chart(&self, ui: &mut egui::Ui, height: f32) {
        ui.label(RichText::new("Harmonic amplitude, normalized [Hz]").strong());
        let spacing = match (self.frequencies.first(), self.frequencies.get(1)) {
            (Some(a), Some(b)) => (b[0] - a[0]).abs().max(1e-3),
            _ => 1.0,
        };
        let bars: Vec<Bar> = self
            .frequencies
            .iter()
            .map(|p| Bar::new(p[0], p[1]).width(spacing * 0.8))
            .collect();
        Plot::new("frequencies")
            .height(height)
            .allow_scroll(false)
            .allow_drag(false)
            .include_y(0.0)
            .include_y(1.0)
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(
                    BarChart::new(bars)
                        .color(FREQS_COLOR)
                        .name("Harmonic amplitude"),
                );
            });
    }
}

impl eframe::App for PulseWaveApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        while let Ok(msg) = self.rx.try_recv() {
            self.apply(msg);
        }

        egui::TopBottomPanel::top("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("pulsewave");
                ui.separator();
                let (dot, text) = if self.is_connected {
                    (Color32::GREEN, "connected")
                } else {
                    (Color32::GRAY, "offline")
                };
                ui.colored_label(dot, "●");
                ui.label(format!("{text} - {}", self.connection_label));
                ui.separator();
                ui.add(egui::TextEdit::singleline(&mut self.record_label).desired_width(100.0));
                if self.is_recording {
                    if ui.button("⏹ Stop recording").clicked() {
                        self.tx_cmd.send(GuiCommand::StopRecording).ok();
                    }
                } else if ui.button("⏺ Record").clicked() {
                    self.tx_cmd
                        .send(GuiCommand::StartRecording(self.record_label.clone()))
                        .ok();
                }
                if self.is_connected && ui.button("Disconnect").clicked() {
                    self.tx_cmd.send(GuiCommand::Disconnect).ok();
                }
            });
        });

        egui::TopBottomPanel::bottom("log").show(ctx, |ui| {
            for line in &self.log_messages {
                ui.monospace(line);
            }
        });

        egui::SidePanel::left("readouts").min_width(200.0).show(ctx, |ui| {
            ui.add_space(12.0);
            ui.label("Heart rate");
            ui.label(RichText::new(&self.bpm).size(28.0).color(CARDIOGRAM_COLOR));
            ui.add_space(12.0);
            ui.label("SpO2");
            ui.label(RichText::new(&self.spo2).size(28.0).color(SPO2_COLOR));
            ui.add_space(12.0);
            ui.separator();
            ui.label("Dominant frequencies");
            for (hz, amplitude) in &self.peaks {
                ui.monospace(format!("{:>12}  {amplitude:.2}", label_frequency(*hz)));
            }
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let charts = if self.track_spo2_waveform { 3.0 } else { 2.0 };
            let height = ((ui.available_height() - 30.0 * charts) / charts).max(120.0);
            Self::draw_line_chart(ui, "cardiogram", "Cardiogram", &self.cardiogram, CARDIOGRAM_COLOR, height);
            if self.track_spo2_waveform {
                Self::draw_line_chart(ui, "spo2", "Blood oxygen saturation", &self.spo2_wave, SPO2_COLOR, height);
            }
            self.draw_frequency_chart(ui, height);
        });

        ctx.request_repaint_after(Duration::from_millis(50));
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.tx_cmd.send(GuiCommand::Disconnect).ok();
    }
}
