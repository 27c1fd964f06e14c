// src/engine.rs
use std::sync::mpsc::{Receiver, SyncSender, TryRecvError};
use std::thread::{self, JoinHandle};
use log::{debug, info, warn};
use crate::config::DashboardConfig;
use crate::drivers::{
    ChartFrame, DashboardError, PlotStyle, PngRenderer, Pumped, Renderer, SessionPipeline,
    SimulatedDevice, StreamController, TextSink, TextSlot, Transport, WebSocketTransport,
};
use crate::recorder::SessionRecorder;
use crate::types::*;

/// Worker -> GUI queue depth. Charts and readouts beyond it are dropped.
pub const UI_QUEUE: usize = 256;

/// Forwards redraws to the GUI thread as owned chart data.
/// A full queue means the window is not drawing, so the frame is dropped.
pub struct ChannelRenderer {
    tx: SyncSender<DashboardMessage>,
    dropped: u64,
}

impl ChannelRenderer {
    pub fn new(tx: SyncSender<DashboardMessage>) -> Self {
        Self { tx, dropped: 0 }
    }
}

impl Renderer for ChannelRenderer {
    fn update(&mut self, frame: ChartFrame<'_>) {
        let update = DashboardMessage::Chart(ChartUpdate::from_frame(&frame));
        if self.tx.try_send(update).is_err() {
            self.dropped += 1;
            debug!("GUI queue full, dropped {} chart updates so far", self.dropped);
        }
    }
}

pub struct ChannelTextSink {
    tx: SyncSender<DashboardMessage>,
}

impl ChannelTextSink {
    pub fn new(tx: SyncSender<DashboardMessage>) -> Self {
        Self { tx }
    }
}

impl TextSink for ChannelTextSink {
    fn set_text(&mut self, slot: TextSlot, text: &str) {
        // the next message brings a fresher readout
        self.tx
            .try_send(DashboardMessage::Readout(slot, text.to_owned()))
            .ok();
    }
}

/// Readouts for headless runs go to the log.
#[derive(Default)]
pub struct LogTextSink;

impl TextSink for LogTextSink {
    fn set_text(&mut self, slot: TextSlot, text: &str) {
        info!("{}: {text}", slot.id());
    }
}

/// Starts the worker that owns the transport and the controller.
pub fn spawn_thread(
    config: DashboardConfig,
    tx: SyncSender<DashboardMessage>,
    rx_cmd: Receiver<GuiCommand>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        tx.send(DashboardMessage::Log("Worker ready.".to_owned())).ok();
        if let Err(err) = run_worker(&config, &tx, &rx_cmd) {
            warn!("session ended with error: {err}");
            tx.send(DashboardMessage::Log(format!("Session error: {err}"))).ok();
        }
        tx.send(DashboardMessage::Status(false)).ok();
    })
}

fn run_worker(
    config: &DashboardConfig,
    tx: &SyncSender<DashboardMessage>,
    rx_cmd: &Receiver<GuiCommand>,
) -> Result<(), DashboardError> {
    let controller = StreamController::new(
        config.controller_options(),
        ChannelRenderer::new(tx.clone()),
        ChannelTextSink::new(tx.clone()),
    )?;
    let mut recorder = SessionRecorder::new(&config.record_dir);
    if let Some(label) = &config.record_label {
        start_recording(&mut recorder, label, tx);
    }
    match config.mode {
        ConnectionMode::Simulation => {
            tx.send(DashboardMessage::Log("Simulated monitor connected".to_owned())).ok();
            let device = SimulatedDevice::new(config.simulator_settings());
            drive(SessionPipeline::new(device, controller), &mut recorder, tx, rx_cmd)
        }
        ConnectionMode::Device => {
            let url = config.device_url();
            tx.send(DashboardMessage::Log(format!("Connecting to {url}"))).ok();
            let socket = WebSocketTransport::connect(&url)?;
            tx.send(DashboardMessage::Log(format!("Connected to {}", socket.url()))).ok();
            drive(SessionPipeline::new(socket, controller), &mut recorder, tx, rx_cmd)
        }
    }
}

fn start_recording(recorder: &mut SessionRecorder, label: &str, tx: &SyncSender<DashboardMessage>) {
    match recorder.start(label) {
        Ok(path) => {
            tx.send(DashboardMessage::RecordingStatus(true)).ok();
            tx.send(DashboardMessage::Log(format!("Recording to {}", path.display()))).ok();
        }
        Err(err) => {
            warn!("{err:#}");
            tx.send(DashboardMessage::Log(format!("Recording failed: {err:#}"))).ok();
        }
    }
}

fn drive<S: Transport, R: Renderer, T: TextSink>(
    mut pipeline: SessionPipeline<S, R, T>,
    recorder: &mut SessionRecorder,
    tx: &SyncSender<DashboardMessage>,
    rx_cmd: &Receiver<GuiCommand>,
) -> Result<(), DashboardError> {
    tx.send(DashboardMessage::Status(true)).ok();
    loop {
        // commands are checked between messages
        for _ in 0..10 {
            match rx_cmd.try_recv() {
                Ok(GuiCommand::StartRecording(label)) => start_recording(recorder, &label, tx),
                Ok(GuiCommand::StopRecording) => {
                    if recorder.is_recording() {
                        let rows = recorder.rows();
                        recorder.stop();
                        tx.send(DashboardMessage::Log(format!("Recording stopped ({rows} rows)"))).ok();
                    }
                    tx.send(DashboardMessage::RecordingStatus(false)).ok();
                }
                Ok(GuiCommand::Disconnect) | Err(TryRecvError::Disconnected) => {
                    info!(
                        "disconnecting after {} messages ({} rejected)",
                        pipeline.accepted(),
                        pipeline.rejected()
                    );
                    return Ok(());
                }
                Err(TryRecvError::Empty) => break,
            }
        }
        match pipeline.pump_once()? {
            Some(Pumped::Accepted(report)) => recorder.write_report(&report),
            Some(Pumped::Rejected(err)) => {
                tx.send(DashboardMessage::Log(format!("Dropped message: {err}"))).ok();
            }
            // read timeout: loop back to the commands
            Some(Pumped::Idle) => {}
            None => {
                info!("device stream ended");
                tx.send(DashboardMessage::Log("Device closed the stream".to_owned())).ok();
                return Ok(());
            }
        }
    }
}

/// Runs a session without a window: charts become PNG files, readouts log lines.
pub fn run_headless(config: &DashboardConfig) -> anyhow::Result<()> {
    let renderer = PngRenderer::new(&config.snapshot_dir, PlotStyle::default())?;
    let controller =
        StreamController::new(config.controller_options(), renderer, LogTextSink)?;
    let mut recorder = SessionRecorder::new(&config.record_dir);
    if let Some(label) = &config.record_label {
        recorder.start(label)?;
    }
    info!("writing chart snapshots to {}", config.snapshot_dir.display());
    match config.mode {
        ConnectionMode::Simulation => {
            let device = SimulatedDevice::new(config.simulator_settings());
            pump_headless(SessionPipeline::new(device, controller), &mut recorder, config.max_messages)?;
        }
        ConnectionMode::Device => {
            let socket = WebSocketTransport::connect(&config.device_url())?;
            pump_headless(SessionPipeline::new(socket, controller), &mut recorder, config.max_messages)?;
        }
    }
    Ok(())
}

fn pump_headless<S: Transport, T: TextSink>(
    mut pipeline: SessionPipeline<S, PngRenderer, T>,
    recorder: &mut SessionRecorder,
    max_messages: Option<u64>,
) -> Result<(), DashboardError> {
    let mut seen = 0u64;
    let mut spectrum_updates = 0u64;
    let mut last_timestamp = 0.0;
    while max_messages.map_or(true, |max| seen < max) {
        match pipeline.pump_once()? {
            Some(Pumped::Accepted(report)) => {
                recorder.write_report(&report);
                if report.frequencies_redrawn {
                    spectrum_updates += 1;
                }
                last_timestamp = report.timestamp;
            }
            Some(Pumped::Rejected(_)) => {}
            Some(Pumped::Idle) => continue,
            None => break,
        }
        seen += 1;
    }
    let controller = pipeline.controller();
    info!(
        "headless session done: {} accepted, {} rejected over {last_timestamp:.3}s, \
         {spectrum_updates} spectrum updates, {} snapshots written",
        pipeline.accepted(),
        pipeline.rejected(),
        controller.renderer().written()
    );
    info!(
        "last readouts: {} / {}",
        controller.bpm_readout().unwrap_or("-"),
        controller.spo2_readout().unwrap_or("-")
    );
    Ok(())
}
