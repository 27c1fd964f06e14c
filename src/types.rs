// src/types.rs
use serde::{Deserialize, Serialize};
use crate::drivers::{ChartFrame, ChartKind, TextSlot};

// Where payloads come from
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionMode {
    Simulation,
    #[default]
    Device,
}

// GUI -> worker
#[derive(Clone, Debug)]
pub enum GuiCommand {
    StartRecording(String),
    StopRecording,
    Disconnect,
}

// worker -> GUI
#[derive(Clone, Debug)]
pub enum DashboardMessage {
    Log(String),
    Status(bool),
    Chart(ChartUpdate),
    Readout(TextSlot, String),
    RecordingStatus(bool),
}

/// Owned copy of a chart frame, ready to cross the thread boundary.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartUpdate {
    pub kind: ChartKind,
    pub points: Vec<[f64; 2]>,
    /// Strongest bins, only filled for the frequency chart.
    pub peaks: Vec<(f64, f64)>,
}

impl ChartUpdate {
    pub fn from_frame(frame: &ChartFrame<'_>) -> Self {
        let peaks = match frame {
            ChartFrame::Frequencies(snapshot) => snapshot.dominant_peaks(4),
            _ => Vec::new(),
        };
        Self {
            kind: frame.kind(),
            points: frame.display_points(),
            peaks,
        }
    }
}
