use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use anyhow::{Context, Result};
use log::{info, warn};
use crate::drivers::IngestReport;

/// CSV log of accepted messages, one row per heart-rate sample.
pub struct SessionRecorder {
    dir: PathBuf,
    writer: Option<BufWriter<File>>,
    path: Option<PathBuf>,
    rows: u64,
}

impl SessionRecorder {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            writer: None,
            path: None,
            rows: 0,
        }
    }

    pub fn start(&mut self, label: &str) -> Result<PathBuf> {
        self.stop();
        // label + unix time keeps sessions apart
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let label: String = label
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        let path = self.dir.join(format!("session_{label}_{timestamp}.csv"));
        let file = File::create(&path)
            .with_context(|| format!("cannot create recording {}", path.display()))?;
        let mut w = BufWriter::new(file);
        writeln!(w, "timestamp_s,bpm,spo2,heart_rate,spo2_wave")?;
        self.writer = Some(w);
        self.path = Some(path.clone());
        self.rows = 0;
        info!("recording started: {}", path.display());
        Ok(path)
    }

    pub fn stop(&mut self) {
        if let Some(mut w) = self.writer.take() {
            if let Err(err) = w.flush() {
                warn!("failed to flush recording: {err}");
            }
            if let Some(path) = self.path.take() {
                info!("recording saved: {} ({} rows)", path.display(), self.rows);
            }
        }
    }

    pub fn write_report(&mut self, report: &IngestReport) {
        if self.writer.is_none() {
            return;
        }
        let samples = &report.message.heart_rate;
        // Only the newest samples have a stamp when a batch exceeds capacity.
        let skip = samples.len() - report.timestamps.len().min(samples.len());
        let spo2 = report.message.spo2_wave.as_deref().unwrap_or(&[]);
        let mut block = String::new();
        let mut rows = 0;
        for (i, (t, hr)) in report
            .timestamps
            .iter()
            .zip(samples.iter().skip(skip))
            .enumerate()
        {
            let wave = spo2
                .get(skip + i)
                .map(|v| v.to_string())
                .unwrap_or_default();
            block.push_str(&format!(
                "{:.3},{},{},{},{}\n",
                t, report.message.beats_per_minute, report.message.spo2_percentage, hr, wave
            ));
            rows += 1;
        }
        let written = match &mut self.writer {
            Some(w) => w.write_all(block.as_bytes()),
            None => return,
        };
        match written {
            Ok(()) => self.rows += rows,
            Err(err) => {
                warn!("recording write failed, stopping: {err}");
                self.stop();
            }
        }
    }

    pub fn is_recording(&self) -> bool {
        self.writer.is_some()
    }

    pub fn rows(&self) -> u64 {
        self.rows
    }
}

impl Drop for SessionRecorder {
    fn drop(&mut self) {
        self.stop();
    }
}
