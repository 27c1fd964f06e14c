use std::collections::VecDeque;
use std::f64::consts::PI;
use std::thread;
use std::time::Duration;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use crate::drivers::fft::{DeviceSpectrum, SpectrumBuilder};
use crate::drivers::message::WireMessage;
use crate::drivers::source::{Incoming, Transport};
use crate::drivers::DashboardError;
#[derive(Clone, Copy, Debug)]
pub struct SimulatorSettings {
    pub sample_rate_hz: f64,
    pub interval: Duration,
    pub fft_size: usize,
    /// Send `heartRateDataArray` batches instead of one `heartRateData` sample.
    pub batched: bool,
    pub seed: u64,
}
impl Default for SimulatorSettings {
    fn default() -> Self {
        Self {
            sample_rate_hz: 50.0,
            interval: Duration::from_millis(700),
            fft_size: 64,
            batched: false,
            seed: 0x5EED,
        }
    }
}
/// Stand-in for the monitor: a synthetic PPG trace plus the readouts and
/// spectrum the firmware would publish. Yields JSON payloads forever.
pub struct SimulatedDevice {
    settings: SimulatorSettings,
    rng: StdRng,
    window: VecDeque<f64>,
    samples_since_fft: usize,
    spectrum_builder: SpectrumBuilder,
    spectrum: DeviceSpectrum,
    bpm: f64,
    spo2: f64,
    sample_index: u64,
    sent: u64,
}
impl SimulatedDevice {
    pub fn new(settings: SimulatorSettings) -> Self {
        let spectrum_builder = SpectrumBuilder::with_size(settings.fft_size);
        Self {
            rng: StdRng::seed_from_u64(settings.seed),
            window: VecDeque::with_capacity(spectrum_builder.fft_size()),
            samples_since_fft: 0,
            spectrum: DeviceSpectrum::default(),
            spectrum_builder,
            bpm: 72.0,
            spo2: 97.0,
            sample_index: 0,
            sent: 0,
            settings,
        }
    }
    fn samples_per_message(&self) -> usize {
        ((self.settings.interval.as_secs_f64() * self.settings.sample_rate_hz).round() as usize).max(1)
    }
    fn next_sample(&mut self) -> f64 {
        let t = self.sample_index as f64 / self.settings.sample_rate_hz;
        self.sample_index += 1;
        let beat = 2.0 * PI * (self.bpm / 60.0) * t;
        // Systolic peak plus a dicrotic harmonic on top of the IR baseline.
        let pulse = 900.0 * beat.sin() + 250.0 * (2.0 * beat + 0.8).sin();
        50_000.0 + pulse + self.rng.gen_range(-40.0..40.0)
    }
    pub fn next_wire_message(&mut self) -> WireMessage {
        self.bpm = (self.bpm + self.rng.gen_range(-1.0..1.0)).clamp(55.0, 110.0);
        self.spo2 = (self.spo2 + self.rng.gen_range(-0.4..0.4)).clamp(92.0, 100.0);
        let count = self.samples_per_message();
        let fft_size = self.spectrum_builder.fft_size();
        let mut fresh = Vec::with_capacity(count);
        for _ in 0..count {
            let sample = self.next_sample();
            self.window.push_back(sample);
            if self.window.len() > fft_size {
                self.window.pop_front();
            }
            fresh.push(sample.round());
        }
        self.samples_since_fft += count;
        // The firmware only refreshes its spectrum once per full window.
        if self.samples_since_fft >= fft_size || self.spectrum.freqs_hz.is_empty() {
            let window: Vec<f64> = self.window.iter().copied().collect();
            self.spectrum = self
                .spectrum_builder
                .compute(&window, self.settings.sample_rate_hz);
            self.samples_since_fft = 0;
        }
        let spo2_wave: Vec<f64> = fresh
            .iter()
            .map(|_| (self.spo2 + self.rng.gen_range(-0.5..0.5)).round())
            .collect();
        let mut message = WireMessage {
            beats_per_minute: self.bpm.round(),
            spo2_percentage: self.spo2.round(),
            freqs_hz: self.spectrum.freqs_hz.clone(),
            freqs_amplitude: self.spectrum.amplitudes.clone(),
            ..WireMessage::default()
        };
        if self.settings.batched {
            message.heart_rate_data_array = Some(fresh);
            message.spo2_data_array = Some(spo2_wave);
        } else {
            message.heart_rate_data = fresh.last().copied();
            message.spo2_data = spo2_wave.last().copied();
        }
        message
    }
}
impl Transport for SimulatedDevice {
    fn next_message(&mut self) -> Result<Incoming, DashboardError> {
        if self.sent > 0 && !self.settings.interval.is_zero() {
            thread::sleep(self.settings.interval);
        }
        self.sent += 1;
        let message = self.next_wire_message();
        let json = serde_json::to_string(&message).map_err(DashboardError::Encode)?;
        Ok(Incoming::Payload(json))
    }
}
