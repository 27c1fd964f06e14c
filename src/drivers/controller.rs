use std::time::Instant;
use log::debug;
use crate::drivers::timeline::TimeAxis;
use crate::drivers::{DashboardError, DecodeError, DeviceMessage, RollingBuffer, SpectralSnapshot};
/// The three charts the dashboard draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChartKind {
    Cardiogram,
    Spo2,
    Frequencies,
}
impl ChartKind {
    pub fn id(self) -> &'static str {
        match self {
            ChartKind::Cardiogram => "cardiogram",
            ChartKind::Spo2 => "spo2",
            ChartKind::Frequencies => "frequencies",
        }
    }
}
/// Text readouts next to the charts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextSlot {
    HeartRate,
    Spo2,
}
impl TextSlot {
    pub fn id(self) -> &'static str {
        match self {
            TextSlot::HeartRate => "heartrate",
            TextSlot::Spo2 => "spo2",
        }
    }
}
/// Borrowed view of one chart's data at redraw time.
#[derive(Clone, Copy, Debug)]
pub enum ChartFrame<'a> {
    Cardiogram {
        time: &'a RollingBuffer<f64>,
        samples: &'a RollingBuffer<f64>,
    },
    Spo2 {
        time: &'a RollingBuffer<f64>,
        samples: &'a RollingBuffer<f64>,
    },
    Frequencies(&'a SpectralSnapshot),
}
impl<'a> ChartFrame<'a> {
    pub fn kind(&self) -> ChartKind {
        match self {
            ChartFrame::Cardiogram { .. } => ChartKind::Cardiogram,
            ChartFrame::Spo2 { .. } => ChartKind::Spo2,
            ChartFrame::Frequencies(_) => ChartKind::Frequencies,
        }
    }
    /// `[x, y]` pairs. Waveforms are paired from the newest end, so a series
    /// shorter or longer than the time axis still lines up with recent time.
    pub fn points(&self) -> Vec<[f64; 2]> {
        match self {
            ChartFrame::Cardiogram { time, samples } | ChartFrame::Spo2 { time, samples } => {
                let n = time.len().min(samples.len());
                time.iter()
                    .skip(time.len() - n)
                    .zip(samples.iter().skip(samples.len() - n))
                    .map(|(t, v)| [*t, *v])
                    .collect()
            }
            ChartFrame::Frequencies(snapshot) => snapshot
                .hz()
                .iter()
                .zip(snapshot.amplitude())
                .map(|(hz, amp)| [*hz, *amp])
                .collect(),
        }
    }    /// Points as drawn: frequency bars are scaled so the strongest bin is 1.0.
    pub fn display_points(&self) -> Vec<[f64; 2]> {
        match self {
            ChartFrame::Frequencies(snapshot) => snapshot
                .hz()
                .iter()
                .zip(snapshot.normalized_amplitudes())
                .map(|(hz, amp)| [*hz, amp])
                .collect(),
            _ => self.points(),
        }
    }
}
/// Redraws a chart. Called synchronously from the ingest path.
pub trait Renderer {
    fn update(&mut self, frame: ChartFrame<'_>);
}
/// Receives readout strings.
pub trait TextSink {
    fn set_text(&mut self, slot: TextSlot, text: &str);
}
#[derive(Clone, Copy, Debug)]
pub struct ControllerOptions {
    pub capacity: usize,
    pub track_spo2_waveform: bool,
}
impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            capacity: 32,
            track_spo2_waveform: true,
        }
    }
}
/// Outcome of one accepted message.
#[derive(Clone, Debug)]
pub struct IngestReport {
    pub message: DeviceMessage,
    /// Newest time-axis value written for this message.
    pub timestamp: f64,
    /// Time-axis values of this message's heart-rate samples still in the buffer.
    pub timestamps: Vec<f64>,
    pub frequencies_redrawn: bool,
}
/// Owns the rolling state of one dashboard session.
pub struct StreamController<R: Renderer, T: TextSink> {
    heart_rate: RollingBuffer<f64>,
    spo2: Option<RollingBuffer<f64>>,
    time: TimeAxis,
    spectrum: SpectralSnapshot,
    bpm_readout: Option<String>,
    spo2_readout: Option<String>,
    renderer: R,
    text_sink: T,
}
impl<R: Renderer, T: TextSink> StreamController<R, T> {
    pub fn new(options: ControllerOptions, renderer: R, text_sink: T) -> Result<Self, DashboardError> {
        let spo2 = if options.track_spo2_waveform {
            Some(RollingBuffer::with_capacity(options.capacity)?)
        } else {
            None
        };
        Ok(Self {
            heart_rate: RollingBuffer::with_capacity(options.capacity)?,
            spo2,
            time: TimeAxis::with_capacity(options.capacity)?,
            spectrum: SpectralSnapshot::default(),
            bpm_readout: None,
            spo2_readout: None,
            renderer,
            text_sink,
        })
    }
    pub fn on_message(&mut self, raw: &str) -> Result<IngestReport, DecodeError> {
        self.on_message_at(raw, Instant::now())
    }
    /// Ingests one payload received at `now`. A payload that fails to decode
    /// leaves every buffer and readout untouched.
    pub fn on_message_at(&mut self, raw: &str, now: Instant) -> Result<IngestReport, DecodeError> {
        let message = DeviceMessage::decode(raw)?;
        let bpm = message.bpm_text();
        self.text_sink.set_text(TextSlot::HeartRate, &bpm);
        self.bpm_readout = Some(bpm);
        let spo2 = message.spo2_text();
        self.text_sink.set_text(TextSlot::Spo2, &spo2);
        self.spo2_readout = Some(spo2);

        self.heart_rate.extend_from_slice(&message.heart_rate);
        if let (Some(series), Some(wave)) = (self.spo2.as_mut(), message.spo2_wave.as_ref()) {
            series.extend_from_slice(wave);
        }
        let timestamp = self.time.record(now, message.heart_rate.len());
        let stamps = self.time.stamps();
        let fresh = message.heart_rate.len().min(stamps.len());
        let timestamps: Vec<f64> = stamps.iter().skip(stamps.len() - fresh).copied().collect();

        self.renderer.update(ChartFrame::Cardiogram {
            time: self.time.stamps(),
            samples: &self.heart_rate,
        });
        if let Some(series) = &self.spo2 {
            self.renderer.update(ChartFrame::Spo2 {
                time: self.time.stamps(),
                samples: series,
            });
        }

        // Only an amplitude change redraws; a new Hz array alone is stored silently.
        let change = self
            .spectrum
            .update(&message.freqs_hz, &message.freqs_amplitude);
        if change.amplitude {
            self.renderer.update(ChartFrame::Frequencies(&self.spectrum));
        }
        debug!(
            "ingested t={timestamp:.3}s hr_samples={} hz_changed={} amp_changed={}",
            message.heart_rate.len(),
            change.hz,
            change.amplitude
        );
        Ok(IngestReport {
            message,
            timestamp,
            timestamps,
            frequencies_redrawn: change.amplitude,
        })
    }
    pub fn bpm_readout(&self) -> Option<&str> {
        self.bpm_readout.as_deref()
    }
    pub fn spo2_readout(&self) -> Option<&str> {
        self.spo2_readout.as_deref()
    }
    pub fn renderer(&self) -> &R {
        &self.renderer
    }
}
#[cfg(test)]
impl<R: Renderer, T: TextSink> StreamController<R, T> {
    pub fn heart_rate(&self) -> &RollingBuffer<f64> {
        &self.heart_rate
    }
    pub fn spo2(&self) -> Option<&RollingBuffer<f64>> {
        self.spo2.as_ref()
    }
    pub fn time_axis(&self) -> &RollingBuffer<f64> {
        self.time.stamps()
    }
    pub fn spectrum(&self) -> &SpectralSnapshot {
        &self.spectrum
    }
    pub fn text_sink(&self) -> &T {
        &self.text_sink
    }
}
#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::time::Duration;
    #[derive(Default)]
    pub(crate) struct RecordingRenderer {
        pub updates: Vec<ChartKind>,
        pub last_points: Vec<Vec<[f64; 2]>>,
    }
    impl RecordingRenderer {
        pub fn count(&self, kind: ChartKind) -> usize {
            self.updates.iter().filter(|k| **k == kind).count()
        }
    }
    impl Renderer for RecordingRenderer {
        fn update(&mut self, frame: ChartFrame<'_>) {
            self.updates.push(frame.kind());
            self.last_points.push(frame.points());
        }
    }
    #[derive(Default)]
    pub(crate) struct RecordingText {
        pub writes: Vec<(TextSlot, String)>,
    }
    impl TextSink for RecordingText {
        fn set_text(&mut self, slot: TextSlot, text: &str) {
            self.writes.push((slot, text.to_owned()));
        }
    }
    pub(crate) fn payload(bpm: f64, hr: f64, amplitude: &[f64]) -> String {
        serde_json::json!({
            "beatsPerMinute": bpm,
            "spo2Percentage": 98,
            "heartRateData": hr,
            "spo2Data": 97,
            "freqsHz": [0.0, 0.5, 1.0],
            "freqsAmplitude": amplitude,
        })
        .to_string()
    }
    fn controller(capacity: usize) -> StreamController<RecordingRenderer, RecordingText> {
        StreamController::new(
            ControllerOptions {
                capacity,
                track_spo2_waveform: true,
            },
            RecordingRenderer::default(),
            RecordingText::default(),
        )
        .unwrap()
    }
    #[test]
    fn five_messages_into_four_slots() {
        let mut ctl = controller(4);
        let t0 = Instant::now();
        for (i, hr) in [5.0, 6.0, 7.0, 8.0, 9.0].into_iter().enumerate() {
            let now = t0 + Duration::from_secs(i as u64);
            ctl.on_message_at(&payload(70.0, hr, &[1.0, 2.0, 3.0]), now)
                .unwrap();
        }
        assert_eq!(ctl.heart_rate().to_vec(), vec![6.0, 7.0, 8.0, 9.0]);
        assert_eq!(ctl.time_axis().to_vec(), vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(ctl.bpm_readout(), Some("70 BPM"));
        assert_eq!(ctl.spo2_readout(), Some("98 %"));
    }
    #[test]
    fn readouts_are_written_before_redraws() {
        let mut ctl = controller(4);
        ctl.on_message(&payload(61.0, 1.0, &[1.0])).unwrap();
        assert_eq!(
            ctl.text_sink().writes,
            vec![
                (TextSlot::HeartRate, "61 BPM".to_owned()),
                (TextSlot::Spo2, "98 %".to_owned()),
            ]
        );
        assert_eq!(
            ctl.renderer().updates,
            vec![ChartKind::Cardiogram, ChartKind::Spo2, ChartKind::Frequencies]
        );
    }
    #[test]
    fn waveform_charts_redraw_on_every_message() {
        let mut ctl = controller(8);
        for _ in 0..3 {
            ctl.on_message(&payload(70.0, 1.0, &[1.0, 2.0, 3.0])).unwrap();
        }
        assert_eq!(ctl.renderer().count(ChartKind::Cardiogram), 3);
        assert_eq!(ctl.renderer().count(ChartKind::Spo2), 3);
    }
    #[test]
    fn unchanged_amplitudes_skip_frequency_redraw() {
        let mut ctl = controller(8);
        let first = ctl.on_message(&payload(70.0, 1.0, &[1.0, 2.0, 3.0])).unwrap();
        let second = ctl.on_message(&payload(70.0, 2.0, &[1.0, 2.0, 3.0])).unwrap();
        assert!(first.frequencies_redrawn);
        assert!(!second.frequencies_redrawn);
        assert_eq!(ctl.renderer().count(ChartKind::Frequencies), 1);
        let third = ctl.on_message(&payload(70.0, 3.0, &[1.0, 2.0, 4.0])).unwrap();
        assert!(third.frequencies_redrawn);
        assert_eq!(ctl.renderer().count(ChartKind::Frequencies), 2);
        assert_eq!(ctl.spectrum().amplitude(), &[1.0, 2.0, 4.0]);
    }
    #[test]
    fn hz_only_change_is_stored_without_frequency_redraw() {
        let mut ctl = controller(8);
        ctl.on_message(&payload(70.0, 1.0, &[1.0, 2.0, 3.0])).unwrap();
        let shifted = serde_json::json!({
            "beatsPerMinute": 70, "spo2Percentage": 98, "heartRateData": 2,
            "freqsHz": [0.0, 0.75, 1.5], "freqsAmplitude": [1.0, 2.0, 3.0],
        })
        .to_string();
        let report = ctl.on_message(&shifted).unwrap();
        assert!(!report.frequencies_redrawn);
        assert_eq!(ctl.renderer().count(ChartKind::Frequencies), 1);
        assert_eq!(ctl.spectrum().hz(), &[0.0, 0.75, 1.5]);
        // no spo2Data: nothing appended, but the tracked chart still redraws
        assert_eq!(ctl.renderer().count(ChartKind::Spo2), 2);
        assert_eq!(ctl.spo2().map(|s| s.len()), Some(1));
    }
    #[test]
    fn malformed_payload_leaves_state_untouched() {
        let mut ctl = controller(4);
        ctl.on_message(&payload(70.0, 5.0, &[1.0])).unwrap();
        let missing_hz = r#"{"beatsPerMinute":90,"spo2Percentage":91,"heartRateData":6,"freqsAmplitude":[9]}"#;
        assert!(ctl.on_message(missing_hz).is_err());
        assert!(ctl.on_message("{").is_err());
        assert_eq!(ctl.heart_rate().to_vec(), vec![5.0]);
        assert_eq!(ctl.time_axis().len(), 1);
        assert_eq!(ctl.bpm_readout(), Some("70 BPM"));
        assert_eq!(ctl.spectrum().amplitude(), &[1.0]);
        assert_eq!(ctl.renderer().updates.len(), 3);
        assert_eq!(ctl.text_sink().writes.len(), 2);
    }
    #[test]
    fn untracked_spo2_waveform_is_never_drawn() {
        let mut ctl = StreamController::new(
            ControllerOptions {
                capacity: 4,
                track_spo2_waveform: false,
            },
            RecordingRenderer::default(),
            RecordingText::default(),
        )
        .unwrap();
        ctl.on_message(&payload(70.0, 1.0, &[1.0])).unwrap();
        assert!(ctl.spo2().is_none());
        assert_eq!(ctl.renderer().count(ChartKind::Spo2), 0);
        // The readout is still shown.
        assert_eq!(ctl.spo2_readout(), Some("98 %"));
    }
    #[test]
    fn batched_heart_rate_keeps_time_axis_aligned() {
        let mut ctl = controller(5);
        let t0 = Instant::now();
        let batch = |values: &[f64]| {
            serde_json::json!({
                "beatsPerMinute": 70, "spo2Percentage": 98,
                "heartRateDataArray": values,
                "freqsHz": [], "freqsAmplitude": [],
            })
            .to_string()
        };
        ctl.on_message_at(&batch(&[1.0, 2.0]), t0).unwrap();
        ctl.on_message_at(&batch(&[3.0, 4.0, 5.0, 6.0]), t0 + Duration::from_secs(2))
            .unwrap();
        assert_eq!(ctl.heart_rate().to_vec(), vec![2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(ctl.time_axis().to_vec(), vec![0.0, 0.5, 1.0, 1.5, 2.0]);
        let cardiogram = &ctl.renderer().last_points[ctl.renderer().updates.len() - 2];
        assert_eq!(cardiogram.last(), Some(&[2.0, 6.0]));
    }
    #[test]
    fn frequency_frame_pairs_bins_with_amplitudes() {
        let mut ctl = controller(4);
        ctl.on_message(&payload(70.0, 1.0, &[4.0, 5.0, 6.0])).unwrap();
        let frequencies = ctl.renderer().last_points.last().unwrap();
        assert_eq!(frequencies, &vec![[0.0, 4.0], [0.5, 5.0], [1.0, 6.0]]);
    }
    #[test]
    fn frequency_bars_are_drawn_normalized() {
        let mut snapshot = SpectralSnapshot::default();
        snapshot.update(&[0.0, 0.5, 1.0], &[2.0, 8.0, 4.0]);
        let frame = ChartFrame::Frequencies(&snapshot);
        assert_eq!(frame.display_points(), vec![[0.0, 0.25], [0.5, 1.0], [1.0, 0.5]]);
        let mut time = RollingBuffer::with_capacity(2).unwrap();
        time.extend_from_slice(&[0.0, 1.0]);
        let wave = ChartFrame::Cardiogram { time: &time, samples: &time };
        assert_eq!(wave.display_points(), wave.points());
    }
}
