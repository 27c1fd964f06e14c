use log::warn;
use crate::drivers::controller::{IngestReport, Renderer, StreamController, TextSink};
use crate::drivers::error::{DashboardError, DecodeError};
use crate::drivers::source::{Incoming, Transport};
/// What happened to one payload pulled from the transport.
#[derive(Debug)]
pub enum Pumped {
    Accepted(IngestReport),
    Rejected(DecodeError),
    /// The transport had nothing within its read timeout.
    Idle,
}
/// Single consumer that moves payloads from a transport into a controller.
pub struct SessionPipeline<S: Transport, R: Renderer, T: TextSink> {
    source: S,
    controller: StreamController<R, T>,
    accepted: u64,
    rejected: u64,
}
impl<S: Transport, R: Renderer, T: TextSink> SessionPipeline<S, R, T> {
    pub fn new(source: S, controller: StreamController<R, T>) -> Self {
        Self {
            source,
            controller,
            accepted: 0,
            rejected: 0,
        }
    }
    /// Handles the next payload to completion. `Ok(None)` once the stream ends,
    /// `Pumped::Idle` when the transport timed out without a payload.
    pub fn pump_once(&mut self) -> Result<Option<Pumped>, DashboardError> {
        let raw = match self.source.next_message()? {
            Incoming::Payload(raw) => raw,
            Incoming::Idle => return Ok(Some(Pumped::Idle)),
            Incoming::Closed => return Ok(None),
        };
        match self.controller.on_message(&raw) {
            Ok(report) => {
                self.accepted += 1;
                Ok(Some(Pumped::Accepted(report)))
            }
            Err(err) => {
                self.rejected += 1;
                warn!("dropping device message: {err}");
                Ok(Some(Pumped::Rejected(err)))
            }
        }
    }
    pub fn controller(&self) -> &StreamController<R, T> {
        &self.controller
    }
    pub fn accepted(&self) -> u64 {
        self.accepted
    }
    pub fn rejected(&self) -> u64 {
        self.rejected
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::controller::tests::{payload, RecordingRenderer, RecordingText};
    use crate::drivers::controller::{ChartKind, ControllerOptions};
    use crate::drivers::source::ManualTransport;
    #[test]
    fn pipeline_skips_bad_payloads_and_keeps_going() {
        let source = ManualTransport::new(vec![
            payload(70.0, 1.0, &[1.0]),
            "{\"beatsPerMinute\":".to_owned(),
            payload(71.0, 2.0, &[1.0]),
        ]);
        let controller = StreamController::new(
            ControllerOptions::default(),
            RecordingRenderer::default(),
            RecordingText::default(),
        )
        .unwrap();
        let mut pipeline = SessionPipeline::new(source, controller);
        assert!(matches!(pipeline.pump_once().unwrap(), Some(Pumped::Accepted(_))));
        assert!(matches!(
            pipeline.pump_once().unwrap(),
            Some(Pumped::Rejected(DecodeError::Json(_)))
        ));
        assert!(matches!(pipeline.pump_once().unwrap(), Some(Pumped::Accepted(_))));
        assert!(pipeline.pump_once().unwrap().is_none());
        assert_eq!((pipeline.accepted(), pipeline.rejected()), (2, 1));
        let ctl = pipeline.controller();
        assert_eq!(ctl.heart_rate().to_vec(), vec![1.0, 2.0]);
        assert_eq!(ctl.bpm_readout(), Some("71 BPM"));
        assert_eq!(ctl.renderer().count(ChartKind::Frequencies), 1);
    }
    #[test]
    fn idle_polls_are_not_counted() {
        struct Silent;
        impl Transport for Silent {
            fn next_message(&mut self) -> Result<Incoming, DashboardError> {
                Ok(Incoming::Idle)
            }
        }
        let controller = StreamController::new(
            ControllerOptions::default(),
            RecordingRenderer::default(),
            RecordingText::default(),
        )
        .unwrap();
        let mut pipeline = SessionPipeline::new(Silent, controller);
        assert!(matches!(pipeline.pump_once().unwrap(), Some(Pumped::Idle)));
        assert_eq!((pipeline.accepted(), pipeline.rejected()), (0, 0));
        assert!(pipeline.controller().renderer().updates.is_empty());
    }
    #[test]
    fn simulated_device_feeds_the_controller() {
        use crate::drivers::simulator::{SimulatedDevice, SimulatorSettings};
        let device = SimulatedDevice::new(SimulatorSettings {
            interval: std::time::Duration::ZERO,
            ..SimulatorSettings::default()
        });
        let controller = StreamController::new(
            ControllerOptions {
                capacity: 8,
                track_spo2_waveform: true,
            },
            RecordingRenderer::default(),
            RecordingText::default(),
        )
        .unwrap();
        let mut pipeline = SessionPipeline::new(device, controller);
        for _ in 0..20 {
            assert!(matches!(pipeline.pump_once().unwrap(), Some(Pumped::Accepted(_))));
        }
        let ctl = pipeline.controller();
        assert_eq!(ctl.heart_rate().len(), 8);
        assert_eq!(ctl.spo2().map(|s| s.len()), Some(8));
        assert_eq!(ctl.time_axis().len(), 8);
        assert_eq!(ctl.renderer().count(ChartKind::Cardiogram), 20);
        assert_eq!(ctl.spectrum().hz().len(), 32);
    }
}
