// src/drivers/mod.rs
pub mod buffer;
pub mod controller;
pub mod error;
pub mod fft;
pub mod message;
pub mod pipeline;
pub mod plot;
pub mod simulator;
pub mod source;
pub mod spectrum;
pub mod timeline;
pub use buffer::RollingBuffer;
pub use controller::{
    ChartFrame, ChartKind, ControllerOptions, IngestReport, Renderer, StreamController, TextSink,
    TextSlot,
};
pub use error::{DashboardError, DecodeError};
pub use message::DeviceMessage;
pub use pipeline::{Pumped, SessionPipeline};
pub use plot::{PlotStyle, PngRenderer};
pub use simulator::{SimulatedDevice, SimulatorSettings};
pub use source::{Transport, WebSocketTransport};
pub use spectrum::SpectralSnapshot;
