use thiserror::Error;
/// Why a single device payload was rejected.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed device message: {0}")]
    Json(#[from] serde_json::Error),
    #[error("device message carries no heart-rate channel (heartRateData / heartRateDataArray)")]
    MissingHeartRate,
}
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("buffer capacity must be greater than zero")]
    InvalidCapacity,
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("device transport failed: {0}")]
    Transport(#[from] Box<tungstenite::Error>),
    #[error("failed to encode device message: {0}")]
    Encode(serde_json::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to render plot: {0}")]
    Plot(String),
}
impl From<tungstenite::Error> for DashboardError {
    fn from(value: tungstenite::Error) -> Self {
        DashboardError::Transport(Box::new(value))
    }
}
impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for DashboardError
{
    fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        DashboardError::Plot(format!("{value:?}"))
    }
}
impl From<image::ImageError> for DashboardError {
    fn from(value: image::ImageError) -> Self {
        DashboardError::Plot(value.to_string())
    }
}
