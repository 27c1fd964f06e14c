use serde::{Deserialize, Serialize};
use crate::drivers::DecodeError;
/// JSON object pushed by the monitor over its `/ws` socket.
///
/// Firmware revisions disagree on the waveform fields: some send one sample
/// per message (`heartRateData`, `spo2Data`), others a batch
/// (`heartRateDataArray`, `spo2DataArray`), and some omit the SpO2 waveform.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WireMessage {
    pub beats_per_minute: f64,
    pub spo2_percentage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate_data: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate_data_array: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spo2_data: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spo2_data_array: Option<Vec<f64>>,
    pub freqs_hz: Vec<f64>,
    pub freqs_amplitude: Vec<f64>,
}
/// A decoded message with the waveform variants folded into channels.
#[derive(Clone, Debug, PartialEq)]
pub struct DeviceMessage {
    pub beats_per_minute: f64,
    pub spo2_percentage: f64,
    /// Never empty.
    pub heart_rate: Vec<f64>,
    pub spo2_wave: Option<Vec<f64>>,
    pub freqs_hz: Vec<f64>,
    pub freqs_amplitude: Vec<f64>,
}
impl DeviceMessage {
    pub fn decode(raw: &str) -> Result<Self, DecodeError> {
        let wire: WireMessage = serde_json::from_str(raw)?;
        Self::try_from(wire)
    }
    pub fn bpm_text(&self) -> String {
        format!("{} BPM", self.beats_per_minute)
    }
    pub fn spo2_text(&self) -> String {
        format!("{} %", self.spo2_percentage)
    }
}
impl TryFrom<WireMessage> for DeviceMessage {
    type Error = DecodeError;
    fn try_from(wire: WireMessage) -> Result<Self, Self::Error> {
        let heart_rate = match (wire.heart_rate_data_array, wire.heart_rate_data) {
            (Some(batch), _) if !batch.is_empty() => batch,
            (_, Some(sample)) => vec![sample],
            _ => return Err(DecodeError::MissingHeartRate),
        };
        let spo2_wave = match (wire.spo2_data_array, wire.spo2_data) {
            (Some(batch), _) if !batch.is_empty() => Some(batch),
            (_, Some(sample)) => Some(vec![sample]),
            _ => None,
        };
        Ok(Self {
            beats_per_minute: wire.beats_per_minute,
            spo2_percentage: wire.spo2_percentage,
            heart_rate,
            spo2_wave,
            freqs_hz: wire.freqs_hz,
            freqs_amplitude: wire.freqs_amplitude,
        })
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn decodes_single_sample_firmware() {
        let raw = r#"{"heartRateData":51234,"beatsPerMinute": 72, "spo2Percentage": 97,
            "freqsAmplitude": [0.00, 12.50], "freqsHz": [0.00, 0.25]}"#;
        let msg = DeviceMessage::decode(raw).unwrap();
        assert_eq!(msg.heart_rate, vec![51234.0]);
        assert_eq!(msg.spo2_wave, None);
        assert_eq!(msg.freqs_hz, vec![0.0, 0.25]);
        assert_eq!(msg.bpm_text(), "72 BPM");
        assert_eq!(msg.spo2_text(), "97 %");
    }
    #[test]
    fn decodes_batched_firmware() {
        let raw = r#"{"beatsPerMinute":64.5,"spo2Percentage":98,
            "heartRateDataArray":[1,2,3],"spo2DataArray":[97,98],
            "freqsHz":[],"freqsAmplitude":[]}"#;
        let msg = DeviceMessage::decode(raw).unwrap();
        assert_eq!(msg.heart_rate, vec![1.0, 2.0, 3.0]);
        assert_eq!(msg.spo2_wave, Some(vec![97.0, 98.0]));
        assert_eq!(msg.bpm_text(), "64.5 BPM");
    }
    #[test]
    fn rejects_payload_without_heart_rate_channel() {
        let raw = r#"{"beatsPerMinute":60,"spo2Percentage":98,"heartRateDataArray":[],
            "freqsHz":[],"freqsAmplitude":[]}"#;
        assert!(matches!(
            DeviceMessage::decode(raw),
            Err(DecodeError::MissingHeartRate)
        ));
    }
    #[test]
    fn rejects_non_numeric_and_missing_fields() {
        let non_numeric = r#"{"beatsPerMinute":"fast","spo2Percentage":98,"heartRateData":1,
            "freqsHz":[],"freqsAmplitude":[]}"#;
        assert!(matches!(
            DeviceMessage::decode(non_numeric),
            Err(DecodeError::Json(_))
        ));
        let missing = r#"{"beatsPerMinute":60,"spo2Percentage":98,"heartRateData":1,"freqsAmplitude":[]}"#;
        assert!(matches!(
            DeviceMessage::decode(missing),
            Err(DecodeError::Json(_))
        ));
        assert!(DeviceMessage::decode("not json").is_err());
    }
}
