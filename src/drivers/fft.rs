use rustfft::{num_complex::Complex64, FftPlanner};
/// Magnitude spectrum in the shape the monitor publishes (`freqsHz`, `freqsAmplitude`).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeviceSpectrum {
    pub freqs_hz: Vec<f64>,
    pub amplitudes: Vec<f64>,
}
/// Helper that computes FFTs for a given window size.
///
/// Bins are `k * fs / n` for `k < n / 2`, magnitudes are `|X_k|` and the DC
/// bin is forced to zero. Values are rounded to two decimals, matching what
/// the firmware prints into its JSON.
pub struct SpectrumBuilder {
    fft_size: usize,
}
impl SpectrumBuilder {
    pub fn with_size(fft_size: usize) -> Self {
        Self {
            fft_size: fft_size.max(2),
        }
    }
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }
    /// Transforms the newest `fft_size` samples, zero-padding a short window.
    pub fn compute(&self, samples: &[f64], sample_rate_hz: f64) -> DeviceSpectrum {
        let mut planner = FftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(self.fft_size);
        let start = samples.len().saturating_sub(self.fft_size);
        let mut buffer: Vec<Complex64> = samples[start..]
            .iter()
            .map(|v| Complex64::new(*v, 0.0))
            .collect();
        buffer.resize(self.fft_size, Complex64::new(0.0, 0.0));
        fft.process(&mut buffer);
        let half = self.fft_size / 2;
        let freqs_hz = (0..half)
            .map(|k| round2(k as f64 * sample_rate_hz / self.fft_size as f64))
            .collect();
        let amplitudes = buffer
            .iter()
            .take(half)
            .enumerate()
            .map(|(k, c)| if k == 0 { 0.0 } else { round2(c.norm()) })
            .collect();
        DeviceSpectrum {
            freqs_hz,
            amplitudes,
        }
    }
}
fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
