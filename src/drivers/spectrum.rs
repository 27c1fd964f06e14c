/// Latest frequency bins and amplitudes reported by the device.
///
/// Both halves are replaced wholesale, never appended to. Each half is only
/// swapped when the incoming array differs in length or in any value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpectralSnapshot {
    hz: Vec<f64>,
    amplitude: Vec<f64>,
}
/// Which halves of a [`SpectralSnapshot`] changed during an update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SnapshotChange {
    pub hz: bool,
    pub amplitude: bool,
}
impl SpectralSnapshot {
    pub fn hz(&self) -> &[f64] {
        &self.hz
    }
    pub fn amplitude(&self) -> &[f64] {
        &self.amplitude
    }
    pub fn update(&mut self, hz: &[f64], amplitude: &[f64]) -> SnapshotChange {
        SnapshotChange {
            hz: replace_if_changed(&mut self.hz, hz),
            amplitude: replace_if_changed(&mut self.amplitude, amplitude),
        }
    }
    pub fn normalized_amplitudes(&self) -> Vec<f64> {
        let max = self.amplitude.iter().copied().fold(0.0f64, f64::max);
        if max <= 0.0 {
            return vec![0.0; self.amplitude.len()];
        }
        self.amplitude.iter().map(|a| a / max).collect()
    }
    /// The `n` strongest bins as `(hz, amplitude)`, strongest first.
    pub fn dominant_peaks(&self, n: usize) -> Vec<(f64, f64)> {
        let mut bins: Vec<(f64, f64)> = self
            .hz
            .iter()
            .copied()
            .zip(self.amplitude.iter().copied())
            .collect();
        bins.sort_by(|a, b| b.1.total_cmp(&a.1));
        bins.truncate(n);
        bins
    }
}
fn replace_if_changed(stored: &mut Vec<f64>, incoming: &[f64]) -> bool {
    if stored.as_slice() == incoming {
        return false;
    }
    stored.clear();
    stored.extend_from_slice(incoming);
    true
}
/// Axis label for a frequency bin: `Hz`, `KHz` from 1 kHz, `MHz` from 1 MHz.
pub fn label_frequency(hz: f64) -> String {
    if hz / 1_000_000.0 >= 1.0 {
        format!("{:.2} MHz", hz / 1_000_000.0)
    } else if hz / 1000.0 >= 1.0 {
        format!("{:.2} KHz", hz / 1000.0)
    } else {
        format!("{hz:.2} Hz")
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn identical_arrays_are_a_no_op() {
        let mut snapshot = SpectralSnapshot::default();
        let first = snapshot.update(&[0.0, 1.0], &[3.0, 4.0]);
        assert_eq!(first, SnapshotChange { hz: true, amplitude: true });
        let again = snapshot.update(&[0.0, 1.0], &[3.0, 4.0]);
        assert_eq!(again, SnapshotChange::default());
    }
    #[test]
    fn length_or_value_difference_replaces_the_half() {
        let mut snapshot = SpectralSnapshot::default();
        snapshot.update(&[0.0, 1.0], &[3.0, 4.0]);
        let change = snapshot.update(&[0.0, 1.0, 2.0], &[3.0, 5.0]);
        assert_eq!(change, SnapshotChange { hz: true, amplitude: true });
        assert_eq!(snapshot.hz(), &[0.0, 1.0, 2.0]);
        assert_eq!(snapshot.amplitude(), &[3.0, 5.0]);
    }
    #[test]
    fn empty_first_update_matches_empty_snapshot() {
        let mut snapshot = SpectralSnapshot::default();
        assert_eq!(snapshot.update(&[], &[]), SnapshotChange::default());
        assert!(snapshot.hz().is_empty() && snapshot.amplitude().is_empty());
    }
    #[test]
    fn peaks_and_normalization() {
        let mut snapshot = SpectralSnapshot::default();
        snapshot.update(&[0.5, 1.0, 1.5, 2.0], &[2.0, 8.0, 4.0, 1.0]);
        assert_eq!(snapshot.dominant_peaks(2), vec![(1.0, 8.0), (1.5, 4.0)]);
        assert_eq!(snapshot.normalized_amplitudes(), vec![0.25, 1.0, 0.5, 0.125]);
        let mut silent = SpectralSnapshot::default();
        silent.update(&[1.0, 2.0], &[0.0, 0.0]);
        assert_eq!(silent.normalized_amplitudes(), vec![0.0, 0.0]);
    }
    #[test]
    fn frequency_labels_pick_a_unit() {
        assert_eq!(label_frequency(1.25), "1.25 Hz");
        assert_eq!(label_frequency(2500.0), "2.50 KHz");
        assert_eq!(label_frequency(3_200_000.0), "3.20 MHz");
    }
}
