use std::collections::VecDeque;
use crate::drivers::DashboardError;
/// Fixed-capacity series: appending past capacity drops the oldest entries.
#[derive(Clone, Debug)]
pub struct RollingBuffer<T> {
    data: VecDeque<T>,
    capacity: usize,
}
impl<T: Copy> RollingBuffer<T> {
    pub fn with_capacity(capacity: usize) -> Result<Self, DashboardError> {
        if capacity == 0 {
            return Err(DashboardError::InvalidCapacity);
        }
        Ok(Self {
            data: VecDeque::with_capacity(capacity),
            capacity,
        })
    }
    pub fn len(&self) -> usize {
        self.data.len()
    }
    pub fn last(&self) -> Option<T> {
        self.data.back().copied()
    }
    /// Appends one value and returns how many old values were evicted.
    pub fn push(&mut self, value: T) -> usize {
        self.data.push_back(value);
        self.evict()
    }
    pub fn extend_from_slice(&mut self, values: &[T]) -> usize {
        self.data.extend(values.iter().copied());
        self.evict()
    }
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.data.iter()
    }
    #[cfg(test)]
    pub fn to_vec(&self) -> Vec<T> {
        self.data.iter().copied().collect()
    }
    fn evict(&mut self) -> usize {
        let mut evicted = 0;
        while self.data.len() > self.capacity {
            self.data.pop_front();
            evicted += 1;
        }
        evicted
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn keeps_last_n_values_in_order() {
        let mut buffer = RollingBuffer::with_capacity(4).unwrap();
        for v in 0..10 {
            buffer.push(v);
            assert!(buffer.len() <= 4);
        }
        assert_eq!(buffer.to_vec(), vec![6, 7, 8, 9]);
    }
    #[test]
    fn under_capacity_keeps_everything() {
        let mut buffer = RollingBuffer::with_capacity(8).unwrap();
        buffer.extend_from_slice(&[1.0, 2.0, 3.0]);
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.last(), Some(3.0));
    }
    #[test]
    fn bulk_append_reports_evictions() {
        let mut buffer = RollingBuffer::with_capacity(3).unwrap();
        assert_eq!(buffer.extend_from_slice(&[1, 2]), 0);
        assert_eq!(buffer.extend_from_slice(&[3, 4, 5, 6]), 3);
        assert_eq!(buffer.to_vec(), vec![4, 5, 6]);
    }
    #[test]
    fn zero_capacity_is_rejected() {
        assert!(matches!(
            RollingBuffer::<f64>::with_capacity(0),
            Err(DashboardError::InvalidCapacity)
        ));
    }
}
