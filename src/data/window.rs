//! Rolling window of recent RPM readings.

use std::collections::VecDeque;

/// Number of RPM readings the irregularity heuristic looks at.
pub const RPM_WINDOW_SIZE: usize = 10;

/// Bounded queue of the most recent RPM values, oldest evicted first.
#[derive(Debug, Clone)]
pub struct RpmWindow {
    values: VecDeque<f64>,
    capacity: usize,
}

impl Default for RpmWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl RpmWindow {
    pub fn new() -> Self {
        Self::with_capacity(RPM_WINDOW_SIZE)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            values: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Record a new reading, evicting the oldest when full.
    pub fn push(&mut self, rpm: f64) {
        self.values.push_back(rpm);
        if self.values.len() > self.capacity {
            self.values.pop_front();
        }
    }

    /// Values in arrival order.
    pub fn values(&mut self) -> &[f64] {
        self.values.make_contiguous()
    }

    /// Copy of the values in arrival order.
    pub fn to_vec(&self) -> Vec<f64> {
        self.values.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_evicts_oldest() {
        let mut window = RpmWindow::new();
        for rpm in 1..=12 {
            window.push(rpm as f64 * 100.0);
        }
        assert_eq!(window.len(), RPM_WINDOW_SIZE);
        assert_eq!(window.values()[0], 300.0);
        assert_eq!(*window.values().last().unwrap(), 1200.0);
    }

    #[test]
    fn test_window_clear() {
        let mut window = RpmWindow::with_capacity(3);
        window.push(1.0);
        window.push(2.0);
        window.clear();
        assert!(window.is_empty());
        assert!(window.to_vec().is_empty());
    }

    #[test]
    fn test_zero_capacity_keeps_latest() {
        let mut window = RpmWindow::with_capacity(0);
        window.push(1.0);
        window.push(2.0);
        assert_eq!(window.to_vec(), vec![2.0]);
    }
}
