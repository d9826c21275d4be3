//! Bounded Metric Smoother
//!
//! Moving average over the most recent N integer samples.
//! Used to keep on-screen telemetry readable.

use std::collections::VecDeque;

use crate::constants::DEFAULT_SMOOTHING_WINDOW;
use super::config::ConfigError;

/// Fixed-capacity FIFO window with a truncating average
#[derive(Debug, Clone)]
pub struct MovingAverage {
    window: VecDeque<i64>,
    capacity: usize,
}

impl Default for MovingAverage {
    fn default() -> Self {
        Self {
            window: VecDeque::with_capacity(DEFAULT_SMOOTHING_WINDOW + 1),
            capacity: DEFAULT_SMOOTHING_WINDOW,
        }
    }
}

impl MovingAverage {
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::Invalid {
                key: "smoothing_window",
                reason: "capacity must be at least 1".to_string(),
            });
        }

        Ok(Self {
            window: VecDeque::with_capacity(capacity + 1),
            capacity,
        })
    }

    /// Push a sample, evicting the oldest one once the window is full
    pub fn append(&mut self, value: i64) {
        self.window.push_back(value);
        if self.window.len() > self.capacity {
            self.window.pop_front();
        }
    }

    /// sum / count, truncated toward zero. 0 for an empty window.
    pub fn average_value(&self) -> i64 {
        if self.window.is_empty() {
            return 0;
        }
        let sum: i128 = self.window.iter().map(|&v| v as i128).sum();
        (sum / self.window.len() as i128) as i64
    }

    /// Samples, oldest first
    pub fn samples(&self) -> impl Iterator<Item = i64> + '_ {
        self.window.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.window.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.window.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_average_is_zero() {
        let maf = MovingAverage::default();
        assert_eq!(maf.average_value(), 0);
        assert!(maf.is_empty());
    }

    #[test]
    fn test_single_value() {
        let mut maf = MovingAverage::default();
        maf.append(42);
        assert_eq!(maf.average_value(), 42);
    }

    #[test]
    fn test_eviction_keeps_latest_window() {
        let mut maf = MovingAverage::new(10).unwrap();
        for v in 1..=11 {
            maf.append(v);
        }

        assert_eq!(maf.len(), 10);
        assert!(maf.is_full());
        assert_eq!(maf.samples().collect::<Vec<_>>(), (2..=11).collect::<Vec<_>>());
        // sum(2..=11) = 65
        assert_eq!(maf.average_value(), 6);
    }

    #[test]
    fn test_truncates_instead_of_rounding() {
        let mut maf = MovingAverage::new(10).unwrap();
        for _ in 0..3 {
            maf.append(100);
        }
        assert_eq!(maf.average_value(), 100);

        maf.append(0);
        assert_eq!(maf.average_value(), 75);

        let mut odd = MovingAverage::new(2).unwrap();
        odd.append(1);
        odd.append(2);
        assert_eq!(odd.average_value(), 1);
    }

    #[test]
    fn test_negative_values_truncate_toward_zero() {
        let mut maf = MovingAverage::new(4).unwrap();
        maf.append(-1);
        maf.append(-2);
        assert_eq!(maf.average_value(), -1);
    }

    #[test]
    fn test_insertion_order_below_capacity() {
        let mut maf = MovingAverage::new(5).unwrap();
        for v in [7, 3, 9] {
            maf.append(v);
        }
        assert_eq!(maf.samples().collect::<Vec<_>>(), vec![7, 3, 9]);
        assert!(!maf.is_full());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(MovingAverage::new(0).is_err());
    }

    #[test]
    fn test_clear() {
        let mut maf = MovingAverage::new(3).unwrap();
        maf.append(5);
        maf.clear();
        assert_eq!(maf.average_value(), 0);
        assert_eq!(maf.capacity(), 3);
    }
}
