/// Fixed-window moving average used to smooth indoor readings
use std::collections::VecDeque;

use crate::error::ConfigError;
use crate::utils::round_to;

/// Running mean over the most recent `window_size` samples
///
/// The first recorded value seeds every slot of the window, so the very
/// first average equals that value instead of a partial mean. After that
/// each sample evicts the oldest one and the window length never changes.
///
/// NaN and infinite inputs are not filtered; they propagate into the mean
/// until they leave the window.
#[derive(Debug, Clone)]
pub struct MovingAverage {
    window_size: usize,
    window: VecDeque<f64>,
}

impl MovingAverage {
    pub fn new(window_size: usize) -> Result<Self, ConfigError> {
        if window_size == 0 {
            return Err(ConfigError::Invalid {
                key: "MOVING_AVERAGE_WINDOW",
                value: window_size.to_string(),
                reason: "window size must be positive".into(),
            });
        }

        Ok(Self {
            window_size,
            window: VecDeque::with_capacity(window_size),
        })
    }

    /// Add a sample and return the mean of the window, rounded to 4 decimals
    pub fn record(&mut self, value: f64) -> f64 {
        if self.window.is_empty() {
            self.window.extend(std::iter::repeat(value).take(self.window_size));
        } else {
            self.window.pop_front();
            self.window.push_back(value);
        }

        let sum: f64 = self.window.iter().sum();
        round_to(sum / self.window_size as f64, 4)
    }

    #[cfg(test)]
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Current samples, oldest first. Empty until the first `record`.
    #[cfg(test)]
    pub fn window(&self) -> impl Iterator<Item = f64> + '_ {
        self.window.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_window() {
        assert!(MovingAverage::new(0).is_err());
    }

    #[test]
    fn first_value_seeds_the_whole_window() {
        let mut avg = MovingAverage::new(6).unwrap();

        assert_eq!(avg.record(10.0), 10.0);
        assert_eq!(avg.window().collect::<Vec<_>>(), vec![10.0; 6]);
    }

    #[test]
    fn second_value_shifts_the_mean() {
        let mut avg = MovingAverage::new(6).unwrap();
        avg.record(10.0);

        assert_eq!(avg.record(16.0), 11.0);
    }

    #[test]
    fn window_holds_last_values_in_order() {
        let mut avg = MovingAverage::new(3).unwrap();
        avg.record(1.0);
        for v in [2.0, 3.0, 4.0] {
            avg.record(v);
        }

        assert_eq!(avg.window().collect::<Vec<_>>(), vec![2.0, 3.0, 4.0]);
        assert_eq!(avg.window().count(), avg.window_size());
    }

    #[test]
    fn constant_input_is_steady() {
        let mut avg = MovingAverage::new(6).unwrap();
        for _ in 0..20 {
            assert_eq!(avg.record(21.3), 21.3);
        }
    }

    #[test]
    fn mean_is_rounded_to_four_places() {
        let mut avg = MovingAverage::new(3).unwrap();
        avg.record(0.0);

        // (0 + 0 + 1) / 3
        assert_eq!(avg.record(1.0), 0.3333);
    }

    #[test]
    fn nan_propagates() {
        let mut avg = MovingAverage::new(2).unwrap();
        avg.record(1.0);

        assert!(avg.record(f64::NAN).is_nan());
    }
}
