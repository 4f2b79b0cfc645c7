/// Utility functions for rounding and formatting
use time::macros::format_description;
use time::OffsetDateTime;

/// Round to a fixed number of decimal digits
///
/// Rounds half away from zero at the requested digit, so `round_to(x, 4)`
/// yields the same literal a four-place decimal display would show.
/// NaN and infinities pass through unchanged.
pub fn round_to(value: f64, digits: i32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let scale = 10f64.powi(digits);
    (value * scale).round() / scale
}

/// Convert Celsius to Fahrenheit, rounded to 4 decimal places
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    round_to(celsius * 1.8 + 32.0, 4)
}

/// Format a timestamp for human-readable logging
///
/// Converts an OffsetDateTime to DD.MM.YYYY - HH:MM:SS format.
/// Falls back to default string representation if formatting fails.
pub fn format_datetime(dt: &OffsetDateTime) -> String {
    dt.format(format_description!(
        "[day].[month].[year] - [hour]:[minute]:[second]"
    ))
    .unwrap_or_else(|_| dt.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn rounds_to_four_places() {
        assert_eq!(round_to(11.0, 4), 11.0);
        assert_eq!(round_to(21.666666, 4), 21.6667);
        assert_eq!(round_to(-3.33333, 4), -3.3333);
    }

    #[test]
    fn non_finite_values_pass_through() {
        assert!(round_to(f64::NAN, 4).is_nan());
        assert_eq!(round_to(f64::INFINITY, 4), f64::INFINITY);
    }

    #[test]
    fn converts_smoothed_celsius() {
        assert_eq!(celsius_to_fahrenheit(20.0), 68.0);
        assert_eq!(celsius_to_fahrenheit(21.5), 70.7);
        assert_eq!(celsius_to_fahrenheit(-40.0), -40.0);
    }

    #[test]
    fn formats_log_timestamp() {
        let dt = datetime!(2024-03-09 07:05:01 UTC);
        assert_eq!(format_datetime(&dt), "09.03.2024 - 07:05:01");
    }
}
