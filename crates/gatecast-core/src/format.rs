//! Display formatting that absorbs invalid input instead of failing
//!
//! Values arrive as `Option<f64>` so a missing or non-numeric API field can be
//! passed straight through; it renders as zero rather than erroring.

/// Round half up (towards positive infinity), matching the dashboard's
/// historical `Math.round` behaviour
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Round to a fixed number of decimal places with [`round_half_up`]
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    round_half_up(value * factor) / factor
}

/// Fixed-decimal display string.
///
/// - missing or NaN: `"0"`
/// - infinities: `"Infinity"` / `"-Infinity"`, passed through unformatted
/// - otherwise: `value` fixed to `decimals` places, ties away from zero
pub fn format_number(value: impl Into<Option<f64>>, decimals: usize) -> String {
    match value.into() {
        None => "0".to_string(),
        Some(v) if v.is_nan() => "0".to_string(),
        Some(v) if v == f64::INFINITY => "Infinity".to_string(),
        Some(v) if v == f64::NEG_INFINITY => "-Infinity".to_string(),
        Some(v) => {
            let v = round_half_away(v, decimals);
            format!("{v:.decimals$}")
        }
    }
}

/// Round a finite value to `decimals` places with ties away from zero.
///
/// Values whose scaled magnitude is not finite are returned unchanged.
fn round_half_away(value: f64, decimals: usize) -> f64 {
    let factor = 10f64.powi(i32::try_from(decimals).unwrap_or(i32::MAX));
    let scaled = value.abs() * factor;
    if !scaled.is_finite() {
        return value;
    }
    let rounded = round_half_up(scaled) / factor;
    if value.is_sign_negative() {
        -rounded
    } else {
        rounded
    }
}

/// Whole-number percentage of `numerator / denominator`, `"0%"` whenever the
/// ratio is undefined
pub fn format_percentage(
    numerator: impl Into<Option<f64>>,
    denominator: impl Into<Option<f64>>,
) -> String {
    let (Some(num), Some(den)) = (numerator.into(), denominator.into()) else {
        return "0%".to_string();
    };
    if den == 0.0 || !num.is_finite() || !den.is_finite() {
        return "0%".to_string();
    }

    let pct = round_half_up(num / den * 100.0);
    format!("{}%", pct as i64)
}

/// Tooltip text for an IN/OUT volume breakdown
pub fn create_volume_tooltip(total_in: f64, total_out: f64, net_flow: f64) -> String {
    let sign = if net_flow >= 0.0 { "+" } else { "" };
    format!(
        "IN: {} | OUT: {} | Net: {}{}",
        format_number(total_in, 0),
        format_number(total_out, 0),
        sign,
        format_number(net_flow, 0)
    )
}

/// Compact label for a window length: "8h", "24h", "3d", "1d 6h"
pub fn time_window_description(window_hours: u32) -> String {
    if window_hours <= 24 {
        return format!("{window_hours}h");
    }

    let days = window_hours / 24;
    let remaining = window_hours % 24;
    if remaining == 0 {
        format!("{days}d")
    } else {
        format!("{days}d {remaining}h")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_cases() {
        assert_eq!(format_number(123.456, 1), "123.5");
        assert_eq!(format_number(0.0, 1), "0.0");
        assert_eq!(format_number(None, 1), "0");
        assert_eq!(format_number(f64::NAN, 1), "0");
        assert_eq!(format_number(f64::INFINITY, 1), "Infinity");
        assert_eq!(format_number(f64::NEG_INFINITY, 2), "-Infinity");
        assert_eq!(format_number(-123.456, 2), "-123.46");
        assert_eq!(format_number(42.0, 0), "42");
    }

    #[test]
    fn test_format_number_ties_round_away_from_zero() {
        assert_eq!(format_number(0.5, 0), "1");
        assert_eq!(format_number(2.5, 0), "3");
        assert_eq!(format_number(1.25, 1), "1.3");
        assert_eq!(format_number(-2.5, 0), "-3");
        assert_eq!(format_number(1e20, 1), "100000000000000000000.0");
    }

    #[test]
    fn test_format_percentage_guards() {
        assert_eq!(format_percentage(5.0, 0.0), "0%");
        assert_eq!(format_percentage(None, 10.0), "0%");
        assert_eq!(format_percentage(1.0, None), "0%");
        assert_eq!(format_percentage(f64::NAN, 10.0), "0%");
        assert_eq!(format_percentage(1.0, 3.0), "33%");
        assert_eq!(format_percentage(2.0, 3.0), "67%");
        assert_eq!(format_percentage(150.0, 100.0), "150%");
    }

    #[test]
    fn test_round_half_up_goes_towards_positive_infinity() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(0.49), 0.0);
        assert_eq!(round_to(1.456, 2), 1.46);
    }

    #[test]
    fn test_volume_tooltip() {
        assert_eq!(
            create_volume_tooltip(60.0, 40.0, 20.0),
            "IN: 60 | OUT: 40 | Net: +20"
        );
        assert_eq!(
            create_volume_tooltip(10.0, 30.0, -20.0),
            "IN: 10 | OUT: 30 | Net: -20"
        );
    }

    #[test]
    fn test_time_window_description() {
        assert_eq!(time_window_description(8), "8h");
        assert_eq!(time_window_description(24), "24h");
        assert_eq!(time_window_description(72), "3d");
        assert_eq!(time_window_description(30), "1d 6h");
    }
}
