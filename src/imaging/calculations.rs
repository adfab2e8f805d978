//! Pure calculation functions for dimensions and seek offsets.
//!
//! All functions here are pure and testable without any I/O or media.

/// Scale `(width, height)` so that `width + height` stays within `max_sum`.
///
/// Both axes scale independently from the original dimensions with the same
/// coefficient `(max_sum + 1) / (width + height)`, floored, then `margin`
/// pixels are taken off each axis. The margin absorbs the resizing tool's
/// own rounding so the re-probed output still fits. Each axis stays at
/// least 1 pixel.
///
/// # Examples
/// ```
/// # use sendable::imaging::fit_dimension_sum;
/// // 6000x4500 (sum 10500) → coefficient 10000/10500
/// assert_eq!(fit_dimension_sum((6000, 4500), 9999, 5), (5709, 4280));
/// ```
pub fn fit_dimension_sum(source: (u32, u32), max_sum: u32, margin: u32) -> (u32, u32) {
    let (width, height) = source;
    let total = width as f64 + height as f64;
    if total == 0.0 {
        return (0, 0);
    }

    let coef = (max_sum as f64 + 1.0) / total;
    let scale = |side: u32| {
        let scaled = (side as f64 * coef).floor() as u32;
        scaled.saturating_sub(margin).max(1)
    };
    (scale(width), scale(height))
}

/// Seek offset for a preview frame: the midpoint of the video.
///
/// Unknown (`NaN`) or negative durations seek to the first frame.
pub fn preview_offset(duration: f64) -> f64 {
    if duration.is_finite() && duration > 0.0 {
        duration / 2.0
    } else {
        0.0
    }
}

/// Format seconds as an `HH:MM:SS.mmm` seek position.
///
/// Hours are not wrapped at 24.
pub fn format_timestamp(seconds: f64) -> String {
    let total_ms = if seconds.is_finite() && seconds > 0.0 {
        (seconds * 1000.0).round() as u64
    } else {
        0
    };
    let ms = total_ms % 1000;
    let total_secs = total_ms / 1000;
    format!(
        "{:02}:{:02}:{:02}.{:03}",
        total_secs / 3600,
        (total_secs / 60) % 60,
        total_secs % 60,
        ms
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // fit_dimension_sum tests
    // =========================================================================

    #[test]
    fn fit_landscape_over_limit() {
        // coef = 10000 / 10500; 6000 → 5714 - 5, 4500 → 4285 - 5
        let (w, h) = fit_dimension_sum((6000, 4500), 9999, 5);
        assert_eq!((w, h), (5709, 4280));
        assert!(w + h <= 9999);
    }

    #[test]
    fn fit_scales_height_from_original_height() {
        // Portrait input: height must come from 9000, not from the new width
        let (w, h) = fit_dimension_sum((2000, 9000), 9999, 5);
        assert_eq!((w, h), (1813, 8176));
    }

    #[test]
    fn fit_keeps_aspect_ratio_close() {
        let (w, h) = fit_dimension_sum((8000, 6000), 9999, 5);
        let before = 8000.0 / 6000.0;
        let after = w as f64 / h as f64;
        assert!((before - after).abs() < 0.01);
    }

    #[test]
    fn fit_never_collapses_an_axis() {
        let (w, h) = fit_dimension_sum((12000, 3), 9999, 5);
        assert_eq!(h, 1);
        assert!(w + h <= 9999);
    }

    #[test]
    fn fit_zero_dimensions_stay_zero() {
        assert_eq!(fit_dimension_sum((0, 0), 9999, 5), (0, 0));
    }

    #[test]
    fn fit_without_margin_can_touch_the_limit() {
        let (w, h) = fit_dimension_sum((10000, 10000), 9999, 0);
        assert_eq!((w, h), (5000, 5000));
    }

    // =========================================================================
    // preview offset + timestamp tests
    // =========================================================================

    #[test]
    fn preview_offset_is_midpoint() {
        assert_eq!(preview_offset(10.0), 5.0);
        assert_eq!(preview_offset(3.5), 1.75);
    }

    #[test]
    fn preview_offset_unknown_duration_is_start() {
        assert_eq!(preview_offset(0.0), 0.0);
        assert_eq!(preview_offset(-1.0), 0.0);
        assert_eq!(preview_offset(f64::NAN), 0.0);
    }

    #[test]
    fn timestamp_formats_all_fields() {
        assert_eq!(format_timestamp(0.0), "00:00:00.000");
        assert_eq!(format_timestamp(1.75), "00:00:01.750");
        assert_eq!(format_timestamp(3723.004), "01:02:03.004");
    }

    #[test]
    fn timestamp_does_not_wrap_hours() {
        assert_eq!(format_timestamp(25.0 * 3600.0), "25:00:00.000");
    }
}
