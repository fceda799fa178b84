//! Timing of periodically shown overlays.

/// When a timed overlay is visible: for the first `duration` seconds, then
/// for `duration` seconds at the start of every `interval`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayWindow {
    pub duration: u64,
    pub interval: u64,
}

impl OverlayWindow {
    /// Compute the window for an entry producing `effective_duration` seconds.
    ///
    /// Both values are truncated to whole seconds. An interval longer than
    /// the entry is replaced by `effective_duration / fallback_divisor` when
    /// the divisor is positive, so the overlay still repeats at least once.
    /// The interval never drops below one second.
    pub fn new(duration: f64, interval: f64, effective_duration: f64, fallback_divisor: i64) -> Self {
        let duration = whole_seconds(duration);
        let mut interval = whole_seconds(interval);

        if interval as f64 > effective_duration && fallback_divisor > 0 {
            interval = whole_seconds(effective_duration / fallback_divisor as f64);
        }

        Self {
            duration,
            interval: interval.max(1),
        }
    }

    /// Value for a filter's `enable` option.
    pub fn enable_expression(&self) -> String {
        format!(
            "if( between( t, 0, {d} ), 1, lte( mod( t, {i} ), {d}) )",
            d = self.duration,
            i = self.interval
        )
    }
}

fn whole_seconds(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.trunc() as u64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_kept_when_it_fits() {
        let window = OverlayWindow::new(5.0, 30.0, 120.0, 2);
        assert_eq!(window, OverlayWindow { duration: 5, interval: 30 });
    }

    #[test]
    fn test_fallback_divisor() {
        assert_eq!(OverlayWindow::new(5.0, 100.0, 40.0, 2).interval, 20);
        assert_eq!(OverlayWindow::new(3.0, 10.0, 8.0, 2).interval, 4);
    }

    #[test]
    fn test_no_fallback_without_divisor() {
        assert_eq!(OverlayWindow::new(3.0, 10.0, 8.0, 0).interval, 10);
        assert_eq!(OverlayWindow::new(3.0, 10.0, 8.0, -1).interval, 10);
    }

    #[test]
    fn test_truncates_to_whole_seconds() {
        let window = OverlayWindow::new(2.9, 10.7, 100.0, 2);
        assert_eq!(window, OverlayWindow { duration: 2, interval: 10 });
    }

    #[test]
    fn test_zero_interval_clamped() {
        assert_eq!(OverlayWindow::new(1.0, 10.0, 1.0, 2).interval, 1);
        assert_eq!(OverlayWindow::new(1.0, 0.0, 100.0, 2).interval, 1);
    }

    #[test]
    fn test_enable_expression() {
        let window = OverlayWindow { duration: 3, interval: 4 };
        assert_eq!(
            window.enable_expression(),
            "if( between( t, 0, 3 ), 1, lte( mod( t, 4 ), 3) )"
        );
    }
}
