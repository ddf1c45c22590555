//! Time-proportioning relay window.
//!
//! The PID output is a duration in `[0, window]` milliseconds. Within each
//! fixed-length window the SSR is driven high for the first `output`
//! milliseconds and low for the remainder, which turns the binary relay into
//! a duty-cycled heater drive.
//!
//! When a window elapses, the start time advances by exactly one window
//! length — never snapped to "now" — so scheduler jitter cannot accumulate
//! into duty-cycle drift.

/// Window state for time-proportioning control.
#[derive(Debug, Clone)]
pub struct RelayWindow {
    window_ms: u32,
    start_ms: u64,
}

impl RelayWindow {
    pub fn new(window_ms: u32) -> Self {
        Self {
            window_ms,
            start_ms: 0,
        }
    }

    /// Window length in milliseconds.
    pub fn window_ms(&self) -> u32 {
        self.window_ms
    }

    /// Re-anchor the window at `now`. Called once per run start.
    pub fn restart(&mut self, now_ms: u64) {
        self.start_ms = now_ms;
    }

    /// Decide the relay state for the current tick given the PID output.
    ///
    /// Returns `true` while the elapsed portion of the window is still
    /// within the commanded on-time.
    pub fn tick(&mut self, now_ms: u64, output_ms: f32) -> bool {
        let window = u64::from(self.window_ms);
        if now_ms.saturating_sub(self.start_ms) > window {
            self.start_ms += window;
        }
        output_ms > now_ms.saturating_sub(self.start_ms) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Count relay-on milliseconds over one window at 1 ms tick granularity.
    fn on_time_over_window(output_ms: f32, window_ms: u32, t0: u64) -> u32 {
        let mut w = RelayWindow::new(window_ms);
        w.restart(t0);
        let mut on = 0;
        for t in t0..t0 + u64::from(window_ms) {
            if w.tick(t, output_ms) {
                on += 1;
            }
        }
        on
    }

    #[test]
    fn duty_cycle_matches_output_exactly() {
        assert_eq!(on_time_over_window(500.0, 2000, 0), 500);
        assert_eq!(on_time_over_window(1999.0, 2000, 0), 1999);
        assert_eq!(on_time_over_window(0.0, 2000, 0), 0);
        assert_eq!(on_time_over_window(2000.0, 2000, 0), 2000);
    }

    #[test]
    fn duty_cycle_is_anchor_independent() {
        assert_eq!(on_time_over_window(750.0, 2000, 123_456), 750);
    }

    #[test]
    fn rollover_advances_by_exactly_one_window() {
        let mut w = RelayWindow::new(2000);
        w.restart(1000);
        // Just past the first window boundary: elapsed resets relative to
        // start + window, not to "now".
        assert!(w.tick(3050, 100.0)); // elapsed 50 < 100 in the new window
        assert!(!w.tick(3150, 100.0)); // elapsed 150 >= 100
    }

    #[test]
    fn late_tick_does_not_snap_window_to_now() {
        let mut w = RelayWindow::new(2000);
        w.restart(0);
        // A tick arriving 300 ms late into the second window still sees
        // 300 ms already elapsed — the window did not restart at the tick.
        assert!(!w.tick(2300, 200.0));
    }

    #[test]
    fn output_of_zero_never_fires_relay() {
        let mut w = RelayWindow::new(2000);
        w.restart(0);
        for t in 0..6000 {
            assert!(!w.tick(t, 0.0));
        }
    }
}
