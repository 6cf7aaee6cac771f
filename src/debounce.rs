//! Edge-triggered debouncing of a noisy digital input.
//!
//! Standard low-pass debounce: the raw line is accepted as a new stable
//! sample no more often than once per interval (20 ms on the reference
//! hardware), so electrical bounce shorter than the interval never
//! produces an edge. The cost is a few milliseconds of response latency.
//!
//! # Example
//!
//! ```rust
//! use stepfill::debounce::{DebouncedInput, Edge};
//!
//! // Active-low button on a pull-up: raw high = released
//! let mut button = DebouncedInput::active_low(20);
//!
//! assert_eq!(button.poll(true, 25), None);          // released, no change
//! assert_eq!(button.poll(false, 50), Some(Edge::Pressed));
//! assert_eq!(button.poll(false, 55), None);         // within interval, ignored
//! assert_eq!(button.poll(true, 80), Some(Edge::Released));
//! ```

/// A reported input state change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Edge {
    /// The input became pressed.
    Pressed,
    /// The input became released.
    Released,
}

/// Debounce state for one digital input.
///
/// Created at startup, polled every control-loop iteration with the raw
/// line level and the current time. Emits an [`Edge`] only when a newly
/// accepted stable sample differs from the previous stable state.
#[derive(Clone, Copy, Debug)]
pub struct DebouncedInput {
    interval_ms: u64,
    active_low: bool,
    last_sample_ms: u64,
    stable_pressed: bool,
}

impl DebouncedInput {
    /// Create a debouncer for an active-high input.
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            active_low: false,
            last_sample_ms: 0,
            stable_pressed: false,
        }
    }

    /// Create a debouncer for an active-low input (pull-up wiring, the
    /// reference hardware's convention).
    pub fn active_low(interval_ms: u64) -> Self {
        Self {
            active_low: true,
            ..Self::new(interval_ms)
        }
    }

    /// The current stable pressed state.
    pub fn is_pressed(&self) -> bool {
        self.stable_pressed
    }

    /// Sample the raw line level at `now_ms`.
    ///
    /// Accepts a sample only when at least the configured interval has
    /// elapsed since the last accepted one, and emits an edge only when
    /// the accepted state differs from the previous stable state.
    pub fn poll(&mut self, raw_level: bool, now_ms: u64) -> Option<Edge> {
        // Underflow guard: before one full interval has elapsed since
        // boot there is nothing meaningful to compare against.
        if now_ms < self.interval_ms {
            return None;
        }
        if self.last_sample_ms > now_ms - self.interval_ms {
            return None;
        }
        self.last_sample_ms = now_ms;

        let pressed = raw_level != self.active_low;
        if pressed == self.stable_pressed {
            return None;
        }
        self.stable_pressed = pressed;
        Some(if pressed { Edge::Pressed } else { Edge::Released })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: u64 = 20;

    #[test]
    fn no_sampling_before_first_interval() {
        let mut input = DebouncedInput::new(INTERVAL);
        assert_eq!(input.poll(true, 0), None);
        assert_eq!(input.poll(true, 10), None);
        assert_eq!(input.poll(true, 19), None);
        // First interval elapsed: press accepted
        assert_eq!(input.poll(true, 20), Some(Edge::Pressed));
    }

    #[test]
    fn bounce_within_interval_yields_one_edge() {
        let mut input = DebouncedInput::new(INTERVAL);
        let mut edges = 0;

        // Stable press at t=25
        if input.poll(true, 25).is_some() {
            edges += 1;
        }
        // Contact bounce: rapid raw transitions inside the interval
        for (raw, t) in [(false, 27), (true, 29), (false, 31), (true, 33)] {
            if input.poll(raw, t).is_some() {
                edges += 1;
            }
        }
        assert_eq!(edges, 1);
        assert!(input.is_pressed());
    }

    #[test]
    fn two_stable_presses_yield_alternating_edges() {
        let mut input = DebouncedInput::new(INTERVAL);

        assert_eq!(input.poll(true, 25), Some(Edge::Pressed));
        assert_eq!(input.poll(false, 50), Some(Edge::Released));
        assert_eq!(input.poll(true, 75), Some(Edge::Pressed));
        assert_eq!(input.poll(false, 100), Some(Edge::Released));
    }

    #[test]
    fn steady_level_emits_no_edges() {
        let mut input = DebouncedInput::new(INTERVAL);
        for t in (20..500).step_by(25) {
            assert_eq!(input.poll(false, t), None);
        }
    }

    #[test]
    fn active_low_inverts_raw_level() {
        let mut input = DebouncedInput::active_low(INTERVAL);

        // Raw high = released: no edge from the idle pull-up level
        assert_eq!(input.poll(true, 25), None);
        // Raw low = pressed
        assert_eq!(input.poll(false, 50), Some(Edge::Pressed));
        assert!(input.is_pressed());
        assert_eq!(input.poll(true, 75), Some(Edge::Released));
    }

    #[test]
    fn sample_exactly_on_interval_boundary() {
        let mut input = DebouncedInput::new(INTERVAL);
        assert_eq!(input.poll(true, 20), Some(Edge::Pressed));
        // Next accepted sample is at 40, not 39
        assert_eq!(input.poll(false, 39), None);
        assert_eq!(input.poll(false, 40), Some(Edge::Released));
    }
}
