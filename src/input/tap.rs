//! Tap / double-tap / long-press classifier
//!
//! Runs alongside the swipe recognizer on the same touch stream. Timing
//! thresholds are platform constants, not user settings.

use std::time::{Duration, Instant};

use crate::shell::primitives::Point;
use crate::timers::TimerQueue;

/// Platform timing and distance thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TapConfig {
    pub tap_timeout: Duration,
    pub double_tap_timeout: Duration,
    pub long_press_timeout: Duration,
    /// Movement (px) before a touch stops being a tap
    pub touch_slop: f64,
    /// Max distance (px) between the two taps of a double tap
    pub double_tap_slop: f64,
}

impl Default for TapConfig {
    fn default() -> Self {
        Self {
            tap_timeout: Duration::from_millis(100),
            double_tap_timeout: Duration::from_millis(300),
            long_press_timeout: Duration::from_millis(500),
            touch_slop: 16.0,
            double_tap_slop: 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapEvent {
    /// Finger lifted inside the tap region (may become a double tap)
    SingleTapUp,
    /// Second tap landed inside the double-tap window
    DoubleTap,
    /// Double-tap window expired after a single tap
    SingleTapConfirmed,
    /// Finger held still past the long-press timeout
    LongPress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TapTimer {
    LongPress,
    Confirm,
}

#[derive(Debug, Default)]
pub struct TapClassifier {
    pub config: TapConfig,
    timers: TimerQueue<TapTimer>,
    down_at: Option<Point>,
    in_tap_region: bool,
    long_pressed: bool,
    double_tapping: bool,
    /// Where the previous tap landed, while its confirm window is open
    previous_tap: Option<Point>,
}

impl TapClassifier {
    pub fn new(config: TapConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn down(&mut self, now: Instant, pos: Point) -> Option<TapEvent> {
        self.down_at = Some(pos);
        self.in_tap_region = true;
        self.long_pressed = false;
        self.double_tapping = false;

        let second_tap = self.timers.is_armed(&TapTimer::Confirm)
            && self
                .previous_tap
                .map(|prev| pos.delta_from(prev).distance() <= self.config.double_tap_slop)
                .unwrap_or(false);

        self.timers.cancel(&TapTimer::Confirm);
        self.previous_tap = None;

        if second_tap {
            self.double_tapping = true;
            return Some(TapEvent::DoubleTap);
        }

        self.timers
            .arm(TapTimer::LongPress, now, self.config.long_press_timeout);
        None
    }

    pub fn motion(&mut self, pos: Point) {
        let Some(origin) = self.down_at else { return };
        if self.in_tap_region && pos.delta_from(origin).distance() > self.config.touch_slop {
            self.in_tap_region = false;
            self.timers.cancel(&TapTimer::LongPress);
        }
    }

    pub fn up(&mut self, now: Instant) -> Option<TapEvent> {
        self.timers.cancel(&TapTimer::LongPress);
        let origin = self.down_at.take();

        if self.double_tapping || self.long_pressed || !self.in_tap_region {
            self.double_tapping = false;
            return None;
        }

        self.previous_tap = origin;
        self.timers
            .arm(TapTimer::Confirm, now, self.config.double_tap_timeout);
        Some(TapEvent::SingleTapUp)
    }

    /// Drop the tap path for the current touch (a swipe took over)
    pub fn cancel_touch(&mut self) {
        self.in_tap_region = false;
        self.timers.cancel(&TapTimer::LongPress);
    }

    pub fn reset(&mut self) {
        self.timers.clear();
        self.down_at = None;
        self.in_tap_region = false;
        self.long_pressed = false;
        self.double_tapping = false;
        self.previous_tap = None;
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    pub fn on_timer(&mut self, now: Instant) -> Vec<TapEvent> {
        let mut events = Vec::new();
        for timer in self.timers.take_due(now) {
            match timer {
                TapTimer::LongPress => {
                    if self.down_at.is_some() && self.in_tap_region {
                        self.long_pressed = true;
                        events.push(TapEvent::LongPress);
                    }
                }
                TapTimer::Confirm => {
                    self.previous_tap = None;
                    events.push(TapEvent::SingleTapConfirmed);
                }
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_single_tap_then_confirm() {
        let t0 = Instant::now();
        let mut tap = TapClassifier::new(TapConfig::default());
        let p = Point::new(100.0, 10.0);
        assert_eq!(tap.down(t0, p), None);
        assert_eq!(tap.up(t0 + ms(80)), Some(TapEvent::SingleTapUp));
        assert!(tap.on_timer(t0 + ms(200)).is_empty());
        assert_eq!(tap.on_timer(t0 + ms(400)), vec![TapEvent::SingleTapConfirmed]);
        assert_eq!(tap.next_deadline(), None);
    }

    #[test]
    fn test_double_tap_suppresses_confirm() {
        let t0 = Instant::now();
        let mut tap = TapClassifier::new(TapConfig::default());
        let p = Point::new(100.0, 10.0);
        tap.down(t0, p);
        tap.up(t0 + ms(50));
        assert_eq!(tap.down(t0 + ms(150), p), Some(TapEvent::DoubleTap));
        assert_eq!(tap.up(t0 + ms(200)), None);
        assert!(tap.on_timer(t0 + ms(1000)).is_empty());
    }

    #[test]
    fn test_long_press_and_no_tap_after() {
        let t0 = Instant::now();
        let mut tap = TapClassifier::new(TapConfig::default());
        tap.down(t0, Point::new(0.0, 0.0));
        assert_eq!(tap.on_timer(t0 + ms(500)), vec![TapEvent::LongPress]);
        assert_eq!(tap.up(t0 + ms(700)), None);
    }

    #[test]
    fn test_movement_beyond_slop_cancels() {
        let t0 = Instant::now();
        let mut tap = TapClassifier::new(TapConfig::default());
        tap.down(t0, Point::new(0.0, 0.0));
        tap.motion(Point::new(0.0, -40.0));
        assert!(tap.on_timer(t0 + ms(600)).is_empty());
        assert_eq!(tap.up(t0 + ms(650)), None);
    }
}
