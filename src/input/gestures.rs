//! Gesture recognition for the pill
//!
//! One touch sequence at a time. Each sequence commits to at most one
//! direction, and the commit never changes until the finger lifts:
//! - Left / right / up commit and arm a hold timer; release before the
//!   timer sends the base gesture, the timer firing first sends the hold
//!   gesture and the base gesture is dropped
//! - Down fires immediately and ends the sequence's gesture work
//! - On a hidden pill only an upward swipe counts, and it reveals the pill
//!
//! Taps, double taps and long presses come from the `TapClassifier`
//! running on the same stream. The recognizer knows nothing about the
//! surface: callers pass a `PillView` snapshot and act on `PillEvent`s.

use std::time::{Duration, Instant};

use tracing::debug;

use super::actions::{Gesture, Section};
use super::tap::{TapClassifier, TapConfig, TapEvent};
use super::touch::TouchEvent;
use crate::config::PillSettings;
use crate::shell::geometry::OverlayGeometry;
use crate::shell::primitives::{Point, Size};
use crate::timers::TimerQueue;

/// Hold-eligible swipe directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Left,
    Right,
}

impl Direction {
    pub fn base(self) -> Gesture {
        match self {
            Direction::Up => Gesture::Up,
            Direction::Left => Gesture::Left,
            Direction::Right => Gesture::Right,
        }
    }

    pub fn hold(self) -> Gesture {
        match self {
            Direction::Up => Gesture::UpHold,
            Direction::Left => Gesture::LeftHold,
            Direction::Right => Gesture::RightHold,
        }
    }
}

/// Configuration for gesture recognition
#[derive(Debug, Clone)]
pub struct GestureConfig {
    /// Sideways travel (px) before left/right commits
    pub x_threshold: f64,
    /// Vertical travel (px) before up/down commits
    pub y_threshold: f64,
    /// How long a committed swipe must be held for the hold variant
    pub hold_time: Duration,
    /// Follow the finger while a swipe is committed
    pub drag: bool,
    pub tap: TapConfig,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            x_threshold: 40.0,
            y_threshold: 30.0,
            hold_time: Duration::from_millis(500),
            drag: true,
            tap: TapConfig::default(),
        }
    }
}

impl GestureConfig {
    pub fn from_settings(settings: &PillSettings) -> Self {
        Self {
            x_threshold: settings.x_threshold,
            y_threshold: settings.y_threshold,
            hold_time: settings.hold_time,
            drag: !settings.anim_duration.is_zero(),
            tap: TapConfig::default(),
        }
    }
}

/// What the recognizer needs to know about the overlay right now
#[derive(Debug, Clone, Copy)]
pub struct PillView {
    pub hidden: bool,
    /// A hide/show animation is running
    pub transitioning: bool,
    pub geometry: OverlayGeometry,
    pub screen: Size,
    /// Double tap is mapped to something; single taps then wait for the
    /// double-tap window
    pub double_tap_enabled: bool,
    /// Device is in lock-task (pinned) mode
    pub pinned: bool,
}

/// Outputs for the coordinator to act on, in order
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PillEvent {
    /// Finger down on the pill
    TouchStarted,
    /// Move the pill by this much (pill frame: along the edge, away from it)
    Drag { along: f64, across: f64 },
    Gesture {
        gesture: Gesture,
        section: Option<Section>,
    },
    /// Swipe up or tap on a hidden pill
    Reveal { feedback: bool },
    /// Long press while pinned: show the nav bar instead of the hold action
    PinnedHold,
    /// Finger lifted or sequence cancelled; animate back home
    TouchEnded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Touching,
    Committed(Direction),
    HoldFired(Direction),
    /// A discrete action (down, hold, double tap) is in flight
    Acting,
    /// Waiting for the pill to return home
    Releasing,
}

/// Per-touch-sequence state
#[derive(Debug, Clone)]
pub struct GestureState {
    pub origin: Point,
    pub last: Point,
    pub section: Option<Section>,
    pub was_hidden: bool,
    pub committed: Option<Direction>,
    pub hold_fired: bool,
    pub acting: bool,
    pub revealed: bool,
    /// Started mid-transition; every event is dropped until release
    pub ignored: bool,
}

impl GestureState {
    fn new(origin: Point, section: Option<Section>, was_hidden: bool, ignored: bool) -> Self {
        Self {
            origin,
            last: origin,
            section,
            was_hidden,
            committed: None,
            hold_fired: false,
            acting: false,
            revealed: false,
            ignored,
        }
    }
}

pub struct GestureRecognizer {
    pub config: GestureConfig,
    phase: Phase,
    state: Option<GestureState>,
    /// Acting outlives the touch until the pill is home again
    acting: bool,
    holds: TimerQueue<Direction>,
    tap: TapClassifier,
    /// Tap already sent from `SingleTapUp`; the confirm must not resend it
    tap_sent_early: bool,
}

impl GestureRecognizer {
    pub fn new(config: GestureConfig) -> Self {
        let tap = TapClassifier::new(config.tap);
        Self {
            config,
            phase: Phase::Idle,
            state: None,
            acting: false,
            holds: TimerQueue::new(),
            tap,
            tap_sent_early: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> Option<&GestureState> {
        self.state.as_ref()
    }

    pub fn is_acting(&self) -> bool {
        self.acting
    }

    pub fn set_config(&mut self, config: GestureConfig) {
        self.tap.config = config.tap;
        self.config = config;
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.holds.next_deadline(), self.tap.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn handle(&mut self, event: TouchEvent, view: &PillView, now: Instant) -> Vec<PillEvent> {
        match event {
            TouchEvent::Down { x, y } => self.touch_down(Point::new(x, y), view, now),
            TouchEvent::Motion { x, y } => self.touch_motion(Point::new(x, y), view, now),
            TouchEvent::Up { .. } => self.touch_up(view, now),
            TouchEvent::Cancel => self.force_finish(),
        }
    }

    fn touch_down(&mut self, pos: Point, view: &PillView, now: Instant) -> Vec<PillEvent> {
        if self.phase == Phase::Releasing {
            self.finish_release();
        }

        if view.transitioning {
            debug!("Touch down during hide/show transition, ignoring sequence");
            self.state = Some(GestureState::new(pos, None, view.hidden, true));
            return Vec::new();
        }

        let length = view.geometry.length() as f64;
        let along = view.geometry.along_axis_position(view.screen, pos.x, pos.y);
        let section = (length > 0.0).then(|| Section::from_position(along, length));

        self.state = Some(GestureState::new(pos, section, view.hidden, false));
        self.phase = Phase::Touching;
        self.holds.clear();

        let mut out = vec![PillEvent::TouchStarted];
        if let Some(TapEvent::DoubleTap) = self.tap.down(now, pos) {
            self.tap_sent_early = false;
            if !view.hidden && !self.acting {
                self.start_acting();
                out.push(PillEvent::Gesture {
                    gesture: Gesture::DoubleTap,
                    section,
                });
            }
        }
        out
    }

    fn touch_motion(&mut self, pos: Point, view: &PillView, now: Instant) -> Vec<PillEvent> {
        let Some(state) = self.state.as_mut() else {
            return Vec::new();
        };
        if state.ignored {
            return Vec::new();
        }

        let orientation = view.geometry.orientation;
        let (dx, dy) = orientation.to_pill_frame(pos.x - state.origin.x, pos.y - state.origin.y);
        let (step_x, step_y) = orientation.to_pill_frame(pos.x - state.last.x, pos.y - state.last.y);
        state.last = pos;

        self.tap.motion(pos);

        let mut out = Vec::new();
        let x_t = self.config.x_threshold;
        let y_t = self.config.y_threshold;
        let hidden = view.hidden;

        if state.committed.is_none() && !hidden && !self.acting && !state.acting {
            let commit = if dx < -x_t && dy.abs() <= dx.abs() {
                Some(Direction::Left)
            } else if dx > x_t && dy.abs() <= dx.abs() {
                Some(Direction::Right)
            } else if dy > y_t && dy.abs() > dx.abs() {
                self.tap.cancel_touch();
                debug!("Swipe down");
                let section = state.section;
                state.acting = true;
                self.acting = true;
                self.phase = Phase::Acting;
                out.push(PillEvent::Gesture {
                    gesture: Gesture::Down,
                    section,
                });
                return out;
            } else if dy < -y_t && dy.abs() > dx.abs() {
                Some(Direction::Up)
            } else {
                None
            };

            if let Some(direction) = commit {
                debug!(?direction, "Swipe committed");
                state.committed = Some(direction);
                self.phase = Phase::Committed(direction);
                self.tap.cancel_touch();
                self.holds.clear();
                self.holds.arm(direction, now, self.config.hold_time);
            }
        } else if hidden
            && !self.acting
            && !state.revealed
            && dy < -y_t
            && dy.abs() > dx.abs()
        {
            debug!("Swipe up on hidden pill, revealing");
            state.revealed = true;
            self.tap.cancel_touch();
            out.push(PillEvent::Reveal { feedback: false });
            return out;
        }

        if self.config.drag && !state.hold_fired {
            match state.committed {
                Some(Direction::Up) => out.push(PillEvent::Drag {
                    along: 0.0,
                    across: -step_y / 2.0,
                }),
                Some(Direction::Left) | Some(Direction::Right) => out.push(PillEvent::Drag {
                    along: step_x / 2.0,
                    across: 0.0,
                }),
                None => {}
            }
        }
        out
    }

    fn touch_up(&mut self, view: &PillView, now: Instant) -> Vec<PillEvent> {
        self.holds.clear();
        let Some(state) = self.state.take() else {
            return Vec::new();
        };
        if state.ignored {
            self.tap.reset();
            self.phase = Phase::Idle;
            return Vec::new();
        }

        let mut out = Vec::new();

        if let Some(TapEvent::SingleTapUp) = self.tap.up(now) {
            self.tap_sent_early = false;
            if !view.double_tap_enabled && !self.acting && !state.was_hidden {
                self.tap_sent_early = true;
                out.push(PillEvent::Gesture {
                    gesture: Gesture::Tap,
                    section: state.section,
                });
            }
        }

        if let Some(direction) = state.committed {
            if !state.hold_fired && !state.was_hidden {
                out.push(PillEvent::Gesture {
                    gesture: direction.base(),
                    section: state.section,
                });
            }
        }

        self.phase = Phase::Releasing;
        out.push(PillEvent::TouchEnded);
        out
    }

    /// Fire due hold, long-press and tap-confirm timers
    pub fn on_timer(&mut self, view: &PillView, now: Instant) -> Vec<PillEvent> {
        let mut out = Vec::new();

        for direction in self.holds.take_due(now) {
            let Some(state) = self.state.as_mut() else { continue };
            if state.committed == Some(direction) && !state.hold_fired {
                debug!(?direction, "Hold fired");
                state.hold_fired = true;
                self.phase = Phase::HoldFired(direction);
                out.push(PillEvent::Gesture {
                    gesture: direction.hold(),
                    section: state.section,
                });
            }
        }

        for event in self.tap.on_timer(now) {
            match event {
                TapEvent::LongPress => {
                    let Some(state) = self.state.as_mut() else { continue };
                    if view.hidden || self.acting || state.acting || state.committed.is_some() {
                        continue;
                    }
                    if view.pinned {
                        out.push(PillEvent::PinnedHold);
                    } else {
                        let section = state.section;
                        state.acting = true;
                        self.acting = true;
                        self.phase = Phase::Acting;
                        out.push(PillEvent::Gesture {
                            gesture: Gesture::Hold,
                            section,
                        });
                    }
                }
                TapEvent::SingleTapConfirmed => {
                    if std::mem::take(&mut self.tap_sent_early) {
                        continue;
                    }
                    if view.hidden {
                        out.push(PillEvent::Reveal { feedback: true });
                    } else if !self.acting {
                        out.push(PillEvent::Gesture {
                            gesture: Gesture::Tap,
                            section: None,
                        });
                    }
                }
                TapEvent::SingleTapUp | TapEvent::DoubleTap => {}
            }
        }
        out
    }

    /// The pill is back home after a release
    pub fn finish_release(&mut self) {
        if self.phase == Phase::Releasing {
            self.phase = Phase::Idle;
        }
        self.acting = false;
    }

    /// Drop the current sequence and every pending timer (rotation, screen
    /// off, deactivation). Returns `TouchEnded` if a touch was in progress.
    pub fn force_finish(&mut self) -> Vec<PillEvent> {
        let had_touch = self.state.take().map(|s| !s.ignored).unwrap_or(false);
        let was_releasing = self.phase == Phase::Releasing;
        self.holds.clear();
        self.tap.reset();
        self.tap_sent_early = false;
        self.acting = false;
        self.phase = Phase::Idle;
        if had_touch || was_releasing {
            vec![PillEvent::TouchEnded]
        } else {
            Vec::new()
        }
    }

    fn start_acting(&mut self) {
        self.acting = true;
        self.phase = Phase::Acting;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::geometry::{compute_geometry, LayoutInputs, Orientation};
    use crate::shell::primitives::Rotation;

    const SCREEN: Size = Size { w: 1080, h: 2160 };

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn view() -> PillView {
        let inputs = LayoutInputs {
            screen: SCREEN,
            rotation: Rotation::R0,
            ..Default::default()
        };
        PillView {
            hidden: false,
            transitioning: false,
            geometry: compute_geometry(&inputs, &PillSettings::default()),
            screen: SCREEN,
            double_tap_enabled: false,
            pinned: false,
        }
    }

    fn down(x: f64, y: f64) -> TouchEvent {
        TouchEvent::Down { x, y }
    }

    fn motion(x: f64, y: f64) -> TouchEvent {
        TouchEvent::Motion { x, y }
    }

    fn up(x: f64, y: f64) -> TouchEvent {
        TouchEvent::Up { x, y }
    }

    fn gestures(events: &[PillEvent]) -> Vec<Gesture> {
        events
            .iter()
            .filter_map(|e| match e {
                PillEvent::Gesture { gesture, .. } => Some(*gesture),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_swipe_up_released_before_hold() {
        let t0 = Instant::now();
        let v = view();
        let mut r = GestureRecognizer::new(GestureConfig::default());

        let out = r.handle(down(540.0, 2110.0), &v, t0);
        assert_eq!(out, vec![PillEvent::TouchStarted]);
        r.handle(motion(540.0, 2010.0), &v, t0 + ms(50));
        assert_eq!(r.phase(), Phase::Committed(Direction::Up));

        assert!(gestures(&r.on_timer(&v, t0 + ms(200))).is_empty());
        let out = r.handle(up(540.0, 2010.0), &v, t0 + ms(200));
        assert_eq!(gestures(&out), vec![Gesture::Up]);
        assert_eq!(out.last(), Some(&PillEvent::TouchEnded));
        assert_eq!(r.phase(), Phase::Releasing);
        assert_eq!(r.next_deadline(), None);
    }

    #[test]
    fn test_hold_fires_once_and_suppresses_base() {
        let t0 = Instant::now();
        let v = view();
        let mut r = GestureRecognizer::new(GestureConfig::default());

        r.handle(down(540.0, 2110.0), &v, t0);
        r.handle(motion(540.0, 2010.0), &v, t0 + ms(50));
        assert_eq!(r.next_deadline(), Some(t0 + ms(550)));

        assert!(gestures(&r.on_timer(&v, t0 + ms(549))).is_empty());
        let out = r.on_timer(&v, t0 + ms(550));
        assert_eq!(gestures(&out), vec![Gesture::UpHold]);
        assert_eq!(r.phase(), Phase::HoldFired(Direction::Up));
        assert!(gestures(&r.on_timer(&v, t0 + ms(2000))).is_empty());

        let out = r.handle(up(540.0, 2010.0), &v, t0 + ms(600));
        assert!(gestures(&out).is_empty());
    }

    #[test]
    fn test_commit_is_monotonic() {
        let t0 = Instant::now();
        let v = view();
        let mut r = GestureRecognizer::new(GestureConfig::default());

        r.handle(down(540.0, 2110.0), &v, t0);
        r.handle(motion(540.0, 2050.0), &v, t0 + ms(10));
        // Swinging far left afterwards must not switch the commit
        let out = r.handle(motion(300.0, 2050.0), &v, t0 + ms(20));
        assert!(gestures(&out).is_empty());
        assert_eq!(r.state().and_then(|s| s.committed), Some(Direction::Up));
        let out = r.handle(up(300.0, 2050.0), &v, t0 + ms(30));
        assert_eq!(gestures(&out), vec![Gesture::Up]);
    }

    #[test]
    fn test_tie_break_order() {
        let t0 = Instant::now();
        let v = view();

        // Exact diagonal goes sideways: |dy| <= |dx| is checked first
        let mut r = GestureRecognizer::new(GestureConfig::default());
        r.handle(down(540.0, 2110.0), &v, t0);
        r.handle(motion(490.0, 2060.0), &v, t0 + ms(10));
        assert_eq!(r.phase(), Phase::Committed(Direction::Left));

        let mut r = GestureRecognizer::new(GestureConfig::default());
        r.handle(down(540.0, 2110.0), &v, t0);
        r.handle(motion(600.0, 2100.0), &v, t0 + ms(10));
        assert_eq!(r.phase(), Phase::Committed(Direction::Right));

        // Below both thresholds nothing commits
        let mut r = GestureRecognizer::new(GestureConfig::default());
        r.handle(down(540.0, 2110.0), &v, t0);
        r.handle(motion(560.0, 2090.0), &v, t0 + ms(10));
        assert_eq!(r.phase(), Phase::Touching);
    }

    #[test]
    fn test_swipe_down_fires_immediately() {
        let t0 = Instant::now();
        let v = view();
        let mut r = GestureRecognizer::new(GestureConfig::default());

        r.handle(down(540.0, 2110.0), &v, t0);
        let out = r.handle(motion(545.0, 2150.0), &v, t0 + ms(30));
        assert_eq!(gestures(&out), vec![Gesture::Down]);
        assert!(r.is_acting());

        // Nothing else may commit in this sequence
        let out = r.handle(motion(300.0, 2150.0), &v, t0 + ms(40));
        assert!(gestures(&out).is_empty());
        let out = r.handle(up(300.0, 2150.0), &v, t0 + ms(50));
        assert!(gestures(&out).is_empty());

        r.finish_release();
        assert!(!r.is_acting());
        assert_eq!(r.phase(), Phase::Idle);
    }

    #[test]
    fn test_hidden_pill_only_reveals_on_swipe_up() {
        let t0 = Instant::now();
        let mut v = view();
        v.hidden = true;
        let mut r = GestureRecognizer::new(GestureConfig::default());

        r.handle(down(540.0, 2150.0), &v, t0);
        assert!(r.handle(motion(400.0, 2150.0), &v, t0 + ms(10)).is_empty());
        let out = r.handle(motion(400.0, 2000.0), &v, t0 + ms(20));
        assert_eq!(out, vec![PillEvent::Reveal { feedback: false }]);
        // Once per touch
        assert!(r.handle(motion(400.0, 1900.0), &v, t0 + ms(30)).is_empty());
        let out = r.handle(up(400.0, 1900.0), &v, t0 + ms(40));
        assert_eq!(out, vec![PillEvent::TouchEnded]);
    }

    #[test]
    fn test_vertical_orientation_maps_axes() {
        let t0 = Instant::now();
        let mut settings = PillSettings::default();
        settings.anchor_pill = true;
        let screen = Size::new(2160, 1080);
        let inputs = LayoutInputs {
            screen,
            rotation: Rotation::R90,
            ..Default::default()
        };
        let geometry = compute_geometry(&inputs, &settings);
        assert_eq!(geometry.orientation, Orientation::Vertical);
        let v = PillView {
            geometry,
            screen,
            ..view()
        };
        let b = geometry.bounds(screen);
        let (cx, cy) = ((b.x + b.width / 2) as f64, (b.y + b.height / 2) as f64);

        let mut r = GestureRecognizer::new(GestureConfig::default());
        r.handle(down(cx, cy), &v, t0);
        // Away from the right edge is "up"
        r.handle(motion(cx - 80.0, cy), &v, t0 + ms(10));
        assert_eq!(r.phase(), Phase::Committed(Direction::Up));

        let mut r = GestureRecognizer::new(GestureConfig::default());
        r.handle(down(cx, cy), &v, t0);
        // Screen up runs along the pill towards its "right"
        r.handle(motion(cx, cy - 80.0), &v, t0 + ms(10));
        assert_eq!(r.phase(), Phase::Committed(Direction::Right));
    }

    #[test]
    fn test_section_from_origin() {
        let t0 = Instant::now();
        let v = view();
        let b = v.geometry.bounds(SCREEN);
        let mut r = GestureRecognizer::new(GestureConfig::default());

        r.handle(down(b.x as f64 + 5.0, 2110.0), &v, t0);
        r.handle(motion(b.x as f64 + 5.0, 2000.0), &v, t0 + ms(10));
        let out = r.handle(up(b.x as f64 + 5.0, 2000.0), &v, t0 + ms(20));
        assert!(out.contains(&PillEvent::Gesture {
            gesture: Gesture::Up,
            section: Some(Section::Left),
        }));
    }

    #[test]
    fn test_sequence_started_mid_transition_is_ignored() {
        let t0 = Instant::now();
        let mut v = view();
        v.transitioning = true;
        let mut r = GestureRecognizer::new(GestureConfig::default());

        assert!(r.handle(down(540.0, 2110.0), &v, t0).is_empty());
        v.transitioning = false;
        assert!(r.handle(motion(540.0, 1900.0), &v, t0 + ms(10)).is_empty());
        assert!(r.handle(up(540.0, 1900.0), &v, t0 + ms(20)).is_empty());
        assert_eq!(r.phase(), Phase::Idle);
    }

    #[test]
    fn test_tap_sent_immediately_without_double_tap() {
        let t0 = Instant::now();
        let v = view();
        let mut r = GestureRecognizer::new(GestureConfig::default());

        r.handle(down(540.0, 2110.0), &v, t0);
        let out = r.handle(up(540.0, 2110.0), &v, t0 + ms(60));
        assert_eq!(gestures(&out), vec![Gesture::Tap]);
        r.finish_release();
        assert!(gestures(&r.on_timer(&v, t0 + ms(500))).is_empty());
    }

    #[test]
    fn test_tap_waits_for_double_tap_window() {
        let t0 = Instant::now();
        let mut v = view();
        v.double_tap_enabled = true;
        let mut r = GestureRecognizer::new(GestureConfig::default());

        r.handle(down(540.0, 2110.0), &v, t0);
        assert!(gestures(&r.handle(up(540.0, 2110.0), &v, t0 + ms(60))).is_empty());
        r.finish_release();
        assert_eq!(gestures(&r.on_timer(&v, t0 + ms(400))), vec![Gesture::Tap]);

        // Two quick taps become one double tap
        let t1 = t0 + ms(1000);
        r.handle(down(540.0, 2110.0), &v, t1);
        r.handle(up(540.0, 2110.0), &v, t1 + ms(50));
        r.finish_release();
        let out = r.handle(down(540.0, 2110.0), &v, t1 + ms(150));
        assert_eq!(gestures(&out), vec![Gesture::DoubleTap]);
        r.handle(up(540.0, 2110.0), &v, t1 + ms(200));
        r.finish_release();
        assert!(gestures(&r.on_timer(&v, t1 + ms(1000))).is_empty());
    }

    #[test]
    fn test_tap_on_hidden_pill_reveals() {
        let t0 = Instant::now();
        let mut v = view();
        v.hidden = true;
        let mut r = GestureRecognizer::new(GestureConfig::default());

        r.handle(down(540.0, 2150.0), &v, t0);
        assert!(gestures(&r.handle(up(540.0, 2150.0), &v, t0 + ms(60))).is_empty());
        let out = r.on_timer(&v, t0 + ms(400));
        assert_eq!(out, vec![PillEvent::Reveal { feedback: true }]);
    }

    #[test]
    fn test_long_press_and_pinned_hold() {
        let t0 = Instant::now();
        let mut v = view();
        let mut r = GestureRecognizer::new(GestureConfig::default());

        r.handle(down(540.0, 2110.0), &v, t0);
        assert_eq!(gestures(&r.on_timer(&v, t0 + ms(500))), vec![Gesture::Hold]);
        let out = r.handle(up(540.0, 2110.0), &v, t0 + ms(700));
        assert!(gestures(&out).is_empty());
        r.finish_release();

        v.pinned = true;
        let t1 = t0 + ms(2000);
        r.handle(down(540.0, 2110.0), &v, t1);
        assert_eq!(r.on_timer(&v, t1 + ms(500)), vec![PillEvent::PinnedHold]);
    }

    #[test]
    fn test_force_finish_clears_everything() {
        let t0 = Instant::now();
        let v = view();
        let mut r = GestureRecognizer::new(GestureConfig::default());

        r.handle(down(540.0, 2110.0), &v, t0);
        r.handle(motion(540.0, 2000.0), &v, t0 + ms(10));
        assert!(r.next_deadline().is_some());
        assert_eq!(r.force_finish(), vec![PillEvent::TouchEnded]);
        assert_eq!(r.phase(), Phase::Idle);
        assert_eq!(r.next_deadline(), None);
        assert!(r.state().is_none());
        assert!(r.force_finish().is_empty());
    }

    #[test]
    fn test_drag_follows_committed_swipe() {
        let t0 = Instant::now();
        let v = view();
        let mut r = GestureRecognizer::new(GestureConfig::default());

        r.handle(down(540.0, 2110.0), &v, t0);
        let out = r.handle(motion(540.0, 2070.0), &v, t0 + ms(10));
        assert_eq!(out, vec![PillEvent::Drag { along: 0.0, across: 20.0 }]);

        let mut r = GestureRecognizer::new(GestureConfig {
            drag: false,
            ..Default::default()
        });
        r.handle(down(540.0, 2110.0), &v, t0);
        assert!(r.handle(motion(540.0, 2070.0), &v, t0 + ms(10)).is_empty());
    }
}
