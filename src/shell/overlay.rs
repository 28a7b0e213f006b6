//! Pill overlay position and visibility
//!
//! The coordinator owns the hidden-pill reason log and decides when the
//! pill is hidden, shown, faded or moved. It talks to the real window only
//! through `OverlaySurface`, so it runs unchanged against a headless
//! surface in tests.
//!
//! Rules it keeps:
//! - The pill is exactly one of visible, hidden, hiding or showing; hide
//!   and show requests that arrive mid-transition are remembered and
//!   re-checked against the log when the transition ends
//! - A hide while the finger is down waits for the finger to lift
//! - Show only leaves the hidden state once the log is empty, unless forced
//! - Layout changes wait while a touch or a transition owns the position;
//!   only the latest geometry is applied
//! - Animations complete through keyed timers carrying a token, so a
//!   superseded animation's completion is discarded

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::geometry::{compute_geometry, LayoutInputs, OverlayGeometry, Orientation};
use super::primitives::{ALPHA_ACTIVE, ALPHA_HIDDEN};
use crate::config::{Appearance, PillSettings};
use crate::error::SurfaceError;
use crate::reasons::{HiddenReason, HiddenReasonLog};
use crate::timers::TimerQueue;

/// Shortest time a show may take to complete
const MIN_SHOW_COMPLETION: Duration = Duration::from_millis(12);

/// Target state for an animated surface change
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceFrame {
    pub geometry: OverlayGeometry,
    pub alpha: f64,
    /// Content offset towards the anchored edge (the pill tucks half away
    /// when hidden)
    pub translation: f64,
}

/// Window operations the coordinator needs from the platform
pub trait OverlaySurface {
    fn attach(
        &mut self,
        geometry: &OverlayGeometry,
        appearance: &Appearance,
    ) -> Result<(), SurfaceError>;
    fn detach(&mut self) -> Result<(), SurfaceError>;
    fn update_layout(&mut self, geometry: &OverlayGeometry) -> Result<(), SurfaceError>;
    fn animate_to(&mut self, frame: &SurfaceFrame, duration: Duration) -> Result<(), SurfaceError>;
    fn set_appearance(&mut self, appearance: &Appearance) -> Result<(), SurfaceError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
    Hiding,
    Showing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimStep {
    HideMove,
    HideTuck,
    ShowUntuck,
    ShowMove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayTimer {
    /// Re-hide keyed by the reason that picked the delay
    Hide(HiddenReason),
    Fade,
    Transition { token: u64, step: AnimStep },
    Return { token: u64 },
}

/// Things the owner must react to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayNotice {
    /// The pill is back home after a touch; the recognizer may go idle
    ReturnedHome,
    Hidden,
    Shown,
}

pub struct OverlayCoordinator {
    surface: Box<dyn OverlaySurface>,
    settings: Arc<PillSettings>,
    inputs: LayoutInputs,
    home: OverlayGeometry,
    current: OverlayGeometry,
    attached: bool,
    visibility: Visibility,
    alpha: f64,
    translation: f64,
    faded: bool,
    log: HiddenReasonLog,

    being_touched: bool,
    carrying_out_touch_action: bool,
    deferred_hide: Option<HiddenReason>,
    pending_show: Option<bool>,
    pending_hide: bool,
    queued_layout: bool,

    timers: TimerQueue<OverlayTimer>,
    next_token: u64,
    transition_token: Option<u64>,
    return_token: Option<u64>,
    notices: Vec<OverlayNotice>,
}

impl OverlayCoordinator {
    pub fn new(
        surface: Box<dyn OverlaySurface>,
        settings: Arc<PillSettings>,
        inputs: LayoutInputs,
    ) -> Self {
        let home = compute_geometry(&inputs, &settings);
        Self {
            surface,
            settings,
            inputs,
            home,
            current: home,
            attached: false,
            visibility: Visibility::Visible,
            alpha: ALPHA_ACTIVE,
            translation: 0.0,
            faded: false,
            log: HiddenReasonLog::new(),
            being_touched: false,
            carrying_out_touch_action: false,
            deferred_hide: None,
            pending_show: None,
            pending_hide: false,
            queued_layout: false,
            timers: TimerQueue::new(),
            next_token: 0,
            transition_token: None,
            return_token: None,
            notices: Vec::new(),
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_hidden(&self) -> bool {
        self.visibility == Visibility::Hidden
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self.visibility, Visibility::Hiding | Visibility::Showing)
    }

    pub fn is_faded(&self) -> bool {
        self.faded
    }

    pub fn is_being_touched(&self) -> bool {
        self.being_touched
    }

    pub fn log(&self) -> &HiddenReasonLog {
        &self.log
    }

    /// Deterministic home geometry for the current inputs
    pub fn home_geometry(&self) -> &OverlayGeometry {
        &self.home
    }

    /// Geometry last pushed to the surface (includes drag and hide offsets)
    pub fn current_geometry(&self) -> &OverlayGeometry {
        &self.current
    }

    pub fn inputs(&self) -> &LayoutInputs {
        &self.inputs
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    pub fn take_notices(&mut self) -> Vec<OverlayNotice> {
        std::mem::take(&mut self.notices)
    }

    /// Add the overlay window
    pub fn attach(&mut self, now: Instant) {
        if self.attached {
            return;
        }
        self.home = compute_geometry(&self.inputs, &self.settings);
        self.current = self.home;
        if let Err(e) = self.surface.attach(&self.current, &self.settings.appearance) {
            warn!("Failed to attach pill overlay: {}", e);
            return;
        }
        info!("Pill overlay attached");
        self.attached = true;
        self.visibility = Visibility::Visible;
        self.alpha = ALPHA_ACTIVE;
        self.translation = 0.0;
        self.faded = false;
        self.queued_layout = false;

        if self.settings.auto_hide {
            self.log.add_reason(HiddenReason::Auto);
        }
        if !self.log.is_empty() {
            self.schedule_hide(now);
        }
        if self.settings.auto_fade_effective() {
            self.schedule_fade(now, self.settings.fade_after_time);
        }
    }

    /// Remove the overlay window and drop everything in flight
    pub fn detach(&mut self) {
        if !self.attached {
            return;
        }
        if let Err(e) = self.surface.detach() {
            debug!("Pill overlay detach failed: {}", e);
        }
        info!("Pill overlay detached");
        self.attached = false;
        self.timers.clear();
        self.transition_token = None;
        self.pending_show = None;
        self.pending_hide = false;
        self.deferred_hide = None;
        self.being_touched = false;
        self.visibility = Visibility::Visible;
        if self.carrying_out_touch_action || self.return_token.is_some() {
            self.return_token = None;
            self.carrying_out_touch_action = false;
            self.notices.push(OverlayNotice::ReturnedHome);
        }
    }

    /// Hide the pill for `reason`; `override_touch` hides even under the finger
    pub fn hide(&mut self, reason: HiddenReason, override_touch: bool, now: Instant) {
        self.log.add_reason(reason);
        debug!(%reason, override_touch, "Hide requested");

        if self.being_touched && !override_touch {
            debug!("Pill is being touched, deferring hide");
            self.deferred_hide = Some(reason);
            self.cancel_scheduled_hides();
            return;
        }
        if !self.attached {
            return;
        }

        match self.visibility {
            Visibility::Visible => self.start_hide(now),
            Visibility::Showing => self.pending_hide = true,
            Visibility::Hiding => self.pending_show = None,
            Visibility::Hidden => {}
        }
    }

    /// Remove `reason` and show the pill once nothing else keeps it hidden
    pub fn show(&mut self, reason: Option<HiddenReason>, force: bool, now: Instant) {
        if let Some(reason) = reason {
            self.log.remove_reason(reason);
            self.timers.cancel(&OverlayTimer::Hide(reason));
            if self.deferred_hide == Some(reason) {
                self.deferred_hide = None;
            }
        }
        if !self.attached {
            return;
        }

        match self.visibility {
            Visibility::Hidden => {
                if self.log.is_empty() || force {
                    self.start_show(now);
                } else {
                    debug!(reasons = self.log.len(), "Show requested but pill still has hide reasons");
                }
            }
            Visibility::Hiding => self.pending_show = Some(force),
            Visibility::Showing => self.pending_hide = false,
            Visibility::Visible => {
                if self.log.is_empty() {
                    self.cancel_scheduled_hides();
                } else {
                    self.schedule_hide(now);
                }
            }
        }
    }

    /// Arm a re-hide using the delay of the most recent reason; manual
    /// hides never re-arm
    pub fn schedule_hide(&mut self, now: Instant) {
        let Some(reason) = self.log.most_recent() else { return };
        let delay = match reason {
            HiddenReason::Auto => self.settings.auto_hide_time,
            HiddenReason::Fullscreen => self.settings.hide_in_fullscreen_time,
            HiddenReason::Keyboard => self.settings.hide_on_keyboard_time,
            HiddenReason::Manual => return,
        };
        self.timers.arm(OverlayTimer::Hide(reason), now, delay);
    }

    /// Fade the pill after `delay` unless something cancels it first
    pub fn schedule_fade(&mut self, now: Instant, delay: Duration) {
        self.timers.arm(OverlayTimer::Fade, now, delay);
    }

    pub fn cancel_fade(&mut self) {
        self.timers.cancel(&OverlayTimer::Fade);
        self.unfade();
    }

    /// Replace the settings snapshot and re-derive what depends on it
    pub fn set_settings(&mut self, settings: Arc<PillSettings>, now: Instant) {
        let previous = std::mem::replace(&mut self.settings, settings);

        if self.attached && previous.appearance != self.settings.appearance {
            if let Err(e) = self.surface.set_appearance(&self.settings.appearance) {
                debug!("Appearance update dropped: {}", e);
            }
        }

        if previous.auto_hide != self.settings.auto_hide {
            if self.settings.auto_hide {
                self.log.add_reason(HiddenReason::Auto);
                self.schedule_hide(now);
            } else {
                self.show(Some(HiddenReason::Auto), false, now);
            }
        }

        if previous.auto_fade_effective() != self.settings.auto_fade_effective() {
            if self.settings.auto_fade_effective() {
                self.schedule_fade(now, self.settings.fade_after_time);
            } else {
                self.cancel_fade();
            }
        }

        self.update_position_and_dimens();
    }

    /// Replace the layout inputs (rotation, screen, immersive state)
    pub fn set_inputs(&mut self, inputs: LayoutInputs) {
        if self.inputs == inputs {
            return;
        }
        self.inputs = inputs;
        self.update_position_and_dimens();
    }

    /// Recompute home geometry and apply it unless a touch or transition
    /// currently owns the position
    pub fn update_position_and_dimens(&mut self) {
        self.home = compute_geometry(&self.inputs, &self.settings);
        if self.carrying_out_touch_action || self.is_transitioning() {
            self.queued_layout = true;
            return;
        }
        self.apply_home();
    }

    fn apply_home(&mut self) {
        self.queued_layout = false;
        let mut target = self.home;
        if self.visibility == Visibility::Hidden {
            target.set_across(self.home.hidden_offset);
        }
        if target == self.current {
            return;
        }
        self.current = target;
        self.push_layout();
    }

    fn flush_queued_layout(&mut self) {
        if self.queued_layout && !self.carrying_out_touch_action && !self.is_transitioning() {
            self.apply_home();
        }
    }

    fn push_layout(&mut self) {
        if !self.attached {
            return;
        }
        if let Err(e) = self.surface.update_layout(&self.current) {
            debug!("Layout update dropped: {}", e);
        }
    }

    fn animate(&mut self, duration: Duration) {
        if !self.attached {
            return;
        }
        let frame = SurfaceFrame {
            geometry: self.current,
            alpha: self.alpha,
            translation: self.translation,
        };
        if let Err(e) = self.surface.animate_to(&frame, duration) {
            debug!("Animation dropped: {}", e);
        }
    }

    /// Animation time for moving `distance` px
    fn move_duration(&self, distance: i32) -> Duration {
        self.settings
            .anim_duration
            .mul_f64(distance.unsigned_abs() as f64 / 100.0)
    }

    fn token(&mut self) -> u64 {
        self.next_token += 1;
        self.next_token
    }

    fn cancel_scheduled_hides(&mut self) {
        self.timers
            .cancel_where(|t| matches!(t, OverlayTimer::Hide(_)));
    }

    fn start_hide(&mut self, now: Instant) {
        // A hide cuts any return-home animation short
        if self.return_token.is_some() {
            self.finish_return();
        }
        self.timers.cancel(&OverlayTimer::Fade);
        self.cancel_scheduled_hides();
        self.pending_hide = false;
        self.pending_show = None;
        self.visibility = Visibility::Hiding;
        let token = self.token();
        self.transition_token = Some(token);
        info!(reason = ?self.log.most_recent(), "Hiding pill");

        let distance = self.current.across() - self.home.hidden_offset;
        if distance == 0 {
            self.run_step(AnimStep::HideTuck, token, now);
        } else {
            let duration = self.move_duration(distance);
            self.current.set_across(self.home.hidden_offset);
            self.animate(duration);
            self.timers
                .arm(OverlayTimer::Transition { token, step: AnimStep::HideMove }, now, duration);
        }
    }

    fn start_show(&mut self, now: Instant) {
        self.pending_hide = false;
        self.pending_show = None;
        self.visibility = Visibility::Showing;
        let token = self.token();
        self.transition_token = Some(token);
        info!("Showing pill");

        if self.log.is_empty() {
            self.cancel_scheduled_hides();
        } else {
            self.schedule_hide(now);
        }
        self.run_step(AnimStep::ShowUntuck, token, now);
    }

    fn run_step(&mut self, step: AnimStep, token: u64, now: Instant) {
        let anim = self.settings.anim_duration;
        match step {
            AnimStep::HideMove => {}
            AnimStep::HideTuck => {
                self.translation = self.current.thickness() as f64 / 2.0;
                self.alpha = ALPHA_HIDDEN;
                self.faded = false;
                self.animate(anim);
                self.timers
                    .arm(OverlayTimer::Transition { token, step }, now, anim);
            }
            AnimStep::ShowUntuck => {
                self.translation = 0.0;
                self.alpha = ALPHA_ACTIVE;
                self.faded = false;
                self.animate(anim);
                self.timers
                    .arm(OverlayTimer::Transition { token, step }, now, anim);
            }
            AnimStep::ShowMove => {
                let distance = self.home.home_offset - self.current.across();
                let duration = self.move_duration(distance).max(MIN_SHOW_COMPLETION);
                self.current = self.home;
                self.animate(duration);
                self.timers
                    .arm(OverlayTimer::Transition { token, step }, now, duration);
            }
        }
    }

    fn advance(&mut self, step: AnimStep, token: u64, now: Instant) {
        match step {
            AnimStep::HideMove => self.run_step(AnimStep::HideTuck, token, now),
            AnimStep::HideTuck => self.finish_hide(now),
            AnimStep::ShowUntuck => self.run_step(AnimStep::ShowMove, token, now),
            AnimStep::ShowMove => self.finish_show(now),
        }
    }

    fn finish_hide(&mut self, now: Instant) {
        self.transition_token = None;
        self.visibility = Visibility::Hidden;
        self.notices.push(OverlayNotice::Hidden);
        debug!("Pill hidden");

        if let Some(force) = self.pending_show.take() {
            if self.log.is_empty() || force {
                self.start_show(now);
                return;
            }
        }
        self.flush_queued_layout();
    }

    fn finish_show(&mut self, now: Instant) {
        self.transition_token = None;
        self.visibility = Visibility::Visible;
        self.notices.push(OverlayNotice::Shown);
        debug!("Pill shown");

        // A hide that arrived mid-show wins if its reason is still logged
        if std::mem::take(&mut self.pending_hide) && !self.log.is_empty() {
            self.start_hide(now);
            return;
        }
        self.flush_queued_layout();
        if self.settings.auto_fade_effective() {
            self.schedule_fade(now, self.settings.fade_after_time);
        }
    }

    fn unfade(&mut self) {
        if self.faded {
            self.faded = false;
            self.alpha = ALPHA_ACTIVE;
            self.animate(self.settings.fade_duration);
        }
    }

    /// Finger down on the pill
    pub fn touch_started(&mut self) {
        if self.return_token.is_some() {
            self.finish_return();
        }
        self.being_touched = true;
        self.carrying_out_touch_action = true;
        self.timers.cancel(&OverlayTimer::Fade);
        self.unfade();
    }

    /// Move the pill with the finger (pill frame deltas)
    pub fn drag_by(&mut self, along: f64, across: f64) {
        if !self.carrying_out_touch_action || self.visibility != Visibility::Visible {
            return;
        }
        let (long_axis, cross_axis) = match self.current.orientation {
            Orientation::Horizontal => (self.inputs.screen.w, self.inputs.screen.h),
            _ => (self.inputs.screen.h, self.inputs.screen.w),
        };

        let mut moved = false;
        if across != 0.0 && self.current.across() < cross_axis / 6 + self.home.home_offset {
            self.current
                .set_across(self.current.across() + across as i32);
            moved = true;
        }
        if along != 0.0 {
            let half = long_axis / 2 - self.current.length() / 2;
            let next = (self.current.along() + along as i32).clamp(-half.max(0), half.max(0));
            self.current.set_along(next);
            moved = true;
        }
        if moved {
            self.push_layout();
        }
    }

    /// Finger lifted; animate back home and re-issue a deferred hide
    pub fn touch_ended(&mut self, now: Instant) {
        self.being_touched = false;

        if let Some(reason) = self.deferred_hide.take() {
            let delay = match reason {
                HiddenReason::Auto => self.settings.auto_hide_time,
                HiddenReason::Fullscreen => self.settings.hide_in_fullscreen_time,
                HiddenReason::Keyboard => self.settings.hide_on_keyboard_time,
                HiddenReason::Manual => Duration::ZERO,
            };
            self.timers.arm(OverlayTimer::Hide(reason), now, delay);
        } else if !self.log.is_empty() && self.visibility == Visibility::Visible {
            self.schedule_hide(now);
        }

        if self.settings.auto_fade_effective() && self.visibility == Visibility::Visible {
            self.schedule_fade(now, self.settings.fade_after_time);
        }

        let mut target = self.home;
        match self.visibility {
            Visibility::Visible => {}
            Visibility::Hidden => target.set_across(self.home.hidden_offset),
            Visibility::Hiding | Visibility::Showing => {
                // The transition owns the position
                self.finish_return();
                return;
            }
        }

        let distance = (self.current.across() - target.across())
            .abs()
            .max((self.current.along() - target.along()).abs());
        if distance == 0 || !self.attached {
            self.finish_return();
            return;
        }

        let duration = self.move_duration(distance);
        self.current = target;
        self.animate(duration);
        let token = self.token();
        self.return_token = Some(token);
        self.timers.arm(OverlayTimer::Return { token }, now, duration);
    }

    fn finish_return(&mut self) {
        let was_returning = self.return_token.take().is_some();
        self.timers
            .cancel_where(|t| matches!(t, OverlayTimer::Return { .. }));
        if self.carrying_out_touch_action || was_returning {
            self.carrying_out_touch_action = false;
            self.notices.push(OverlayNotice::ReturnedHome);
        }
        if !self.being_touched {
            self.flush_queued_layout();
        }
    }

    /// Fire every due overlay timer
    pub fn on_timer(&mut self, now: Instant) {
        while let Some(timer) = self.timers.pop_due(now) {
            match timer {
                OverlayTimer::Hide(_) => {
                    if let Some(reason) = self.log.most_recent() {
                        self.hide(reason, false, now);
                    }
                }
                OverlayTimer::Fade => {
                    if self.visibility == Visibility::Visible && !self.being_touched && !self.faded {
                        debug!("Fading pill");
                        self.faded = true;
                        self.alpha = self.settings.fade_opacity;
                        self.animate(self.settings.fade_duration);
                    }
                }
                OverlayTimer::Transition { token, step } => {
                    if self.transition_token != Some(token) {
                        debug!(token, "Stale transition completion discarded");
                        continue;
                    }
                    self.advance(step, token, now);
                }
                OverlayTimer::Return { token } => {
                    if self.return_token == Some(token) {
                        self.finish_return();
                    }
                }
            }
        }
    }
}
