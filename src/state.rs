//! Pill context - owns every coordinator and all mutable pill state
//!
//! One `PillContext` lives on the logic loop for the life of the service.
//! Signals are applied one at a time; after each one a layout pass
//! re-derives nav suppression, the blackout strip, the immersive request,
//! whether the pill is attached, and the pill's layout inputs.

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::{self, classify_key, ConfigImpact, ConfigStore, PillSettings};
use crate::input::{
    resolve, ActionExecutor, ActionMap, ActionType, Dispatch, Feedback, Gesture, GestureConfig,
    GestureKey, GestureRecognizer, PillEvent, PillView, RootExecutor, Section, TouchEvent,
};
use crate::reasons::{DisableReason, HiddenReason, ReasonSet};
use crate::shell::blackout::{Blackout, BlackoutPlacement, BlackoutSurface};
use crate::shell::geometry::LayoutInputs;
use crate::shell::overlay::{OverlayCoordinator, OverlayNotice, OverlaySurface};
use crate::shell::primitives::{Rotation, Side, Size};
use crate::signals::Signal;
use crate::system::capability::{CachedCapability, EdgePanelProbe};
use crate::system::immersive::{ImmersiveControl, ImmersiveCoordinator, ImmersivePolicy};
use crate::system::overscan::{NavChange, NavSuppression, OverscanControl};

/// Platform pieces the context drives
pub struct Collaborators {
    pub overlay: Box<dyn OverlaySurface>,
    pub blackout: Box<dyn BlackoutSurface>,
    pub overscan: Box<dyn OverscanControl>,
    pub immersive: Box<dyn ImmersiveControl>,
    pub edge_panel: Box<dyn EdgePanelProbe>,
    pub executor: Box<dyn ActionExecutor>,
    pub root: Option<Box<dyn RootExecutor>>,
}

type Callback = Box<dyn FnMut(bool)>;

/// Callbacks for activation and nav-bar state, run synchronously on the
/// logic loop
#[derive(Default)]
pub struct Observers {
    activation: Vec<Callback>,
    nav_state: Vec<Callback>,
}

impl Observers {
    pub fn on_activation_change(&mut self, callback: impl FnMut(bool) + 'static) {
        self.activation.push(Box::new(callback));
    }

    /// Called with `true` when the nav bar gets hidden
    pub fn on_nav_state_change(&mut self, callback: impl FnMut(bool) + 'static) {
        self.nav_state.push(Box::new(callback));
    }

    fn notify_activation(&mut self, active: bool) {
        for callback in &mut self.activation {
            callback(active);
        }
    }

    fn notify_nav_state(&mut self, hidden: bool) {
        for callback in &mut self.nav_state {
            callback(hidden);
        }
    }
}

/// Current display snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayState {
    pub rotation: Rotation,
    pub screen: Size,
    /// Screen-relative nav bar side, when the platform reports one
    pub nav_side: Option<Side>,
}

impl DisplayState {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            rotation: Rotation::R0,
            screen: Size::new(width, height),
            nav_side: None,
        }
    }
}

pub struct PillContext {
    config: Box<dyn ConfigStore>,
    settings: Arc<PillSettings>,
    actions: Arc<ActionMap>,

    nav_reasons: ReasonSet,
    bar_reasons: ReasonSet,
    imm_reasons: ReasonSet,

    overlay: OverlayCoordinator,
    recognizer: GestureRecognizer,
    nav: NavSuppression,
    blackout: Blackout,
    immersive: ImmersiveCoordinator,
    edge_panel: Box<dyn EdgePanelProbe>,
    edge_capability: CachedCapability,
    executor: Box<dyn ActionExecutor>,
    root: Option<Box<dyn RootExecutor>>,
    pub observers: Observers,

    display: DisplayState,
    screen_on: bool,
    fullscreen: bool,
    keyboard_shown: bool,
    car_mode: bool,
    pinned: bool,
    foreground: Option<String>,
    running: bool,
}

impl PillContext {
    pub fn new(config: Box<dyn ConfigStore>, parts: Collaborators, display: DisplayState) -> Self {
        let settings = Arc::new(PillSettings::load(config.as_ref()));
        let actions = ActionMap::load(config.as_ref());
        let inputs = LayoutInputs {
            screen: display.screen,
            rotation: display.rotation,
            ..Default::default()
        };
        let mut edge_panel = parts.edge_panel;
        let edge_capability = CachedCapability::detect("edge_panel", || edge_panel.capability());

        Self {
            overlay: OverlayCoordinator::new(parts.overlay, settings.clone(), inputs),
            recognizer: GestureRecognizer::new(GestureConfig::from_settings(&settings)),
            nav: NavSuppression::new(parts.overscan),
            blackout: Blackout::new(parts.blackout),
            immersive: ImmersiveCoordinator::new(parts.immersive),
            edge_panel,
            edge_capability,
            executor: parts.executor,
            root: parts.root,
            observers: Observers::default(),
            config,
            settings,
            actions,
            nav_reasons: ReasonSet::new(),
            bar_reasons: ReasonSet::new(),
            imm_reasons: ReasonSet::new(),
            display,
            screen_on: true,
            fullscreen: false,
            keyboard_shown: false,
            car_mode: false,
            pinned: false,
            foreground: None,
            running: true,
        }
    }

    pub fn settings(&self) -> &Arc<PillSettings> {
        &self.settings
    }

    pub fn overlay(&self) -> &OverlayCoordinator {
        &self.overlay
    }

    pub fn recognizer(&self) -> &GestureRecognizer {
        &self.recognizer
    }

    pub fn nav(&self) -> &NavSuppression {
        &self.nav
    }

    pub fn blackout(&self) -> &Blackout {
        &self.blackout
    }

    pub fn immersive(&self) -> &ImmersiveCoordinator {
        &self.immersive
    }

    pub fn nav_reasons(&self) -> &ReasonSet {
        &self.nav_reasons
    }

    pub fn bar_reasons(&self) -> &ReasonSet {
        &self.bar_reasons
    }

    pub fn imm_reasons(&self) -> &ReasonSet {
        &self.imm_reasons
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// First layout pass after construction
    pub fn start(&mut self, now: Instant) {
        info!(
            active = self.settings.is_active,
            hide_nav = self.settings.hide_nav,
            "Pill context starting"
        );
        self.layout_pass(now);
    }

    /// Earliest pending timer across the recognizer and the overlay
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.recognizer.next_deadline(), self.overlay.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Fire everything due at `now`
    pub fn tick(&mut self, now: Instant) {
        let view = self.pill_view();
        let events = self.recognizer.on_timer(&view, now);
        self.apply_pill_events(events, now);
        self.overlay.on_timer(now);
        self.drain_overlay_notices();
    }

    /// Fire every timer due up to `until`, in deadline order
    pub fn advance_to(&mut self, until: Instant) {
        while let Some(deadline) = self.next_deadline() {
            if deadline > until {
                break;
            }
            self.tick(deadline);
        }
    }

    pub fn handle_signal(&mut self, signal: Signal, now: Instant) {
        if !self.running {
            return;
        }
        match signal {
            Signal::Touch(event) => {
                self.handle_touch(event, now);
                return;
            }
            Signal::Shutdown => {
                self.shutdown();
                return;
            }
            Signal::ScreenOn { keyguard } => {
                self.screen_on = true;
                self.set_keyguard(keyguard);
            }
            Signal::Boot => self.screen_on = true,
            Signal::ScreenOff => {
                info!("Screen off");
                self.screen_on = false;
                self.force_finish_touch(now);
                self.set_keyguard(true);
            }
            Signal::UserPresent => self.set_keyguard(false),
            Signal::CarMode { enabled } => {
                info!(enabled, "Car mode");
                self.car_mode = enabled;
                self.apply_car_mode();
            }
            Signal::ForegroundApp { package, class } => {
                debug!(package = %package, ?class, "Foreground app");
                self.foreground = Some(package);
                self.apply_blacklists();
            }
            Signal::Immersive { fullscreen } => self.set_fullscreen(fullscreen, now),
            Signal::PolicyChanged { policy } => {
                let fullscreen = ImmersivePolicy::parse(&policy).is_fullscreen();
                self.set_fullscreen(fullscreen, now);
            }
            Signal::Keyboard { shown } => self.set_keyboard(shown, now),
            Signal::Display {
                rotation,
                width,
                height,
                nav_side,
            } => self.set_display(
                DisplayState {
                    rotation,
                    screen: Size::new(width, height),
                    nav_side,
                },
                now,
            ),
            Signal::LockTask { pinned } => {
                debug!(pinned, "Lock task");
                self.pinned = pinned;
            }
            Signal::ConfigChanged { key, value } => self.apply_config_edit(&key, value, now),
            Signal::Activation { active } => {
                self.apply_config_edit("is_active", Value::Bool(active), now)
            }
        }
        self.layout_pass(now);
    }

    fn set_keyguard(&mut self, locked: bool) {
        let drop_overscan = locked && !self.settings.lockscreen_overscan;
        if self.nav_reasons.set(DisableReason::Keyguard, drop_overscan) {
            debug!(locked, "Keyguard reason updated");
        }
    }

    fn apply_car_mode(&mut self) {
        let disable = self.car_mode && !self.settings.enable_in_car_mode;
        self.bar_reasons.set(DisableReason::CarMode, disable);
        self.nav_reasons.set(DisableReason::CarMode, disable);
        self.imm_reasons.set(DisableReason::CarMode, disable);
    }

    fn apply_blacklists(&mut self) {
        let Some(package) = self.foreground.as_deref() else { return };
        let s = &self.settings;
        let nav = s.nav_blacklist.contains(package);
        let bar = s.bar_blacklist.contains(package);
        let imm = s.imm_blacklist.contains(package);
        self.nav_reasons.set(DisableReason::NavBlacklist, nav);
        self.bar_reasons.set(DisableReason::BarBlacklist, bar);
        self.imm_reasons.set(DisableReason::ImmBlacklist, imm);
    }

    fn set_fullscreen(&mut self, fullscreen: bool, now: Instant) {
        if self.fullscreen == fullscreen {
            return;
        }
        info!(fullscreen, "Fullscreen changed");
        self.fullscreen = fullscreen;
        let s = self.settings.clone();
        if fullscreen {
            if s.hide_in_fullscreen {
                self.overlay.hide(HiddenReason::Fullscreen, false, now);
            } else if s.fade_in_fullscreen_effective() {
                self.overlay.schedule_fade(now, s.fade_in_fullscreen_time);
            }
        } else {
            if self.overlay.is_hidden() || self.overlay.log().contains(HiddenReason::Fullscreen) {
                self.overlay.show(Some(HiddenReason::Fullscreen), false, now);
            }
            if s.fade_in_fullscreen_effective() && !s.auto_fade_effective() {
                self.overlay.cancel_fade();
            }
        }
    }

    fn set_keyboard(&mut self, shown: bool, now: Instant) {
        if self.keyboard_shown == shown {
            return;
        }
        debug!(shown, "Keyboard visibility");
        self.keyboard_shown = shown;
        if shown {
            if self.settings.hide_on_keyboard {
                self.overlay.hide(HiddenReason::Keyboard, false, now);
            }
        } else if self.overlay.log().contains(HiddenReason::Keyboard) {
            self.overlay.show(Some(HiddenReason::Keyboard), false, now);
        }
    }

    fn set_display(&mut self, display: DisplayState, now: Instant) {
        if display == self.display {
            return;
        }
        if display.rotation != self.display.rotation {
            let degrees = display.rotation.degrees();
            info!(rotation = degrees, "Rotation changed");
            self.force_finish_touch(now);
        }
        self.display = display;
    }

    fn apply_config_edit(&mut self, key: &str, value: Value, now: Instant) {
        let changed = config::edit(self.config.as_mut(), key, value);
        if let Err(e) = self.config.persist() {
            warn!("Failed to save pill config: {}", e);
        }
        self.reload(&changed, now);
    }

    /// Swap in fresh snapshots after `keys` changed
    fn reload(&mut self, keys: &[String], now: Instant) {
        let previous = self.settings.clone();
        let settings = Arc::new(PillSettings::load(self.config.as_ref()));
        let impacts: Vec<ConfigImpact> = keys.iter().map(|k| classify_key(k)).collect();
        info!(?keys, "Config changed");

        if impacts.contains(&ConfigImpact::Actions) {
            self.actions = ActionMap::load(self.config.as_ref());
        }
        self.settings = settings.clone();
        self.recognizer
            .set_config(GestureConfig::from_settings(&settings));
        self.overlay.set_settings(settings.clone(), now);

        if impacts.contains(&ConfigImpact::Blacklists) {
            self.apply_blacklists();
        }
        if previous.enable_in_car_mode != settings.enable_in_car_mode {
            self.apply_car_mode();
        }
        if previous.is_active != settings.is_active {
            info!(active = settings.is_active, "Activation changed");
            if !settings.is_active {
                self.force_finish_touch(now);
            }
            self.observers.notify_activation(settings.is_active);
        }
    }

    fn toggle_config(&mut self, key: &str, now: Instant) {
        let current = self.config.get_bool(key, false);
        self.apply_config_edit(key, Value::Bool(!current), now);
        self.layout_pass(now);
    }

    fn pill_view(&self) -> PillView {
        PillView {
            hidden: self.overlay.is_hidden(),
            transitioning: self.overlay.is_transitioning(),
            geometry: *self.overlay.current_geometry(),
            screen: self.display.screen,
            double_tap_enabled: self.actions.get(GestureKey::DoubleTap) != ActionType::NoAction,
            pinned: self.pinned,
        }
    }

    fn handle_touch(&mut self, event: TouchEvent, now: Instant) {
        if !self.overlay.is_attached() {
            debug!("Touch with no pill attached, dropping");
            return;
        }
        let view = self.pill_view();
        let events = self.recognizer.handle(event, &view, now);
        self.apply_pill_events(events, now);
    }

    fn force_finish_touch(&mut self, now: Instant) {
        let events = self.recognizer.force_finish();
        self.apply_pill_events(events, now);
    }

    fn apply_pill_events(&mut self, events: Vec<PillEvent>, now: Instant) {
        for event in events {
            match event {
                PillEvent::TouchStarted => self.overlay.touch_started(),
                PillEvent::Drag { along, across } => self.overlay.drag_by(along, across),
                PillEvent::Gesture { gesture, section } => self.dispatch(gesture, section, now),
                PillEvent::Reveal { feedback } => {
                    if feedback {
                        let fb = self.feedback_for(Gesture::Tap);
                        self.executor.feedback(fb);
                    }
                    info!("Manual reveal");
                    self.overlay.show(Some(HiddenReason::Manual), true, now);
                }
                PillEvent::PinnedHold => {
                    if self.settings.uses_overscan() {
                        if let Some(change) = self.nav.show_temporarily() {
                            self.publish_nav_change(change);
                        }
                        self.blackout.sync(None, self.display.rotation);
                    }
                }
                PillEvent::TouchEnded => self.overlay.touch_ended(now),
            }
        }
        self.drain_overlay_notices();
    }

    fn drain_overlay_notices(&mut self) {
        for notice in self.overlay.take_notices() {
            match notice {
                OverlayNotice::ReturnedHome => self.recognizer.finish_release(),
                OverlayNotice::Hidden | OverlayNotice::Shown => debug!(?notice, "Pill"),
            }
        }
    }

    fn feedback_for(&self, gesture: Gesture) -> Feedback {
        Feedback {
            duration: self.settings.vibration_duration,
            strength: self.settings.vibration_strength,
            pulses: if gesture == Gesture::DoubleTap { 2 } else { 1 },
            sound: self.settings.audio_feedback,
        }
    }

    fn dispatch(&mut self, gesture: Gesture, section: Option<Section>, now: Instant) {
        let Dispatch { key, action } =
            resolve(&self.actions, gesture, section, self.settings.sectioned_pill);
        if action == ActionType::NoAction {
            debug!(%key, "No action mapped");
            return;
        }
        let feedback = self.feedback_for(gesture);
        self.executor.feedback(feedback);

        match action {
            ActionType::Hide => {
                info!("Manual hide");
                self.overlay.hide(HiddenReason::Manual, true, now);
            }
            ActionType::ToggleNav => self.toggle_config("hide_nav", now),
            ActionType::ToggleImmersive => {
                self.toggle_config("use_immersive_mode_when_nav_hidden", now)
            }
            _ => {
                info!(%key, ?action, "Action");
                self.executor.execute(action, key);
                if self.settings.use_root {
                    if let Some(root) = self.root.as_mut() {
                        root.execute_root(action);
                    }
                }
            }
        }
    }

    fn publish_nav_change(&mut self, change: NavChange) {
        self.observers
            .notify_nav_state(change == NavChange::Hidden);
    }

    /// Re-derive everything that depends on reasons, settings and display
    pub fn layout_pass(&mut self, now: Instant) {
        if !self.running {
            return;
        }
        let s = self.settings.clone();
        let rotation = self.display.rotation;

        if self.edge_capability.is_usable() {
            if let Some(active) = self.edge_panel.edge_panel_active() {
                self.imm_reasons.set(DisableReason::EdgeScreen, active);
            }
        }
        self.nav_reasons.set(
            DisableReason::Keyboard,
            s.nav_follows_keyboard() && self.keyboard_shown,
        );
        self.nav_reasons.set(
            DisableReason::Immersive,
            s.orig_nav_in_immersive && self.fullscreen,
        );

        let change = if s.is_active {
            self.nav
                .recompute(&s, &self.nav_reasons, rotation, self.display.nav_side)
        } else {
            self.nav.reset()
        };
        if let Some(change) = change {
            self.publish_nav_change(change);
        }

        let blackout = match self.nav.state().screen_side {
            Some(side) if s.overlay_nav_blackout && self.nav.is_nav_hidden() => {
                Some(BlackoutPlacement {
                    side,
                    thickness: s.geometry.nav_bar_height as i32,
                })
            }
            _ => None,
        };
        self.blackout.sync(blackout, rotation);

        let wants_immersive = s.is_active
            && s.uses_overscan()
            && s.immersive_nav
            && self.imm_reasons.is_empty()
            && self.nav.is_nav_hidden();
        self.immersive.set_requested(wants_immersive);

        self.overlay.set_inputs(LayoutInputs {
            screen: self.display.screen,
            rotation,
            immersive: self.fullscreen,
            immersive_nav: self.immersive.is_nav_immersive() && !self.keyboard_shown,
            car_mode: self.car_mode,
        });

        let show_pill = s.is_active && self.bar_reasons.is_empty() && self.screen_on;
        if show_pill {
            self.overlay.attach(now);
        } else if self.overlay.is_attached() {
            debug!(reasons = self.bar_reasons.len(), "Removing pill");
            self.force_finish_touch(now);
            self.overlay.detach();
        }
        self.drain_overlay_notices();
    }

    /// Tear everything down: pill off, nav back, policy restored
    pub fn shutdown(&mut self) {
        if !self.running {
            return;
        }
        info!("Pill context shutting down");
        self.recognizer.force_finish();
        self.overlay.detach();
        self.drain_overlay_notices();
        if let Some(change) = self.nav.reset() {
            self.publish_nav_change(change);
        }
        self.blackout.remove();
        self.immersive.set_requested(false);
        self.running = false;
    }
}
