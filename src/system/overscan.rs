//! Nav-bar suppression through display overscan
//!
//! The system nav bar is pushed off screen by a negative overscan inset on
//! the side it lives on. Insets are in natural display coordinates, which
//! is what the platform call takes; the blackout strip uses the
//! screen-relative side.

use std::io::ErrorKind;
use std::process::Command;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::capability::{CachedCapability, Capability};
use crate::config::PillSettings;
use crate::error::OverscanError;
use crate::reasons::ReasonSet;
use crate::shell::primitives::{Rotation, Side};

/// Display overscan insets (negative values hide content)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Insets {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Insets {
    pub const ZERO: Insets = Insets {
        left: 0,
        top: 0,
        right: 0,
        bottom: 0,
    };

    pub fn on_side(side: Side, value: i32) -> Self {
        let mut insets = Insets::ZERO;
        match side {
            Side::Left => insets.left = value,
            Side::Top => insets.top = value,
            Side::Right => insets.right = value,
            Side::Bottom => insets.bottom = value,
        }
        insets
    }

    pub fn is_zero(&self) -> bool {
        *self == Insets::ZERO
    }

    /// The single side carrying an inset, if any
    pub fn active_side(&self) -> Option<Side> {
        [
            (Side::Left, self.left),
            (Side::Top, self.top),
            (Side::Right, self.right),
            (Side::Bottom, self.bottom),
        ]
        .into_iter()
        .find(|(_, v)| *v != 0)
        .map(|(side, _)| side)
    }
}

/// Platform call that sets display overscan
pub trait OverscanControl {
    fn probe(&mut self) -> Capability;
    fn set_overscan(&mut self, insets: &Insets) -> Result<(), OverscanError>;
}

/// Runs `wm overscan left,top,right,bottom`
#[derive(Debug, Clone)]
pub struct WmOverscan {
    program: String,
}

impl WmOverscan {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for WmOverscan {
    fn default() -> Self {
        Self::new("wm")
    }
}

impl OverscanControl for WmOverscan {
    fn probe(&mut self) -> Capability {
        match Command::new(&self.program).arg("overscan").output() {
            // Usage output without an error means the subcommand exists
            Ok(output) if output.status.success() => Capability::Supported,
            Ok(_) => Capability::Unknown,
            Err(e) if e.kind() == ErrorKind::NotFound => Capability::Unsupported,
            Err(e) => {
                debug!("Overscan probe failed: {}", e);
                Capability::Unknown
            }
        }
    }

    fn set_overscan(&mut self, insets: &Insets) -> Result<(), OverscanError> {
        let arg = if insets.is_zero() {
            "reset".to_string()
        } else {
            format!(
                "{},{},{},{}",
                insets.left, insets.top, insets.right, insets.bottom
            )
        };
        let output = match Command::new(&self.program)
            .arg("overscan")
            .arg(&arg)
            .output()
        {
            Ok(output) => output,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(OverscanError::Unsupported),
            Err(e) => return Err(e.into()),
        };
        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.contains("Unknown command") || stderr.contains("SecurityException") {
            return Err(OverscanError::Unsupported);
        }
        Err(OverscanError::CommandFailed(stderr.trim().to_string()))
    }
}

/// Logs the insets it would apply; used when overscan is not wired to the
/// real display
#[derive(Debug, Default)]
pub struct LoggingOverscan;

impl OverscanControl for LoggingOverscan {
    fn probe(&mut self) -> Capability {
        Capability::Supported
    }

    fn set_overscan(&mut self, insets: &Insets) -> Result<(), OverscanError> {
        info!(
            left = insets.left,
            top = insets.top,
            right = insets.right,
            bottom = insets.bottom,
            "Overscan"
        );
        Ok(())
    }
}

/// Computed suppression target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavSuppressionState {
    pub insets: Insets,
    /// Nav-bar side on the current screen while suppressed
    pub screen_side: Option<Side>,
    pub rotation: Rotation,
}

impl NavSuppressionState {
    pub fn is_suppressing(&self) -> bool {
        !self.insets.is_zero()
    }
}

/// Natural-orientation side the nav bar lives on
pub fn nav_bar_side(settings: &PillSettings, rotation: Rotation, queried: Option<Side>) -> Side {
    if let Some(screen_side) = queried {
        return screen_side.screen_to_natural(rotation);
    }
    if settings.tablet_mode {
        // Tablets keep the nav bar at the bottom of the current screen
        return Side::Bottom.screen_to_natural(rotation);
    }
    match rotation {
        Rotation::R270 if settings.rot270_fix => Side::Top,
        Rotation::R180 if settings.rot180_fix => Side::Top,
        _ => Side::Bottom,
    }
}

/// Pure suppression target for the current inputs
pub fn compute_suppression(
    settings: &PillSettings,
    nav_reasons: &ReasonSet,
    capability: Capability,
    rotation: Rotation,
    queried: Option<Side>,
) -> NavSuppressionState {
    if !nav_reasons.is_empty() || !settings.uses_overscan() || !capability.is_usable() {
        return NavSuppressionState {
            insets: Insets::ZERO,
            screen_side: None,
            rotation,
        };
    }
    let side = nav_bar_side(settings, rotation, queried);
    let trim = if settings.full_overscan { 0 } else { 1 };
    let value = -(settings.geometry.nav_bar_height as i32 - trim);
    // Upside down, the blackout stays on the screen's bottom edge
    let screen_side = match (rotation, queried) {
        (Rotation::R180, None) => Side::Bottom,
        _ => side.natural_to_screen(rotation),
    };
    NavSuppressionState {
        insets: Insets::on_side(side, value),
        screen_side: Some(screen_side),
        rotation,
    }
}

/// Nav hidden/shown transition for observers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavChange {
    Hidden,
    Shown,
}

pub struct NavSuppression {
    control: Box<dyn OverscanControl>,
    capability: CachedCapability,
    /// Last insets handed to the platform
    applied: Insets,
    state: NavSuppressionState,
    temporarily_shown: bool,
}

impl NavSuppression {
    pub fn new(mut control: Box<dyn OverscanControl>) -> Self {
        let capability = CachedCapability::detect("overscan", || control.probe());
        Self {
            control,
            capability,
            applied: Insets::ZERO,
            state: NavSuppressionState {
                insets: Insets::ZERO,
                screen_side: None,
                rotation: Rotation::R0,
            },
            temporarily_shown: false,
        }
    }

    pub fn capability(&self) -> Capability {
        self.capability.get()
    }

    pub fn state(&self) -> &NavSuppressionState {
        &self.state
    }

    pub fn applied(&self) -> &Insets {
        &self.applied
    }

    pub fn is_nav_hidden(&self) -> bool {
        !self.applied.is_zero()
    }

    /// Re-derive and apply the insets; returns a change when the nav bar
    /// went from shown to hidden or back
    pub fn recompute(
        &mut self,
        settings: &PillSettings,
        nav_reasons: &ReasonSet,
        rotation: Rotation,
        queried: Option<Side>,
    ) -> Option<NavChange> {
        self.temporarily_shown = false;
        self.state = compute_suppression(
            settings,
            nav_reasons,
            self.capability.get(),
            rotation,
            queried,
        );
        debug!(
            reasons = nav_reasons.len(),
            side = ?self.state.screen_side,
            "Nav suppression recomputed"
        );
        let target = self.state.insets;
        self.apply(target)
    }

    /// Show the nav bar until the next recompute (lock-task hold)
    pub fn show_temporarily(&mut self) -> Option<NavChange> {
        if self.applied.is_zero() {
            return None;
        }
        info!("Temporarily showing nav bar");
        self.temporarily_shown = true;
        self.apply(Insets::ZERO)
    }

    pub fn is_temporarily_shown(&self) -> bool {
        self.temporarily_shown
    }

    /// Zero the insets, e.g. on deactivation or shutdown
    pub fn reset(&mut self) -> Option<NavChange> {
        self.state.insets = Insets::ZERO;
        self.state.screen_side = None;
        self.apply(Insets::ZERO)
    }

    fn apply(&mut self, target: Insets) -> Option<NavChange> {
        if target == self.applied {
            return None;
        }
        if !target.is_zero() && !self.capability.is_usable() {
            return None;
        }
        let was_hidden = self.is_nav_hidden();
        match self.control.set_overscan(&target) {
            Ok(()) => {
                self.capability.mark_supported();
                self.applied = target;
            }
            Err(OverscanError::Unsupported) => {
                warn!("Overscan rejected by the platform, nav hiding disabled");
                self.capability.mark_unsupported();
                return None;
            }
            Err(e) => {
                warn!("Failed to apply overscan: {}", e);
                return None;
            }
        }
        match (was_hidden, self.is_nav_hidden()) {
            (false, true) => {
                info!(side = ?target.active_side(), "Nav bar hidden");
                Some(NavChange::Hidden)
            }
            (true, false) => {
                info!("Nav bar shown");
                Some(NavChange::Shown)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reasons::DisableReason;
    use crate::testing::FakeOverscan;

    fn hiding_settings() -> PillSettings {
        PillSettings {
            hide_nav: true,
            ..PillSettings::default()
        }
    }

    #[test]
    fn test_side_rules() {
        let mut s = hiding_settings();
        assert_eq!(nav_bar_side(&s, Rotation::R0, None), Side::Bottom);
        assert_eq!(nav_bar_side(&s, Rotation::R90, None), Side::Bottom);
        assert_eq!(nav_bar_side(&s, Rotation::R270, None), Side::Bottom);

        s.rot270_fix = true;
        assert_eq!(nav_bar_side(&s, Rotation::R270, None), Side::Top);
        assert_eq!(nav_bar_side(&s, Rotation::R90, None), Side::Bottom);

        s.rot270_fix = false;
        s.tablet_mode = true;
        assert_eq!(nav_bar_side(&s, Rotation::R90, None), Side::Left);
        assert_eq!(nav_bar_side(&s, Rotation::R180, None), Side::Top);
        assert_eq!(nav_bar_side(&s, Rotation::R270, None), Side::Right);

        // A side reported by the platform beats every preference
        assert_eq!(nav_bar_side(&s, Rotation::R90, Some(Side::Right)), Side::Bottom);
    }

    #[test]
    fn test_screen_side_follows_rotation() {
        let s = hiding_settings();
        let reasons = ReasonSet::new();
        let at = |r| compute_suppression(&s, &reasons, Capability::Supported, r, None).screen_side;
        assert_eq!(at(Rotation::R0), Some(Side::Bottom));
        assert_eq!(at(Rotation::R90), Some(Side::Right));
        assert_eq!(at(Rotation::R270), Some(Side::Left));

        // Upside down the inset stays on the natural bottom, the strip on the screen bottom
        let state = compute_suppression(&s, &reasons, Capability::Supported, Rotation::R180, None);
        assert_eq!(state.insets.bottom, -95);
        assert_eq!(state.screen_side, Some(Side::Bottom));

        let fixed = PillSettings {
            rot270_fix: true,
            ..hiding_settings()
        };
        let state = compute_suppression(&fixed, &reasons, Capability::Supported, Rotation::R270, None);
        assert_eq!(state.screen_side, Some(Side::Right));
        assert_eq!(state.insets.top, -95);
    }

    #[test]
    fn test_inset_value() {
        let mut s = hiding_settings();
        let reasons = ReasonSet::new();
        let state = compute_suppression(&s, &reasons, Capability::Supported, Rotation::R0, None);
        assert_eq!(state.insets, Insets::on_side(Side::Bottom, -95));

        s.full_overscan = true;
        let state = compute_suppression(&s, &reasons, Capability::Supported, Rotation::R0, None);
        assert_eq!(state.insets.bottom, -96);
    }

    #[test]
    fn test_disable_reason_shows_nav() {
        let s = hiding_settings();
        let (fake, log) = FakeOverscan::new(Capability::Supported);
        let mut nav = NavSuppression::new(Box::new(fake));
        let mut reasons = ReasonSet::new();
        reasons.add(DisableReason::Keyguard);

        assert_eq!(nav.recompute(&s, &reasons, Rotation::R0, None), None);
        assert!(nav.applied().is_zero());
        assert!(log.borrow().is_empty());

        reasons.remove(DisableReason::Keyguard);
        assert_eq!(
            nav.recompute(&s, &reasons, Rotation::R0, None),
            Some(NavChange::Hidden)
        );
        assert_eq!(nav.applied().bottom, -95);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let s = hiding_settings();
        let (fake, log) = FakeOverscan::new(Capability::Supported);
        let mut nav = NavSuppression::new(Box::new(fake));
        let reasons = ReasonSet::new();
        nav.recompute(&s, &reasons, Rotation::R0, None);
        nav.recompute(&s, &reasons, Rotation::R0, None);
        nav.recompute(&s, &reasons, Rotation::R0, None);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_rotation_moves_inset_side() {
        let s = PillSettings {
            tablet_mode: true,
            ..hiding_settings()
        };
        let (fake, log) = FakeOverscan::new(Capability::Supported);
        let mut nav = NavSuppression::new(Box::new(fake));
        let reasons = ReasonSet::new();
        nav.recompute(&s, &reasons, Rotation::R0, None);
        assert_eq!(nav.recompute(&s, &reasons, Rotation::R90, None), None);
        assert_eq!(nav.applied().left, -95);
        assert_eq!(nav.applied().bottom, 0);
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn test_unsupported_gates_further_attempts() {
        let s = hiding_settings();
        let (mut fake, log) = FakeOverscan::new(Capability::Unknown);
        fake.reject = true;
        let mut nav = NavSuppression::new(Box::new(fake));
        let reasons = ReasonSet::new();

        assert_eq!(nav.recompute(&s, &reasons, Rotation::R0, None), None);
        assert_eq!(nav.capability(), Capability::Unsupported);
        let calls = log.borrow().len();

        nav.recompute(&s, &reasons, Rotation::R90, None);
        assert_eq!(log.borrow().len(), calls);
        assert!(!nav.state().is_suppressing());
    }

    #[test]
    fn test_temporary_show_until_recompute() {
        let s = hiding_settings();
        let (fake, _log) = FakeOverscan::new(Capability::Supported);
        let mut nav = NavSuppression::new(Box::new(fake));
        let reasons = ReasonSet::new();
        nav.recompute(&s, &reasons, Rotation::R0, None);

        assert_eq!(nav.show_temporarily(), Some(NavChange::Shown));
        assert!(nav.is_temporarily_shown());
        assert_eq!(
            nav.recompute(&s, &reasons, Rotation::R0, None),
            Some(NavChange::Hidden)
        );
    }
}
