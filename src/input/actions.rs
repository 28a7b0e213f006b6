//! Gesture keys, action types and the gesture-to-action mapping
//!
//! Every recognized gesture resolves to a configuration key (optionally
//! sectioned into left/center/right thirds), and the key resolves to an
//! action type through the current `ActionMap`. The map is an immutable
//! snapshot: reloads build a new map and swap it in whole.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ConfigStore;

/// Gestures the recognizer can emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gesture {
    Tap,
    DoubleTap,
    Hold,
    Up,
    UpHold,
    Left,
    LeftHold,
    Right,
    RightHold,
    Down,
}

impl Gesture {
    pub fn key(self) -> GestureKey {
        match self {
            Gesture::Tap => GestureKey::Tap,
            Gesture::DoubleTap => GestureKey::DoubleTap,
            Gesture::Hold => GestureKey::Hold,
            Gesture::Up => GestureKey::Up,
            Gesture::UpHold => GestureKey::UpHold,
            Gesture::Left => GestureKey::Left,
            Gesture::LeftHold => GestureKey::LeftHold,
            Gesture::Right => GestureKey::Right,
            Gesture::RightHold => GestureKey::RightHold,
            Gesture::Down => GestureKey::Down,
        }
    }
}

/// Third of the pill a touch started in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Left,
    Center,
    Right,
}

impl Section {
    /// Partition `position` along a pill of `length` into equal thirds
    pub fn from_position(position: f64, length: f64) -> Self {
        let third = length / 3.0;
        if position < third {
            Section::Left
        } else if position <= third * 2.0 {
            Section::Center
        } else {
            Section::Right
        }
    }
}

/// Configuration key a gesture dispatches through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureKey {
    Tap,
    DoubleTap,
    Hold,
    Up,
    UpHold,
    Left,
    LeftHold,
    Right,
    RightHold,
    Down,
    UpLeft,
    UpCenter,
    UpRight,
    UpHoldLeft,
    UpHoldCenter,
    UpHoldRight,
}

impl GestureKey {
    pub const ALL: [GestureKey; 16] = [
        GestureKey::Tap,
        GestureKey::DoubleTap,
        GestureKey::Hold,
        GestureKey::Up,
        GestureKey::UpHold,
        GestureKey::Left,
        GestureKey::LeftHold,
        GestureKey::Right,
        GestureKey::RightHold,
        GestureKey::Down,
        GestureKey::UpLeft,
        GestureKey::UpCenter,
        GestureKey::UpRight,
        GestureKey::UpHoldLeft,
        GestureKey::UpHoldCenter,
        GestureKey::UpHoldRight,
    ];

    pub fn config_key(self) -> &'static str {
        match self {
            GestureKey::Tap => "action_tap",
            GestureKey::DoubleTap => "action_double_tap",
            GestureKey::Hold => "action_hold",
            GestureKey::Up => "action_up",
            GestureKey::UpHold => "action_up_hold",
            GestureKey::Left => "action_left",
            GestureKey::LeftHold => "action_left_hold",
            GestureKey::Right => "action_right",
            GestureKey::RightHold => "action_right_hold",
            GestureKey::Down => "action_down",
            GestureKey::UpLeft => "action_up_left",
            GestureKey::UpCenter => "action_up_center",
            GestureKey::UpRight => "action_up_right",
            GestureKey::UpHoldLeft => "action_up_hold_left",
            GestureKey::UpHoldCenter => "action_up_hold_center",
            GestureKey::UpHoldRight => "action_up_hold_right",
        }
    }

    pub fn from_config_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.config_key() == key)
    }

    /// Only the up and up-hold keys take part in sectioning
    pub fn is_sectionable(self) -> bool {
        matches!(self, GestureKey::Up | GestureKey::UpHold)
    }

    pub fn sectioned(self, section: Section) -> Self {
        match (self, section) {
            (GestureKey::Up, Section::Left) => GestureKey::UpLeft,
            (GestureKey::Up, Section::Center) => GestureKey::UpCenter,
            (GestureKey::Up, Section::Right) => GestureKey::UpRight,
            (GestureKey::UpHold, Section::Left) => GestureKey::UpHoldLeft,
            (GestureKey::UpHold, Section::Center) => GestureKey::UpHoldCenter,
            (GestureKey::UpHold, Section::Right) => GestureKey::UpHoldRight,
            (key, _) => key,
        }
    }

    /// True for keys whose gesture moved the pill up (the return animation
    /// is cut short when they hide it)
    pub fn is_upward(self) -> bool {
        matches!(
            self,
            GestureKey::Up
                | GestureKey::UpHold
                | GestureKey::UpLeft
                | GestureKey::UpCenter
                | GestureKey::UpRight
                | GestureKey::UpHoldLeft
                | GestureKey::UpHoldCenter
                | GestureKey::UpHoldRight
        )
    }

    pub fn default_action(self) -> ActionType {
        match self {
            GestureKey::Tap => ActionType::Home,
            GestureKey::DoubleTap => ActionType::NoAction,
            GestureKey::Hold => ActionType::Assist,
            GestureKey::Up => ActionType::NoAction,
            GestureKey::UpHold => ActionType::NoAction,
            GestureKey::Left => ActionType::Back,
            GestureKey::LeftHold => ActionType::NoAction,
            GestureKey::Right => ActionType::Recents,
            GestureKey::RightHold => ActionType::NoAction,
            GestureKey::Down => ActionType::Hide,
            GestureKey::UpLeft => ActionType::Back,
            GestureKey::UpCenter => ActionType::Home,
            GestureKey::UpRight => ActionType::Back,
            GestureKey::UpHoldLeft => ActionType::NoAction,
            GestureKey::UpHoldCenter => ActionType::Recents,
            GestureKey::UpHoldRight => ActionType::NoAction,
        }
    }
}

impl fmt::Display for GestureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.config_key())
    }
}

/// What a gesture does; stored in config as its ordinal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    NoAction,
    Back,
    Home,
    Recents,
    Hide,
    SwitchApp,
    Assist,
    Notifications,
    QuickSettings,
    SplitScreen,
    PowerDialog,
    ToggleNav,
    ToggleImmersive,
    ScreenOff,
    Screenshot,
}

impl ActionType {
    pub fn ordinal(self) -> i64 {
        match self {
            ActionType::NoAction => 0,
            ActionType::Back => 1,
            ActionType::Home => 2,
            ActionType::Recents => 3,
            ActionType::Hide => 4,
            ActionType::SwitchApp => 5,
            ActionType::Assist => 6,
            ActionType::Notifications => 7,
            ActionType::QuickSettings => 8,
            ActionType::SplitScreen => 9,
            ActionType::PowerDialog => 10,
            ActionType::ToggleNav => 11,
            ActionType::ToggleImmersive => 12,
            ActionType::ScreenOff => 13,
            ActionType::Screenshot => 14,
        }
    }

    pub fn from_ordinal(ordinal: i64) -> Option<Self> {
        Some(match ordinal {
            0 => ActionType::NoAction,
            1 => ActionType::Back,
            2 => ActionType::Home,
            3 => ActionType::Recents,
            4 => ActionType::Hide,
            5 => ActionType::SwitchApp,
            6 => ActionType::Assist,
            7 => ActionType::Notifications,
            8 => ActionType::QuickSettings,
            9 => ActionType::SplitScreen,
            10 => ActionType::PowerDialog,
            11 => ActionType::ToggleNav,
            12 => ActionType::ToggleImmersive,
            13 => ActionType::ScreenOff,
            14 => ActionType::Screenshot,
            _ => return None,
        })
    }
}

/// Immutable gesture key -> action type snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionMap {
    actions: HashMap<GestureKey, ActionType>,
}

impl Default for ActionMap {
    fn default() -> Self {
        Self {
            actions: GestureKey::ALL
                .into_iter()
                .map(|k| (k, k.default_action()))
                .collect(),
        }
    }
}

impl ActionMap {
    /// Read every action key, falling back to the per-key default
    pub fn load(store: &dyn ConfigStore) -> Arc<Self> {
        let mut actions = HashMap::new();
        for key in GestureKey::ALL {
            let default = key.default_action();
            let ordinal = store.get_i64(key.config_key(), default.ordinal());
            let action = ActionType::from_ordinal(ordinal).unwrap_or_else(|| {
                warn!(key = key.config_key(), ordinal, "Unknown action type, using default");
                default
            });
            actions.insert(key, action);
        }
        Arc::new(Self { actions })
    }

    pub fn with(mut self, key: GestureKey, action: ActionType) -> Self {
        self.actions.insert(key, action);
        self
    }

    pub fn get(&self, key: GestureKey) -> ActionType {
        self.actions
            .get(&key)
            .copied()
            .unwrap_or_else(|| key.default_action())
    }
}

/// A gesture resolved against the current map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatch {
    pub key: GestureKey,
    pub action: ActionType,
}

/// Resolve a gesture to its key and action; sections only apply to
/// sectionable keys when sectioned mode is on
pub fn resolve(
    map: &ActionMap,
    gesture: Gesture,
    section: Option<Section>,
    sectioned: bool,
) -> Dispatch {
    let mut key = gesture.key();
    if sectioned && key.is_sectionable() {
        if let Some(section) = section {
            key = key.sectioned(section);
        }
    }
    let action = map.get(key);
    debug!(?gesture, %key, ?action, "Resolved gesture");
    Dispatch { key, action }
}

/// Haptic/audio feedback accompanying an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feedback {
    pub duration: Duration,
    pub strength: i64,
    /// Double-tap vibrates twice
    pub pulses: u8,
    pub sound: bool,
}

/// Sink for navigation actions (back, home, recents, ...)
pub trait ActionExecutor {
    fn execute(&mut self, action: ActionType, key: GestureKey);
    fn feedback(&mut self, feedback: Feedback);
}

/// Privileged executor used when root commands are enabled
pub trait RootExecutor {
    fn execute_root(&mut self, action: ActionType);
}
