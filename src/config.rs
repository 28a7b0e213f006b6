//! Configuration for the gesture pill
//!
//! Settings live in a flat key-value store (a JSON object on disk by
//! default). The core never reads the store on hot paths: it loads an
//! immutable `PillSettings` snapshot and swaps it wholesale whenever a key
//! changes. Values that are missing or malformed fall back to per-key
//! defaults.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::error::Result;

/// Key-value configuration provider
pub trait ConfigStore: Send {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&mut self, key: &str, value: Value);
    fn remove(&mut self, key: &str) -> bool;
    fn keys(&self) -> Vec<String>;

    /// Make pending edits durable; in-memory stores have nothing to do
    fn persist(&mut self) -> Result<()> {
        Ok(())
    }

    /// Booleans may be stored as JSON bools or as "true"/"false" strings
    fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            None => default,
            Some(Value::Bool(b)) => b,
            Some(Value::String(s)) => match s.as_str() {
                "true" => true,
                "false" => false,
                _ => {
                    warn!(key, value = %s, "Invalid boolean in config, using default");
                    default
                }
            },
            Some(other) => {
                warn!(key, value = %other, "Invalid boolean in config, using default");
                default
            }
        }
    }

    /// Integers may be stored as numbers or numeric strings
    fn get_i64(&self, key: &str, default: i64) -> i64 {
        match self.get(key) {
            None => default,
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .unwrap_or(default),
            Some(Value::String(s)) => s.trim().parse().unwrap_or_else(|_| {
                warn!(key, value = %s, "Invalid integer in config, using default");
                default
            }),
            Some(other) => {
                warn!(key, value = %other, "Invalid integer in config, using default");
                default
            }
        }
    }

    fn get_f64(&self, key: &str, default: f64) -> f64 {
        match self.get(key) {
            None => default,
            Some(Value::Number(n)) => n.as_f64().unwrap_or(default),
            Some(Value::String(s)) => s.trim().parse().unwrap_or_else(|_| {
                warn!(key, value = %s, "Invalid number in config, using default");
                default
            }),
            Some(other) => {
                warn!(key, value = %other, "Invalid number in config, using default");
                default
            }
        }
    }

    fn get_string_set(&self, key: &str) -> HashSet<String> {
        match self.get(key) {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            Some(Value::String(s)) => s
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            _ => HashSet::new(),
        }
    }
}

/// Config file path (~/.local/state/flick/pill_config.json)
pub fn default_config_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".local/state/flick/pill_config.json"))
}

/// Store persisted as a pretty-printed JSON object
#[derive(Debug, Clone)]
pub struct JsonConfigStore {
    path: PathBuf,
    values: Map<String, Value>,
}

impl JsonConfigStore {
    /// Load from `path`, starting empty if the file is missing or invalid
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<Map<String, Value>>(&contents) {
                Ok(values) => {
                    info!("Loaded pill config from {:?}", path);
                    values
                }
                Err(e) => {
                    warn!("Invalid pill config {:?}: {}, using defaults", path, e);
                    Map::new()
                }
            },
            Err(_) => {
                info!("No pill config at {:?}, using defaults", path);
                Map::new()
            }
        };
        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the store back to disk, creating the parent directory
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, json)?;
        info!("Saved pill config to {:?}", self.path);
        Ok(())
    }
}

impl ConfigStore for JsonConfigStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn persist(&mut self) -> Result<()> {
        self.save()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) -> bool {
        self.values.remove(key).is_some()
    }

    fn keys(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }
}

/// In-memory store, used by tests and replay scripts
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigStore {
    values: Map<String, Value>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) -> bool {
        self.values.remove(key).is_some()
    }

    fn keys(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }
}

/// Hide and fade options that cancel each other out when enabled
const EXCLUSIVE_PAIRS: &[(&str, &str)] = &[
    ("auto_hide_pill", "fade_after_specified_delay"),
    ("hide_in_fullscreen", "fade_in_fullscreen_apps"),
];

/// Set a key, disabling the competing hide/fade option when one is enabled.
/// Returns every key that changed.
pub fn edit(store: &mut dyn ConfigStore, key: &str, value: Value) -> Vec<String> {
    let mut changed = vec![key.to_string()];
    let enabling = matches!(value, Value::Bool(true));
    store.set(key, value);

    if enabling {
        for (a, b) in EXCLUSIVE_PAIRS {
            let other = if key == *a {
                *b
            } else if key == *b {
                *a
            } else {
                continue;
            };
            if store.get_bool(other, false) {
                store.set(other, Value::Bool(false));
                changed.push(other.to_string());
            }
        }
    }
    changed
}

/// Size/position preferences (percentages are tenths of a percent)
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryPrefs {
    pub width_percent: i64,
    pub width_px: i64,
    pub use_pixels_width: bool,
    pub height_percent: i64,
    pub height_px: i64,
    pub use_pixels_height: bool,
    pub x_percent: i64,
    pub x_px: i64,
    pub use_pixels_x: bool,
    /// None means "centered on the nav bar strip"
    pub y_percent: Option<i64>,
    pub y_px: Option<i64>,
    pub use_pixels_y: bool,
    pub nav_bar_height: i64,
}

impl Default for GeometryPrefs {
    fn default() -> Self {
        Self {
            width_percent: 200,   // 20% of screen width
            width_px: 400,
            use_pixels_width: false,
            height_percent: 12,   // 1.2% of screen height
            height_px: 24,
            use_pixels_height: false,
            x_percent: 0,
            x_px: 0,
            use_pixels_x: false,
            y_percent: None,
            y_px: None,
            use_pixels_y: false,
            nav_bar_height: 96,
        }
    }
}

/// Colors and shape of the pill
#[derive(Debug, Clone, PartialEq)]
pub struct Appearance {
    /// ARGB
    pub background: u32,
    /// ARGB
    pub foreground: u32,
    pub corner_radius: i64,
    pub show_shadow: bool,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            background: 0xE6FF_FFFF,
            foreground: 0xFF00_0000,
            corner_radius: 12,
            show_shadow: true,
        }
    }
}

/// Immutable snapshot of every setting the core reads
#[derive(Debug, Clone, PartialEq)]
pub struct PillSettings {
    pub is_active: bool,
    pub hide_nav: bool,
    pub auto_hide: bool,
    pub auto_fade: bool,
    pub hide_in_fullscreen: bool,
    pub fade_in_fullscreen: bool,
    pub hide_on_keyboard: bool,
    pub show_nav_with_keyboard: bool,
    pub sectioned_pill: bool,
    pub anchor_pill: bool,
    pub rot270_fix: bool,
    pub rot180_fix: bool,
    pub tablet_mode: bool,
    pub enable_in_car_mode: bool,
    pub larger_hitbox: bool,
    pub static_pill: bool,
    pub overlay_nav: bool,
    pub overlay_nav_blackout: bool,
    pub full_overscan: bool,
    pub orig_nav_in_immersive: bool,
    pub immersive_nav: bool,
    pub lockscreen_overscan: bool,
    pub audio_feedback: bool,
    pub use_root: bool,

    pub geometry: GeometryPrefs,
    pub appearance: Appearance,

    pub nav_blacklist: HashSet<String>,
    pub bar_blacklist: HashSet<String>,
    pub imm_blacklist: HashSet<String>,

    pub hold_time: Duration,
    pub vibration_duration: Duration,
    pub vibration_strength: i64,
    pub anim_duration: Duration,
    pub fade_duration: Duration,
    pub fade_opacity: f64,
    pub auto_hide_time: Duration,
    pub hide_in_fullscreen_time: Duration,
    pub hide_on_keyboard_time: Duration,
    pub fade_after_time: Duration,
    pub fade_in_fullscreen_time: Duration,
    pub x_threshold: f64,
    pub y_threshold: f64,
}

impl Default for PillSettings {
    fn default() -> Self {
        Self {
            is_active: true,
            hide_nav: false,
            auto_hide: false,
            auto_fade: false,
            hide_in_fullscreen: false,
            fade_in_fullscreen: false,
            hide_on_keyboard: false,
            show_nav_with_keyboard: false,
            sectioned_pill: false,
            anchor_pill: false,
            rot270_fix: false,
            rot180_fix: false,
            tablet_mode: false,
            enable_in_car_mode: false,
            larger_hitbox: false,
            static_pill: false,
            overlay_nav: false,
            overlay_nav_blackout: false,
            full_overscan: false,
            orig_nav_in_immersive: false,
            immersive_nav: false,
            lockscreen_overscan: false,
            audio_feedback: false,
            use_root: false,
            geometry: GeometryPrefs::default(),
            appearance: Appearance::default(),
            nav_blacklist: HashSet::new(),
            bar_blacklist: HashSet::new(),
            imm_blacklist: HashSet::new(),
            hold_time: Duration::from_millis(500),
            vibration_duration: Duration::from_millis(20),
            vibration_strength: 128,
            anim_duration: Duration::from_millis(150),
            fade_duration: Duration::from_millis(200),
            fade_opacity: 0.5,
            auto_hide_time: Duration::from_millis(1500),
            hide_in_fullscreen_time: Duration::from_millis(1500),
            hide_on_keyboard_time: Duration::from_millis(1500),
            fade_after_time: Duration::from_millis(3000),
            fade_in_fullscreen_time: Duration::from_millis(1500),
            x_threshold: 40.0,  // px sideways before left/right commits
            y_threshold: 30.0,  // px vertically before up/down commits
        }
    }
}

fn millis(store: &dyn ConfigStore, key: &str, default: Duration) -> Duration {
    let ms = store.get_i64(key, default.as_millis() as i64);
    if ms < 0 {
        warn!(key, ms, "Negative duration in config, using default");
        return default;
    }
    Duration::from_millis(ms as u64)
}

fn optional_i64(store: &dyn ConfigStore, key: &str) -> Option<i64> {
    store.get(key)?;
    Some(store.get_i64(key, 0))
}

/// Largest pixel value accepted for any size or position preference
pub const MAX_PIXELS: i64 = 16_384;

fn bounded(key: &str, value: i64, min: i64, max: i64) -> i64 {
    let clamped = value.clamp(min, max);
    if clamped != value {
        warn!(key, value, clamped, "Geometry value out of range, clamping");
    }
    clamped
}

fn bounded_i64(store: &dyn ConfigStore, key: &str, default: i64, min: i64, max: i64) -> i64 {
    bounded(key, store.get_i64(key, default), min, max)
}

fn bounded_optional(store: &dyn ConfigStore, key: &str, min: i64, max: i64) -> Option<i64> {
    optional_i64(store, key).map(|v| bounded(key, v, min, max))
}

impl PillSettings {
    /// Build a snapshot from the store, falling back to defaults per key
    pub fn load(store: &dyn ConfigStore) -> Self {
        let d = Self::default();
        let g = GeometryPrefs::default();
        let a = Appearance::default();

        Self {
            is_active: store.get_bool("is_active", d.is_active),
            hide_nav: store.get_bool("hide_nav", d.hide_nav),
            auto_hide: store.get_bool("auto_hide_pill", d.auto_hide),
            auto_fade: store.get_bool("fade_after_specified_delay", d.auto_fade),
            hide_in_fullscreen: store.get_bool("hide_in_fullscreen", d.hide_in_fullscreen),
            fade_in_fullscreen: store.get_bool("fade_in_fullscreen_apps", d.fade_in_fullscreen),
            hide_on_keyboard: store.get_bool("hide_pill_on_keyboard", d.hide_on_keyboard),
            show_nav_with_keyboard: store
                .get_bool("show_nav_with_keyboard", d.show_nav_with_keyboard),
            sectioned_pill: store.get_bool("sectioned_pill", d.sectioned_pill),
            anchor_pill: store.get_bool("anchor_pill", d.anchor_pill),
            rot270_fix: store.get_bool("rot270_fix", d.rot270_fix),
            rot180_fix: store.get_bool("rot180_fix", d.rot180_fix),
            tablet_mode: store.get_bool("tablet_mode", d.tablet_mode),
            enable_in_car_mode: store.get_bool("enable_in_car_mode", d.enable_in_car_mode),
            larger_hitbox: store.get_bool("larger_hitbox", d.larger_hitbox),
            static_pill: store.get_bool("static_pill", d.static_pill),
            overlay_nav: store.get_bool("overlay_nav", d.overlay_nav),
            overlay_nav_blackout: store.get_bool("overlay_nav_blackout", d.overlay_nav_blackout),
            full_overscan: store.get_bool("full_overscan", d.full_overscan),
            orig_nav_in_immersive: store
                .get_bool("orig_nav_in_immersive", d.orig_nav_in_immersive),
            immersive_nav: store
                .get_bool("use_immersive_mode_when_nav_hidden", d.immersive_nav),
            lockscreen_overscan: store.get_bool("lockscreen_overscan", d.lockscreen_overscan),
            audio_feedback: store.get_bool("audio_feedback", d.audio_feedback),
            use_root: store.get_bool("use_root", d.use_root),

            geometry: GeometryPrefs {
                width_percent: bounded_i64(store, "custom_width_percent", g.width_percent, 0, 1000),
                width_px: bounded_i64(store, "custom_width", g.width_px, 0, MAX_PIXELS),
                use_pixels_width: store.get_bool("use_pixels_width", g.use_pixels_width),
                height_percent: bounded_i64(store, "custom_height_percent", g.height_percent, 0, 1000),
                height_px: bounded_i64(store, "custom_height", g.height_px, 0, MAX_PIXELS),
                use_pixels_height: store.get_bool("use_pixels_height", g.use_pixels_height),
                x_percent: bounded_i64(store, "custom_x_percent", g.x_percent, -1000, 1000),
                x_px: bounded_i64(store, "custom_x", g.x_px, -MAX_PIXELS, MAX_PIXELS),
                use_pixels_x: store.get_bool("use_pixels_x", g.use_pixels_x),
                y_percent: bounded_optional(store, "custom_y_percent", -2000, 2000),
                y_px: bounded_optional(store, "custom_y", -MAX_PIXELS, MAX_PIXELS),
                use_pixels_y: store.get_bool("use_pixels_y", g.use_pixels_y),
                nav_bar_height: bounded_i64(store, "nav_bar_height", g.nav_bar_height, 0, MAX_PIXELS),
            },
            appearance: Appearance {
                background: store.get_i64("pill_bg", a.background as i64) as u32,
                foreground: store.get_i64("pill_fg", a.foreground as i64) as u32,
                corner_radius: store.get_i64("pill_corner_radius", a.corner_radius),
                show_shadow: store.get_bool("show_shadow", a.show_shadow),
            },

            nav_blacklist: store.get_string_set("blacklisted_nav_apps"),
            bar_blacklist: store.get_string_set("blacklisted_bar_apps"),
            imm_blacklist: store.get_string_set("blacklisted_imm_apps"),

            hold_time: millis(store, "hold_time", d.hold_time),
            vibration_duration: millis(store, "vibration_duration", d.vibration_duration),
            vibration_strength: store.get_i64("vibration_strength", d.vibration_strength),
            anim_duration: millis(store, "anim_duration", d.anim_duration),
            fade_duration: millis(store, "fade_duration", d.fade_duration),
            fade_opacity: store.get_f64("fade_opacity", d.fade_opacity).clamp(0.0, 1.0),
            auto_hide_time: millis(store, "auto_hide_pill_progress", d.auto_hide_time),
            hide_in_fullscreen_time: millis(
                store,
                "hide_in_fullscreen_progress",
                d.hide_in_fullscreen_time,
            ),
            hide_on_keyboard_time: millis(
                store,
                "hide_pill_on_keyboard_progress",
                d.hide_on_keyboard_time,
            ),
            fade_after_time: millis(store, "fade_after_specified_delay_progress", d.fade_after_time),
            fade_in_fullscreen_time: millis(
                store,
                "fade_in_fullscreen_apps_progress",
                d.fade_in_fullscreen_time,
            ),
            x_threshold: store.get_f64("x_threshold", d.x_threshold),
            y_threshold: store.get_f64("y_threshold", d.y_threshold),
        }
    }

    /// Overscan hiding is only meaningful with a nav bar to hide
    pub fn uses_overscan(&self) -> bool {
        self.hide_nav
    }

    /// Static pill, unless the pill is drawn over the nav bar
    pub fn pins_static(&self) -> bool {
        self.static_pill && !self.overlay_nav
    }

    /// Show the nav bar with the keyboard, unless the pill is drawn over it
    pub fn nav_follows_keyboard(&self) -> bool {
        self.show_nav_with_keyboard && !self.overlay_nav
    }

    /// Hide wins when both the hide and fade flavours are on
    pub fn auto_fade_effective(&self) -> bool {
        self.auto_fade && !self.auto_hide
    }

    pub fn fade_in_fullscreen_effective(&self) -> bool {
        self.fade_in_fullscreen && !self.hide_in_fullscreen
    }
}

/// How a changed key affects the running coordinators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigImpact {
    Actions,
    Geometry,
    Appearance,
    NavSuppression,
    Activation,
    Blacklists,
    Behavior,
}

pub fn classify_key(key: &str) -> ConfigImpact {
    match key {
        k if k.starts_with("action_") => ConfigImpact::Actions,
        "custom_width_percent" | "custom_width" | "use_pixels_width" | "custom_height_percent"
        | "custom_height" | "use_pixels_height" | "custom_x_percent" | "custom_x"
        | "use_pixels_x" | "custom_y_percent" | "custom_y" | "use_pixels_y" | "larger_hitbox"
        | "anchor_pill" | "static_pill" | "nav_bar_height" => ConfigImpact::Geometry,
        "pill_bg" | "pill_fg" | "pill_corner_radius" | "show_shadow" => ConfigImpact::Appearance,
        "hide_nav" | "rot270_fix" | "rot180_fix" | "tablet_mode" | "full_overscan"
        | "overlay_nav" | "overlay_nav_blackout" | "use_immersive_mode_when_nav_hidden"
        | "orig_nav_in_immersive" | "lockscreen_overscan" => ConfigImpact::NavSuppression,
        "is_active" => ConfigImpact::Activation,
        "blacklisted_nav_apps" | "blacklisted_bar_apps" | "blacklisted_imm_apps" => {
            ConfigImpact::Blacklists
        }
        _ => ConfigImpact::Behavior,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_when_store_empty() {
        let settings = PillSettings::load(&MemoryConfigStore::new());
        assert_eq!(settings, PillSettings::default());
    }

    #[test]
    fn test_malformed_values_fall_back() {
        let store = MemoryConfigStore::new()
            .with("hold_time", "soon")
            .with("hide_nav", 7)
            .with("anim_duration", "250")
            .with("x_threshold", -1);
        let settings = PillSettings::load(&store);
        assert_eq!(settings.hold_time, Duration::from_millis(500));
        assert!(!settings.hide_nav);
        assert_eq!(settings.anim_duration, Duration::from_millis(250));
        assert_eq!(settings.x_threshold, -1.0);
    }

    #[test]
    fn test_geometry_values_clamped_on_load() {
        let store = MemoryConfigStore::new()
            .with("custom_width", (1_i64 << 32) + 400)
            .with("custom_height", i64::MAX)
            .with("custom_x", i64::MIN)
            .with("custom_y", -99_999)
            .with("custom_width_percent", 5000)
            .with("nav_bar_height", -10);
        let g = PillSettings::load(&store).geometry;
        assert_eq!(g.width_px, MAX_PIXELS);
        assert_eq!(g.height_px, MAX_PIXELS);
        assert_eq!(g.x_px, -MAX_PIXELS);
        assert_eq!(g.y_px, Some(-MAX_PIXELS));
        assert_eq!(g.width_percent, 1000);
        assert_eq!(g.nav_bar_height, 0);
    }

    #[test]
    fn test_overlay_nav_overrides_static_and_keyboard() {
        let store = MemoryConfigStore::new()
            .with("static_pill", true)
            .with("show_nav_with_keyboard", true);
        let settings = PillSettings::load(&store);
        assert!(settings.pins_static());
        assert!(settings.nav_follows_keyboard());

        let settings = PillSettings::load(&store.with("overlay_nav", true));
        assert!(!settings.pins_static());
        assert!(!settings.nav_follows_keyboard());
    }

    #[test]
    fn test_blacklist_accepts_array_or_csv() {
        let store = MemoryConfigStore::new()
            .with("blacklisted_nav_apps", json!(["org.game", "org.video"]))
            .with("blacklisted_bar_apps", "org.maps, org.camera");
        let settings = PillSettings::load(&store);
        assert!(settings.nav_blacklist.contains("org.video"));
        assert!(settings.bar_blacklist.contains("org.camera"));
        assert!(settings.imm_blacklist.is_empty());
    }

    #[test]
    fn test_edit_enforces_hide_fade_exclusion() {
        let mut store = MemoryConfigStore::new().with("fade_after_specified_delay", true);
        let changed = edit(&mut store, "auto_hide_pill", json!(true));
        assert_eq!(changed, vec!["auto_hide_pill", "fade_after_specified_delay"]);
        assert!(!store.get_bool("fade_after_specified_delay", true));

        let changed = edit(&mut store, "fade_in_fullscreen_apps", json!(true));
        assert_eq!(changed, vec!["fade_in_fullscreen_apps"]);

        edit(&mut store, "hide_in_fullscreen", json!(true));
        assert!(!store.get_bool("fade_in_fullscreen_apps", true));
    }

    #[test]
    fn test_hide_preferred_when_both_set() {
        let store = MemoryConfigStore::new()
            .with("auto_hide_pill", true)
            .with("fade_after_specified_delay", true);
        let settings = PillSettings::load(&store);
        assert!(settings.auto_hide);
        assert!(!settings.auto_fade_effective());
    }

    #[test]
    fn test_json_store_roundtrip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/pill_config.json");

        let mut store = JsonConfigStore::load(&path);
        assert!(store.keys().is_empty());
        store.set("hide_nav", json!(true));
        store.set("action_up", json!("2"));
        store.save().unwrap();

        let reloaded = JsonConfigStore::load(&path);
        assert!(reloaded.get_bool("hide_nav", false));
        assert_eq!(reloaded.get_i64("action_up", 0), 2);
    }

    #[test]
    fn test_json_store_invalid_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pill_config.json");
        std::fs::write(&path, "{ not json").unwrap();
        let store = JsonConfigStore::load(&path);
        assert!(store.keys().is_empty());
    }

    #[test]
    fn test_classify_key() {
        assert_eq!(classify_key("action_up_hold_left"), ConfigImpact::Actions);
        assert_eq!(classify_key("custom_y_percent"), ConfigImpact::Geometry);
        assert_eq!(classify_key("rot270_fix"), ConfigImpact::NavSuppression);
        assert_eq!(classify_key("hold_time"), ConfigImpact::Behavior);
    }
}
