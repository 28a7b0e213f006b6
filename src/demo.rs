//! Scripted signal replay
//!
//! A script is a TOML file with the config to start from, the screen size
//! and a list of timed signals. Replay runs on a virtual clock so a script
//! always produces the same result:
//!
//! ```toml
//! name = "swipe up"
//! [config]
//! action_up = 2
//! [[step]]
//! at_ms = 0
//! signal = { type = "touch", kind = "down", x = 540.0, y = 2290.0 }
//! ```

use std::path::Path;
use std::time::{Duration, Instant};

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::config::MemoryConfigStore;
use crate::error::{Error, Result};
use crate::reasons::HiddenReason;
use crate::shell::overlay::Visibility;
use crate::signals::Signal;
use crate::state::{Collaborators, DisplayState, PillContext};
use crate::system::overscan::Insets;

fn default_width() -> i32 {
    1080
}

fn default_height() -> i32 {
    2340
}

fn default_settle() -> u64 {
    2000
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Screen {
    #[serde(default = "default_width")]
    pub width: i32,
    #[serde(default = "default_height")]
    pub height: i32,
}

impl Default for Screen {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    pub at_ms: u64,
    pub signal: Signal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub screen: Screen,
    #[serde(default)]
    pub config: Map<String, Value>,
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
    /// Time to keep running timers after the last step
    #[serde(default = "default_settle")]
    pub settle_ms: u64,
}

impl Script {
    pub fn parse(text: &str) -> Result<Self> {
        let script: Script = toml::from_str(text)?;
        if script.screen.width <= 0 || script.screen.height <= 0 {
            return Err(Error::InvalidScript("screen size must be positive".into()));
        }
        if let Some(pair) = script.steps.windows(2).find(|w| w[1].at_ms < w[0].at_ms) {
            return Err(Error::InvalidScript(format!(
                "step at {}ms comes after a step at {}ms",
                pair[1].at_ms, pair[0].at_ms
            )));
        }
        Ok(script)
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::parse(&std::fs::read_to_string(path)?)
    }

    pub fn config_store(&self) -> MemoryConfigStore {
        self.config
            .iter()
            .fold(MemoryConfigStore::new(), |store, (k, v)| store.with(k, v.clone()))
    }

    pub fn display(&self) -> DisplayState {
        DisplayState::new(self.screen.width, self.screen.height)
    }

    /// Build a context for this script around `parts`
    pub fn context(&self, parts: Collaborators) -> PillContext {
        PillContext::new(Box::new(self.config_store()), parts, self.display())
    }
}

/// Where things ended up after a replay
#[derive(Debug, Clone, PartialEq)]
pub struct ReplaySummary {
    pub attached: bool,
    pub visibility: Visibility,
    pub hidden_reasons: Vec<HiddenReason>,
    pub nav_insets: Insets,
    pub nav_immersive: bool,
    pub running: bool,
}

impl ReplaySummary {
    fn of(ctx: &PillContext) -> Self {
        Self {
            attached: ctx.overlay().is_attached(),
            visibility: ctx.overlay().visibility(),
            hidden_reasons: ctx.overlay().log().iter().collect(),
            nav_insets: *ctx.nav().applied(),
            nav_immersive: ctx.immersive().is_nav_immersive(),
            running: ctx.is_running(),
        }
    }
}

/// Start `ctx` at `t0` and feed it every step on the virtual clock
pub fn replay(script: &Script, ctx: &mut PillContext, t0: Instant) -> ReplaySummary {
    ctx.start(t0);
    let mut last = 0;
    for step in &script.steps {
        let at = t0 + Duration::from_millis(step.at_ms);
        ctx.advance_to(at);
        ctx.handle_signal(step.signal.clone(), at);
        last = step.at_ms;
    }
    ctx.advance_to(t0 + Duration::from_millis(last + script.settle_ms));
    ReplaySummary::of(ctx)
}

/// Replay a script file against logging collaborators
pub fn run(path: &Path, parts: Collaborators) -> Result<ReplaySummary> {
    let script = Script::load(path)?;
    info!(name = %script.name, steps = script.steps.len(), "Replaying script");
    let mut ctx = script.context(parts);
    let summary = replay(&script, &mut ctx, Instant::now());
    info!(?summary, "Replay finished");
    Ok(summary)
}
