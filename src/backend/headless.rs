//! Headless backend
//!
//! Runs the pill context on a calloop logic loop fed by JSON-line signals
//! on stdin. Window operations go through the view thread to logging
//! surfaces, actions are logged, and overscan/immersive calls either hit
//! the real `wm`/`settings` tools or are only logged.

use std::io::BufRead;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use calloop::channel::{self, Event, Sender};
use calloop::EventLoop;
use tracing::{debug, error, info, warn};

use super::view::ViewQueue;
use crate::config::{default_config_path, Appearance, ConfigStore, JsonConfigStore, MemoryConfigStore};
use crate::error::SurfaceError;
use crate::input::{ActionExecutor, ActionType, Feedback, GestureKey, RootExecutor};
use crate::shell::blackout::BlackoutSurface;
use crate::shell::geometry::OverlayGeometry;
use crate::shell::overlay::{OverlaySurface, SurfaceFrame};
use crate::shell::primitives::{Color, Side};
use crate::signals::Signal;
use crate::state::{Collaborators, DisplayState, PillContext};
use crate::system::capability::NoEdgePanel;
use crate::system::immersive::{ImmersiveControl, MemoryImmersive, SettingsImmersive};
use crate::system::overscan::{LoggingOverscan, OverscanControl, WmOverscan};

/// Overlay window stand-in that logs every operation
#[derive(Debug, Default)]
pub struct LoggingSurface {
    attached: bool,
}

impl OverlaySurface for LoggingSurface {
    fn attach(
        &mut self,
        geometry: &OverlayGeometry,
        appearance: &Appearance,
    ) -> std::result::Result<(), SurfaceError> {
        info!(
            x = geometry.x,
            y = geometry.y,
            width = geometry.width,
            height = geometry.height,
            background = format_args!("{:#010x}", appearance.background),
            "Overlay attached"
        );
        self.attached = true;
        Ok(())
    }

    fn detach(&mut self) -> std::result::Result<(), SurfaceError> {
        if !self.attached {
            return Err(SurfaceError::NotAttached);
        }
        info!("Overlay detached");
        self.attached = false;
        Ok(())
    }

    fn update_layout(&mut self, geometry: &OverlayGeometry) -> std::result::Result<(), SurfaceError> {
        if !self.attached {
            return Err(SurfaceError::NotAttached);
        }
        debug!(x = geometry.x, y = geometry.y, "Overlay layout");
        Ok(())
    }

    fn animate_to(&mut self, frame: &SurfaceFrame, duration: Duration) -> std::result::Result<(), SurfaceError> {
        if !self.attached {
            return Err(SurfaceError::NotAttached);
        }
        debug!(
            x = frame.geometry.x,
            y = frame.geometry.y,
            alpha = frame.alpha,
            translation = frame.translation,
            ms = duration.as_millis() as u64,
            "Overlay animate"
        );
        Ok(())
    }

    fn set_appearance(&mut self, appearance: &Appearance) -> std::result::Result<(), SurfaceError> {
        debug!(?appearance, "Overlay appearance");
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct LoggingBlackout;

impl BlackoutSurface for LoggingBlackout {
    fn add(&mut self, side: Side, thickness: i32, color: Color) -> std::result::Result<(), SurfaceError> {
        info!(?side, thickness, color = format_args!("{:#010x}", color), "Blackout strip shown");
        Ok(())
    }

    fn remove(&mut self) -> std::result::Result<(), SurfaceError> {
        info!("Blackout strip removed");
        Ok(())
    }
}

/// Logs navigation actions instead of injecting them
#[derive(Debug, Default, Clone)]
pub struct LoggingExecutor;

impl ActionExecutor for LoggingExecutor {
    fn execute(&mut self, action: ActionType, key: GestureKey) {
        info!(?action, %key, "Executing action");
    }

    fn feedback(&mut self, feedback: Feedback) {
        debug!(
            ms = feedback.duration.as_millis() as u64,
            strength = feedback.strength,
            pulses = feedback.pulses,
            sound = feedback.sound,
            "Feedback"
        );
    }
}

impl RootExecutor for LoggingExecutor {
    fn execute_root(&mut self, action: ActionType) {
        info!(?action, "Root action");
    }
}

#[derive(Debug, Clone)]
pub struct Options {
    /// Config file; `None` uses the default path
    pub config: Option<PathBuf>,
    /// Run `wm overscan` and `settings put` for real
    pub apply_overscan: bool,
    pub width: i32,
    pub height: i32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            config: None,
            apply_overscan: false,
            width: 1080,
            height: 2340,
        }
    }
}

pub fn config_store(options: &Options) -> Box<dyn ConfigStore> {
    match options.config.clone().or_else(default_config_path) {
        Some(path) => Box::new(JsonConfigStore::load(path)),
        None => {
            warn!("No HOME and no --config, settings will not be saved");
            Box::new(MemoryConfigStore::new())
        }
    }
}

fn system_controls(apply: bool) -> (Box<dyn OverscanControl>, Box<dyn ImmersiveControl>) {
    if apply {
        (Box::new(WmOverscan::default()), Box::new(SettingsImmersive::default()))
    } else {
        (Box::new(LoggingOverscan), Box::new(MemoryImmersive::default()))
    }
}

/// Collaborators that call straight into logging surfaces (script replay)
pub fn logging_collaborators(apply_overscan: bool) -> Collaborators {
    let (overscan, immersive) = system_controls(apply_overscan);
    Collaborators {
        overlay: Box::new(LoggingSurface::default()),
        blackout: Box::new(LoggingBlackout),
        overscan,
        immersive,
        edge_panel: Box::new(NoEdgePanel),
        executor: Box::new(LoggingExecutor),
        root: Some(Box::new(LoggingExecutor)),
    }
}

struct LogicState {
    ctx: PillContext,
}

/// Forward stdin JSON lines to the logic loop until EOF
fn spawn_stdin_reader(sender: Sender<Signal>) -> std::io::Result<()> {
    std::thread::Builder::new()
        .name("pill-stdin".into())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        error!("stdin read failed: {}", e);
                        break;
                    }
                };
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                match serde_json::from_str::<Signal>(line) {
                    Ok(signal) => {
                        if sender.send(signal).is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!("Ignoring bad signal line {:?}: {}", line, e),
                }
            }
            debug!("stdin closed");
        })?;
    Ok(())
}

pub fn run(options: Options) -> Result<()> {
    info!("Starting headless backend");

    let view = ViewQueue::spawn(
        Box::new(LoggingSurface::default()),
        Box::new(LoggingBlackout),
    )?;
    let (overscan, immersive) = system_controls(options.apply_overscan);
    let parts = Collaborators {
        overlay: Box::new(view.surface()),
        blackout: Box::new(view.blackout()),
        overscan,
        immersive,
        edge_panel: Box::new(NoEdgePanel),
        executor: Box::new(LoggingExecutor),
        root: Some(Box::new(LoggingExecutor)),
    };

    let display = DisplayState::new(options.width, options.height);
    let mut state = LogicState {
        ctx: PillContext::new(config_store(&options), parts, display),
    };
    state.ctx.observers.on_nav_state_change(|hidden| {
        info!(hidden, "Nav bar state");
    });
    state.ctx.observers.on_activation_change(|active| {
        info!(active, "Pill activation");
    });

    let mut event_loop: EventLoop<LogicState> = EventLoop::try_new()?;
    let (sender, signals) = channel::channel::<Signal>();
    event_loop
        .handle()
        .insert_source(signals, |event, _, state: &mut LogicState| {
            let signal = match event {
                Event::Msg(signal) => signal,
                Event::Closed => Signal::Shutdown,
            };
            state.ctx.handle_signal(signal, Instant::now());
        })
        .map_err(|e| anyhow::anyhow!("Failed to insert signal source: {:?}", e.error))?;
    spawn_stdin_reader(sender)?;

    state.ctx.start(Instant::now());
    info!("Entering logic loop");

    while state.ctx.is_running() {
        let timeout = state
            .ctx
            .next_deadline()
            .map(|deadline| deadline.saturating_duration_since(Instant::now()));
        if let Err(e) = event_loop.dispatch(timeout, &mut state) {
            error!("Event loop dispatch error: {:?}", e);
        }
        state.ctx.advance_to(Instant::now());
    }

    drop(state);
    view.join();
    info!("Headless backend stopped");
    Ok(())
}
