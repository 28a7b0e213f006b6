//! View queue - overlay window operations run on their own thread
//!
//! The logic loop never touches windows directly. `QueuedSurface` and
//! `QueuedBlackout` turn each call into a `ViewCommand` and post it to the
//! view thread, which owns the real surfaces and its own calloop loop.
//! Bursts of layout updates (a drag) are coalesced so only the latest
//! geometry reaches the window.

use std::thread::JoinHandle;
use std::time::Duration;

use calloop::channel::{self, Channel, Event, Sender};
use calloop::{EventLoop, LoopSignal};
use tracing::{debug, info, warn};

use crate::config::Appearance;
use crate::error::{Error, Result, SurfaceError};
use crate::shell::blackout::BlackoutSurface;
use crate::shell::geometry::OverlayGeometry;
use crate::shell::overlay::{OverlaySurface, SurfaceFrame};
use crate::shell::primitives::{Color, Side};

#[derive(Debug, Clone, PartialEq)]
pub enum ViewCommand {
    Attach(OverlayGeometry, Appearance),
    Detach,
    Layout(OverlayGeometry),
    Animate(SurfaceFrame, Duration),
    Appearance(Appearance),
    BlackoutAdd(Side, i32, Color),
    BlackoutRemove,
}

pub type ViewSurface = Box<dyn OverlaySurface + Send>;
pub type ViewBlackout = Box<dyn BlackoutSurface + Send>;

struct ViewState {
    surface: ViewSurface,
    blackout: ViewBlackout,
    /// Latest layout not yet pushed to the window
    pending_layout: Option<OverlayGeometry>,
    coalesced: u64,
    signal: LoopSignal,
}

impl ViewState {
    fn queue(&mut self, command: ViewCommand) {
        if let ViewCommand::Layout(geometry) = command {
            if self.pending_layout.replace(geometry).is_some() {
                self.coalesced += 1;
            }
            return;
        }
        // Everything else must observe the layouts queued before it
        self.flush_layout();
        let result = match command {
            ViewCommand::Attach(geometry, appearance) => self.surface.attach(&geometry, &appearance),
            ViewCommand::Detach => self.surface.detach(),
            ViewCommand::Animate(frame, duration) => self.surface.animate_to(&frame, duration),
            ViewCommand::Appearance(appearance) => self.surface.set_appearance(&appearance),
            ViewCommand::BlackoutAdd(side, thickness, color) => {
                self.blackout.add(side, thickness, color)
            }
            ViewCommand::BlackoutRemove => self.blackout.remove(),
            ViewCommand::Layout(_) => Ok(()),
        };
        if let Err(e) = result {
            debug!("View command failed: {}", e);
        }
    }

    fn flush_layout(&mut self) {
        if let Some(geometry) = self.pending_layout.take() {
            if let Err(e) = self.surface.update_layout(&geometry) {
                debug!("Layout update failed: {}", e);
            }
        }
    }
}

/// Handle to the running view thread
pub struct ViewQueue {
    sender: Sender<ViewCommand>,
    thread: Option<JoinHandle<()>>,
}

impl ViewQueue {
    /// Start the view thread with the surfaces it will drive
    pub fn spawn(surface: ViewSurface, blackout: ViewBlackout) -> Result<Self> {
        let (sender, channel) = channel::channel::<ViewCommand>();
        let thread = std::thread::Builder::new()
            .name("pill-view".into())
            .spawn(move || {
                if let Err(e) = run_view_loop(channel, surface, blackout) {
                    warn!("View loop exited: {}", e);
                }
            })?;
        Ok(Self {
            sender,
            thread: Some(thread),
        })
    }

    pub fn surface(&self) -> QueuedSurface {
        QueuedSurface {
            sender: self.sender.clone(),
            attached: false,
        }
    }

    pub fn blackout(&self) -> QueuedBlackout {
        QueuedBlackout {
            sender: self.sender.clone(),
        }
    }

    /// Wait for the view thread to drain; every queued surface must have
    /// been dropped first or this blocks
    pub fn join(mut self) {
        let Some(thread) = self.thread.take() else { return };
        drop(self.sender);
        if thread.join().is_err() {
            warn!("View thread panicked");
        }
    }
}

fn run_view_loop(channel: Channel<ViewCommand>, surface: ViewSurface, blackout: ViewBlackout) -> Result<()> {
    let mut event_loop: EventLoop<ViewState> =
        EventLoop::try_new().map_err(|e| Error::EventLoop(e.to_string()))?;

    event_loop
        .handle()
        .insert_source(channel, |event, _, state: &mut ViewState| match event {
            Event::Msg(command) => state.queue(command),
            Event::Closed => state.signal.stop(),
        })
        .map_err(|e| Error::EventLoop(e.error.to_string()))?;

    let mut state = ViewState {
        surface,
        blackout,
        pending_layout: None,
        coalesced: 0,
        signal: event_loop.get_signal(),
    };

    info!("View thread running");
    event_loop
        .run(None, &mut state, |state| state.flush_layout())
        .map_err(|e| Error::EventLoop(e.to_string()))?;
    state.flush_layout();
    info!(coalesced = state.coalesced, "View thread stopped");
    Ok(())
}

/// Overlay surface living on the view thread
pub struct QueuedSurface {
    sender: Sender<ViewCommand>,
    attached: bool,
}

impl QueuedSurface {
    fn post(&self, command: ViewCommand) -> std::result::Result<(), SurfaceError> {
        self.sender
            .send(command)
            .map_err(|_| SurfaceError::QueueClosed)
    }
}

impl OverlaySurface for QueuedSurface {
    fn attach(
        &mut self,
        geometry: &OverlayGeometry,
        appearance: &Appearance,
    ) -> std::result::Result<(), SurfaceError> {
        self.post(ViewCommand::Attach(*geometry, appearance.clone()))?;
        self.attached = true;
        Ok(())
    }

    fn detach(&mut self) -> std::result::Result<(), SurfaceError> {
        self.attached = false;
        self.post(ViewCommand::Detach)
    }

    fn update_layout(&mut self, geometry: &OverlayGeometry) -> std::result::Result<(), SurfaceError> {
        if !self.attached {
            return Err(SurfaceError::NotAttached);
        }
        self.post(ViewCommand::Layout(*geometry))
    }

    fn animate_to(&mut self, frame: &SurfaceFrame, duration: Duration) -> std::result::Result<(), SurfaceError> {
        if !self.attached {
            return Err(SurfaceError::NotAttached);
        }
        self.post(ViewCommand::Animate(*frame, duration))
    }

    fn set_appearance(&mut self, appearance: &Appearance) -> std::result::Result<(), SurfaceError> {
        self.post(ViewCommand::Appearance(appearance.clone()))
    }
}

pub struct QueuedBlackout {
    sender: Sender<ViewCommand>,
}

impl BlackoutSurface for QueuedBlackout {
    fn add(&mut self, side: Side, thickness: i32, color: Color) -> std::result::Result<(), SurfaceError> {
        self.sender
            .send(ViewCommand::BlackoutAdd(side, thickness, color))
            .map_err(|_| SurfaceError::QueueClosed)
    }

    fn remove(&mut self) -> std::result::Result<(), SurfaceError> {
        self.sender
            .send(ViewCommand::BlackoutRemove)
            .map_err(|_| SurfaceError::QueueClosed)
    }
}
