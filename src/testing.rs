//! In-memory fakes for every collaborator trait
//!
//! Each fake hands back a shared log of the calls it received so tests can
//! keep inspecting it after the fake is boxed into a coordinator.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use crate::config::Appearance;
use crate::error::{OverscanError, SurfaceError};
use crate::input::{ActionExecutor, ActionType, Feedback, GestureKey, RootExecutor};
use crate::shell::blackout::BlackoutSurface;
use crate::shell::geometry::OverlayGeometry;
use crate::shell::overlay::{OverlaySurface, SurfaceFrame};
use crate::shell::primitives::{Color, Side};
use crate::system::capability::{Capability, EdgePanelProbe};
use crate::system::immersive::ImmersiveControl;
use crate::system::overscan::{Insets, OverscanControl};

pub type Shared<T> = Rc<RefCell<Vec<T>>>;

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    Attach(OverlayGeometry),
    Detach,
    Layout(OverlayGeometry),
    Animate(SurfaceFrame, Duration),
    Appearance(Appearance),
}

#[derive(Default)]
pub struct FakeSurface {
    calls: Shared<SurfaceCall>,
    attached: bool,
    pub fail_attach: bool,
}

impl FakeSurface {
    pub fn new() -> (Self, Shared<SurfaceCall>) {
        let calls = Shared::default();
        (
            Self {
                calls: calls.clone(),
                ..Default::default()
            },
            calls,
        )
    }
}

impl OverlaySurface for FakeSurface {
    fn attach(
        &mut self,
        geometry: &OverlayGeometry,
        _appearance: &Appearance,
    ) -> Result<(), SurfaceError> {
        if self.fail_attach {
            return Err(SurfaceError::Backend("no overlay permission".into()));
        }
        self.attached = true;
        self.calls.borrow_mut().push(SurfaceCall::Attach(*geometry));
        Ok(())
    }

    fn detach(&mut self) -> Result<(), SurfaceError> {
        self.attached = false;
        self.calls.borrow_mut().push(SurfaceCall::Detach);
        Ok(())
    }

    fn update_layout(&mut self, geometry: &OverlayGeometry) -> Result<(), SurfaceError> {
        if !self.attached {
            return Err(SurfaceError::NotAttached);
        }
        self.calls.borrow_mut().push(SurfaceCall::Layout(*geometry));
        Ok(())
    }

    fn animate_to(&mut self, frame: &SurfaceFrame, duration: Duration) -> Result<(), SurfaceError> {
        if !self.attached {
            return Err(SurfaceError::NotAttached);
        }
        self.calls
            .borrow_mut()
            .push(SurfaceCall::Animate(*frame, duration));
        Ok(())
    }

    fn set_appearance(&mut self, appearance: &Appearance) -> Result<(), SurfaceError> {
        self.calls
            .borrow_mut()
            .push(SurfaceCall::Appearance(appearance.clone()));
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlackoutCall {
    Add(Side, i32),
    Remove,
}

pub struct FakeBlackout {
    calls: Shared<BlackoutCall>,
}

impl FakeBlackout {
    pub fn new() -> (Self, Shared<BlackoutCall>) {
        let calls = Shared::default();
        (
            Self {
                calls: calls.clone(),
            },
            calls,
        )
    }
}

impl BlackoutSurface for FakeBlackout {
    fn add(&mut self, side: Side, thickness: i32, _color: Color) -> Result<(), SurfaceError> {
        self.calls
            .borrow_mut()
            .push(BlackoutCall::Add(side, thickness));
        Ok(())
    }

    fn remove(&mut self) -> Result<(), SurfaceError> {
        self.calls.borrow_mut().push(BlackoutCall::Remove);
        Ok(())
    }
}

/// Records every overscan attempt, successful or not
pub struct FakeOverscan {
    calls: Shared<Insets>,
    probe: Capability,
    pub reject: bool,
}

impl FakeOverscan {
    pub fn new(probe: Capability) -> (Self, Shared<Insets>) {
        let calls = Shared::default();
        (
            Self {
                calls: calls.clone(),
                probe,
                reject: false,
            },
            calls,
        )
    }
}

impl OverscanControl for FakeOverscan {
    fn probe(&mut self) -> Capability {
        self.probe
    }

    fn set_overscan(&mut self, insets: &Insets) -> Result<(), OverscanError> {
        self.calls.borrow_mut().push(*insets);
        if self.reject {
            return Err(OverscanError::Unsupported);
        }
        Ok(())
    }
}

pub struct FakeImmersive {
    pub policy: Rc<RefCell<Option<String>>>,
}

impl FakeImmersive {
    pub fn new() -> (Self, Rc<RefCell<Option<String>>>) {
        let policy = Rc::new(RefCell::new(None));
        (
            Self {
                policy: policy.clone(),
            },
            policy,
        )
    }
}

impl ImmersiveControl for FakeImmersive {
    fn read_policy(&mut self) -> Option<String> {
        self.policy.borrow().clone()
    }

    fn write_policy(&mut self, policy: &str) -> crate::error::Result<()> {
        *self.policy.borrow_mut() = Some(policy.to_string());
        Ok(())
    }
}

pub struct FakeEdgePanel {
    pub active: Rc<Cell<Option<bool>>>,
}

impl FakeEdgePanel {
    pub fn new() -> (Self, Rc<Cell<Option<bool>>>) {
        let active = Rc::new(Cell::new(None));
        (
            Self {
                active: active.clone(),
            },
            active,
        )
    }
}

impl EdgePanelProbe for FakeEdgePanel {
    fn capability(&mut self) -> Capability {
        Capability::Supported
    }

    fn edge_panel_active(&mut self) -> Option<bool> {
        self.active.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorCall {
    Action(ActionType, GestureKey),
    Feedback(Feedback),
    Root(ActionType),
}

/// Action and root executor in one, sharing a call log
#[derive(Clone)]
pub struct RecordingExecutor {
    calls: Shared<ExecutorCall>,
}

impl RecordingExecutor {
    pub fn new() -> (Self, Shared<ExecutorCall>) {
        let calls = Shared::default();
        (
            Self {
                calls: calls.clone(),
            },
            calls,
        )
    }
}

impl ActionExecutor for RecordingExecutor {
    fn execute(&mut self, action: ActionType, key: GestureKey) {
        self.calls
            .borrow_mut()
            .push(ExecutorCall::Action(action, key));
    }

    fn feedback(&mut self, feedback: Feedback) {
        self.calls.borrow_mut().push(ExecutorCall::Feedback(feedback));
    }
}

impl RootExecutor for RecordingExecutor {
    fn execute_root(&mut self, action: ActionType) {
        self.calls.borrow_mut().push(ExecutorCall::Root(action));
    }
}

/// Only the executed actions, feedback filtered out
pub fn actions(calls: &Shared<ExecutorCall>) -> Vec<(ActionType, GestureKey)> {
    calls
        .borrow()
        .iter()
        .filter_map(|c| match c {
            ExecutorCall::Action(a, k) => Some((*a, *k)),
            _ => None,
        })
        .collect()
}
