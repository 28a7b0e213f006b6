//! System integration - nav-bar overscan, immersive policy and capability probes

pub mod capability;
pub mod immersive;
pub mod overscan;

pub use capability::{CachedCapability, Capability, EdgePanelProbe, NoEdgePanel};
pub use immersive::{ImmersiveControl, ImmersiveCoordinator, ImmersivePolicy};
pub use overscan::{Insets, NavChange, NavSuppression, OverscanControl};
