//! Cached platform capability detection

use serde::Serialize;
use tracing::{debug, info};

/// Result of probing for an optional platform feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Supported,
    Unsupported,
    /// Probe was inconclusive; callers may try and downgrade on failure
    Unknown,
}

impl Capability {
    /// Worth attempting the feature
    pub fn is_usable(self) -> bool {
        !matches!(self, Capability::Unsupported)
    }
}

/// A capability probed once and cached for the life of the context
#[derive(Debug, Clone, Copy)]
pub struct CachedCapability {
    name: &'static str,
    value: Capability,
}

impl CachedCapability {
    pub fn detect(name: &'static str, probe: impl FnOnce() -> Capability) -> Self {
        let value = probe();
        info!(capability = name, ?value, "Capability detected");
        Self { name, value }
    }

    pub fn get(&self) -> Capability {
        self.value
    }

    pub fn is_usable(&self) -> bool {
        self.value.is_usable()
    }

    /// The platform rejected the feature; stop trying
    pub fn mark_unsupported(&mut self) {
        if self.value != Capability::Unsupported {
            info!(capability = self.name, "Capability downgraded to unsupported");
            self.value = Capability::Unsupported;
        }
    }

    /// A call succeeded, so an inconclusive probe becomes supported
    pub fn mark_supported(&mut self) {
        if self.value == Capability::Unknown {
            debug!(capability = self.name, "Capability confirmed");
            self.value = Capability::Supported;
        }
    }
}

/// Vendor edge-panel (curved screen side panel) detection
pub trait EdgePanelProbe {
    fn capability(&mut self) -> Capability;
    /// `Some(true)` while an edge panel is showing, `None` if unknown
    fn edge_panel_active(&mut self) -> Option<bool>;
}

/// Devices without an edge panel
#[derive(Debug, Default)]
pub struct NoEdgePanel;

impl EdgePanelProbe for NoEdgePanel {
    fn capability(&mut self) -> Capability {
        Capability::Unsupported
    }

    fn edge_panel_active(&mut self) -> Option<bool> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_can_upgrade_or_downgrade() {
        let mut cap = CachedCapability::detect("overscan", || Capability::Unknown);
        assert!(cap.is_usable());
        cap.mark_supported();
        assert_eq!(cap.get(), Capability::Supported);
        cap.mark_unsupported();
        assert!(!cap.is_usable());
        // Once unsupported, success reports don't resurrect it
        cap.mark_supported();
        assert_eq!(cap.get(), Capability::Unsupported);
    }

    #[test]
    fn test_probe_runs_once() {
        let mut calls = 0;
        let cap = CachedCapability::detect("edge_panel", || {
            calls += 1;
            Capability::Supported
        });
        assert_eq!(cap.get(), Capability::Supported);
        assert_eq!(calls, 1);
    }
}
