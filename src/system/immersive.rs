//! Nav-immersive requests through the global immersive policy
//!
//! Policy strings look like `immersive.full=apps,-com.example:immersive.navigation=*`.
//! The policy in force before our first request is backed up and put back
//! when we stop asking.

use std::io::ErrorKind;
use std::process::Command;

use tracing::{debug, info, warn};

use crate::error::{Error, Result};

pub const NAV_IMMERSIVE_POLICY: &str = "immersive.navigation=*";
pub const DEFAULT_POLICY: &str = "immersive.none";

/// Which immersive modes a policy string turns on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImmersivePolicy {
    pub full: bool,
    pub navigation: bool,
}

impl ImmersivePolicy {
    pub fn parse(policy: &str) -> Self {
        let mut parsed = ImmersivePolicy::default();
        for entry in policy.split(':') {
            let (mode, targets) = entry.split_once('=').unwrap_or((entry, ""));
            if targets.trim().is_empty() {
                continue;
            }
            match mode.trim() {
                "immersive.full" => parsed.full = true,
                "immersive.navigation" => parsed.navigation = true,
                _ => {}
            }
        }
        parsed
    }

    /// Foreground is fullscreen as far as the policy is concerned
    pub fn is_fullscreen(&self) -> bool {
        self.full
    }

    pub fn is_nav_immersive(&self) -> bool {
        self.full || self.navigation
    }
}

/// Access to the global immersive policy setting
pub trait ImmersiveControl {
    fn read_policy(&mut self) -> Option<String>;
    fn write_policy(&mut self, policy: &str) -> Result<()>;
}

/// Reads and writes `policy_control` with the `settings` tool
#[derive(Debug, Clone)]
pub struct SettingsImmersive {
    program: String,
}

impl SettingsImmersive {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for SettingsImmersive {
    fn default() -> Self {
        Self::new("settings")
    }
}

impl ImmersiveControl for SettingsImmersive {
    fn read_policy(&mut self) -> Option<String> {
        let output = Command::new(&self.program)
            .args(["get", "global", "policy_control"])
            .output()
            .ok()?;
        let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
        (output.status.success() && !value.is_empty() && value != "null").then_some(value)
    }

    fn write_policy(&mut self, policy: &str) -> Result<()> {
        let status = Command::new(&self.program)
            .args(["put", "global", "policy_control", policy])
            .status()
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    debug!("settings tool not found");
                }
                Error::Io(e)
            })?;
        if !status.success() {
            return Err(Error::Io(std::io::Error::new(
                ErrorKind::Other,
                format!("settings exited with {}", status),
            )));
        }
        Ok(())
    }
}

/// Keeps the policy in memory; used headless and in tests
#[derive(Debug, Default)]
pub struct MemoryImmersive {
    pub policy: Option<String>,
}

impl ImmersiveControl for MemoryImmersive {
    fn read_policy(&mut self) -> Option<String> {
        self.policy.clone()
    }

    fn write_policy(&mut self, policy: &str) -> Result<()> {
        info!(policy, "Immersive policy");
        self.policy = Some(policy.to_string());
        Ok(())
    }
}

pub struct ImmersiveCoordinator {
    control: Box<dyn ImmersiveControl>,
    backup: Option<String>,
    requested: bool,
}

impl ImmersiveCoordinator {
    pub fn new(control: Box<dyn ImmersiveControl>) -> Self {
        Self {
            control,
            backup: None,
            requested: false,
        }
    }

    /// We currently hold nav immersive
    pub fn is_nav_immersive(&self) -> bool {
        self.requested
    }

    pub fn current_policy(&mut self) -> ImmersivePolicy {
        self.control
            .read_policy()
            .map(|p| ImmersivePolicy::parse(&p))
            .unwrap_or_default()
    }

    /// Request or release nav immersive; returns true when the state changed
    pub fn set_requested(&mut self, wanted: bool) -> bool {
        if wanted == self.requested {
            return false;
        }
        if wanted {
            if self.backup.is_none() {
                let previous = self
                    .control
                    .read_policy()
                    .unwrap_or_else(|| DEFAULT_POLICY.to_string());
                debug!(previous = %previous, "Backing up immersive policy");
                self.backup = Some(previous);
            }
            if let Err(e) = self.control.write_policy(NAV_IMMERSIVE_POLICY) {
                warn!("Failed to enter nav immersive: {}", e);
                return false;
            }
            info!("Entered nav immersive");
        } else {
            let restore = self
                .backup
                .take()
                .unwrap_or_else(|| DEFAULT_POLICY.to_string());
            if let Err(e) = self.control.write_policy(&restore) {
                warn!("Failed to restore immersive policy: {}", e);
            }
            info!(policy = %restore, "Exited nav immersive");
        }
        self.requested = wanted;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_policy() {
        assert_eq!(ImmersivePolicy::parse(""), ImmersivePolicy::default());
        assert_eq!(ImmersivePolicy::parse(DEFAULT_POLICY), ImmersivePolicy::default());

        let p = ImmersivePolicy::parse("immersive.full=apps,-com.example:immersive.status=*");
        assert!(p.is_fullscreen());
        assert!(!p.navigation);

        let p = ImmersivePolicy::parse(NAV_IMMERSIVE_POLICY);
        assert!(!p.is_fullscreen());
        assert!(p.is_nav_immersive());
    }

    #[test]
    fn test_backup_and_restore() {
        let control = MemoryImmersive {
            policy: Some("immersive.status=*".into()),
        };
        let mut imm = ImmersiveCoordinator::new(Box::new(control));

        assert!(imm.set_requested(true));
        assert!(!imm.set_requested(true));
        assert!(imm.current_policy().navigation);

        assert!(imm.set_requested(false));
        assert!(!imm.is_nav_immersive());
        let restored = imm.current_policy();
        assert!(!restored.navigation && !restored.full);
    }

    #[test]
    fn test_restore_defaults_without_backup() {
        let mut imm = ImmersiveCoordinator::new(Box::new(MemoryImmersive::default()));
        imm.set_requested(true);
        imm.set_requested(false);
        assert_eq!(imm.control.read_policy().as_deref(), Some(DEFAULT_POLICY));
    }
}
