//! Platform signals fed to the pill context
//!
//! Every external event (broadcasts, window changes, settings edits and
//! raw touches) arrives as one `Signal`. The headless binary reads them as
//! JSON lines, e.g. `{"type":"keyboard","shown":true}` or
//! `{"type":"touch","kind":"down","x":540.0,"y":2300.0}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::input::TouchEvent;
use crate::shell::primitives::{Rotation, Side};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Signal {
    ScreenOn {
        /// Keyguard is showing
        #[serde(default)]
        keyguard: bool,
    },
    ScreenOff,
    /// Keyguard dismissed
    UserPresent,
    Boot,
    Shutdown,
    CarMode {
        enabled: bool,
    },
    ForegroundApp {
        package: String,
        #[serde(default)]
        class: Option<String>,
    },
    /// Foreground window went in or out of fullscreen
    Immersive {
        fullscreen: bool,
    },
    /// Global immersive policy string changed
    PolicyChanged {
        policy: String,
    },
    Keyboard {
        shown: bool,
    },
    Display {
        rotation: Rotation,
        width: i32,
        height: i32,
        /// Screen-relative nav bar side, when the platform reports one
        #[serde(default)]
        nav_side: Option<Side>,
    },
    LockTask {
        pinned: bool,
    },
    ConfigChanged {
        key: String,
        value: Value,
    },
    Activation {
        active: bool,
    },
    Touch(TouchEvent),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_lines() {
        let touch: Signal =
            serde_json::from_str(r#"{"type":"touch","kind":"down","x":10.0,"y":20.0}"#).unwrap();
        assert_eq!(touch, Signal::Touch(TouchEvent::Down { x: 10.0, y: 20.0 }));

        let display: Signal =
            serde_json::from_str(r#"{"type":"display","rotation":"90","width":2400,"height":1080}"#)
                .unwrap();
        assert_eq!(
            display,
            Signal::Display {
                rotation: Rotation::R90,
                width: 2400,
                height: 1080,
                nav_side: None,
            }
        );

        let screen: Signal = serde_json::from_str(r#"{"type":"screen_on"}"#).unwrap();
        assert_eq!(screen, Signal::ScreenOn { keyguard: false });
    }
}
