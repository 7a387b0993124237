//! Input events delivered to the timing tests, and the hold-key listener

use device_query::{DeviceQuery, DeviceState, Keycode};
use std::sync::mpsc;

/// Kind of input a test can receive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Hold key went down
    Press,
    /// Hold key came up
    Release,
    /// Single tap (regularity test)
    Tap,
    /// Typed character (passive estimate)
    Char(char),
    Backspace,
    /// Slider step up
    Increment,
    /// Slider step down
    Decrement,
    Submit,
}

/// An input event with its capture time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    pub kind: InputKind,
    /// Epoch milliseconds
    pub timestamp_ms: u64,
}

impl InputEvent {
    pub fn new(kind: InputKind, timestamp_ms: u64) -> Self {
        Self { kind, timestamp_ms }
    }
}

/// How the hold gesture of the active test is captured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldMode {
    /// Global key state polling, true press and release
    DeviceQuery,
    /// Terminal reports release events (keyboard enhancement)
    Enhanced,
    /// First press is down, second press is up
    Toggle,
}

impl HoldMode {
    pub fn describe(&self) -> &'static str {
        match self {
            HoldMode::DeviceQuery => "key state polling",
            HoldMode::Enhanced => "terminal release events",
            HoldMode::Toggle => "toggle (press once to start, again to stop)",
        }
    }
}

/// Translates repeated key presses into press/release pairs for terminals
/// that report no release events.
#[derive(Debug, Clone, Default)]
pub struct ToggleHold {
    down: bool,
}

impl ToggleHold {
    pub fn on_press(&mut self) -> InputKind {
        self.down = !self.down;
        if self.down {
            InputKind::Press
        } else {
            InputKind::Release
        }
    }

    pub fn clear(&mut self) {
        self.down = false;
    }
}

/// Map a configured hold key to a device_query key code
pub fn keycode_for(c: char) -> Option<Keycode> {
    let key = match c.to_ascii_lowercase() {
        ' ' => Keycode::Space,
        'a' => Keycode::A,
        'b' => Keycode::B,
        'c' => Keycode::C,
        'd' => Keycode::D,
        'e' => Keycode::E,
        'f' => Keycode::F,
        'g' => Keycode::G,
        'h' => Keycode::H,
        'i' => Keycode::I,
        'j' => Keycode::J,
        'k' => Keycode::K,
        'l' => Keycode::L,
        'm' => Keycode::M,
        'n' => Keycode::N,
        'o' => Keycode::O,
        'p' => Keycode::P,
        'q' => Keycode::Q,
        'r' => Keycode::R,
        's' => Keycode::S,
        't' => Keycode::T,
        'u' => Keycode::U,
        'v' => Keycode::V,
        'w' => Keycode::W,
        'x' => Keycode::X,
        'y' => Keycode::Y,
        'z' => Keycode::Z,
        _ => return None,
    };
    Some(key)
}

/// Polls global key state and emits press/release events for the hold key
pub struct HoldListener {
    device_state: DeviceState,
    key: Keycode,
    was_down: bool,
    event_tx: mpsc::Sender<InputEvent>,
}

impl HoldListener {
    /// Create a listener, or `None` when key state cannot be queried
    /// (no display server) or the key is unsupported.
    pub fn try_new(hold_key: char, event_tx: mpsc::Sender<InputEvent>) -> Option<Self> {
        let key = keycode_for(hold_key)?;

        #[cfg(target_os = "linux")]
        let device_state = DeviceState::checked_new()?;
        #[cfg(not(target_os = "linux"))]
        let device_state = DeviceState::new();

        Some(Self {
            device_state,
            key,
            was_down: false,
            event_tx,
        })
    }

    /// Poll for a state change of the hold key.
    /// Returns the number of events generated.
    pub fn poll(&mut self, now_ms: u64) -> usize {
        let down = self.device_state.get_keys().contains(&self.key);
        if down == self.was_down {
            return 0;
        }
        self.was_down = down;

        let kind = if down {
            InputKind::Press
        } else {
            InputKind::Release
        };
        let _ = self.event_tx.send(InputEvent::new(kind, now_ms));
        1
    }
}
