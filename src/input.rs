//! Input handling with DAS (Delayed Auto Shift) and ARR (Auto Repeat Rate)
//!
//! Translates crossterm key events into engine commands. Uses a
//! polling-based approach that doesn't rely on key release events,
//! which are unreliable on Linux terminals.

use crate::game::Command;
use crate::settings::Settings;
use crate::tetromino::RotationDirection;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::{Duration, Instant};

/// Time after which we consider a key "released" if no repeat received
const KEY_TIMEOUT: Duration = Duration::from_millis(100);

/// What a key press translates to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Game(Command),
    Quit,
}

/// Input handler with DAS/ARR support for the movement keys
pub struct InputHandler {
    left_state: Option<KeyPressState>,
    right_state: Option<KeyPressState>,
    down_state: Option<KeyPressState>,
    bindings: KeyBindings,
    das: Duration,
    arr: Duration,
}

#[derive(Debug, Clone)]
struct KeyPressState {
    first_press: Instant,
    last_seen: Instant,
    das_triggered: bool,
    last_arr: Option<Instant>,
}

impl KeyPressState {
    fn pressed(now: Instant) -> Self {
        Self {
            first_press: now,
            last_seen: now,
            das_triggered: false,
            last_arr: None,
        }
    }
}

/// Key bindings configuration - supports multiple keys per command
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub move_left: Vec<KeyCode>,
    pub move_right: Vec<KeyCode>,
    pub soft_drop: Vec<KeyCode>,
    pub rotate_cw: Vec<KeyCode>,
    pub rotate_ccw: Vec<KeyCode>,
    pub hold: Vec<KeyCode>,
    pub start: Vec<KeyCode>,
    pub quit: Vec<KeyCode>,
}

impl KeyBindings {
    /// Parse a key string into KeyCode
    fn parse_key(s: &str) -> KeyCode {
        match s.to_lowercase().as_str() {
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "space" => KeyCode::Char(' '),
            "enter" => KeyCode::Enter,
            "tab" => KeyCode::Tab,
            "esc" | "escape" => KeyCode::Esc,
            s if s.len() == 1 => KeyCode::Char(s.chars().next().unwrap()),
            _ => KeyCode::Char(' '), // fallback
        }
    }

    fn parse_keys(keys: &[String]) -> Vec<KeyCode> {
        keys.iter().map(|s| Self::parse_key(s)).collect()
    }

    /// Create keybindings from settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            move_left: Self::parse_keys(&settings.keys.move_left),
            move_right: Self::parse_keys(&settings.keys.move_right),
            soft_drop: Self::parse_keys(&settings.keys.soft_drop),
            rotate_cw: Self::parse_keys(&settings.keys.rotate_cw),
            rotate_ccw: Self::parse_keys(&settings.keys.rotate_ccw),
            hold: Self::parse_keys(&settings.keys.hold),
            start: Self::parse_keys(&settings.keys.start),
            quit: Self::parse_keys(&settings.keys.quit),
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            move_left: vec![KeyCode::Left],
            move_right: vec![KeyCode::Right],
            soft_drop: vec![KeyCode::Down],
            rotate_cw: vec![KeyCode::Up, KeyCode::Char('x')],
            rotate_ccw: vec![KeyCode::Char('z')],
            hold: vec![KeyCode::Char('c')],
            start: vec![KeyCode::Enter],
            quit: vec![KeyCode::Char('q'), KeyCode::Esc],
        }
    }
}

impl InputHandler {
    /// Create input handler from settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            left_state: None,
            right_state: None,
            down_state: None,
            bindings: KeyBindings::from_settings(settings),
            das: Duration::from_millis(settings.gameplay.das_ms),
            arr: Duration::from_millis(settings.gameplay.arr_ms),
        }
    }

    /// Handle a key press event - returns immediate events
    pub fn key_down(&mut self, key: KeyEvent) -> Vec<InputEvent> {
        let mut events = Vec::new();
        let now = Instant::now();

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            events.push(InputEvent::Quit);
            return events;
        }

        let code = normalize_key(key.code);

        if self.bindings.move_left.contains(&code) {
            if self.left_state.is_none() {
                events.push(InputEvent::Game(Command::MoveLeft));
                self.left_state = Some(KeyPressState::pressed(now));
            } else if let Some(state) = &mut self.left_state {
                state.last_seen = now;
            }
            // Cancel opposite direction
            self.right_state = None;
        } else if self.bindings.move_right.contains(&code) {
            if self.right_state.is_none() {
                events.push(InputEvent::Game(Command::MoveRight));
                self.right_state = Some(KeyPressState::pressed(now));
            } else if let Some(state) = &mut self.right_state {
                state.last_seen = now;
            }
            self.left_state = None;
        } else if self.bindings.soft_drop.contains(&code) {
            if self.down_state.is_none() {
                events.push(InputEvent::Game(Command::SoftDrop));
                self.down_state = Some(KeyPressState::pressed(now));
            } else if let Some(state) = &mut self.down_state {
                state.last_seen = now;
            }
        } else if self.bindings.rotate_cw.contains(&code) {
            events.push(InputEvent::Game(Command::Rotate(
                RotationDirection::Clockwise,
            )));
        } else if self.bindings.rotate_ccw.contains(&code) {
            events.push(InputEvent::Game(Command::Rotate(
                RotationDirection::CounterClockwise,
            )));
        } else if self.bindings.hold.contains(&code) {
            events.push(InputEvent::Game(Command::Hold));
        } else if self.bindings.start.contains(&code) {
            events.push(InputEvent::Game(Command::Start));
        } else if self.bindings.quit.contains(&code) {
            events.push(InputEvent::Quit);
        }

        events
    }

    /// Handle a key release event (may not be delivered on Linux)
    pub fn key_up(&mut self, key: KeyEvent) {
        let code = normalize_key(key.code);

        if self.bindings.move_left.contains(&code) {
            self.left_state = None;
        } else if self.bindings.move_right.contains(&code) {
            self.right_state = None;
        } else if self.bindings.soft_drop.contains(&code) {
            self.down_state = None;
        }
    }

    /// Update held keys and return repeat commands (call every frame)
    pub fn update(&mut self) -> Vec<Command> {
        let mut commands = Vec::new();
        let now = Instant::now();

        // Keys with no recent event are treated as released
        for state in [
            &mut self.left_state,
            &mut self.right_state,
            &mut self.down_state,
        ] {
            if state
                .as_ref()
                .is_some_and(|s| now.duration_since(s.last_seen) > KEY_TIMEOUT)
            {
                *state = None;
            }
        }

        let das = self.das;
        let arr = self.arr;

        if let Some(state) = &mut self.left_state {
            if process_das_arr(state, now, das, arr) {
                commands.push(Command::MoveLeft);
            }
        }
        if let Some(state) = &mut self.right_state {
            if process_das_arr(state, now, das, arr) {
                commands.push(Command::MoveRight);
            }
        }
        if let Some(state) = &mut self.down_state {
            if process_das_arr(state, now, das, arr) {
                commands.push(Command::SoftDrop);
            }
        }

        commands
    }
}

/// Process DAS/ARR logic for a key state, returns true if a repeat fires
fn process_das_arr(state: &mut KeyPressState, now: Instant, das: Duration, arr: Duration) -> bool {
    let held_duration = now.duration_since(state.first_press);

    if held_duration >= das {
        if !state.das_triggered {
            state.das_triggered = true;
            state.last_arr = Some(now);
            return true;
        } else if let Some(last) = state.last_arr {
            if now.duration_since(last) >= arr {
                state.last_arr = Some(now);
                return true;
            }
        }
    }

    false
}

/// Normalize key codes for consistent handling
fn normalize_key(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}
