//! Window input translated into engine actions.
//!
//! [`Input`] turns raw winit window events into [`InputEvent`]s: primary
//! button presses and drags for the box-zoom, double-clicks for clearing it
//! and key presses for the shortcut map in [`crate::simulation`].

use glam::Vec2;
use std::collections::HashSet;
use std::time::{Duration, Instant};
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::keyboard::{KeyCode as WinitKeyCode, PhysicalKey};

/// Two primary clicks closer than this in time count as a double-click.
pub const DOUBLE_CLICK_TIME: Duration = Duration::from_millis(400);

/// ...and closer than this in pixels.
pub const DOUBLE_CLICK_DISTANCE: f32 = 4.0;

/// Keys the simulation reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Space,
    C,
    F,
    M,
    R,
    S,
    V,
    Up,
    Down,
    Plus,
    Minus,
    Escape,
    Other(u32),
}

impl From<WinitKeyCode> for KeyCode {
    fn from(key: WinitKeyCode) -> Self {
        match key {
            WinitKeyCode::Space => KeyCode::Space,
            WinitKeyCode::KeyC => KeyCode::C,
            WinitKeyCode::KeyF => KeyCode::F,
            WinitKeyCode::KeyM => KeyCode::M,
            WinitKeyCode::KeyR => KeyCode::R,
            WinitKeyCode::KeyS => KeyCode::S,
            WinitKeyCode::KeyV => KeyCode::V,
            WinitKeyCode::ArrowUp => KeyCode::Up,
            WinitKeyCode::ArrowDown => KeyCode::Down,
            WinitKeyCode::Equal | WinitKeyCode::NumpadAdd => KeyCode::Plus,
            WinitKeyCode::Minus | WinitKeyCode::NumpadSubtract => KeyCode::Minus,
            WinitKeyCode::Escape => KeyCode::Escape,
            _ => KeyCode::Other(key as u32),
        }
    }
}

/// What a window event means to the simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// A key went down. Auto-repeat is filtered out.
    KeyPressed(KeyCode),
    PointerDown(Vec2),
    PointerMove(Vec2),
    PointerUp(Vec2),
    DoubleClick(Vec2),
}

#[derive(Debug, Clone, Copy)]
struct Click {
    at: Vec2,
    when: Instant,
}

/// Keyboard and pointer state.
#[derive(Debug, Default)]
pub struct Input {
    keys_held: HashSet<KeyCode>,
    cursor: Vec2,
    last_click: Option<Click>,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a winit window event, passing each resulting action to `emit`.
    pub fn handle_event(&mut self, event: &WindowEvent, mut emit: impl FnMut(InputEvent)) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(code) = event.physical_key else {
                    return;
                };
                let key = KeyCode::from(code);
                match event.state {
                    ElementState::Pressed => {
                        if self.keys_held.insert(key) {
                            emit(InputEvent::KeyPressed(key));
                        }
                    }
                    ElementState::Released => {
                        self.keys_held.remove(&key);
                    }
                }
            }

            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => {
                    emit(InputEvent::PointerDown(self.cursor));
                }
                ElementState::Released => {
                    emit(InputEvent::PointerUp(self.cursor));
                    if self.register_click(self.cursor, Instant::now()) {
                        emit(InputEvent::DoubleClick(self.cursor));
                    }
                }
            },

            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Vec2::new(position.x as f32, position.y as f32);
                emit(InputEvent::PointerMove(self.cursor));
            }

            WindowEvent::Focused(false) => {
                self.keys_held.clear();
            }

            _ => {}
        }
    }

    /// Record a completed click. Returns `true` if it completes a double-click.
    fn register_click(&mut self, at: Vec2, when: Instant) -> bool {
        let double = self.last_click.is_some_and(|prev| {
            when.saturating_duration_since(prev.when) <= DOUBLE_CLICK_TIME
                && prev.at.distance(at) <= DOUBLE_CLICK_DISTANCE
        });
        // a third click starts a new pair
        self.last_click = if double { None } else { Some(Click { at, when }) };
        double
    }
}
