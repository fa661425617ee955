//! Keyboard and mouse input state.
//!
//! The [`InputSystem`] tracks which keys are currently pressed, just pressed
//! this frame, or just released this frame, plus the mouse motion
//! accumulated since the last frame. Gameplay code asks about [`Action`]s
//! rather than raw keys so bindings can be changed in one place.
//!
//! Window events are fed in between frames (by a winit event loop or a
//! test). [`InputSystem::update`] runs at the start of a frame and
//! [`InputSystem::end_frame`] clears the per-frame state at its end.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

pub use winit::event::MouseButton;
pub use winit::keyboard::KeyCode;
use winit::event::{DeviceEvent, ElementState, WindowEvent};
use winit::keyboard::PhysicalKey;

use crate::ecs::System;

/// Tracks the state of a set of inputs (keys or mouse buttons).
///
/// - `pressed`: currently held down
/// - `just_pressed`: pressed this frame (not held last frame)
/// - `just_released`: released this frame
#[derive(Debug, Clone)]
pub struct Input<T: Eq + Hash + Copy> {
    pressed: HashSet<T>,
    just_pressed: HashSet<T>,
    just_released: HashSet<T>,
}

impl<T: Eq + Hash + Copy> Input<T> {
    pub fn new() -> Self {
        Self {
            pressed: HashSet::new(),
            just_pressed: HashSet::new(),
            just_released: HashSet::new(),
        }
    }

    /// Returns `true` if the input is currently held down.
    pub fn pressed(&self, input: T) -> bool {
        self.pressed.contains(&input)
    }

    /// Returns `true` if the input was pressed this frame.
    pub fn just_pressed(&self, input: T) -> bool {
        self.just_pressed.contains(&input)
    }

    /// Returns `true` if the input was released this frame.
    pub fn just_released(&self, input: T) -> bool {
        self.just_released.contains(&input)
    }

    pub fn press(&mut self, input: T) {
        if self.pressed.insert(input) {
            self.just_pressed.insert(input);
        }
    }

    pub fn release(&mut self, input: T) {
        if self.pressed.remove(&input) {
            self.just_released.insert(input);
        }
    }

    fn clear_just(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}

impl<T: Eq + Hash + Copy> Default for Input<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A logical input, bound to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveForward,
    MoveBackward,
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    /// Toggles whether mouse motion and movement keys steer the camera.
    ToggleMouseLook,
}

impl Action {
    pub const ALL: [Self; 7] = [
        Self::MoveForward,
        Self::MoveBackward,
        Self::MoveLeft,
        Self::MoveRight,
        Self::MoveUp,
        Self::MoveDown,
        Self::ToggleMouseLook,
    ];

    pub fn default_key(self) -> KeyCode {
        match self {
            Self::MoveForward => KeyCode::KeyW,
            Self::MoveBackward => KeyCode::KeyS,
            Self::MoveLeft => KeyCode::KeyA,
            Self::MoveRight => KeyCode::KeyD,
            Self::MoveUp => KeyCode::Space,
            Self::MoveDown => KeyCode::ShiftLeft,
            Self::ToggleMouseLook => KeyCode::AltRight,
        }
    }
}

/// Keyboard, mouse and window-close state for one frame.
#[derive(Debug, Clone)]
pub struct InputSystem {
    keys: Input<KeyCode>,
    mouse_buttons: Input<MouseButton>,
    bindings: HashMap<Action, KeyCode>,
    mouse_offset: (f32, f32),
    quit_requested: bool,
    mouse_look: bool,
    resized: Option<(u32, u32)>,
}

impl System for InputSystem {}

impl InputSystem {
    pub fn new() -> Self {
        Self {
            keys: Input::new(),
            mouse_buttons: Input::new(),
            bindings: Action::ALL.iter().map(|&a| (a, a.default_key())).collect(),
            mouse_offset: (0.0, 0.0),
            quit_requested: false,
            mouse_look: true,
            resized: None,
        }
    }

    /// Feed a winit window event.
    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.request_quit(),
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => self.press_key(code),
                        ElementState::Released => self.release_key(code),
                    }
                }
            }
            WindowEvent::MouseInput { state, button, .. } => match state {
                ElementState::Pressed => self.mouse_buttons.press(*button),
                ElementState::Released => self.mouse_buttons.release(*button),
            },
            WindowEvent::Resized(size) => self.resized = Some((size.width, size.height)),
            _ => {}
        }
    }

    /// Feed a winit device event. Raw mouse motion drives camera look.
    pub fn handle_device_event(&mut self, event: &DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.add_mouse_motion(delta.0 as f32, delta.1 as f32);
        }
    }

    pub fn press_key(&mut self, key: KeyCode) {
        self.keys.press(key);
    }

    pub fn release_key(&mut self, key: KeyCode) {
        self.keys.release(key);
    }

    pub fn add_mouse_motion(&mut self, dx: f32, dy: f32) {
        self.mouse_offset.0 += dx;
        self.mouse_offset.1 += dy;
    }

    pub fn request_quit(&mut self) {
        self.quit_requested = true;
    }

    /// Start-of-frame processing. Applies the mouse-look toggle and returns
    /// `false` once quitting was requested.
    pub fn update(&mut self) -> bool {
        if self.action_just_pressed(Action::ToggleMouseLook) {
            self.mouse_look = !self.mouse_look;
            log::debug!("Mouse look {}", if self.mouse_look { "on" } else { "off" });
        }
        !self.quit_requested
    }

    /// End-of-frame processing. Clears just-pressed state and mouse motion.
    pub fn end_frame(&mut self) {
        self.keys.clear_just();
        self.mouse_buttons.clear_just();
        self.mouse_offset = (0.0, 0.0);
    }

    pub fn keys(&self) -> &Input<KeyCode> {
        &self.keys
    }

    pub fn mouse_buttons(&self) -> &Input<MouseButton> {
        &self.mouse_buttons
    }

    pub fn action_pressed(&self, action: Action) -> bool {
        self.bindings
            .get(&action)
            .is_some_and(|&key| self.keys.pressed(key))
    }

    pub fn action_just_pressed(&self, action: Action) -> bool {
        self.bindings
            .get(&action)
            .is_some_and(|&key| self.keys.just_pressed(key))
    }

    pub fn bind(&mut self, action: Action, key: KeyCode) {
        self.bindings.insert(action, key);
    }

    pub fn binding(&self, action: Action) -> Option<KeyCode> {
        self.bindings.get(&action).copied()
    }

    /// Mouse motion accumulated since the last [`end_frame`](Self::end_frame).
    pub fn mouse_offset(&self) -> (f32, f32) {
        self.mouse_offset
    }

    pub fn is_quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Whether mouse look and movement keys currently steer the camera.
    pub fn mouse_look(&self) -> bool {
        self.mouse_look
    }

    pub fn set_mouse_look(&mut self, enabled: bool) {
        self.mouse_look = enabled;
    }

    /// The latest window size reported since the last call, if any.
    pub fn take_resize(&mut self) -> Option<(u32, u32)> {
        self.resized.take()
    }
}

impl Default for InputSystem {
    fn default() -> Self {
        Self::new()
    }
}
