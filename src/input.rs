//! Keyboard state tracking over winit events
//!
//! The game consumes input once per frame: edge-triggered commands (quit,
//! pause, mute, confirm, restart) plus held-state queries for the move keys.

use std::collections::HashSet;

use winit::event::{ElementState, KeyboardInput, VirtualKeyCode, WindowEvent};

use crate::app::AppInput;

#[derive(Default)]
pub struct InputState {
    keys_pressed: HashSet<VirtualKeyCode>,
    keys_just_pressed: HashSet<VirtualKeyCode>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        if let WindowEvent::KeyboardInput {
            input:
                KeyboardInput {
                    state,
                    virtual_keycode: Some(keycode),
                    ..
                },
            ..
        } = event
        {
            match state {
                ElementState::Pressed => {
                    if !self.keys_pressed.contains(keycode) {
                        self.keys_just_pressed.insert(*keycode);
                    }
                    self.keys_pressed.insert(*keycode);
                }
                ElementState::Released => {
                    self.keys_pressed.remove(keycode);
                }
            }
        }
    }

    /// Clear edge-triggered state; call once at the end of each frame
    pub fn end_frame(&mut self) {
        self.keys_just_pressed.clear();
    }

    pub fn is_down(&self, key: VirtualKeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn just_pressed(&self, key: VirtualKeyCode) -> bool {
        self.keys_just_pressed.contains(&key)
    }

    /// Snapshot this frame's commands for the state machine
    pub fn frame_input(&self) -> AppInput {
        AppInput {
            quit: self.just_pressed(VirtualKeyCode::Escape),
            confirm: self.just_pressed(VirtualKeyCode::Return),
            restart: self.just_pressed(VirtualKeyCode::R),
            pause: self.just_pressed(VirtualKeyCode::P),
            toggle_music: self.just_pressed(VirtualKeyCode::M),
            move_left: self.is_down(VirtualKeyCode::Left),
            move_right: self.is_down(VirtualKeyCode::Right),
        }
    }
}
