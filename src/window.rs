//! SDL2 window management and input.
//!
//! Provides the [`Window`] struct for creating the display window, polling
//! events, reading held-key movement axes, and presenting rendered frames,
//! plus frame pacing and FPS measurement helpers.

use std::time::Instant;

use sdl2::event::Event;
use sdl2::keyboard::{Keycode, Scancode};
use sdl2::pixels::PixelFormatEnum;
use sdl2::rect::Rect;

use crate::engine::FrameInput;
use crate::math::Vec3;

pub const FPS: u64 = 60;
pub const FRAME_TARGET_TIME: f64 = 1000.0 / FPS as f64;

/// Turn velocity contributed by a held arrow / numpad key.
const TURN_INPUT: f32 = 0.01;

/// Field-of-view change per frame while a numpad 4/6 key is held.
const FOV_STEP: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    Quit,
    KeyPress(Key),
}

/// Toggle keys. Movement keys are read as held state, not events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Num1,
    Num2,
    Num3,
    Num4,
    Num5,
    Num6,
    Num7,
    Num8,
    Num9,
    Num0,
    Space,
}

pub struct FrameLimiter {
    previous_frame_time: u64,
}

impl FrameLimiter {
    pub fn new(window: &Window) -> Self {
        Self {
            previous_frame_time: window.timer().ticks64(),
        }
    }

    /// Waits if necessary to maintain frame rate and returns the delta time in milliseconds.
    /// Delta time represents the time elapsed since the last call to this method.
    pub fn wait_and_get_delta(&mut self, window: &Window) -> u64 {
        let mut current_time = window.timer().ticks64();
        let mut delta_time = current_time - self.previous_frame_time;

        if delta_time < FRAME_TARGET_TIME as u64 {
            let time_to_wait = (FRAME_TARGET_TIME as u64) - delta_time;
            std::thread::sleep(std::time::Duration::from_millis(time_to_wait));
            current_time = window.timer().ticks64();
            delta_time = current_time - self.previous_frame_time;
        }

        self.previous_frame_time = current_time;
        delta_time
    }
}

/// Tracks frames per second with once-per-second updates.
pub struct FpsCounter {
    frame_count: u32,
    last_update: Instant,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self {
            frame_count: 0,
            last_update: Instant::now(),
        }
    }

    /// Call each frame. Returns `Some(fps)` once per second, `None` otherwise.
    pub fn tick(&mut self) -> Option<f64> {
        self.frame_count += 1;
        let elapsed = self.last_update.elapsed();
        if elapsed.as_secs() >= 1 {
            let fps = self.frame_count as f64 / elapsed.as_secs_f64();
            self.frame_count = 0;
            self.last_update = Instant::now();
            Some(fps)
        } else {
            None
        }
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Window {
    canvas: sdl2::render::Canvas<sdl2::video::Window>,
    #[allow(dead_code)]
    texture_creator: Box<sdl2::render::TextureCreator<sdl2::video::WindowContext>>,
    texture: sdl2::render::Texture<'static>,
    event_pump: sdl2::EventPump,
    timer_subsystem: sdl2::TimerSubsystem,
    resolution: u32,
}

impl Window {
    /// Creates a square window backed by a streaming RGB24 texture of the
    /// same resolution.
    pub fn new(title: &str, resolution: u32) -> Result<Self, String> {
        let sdl_context = sdl2::init()?;
        let video_subsystem = sdl_context.video()?;
        let timer_subsystem = sdl_context.timer()?;

        let window = video_subsystem
            .window(title, resolution, resolution)
            .position_centered()
            .build()
            .map_err(|e| e.to_string())?;

        let canvas = window.into_canvas().build().map_err(|e| e.to_string())?;
        let texture_creator = Box::new(canvas.texture_creator());
        let event_pump = sdl_context.event_pump()?;

        // SAFETY: texture_creator is heap-allocated and lives as long as Window.
        // We ensure texture is dropped before texture_creator by struct field order.
        let texture_creator_ref: &'static sdl2::render::TextureCreator<sdl2::video::WindowContext> =
            unsafe { &*(texture_creator.as_ref() as *const _) };
        let texture = texture_creator_ref
            .create_texture_streaming(PixelFormatEnum::RGB24, resolution, resolution)
            .map_err(|e| e.to_string())?;

        Ok(Self {
            canvas,
            texture_creator,
            texture,
            event_pump,
            timer_subsystem,
            resolution,
        })
    }

    /// Drains the event queue into quit / toggle-key events.
    pub fn poll_events(&mut self) -> Vec<WindowEvent> {
        let mut events = Vec::new();
        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => events.push(WindowEvent::Quit),
                Event::KeyDown {
                    keycode: Some(keycode),
                    ..
                } => {
                    let key = match keycode {
                        Keycode::Num1 => Some(Key::Num1),
                        Keycode::Num2 => Some(Key::Num2),
                        Keycode::Num3 => Some(Key::Num3),
                        Keycode::Num4 => Some(Key::Num4),
                        Keycode::Num5 => Some(Key::Num5),
                        Keycode::Num6 => Some(Key::Num6),
                        Keycode::Num7 => Some(Key::Num7),
                        Keycode::Num8 => Some(Key::Num8),
                        Keycode::Num9 => Some(Key::Num9),
                        Keycode::Num0 => Some(Key::Num0),
                        Keycode::Space => Some(Key::Space),
                        _ => None,
                    };
                    if let Some(k) = key {
                        events.push(WindowEvent::KeyPress(k));
                    }
                }
                _ => {}
            }
        }
        events
    }

    /// Reads the held-key movement and turn axes for this frame.
    pub fn input(&self) -> FrameInput {
        let keys = self.event_pump.keyboard_state();
        let axis = |positive: Scancode, negative: Scancode| {
            keys.is_scancode_pressed(positive) as i32 as f32
                - keys.is_scancode_pressed(negative) as i32 as f32
        };

        FrameInput {
            movement: Vec3::new(
                axis(Scancode::A, Scancode::D),
                axis(Scancode::Down, Scancode::Up),
                axis(Scancode::S, Scancode::W),
            ),
            yaw: TURN_INPUT * axis(Scancode::Left, Scancode::Right),
            pitch: TURN_INPUT * axis(Scancode::Kp8, Scancode::Kp2),
            fov_delta: FOV_STEP * axis(Scancode::Kp4, Scancode::Kp6),
        }
    }

    /// Uploads and displays a rendered frame (3 bytes per pixel).
    pub fn present(&mut self, buffer: &[u8]) -> Result<(), String> {
        self.texture
            .update(None, buffer, (self.resolution * 3) as usize)
            .map_err(|e| e.to_string())?;

        self.canvas.clear();
        self.canvas.copy(
            &self.texture,
            None,
            Some(Rect::new(0, 0, self.resolution, self.resolution)),
        )?;
        self.canvas.present();
        Ok(())
    }

    pub fn timer(&self) -> &sdl2::TimerSubsystem {
        &self.timer_subsystem
    }

    pub fn set_title(&mut self, title: &str) {
        let _ = self.canvas.window_mut().set_title(title);
    }
}
