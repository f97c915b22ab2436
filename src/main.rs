//! Lawn Mayhem entry point
//!
//! Wires the collaborators together: window + input events, the wgpu
//! renderer, optional music, and the application state machine, driven by a
//! 60 Hz cooperative frame loop. Asset failures abort startup; the only
//! in-loop recovery is surface reconfiguration.

use std::path::Path;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use winit::{
    dpi::LogicalSize,
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::WindowBuilder,
};

use lawn_mayhem::app::{App, AppPhase, MusicCommand};
use lawn_mayhem::audio::AudioPlayer;
use lawn_mayhem::errors::GameError;
use lawn_mayhem::input::InputState;
use lawn_mayhem::mesh::MeshSet;
use lawn_mayhem::renderer::{compose, Renderer};
use lawn_mayhem::settings::Settings;
use lawn_mayhem::sim::GamePhase;

const MODELS_DIR: &str = "assets/models";
const MUSIC_PATH: &str = "assets/music/theme.ogg";
const TARGET_FPS: u64 = 60;

fn main() -> Result<(), GameError> {
    env_logger::init();
    log::info!("Lawn Mayhem starting...");

    let settings = Settings::load();
    let meshes = MeshSet::load(Path::new(MODELS_DIR))?;

    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title("Lawn Mayhem")
        .with_inner_size(LogicalSize::new(
            settings.window_width,
            settings.window_height,
        ))
        .build(&event_loop)
        .map_err(|e| GameError::Render(format!("window creation failed: {}", e)))?;

    let mut renderer = pollster::block_on(Renderer::new(&window))?;

    // The game runs silent if there is no audio device or track
    let audio = match AudioPlayer::new() {
        Ok(mut player) => {
            match player.play_music(Path::new(MUSIC_PATH), settings.effective_music_volume()) {
                Ok(()) => log::info!("music playing: {}", MUSIC_PATH),
                Err(e) => log::warn!("music disabled: {}", e),
            }
            Some(player)
        }
        Err(e) => {
            log::warn!("audio disabled: {}", e);
            None
        }
    };

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    let mut app = App::new(seed);
    let mut input = InputState::new();

    let target_frame_time = Duration::from_micros(1_000_000 / TARGET_FPS);
    let mut last_frame = Instant::now();
    let mut last_title = String::new();
    let mut fps_counter = 0u32;
    let mut fps_window = Instant::now();
    let mut fps = 0u32;

    event_loop.run(move |event, _, control_flow| match event {
        Event::WindowEvent {
            ref event,
            window_id,
        } if window_id == window.id() => match event {
            WindowEvent::CloseRequested => {
                log::info!("window close requested");
                *control_flow = ControlFlow::Exit;
            }
            WindowEvent::Resized(size) => {
                renderer.resize(size.width, size.height);
            }
            WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                renderer.resize(new_inner_size.width, new_inner_size.height);
            }
            _ => input.handle_window_event(event),
        },
        Event::RedrawRequested(window_id) if window_id == window.id() => {
            let now = Instant::now();
            if now.duration_since(last_frame) < target_frame_time {
                return;
            }
            let dt = now.duration_since(last_frame).as_secs_f32().min(0.1);
            last_frame = now;

            let frame_input = input.frame_input();
            let music_command = app.frame(&frame_input, dt);
            input.end_frame();

            if let (Some(player), Some(command)) = (audio.as_ref(), music_command) {
                match command {
                    MusicCommand::Pause => player.pause_music(),
                    MusicCommand::Resume => player.resume_music(),
                }
            }

            if app.phase == AppPhase::Exit {
                log::info!("exiting");
                *control_flow = ControlFlow::Exit;
                return;
            }

            let mut scene = compose(&app);
            if !settings.particles {
                scene.points.clear();
            }

            match renderer.render(&scene, &meshes) {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost) => {
                    let (width, height) = renderer.size;
                    renderer.resize(width, height);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("out of GPU memory");
                    *control_flow = ControlFlow::Exit;
                }
                Err(e) => log::warn!("render error: {:?}", e),
            }

            fps_counter += 1;
            if fps_window.elapsed() >= Duration::from_secs(1) {
                fps = fps_counter;
                fps_counter = 0;
                fps_window = now;
            }

            // Score and prompts live in the title; text rendering stays out
            // of the pipeline
            let title = window_title(&app, fps, settings.show_fps);
            if title != last_title {
                window.set_title(&title);
                last_title = title;
            }
        }
        Event::MainEventsCleared => window.request_redraw(),
        _ => {}
    })
}

fn window_title(app: &App, fps: u32, show_fps: bool) -> String {
    let mut title = match app.phase {
        AppPhase::Menu => "Lawn Mayhem - ENTER: start  ESC: quit  M: music".to_string(),
        AppPhase::Playing => match app.session.as_ref() {
            Some(s) if s.phase == GamePhase::Paused => {
                format!("Lawn Mayhem - PAUSED - P: resume  score {}", s.score)
            }
            Some(s) => format!("Lawn Mayhem - score {}", s.score),
            None => "Lawn Mayhem".to_string(),
        },
        AppPhase::GameOver => format!(
            "Lawn Mayhem - GAME OVER - score {} - R: restart  ESC: quit",
            app.final_score
        ),
        AppPhase::Exit => "Lawn Mayhem".to_string(),
    };
    if show_fps {
        title.push_str(&format!("  [{} fps]", fps));
    }
    title
}
