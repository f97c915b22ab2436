//! Top-level application state machine
//!
//! Owns the menu / playing / game-over flow around individual play sessions.
//! One session lives entirely inside the `Playing` phase; its final score is
//! carried to the game-over screen.

use crate::sim::{tick, GamePhase, GameState, TickInput};

/// Which screen the application is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppPhase {
    Menu,
    Playing,
    GameOver,
    /// Terminal; the frontend tears the process down
    Exit,
}

/// Per-frame commands gathered from the input collaborator
#[derive(Debug, Clone, Default)]
pub struct AppInput {
    /// Quit signal (leaves a session, then the application)
    pub quit: bool,
    /// Start from the menu
    pub confirm: bool,
    /// Restart from the game-over screen
    pub restart: bool,
    /// Session pause toggle
    pub pause: bool,
    /// Music pause toggle
    pub toggle_music: bool,
    /// Move keys, held-state
    pub move_left: bool,
    pub move_right: bool,
}

/// Command forwarded to the audio collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MusicCommand {
    Pause,
    Resume,
}

pub struct App {
    pub phase: AppPhase,
    /// The active session; `Some` exactly while `phase == Playing`
    pub session: Option<GameState>,
    /// Last session's final score, shown on the game-over screen
    pub final_score: i32,
    pub music_paused: bool,
    seed: u64,
    sessions: u64,
}

impl App {
    pub fn new(seed: u64) -> Self {
        Self {
            phase: AppPhase::Menu,
            session: None,
            final_score: 0,
            music_paused: false,
            seed,
            sessions: 0,
        }
    }

    /// Advance the application by one frame. Returns the music command to
    /// forward to the audio subsystem, if the toggle fired.
    pub fn frame(&mut self, input: &AppInput, dt: f32) -> Option<MusicCommand> {
        let mut music_command = None;
        if input.toggle_music && self.phase != AppPhase::Exit {
            self.music_paused = !self.music_paused;
            music_command = Some(if self.music_paused {
                MusicCommand::Pause
            } else {
                MusicCommand::Resume
            });
        }

        match self.phase {
            AppPhase::Menu => {
                if input.quit {
                    self.phase = AppPhase::Exit;
                } else if input.confirm {
                    self.start_session();
                }
            }
            AppPhase::Playing => {
                if let Some(session) = self.session.as_mut() {
                    let session_input = TickInput {
                        move_left: input.move_left,
                        move_right: input.move_right,
                        pause: input.pause,
                        quit: input.quit,
                    };
                    tick(session, &session_input, dt);

                    if session.phase == GamePhase::GameOver {
                        self.final_score = session.score;
                        self.session = None;
                        self.phase = AppPhase::GameOver;
                    }
                } else {
                    self.phase = AppPhase::Menu;
                }
            }
            AppPhase::GameOver => {
                if input.restart {
                    self.start_session();
                } else if input.quit {
                    self.phase = AppPhase::Exit;
                }
            }
            AppPhase::Exit => {}
        }

        music_command
    }

    fn start_session(&mut self) {
        self.sessions += 1;
        let seed = self.seed.wrapping_add(self.sessions.wrapping_mul(2654435761));
        log::info!("session {} starting (seed {})", self.sessions, seed);
        self.session = Some(GameState::new(seed));
        self.phase = AppPhase::Playing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRAME_DT;

    fn press(f: impl FnOnce(&mut AppInput)) -> AppInput {
        let mut input = AppInput::default();
        f(&mut input);
        input
    }

    #[test]
    fn test_menu_confirm_starts_session() {
        let mut app = App::new(1);
        assert_eq!(app.phase, AppPhase::Menu);

        app.frame(&AppInput::default(), FRAME_DT);
        assert_eq!(app.phase, AppPhase::Menu);

        app.frame(&press(|i| i.confirm = true), FRAME_DT);
        assert_eq!(app.phase, AppPhase::Playing);
        assert!(app.session.is_some());
    }

    #[test]
    fn test_menu_quit_exits() {
        let mut app = App::new(1);
        app.frame(&press(|i| i.quit = true), FRAME_DT);
        assert_eq!(app.phase, AppPhase::Exit);
    }

    #[test]
    fn test_session_death_reaches_game_over_with_score() {
        let mut app = App::new(1);
        app.frame(&press(|i| i.confirm = true), FRAME_DT);

        {
            let session = app.session.as_mut().expect("playing has a session");
            session.score = 70;
            session.health = 0;
        }
        app.frame(&AppInput::default(), FRAME_DT);
        assert_eq!(app.phase, AppPhase::GameOver);
        assert_eq!(app.final_score, 70);
        assert!(app.session.is_none());
    }

    #[test]
    fn test_quit_during_session_carries_score() {
        let mut app = App::new(1);
        app.frame(&press(|i| i.confirm = true), FRAME_DT);
        app.session.as_mut().expect("playing has a session").score = 30;

        app.frame(&press(|i| i.quit = true), FRAME_DT);
        assert_eq!(app.phase, AppPhase::GameOver);
        assert_eq!(app.final_score, 30);
    }

    #[test]
    fn test_restart_starts_fresh_session() {
        let mut app = App::new(1);
        app.frame(&press(|i| i.confirm = true), FRAME_DT);
        app.session.as_mut().expect("playing has a session").health = 0;
        app.frame(&AppInput::default(), FRAME_DT);
        assert_eq!(app.phase, AppPhase::GameOver);

        app.frame(&press(|i| i.restart = true), FRAME_DT);
        assert_eq!(app.phase, AppPhase::Playing);
        let session = app.session.as_ref().expect("restarted session");
        assert_eq!(session.score, 0);
        assert_eq!(session.health, crate::consts::MAX_HEALTH);
    }

    #[test]
    fn test_game_over_quit_exits() {
        let mut app = App::new(1);
        app.frame(&press(|i| i.confirm = true), FRAME_DT);
        app.session.as_mut().expect("playing has a session").health = 0;
        app.frame(&AppInput::default(), FRAME_DT);

        app.frame(&press(|i| i.quit = true), FRAME_DT);
        assert_eq!(app.phase, AppPhase::Exit);
    }

    #[test]
    fn test_pause_stays_in_playing() {
        let mut app = App::new(1);
        app.frame(&press(|i| i.confirm = true), FRAME_DT);
        app.frame(&press(|i| i.pause = true), FRAME_DT);
        assert_eq!(app.phase, AppPhase::Playing);
        assert_eq!(
            app.session.as_ref().expect("session persists").phase,
            GamePhase::Paused
        );
    }

    #[test]
    fn test_music_toggle_emits_commands() {
        let mut app = App::new(1);
        let cmd = app.frame(&press(|i| i.toggle_music = true), FRAME_DT);
        assert_eq!(cmd, Some(MusicCommand::Pause));
        assert!(app.music_paused);

        let cmd = app.frame(&press(|i| i.toggle_music = true), FRAME_DT);
        assert_eq!(cmd, Some(MusicCommand::Resume));
        assert!(!app.music_paused);

        let cmd = app.frame(&AppInput::default(), FRAME_DT);
        assert_eq!(cmd, None);
    }
}
