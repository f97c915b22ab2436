use std::fmt;

/// Crate-wide error type. Everything here is fatal at startup: the game has
/// no recoverable error paths once the session loop is running.
#[derive(Debug)]
pub enum GameError {
    Io(std::io::Error),
    Render(String),
    Audio(String),
    Mesh(String),
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GameError::Io(err) => write!(f, "io error: {}", err),
            GameError::Render(msg) => write!(f, "render error: {}", msg),
            GameError::Audio(msg) => write!(f, "audio error: {}", msg),
            GameError::Mesh(msg) => write!(f, "mesh error: {}", msg),
        }
    }
}

impl std::error::Error for GameError {}

impl From<std::io::Error> for GameError {
    fn from(err: std::io::Error) -> Self {
        GameError::Io(err)
    }
}
