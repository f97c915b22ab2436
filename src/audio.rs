//! Background music playback
//!
//! Thin wrapper over rodio: the game only starts one looping track and
//! forwards pause/resume toggles to it.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

use crate::errors::GameError;

pub struct AudioPlayer {
    // Dropping the stream kills playback, so it rides along unused
    _stream: OutputStream,
    handle: OutputStreamHandle,
    music: Option<Sink>,
}

impl AudioPlayer {
    pub fn new() -> Result<Self, GameError> {
        let (stream, handle) = OutputStream::try_default()
            .map_err(|e| GameError::Audio(format!("no audio output: {}", e)))?;
        Ok(Self {
            _stream: stream,
            handle,
            music: None,
        })
    }

    /// Start looping the track at `path`, replacing any current one
    pub fn play_music(&mut self, path: &Path, volume: f32) -> Result<(), GameError> {
        if let Some(sink) = self.music.take() {
            sink.stop();
        }

        let file = File::open(path)?;
        let source = Decoder::new(BufReader::new(file))
            .map_err(|e| GameError::Audio(format!("{}: {}", path.display(), e)))?;

        let sink = Sink::try_new(&self.handle)
            .map_err(|e| GameError::Audio(format!("failed to create music sink: {}", e)))?;
        sink.set_volume(volume.clamp(0.0, 1.0));
        sink.append(source.repeat_infinite());
        sink.play();

        self.music = Some(sink);
        Ok(())
    }

    pub fn pause_music(&self) {
        if let Some(ref sink) = self.music {
            sink.pause();
        }
    }

    pub fn resume_music(&self) {
        if let Some(ref sink) = self.music {
            sink.play();
        }
    }
}
