use crossbeam::channel::{unbounded, Receiver, Sender};

use crate::error::Error;

use super::{Frame, FrameSource};

/// In-memory [`FrameSource`] fed through a [`Script`].
///
/// Reads block until the script pushes a frame. Once every `Script` handle
/// is dropped and the pushed frames are drained, reads yield
/// [`Frame::Closed`].
pub struct ScriptedStream {
    frames: Receiver<Result<Frame, Error>>,
}

#[derive(Clone)]
pub struct Script {
    frames: Sender<Result<Frame, Error>>,
}

pub fn scripted() -> (Script, ScriptedStream) {
    let (tx, rx) = unbounded();
    (Script { frames: tx }, ScriptedStream { frames: rx })
}

impl ScriptedStream {
    /// A stream that yields `texts` as text frames and then closes.
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let (script, stream) = scripted();
        for text in texts {
            script.text(text);
        }
        stream
    }
}

impl Script {
    pub fn text(&self, text: impl Into<String>) {
        self.push(Ok(Frame::Text(text.into())));
    }

    pub fn binary(&self, bytes: impl Into<Vec<u8>>) {
        self.push(Ok(Frame::Binary(bytes.into())));
    }

    pub fn close(&self) {
        self.push(Ok(Frame::Closed));
    }

    pub fn fail(&self, err: Error) {
        self.push(Err(err));
    }

    fn push(&self, frame: Result<Frame, Error>) {
        // Ignored once the reader is gone.
        let _ = self.frames.send(frame);
    }
}

impl FrameSource for ScriptedStream {
    fn read_frame(&mut self) -> Result<Frame, Error> {
        self.frames.recv().unwrap_or(Ok(Frame::Closed))
    }
}
