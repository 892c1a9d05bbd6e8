use crate::error::Error;

#[cfg(feature = "test")]
pub mod test;

mod real;
pub use real::*;

/// One application-level message from the peer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Frame {
    Text(String),
    Binary(Vec<u8>),
    /// The peer closed the connection; no more frames follow.
    Closed,
}

/// Blocking source of inbound frames.
pub trait FrameSource {
    fn read_frame(&mut self) -> Result<Frame, Error>;
}

impl<S> FrameSource for Box<S>
where
    S: FrameSource + ?Sized,
{
    fn read_frame(&mut self) -> Result<Frame, Error> {
        (**self).read_frame()
    }
}
