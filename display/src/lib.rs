mod error;
pub use error::Error;

mod terminal;
pub use terminal::{TerminalSurface, Visible};
