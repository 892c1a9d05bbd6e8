pub mod error;
pub use error::Error;

pub mod retry;
pub mod session;
pub mod stream;
