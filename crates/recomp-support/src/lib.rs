//! Input sources for the recomp core: deterministic movie parsing and writing.

pub mod error;
pub mod tas;

pub use error::SupportError as Error;
pub use tas::{FrameFlags, InputFrame, Movie};
