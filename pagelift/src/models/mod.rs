mod common;
mod document;
mod event;
mod outcome;

pub use common::*;
pub use document::*;
pub use event::*;
pub use outcome::*;
