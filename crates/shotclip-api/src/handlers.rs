//! Request handlers.

pub mod archive;
pub mod clips;
pub mod health;

pub use archive::*;
pub use clips::*;
pub use health::*;
