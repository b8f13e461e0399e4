//! Integrity checks for tilesets and the images they reference.
mod issue;
pub(crate) mod probe;
mod validator;

pub use issue::*;
pub use probe::*;
pub use validator::*;
