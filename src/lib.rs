mod util;
mod asset;
mod map;
mod check;
mod collection;
mod config;

pub use util::*;
pub use asset::*;
pub use map::*;
pub use check::*;
pub use collection::*;
pub use config::*;
