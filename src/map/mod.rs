//! Model of a Tiled .tsx tileset, with a reader and a writer for the format.
mod raw;
mod tile;
mod tileset;
mod parse;
mod write;

pub use raw::*;
pub use tile::*;
pub use tileset::*;
pub use parse::*;
