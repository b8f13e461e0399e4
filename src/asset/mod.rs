mod path_parts;
mod protocol;

pub use path_parts::*;
pub use protocol::*;
