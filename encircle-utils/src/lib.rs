mod hash;
pub use hash::*;
mod json;
pub use json::*;
mod stats;
pub use stats::*;
mod table;
pub use table::*;
