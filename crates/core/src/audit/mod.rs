mod handle;
mod sqlite;
mod store;
mod writer;

pub use handle::*;
pub use sqlite::*;
pub use store::*;
pub use writer::*;
