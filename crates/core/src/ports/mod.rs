mod collection;
mod cursor;
mod pagination;
mod repository;
mod router;
mod store;

pub use collection::*;
pub use cursor::*;
pub use pagination::*;
pub use repository::*;
pub use router::*;
pub use store::*;
