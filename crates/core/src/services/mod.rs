mod connection;
mod node_resolver;

pub use connection::*;
pub use node_resolver::*;
