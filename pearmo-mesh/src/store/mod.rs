mod memory_store;
mod signaling_store;
mod store_error;
mod subscription;

pub use memory_store::*;
pub use signaling_store::*;
pub use store_error::*;
pub use subscription::*;
