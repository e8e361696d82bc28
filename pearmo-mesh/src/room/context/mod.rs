mod room_context;

pub use room_context::*;
