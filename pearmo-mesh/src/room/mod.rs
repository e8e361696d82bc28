mod context;
mod create_room_impl;
mod hang_up_impl;
mod join_report;
mod join_room_impl;
mod room_behavior;
mod room_command;
mod room_config;

pub use context::*;
pub use join_report::*;
pub use room_behavior::*;
pub(crate) use room_command::*;
pub use room_config::*;
