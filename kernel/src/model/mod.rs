pub mod id;
pub mod room;
pub mod room_event;
pub mod transaction;
