pub mod health;
pub mod room;
pub mod room_event;
pub mod transaction;
