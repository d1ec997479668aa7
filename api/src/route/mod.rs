pub mod health;
pub mod revenue;
pub mod room;
pub mod v1;
