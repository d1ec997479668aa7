pub mod clock;
pub mod model;
pub mod pricing;
pub mod repository;
pub mod revenue;
