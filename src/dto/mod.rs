pub mod categories;
pub mod named;
pub mod orders;
pub mod products;
pub mod roles;
pub mod tables;
pub mod users;
