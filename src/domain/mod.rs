//! Domain entities and the ports the application layer talks through.

pub mod customer;
pub mod discount;
pub mod ports;
pub mod user;
