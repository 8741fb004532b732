pub mod appointment;
pub mod catalog;
pub mod health;
pub mod message;
pub mod user;
