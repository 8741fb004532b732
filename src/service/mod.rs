pub mod appointment;
pub mod auth;
pub mod catalog;
pub mod lifecycle;
pub mod token;
pub mod user;
