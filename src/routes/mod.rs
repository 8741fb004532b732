pub mod appointment;
pub mod auth;
pub mod catalog;
pub mod error;
pub mod health;
pub mod user;
