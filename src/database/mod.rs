pub mod appointment;
pub mod catalog;
pub mod postgres_repository;
pub mod user;
