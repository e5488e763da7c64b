//! Configuration module - database connection settings and schema creation.

pub mod database;
