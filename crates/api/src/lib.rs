pub mod auth;
pub mod schema;
pub mod seed;

mod attendance;
mod common;
mod dashboard;
mod departments;
mod employees;
mod fields;
mod lookups;
mod payroll;
mod performance;
