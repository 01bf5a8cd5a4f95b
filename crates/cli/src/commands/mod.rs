pub mod catalog;
pub mod dashboard;
pub mod movements;
pub mod reports;
pub mod signup;
pub mod stock;
pub mod users;
