pub mod ddb;
pub mod date;
pub mod memory;
