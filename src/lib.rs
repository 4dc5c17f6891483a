pub mod core;
pub mod utils;
pub mod gateway;
pub mod locks;
pub mod items;
pub mod patrons;
pub mod loans;
pub mod requests;
pub mod fees;
pub mod circulation;
