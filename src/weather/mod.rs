pub mod cache;
pub mod error;
pub mod fetcher;
pub mod history;
pub mod page;
pub mod reading;
