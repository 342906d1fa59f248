pub mod aggregate;
pub mod error;
pub mod loader;
pub mod page;
