// Database modules
pub mod connection;
pub mod schema;

// Re-export database connection functions
pub use connection::*;
