//! Data models
//!
//! Shared between cafe-server and the device clients (via API).
//! All IDs are `i64` snowflakes; table numbers are the printed `u32`.

pub mod dining_table;
pub mod menu_item;
pub mod staff;
pub mod venue;

// Re-exports
pub use dining_table::*;
pub use menu_item::*;
pub use staff::*;
pub use venue::*;
