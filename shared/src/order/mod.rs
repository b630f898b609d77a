//! Order types shared between cafe-server and clients
//!
//! - [`OrderStatus`] / [`OrderEvent`]: the lifecycle state table
//! - [`Order`] / [`OrderLine`]: the persisted order with snapshot prices

mod state;
mod types;

pub use state::{OrderEvent, OrderStatus};
pub use types::{Order, OrderLine, OrderView};
