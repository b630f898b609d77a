//! Cafe Client - device-side access to the cafe server
//!
//! - **staff**: [`StaffSession`] with transparent refresh-on-401
//! - **customer**: [`CustomerClient`] for venue, table and order calls
//! - **geofence**: [`GeofenceGate`] admission state machine
//! - **transport**: [`NetworkTransport`] (reqwest) or, with the `in-process`
//!   feature, [`OneshotTransport`] (tower oneshot against a `Router`)

pub mod config;
pub mod customer;
pub mod error;
pub mod geofence;
pub mod session_store;
pub mod staff;
pub mod transport;

pub use config::ClientConfig;
pub use customer::CustomerClient;
pub use error::{ClientError, ClientResult};
pub use geofence::{
    GateConfig, GateStatus, GeofenceGate, LocationError, LocationProvider, PositionOptions,
};
pub use session_store::{FileSessionStore, MemorySessionStore, SessionStore, StoredSession};
pub use staff::StaffSession;
pub use transport::{HttpTransport, NetworkTransport};
#[cfg(feature = "in-process")]
pub use transport::OneshotTransport;

// Re-export shared types for convenience
pub use shared::client::{LoginResponse, PlaceOrderRequest};
pub use shared::models::{StaffInfo, VenueInfo};
pub use shared::order::OrderView;
