//! Customer-facing calls (no staff session)

use std::sync::Arc;

use http::Method;
use shared::client::PlaceOrderRequest;
use shared::models::{TableVerification, VenueInfo};
use shared::order::OrderView;

use crate::geofence::GeofenceGate;
use crate::transport::{HttpTransport, decode, with_query};
use crate::{ClientError, ClientResult};

#[derive(Clone)]
pub struct CustomerClient {
    transport: Arc<dyn HttpTransport>,
}

impl std::fmt::Debug for CustomerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomerClient").finish_non_exhaustive()
    }
}

impl CustomerClient {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    /// Venue name and geofence; the only boundary the gate trusts
    pub async fn venue(&self) -> ClientResult<VenueInfo> {
        let data = self
            .transport
            .execute(Method::GET, "/api/venue", None, None)
            .await?;
        decode(data)
    }

    pub async fn verify_table(&self, number: u32) -> ClientResult<TableVerification> {
        let path = format!("/api/tables/{}/verify", number);
        let data = self.transport.execute(Method::GET, &path, None, None).await?;
        decode(data)
    }

    /// 下单：地理围栏未通过时不发送请求
    pub async fn place_order(
        &self,
        gate: &GeofenceGate,
        req: &PlaceOrderRequest,
    ) -> ClientResult<OrderView> {
        if !gate.is_granted() {
            return Err(ClientError::AdmissionRequired);
        }
        let body = serde_json::to_value(req)?;
        let data = self
            .transport
            .execute(Method::POST, "/api/orders", None, Some(body))
            .await?;
        decode(data)
    }

    /// The customer's own recent orders at a table
    pub async fn table_orders(&self, number: u32, phone: &str) -> ClientResult<Vec<OrderView>> {
        let path = with_query(
            &format!("/api/orders/table/{}", number),
            &[("phone", phone.to_string())],
        )?;
        let data = self.transport.execute(Method::GET, &path, None, None).await?;
        decode(data)
    }
}
