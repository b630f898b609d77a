//! 集成测试公共设施
//!
//! 内存数据库 + 种子数据 + 进程内传输 (tower oneshot)，
//! 与生产环境中客户端消费服务器的方式一致。

#![allow(dead_code)]

use std::sync::Arc;

use cafe_client::{CustomerClient, HttpTransport, MemorySessionStore, OneshotTransport, StaffSession};
use cafe_server::auth::JwtConfig;
use cafe_server::core::bootstrap::{self, SeedData, SeedStaff};
use cafe_server::db::Storage;
use cafe_server::{Config, ServerState, build_router};
use rust_decimal::Decimal;
use shared::client::{OrderLineInput, PlaceOrderRequest};
use shared::geo::Coordinate;
use shared::models::{DiningTable, MenuItem, StaffRole};

pub const JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";

pub const ADMIN: (&str, &str) = ("alba", "admin-pass-1");
pub const CHEF: (&str, &str) = ("marta", "chef-pass-1");
pub const STAFF: (&str, &str) = ("joan", "staff-pass-1");
pub const INACTIVE: (&str, &str) = ("pere", "gone-pass-1");

pub const ESPRESSO: i64 = 10;
pub const CROISSANT: i64 = 11;
pub const SOLD_OUT: i64 = 12;

pub struct TestServer {
    pub state: ServerState,
    pub transport: Arc<OneshotTransport>,
}

pub fn test_config() -> Config {
    let mut config = Config::new("mem", JwtConfig::for_tests(JWT_SECRET));
    config.login_fixed_delay_ms = 0;
    config.login_max_failures = 3;
    config.venue.center = Some(Coordinate::new(0.0, 0.0));
    config.venue.radius_m = Some(50.0);
    config
}

fn seed_staff(credentials: (&str, &str), role: StaffRole, is_active: bool) -> SeedStaff {
    SeedStaff {
        username: credentials.0.to_string(),
        display_name: None,
        password: credentials.1.to_string(),
        role,
        is_active,
        email: None,
        email_verified: false,
    }
}

pub fn seed() -> SeedData {
    SeedData {
        tables: vec![
            DiningTable {
                number: 1,
                label: Some("Window".to_string()),
                is_active: true,
            },
            DiningTable {
                number: 2,
                label: None,
                is_active: true,
            },
            DiningTable {
                number: 9,
                label: Some("Closed terrace".to_string()),
                is_active: false,
            },
        ],
        menu_items: vec![
            MenuItem {
                id: ESPRESSO,
                name: "Espresso".to_string(),
                price: Decimal::new(180, 2),
                category: Some("Coffee".to_string()),
                is_available: true,
            },
            MenuItem {
                id: CROISSANT,
                name: "Croissant".to_string(),
                price: Decimal::new(225, 2),
                category: None,
                is_available: true,
            },
            MenuItem {
                id: SOLD_OUT,
                name: "Cheesecake".to_string(),
                price: Decimal::new(450, 2),
                category: None,
                is_available: false,
            },
        ],
        staff: vec![
            seed_staff(ADMIN, StaffRole::Admin, true),
            seed_staff(CHEF, StaffRole::Chef, true),
            seed_staff(STAFF, StaffRole::Staff, true),
            seed_staff(INACTIVE, StaffRole::Staff, false),
        ],
    }
}

impl TestServer {
    pub fn start() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let storage = Storage::open_in_memory().expect("in-memory storage");
        bootstrap::import_seed(&storage, &seed()).expect("seed import");
        let state = ServerState::with_storage(config, storage).expect("server state");
        let transport = Arc::new(OneshotTransport::new(build_router(state.clone())));
        Self { state, transport }
    }

    pub fn transport(&self) -> Arc<dyn HttpTransport> {
        self.transport.clone()
    }

    pub fn customer(&self) -> CustomerClient {
        CustomerClient::new(self.transport())
    }

    /// Logged-in staff session backed by an in-memory store
    pub async fn staff(&self, credentials: (&str, &str)) -> StaffSession {
        let session = StaffSession::new(self.transport(), Arc::new(MemorySessionStore::new()));
        session
            .login(credentials.0, credentials.1)
            .await
            .expect("staff login");
        session
    }
}

pub fn order_request(table_number: u32, phone: &str, lines: &[(i64, u32)]) -> PlaceOrderRequest {
    PlaceOrderRequest {
        table_number,
        customer_name: "Nuria".to_string(),
        customer_phone: phone.to_string(),
        items: lines
            .iter()
            .map(|&(menu_item_id, quantity)| OrderLineInput {
                menu_item_id,
                quantity,
                instructions: None,
            })
            .collect(),
        notes: None,
    }
}

/// Device standing at a fixed point
pub struct FixedLocation(pub Coordinate);

#[async_trait::async_trait]
impl cafe_client::LocationProvider for FixedLocation {
    async fn current_position(
        &self,
        _options: cafe_client::PositionOptions,
    ) -> Result<Coordinate, cafe_client::LocationError> {
        Ok(self.0)
    }
}

/// Gate admitted against the server's venue configuration
pub async fn granted_gate(customer: &CustomerClient) -> cafe_client::GeofenceGate {
    let venue = customer.venue().await.expect("venue");
    let gate = cafe_client::GeofenceGate::new(
        Arc::new(FixedLocation(Coordinate::new(0.0001, 0.0))),
        cafe_client::GateConfig::default(),
    );
    gate.configure(&venue);
    let status = gate.request_access().await;
    assert!(gate.is_granted(), "gate not granted: {status:?}");
    gate
}
