//! OrdersManager - 下单、状态迁移与读取分区
//!
//! # Transition Flow
//!
//! ```text
//! transition(id, event, staff)
//!     ├─ 1. can_perform(staff.role, event)     → Forbidden
//!     ├─ 2. load order                         → OrderNotFound
//!     ├─ 3. event.target(order.status)         → InvalidTransition
//!     └─ 4. compare-and-set status in storage  → StaleState
//! ```
//!
//! 读取分区 (today / pending / unpaid / history / table lookup) 都是对同一
//! 订单实体按状态和创建时间的查询，没有单独的存储。

mod error;

pub use error::*;

use chrono::NaiveTime;
use chrono_tz::Tz;

use shared::client::PlaceOrderRequest;
use shared::order::{Order, OrderEvent, OrderLine, OrderStatus};
use shared::util::{now_millis, snowflake_id};

use crate::auth::{CurrentStaff, can_perform};
use crate::db::{StatusUpdate, Storage, StorageError};
use crate::security_log;
use crate::utils::time::business_day_range;
use crate::utils::validation::{
    MAX_LINE_QUANTITY, MAX_NAME_LEN, MAX_NOTE_LEN, MAX_ORDER_LINES, MAX_PHONE_LEN,
    normalize_phone, validate_optional_text, validate_required_text,
};

/// Attempts at finding a free order id before giving up
const ID_ATTEMPTS: usize = 5;

/// 营业日与顾客查询窗口
#[derive(Debug, Clone)]
pub struct OrderPolicy {
    /// 业务时区
    pub tz: Tz,
    /// 营业日分界时间
    pub business_day_cutoff: NaiveTime,
    /// 顾客按桌号+电话查询的回溯窗口
    pub customer_lookup: chrono::Duration,
}

impl Default for OrderPolicy {
    fn default() -> Self {
        Self {
            tz: Tz::UTC,
            business_day_cutoff: NaiveTime::MIN,
            customer_lookup: chrono::Duration::hours(12),
        }
    }
}

/// Order Lifecycle Engine
#[derive(Debug, Clone)]
pub struct OrdersManager {
    storage: Storage,
    policy: OrderPolicy,
}

impl OrdersManager {
    pub fn new(storage: Storage, policy: OrderPolicy) -> Self {
        Self { storage, policy }
    }

    pub fn policy(&self) -> &OrderPolicy {
        &self.policy
    }

    // ========== Creation ==========

    /// 下单 (公共入口)
    pub fn place_order(&self, req: &PlaceOrderRequest) -> ManagerResult<Order> {
        self.place_order_at(req, now_millis())
    }

    /// 以指定创建时间下单
    ///
    /// 总价由服务端按当前菜单价格计算，客户端不提交价格。
    pub fn place_order_at(&self, req: &PlaceOrderRequest, now: i64) -> ManagerResult<Order> {
        match self.storage.get_dining_table(req.table_number)? {
            Some(table) if table.is_active => {}
            _ => return Err(ManagerError::TableNotFound(req.table_number)),
        }

        if req.items.is_empty() {
            return Err(ManagerError::EmptyOrder);
        }
        if req.items.len() > MAX_ORDER_LINES {
            return Err(ManagerError::TooManyItems {
                count: req.items.len(),
                max: MAX_ORDER_LINES,
            });
        }
        if let Some(line) = req
            .items
            .iter()
            .find(|line| line.quantity < 1 || line.quantity > MAX_LINE_QUANTITY)
        {
            return Err(ManagerError::InvalidQuantity {
                menu_item_id: line.menu_item_id,
                quantity: line.quantity,
            });
        }

        validate_required_text(&req.customer_name, "customer_name", MAX_NAME_LEN)
            .map_err(ManagerError::Validation)?;
        validate_required_text(&req.customer_phone, "customer_phone", MAX_PHONE_LEN)
            .map_err(ManagerError::Validation)?;
        if normalize_phone(&req.customer_phone).trim_start_matches('+').is_empty() {
            return Err(ManagerError::Validation(
                "customer_phone must contain digits".to_string(),
            ));
        }
        validate_optional_text(req.notes.as_deref(), "notes", MAX_NOTE_LEN)
            .map_err(ManagerError::Validation)?;

        let mut items = Vec::with_capacity(req.items.len());
        for line in &req.items {
            validate_optional_text(line.instructions.as_deref(), "instructions", MAX_NOTE_LEN)
                .map_err(ManagerError::Validation)?;

            let menu_item = self
                .storage
                .get_menu_item(line.menu_item_id)?
                .ok_or(ManagerError::MenuItemNotFound(line.menu_item_id))?;
            if !menu_item.is_available {
                return Err(ManagerError::MenuItemUnavailable(menu_item.id));
            }

            items.push(OrderLine {
                menu_item_id: menu_item.id,
                name: menu_item.name,
                unit_price: menu_item.price,
                quantity: line.quantity,
                instructions: non_blank(line.instructions.as_deref()),
            });
        }

        let mut order = Order {
            id: snowflake_id(),
            table_number: req.table_number,
            customer_name: req.customer_name.trim().to_string(),
            customer_phone: req.customer_phone.trim().to_string(),
            total: Order::compute_total(&items),
            items,
            status: OrderStatus::Pending,
            notes: non_blank(req.notes.as_deref()),
            created_at: now,
            status_changed_at: now,
            status_changed_by: None,
        };

        let mut attempts = 0;
        loop {
            match self.storage.insert_order(&order) {
                Ok(()) => break,
                Err(StorageError::OrderExists(id)) if attempts + 1 < ID_ATTEMPTS => {
                    tracing::debug!(order_id = id, "Order id collision, regenerating");
                    attempts += 1;
                    order.id = snowflake_id();
                }
                Err(StorageError::OrderExists(id)) => {
                    return Err(ManagerError::Internal(format!(
                        "could not allocate an order id (last tried {id})"
                    )));
                }
                Err(e) => return Err(e.into()),
            }
        }

        tracing::info!(
            order_id = order.id,
            table_number = order.table_number,
            lines = order.items.len(),
            total = %order.total,
            "Order placed"
        );
        Ok(order)
    }

    // ========== Transitions ==========

    /// 执行状态迁移
    ///
    /// 权限在读取订单之前判定：无权限的调用方对不存在的订单同样得到 Forbidden。
    pub fn transition(
        &self,
        order_id: i64,
        event: OrderEvent,
        staff: &CurrentStaff,
    ) -> ManagerResult<Order> {
        if !can_perform(staff.role, event) {
            security_log!(
                "WARN",
                "permission_denied",
                staff_id = staff.id,
                role = staff.role.as_str(),
                event = event.as_str(),
                order_id = order_id
            );
            return Err(ManagerError::Forbidden {
                role: staff.role,
                event,
            });
        }

        let order = self.get_order(order_id)?;
        self.apply_transition(&order, event, staff.id, now_millis())
    }

    /// 取消订单 (仅 pending / preparing)
    pub fn cancel_order(&self, order_id: i64, staff: &CurrentStaff) -> ManagerResult<Order> {
        self.transition(order_id, OrderEvent::Cancel, staff)
    }

    /// 基于已读取的快照执行迁移；快照过期时返回 StaleState
    fn apply_transition(
        &self,
        snapshot: &Order,
        event: OrderEvent,
        actor_id: i64,
        now: i64,
    ) -> ManagerResult<Order> {
        let to = event
            .target(snapshot.status)
            .ok_or(ManagerError::InvalidTransition {
                from: snapshot.status,
                event,
            })?;

        match self
            .storage
            .update_order_status(snapshot.id, snapshot.status, to, actor_id, now)?
        {
            StatusUpdate::Applied(order) => {
                tracing::info!(
                    order_id = order.id,
                    from = %snapshot.status,
                    to = %order.status,
                    event = %event,
                    staff_id = actor_id,
                    "Order status changed"
                );
                Ok(order)
            }
            StatusUpdate::NotFound => Err(ManagerError::OrderNotFound(snapshot.id)),
            StatusUpdate::Stale(current) => {
                tracing::warn!(
                    order_id = current.id,
                    expected = %snapshot.status,
                    actual = %current.status,
                    event = %event,
                    staff_id = actor_id,
                    "Stale order transition rejected"
                );
                Err(ManagerError::StaleState {
                    expected: snapshot.status,
                    actual: current.status,
                })
            }
        }
    }

    // ========== Reads ==========

    pub fn get_order(&self, order_id: i64) -> ManagerResult<Order> {
        self.storage
            .get_order(order_id)?
            .ok_or(ManagerError::OrderNotFound(order_id))
    }

    /// 当前营业日创建的订单，最新在前
    pub fn todays_orders(&self, now: i64) -> ManagerResult<Vec<Order>> {
        let (start, end) =
            business_day_range(now, self.policy.business_day_cutoff, self.policy.tz);
        let mut orders = self.storage.orders_created_between(start, end)?;
        orders.reverse();
        Ok(orders)
    }

    /// 待制作队列，最早在前
    pub fn pending_queue(&self) -> ManagerResult<Vec<Order>> {
        self.active_with_status(OrderStatus::Pending)
    }

    /// 已完成未付款，最早在前
    pub fn unpaid(&self) -> ManagerResult<Vec<Order>> {
        self.active_with_status(OrderStatus::Completed)
    }

    /// 已付款或已取消的订单，按创建时间 `[from, to)` 过滤，最新在前
    pub fn history(&self, from: Option<i64>, to: Option<i64>) -> ManagerResult<Vec<Order>> {
        let from = from.unwrap_or(0);
        let to = to.unwrap_or(i64::MAX);
        if from >= to {
            return Err(ManagerError::Validation(
                "history range: `from` must be before `to`".to_string(),
            ));
        }

        let mut orders: Vec<Order> = self
            .storage
            .orders_created_between(from, to)?
            .into_iter()
            .filter(|order| order.status.is_terminal())
            .collect();
        orders.reverse();
        Ok(orders)
    }

    /// 顾客查询自己在某桌的近期订单 (电话号码匹配)，最新在前
    pub fn table_orders(
        &self,
        table_number: u32,
        phone: &str,
        now: i64,
    ) -> ManagerResult<Vec<Order>> {
        let phone = normalize_phone(phone);
        if phone.trim_start_matches('+').is_empty() {
            return Err(ManagerError::Validation("phone is required".to_string()));
        }

        let since = now - self.policy.customer_lookup.num_milliseconds();
        let mut orders: Vec<Order> = self
            .storage
            .orders_created_between(since, i64::MAX)?
            .into_iter()
            .filter(|order| {
                order.table_number == table_number
                    && normalize_phone(&order.customer_phone) == phone
            })
            .collect();
        orders.reverse();
        Ok(orders)
    }

    fn active_with_status(&self, status: OrderStatus) -> ManagerResult<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .storage
            .active_orders()?
            .into_iter()
            .filter(|order| order.status == status)
            .collect();
        orders.sort_by_key(|order| (order.created_at, order.id));
        Ok(orders)
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
