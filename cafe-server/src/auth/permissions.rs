//! 订单操作权限
//!
//! 角色按权限从低到高排序：`staff < chef < admin`。每个状态迁移事件有一个
//! 最低角色要求，高角色自动拥有低角色的全部订单操作能力。
//!
//! | 事件 | 最低角色 |
//! |------|----------|
//! | start_preparing | chef |
//! | mark_complete | chef |
//! | mark_paid | staff |
//! | cancel | admin |

use shared::models::StaffRole;
use shared::order::OrderEvent;

/// 执行某事件所需的最低角色
pub const fn required_role(event: OrderEvent) -> StaffRole {
    match event {
        OrderEvent::StartPreparing | OrderEvent::MarkComplete => StaffRole::Chef,
        OrderEvent::MarkPaid => StaffRole::Staff,
        OrderEvent::Cancel => StaffRole::Admin,
    }
}

/// 角色是否可以执行该事件
pub fn can_perform(role: StaffRole, event: OrderEvent) -> bool {
    role >= required_role(event)
}

/// 角色可执行的全部事件
pub fn permitted_events(role: StaffRole) -> Vec<OrderEvent> {
    OrderEvent::ALL
        .iter()
        .copied()
        .filter(|event| can_perform(role, *event))
        .collect()
}
