//! 种子数据导入
//!
//! 桌台、菜单和员工的增删改由外部管理端负责；服务器启动时只从 JSON 种子
//! 文件导入它们，并在没有任何员工时按环境变量创建首个管理员。
//!
//! ```json
//! {
//!   "tables": [{ "number": 1, "label": "Window" }],
//!   "menu_items": [{ "id": 10, "name": "Espresso", "price": 1.8 }],
//!   "staff": [{ "username": "marta", "password": "...", "role": "chef" }]
//! }
//! ```

use std::path::Path;

use serde::Deserialize;
use shared::models::{DiningTable, MenuItem, StaffRole};
use shared::util::{now_millis, snowflake_id};

use crate::core::{Config, ServerError, ServerResult};
use crate::db::{StaffAccount, Storage, StorageError};

/// 种子文件内容
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub tables: Vec<DiningTable>,
    #[serde(default)]
    pub menu_items: Vec<MenuItem>,
    #[serde(default)]
    pub staff: Vec<SeedStaff>,
}

/// 种子员工 (明文密码在导入时哈希)
#[derive(Debug, Clone, Deserialize)]
pub struct SeedStaff {
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub password: String,
    pub role: StaffRole,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
}

fn default_true() -> bool {
    true
}

/// 导入结果统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub tables: usize,
    pub menu_items: usize,
    pub staff_created: usize,
    pub staff_skipped: usize,
}

pub fn load_seed_file(path: impl AsRef<Path>) -> ServerResult<SeedData> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| ServerError::Seed(format!("{}: {}", path.display(), e)))
}

/// 导入种子数据
///
/// 桌台和菜单按主键覆盖；已存在的用户名跳过，不会改动其密码。
pub fn import_seed(storage: &Storage, seed: &SeedData) -> ServerResult<SeedSummary> {
    let mut summary = SeedSummary::default();

    for table in &seed.tables {
        if table.number == 0 {
            return Err(ServerError::Seed("table number must be positive".into()));
        }
        storage.upsert_dining_table(table)?;
        summary.tables += 1;
    }

    for item in &seed.menu_items {
        if item.price.is_sign_negative() {
            return Err(ServerError::Seed(format!(
                "menu item {} has a negative price",
                item.id
            )));
        }
        storage.upsert_menu_item(item)?;
        summary.menu_items += 1;
    }

    for staff in &seed.staff {
        let account = new_account(
            &staff.username,
            staff.display_name.as_deref(),
            &staff.password,
            staff.role,
        )
        .map(|mut account| {
            account.is_active = staff.is_active;
            account.email = staff.email.clone();
            account.email_verified = staff.email_verified;
            account
        })?;

        match storage.insert_staff(&account) {
            Ok(()) => summary.staff_created += 1,
            Err(StorageError::UsernameTaken(name)) => {
                tracing::debug!(username = %name, "Seed staff already exists, skipping");
                summary.staff_skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    tracing::info!(
        tables = summary.tables,
        menu_items = summary.menu_items,
        staff_created = summary.staff_created,
        staff_skipped = summary.staff_skipped,
        "Seed data imported"
    );
    Ok(summary)
}

/// 没有任何员工时创建管理员，返回是否创建
pub fn ensure_admin(
    storage: &Storage,
    username: Option<&str>,
    password: Option<&str>,
) -> ServerResult<bool> {
    if storage.staff_count()? > 0 {
        return Ok(false);
    }

    match (username, password) {
        (Some(username), Some(password)) => {
            let account = new_account(username, None, password, StaffRole::Admin)?;
            storage.insert_staff(&account)?;
            tracing::info!(username = %username, "Initial admin account created");
            Ok(true)
        }
        _ => {
            tracing::warn!(
                "No staff accounts exist; set ADMIN_USERNAME and ADMIN_PASSWORD to create one"
            );
            Ok(false)
        }
    }
}

/// 启动时执行：导入种子文件 (若配置)，然后确保存在管理员
pub fn run(config: &Config, storage: &Storage) -> ServerResult<()> {
    if let Some(path) = &config.seed_file {
        let seed = load_seed_file(path)?;
        import_seed(storage, &seed)?;
    }
    ensure_admin(
        storage,
        config.admin_username.as_deref(),
        config.admin_password.as_deref(),
    )?;
    Ok(())
}

fn new_account(
    username: &str,
    display_name: Option<&str>,
    password: &str,
    role: StaffRole,
) -> ServerResult<StaffAccount> {
    let username = username.trim();
    if username.is_empty() {
        return Err(ServerError::Seed("staff username must not be empty".into()));
    }
    if password.len() < 8 {
        return Err(ServerError::Seed(format!(
            "password for {username} must be at least 8 characters"
        )));
    }

    let password_hash = StaffAccount::hash_password(password)
        .map_err(|e| ServerError::Seed(format!("failed to hash password: {e}")))?;

    Ok(StaffAccount {
        id: snowflake_id(),
        username: username.to_string(),
        display_name: display_name.unwrap_or(username).to_string(),
        password_hash,
        role,
        is_active: true,
        email: None,
        email_verified: false,
        created_at: now_millis(),
    })
}
