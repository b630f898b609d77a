use std::sync::Arc;
use std::time::{Duration, Instant};

use shared::models::VenueInfo;

use crate::auth::{JwtService, LoginRateLimiter};
use crate::core::{BackgroundTasks, Config, ServerResult, bootstrap};
use crate::db::Storage;
use crate::orders::OrdersManager;
use crate::session::SessionManager;

/// 会话维护间隔 (限流表清理、过期会话删除)
const SESSION_MAINTENANCE_PERIOD: Duration = Duration::from_secs(5 * 60);

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，作为 axum 的 `State` 在每个请求中克隆。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Arc<Config> | 配置项 (不可变) |
/// | storage | Storage | 嵌入式数据库 (redb) |
/// | sessions | Arc<SessionManager> | 员工登录与令牌 |
/// | orders | Arc<OrdersManager> | 订单生命周期 |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub storage: Storage,
    pub sessions: Arc<SessionManager>,
    pub orders: Arc<OrdersManager>,
    /// 启动时间 (健康检查的 uptime)
    pub started_at: Instant,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序：
    /// 1. 打开数据库 (work_dir/database/cafe.redb)
    /// 2. 构建会话与订单服务
    /// 3. 导入种子数据、创建首个管理员
    pub fn initialize(config: &Config) -> ServerResult<Self> {
        if config.venue.geofence().is_none() {
            tracing::warn!("Venue geofence is not configured; customer devices will be blocked");
        }
        let storage = Storage::open(config.database_path())?;
        tracing::info!(path = %config.database_path().display(), "Database opened");
        Self::with_storage(config.clone(), storage)
    }

    /// 使用已打开的存储构建状态 (测试使用内存数据库)
    pub fn with_storage(config: Config, storage: Storage) -> ServerResult<Self> {
        let jwt = Arc::new(JwtService::with_config(config.jwt.clone()));
        let limiter = LoginRateLimiter::new(
            config.login_max_failures,
            Duration::from_secs(config.login_window_secs),
        );
        let sessions = SessionManager::new(
            storage.clone(),
            jwt,
            limiter,
            config.session_policy(),
        );
        let orders = OrdersManager::new(storage.clone(), config.order_policy());

        bootstrap::run(&config, &storage)?;

        Ok(Self {
            config: Arc::new(config),
            storage,
            sessions: Arc::new(sessions),
            orders: Arc::new(orders),
            started_at: Instant::now(),
        })
    }

    /// 公开的店铺与地理围栏配置
    pub fn venue_info(&self) -> &VenueInfo {
        &self.config.venue
    }

    /// 启动后台任务
    ///
    /// - session_maintenance: 清理过期的限流条目与会话
    pub fn start_background_tasks(&self) -> BackgroundTasks {
        let mut tasks = BackgroundTasks::new();

        let sessions = self.sessions.clone();
        tasks.spawn_periodic("session_maintenance", SESSION_MAINTENANCE_PERIOD, move || {
            let released = sessions.limiter().cleanup();
            match sessions.purge_expired() {
                Ok(purged) if purged > 0 || released > 0 => {
                    tracing::info!(purged, released, "Session maintenance completed");
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = %e, "Failed to purge expired sessions"),
            }
        });

        tasks.log_summary();
        tasks
    }
}
