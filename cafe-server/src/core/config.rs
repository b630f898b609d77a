use std::net::IpAddr;
use std::path::PathBuf;

use chrono::NaiveTime;
use chrono_tz::Tz;
use shared::geo::Coordinate;
use shared::models::VenueInfo;

use crate::auth::JwtConfig;
use crate::core::ServerResult;
use crate::orders::OrderPolicy;
use crate::session::SessionPolicy;
use crate::utils::time::{parse_cutoff, parse_timezone};

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (数据库、日志) |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_JSON | false | JSON 格式日志 |
/// | JWT_SECRET | (开发环境自动生成) | 至少 32 字符 |
/// | JWT_ISSUER / JWT_AUDIENCE | cafe-server / cafe-staff | 令牌签发者/受众 |
/// | ACCESS_TOKEN_TTL_MINUTES | 15 | 访问令牌有效期 |
/// | REFRESH_TOKEN_TTL_DAYS | 7 | 刷新令牌有效期 |
/// | LOGIN_MAX_FAILURES | 10 | 窗口内允许的登录失败次数 |
/// | LOGIN_WINDOW_SECS | 900 | 登录限流窗口 |
/// | LOGIN_FIXED_DELAY_MS | 500 | 登录应答固定延迟 |
/// | REQUIRE_VERIFIED_EMAIL | false | 登录要求邮箱已验证 |
/// | TRUSTED_PROXIES | (无) | 可信反向代理 IP，逗号分隔 |
/// | VENUE_NAME | Cafe | 店名 |
/// | VENUE_LAT / VENUE_LNG | (未配置) | 地理围栏中心 |
/// | VENUE_RADIUS_M | (未配置) | 地理围栏半径 (米) |
/// | BUSINESS_TZ | UTC | 业务时区 |
/// | BUSINESS_DAY_CUTOFF | 00:00 | 营业日分界 |
/// | CUSTOMER_LOOKUP_HOURS | 12 | 顾客订单查询窗口 |
/// | SEED_FILE | (无) | 种子数据 JSON |
/// | ADMIN_USERNAME / ADMIN_PASSWORD | (无) | 首次启动时创建的管理员 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/var/lib/cafe HTTP_PORT=8080 VENUE_LAT=41.38 VENUE_LNG=2.17 VENUE_RADIUS_M=60 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库和日志
    pub work_dir: String,
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_json: bool,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    pub refresh_token_ttl_days: i64,
    pub login_max_failures: u32,
    pub login_window_secs: u64,
    pub login_fixed_delay_ms: u64,
    pub require_verified_email: bool,
    /// 允许设置 X-Forwarded-For 的对端地址
    pub trusted_proxies: Vec<IpAddr>,
    /// 公开的店铺与地理围栏配置
    pub venue: VenueInfo,
    pub business_tz: Tz,
    pub business_day_cutoff: NaiveTime,
    pub customer_lookup_hours: i64,
    pub seed_file: Option<String>,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// 解析逗号分隔的 IP 列表，无效项记录警告后跳过
fn parse_ip_list(list: &str) -> Vec<IpAddr> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| match entry.parse() {
            Ok(ip) => Some(ip),
            Err(_) => {
                tracing::warn!(entry, "Ignoring invalid TRUSTED_PROXIES entry");
                None
            }
        })
        .collect()
}

impl Config {
    /// 默认配置，不读取环境变量
    pub fn new(work_dir: impl Into<String>, jwt: JwtConfig) -> Self {
        Self {
            work_dir: work_dir.into(),
            http_port: 3000,
            environment: "development".into(),
            log_level: "info".into(),
            log_json: false,
            jwt,
            refresh_token_ttl_days: 7,
            login_max_failures: 10,
            login_window_secs: 900,
            login_fixed_delay_ms: 500,
            require_verified_email: false,
            trusted_proxies: Vec::new(),
            venue: VenueInfo {
                name: "Cafe".into(),
                center: None,
                radius_m: None,
            },
            business_tz: Tz::UTC,
            business_day_cutoff: NaiveTime::MIN,
            customer_lookup_hours: 12,
            seed_file: None,
            admin_username: None,
            admin_password: None,
        }
    }

    /// 从环境变量加载配置
    ///
    /// 未设置的项使用默认值；`JWT_SECRET` 在生产构建中必须设置。
    pub fn from_env() -> ServerResult<Self> {
        let work_dir = env_string("WORK_DIR").unwrap_or_else(|| "./data".into());
        let mut config = Self::new(work_dir, JwtConfig::from_env()?);

        if let Some(port) = env_parse("HTTP_PORT") {
            config.http_port = port;
        }
        if let Some(env) = env_string("ENVIRONMENT") {
            config.environment = env;
        }
        if let Some(level) = env_string("LOG_LEVEL") {
            config.log_level = level;
        }
        config.log_json = env_parse("LOG_JSON").unwrap_or(false);

        if let Some(days) = env_parse("REFRESH_TOKEN_TTL_DAYS") {
            config.refresh_token_ttl_days = days;
        }
        if let Some(max) = env_parse("LOGIN_MAX_FAILURES") {
            config.login_max_failures = max;
        }
        if let Some(secs) = env_parse("LOGIN_WINDOW_SECS") {
            config.login_window_secs = secs;
        }
        if let Some(ms) = env_parse("LOGIN_FIXED_DELAY_MS") {
            config.login_fixed_delay_ms = ms;
        }
        config.require_verified_email = env_parse("REQUIRE_VERIFIED_EMAIL").unwrap_or(false);
        if let Some(list) = env_string("TRUSTED_PROXIES") {
            config.trusted_proxies = parse_ip_list(&list);
        }

        if let Some(name) = env_string("VENUE_NAME") {
            config.venue.name = name;
        }
        config.venue.center = match (env_parse::<f64>("VENUE_LAT"), env_parse::<f64>("VENUE_LNG")) {
            (Some(lat), Some(lng)) => Some(Coordinate::new(lat, lng)),
            _ => None,
        };
        config.venue.radius_m = env_parse("VENUE_RADIUS_M");

        if let Some(tz) = env_string("BUSINESS_TZ") {
            config.business_tz = parse_timezone(&tz);
        }
        if let Some(cutoff) = env_string("BUSINESS_DAY_CUTOFF") {
            config.business_day_cutoff = parse_cutoff(&cutoff);
        }
        if let Some(hours) = env_parse("CUSTOMER_LOOKUP_HOURS") {
            config.customer_lookup_hours = hours;
        }

        config.seed_file = env_string("SEED_FILE");
        config.admin_username = env_string("ADMIN_USERNAME");
        config.admin_password = env_string("ADMIN_PASSWORD");

        Ok(config)
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(mut self, work_dir: impl Into<String>, http_port: u16) -> Self {
        self.work_dir = work_dir.into();
        self.http_port = http_port;
        self
    }

    /// 数据库文件路径: `{work_dir}/database/cafe.redb`
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database").join("cafe.redb")
    }

    /// 日志目录: `{work_dir}/logs`
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    pub fn session_policy(&self) -> SessionPolicy {
        SessionPolicy {
            refresh_ttl: chrono::Duration::days(self.refresh_token_ttl_days),
            login_fixed_delay: std::time::Duration::from_millis(self.login_fixed_delay_ms),
            require_verified_email: self.require_verified_email,
        }
    }

    pub fn order_policy(&self) -> OrderPolicy {
        OrderPolicy {
            tz: self.business_tz,
            business_day_cutoff: self.business_day_cutoff,
            customer_lookup: chrono::Duration::hours(self.customer_lookup_hours),
        }
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
