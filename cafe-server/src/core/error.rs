use thiserror::Error;

use crate::auth::JwtError;
use crate::db::StorageError;

/// 启动与运行期错误 (请求级错误使用 `shared::AppError`)
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("存储错误: {0}")]
    Storage(#[from] StorageError),

    #[error("种子数据错误: {0}")]
    Seed(String),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}

impl From<JwtError> for ServerError {
    fn from(err: JwtError) -> Self {
        ServerError::Config(err.to_string())
    }
}

pub type ServerResult<T> = std::result::Result<T, ServerError>;
