//! 查询错误类型
//!
//! 区分三类情况：
//! - 参数/配置错误（调用前即可发现）
//! - LookupFailure：单个 lookup 节点返回非 200/404 或网络层失败，整个调用中止
//! - 配置文件读取与解析错误

use std::io;
use thiserror::Error;

use crate::discovery::endpoint::Endpoint;

/// 后端（传输层）错误
///
/// 与后端 trait 保持一致，使用装箱的动态错误，方便替换传输实现
pub type BackendError = Box<dyn std::error::Error + Send + Sync>;

/// lookup 查询错误
#[derive(Error, Debug)]
pub enum LookupError {
    /// topic 为空
    #[error("topic must not be empty")]
    EmptyTopic,

    /// 无法解析的 lookup 地址
    #[error("invalid lookup endpoint `{input}`: {reason}")]
    InvalidEndpoint { input: String, reason: String },

    /// 配置非法（如超时为负数）
    #[error("invalid lookup configuration: {0}")]
    InvalidConfig(String),

    /// lookup 节点返回了非 200 / 非 404 的状态码
    #[error("lookup at {endpoint} returned status {status}: {body}")]
    Status {
        endpoint: Endpoint,
        status: u16,
        body: String,
    },

    /// 连接失败、超时或读取响应体失败
    #[error("lookup request to {endpoint} failed: {source}")]
    Transport {
        endpoint: Endpoint,
        #[source]
        source: BackendError,
    },

    /// HTTP 客户端构建失败
    #[error("failed to build lookup http client: {0}")]
    Client(#[from] reqwest::Error),

    /// 配置文件读取失败
    #[error("failed to read lookup config: {0}")]
    Io(#[from] io::Error),

    /// 配置文件解析失败
    #[error("failed to parse lookup config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl LookupError {
    /// 创建地址解析错误
    pub fn invalid_endpoint(input: impl Into<String>, reason: impl Into<String>) -> Self {
        LookupError::InvalidEndpoint {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// 是否为 LookupFailure（某个 lookup 节点查询失败导致整个调用中止）
    pub fn is_lookup_failure(&self) -> bool {
        matches!(self, LookupError::Status { .. } | LookupError::Transport { .. })
    }

    /// 判断调用方是否值得稍后重试
    ///
    /// 网络错误和 5xx 视为暂时不可用；4xx 与配置错误重试也无济于事
    pub fn is_retryable(&self) -> bool {
        match self {
            LookupError::Transport { .. } => true,
            LookupError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// 出错的 lookup 节点（仅 LookupFailure 有）
    pub fn endpoint(&self) -> Option<&Endpoint> {
        match self {
            LookupError::Status { endpoint, .. } | LookupError::Transport { endpoint, .. } => {
                Some(endpoint)
            }
            _ => None,
        }
    }
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, LookupError>;
