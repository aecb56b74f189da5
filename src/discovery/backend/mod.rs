//! lookup 传输层抽象和实现

pub mod http;

use async_trait::async_trait;
use reqwest::Url;

use crate::error::BackendError;

pub use http::HttpBackend;

/// 一次 HTTP 查询的原始结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupReply {
    pub status: u16,
    pub body: String,
}

impl LookupReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// lookup 传输后端 trait
///
/// 只负责发请求、收响应；状态码分类和结果合并由 resolver 完成。
/// 连接失败、超时、读取响应体失败都应返回 `Err`。
/// 注意：由于需要动态分发（dyn），使用 async-trait
#[async_trait]
pub trait LookupBackend: Send + Sync {
    /// 对给定 URL 发起 GET 请求
    async fn get(&self, url: &Url) -> Result<LookupReply, BackendError>;
}
