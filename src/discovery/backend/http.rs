//! 基于 reqwest 的 HTTP 后端

use async_trait::async_trait;
use reqwest::{Client as HttpClient, Url, redirect};

use crate::config::LookupConfig;
use crate::discovery::backend::{LookupBackend, LookupReply};
use crate::error::{BackendError, Result};

/// HTTP lookup 后端
///
/// 客户端只构建一次，内部连接池可在多个并发的 resolve 调用之间共享
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http_client: HttpClient,
}

impl HttpBackend {
    /// 按配置创建
    ///
    /// - 连接超时：`connect_timeout_secs`
    /// - 总超时：`response_timeout_secs`
    /// - 不跟随重定向
    /// - User-Agent：`user_agent`
    pub fn new(config: &LookupConfig) -> Result<Self> {
        let http_client = HttpClient::builder()
            .connect_timeout(config.connect_timeout()?)
            .timeout(config.response_timeout()?)
            .redirect(redirect::Policy::none())
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { http_client })
    }

    /// 使用已有的 reqwest 客户端
    pub fn from_client(http_client: HttpClient) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl LookupBackend for HttpBackend {
    async fn get(&self, url: &Url) -> std::result::Result<LookupReply, BackendError> {
        let resp = self.http_client.get(url.clone()).send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        Ok(LookupReply { status, body })
    }
}
