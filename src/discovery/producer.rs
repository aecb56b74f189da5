//! 生产者（nsqd 节点）定义

use std::fmt;
use serde::{Deserialize, Serialize};

/// 生产者去重键：`broadcast_address:tcp_port`
///
/// 去重判断与 channel 索引共用这一个类型，不再各自拼接字符串
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProducerKey {
    pub address: String,
    pub tcp_port: u16,
}

impl ProducerKey {
    pub fn new(address: impl Into<String>, tcp_port: u16) -> Self {
        Self {
            address: address.into(),
            tcp_port,
        }
    }
}

impl fmt::Display for ProducerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.tcp_port)
    }
}

/// 某个 topic 的一个生产者节点
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProducerRecord {
    /// 对外广播的地址（客户端用它建立连接）
    pub broadcast_address: String,

    /// 数据协议端口
    pub tcp_port: u16,

    /// HTTP 管理端口
    pub http_port: u16,

    /// 主机名（nsqlookupd 有时会带上）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    /// nsqd 连接 lookup 时的远端地址
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_address: Option<String>,

    /// nsqd 版本
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl ProducerRecord {
    /// 创建新的生产者记录
    pub fn new(broadcast_address: impl Into<String>, tcp_port: u16, http_port: u16) -> Self {
        Self {
            broadcast_address: broadcast_address.into(),
            tcp_port,
            http_port,
            hostname: None,
            remote_address: None,
            version: None,
        }
    }

    /// 设置主机名
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    /// 设置远端地址
    pub fn with_remote_address(mut self, remote_address: impl Into<String>) -> Self {
        self.remote_address = Some(remote_address.into());
        self
    }

    /// 设置版本
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// 去重键
    pub fn key(&self) -> ProducerKey {
        ProducerKey::new(self.broadcast_address.clone(), self.tcp_port)
    }

    /// TCP 连接地址 `address:tcp_port`
    pub fn tcp_address(&self) -> String {
        self.key().to_string()
    }

    /// 转换为 HTTP 管理接口 URL
    pub fn to_http_url(&self) -> String {
        format!("http://{}:{}", self.broadcast_address, self.http_port)
    }
}
