use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::discovery::endpoint::Endpoint;
use crate::error::{LookupError, Result};

/// lookup 地址列表，逗号分隔
pub const ENV_LOOKUP_URL: &str = "NSQLOOKUP_URL";
/// 连接超时（秒）
pub const ENV_CONNECT_TIMEOUT: &str = "NSQLOOKUP_CONNECT_TIMEOUT";
/// 总超时（秒）
pub const ENV_RESPONSE_TIMEOUT: &str = "NSQLOOKUP_RESPONSE_TIMEOUT";
pub const ENV_USER_AGENT: &str = "NSQLOOKUP_USER_AGENT";
/// sequential / concurrent
pub const ENV_QUERY_MODE: &str = "NSQLOOKUP_QUERY_MODE";

const DEFAULT_ENV_LOOKUP_URL: &str = "127.0.0.1:4161";

/// 多个 lookup 节点的查询方式
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum QueryMode {
    /// 按列表顺序逐个查询，遇到失败立即中止
    #[default]
    Sequential,
    /// 同时查询所有节点，按列表顺序合并
    Concurrent,
}

impl FromStr for QueryMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sequential" | "serial" => Ok(QueryMode::Sequential),
            "concurrent" | "parallel" | "fan_out" | "fan-out" => Ok(QueryMode::Concurrent),
            _ => Err(format!("Unknown query mode: {}", s)),
        }
    }
}

/// lookup 客户端配置
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LookupConfig {
    /// `host:port` 列表，为空时使用 `localhost:4161`
    pub hosts: Vec<String>,
    pub connect_timeout_secs: f64,
    pub response_timeout_secs: f64,
    pub user_agent: String,
    pub query_mode: QueryMode,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            hosts: Vec::new(),
            connect_timeout_secs: 1.0,
            response_timeout_secs: 2.0,
            user_agent: default_user_agent(),
            query_mode: QueryMode::Sequential,
        }
    }
}

fn default_user_agent() -> String {
    format!("nsq-lookup/{}", env!("CARGO_PKG_VERSION"))
}

impl LookupConfig {
    pub fn with_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hosts = hosts.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timeouts(mut self, connect_secs: f64, response_secs: f64) -> Self {
        self.connect_timeout_secs = connect_secs;
        self.response_timeout_secs = response_secs;
        self
    }

    pub fn with_query_mode(mut self, mode: QueryMode) -> Self {
        self.query_mode = mode;
        self
    }

    /// 解析 lookup 地址列表，空白项忽略；结果为空时回退到 `localhost:4161`
    pub fn endpoints(&self) -> Result<Vec<Endpoint>> {
        let endpoints = self
            .hosts
            .iter()
            .map(|h| h.trim())
            .filter(|h| !h.is_empty())
            .map(Endpoint::from_str)
            .collect::<Result<Vec<_>>>()?;
        Ok(Endpoint::or_default(endpoints))
    }

    pub fn connect_timeout(&self) -> Result<Duration> {
        secs_to_duration("connect_timeout_secs", self.connect_timeout_secs)
    }

    pub fn response_timeout(&self) -> Result<Duration> {
        secs_to_duration("response_timeout_secs", self.response_timeout_secs)
    }

    /// 从环境变量加载
    ///
    /// `NSQLOOKUP_URL` 未设置时为 `127.0.0.1:4161`
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源加载，键名同 [`LookupConfig::from_env`]
    pub fn from_vars<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let urls = get(ENV_LOOKUP_URL).unwrap_or_else(|| DEFAULT_ENV_LOOKUP_URL.to_string());
        config.hosts = urls
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        if let Some(v) = get(ENV_CONNECT_TIMEOUT) {
            config.connect_timeout_secs = parse_secs(ENV_CONNECT_TIMEOUT, &v)?;
        }
        if let Some(v) = get(ENV_RESPONSE_TIMEOUT) {
            config.response_timeout_secs = parse_secs(ENV_RESPONSE_TIMEOUT, &v)?;
        }
        if let Some(v) = get(ENV_USER_AGENT).filter(|v| !v.trim().is_empty()) {
            config.user_agent = v;
        }
        if let Some(v) = get(ENV_QUERY_MODE) {
            config.query_mode = v.parse().map_err(LookupError::InvalidConfig)?;
        }

        Ok(config)
    }

    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: LookupConfig = toml::from_str(&content)?;
        Ok(config)
    }
}

fn parse_secs(name: &str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|e| LookupError::InvalidConfig(format!("{}={:?}: {}", name, value, e)))
}

fn secs_to_duration(name: &str, secs: f64) -> Result<Duration> {
    if !secs.is_finite() || secs <= 0.0 {
        return Err(LookupError::InvalidConfig(format!(
            "{} must be a positive number of seconds, got {}",
            name, secs
        )));
    }
    Duration::try_from_secs_f64(secs)
        .map_err(|e| LookupError::InvalidConfig(format!("{}: {}", name, e)))
}
