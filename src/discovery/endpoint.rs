//! lookup 服务地址

use std::fmt;
use std::str::FromStr;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::{LookupError, Result};

/// 未配置任何地址时使用的 lookup 主机
pub const DEFAULT_LOOKUP_HOST: &str = "localhost";

/// nsqlookupd 默认 HTTP 端口
pub const DEFAULT_LOOKUP_PORT: u16 = 4161;

/// 一个 lookup 服务实例的地址（host + port）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    /// 主机名或 IP（IPv6 不带方括号）
    pub host: String,

    /// HTTP 端口
    pub port: u16,
}

impl Endpoint {
    /// 创建新的地址
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// 构建查询 URL：`http://{host}:{port}/lookup?topic={topic}`
    ///
    /// topic 按 form-urlencoded 规则编码（空格编码为 `+`）
    pub fn lookup_url(&self, topic: &str) -> Result<Url> {
        let base = format!("http://{}/lookup", self);
        Url::parse_with_params(&base, &[("topic", topic)])
            .map_err(|e| LookupError::invalid_endpoint(self.to_string(), e.to_string()))
    }

    /// 空列表时回退到 `localhost:4161`
    pub fn or_default(endpoints: Vec<Endpoint>) -> Vec<Endpoint> {
        if endpoints.is_empty() {
            vec![Endpoint::default()]
        } else {
            endpoints
        }
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::new(DEFAULT_LOOKUP_HOST, DEFAULT_LOOKUP_PORT)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// 支持的格式：
/// - `host:port`
/// - `host`（使用默认端口 4161）
/// - `http://host:port`（前缀与末尾的 `/` 会被去掉）
/// - `[::1]:4161` / `[::1]`
impl FromStr for Endpoint {
    type Err = LookupError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let input = s.trim();
        let addr = input.strip_prefix("http://").unwrap_or(input);
        let addr = addr.trim_end_matches('/');

        if addr.is_empty() {
            return Err(LookupError::invalid_endpoint(s, "empty address"));
        }

        let (host, port) = if let Some(rest) = addr.strip_prefix('[') {
            let (host, tail) = rest
                .split_once(']')
                .ok_or_else(|| LookupError::invalid_endpoint(s, "missing closing `]`"))?;
            let port = match tail {
                "" => None,
                tail => Some(tail.strip_prefix(':').ok_or_else(|| {
                    LookupError::invalid_endpoint(s, "unexpected characters after `]`")
                })?),
            };
            (host, port)
        } else {
            match addr.rsplit_once(':') {
                Some((host, _)) if host.contains(':') => {
                    return Err(LookupError::invalid_endpoint(
                        s,
                        "IPv6 addresses must be written as [addr]:port",
                    ));
                }
                Some((host, port)) => (host, Some(port)),
                None => (addr, None),
            }
        };

        if host.is_empty() {
            return Err(LookupError::invalid_endpoint(s, "empty host"));
        }

        let port = match port {
            None => DEFAULT_LOOKUP_PORT,
            Some(p) => match p.parse::<u16>() {
                Ok(0) => return Err(LookupError::invalid_endpoint(s, "port must not be 0")),
                Ok(port) => port,
                Err(e) => return Err(LookupError::invalid_endpoint(s, format!("bad port: {}", e))),
            },
        };

        Ok(Endpoint::new(host, port))
    }
}
