//! lookup 响应体解析
//!
//! nsqlookupd 存在两种响应格式：
//! - 旧版（0.3.x）：`{"status_code":200,"data":{"producers":[...],"channels":[...]}}`
//! - 新版（>= 1.0）：`{"producers":[...],"channels":[...]}`
//!
//! producers 与 channels 各自按 `data.xxx` → `xxx` → 空 的顺序取值。

use serde::Deserialize;
use serde_json::Value;

use crate::discovery::producer::ProducerRecord;

/// producers 字段的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseShape {
    /// `data.producers`
    Legacy,
    /// 顶层 `producers`
    Current,
    /// 两者都没有
    #[default]
    Empty,
}

/// 解析后的单个 lookup 节点响应
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupResponse {
    pub producers: Vec<ProducerRecord>,
    pub channels: Vec<String>,
    pub shape: ResponseShape,
    /// 字段缺失或类型不对而被丢弃的 producer 条目数
    pub skipped: usize,
}

/// 依次尝试的字段路径：先 `data.xxx`，再顶层 `xxx`
///
/// 每个字段独立回退；存在但不是数组的值视为缺失
fn lookup_array<'a>(root: &'a Value, field: &str) -> Option<(&'a Vec<Value>, ResponseShape)> {
    root.get("data")
        .and_then(|data| data.get(field))
        .and_then(Value::as_array)
        .map(|list| (list, ResponseShape::Legacy))
        .or_else(|| {
            root.get(field)
                .and_then(Value::as_array)
                .map(|list| (list, ResponseShape::Current))
        })
}

impl LookupResponse {
    /// 解析响应体
    ///
    /// 只有响应体本身不是合法 JSON 时才返回错误；结构不符合预期一律视为没有 producer
    pub fn parse(body: &str) -> Result<Self, serde_json::Error> {
        let root: Value = serde_json::from_str(body)?;
        Ok(Self::from_value(&root))
    }

    /// 从已解析的 JSON 中提取
    pub fn from_value(root: &Value) -> Self {
        let (raw_producers, shape) = match lookup_array(root, "producers") {
            Some((list, shape)) => (list.as_slice(), shape),
            None => (&[][..], ResponseShape::Empty),
        };

        let channels: Vec<String> = lookup_array(root, "channels")
            .map(|(list, _)| {
                list.iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        let total = raw_producers.len();
        let producers: Vec<ProducerRecord> = raw_producers
            .iter()
            .filter_map(|v| ProducerRecord::deserialize(v).ok())
            .collect();
        let skipped = total - producers.len();

        Self {
            producers,
            channels,
            shape,
            skipped,
        }
    }
}
