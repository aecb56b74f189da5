//! 一次 resolve 调用的结果

use std::collections::HashMap;

use crate::discovery::producer::{ProducerKey, ProducerRecord};

/// resolve 结果：去重后的 producer 列表（按首次出现顺序）及各 producer 的 channel 列表
///
/// 每次调用都重新构建，调用之间不共享任何状态
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionResult {
    producers: Vec<ProducerRecord>,
    channels: HashMap<ProducerKey, Vec<String>>,
}

impl ResolutionResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// 合并一个 producer
    ///
    /// 已存在相同键时忽略（先报告的 lookup 节点拥有其 channel 列表），返回是否为新 producer
    pub fn insert(&mut self, producer: ProducerRecord, channels: &[String]) -> bool {
        let key = producer.key();
        if self.channels.contains_key(&key) {
            return false;
        }
        self.channels.insert(key, channels.to_vec());
        self.producers.push(producer);
        true
    }

    /// 是否已包含某个 producer
    pub fn contains(&self, key: &ProducerKey) -> bool {
        self.channels.contains_key(key)
    }

    /// 去重后的 producer 列表
    pub fn producers(&self) -> &[ProducerRecord] {
        &self.producers
    }

    /// 某个 producer 的 channel 列表
    pub fn channels(&self, key: &ProducerKey) -> Option<&[String]> {
        self.channels.get(key).map(Vec::as_slice)
    }

    pub fn channels_for(&self, producer: &ProducerRecord) -> Option<&[String]> {
        self.channels(&producer.key())
    }

    /// 所有 producer 的 TCP 地址，供上层建立连接
    pub fn tcp_addresses(&self) -> Vec<String> {
        self.producers.iter().map(ProducerRecord::tcp_address).collect()
    }

    pub fn len(&self) -> usize {
        self.producers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.producers.is_empty()
    }

    /// 拆分为 producer 列表和 channel 映射
    pub fn into_parts(self) -> (Vec<ProducerRecord>, HashMap<ProducerKey, Vec<String>>) {
        (self.producers, self.channels)
    }
}
