//! topic 服务发现模块
//!
//! 向一个或多个 nsqlookupd 查询某个 topic 的 producer，合并、去重后交给上层建立连接。

pub mod backend;
pub mod endpoint;
pub mod event;
pub mod producer;
pub mod resolver;
pub mod response;
pub mod result;

pub use backend::{HttpBackend, LookupBackend, LookupReply};
pub use endpoint::{DEFAULT_LOOKUP_HOST, DEFAULT_LOOKUP_PORT, Endpoint};
pub use event::{LookupEvent, LookupObserver, LookupOutcome, TracingObserver};
pub use producer::{ProducerKey, ProducerRecord};
pub use resolver::LookupResolver;
pub use response::{LookupResponse, ResponseShape};
pub use result::ResolutionResult;
