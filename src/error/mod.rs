//! 错误处理模块

pub mod lookup_error;

pub use lookup_error::{BackendError, LookupError, Result};
