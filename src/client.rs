//! gRPC 客户端调用辅助类型
//!
//! 连接句柄和调用选项由调用方创建，在客户端拦截器链中透传给终端 invoker

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// 客户端连接句柄
///
/// 对传输层连接的不透明引用，本模块不建立连接
#[derive(Debug, Clone)]
pub struct ChannelHandle {
    target: Arc<str>,
}

impl ChannelHandle {
    pub fn new(target: impl Into<Arc<str>>) -> Self {
        Self {
            target: target.into(),
        }
    }

    /// 连接目标地址
    pub fn target(&self) -> &str {
        &self.target
    }
}

/// 调用选项
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallOptions {
    pub timeout: Option<Duration>,
    pub metadata: HashMap<String, String>,
    pub wait_for_ready: bool,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn wait_for_ready(mut self, wait: bool) -> Self {
        self.wait_for_ready = wait;
        self
    }
}
