//! 调用上下文
//!
//! 单次 RPC 调用范围内的上下文，携带可选的追踪 span、截止时间和调用元数据。
//! 拦截器链只透传上下文，不会修改它。

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::span::TraceSpan;

/// 调用上下文
#[derive(Clone, Default)]
pub struct CallContext {
    span: Option<Arc<dyn TraceSpan>>,
    deadline: Option<Instant>,
    metadata: HashMap<String, String>,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// 绑定追踪 span
    pub fn with_span(mut self, span: Arc<dyn TraceSpan>) -> Self {
        self.span = Some(span);
        self
    }

    /// 设置调用截止时间
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// 写入调用元数据
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// 当前调用的追踪 span，未绑定时返回 None
    pub fn span(&self) -> Option<Arc<dyn TraceSpan>> {
        self.span.clone()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// 距截止时间的剩余时长，已超时返回 None
    pub fn remaining_time(&self) -> Option<Duration> {
        self.deadline
            .and_then(|deadline| deadline.checked_duration_since(Instant::now()))
    }

    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(|v| v.as_str())
    }
}

/// 追踪信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceInfo {
    pub trace_id: String,
    pub request_id: String,
}

/// 从调用上下文提取追踪信息
pub fn extract_trace_info(ctx: &CallContext) -> Option<TraceInfo> {
    let trace_id = ctx.metadata("x-trace-id").unwrap_or("").to_string();
    let request_id = ctx.metadata("x-request-id").unwrap_or("").to_string();

    if trace_id.is_empty() && request_id.is_empty() {
        return None;
    }

    Some(TraceInfo {
        trace_id,
        request_id,
    })
}
