//! 追踪 span 抽象
//!
//! span 由外部追踪库创建和管理，本模块只从上下文读取句柄并写入 tag

/// 请求大小 tag 键
pub const REQUEST_SIZE_TAG: &str = "grpc.request.size";

/// 响应大小 tag 键
pub const RESPONSE_SIZE_TAG: &str = "grpc.response.size";

/// 服务端大小不可用时的哨兵值
pub const SIZE_UNAVAILABLE: i64 = -1;

/// 客户端大小不可用时的哨兵值
///
/// 与服务端的 `-1` 不一致，保留既有线上行为
pub const SIZE_UNKNOWN: &str = "unknown";

/// span tag 值
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    Int(i64),
    Str(String),
}

impl From<i64> for TagValue {
    fn from(value: i64) -> Self {
        TagValue::Int(value)
    }
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        TagValue::Str(value.to_string())
    }
}

impl From<String> for TagValue {
    fn from(value: String) -> Self {
        TagValue::Str(value)
    }
}

/// 追踪 span 句柄
///
/// tag 写入需要线程安全，跨调用并发写入由追踪库保证
pub trait TraceSpan: Send + Sync {
    fn set_tag(&self, key: &str, value: TagValue);
}

#[cfg(feature = "telemetry")]
mod otel {
    use std::sync::Mutex;

    use opentelemetry::KeyValue;
    use opentelemetry::trace::Span;

    use super::{TagValue, TraceSpan};

    /// OpenTelemetry span 适配器
    ///
    /// OpenTelemetry 的 `set_attribute` 需要可变引用，内部用互斥锁包装
    pub struct OtelSpan<S> {
        inner: Mutex<S>,
    }

    impl<S> OtelSpan<S>
    where
        S: Span + Send,
    {
        pub fn new(span: S) -> Self {
            Self {
                inner: Mutex::new(span),
            }
        }
    }

    impl<S> TraceSpan for OtelSpan<S>
    where
        S: Span + Send,
    {
        fn set_tag(&self, key: &str, value: TagValue) {
            let attribute = match value {
                TagValue::Int(v) => KeyValue::new(key.to_string(), v),
                TagValue::Str(v) => KeyValue::new(key.to_string(), v),
            };
            if let Ok(mut span) = self.inner.lock() {
                span.set_attribute(attribute);
            }
        }
    }
}

#[cfg(feature = "telemetry")]
pub use otel::OtelSpan;
