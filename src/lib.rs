//! Vesta gRPC Middleware Library
//!
//! Provides interceptor chaining and payload size tracing for unary gRPC calls,
//! including call context, span tagging, and logging interceptors.

pub mod client;
pub mod context;
pub mod error;
pub mod payload;
pub mod span;

// gRPC 拦截器模块
pub mod interceptor;

// Re-exports
pub use client::{CallOptions, ChannelHandle};
pub use context::{CallContext, TraceInfo, extract_trace_info};
pub use error::InterceptorError;
pub use payload::{BoxPayload, OpaquePayload, Payload, ProtoPayload};
pub use span::{
    REQUEST_SIZE_TAG, RESPONSE_SIZE_TAG, SIZE_UNAVAILABLE, SIZE_UNKNOWN, TagValue, TraceSpan,
};

// 拦截器相关 re-exports
pub use interceptor::{
    ClientInterceptorChain, LoggingServerInterceptor, ServerInterceptorChain,
    SizeTaggingClientInterceptor, SizeTaggingServerInterceptor, UnaryClientInterceptor,
    UnaryHandler, UnaryInvoker, UnaryResult, UnaryServerInfo, UnaryServerInterceptor,
    chain_unary_client_interceptors, chain_unary_server_interceptors,
};

// OpenTelemetry 适配器（可选）
#[cfg(feature = "telemetry")]
pub use span::OtelSpan;
