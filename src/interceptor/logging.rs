//! 日志拦截器

use std::time::Instant;

use async_trait::async_trait;
use tracing::{error, info};

use super::{UnaryHandler, UnaryResult, UnaryServerInfo, UnaryServerInterceptor};
use crate::context::{CallContext, extract_trace_info};
use crate::payload::BoxPayload;

/// 服务端日志拦截器
///
/// 记录请求开始、调用结果和耗时；上下文携带追踪信息时一并输出
#[derive(Debug, Clone, Default)]
pub struct LoggingServerInterceptor;

impl LoggingServerInterceptor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl UnaryServerInterceptor for LoggingServerInterceptor {
    async fn call(
        &self,
        ctx: CallContext,
        request: BoxPayload,
        info: UnaryServerInfo,
        next: UnaryHandler,
    ) -> UnaryResult {
        let start = Instant::now();

        match extract_trace_info(&ctx) {
            Some(trace_info) => {
                info!(
                    trace_id = %trace_info.trace_id,
                    request_id = %trace_info.request_id,
                    "Processing gRPC request: {}",
                    info.full_method()
                );
            }
            None => {
                info!("Processing gRPC request: {}", info.full_method());
            }
        }

        let result = next(ctx, request).await;

        let elapsed = start.elapsed();
        match &result {
            Ok(_) => {
                info!(
                    "gRPC request {} completed in {:?}",
                    info.full_method(),
                    elapsed
                );
            }
            Err(status) => {
                error!(
                    "gRPC request {} failed: {} ({:?})",
                    info.full_method(),
                    status,
                    elapsed
                );
            }
        }

        result
    }
}
