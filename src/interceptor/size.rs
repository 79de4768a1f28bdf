//! 负载大小追踪拦截器
//!
//! 围绕下一级调用，将请求/响应的序列化字节数写入追踪 span 的 tag 并输出
//! 日志。纯旁路观测：不修改请求、响应和错误，也不产生新的调用失败。
//! 上下文未携带 span 时跳过全部打点，调用照常执行。

use async_trait::async_trait;
use tracing::{info, warn};

use super::{
    UnaryClientInterceptor, UnaryHandler, UnaryInvoker, UnaryResult, UnaryServerInfo,
    UnaryServerInterceptor,
};
use crate::client::{CallOptions, ChannelHandle};
use crate::context::CallContext;
use crate::payload::BoxPayload;
use crate::span::{
    REQUEST_SIZE_TAG, RESPONSE_SIZE_TAG, SIZE_UNAVAILABLE, SIZE_UNKNOWN, TagValue,
};

/// 服务端负载大小追踪拦截器
///
/// 大小不可计算时写入哨兵值 `-1` 并输出警告日志
#[derive(Debug, Clone, Default)]
pub struct SizeTaggingServerInterceptor;

impl SizeTaggingServerInterceptor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl UnaryServerInterceptor for SizeTaggingServerInterceptor {
    async fn call(
        &self,
        ctx: CallContext,
        request: BoxPayload,
        info: UnaryServerInfo,
        next: UnaryHandler,
    ) -> UnaryResult {
        let span = ctx.span();

        if let Some(span) = &span {
            match request.encoded_size() {
                Some(size) => {
                    span.set_tag(REQUEST_SIZE_TAG, TagValue::Int(size as i64));
                    info!("Request size for {}: {} bytes", info.full_method(), size);
                }
                None => {
                    warn!(
                        "Request payload for {} does not expose a serialized size",
                        info.full_method()
                    );
                    span.set_tag(REQUEST_SIZE_TAG, TagValue::Int(SIZE_UNAVAILABLE));
                }
            }
        }

        let result = next(ctx, request).await;

        // 调用出错时不打响应大小，错误本身已经说明了调用结果
        if let Some(span) = &span {
            if let Ok(response) = &result {
                match response.encoded_size() {
                    Some(size) => {
                        span.set_tag(RESPONSE_SIZE_TAG, TagValue::Int(size as i64));
                        info!("Response size for {}: {} bytes", info.full_method(), size);
                    }
                    None => {
                        warn!(
                            "Response payload for {} does not expose a serialized size",
                            info.full_method()
                        );
                        span.set_tag(RESPONSE_SIZE_TAG, TagValue::Int(SIZE_UNAVAILABLE));
                    }
                }
            }
        }

        result
    }
}

/// 客户端负载大小追踪拦截器
///
/// 大小不可计算时写入哨兵值 `"unknown"`，与服务端的 `-1` 不一致，
/// 保留既有线上行为
#[derive(Debug, Clone, Default)]
pub struct SizeTaggingClientInterceptor;

impl SizeTaggingClientInterceptor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl UnaryClientInterceptor for SizeTaggingClientInterceptor {
    async fn call(
        &self,
        ctx: CallContext,
        method: String,
        request: BoxPayload,
        channel: ChannelHandle,
        opts: CallOptions,
        invoke: UnaryInvoker,
    ) -> UnaryResult {
        let span = ctx.span();

        if let Some(span) = &span {
            match request.encoded_size() {
                Some(size) => {
                    span.set_tag(REQUEST_SIZE_TAG, TagValue::Int(size as i64));
                    info!("Request size for {}: {} bytes", method, size);
                }
                None => {
                    warn!(
                        "Request payload for {} does not expose a serialized size",
                        method
                    );
                    span.set_tag(REQUEST_SIZE_TAG, TagValue::Str(SIZE_UNKNOWN.to_string()));
                }
            }
        }

        let result = invoke(ctx, method.clone(), request, channel, opts).await;

        if let Some(span) = &span {
            if let Ok(response) = &result {
                match response.encoded_size() {
                    Some(size) => {
                        span.set_tag(RESPONSE_SIZE_TAG, TagValue::Int(size as i64));
                        info!("Response size for {}: {} bytes", method, size);
                    }
                    None => {
                        warn!(
                            "Response payload for {} does not expose a serialized size",
                            method
                        );
                        span.set_tag(RESPONSE_SIZE_TAG, TagValue::Str(SIZE_UNKNOWN.to_string()));
                    }
                }
            }
        }

        result
    }
}
