//! gRPC 拦截器模块
//!
//! 提供一元调用的拦截器契约、链式组合与负载大小追踪、日志拦截器

pub mod chain;
pub mod logging;
pub mod size;

pub use chain::{
    ClientInterceptorChain, ServerInterceptorChain, chain_unary_client_interceptors,
    chain_unary_server_interceptors,
};
pub use logging::LoggingServerInterceptor;
pub use size::{SizeTaggingClientInterceptor, SizeTaggingServerInterceptor};

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use tonic::Status;

use crate::client::{CallOptions, ChannelHandle};
use crate::context::CallContext;
use crate::payload::BoxPayload;

/// 一元调用结果
pub type UnaryResult = Result<BoxPayload, Status>;

/// 一元调用的终端处理器，也是服务端拦截器的延续
pub type UnaryHandler =
    Box<dyn FnOnce(CallContext, BoxPayload) -> BoxFuture<'static, UnaryResult> + Send>;

/// 一元调用的终端 invoker，也是客户端拦截器的延续
pub type UnaryInvoker = Box<
    dyn FnOnce(
            CallContext,
            String,
            BoxPayload,
            ChannelHandle,
            CallOptions,
        ) -> BoxFuture<'static, UnaryResult>
        + Send,
>;

/// 一元服务端调用信息
///
/// 链中每一层收到同一份调用信息，链不会修改它
#[derive(Debug, Clone)]
pub struct UnaryServerInfo {
    full_method: Arc<str>,
}

impl UnaryServerInfo {
    pub fn new(full_method: impl Into<Arc<str>>) -> Self {
        Self {
            full_method: full_method.into(),
        }
    }

    /// 完整方法名，形如 `/package.Service/Method`
    pub fn full_method(&self) -> &str {
        &self.full_method
    }
}

/// 一元服务端拦截器
///
/// 实现方围绕 `next` 延续执行自身逻辑；不调用 `next` 即短路，
/// 链中更内层的拦截器和终端处理器都不会执行
#[async_trait]
pub trait UnaryServerInterceptor: Send + Sync + 'static {
    async fn call(
        &self,
        ctx: CallContext,
        request: BoxPayload,
        info: UnaryServerInfo,
        next: UnaryHandler,
    ) -> UnaryResult;
}

/// 一元客户端拦截器
///
/// 与服务端契约相同，延续是携带方法名、连接句柄和调用选项的 invoker
#[async_trait]
pub trait UnaryClientInterceptor: Send + Sync + 'static {
    async fn call(
        &self,
        ctx: CallContext,
        method: String,
        request: BoxPayload,
        channel: ChannelHandle,
        opts: CallOptions,
        invoke: UnaryInvoker,
    ) -> UnaryResult;
}
