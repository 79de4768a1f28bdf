//! 拦截器链式组合
//!
//! 将多个拦截器组合为单个拦截器：索引 0 在最外层，进入时最先执行、
//! 返回时最后执行。终端处理器/invoker 在调用时传入，同一条链可复用于
//! 不同的终端目标。

use std::sync::Arc;

use async_trait::async_trait;

use super::{
    UnaryClientInterceptor, UnaryHandler, UnaryInvoker, UnaryResult, UnaryServerInfo,
    UnaryServerInterceptor,
};
use crate::client::{CallOptions, ChannelHandle};
use crate::context::CallContext;
use crate::payload::BoxPayload;

/// 服务端拦截器链
///
/// 构建后不可变，可在并发调用间无限共享；每次调用在自身栈上
/// 构建独立的延续闭包链，调用之间没有共享可变状态
#[derive(Clone, Default)]
pub struct ServerInterceptorChain {
    interceptors: Vec<Arc<dyn UnaryServerInterceptor>>,
}

impl ServerInterceptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加拦截器，追加顺序即嵌套顺序
    pub fn with(mut self, interceptor: impl UnaryServerInterceptor) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    /// 追加共享拦截器
    pub fn with_shared(mut self, interceptor: Arc<dyn UnaryServerInterceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }
}

#[async_trait]
impl UnaryServerInterceptor for ServerInterceptorChain {
    async fn call(
        &self,
        ctx: CallContext,
        request: BoxPayload,
        info: UnaryServerInfo,
        next: UnaryHandler,
    ) -> UnaryResult {
        // 从最内层向外折叠，每一层闭包持有自己的拦截器和延续
        let mut handler = next;
        for interceptor in self.interceptors.iter().rev() {
            let interceptor = Arc::clone(interceptor);
            let info = info.clone();
            let prev = handler;
            handler = Box::new(move |ctx, request| {
                Box::pin(async move { interceptor.call(ctx, request, info, prev).await })
            });
        }
        handler(ctx, request).await
    }
}

/// 将多个服务端拦截器组合为单个拦截器
pub fn chain_unary_server_interceptors(
    interceptors: Vec<Arc<dyn UnaryServerInterceptor>>,
) -> ServerInterceptorChain {
    ServerInterceptorChain { interceptors }
}

/// 客户端拦截器链
#[derive(Clone, Default)]
pub struct ClientInterceptorChain {
    interceptors: Vec<Arc<dyn UnaryClientInterceptor>>,
}

impl ClientInterceptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加拦截器，追加顺序即嵌套顺序
    pub fn with(mut self, interceptor: impl UnaryClientInterceptor) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    /// 追加共享拦截器
    pub fn with_shared(mut self, interceptor: Arc<dyn UnaryClientInterceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }
}

#[async_trait]
impl UnaryClientInterceptor for ClientInterceptorChain {
    async fn call(
        &self,
        ctx: CallContext,
        method: String,
        request: BoxPayload,
        channel: ChannelHandle,
        opts: CallOptions,
        invoke: UnaryInvoker,
    ) -> UnaryResult {
        let mut invoker = invoke;
        for interceptor in self.interceptors.iter().rev() {
            let interceptor = Arc::clone(interceptor);
            let prev = invoker;
            invoker = Box::new(move |ctx, method, request, channel, opts| {
                Box::pin(async move {
                    interceptor
                        .call(ctx, method, request, channel, opts, prev)
                        .await
                })
            });
        }
        invoker(ctx, method, request, channel, opts).await
    }
}

/// 将多个客户端拦截器组合为单个拦截器
pub fn chain_unary_client_interceptors(
    interceptors: Vec<Arc<dyn UnaryClientInterceptor>>,
) -> ClientInterceptorChain {
    ClientInterceptorChain { interceptors }
}
