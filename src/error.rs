//! 拦截器错误处理
//!
//! 链式组合本身不产生错误，调用结果错误始终原样向外传播。
//! 这里的错误类型供拦截器在短路拒绝请求时使用。

use thiserror::Error;
use tonic::Status;

/// 拦截器错误类型
#[derive(Error, Debug)]
pub enum InterceptorError {
    /// 请求被拦截器拒绝
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// 拦截器内部错误
    #[error("Interceptor internal error: {0}")]
    Internal(String),
}

impl From<InterceptorError> for Status {
    fn from(err: InterceptorError) -> Self {
        match err {
            InterceptorError::Rejected(msg) => Status::permission_denied(msg),
            InterceptorError::Internal(msg) => Status::internal(msg),
        }
    }
}
