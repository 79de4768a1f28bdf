//! 消息负载抽象
//!
//! 拦截器链以动态类型传递请求/响应负载，终端处理器通过向下转型取回具体消息

use std::any::Any;

/// 调用负载
///
/// 支持序列化大小计算的消息返回 `Some(字节数)`，其余消息返回 `None`
pub trait Payload: Any + Send {
    /// 序列化后的字节数
    fn encoded_size(&self) -> Option<usize> {
        None
    }

    fn as_any(&self) -> &dyn Any;
}

/// 装箱的调用负载
pub type BoxPayload = Box<dyn Payload>;

impl dyn Payload {
    /// 向下转型为具体负载类型
    pub fn downcast_ref<T: Payload>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Protobuf 消息负载
///
/// 大小计算基于 prost 的 `encoded_len`
#[derive(Debug, Clone)]
pub struct ProtoPayload<T>(pub T);

impl<T> Payload for ProtoPayload<T>
where
    T: prost::Message + 'static,
{
    fn encoded_size(&self) -> Option<usize> {
        Some(self.0.encoded_len())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// 非 Protobuf 负载，不支持大小计算
#[derive(Debug, Clone)]
pub struct OpaquePayload<T>(pub T);

impl<T> Payload for OpaquePayload<T>
where
    T: Send + 'static,
{
    fn as_any(&self) -> &dyn Any {
        self
    }
}
