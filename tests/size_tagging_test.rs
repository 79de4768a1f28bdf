//! 负载大小追踪拦截器测试
//!
//! 覆盖 span 打点、大小不可用哨兵值、错误跳过响应打点和无 span 透传行为

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tonic::{Code, Status};

use vesta_grpc_middleware::{
    BoxPayload, CallContext, CallOptions, ChannelHandle, OpaquePayload, ProtoPayload,
    REQUEST_SIZE_TAG, RESPONSE_SIZE_TAG, SizeTaggingClientInterceptor,
    SizeTaggingServerInterceptor, TagValue, TraceSpan, UnaryClientInterceptor, UnaryHandler,
    UnaryInvoker, UnaryServerInfo, UnaryServerInterceptor,
};

#[derive(Clone, PartialEq, prost::Message)]
struct SearchRequest {
    #[prost(string, tag = "1")]
    query: String,
}

#[derive(Clone, PartialEq, prost::Message)]
struct SearchReply {
    #[prost(string, tag = "1")]
    hotel_id: String,
}

/// 记录 tag 写入的 span 测试替身
#[derive(Default)]
struct RecordingSpan {
    tags: Mutex<HashMap<String, TagValue>>,
}

impl RecordingSpan {
    fn tag(&self, key: &str) -> Option<TagValue> {
        self.tags.lock().unwrap().get(key).cloned()
    }

    fn tag_count(&self) -> usize {
        self.tags.lock().unwrap().len()
    }
}

impl TraceSpan for RecordingSpan {
    fn set_tag(&self, key: &str, value: TagValue) {
        self.tags.lock().unwrap().insert(key.to_string(), value);
    }
}

fn test_info() -> UnaryServerInfo {
    UnaryServerInfo::new("/reservation.Search/Nearby")
}

/// 序列化后恰好 42 字节的请求（2 字节字段头 + 40 字节内容）
fn request_of_42_bytes() -> BoxPayload {
    Box::new(ProtoPayload(SearchRequest {
        query: "x".repeat(40),
    }))
}

/// 序列化后恰好 17 字节的响应
fn reply_of_17_bytes() -> SearchReply {
    SearchReply {
        hotel_id: "y".repeat(15),
    }
}

fn proto_reply_handler() -> UnaryHandler {
    Box::new(|_ctx, _request| {
        Box::pin(async move { Ok(Box::new(ProtoPayload(reply_of_17_bytes())) as BoxPayload) })
    })
}

#[tokio::test]
async fn server_tags_request_and_response_sizes() {
    let span = Arc::new(RecordingSpan::default());
    let ctx = CallContext::new().with_span(span.clone());

    let result = SizeTaggingServerInterceptor::new()
        .call(ctx, request_of_42_bytes(), test_info(), proto_reply_handler())
        .await;
    assert!(result.is_ok());

    assert_eq!(span.tag(REQUEST_SIZE_TAG), Some(TagValue::Int(42)));
    assert_eq!(span.tag(RESPONSE_SIZE_TAG), Some(TagValue::Int(17)));
}

#[tokio::test]
async fn server_tags_sentinel_for_unsizable_request() {
    let span = Arc::new(RecordingSpan::default());
    let ctx = CallContext::new().with_span(span.clone());
    let handler_called = Arc::new(AtomicBool::new(false));

    let called = Arc::clone(&handler_called);
    let handler: UnaryHandler = Box::new(move |_ctx, request| {
        Box::pin(async move {
            // 拦截器原样传入了请求
            let original = request.downcast_ref::<OpaquePayload<String>>().unwrap();
            assert_eq!(original.0, "not a proto message");
            called.store(true, Ordering::SeqCst);
            Ok(Box::new(ProtoPayload(reply_of_17_bytes())) as BoxPayload)
        })
    });

    let result = SizeTaggingServerInterceptor::new()
        .call(
            ctx,
            Box::new(OpaquePayload("not a proto message".to_string())),
            test_info(),
            handler,
        )
        .await;
    assert!(result.is_ok());

    assert!(handler_called.load(Ordering::SeqCst));
    assert_eq!(span.tag(REQUEST_SIZE_TAG), Some(TagValue::Int(-1)));
    assert_eq!(span.tag(RESPONSE_SIZE_TAG), Some(TagValue::Int(17)));
}

#[tokio::test]
async fn server_skips_response_tag_on_handler_error() {
    let span = Arc::new(RecordingSpan::default());
    let ctx = CallContext::new().with_span(span.clone());

    let handler: UnaryHandler = Box::new(|_ctx, _request| {
        Box::pin(async move { Err(Status::not_found("no hotels nearby")) })
    });

    let status = SizeTaggingServerInterceptor::new()
        .call(ctx, request_of_42_bytes(), test_info(), handler)
        .await
        .err()
        .unwrap();

    // 错误原样返回
    assert_eq!(status.code(), Code::NotFound);
    assert_eq!(status.message(), "no hotels nearby");

    // 请求大小已打点，响应大小没有任何 tag
    assert_eq!(span.tag(REQUEST_SIZE_TAG), Some(TagValue::Int(42)));
    assert_eq!(span.tag(RESPONSE_SIZE_TAG), None);
    assert_eq!(span.tag_count(), 1);
}

#[tokio::test]
async fn server_without_span_still_invokes_handler() {
    let handler_called = Arc::new(AtomicBool::new(false));

    let called = Arc::clone(&handler_called);
    let handler: UnaryHandler = Box::new(move |_ctx, _request| {
        Box::pin(async move {
            called.store(true, Ordering::SeqCst);
            Ok(Box::new(ProtoPayload(reply_of_17_bytes())) as BoxPayload)
        })
    });

    let result = SizeTaggingServerInterceptor::new()
        .call(CallContext::new(), request_of_42_bytes(), test_info(), handler)
        .await;

    assert!(handler_called.load(Ordering::SeqCst));
    let reply = result.unwrap();
    let reply = reply.downcast_ref::<ProtoPayload<SearchReply>>().unwrap();
    assert_eq!(reply.0, reply_of_17_bytes());
}

fn test_channel() -> ChannelHandle {
    ChannelHandle::new("http://search:8082")
}

fn proto_reply_invoker() -> UnaryInvoker {
    Box::new(|_ctx, _method, _request, _channel, _opts| {
        Box::pin(async move { Ok(Box::new(ProtoPayload(reply_of_17_bytes())) as BoxPayload) })
    })
}

#[tokio::test]
async fn client_tags_request_and_response_sizes() {
    let span = Arc::new(RecordingSpan::default());
    let ctx = CallContext::new().with_span(span.clone());

    let result = SizeTaggingClientInterceptor::new()
        .call(
            ctx,
            "/reservation.Search/Nearby".to_string(),
            request_of_42_bytes(),
            test_channel(),
            CallOptions::new(),
            proto_reply_invoker(),
        )
        .await;
    assert!(result.is_ok());

    assert_eq!(span.tag(REQUEST_SIZE_TAG), Some(TagValue::Int(42)));
    assert_eq!(span.tag(RESPONSE_SIZE_TAG), Some(TagValue::Int(17)));
}

#[tokio::test]
async fn client_tags_string_sentinel_for_unsizable_request() {
    let span = Arc::new(RecordingSpan::default());
    let ctx = CallContext::new().with_span(span.clone());

    let result = SizeTaggingClientInterceptor::new()
        .call(
            ctx,
            "/reservation.Search/Nearby".to_string(),
            Box::new(OpaquePayload(vec![0_u8; 8])),
            test_channel(),
            CallOptions::new(),
            proto_reply_invoker(),
        )
        .await;
    assert!(result.is_ok());

    // 客户端的哨兵值是字符串 "unknown"，而不是服务端的 -1
    assert_eq!(
        span.tag(REQUEST_SIZE_TAG),
        Some(TagValue::Str("unknown".to_string()))
    );
    assert_eq!(span.tag(RESPONSE_SIZE_TAG), Some(TagValue::Int(17)));
}

#[tokio::test]
async fn client_skips_response_tag_on_invoker_error() {
    let span = Arc::new(RecordingSpan::default());
    let ctx = CallContext::new().with_span(span.clone());

    let invoker: UnaryInvoker = Box::new(|_ctx, _method, _request, _channel, _opts| {
        Box::pin(async move { Err(Status::deadline_exceeded("rate service timed out")) })
    });

    let status = SizeTaggingClientInterceptor::new()
        .call(
            ctx,
            "/reservation.Rate/GetRates".to_string(),
            request_of_42_bytes(),
            test_channel(),
            CallOptions::new(),
            invoker,
        )
        .await
        .err()
        .unwrap();

    assert_eq!(status.code(), Code::DeadlineExceeded);
    assert_eq!(status.message(), "rate service timed out");
    assert_eq!(span.tag(REQUEST_SIZE_TAG), Some(TagValue::Int(42)));
    assert_eq!(span.tag(RESPONSE_SIZE_TAG), None);
}

#[tokio::test]
async fn client_without_span_returns_result_unchanged() {
    let result = SizeTaggingClientInterceptor::new()
        .call(
            CallContext::new(),
            "/reservation.Search/Nearby".to_string(),
            request_of_42_bytes(),
            test_channel(),
            CallOptions::new(),
            proto_reply_invoker(),
        )
        .await;

    let reply = result.unwrap();
    let reply = reply.downcast_ref::<ProtoPayload<SearchReply>>().unwrap();
    assert_eq!(reply.0, reply_of_17_bytes());
}
