//! Protobuf framing over HTTP.
//!
//! Unary calls carry one encoded message per body. Server-streaming calls
//! answer with a body of length-delimited messages; the stream is over when
//! the body ends.

use std::convert::Infallible;

use axum::body::{Body, Bytes};
use axum::extract::{FromRequest, Request};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use bytes::Buf;
use futures::{Stream, StreamExt};
use prost::Message;

use super::error::RpcError;

pub const PROTOBUF_CONTENT_TYPE: &str = "application/x-protobuf";
pub const PROTOBUF_STREAM_CONTENT_TYPE: &str = "application/x-protobuf-stream";

/// Extractor and response for a single protobuf message.
#[derive(Debug, Clone, Default)]
pub struct Protobuf<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for Protobuf<T>
where
    T: Message + Default,
    S: Send + Sync,
{
    type Rejection = RpcError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| RpcError::BadRequest(e.body_text()))?;
        T::decode(body)
            .map(Protobuf)
            .map_err(|e| RpcError::BadRequest(format!("invalid protobuf body: {e}")))
    }
}

impl<T: Message> IntoResponse for Protobuf<T> {
    fn into_response(self) -> Response {
        (
            [(header::CONTENT_TYPE, PROTOBUF_CONTENT_TYPE)],
            self.0.encode_to_vec(),
        )
            .into_response()
    }
}

/// Streams `messages` as length-delimited frames, one chunk per message.
pub fn framed_stream<S, M>(messages: S) -> Response
where
    S: Stream<Item = M> + Send + 'static,
    M: Message + 'static,
{
    let frames =
        messages.map(|m| Ok::<_, Infallible>(Bytes::from(m.encode_length_delimited_to_vec())));
    (
        [(header::CONTENT_TYPE, PROTOBUF_STREAM_CONTENT_TYPE)],
        Body::from_stream(frames),
    )
        .into_response()
}

/// Client side of [`framed_stream`]: splits a fully received body into messages.
pub fn decode_frames<M: Message + Default>(mut buf: impl Buf) -> Result<Vec<M>, prost::DecodeError> {
    let mut messages = Vec::new();
    while buf.has_remaining() {
        messages.push(M::decode_length_delimited(&mut buf)?);
    }
    Ok(messages)
}
