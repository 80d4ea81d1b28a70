//! Response body wrapper that reports the request once the body is done.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Buf;
use http_body::{Body, Frame, SizeHint};

use crate::http::request_log::PendingRecord;

/// Response body that counts the data bytes it yields.
///
/// The pending record is emitted exactly once: when the inner body ends,
/// fails, or the wrapper is dropped, whichever happens first.
pub struct LoggedBody<B> {
    inner: Pin<Box<B>>,
    status: u16,
    bytes: u64,
    pending: Option<PendingRecord>,
}

impl<B> LoggedBody<B> {
    pub(crate) fn new(inner: B, status: u16, pending: PendingRecord) -> Self {
        Self {
            inner: Box::pin(inner),
            status,
            bytes: 0,
            pending: Some(pending),
        }
    }

    fn finish(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.emit(self.status, self.bytes);
        }
    }
}

impl<B: Body> Body for LoggedBody<B> {
    type Data = B::Data;
    type Error = B::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        let polled = this.inner.as_mut().poll_frame(cx);

        match &polled {
            Poll::Ready(Some(Ok(frame))) => {
                if let Some(data) = frame.data_ref() {
                    this.bytes += data.remaining() as u64;
                }
            }
            Poll::Ready(Some(Err(_))) | Poll::Ready(None) => this.finish(),
            Poll::Pending => {}
        }

        polled
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

impl<B> Drop for LoggedBody<B> {
    fn drop(&mut self) {
        self.finish();
    }
}
