//! Tees an upstream response body to the client while buffering a copy for the cache.
//!
//! An [`http_body::Body`] impl that is polled by the outgoing response's body machinery,
//! producing the same frames it receives from upstream while also appending them to a shared
//! buffer. The upstream status code is recorded once, when the capture is built from the
//! upstream `Response`'s parts, not discovered lazily — `reqwest::Response` always carries a
//! status line by construction, so a body with no status ever written has no reachable path here.

use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use bytes::Bytes;
use http_body::{Body, Frame};

/// Shared handle to the buffer a [`CaptureBody`] accumulates into. Cloned cheaply; read once the
/// body has finished streaming to the client.
#[derive(Clone, Default)]
pub struct CaptureBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl CaptureBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything written so far. Call after the response body has been fully
    /// streamed to the client.
    pub fn into_vec(self) -> Vec<u8> {
        Arc::try_unwrap(self.bytes)
            .map(|m| m.into_inner().expect("capture buffer lock poisoned"))
            .unwrap_or_else(|arc| arc.lock().expect("capture buffer lock poisoned").clone())
    }

    fn push(&self, chunk: &[u8]) {
        self.bytes.lock().expect("capture buffer lock poisoned").extend_from_slice(chunk);
    }
}

/// An [`http_body::Body`] that forwards every frame from `inner` downstream unchanged while also
/// appending its bytes to a [`CaptureBuffer`]. When the stream ends — cleanly, on error, or by
/// being dropped before either — a one-shot notification fires so a caller can act on the
/// buffer's final contents without blocking the response on it.
pub struct CaptureBody<B> {
    inner: B,
    buffer: CaptureBuffer,
    done_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl<B> CaptureBody<B> {
    pub fn new(
        inner: B,
        buffer: CaptureBuffer,
        done_tx: tokio::sync::oneshot::Sender<()>,
    ) -> Self {
        Self { inner, buffer, done_tx: Some(done_tx) }
    }

    fn notify_done(&mut self) {
        if let Some(tx) = self.done_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl<B> Body for CaptureBody<B>
where
    B: Body<Data = Bytes> + Unpin,
{
    type Data = Bytes;
    type Error = B::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        let polled = Pin::new(&mut this.inner).poll_frame(cx);
        match &polled {
            Poll::Ready(Some(Ok(frame))) => {
                if let Some(data) = frame.data_ref() {
                    this.buffer.push(data);
                }
            }
            Poll::Ready(None) | Poll::Ready(Some(Err(_))) => this.notify_done(),
            Poll::Pending => {}
        }
        polled
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }
}

impl<B> Drop for CaptureBody<B> {
    fn drop(&mut self) {
        // Client disconnected before the stream naturally ended: the buffer still holds
        // whatever the upstream wrote so far.
        self.notify_done();
    }
}
