// Byte-counting reader used for progress instrumentation
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, ReadBuf};

/// Callback invoked with the number of bytes moved by each successful read.
pub type IoCallback = Arc<dyn Fn(usize) + Send + Sync>;

/// Reader that reports every chunk it yields without altering the data.
///
/// Without a callback it is a plain passthrough.
pub struct CallbackReader<R> {
    inner: R,
    callback: Option<IoCallback>,
}

impl<R> CallbackReader<R> {
    pub fn new(inner: R, callback: Option<IoCallback>) -> Self {
        Self { inner, callback }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for CallbackReader<R> {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let before_len = buf.filled().len();
        match Pin::new(&mut self.inner).poll_read(cx, buf) {
            Poll::Ready(Ok(())) => {
                let bytes_read = buf.filled().len() - before_len;
                if bytes_read > 0 {
                    if let Some(callback) = &self.callback {
                        callback(bytes_read);
                    }
                }
                Poll::Ready(Ok(()))
            }
            other => other,
        }
    }
}
