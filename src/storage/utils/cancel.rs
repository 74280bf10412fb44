// Cooperative cancellation of in-flight backend calls
use crate::error::{CancelledSnafu, Result};
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Run `fut` until it completes or `token` fires.
///
/// On cancellation the future is dropped, which releases any stream it holds.
pub async fn cancellable<T, F>(
    token: Option<&CancellationToken>,
    op: &'static str,
    path: &str,
    fut: F,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let Some(token) = token else {
        return fut.await;
    };

    tokio::select! {
        biased;
        _ = token.cancelled() => CancelledSnafu { op, path }.fail(),
        result = fut => result,
    }
}
