//! Async event loop feeding a session from a byte stream.

use crate::core::Point;
use crate::error::{Result, StreamError};
use crate::io::Utf8Decoder;
use crate::session::{ExtractionSession, FinishReason, SnapshotSink};
use futures_util::{Stream, StreamExt};
use std::fmt::Display;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Sleeps until `deadline`, or forever when there is none.
pub async fn sleep_until_deadline(deadline: Option<std::time::Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}

/// Runs `session` over `stream` until it ends, fails, or `cancel` fires.
///
/// Each iteration waits on three things at once: the cancellation token,
/// the single throttle deadline, and the next chunk. Whatever way the loop
/// ends, the session is finalized over the bytes received so far, so the
/// sink always gets its final snapshot.
///
/// Dropping the returned future instead tears the session down silently.
///
/// # Errors
///
/// [`StreamError::Upstream`] when the stream yields an error (after the
/// partial buffer was finalized), otherwise whatever
/// [`ExtractionSession::finalize`] returns.
pub async fn drive<K, St, B, E>(
    session: &mut ExtractionSession<K>,
    stream: St,
    cancel: &CancellationToken,
) -> Result<Vec<Point>>
where
    K: SnapshotSink,
    St: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
{
    let mut stream = std::pin::pin!(stream);
    let mut decoder = Utf8Decoder::new();
    let mut upstream_error = None;

    let reason = loop {
        let deadline = session.next_deadline();
        tokio::select! {
            biased;
            () = cancel.cancelled() => break FinishReason::Aborted,
            () = sleep_until_deadline(deadline) => {
                session.poll(Instant::now().into_std());
            }
            item = stream.next() => match item {
                Some(Ok(bytes)) => {
                    let text = decoder.decode(bytes.as_ref());
                    if !text.is_empty() {
                        session.feed(&text, Instant::now().into_std());
                    }
                }
                Some(Err(e)) => {
                    upstream_error = Some(e.to_string());
                    break FinishReason::UpstreamError;
                }
                None => break FinishReason::Completed,
            },
        }
    };

    let tail = decoder.finish();
    if !tail.is_empty() {
        debug!(len = tail.len(), "flushing undecoded tail");
        session.feed(&tail, Instant::now().into_std());
    }

    let result = session.finalize(reason);
    if let Some(reason) = upstream_error {
        warn!(%reason, recovered = session.best().len(), "upstream stream failed");
        return Err(StreamError::Upstream { reason }.into());
    }
    result
}
