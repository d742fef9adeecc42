//! File and stdin access for recorded model streams.
//!
//! A recorded stream is replayed as a real byte stream: the source is read
//! in fixed-capacity chunks, optionally paced, so chunk boundaries fall
//! wherever they fall, in the middle of tokens and characters included.

use crate::error::{IoError, Result};
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use tokio_util::io::ReaderStream;

/// Path value meaning "read from stdin".
pub const STDIN_PATH: &str = "-";

/// Stream of raw chunks as produced by [`open_chunk_stream`].
pub type ChunkStream = BoxStream<'static, std::io::Result<Vec<u8>>>;

/// Returns true when `path` designates stdin.
#[must_use]
pub fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == STDIN_PATH
}

/// Reads a file (or stdin for `-`) to a string.
///
/// # Errors
///
/// Returns an error if the file does not exist, can't be read, or is not
/// valid UTF-8.
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let path_ref = path.as_ref();
    let path_str = path_ref.to_string_lossy().to_string();

    if is_stdin(path_ref) {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| IoError::ReadFailed {
                path: path_str,
                reason: e.to_string(),
            })?;
        return Ok(content);
    }

    if !path_ref.exists() {
        return Err(IoError::FileNotFound { path: path_str }.into());
    }

    std::fs::read_to_string(path_ref).map_err(|e| {
        IoError::ReadFailed {
            path: path_str,
            reason: e.to_string(),
        }
        .into()
    })
}

/// Writes content to a file, creating parent directories if needed.
///
/// # Errors
///
/// Returns an error if directory creation or file writing fails.
pub fn write_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    let path_ref = path.as_ref();
    let path_str = path_ref.to_string_lossy().to_string();

    if let Some(parent) = path_ref.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(|e| IoError::DirectoryFailed {
            path: parent.to_string_lossy().to_string(),
            reason: e.to_string(),
        })?;
    }

    std::fs::write(path_ref, content).map_err(|e| IoError::WriteFailed {
        path: path_str,
        reason: e.to_string(),
    })?;

    Ok(())
}

/// Opens a file (or stdin for `-`) as a stream of chunks of at most
/// `chunk_size` bytes, spaced at least `delay` apart when it is non-zero.
///
/// # Errors
///
/// Returns an error if the file does not exist or can't be opened.
pub async fn open_chunk_stream(
    path: &Path,
    chunk_size: usize,
    delay: Duration,
) -> Result<ChunkStream> {
    let chunk_size = chunk_size.max(1);
    let stream: ChunkStream = if is_stdin(path) {
        ReaderStream::with_capacity(tokio::io::stdin(), chunk_size)
            .map(|r| r.map(|b| b.to_vec()))
            .boxed()
    } else {
        let path_str = path.to_string_lossy().to_string();
        if !path.exists() {
            return Err(IoError::FileNotFound { path: path_str }.into());
        }
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|e| IoError::ReadFailed {
                path: path_str,
                reason: e.to_string(),
            })?;
        ReaderStream::with_capacity(file, chunk_size)
            .map(|r| r.map(|b| b.to_vec()))
            .boxed()
    };

    if delay.is_zero() {
        return Ok(stream);
    }
    Ok(tokio_stream::StreamExt::throttle(stream, delay).boxed())
}
