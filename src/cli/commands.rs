//! CLI command implementations.
//!
//! Contains the business logic for each CLI command.

use crate::cli::output::{
    OutputFormat, format_json, format_points, format_repair, format_snapshot, format_video,
};
use crate::cli::parser::{Cli, Commands};
use crate::core::{Point, SavePayload, VideoRef};
use crate::error::{CommandError, Error, Result};
use crate::io::{open_chunk_stream, read_file, write_file};
use crate::parse::repair;
use crate::session::{ExtractionSession, SessionConfig, SnapshotSink, drive};
use std::fmt::Write as FmtWrite;
use std::io::{self, Write as IoWrite};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Executes the CLI command.
///
/// Intermediate snapshots of `extract` are written to stdout as they are
/// emitted; the returned string holds the final output.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);

    match &cli.command {
        Commands::Extract {
            input,
            chunk_size,
            delay_ms,
            throttle_ms,
            save,
            url,
            title,
        } => {
            let options = ExtractOptions {
                input: input.clone(),
                chunk_size: *chunk_size,
                delay: Duration::from_millis(*delay_ms),
                throttle: Duration::from_millis(*throttle_ms),
                save: save.clone(),
                url: url.clone(),
                title: title.clone(),
            };
            cmd_extract(&options, format)
        }
        Commands::Repair { input } => cmd_repair(input, format),
        Commands::Video { url } => cmd_video(url, format),
    }
}

/// Settings for one `extract` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Recorded response to replay (`-` for stdin).
    pub input: PathBuf,
    /// Bytes per replayed chunk.
    pub chunk_size: usize,
    /// Minimum spacing between chunks.
    pub delay: Duration,
    /// Snapshot throttle window.
    pub throttle: Duration,
    /// Where to write the save payload, if anywhere.
    pub save: Option<PathBuf>,
    /// Video the response belongs to.
    pub url: Option<String>,
    /// Video title for the save payload.
    pub title: String,
}

impl ExtractOptions {
    /// Options replaying `input` with default pacing and throttle.
    #[must_use]
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            chunk_size: 16,
            delay: Duration::ZERO,
            throttle: SessionConfig::default().throttle,
            save: None,
            url: None,
            title: "Untitled video".to_string(),
        }
    }

    fn validate(&self) -> Result<Option<VideoRef>> {
        if self.chunk_size == 0 {
            return Err(Error::Config {
                message: "chunk size must be > 0".to_string(),
            });
        }
        if self.save.is_some() && self.url.is_none() {
            return Err(CommandError::MissingArgument("--url is required with --save".to_string()).into());
        }
        self.url.as_deref().map(VideoRef::parse).transpose()
    }
}

/// Sink that writes each snapshot as one line as soon as it is emitted.
#[derive(Debug)]
pub struct WriterSink<W> {
    writer: W,
    format: OutputFormat,
    key_prefix_len: usize,
    seq: usize,
}

impl<W: IoWrite> WriterSink<W> {
    /// Creates a sink writing to `writer`.
    pub const fn new(writer: W, format: OutputFormat, key_prefix_len: usize) -> Self {
        Self {
            writer,
            format,
            key_prefix_len,
            seq: 0,
        }
    }

    /// Number of snapshots written.
    #[must_use]
    pub const fn written(&self) -> usize {
        self.seq
    }

    /// Consumes the sink, returning the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: IoWrite> SnapshotSink for WriterSink<W> {
    fn on_snapshot(&mut self, points: Vec<Point>) {
        self.seq += 1;
        let line = format_snapshot(self.seq, &points, self.key_prefix_len, self.format);
        if let Err(e) = writeln!(self.writer, "{line}").and_then(|()| self.writer.flush())
            && e.kind() != io::ErrorKind::BrokenPipe
        {
            warn!(error = %e, "failed to write snapshot");
        }
    }

    fn on_final(&mut self, points: Vec<Point>) {
        // the final list is rendered by the caller
        debug!(count = points.len(), "final snapshot");
    }
}

/// Replays `options.input` through an extraction session.
///
/// Snapshots go to `writer`; the final point list is returned. Firing
/// `cancel` ends the replay early with a best-effort final list.
///
/// # Errors
///
/// Returns an error for invalid options, an unreadable input, a failed save,
/// or an extraction that yields no points.
pub async fn run_extract<W: IoWrite>(
    options: &ExtractOptions,
    format: OutputFormat,
    writer: W,
    cancel: &CancellationToken,
) -> Result<Vec<Point>> {
    let video = options.validate()?;
    let config = SessionConfig::with_throttle(options.throttle);
    let sink = WriterSink::new(writer, format, config.key_prefix_len);
    let mut session = ExtractionSession::with_config(config, sink)?;

    let stream = open_chunk_stream(&options.input, options.chunk_size, options.delay).await?;
    info!(
        input = %options.input.display(),
        chunk_size = options.chunk_size,
        throttle_ms = options.throttle.as_millis(),
        "replaying stream"
    );
    let points = drive(&mut session, stream, cancel).await?;

    if let (Some(path), Some(video)) = (&options.save, &video) {
        save_points(path, video, &options.title, &points)?;
    }
    Ok(points)
}

fn save_points(path: &Path, video: &VideoRef, title: &str, points: &[Point]) -> Result<()> {
    let payload = SavePayload::new(video, title, points);
    write_file(path, &format_json(&payload))?;
    info!(path = %path.display(), video_id = %video.video_id, points = points.len(), "saved points");
    Ok(())
}

fn cmd_extract(options: &ExtractOptions, format: OutputFormat) -> Result<String> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CommandError::ExecutionFailed(e.to_string()))?;

    let points = runtime.block_on(extract_until_interrupted(options, format))?;

    let mut output = format_points(&points, SessionConfig::default().key_prefix_len, format);
    if let (Some(path), OutputFormat::Text) = (&options.save, format) {
        let _ = write!(output, "\nSaved {} points to {}\n", points.len(), path.display());
    }
    Ok(output)
}

/// Runs [`run_extract`] against stdout, finalizing early on Ctrl-C.
async fn extract_until_interrupted(
    options: &ExtractOptions,
    format: OutputFormat,
) -> Result<Vec<Point>> {
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("interrupted, finalizing");
            on_interrupt.cancel();
        }
    });

    let result = run_extract(options, format, io::stdout(), &cancel).await;
    interrupt.abort();
    result
}

fn cmd_repair(input: &Path, format: OutputFormat) -> Result<String> {
    let text = read_file(input)?;
    let repaired = repair(&text);
    Ok(format_repair(repaired.as_deref(), format))
}

fn cmd_video(url: &str, format: OutputFormat) -> Result<String> {
    let video = VideoRef::parse(url)?;
    Ok(format_video(&video, format))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractionError;
    use tempfile::TempDir;

    const DOC: &str = r#"{"points":[{"content":"Review the API","category":"action","timestamp":125},{"content":"Caching is hard","category":"insight"}]}"#;

    fn write_doc(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("response.json");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[tokio::test]
    async fn test_run_extract() {
        let temp_dir = TempDir::new().unwrap();
        let options = ExtractOptions::new(write_doc(&temp_dir, DOC));
        let mut out = Vec::new();
        let points = run_extract(&options, OutputFormat::Ndjson, &mut out, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(points.len(), 2);
        let written = String::from_utf8(out).unwrap();
        for line in written.lines() {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(value["event"], "snapshot");
        }
    }

    #[tokio::test]
    async fn test_run_extract_saves_payload() {
        let temp_dir = TempDir::new().unwrap();
        let save = temp_dir.path().join("out/save.json");
        let options = ExtractOptions {
            save: Some(save.clone()),
            url: Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string()),
            title: "Talk".to_string(),
            ..ExtractOptions::new(write_doc(&temp_dir, DOC))
        };
        run_extract(&options, OutputFormat::Text, io::sink(), &CancellationToken::new())
            .await
            .unwrap();

        let payload: SavePayload =
            serde_json::from_str(&std::fs::read_to_string(save).unwrap()).unwrap();
        assert_eq!(payload.video_id, "dQw4w9WgXcQ");
        assert_eq!(payload.title, "Talk");
        assert_eq!(payload.points.len(), 2);
        assert_eq!(payload.points[1].order, 1);
    }

    #[tokio::test]
    async fn test_run_extract_no_insights() {
        let temp_dir = TempDir::new().unwrap();
        let options = ExtractOptions::new(write_doc(&temp_dir, "Sorry, I can't help with that."));
        let err = run_extract(&options, OutputFormat::Text, io::sink(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Extraction(ExtractionError::NoInsights)));
    }

    #[tokio::test]
    async fn test_run_extract_rejects_zero_chunk_size() {
        let options = ExtractOptions {
            chunk_size: 0,
            ..ExtractOptions::new("unused.json")
        };
        let err = run_extract(&options, OutputFormat::Text, io::sink(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[tokio::test]
    async fn test_run_extract_save_without_url() {
        let options = ExtractOptions {
            save: Some(PathBuf::from("save.json")),
            ..ExtractOptions::new("unused.json")
        };
        let err = run_extract(&options, OutputFormat::Text, io::sink(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Command(CommandError::MissingArgument(_))));
    }

    #[test]
    fn test_writer_sink_numbers_snapshots() {
        let mut sink = WriterSink::new(Vec::new(), OutputFormat::Text, 40);
        sink.on_snapshot(vec![Point::new("a", crate::core::Category::Action)]);
        sink.on_snapshot(Vec::new());
        sink.on_final(Vec::new());
        assert_eq!(sink.written(), 2);
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(text, "snapshot 1: 1 point: [action] a\nsnapshot 2: 0 points\n");
    }

    #[test]
    fn test_cmd_repair() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_doc(&temp_dir, r#"{"points":[{"content":"Do X","category":"action","time"#);
        let output = cmd_repair(&path, OutputFormat::Text).unwrap();
        assert_eq!(output, "{\"points\":[{\"content\":\"Do X\",\"category\":\"action\"}]}\n");
    }

    #[test]
    fn test_cmd_video_invalid() {
        assert!(cmd_video("https://example.com/video", OutputFormat::Text).is_err());
    }
}
