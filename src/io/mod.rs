//! I/O utilities.
//!
//! Streaming UTF-8 decoding for network chunks, file and stdin access for
//! recorded streams, and grapheme-aware text helpers.

pub mod decoder;
pub mod reader;
pub mod unicode;

pub use decoder::Utf8Decoder;
pub use reader::{ChunkStream, STDIN_PATH, is_stdin, open_chunk_stream, read_file, write_file};
pub use unicode::{ellipsize, grapheme_count, truncate_graphemes};
