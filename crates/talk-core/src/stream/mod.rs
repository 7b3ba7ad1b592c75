//! Incremental decoder for `data: <json>` event streams.
//!
//! The chat endpoint answers a POST with a chunked body of SSE-style records:
//!
//! ```text
//! data: {"type": "ai_chunk", "content": "Hel"}\n\n
//! data: {"type": "ai_chunk", "content": "lo"}\n\n
//! ```
//!
//! Chunk boundaries are arbitrary. [`SseDecoder`] keeps the bytes of an
//! unterminated trailing line until the next chunk arrives, and only decodes
//! UTF-8 once a line is complete, so records (and multi-byte characters)
//! split across reads decode exactly once.
//!
//! Malformed records are logged and skipped; they never end the stream.

use crate::error::{Error, Result};
use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use serde::de::DeserializeOwned;
use std::fmt::Display;
use std::marker::PhantomData;
use std::pin::Pin;
use std::time::Duration;
use tracing::{debug, warn};

/// Prefix marking a record line
pub const DATA_PREFIX: &str = "data: ";

/// Boxed stream of decoded events
pub type EventStream<T> = Pin<Box<dyn Stream<Item = Result<T>> + Send>>;

/// Line decoder with a carry-over buffer for partial trailing lines
#[derive(Debug)]
pub struct SseDecoder<T = serde_json::Value> {
    buffer: BytesMut,
    skipped: usize,
    _event: PhantomData<fn() -> T>,
}

impl<T> Default for SseDecoder<T> {
    fn default() -> Self {
        Self {
            buffer: BytesMut::new(),
            skipped: 0,
            _event: PhantomData,
        }
    }
}

impl<T: DeserializeOwned> SseDecoder<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk as delivered by the transport
    pub fn feed(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Next event from the complete lines buffered so far
    pub fn next_event(&mut self) -> Option<T> {
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line = self.buffer.split_to(pos + 1);
            if let Some(event) = self.decode_line(&line[..pos]) {
                return Some(event);
            }
        }
        None
    }

    /// Decode whatever is left once the source has ended.
    ///
    /// The last record of a body is not always newline-terminated.
    pub fn finish(&mut self) -> Option<T> {
        if let Some(event) = self.next_event() {
            return Some(event);
        }
        if self.buffer.is_empty() {
            return None;
        }
        let rest = self.buffer.split();
        self.decode_line(&rest)
    }

    /// Bytes held back waiting for a line terminator
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Number of `data:` records dropped as malformed
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn decode_line(&mut self, raw: &[u8]) -> Option<T> {
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        let line = match std::str::from_utf8(raw) {
            Ok(line) => line,
            Err(e) => {
                if raw.starts_with(DATA_PREFIX.as_bytes()) {
                    warn!("Skipping stream record with invalid UTF-8: {}", e);
                    self.skipped += 1;
                }
                return None;
            }
        };

        let payload = line.strip_prefix(DATA_PREFIX)?;
        match serde_json::from_str(payload) {
            Ok(event) => Some(event),
            Err(e) => {
                warn!("Failed to parse stream record: {} ({:?})", e, payload);
                self.skipped += 1;
                None
            }
        }
    }
}

/// Decode a byte stream into events, preserving arrival order.
///
/// The returned stream ends when `source` ends. A transport error from
/// `source` is yielded once as [`Error::Stream`] and ends the stream. With
/// `idle_timeout` set, waiting longer than that for a single chunk yields
/// [`Error::Timeout`]. Dropping the returned stream drops `source`.
pub fn decode<S, E, T>(source: S, idle_timeout: Option<Duration>) -> EventStream<T>
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
    T: DeserializeOwned + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut source = Box::pin(source);
        let mut decoder = SseDecoder::<T>::new();
        let mut failed = false;

        loop {
            let next = match idle_timeout {
                Some(limit) => match tokio::time::timeout(limit, source.next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        yield Err(Error::Timeout);
                        failed = true;
                        break;
                    }
                },
                None => source.next().await,
            };

            match next {
                Some(Ok(chunk)) => {
                    decoder.feed(&chunk);
                    while let Some(event) = decoder.next_event() {
                        yield Ok(event);
                    }
                }
                Some(Err(e)) => {
                    yield Err(Error::Stream(e.to_string()));
                    failed = true;
                    break;
                }
                None => break,
            }
        }

        if !failed {
            if let Some(event) = decoder.finish() {
                yield Ok(event);
            }
            debug!("Event stream ended ({} malformed records skipped)", decoder.skipped());
        }
    })
}

/// Drive an event stream to completion, invoking `on_event` per event
pub async fn for_each_event<T, F>(mut events: EventStream<T>, mut on_event: F) -> Result<()>
where
    F: FnMut(T),
{
    while let Some(event) = events.next().await {
        on_event(event?);
    }
    Ok(())
}
