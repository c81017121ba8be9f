//! Text transducers: UTF-8 decoding and re-splitting strings on delimiters.

use std::marker::PhantomData;

use crate::chunk::Chunk;
use crate::scope::Scope;
use crate::transducer::trait_def::{Input, Push, Transducer};

const BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Re-splits strings on a delimiter. Created by [`split_on`] and
/// [`split_lines`].
pub struct SplitOn<E, Env> {
    delimiter: String,
    strip_cr: bool,
    buffer: String,
    _phantom: PhantomData<fn() -> (E, Env)>,
}

impl<E, Env> std::fmt::Debug for SplitOn<E, Env> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SplitOn")
            .field("delimiter", &self.delimiter)
            .field("buffer", &self.buffer)
            .finish()
    }
}

/// Split the concatenation of all incoming strings on `delimiter`.
///
/// Pieces are emitted as soon as their closing delimiter arrives, even when
/// the piece or the delimiter straddles a chunk boundary. The text after the
/// last delimiter is emitted on flush, unless it is empty. An empty delimiter
/// passes strings through unchanged.
///
/// ```rust
/// use std::convert::Infallible;
/// use weir::testing::transduce;
/// use weir::{chunk, transducer::split_on};
///
/// # tokio_test::block_on(async {
/// let fields = split_on::<Infallible, ()>("||");
/// let input = [chunk!["a|".to_string(), "|b||c".to_string()], chunk!["d".to_string()]];
/// let out = transduce(fields, &(), input).await.unwrap();
/// assert_eq!(out, vec!["a", "b", "cd"]);
/// # });
/// ```
pub fn split_on<E, Env>(delimiter: impl Into<String>) -> SplitOn<E, Env>
where
    E: Send,
    Env: Clone + Send + Sync,
{
    SplitOn {
        delimiter: delimiter.into(),
        strip_cr: false,
        buffer: String::new(),
        _phantom: PhantomData,
    }
}

/// Split incoming strings into lines terminated by `\n` or `\r\n`.
///
/// Line terminators are not part of the emitted lines.
///
/// ```rust
/// use std::convert::Infallible;
/// use weir::testing::transduce;
/// use weir::{chunk, transducer::split_lines};
///
/// # tokio_test::block_on(async {
/// let input = [chunk!["one\r".to_string()], chunk!["\ntwo\nthr".to_string(), "ee".to_string()]];
/// let out = transduce(split_lines::<Infallible, ()>(), &(), input).await.unwrap();
/// assert_eq!(out, vec!["one", "two", "three"]);
/// # });
/// ```
pub fn split_lines<E, Env>() -> SplitOn<E, Env>
where
    E: Send,
    Env: Clone + Send + Sync,
{
    SplitOn {
        strip_cr: true,
        ..split_on("\n")
    }
}

impl<E, Env> SplitOn<E, Env> {
    fn split(&mut self, chunk: Chunk<String>) -> Chunk<String> {
        let mut out = Vec::new();
        for text in chunk {
            // The buffer holds no complete delimiter, so a match can only
            // start within its last `delimiter.len() - 1` bytes.
            let mut from = self
                .buffer
                .len()
                .saturating_sub(self.delimiter.len() - 1);
            while !self.buffer.is_char_boundary(from) {
                from -= 1;
            }
            self.buffer.push_str(&text);

            let mut start = 0;
            while let Some(offset) = self.buffer[from..].find(self.delimiter.as_str()) {
                let end = from + offset;
                out.push(self.finish(&self.buffer[start..end]));
                start = end + self.delimiter.len();
                from = start;
            }
            self.buffer.drain(..start);
        }
        Chunk::from(out)
    }

    fn finish(&self, piece: &str) -> String {
        if self.strip_cr {
            piece.strip_suffix('\r').unwrap_or(piece).to_string()
        } else {
            piece.to_string()
        }
    }
}

impl<E, Env> Transducer for SplitOn<E, Env>
where
    E: Send,
    Env: Clone + Send + Sync,
{
    type In = String;
    type Out = String;
    type Error = E;
    type Env = Env;
    type Push = Self;

    async fn acquire(self, _env: &Env, _scope: &Scope) -> Result<Self, E> {
        Ok(self)
    }
}

impl<E, Env> Push for SplitOn<E, Env>
where
    E: Send,
    Env: Clone + Send + Sync,
{
    type In = String;
    type Out = String;
    type Error = E;
    type Env = Env;

    async fn push(&mut self, _env: &Env, input: Input<String>) -> Result<Chunk<String>, E> {
        Ok(match input {
            Input::Data(chunk) if self.delimiter.is_empty() => chunk,
            Input::Data(chunk) => self.split(chunk),
            Input::Flush if self.buffer.is_empty() => Chunk::empty(),
            Input::Flush => Chunk::single(std::mem::take(&mut self.buffer)),
        })
    }
}

/// Decodes UTF-8 bytes into strings. Created by [`utf8_decode`].
pub struct Utf8Decode<E, Env> {
    pending: Vec<u8>,
    at_start: bool,
    _phantom: PhantomData<fn() -> (E, Env)>,
}

impl<E, Env> std::fmt::Debug for Utf8Decode<E, Env> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Utf8Decode")
            .field("pending", &self.pending)
            .field("at_start", &self.at_start)
            .finish()
    }
}

/// Decode a byte stream as UTF-8, emitting one string per push.
///
/// A multi-byte character split across chunks is held back until its last
/// byte arrives. Invalid bytes become U+FFFD, as does an incomplete sequence
/// left over at flush. A byte order mark at the start of the stream is
/// dropped.
///
/// ```rust
/// use std::convert::Infallible;
/// use weir::testing::transduce;
/// use weir::{chunk, transducer::utf8_decode};
///
/// # tokio_test::block_on(async {
/// let bytes = "héllo".as_bytes();
/// let input = [chunk![bytes[0], bytes[1]], chunk![bytes[2], bytes[3], bytes[4], bytes[5]]];
/// let out = transduce(utf8_decode::<Infallible, ()>(), &(), input).await.unwrap();
/// assert_eq!(out.concat(), "héllo");
/// # });
/// ```
pub fn utf8_decode<E, Env>() -> Utf8Decode<E, Env>
where
    E: Send,
    Env: Clone + Send + Sync,
{
    Utf8Decode {
        pending: Vec::new(),
        at_start: true,
        _phantom: PhantomData,
    }
}

impl<E, Env> Utf8Decode<E, Env> {
    fn decode(&mut self, chunk: Chunk<u8>) -> Chunk<String> {
        let mut bytes = std::mem::take(&mut self.pending);
        bytes.extend(chunk);

        if self.at_start {
            if bytes.len() < BOM.len() && BOM.starts_with(&bytes) {
                self.pending = bytes;
                return Chunk::empty();
            }
            self.at_start = false;
            if bytes.starts_with(&BOM) {
                bytes.drain(..BOM.len());
            }
        }

        let mut text = String::new();
        let mut rest = bytes.as_slice();
        while !rest.is_empty() {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    text.push_str(valid);
                    rest = &[];
                }
                Err(error) => {
                    let (valid, after) = rest.split_at(error.valid_up_to());
                    text.push_str(&String::from_utf8_lossy(valid));
                    match error.error_len() {
                        Some(len) => {
                            text.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                        None => {
                            self.pending = after.to_vec();
                            rest = &[];
                        }
                    }
                }
            }
        }

        if text.is_empty() {
            Chunk::empty()
        } else {
            Chunk::single(text)
        }
    }

    fn flush(&mut self) -> Chunk<String> {
        self.at_start = true;
        if self.pending.is_empty() {
            return Chunk::empty();
        }
        let leftover = std::mem::take(&mut self.pending);
        Chunk::single(String::from_utf8_lossy(&leftover).into_owned())
    }
}

impl<E, Env> Transducer for Utf8Decode<E, Env>
where
    E: Send,
    Env: Clone + Send + Sync,
{
    type In = u8;
    type Out = String;
    type Error = E;
    type Env = Env;
    type Push = Self;

    async fn acquire(self, _env: &Env, _scope: &Scope) -> Result<Self, E> {
        Ok(self)
    }
}

impl<E, Env> Push for Utf8Decode<E, Env>
where
    E: Send,
    Env: Clone + Send + Sync,
{
    type In = u8;
    type Out = String;
    type Error = E;
    type Env = Env;

    async fn push(&mut self, _env: &Env, input: Input<u8>) -> Result<Chunk<String>, E> {
        Ok(match input {
            Input::Data(chunk) => self.decode(chunk),
            Input::Flush => self.flush(),
        })
    }
}
