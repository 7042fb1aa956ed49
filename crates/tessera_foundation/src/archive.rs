//! Binary archive framing.
//!
//! Archives are a flat little-endian byte stream:
//!
//! ```text
//! u32                   scalar
//! u32 len, len × u32    entity / index sequence
//! u32 len, len × u8     UTF-8 string
//! MessagePack value     component payload (self-delimiting)
//! ```
//!
//! Component payloads go through `rmp-serde`, so any type deriving
//! `serde::Serialize` and `serde::Deserialize` has a binary contract for free.
//! Every length prefix is validated against a limit before anything is
//! allocated.

use std::io::{self, Read, Write};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::entity::Entity;
use crate::error::{Error, ErrorKind, Result};

/// Default upper bound for any length prefix read from an archive.
pub const DEFAULT_MAX_SEQUENCE_LEN: usize = 1 << 24;

/// Upper bound on elements reserved up front while reading a sequence.
const PREALLOCATE_LIMIT: usize = 4096;

/// Writes archive primitives to an underlying [`Write`].
#[derive(Debug)]
pub struct BinaryWriter<W: Write> {
    inner: W,
    bytes_written: usize,
}

impl<W: Write> BinaryWriter<W> {
    /// Wraps a writer.
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            bytes_written: 0,
        }
    }

    /// Returns the number of bytes written so far.
    #[must_use]
    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    /// Unwraps the underlying writer.
    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Writes a little-endian `u32`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Writes a length as a `u32` prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the length does not fit in 32 bits or the writer fails.
    pub fn write_len(&mut self, what: &'static str, len: usize) -> Result<()> {
        let len = u32::try_from(len).map_err(|_| {
            Error::new(ErrorKind::SequenceTooLong {
                what,
                length: len,
                limit: u32::MAX as usize,
            })
        })?;
        self.write_u32(len)
    }

    /// Writes a length-prefixed entity sequence.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn write_entities(&mut self, entities: &[Entity]) -> Result<()> {
        self.write_len("entity", entities.len())?;
        for entity in entities {
            self.write_u32(entity.raw())?;
        }
        Ok(())
    }

    /// Writes a length-prefixed `u32` index sequence.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn write_indices(&mut self, indices: &[u32]) -> Result<()> {
        self.write_len("index", indices.len())?;
        for index in indices {
            self.write_u32(*index)?;
        }
        Ok(())
    }

    /// Writes a length-prefixed UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn write_str(&mut self, value: &str) -> Result<()> {
        self.write_len("string", value.len())?;
        self.write_bytes(value.as_bytes())
    }

    /// Writes one value as MessagePack with named struct fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be encoded.
    pub fn write_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        let bytes = rmp_serde::to_vec_named(value).map_err(|e| Error::codec(e.to_string()))?;
        self.write_bytes(&bytes)
    }

    /// Flushes the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn flush(&mut self) -> Result<()> {
        self.inner
            .flush()
            .map_err(|e| Error::io(format!("failed to flush archive: {e}")))
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner
            .write_all(bytes)
            .map_err(|e| Error::io(format!("failed to write archive: {e}")))?;
        self.bytes_written += bytes.len();
        Ok(())
    }
}

/// Reads archive primitives from an underlying [`Read`].
#[derive(Debug)]
pub struct BinaryReader<R: Read> {
    inner: R,
    max_sequence_len: usize,
}

impl<R: Read> BinaryReader<R> {
    /// Wraps a reader with the default sequence limit.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            max_sequence_len: DEFAULT_MAX_SEQUENCE_LEN,
        }
    }

    /// Sets the maximum accepted length prefix.
    #[must_use]
    pub fn with_max_sequence_len(mut self, limit: usize) -> Self {
        self.max_sequence_len = limit;
        self
    }

    /// Returns the maximum accepted length prefix.
    #[must_use]
    pub fn max_sequence_len(&self) -> usize {
        self.max_sequence_len
    }

    /// Unwraps the underlying reader.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Reads a little-endian `u32`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Truncated`] if fewer than four bytes remain.
    pub fn read_u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.read_bytes(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Reads a `u32` length prefix and validates it against the limit.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::SequenceTooLong`] if the prefix exceeds the limit.
    pub fn read_len(&mut self, what: &'static str) -> Result<usize> {
        let length = self.read_u32()? as usize;
        if length > self.max_sequence_len {
            return Err(Error::new(ErrorKind::SequenceTooLong {
                what,
                length,
                limit: self.max_sequence_len,
            }));
        }
        Ok(length)
    }

    /// Reads a length-prefixed entity sequence.
    ///
    /// # Errors
    ///
    /// Returns an error if the sequence is truncated or too long.
    pub fn read_entities(&mut self) -> Result<Vec<Entity>> {
        let len = self.read_len("entity")?;
        let mut entities = Vec::with_capacity(len.min(PREALLOCATE_LIMIT));
        for _ in 0..len {
            entities.push(Entity::from_raw(self.read_u32()?));
        }
        Ok(entities)
    }

    /// Reads a length-prefixed `u32` index sequence.
    ///
    /// # Errors
    ///
    /// Returns an error if the sequence is truncated or too long.
    pub fn read_indices(&mut self) -> Result<Vec<u32>> {
        let len = self.read_len("index")?;
        let mut indices = Vec::with_capacity(len.min(PREALLOCATE_LIMIT));
        for _ in 0..len {
            indices.push(self.read_u32()?);
        }
        Ok(indices)
    }

    /// Reads a length-prefixed UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is truncated, too long, or not UTF-8.
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_len("string")?;
        let mut buf = vec![0u8; len];
        self.read_bytes(&mut buf)?;
        String::from_utf8(buf).map_err(|e| Error::codec(format!("invalid UTF-8 string: {e}")))
    }

    /// Reads one MessagePack value.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Truncated`] if the archive ends mid-value,
    /// or [`ErrorKind::Codec`] if the bytes do not decode as `T`.
    pub fn read_value<T: DeserializeOwned>(&mut self) -> Result<T> {
        rmp_serde::from_read(&mut self.inner).map_err(|e| match e {
            rmp_serde::decode::Error::InvalidMarkerRead(ref source)
            | rmp_serde::decode::Error::InvalidDataRead(ref source)
                if source.kind() == io::ErrorKind::UnexpectedEof =>
            {
                Error::truncated(1, 0).with_context("MessagePack value")
            }
            other => Error::codec(other.to_string()),
        })
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => return Err(Error::truncated(buf.len(), filled)),
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(Error::io(format!("failed to read archive: {e}"))),
            }
        }
        Ok(())
    }
}
