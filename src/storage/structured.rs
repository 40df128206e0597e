//! Structured binary I/O with a running CRC32.
//!
//! Every byte written through a [`StructWriter`] feeds a CRC32 that is
//! appended by [`StructWriter::finish`]; a [`StructReader`] hashes the same
//! bytes on the way in and compares against the stored value.

use std::io::{ErrorKind, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use crc32fast::Hasher;

use crate::error::{BayesError, Result};
use crate::util::varint::{MAX_VARINT_LEN, decode_u64, encode_u64};

/// Map an I/O error on the read side, treating truncation as bad format.
fn read_error(error: std::io::Error) -> BayesError {
    if error.kind() == ErrorKind::UnexpectedEof {
        BayesError::format("unexpected end of data")
    } else {
        BayesError::Io(error)
    }
}

/// A structured writer for binary data.
pub struct StructWriter<W: Write> {
    writer: W,
    hasher: Hasher,
    position: u64,
}

impl<W: Write> StructWriter<W> {
    /// Create a new structured writer.
    pub fn new(writer: W) -> Self {
        StructWriter {
            writer,
            hasher: Hasher::new(),
            position: 0,
        }
    }

    /// Write a u32 value (little-endian).
    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.writer.write_u32::<LittleEndian>(value)?;
        self.update(&value.to_le_bytes());
        Ok(())
    }

    /// Write an i64 value (little-endian).
    pub fn write_i64(&mut self, value: i64) -> Result<()> {
        self.writer.write_i64::<LittleEndian>(value)?;
        self.update(&value.to_le_bytes());
        Ok(())
    }

    /// Write a variable-length integer.
    pub fn write_varint(&mut self, value: u64) -> Result<()> {
        self.write_raw(&encode_u64(value))
    }

    /// Write a string with length prefix.
    pub fn write_string(&mut self, value: &str) -> Result<()> {
        let bytes = value.as_bytes();
        self.write_varint(bytes.len() as u64)?;
        self.write_raw(bytes)
    }

    /// Write raw bytes without length prefix.
    pub fn write_raw(&mut self, value: &[u8]) -> Result<()> {
        self.writer.write_all(value)?;
        self.update(value);
        Ok(())
    }

    /// Number of bytes written so far, checksum excluded.
    pub fn position(&self) -> u64 {
        self.position
    }

    fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
        self.position += data.len() as u64;
    }

    /// Append the checksum, flush, and give the writer back.
    pub fn finish(mut self) -> Result<W> {
        let checksum = self.hasher.finalize();
        self.writer.write_u32::<LittleEndian>(checksum)?;
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// A structured reader for binary data.
pub struct StructReader<R: Read> {
    reader: R,
    hasher: Hasher,
    position: u64,
}

impl<R: Read> StructReader<R> {
    /// Create a new structured reader.
    pub fn new(reader: R) -> Self {
        StructReader {
            reader,
            hasher: Hasher::new(),
            position: 0,
        }
    }

    /// Read a u32 value (little-endian).
    pub fn read_u32(&mut self) -> Result<u32> {
        let value = self.reader.read_u32::<LittleEndian>().map_err(read_error)?;
        self.update(&value.to_le_bytes());
        Ok(value)
    }

    /// Read an i64 value (little-endian).
    pub fn read_i64(&mut self) -> Result<i64> {
        let value = self.reader.read_i64::<LittleEndian>().map_err(read_error)?;
        self.update(&value.to_le_bytes());
        Ok(value)
    }

    /// Read a variable-length integer.
    pub fn read_varint(&mut self) -> Result<u64> {
        let mut bytes = Vec::with_capacity(MAX_VARINT_LEN);
        loop {
            let byte = self.reader.read_u8().map_err(read_error)?;
            bytes.push(byte);
            if byte & 0x80 == 0 || bytes.len() > MAX_VARINT_LEN {
                break;
            }
        }

        let (value, _) = decode_u64(&bytes)?;
        self.update(&bytes);
        Ok(value)
    }

    /// Read a string with length prefix.
    pub fn read_string(&mut self) -> Result<String> {
        let length = self.read_varint()?;
        let bytes = self.read_raw(length)?;
        String::from_utf8(bytes).map_err(|e| BayesError::format(format!("Invalid UTF-8: {e}")))
    }

    /// Read exactly `length` raw bytes.
    ///
    /// The buffer grows with the data actually present, so a corrupt length
    /// prefix cannot trigger a huge allocation.
    pub fn read_raw(&mut self, length: u64) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        (&mut self.reader).take(length).read_to_end(&mut bytes)?;
        if bytes.len() as u64 != length {
            return Err(BayesError::format("unexpected end of data"));
        }
        self.update(&bytes);
        Ok(bytes)
    }

    /// Number of bytes consumed so far.
    pub fn position(&self) -> u64 {
        self.position
    }

    fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
        self.position += data.len() as u64;
    }

    /// Read the trailing checksum, compare it with the bytes consumed and
    /// require the input to end right after it.
    pub fn verify_checksum(mut self) -> Result<()> {
        let position = self.position();
        let computed = self.hasher.finalize();
        let stored = self.reader.read_u32::<LittleEndian>().map_err(read_error)?;
        if stored != computed {
            return Err(BayesError::format(format!(
                "checksum mismatch at byte {position}: stored {stored:#010x}, computed {computed:#010x}"
            )));
        }

        let mut extra = [0u8; 1];
        if self.reader.read(&mut extra)? != 0 {
            return Err(BayesError::format(format!(
                "trailing data after checksum at byte {}",
                position + 4
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<u8> {
        let mut writer = StructWriter::new(Vec::new());
        writer.write_u32(7).unwrap();
        writer.write_i64(-42).unwrap();
        writer.write_varint(300).unwrap();
        writer.write_string("héllo").unwrap();
        assert_eq!(writer.position(), 4 + 8 + 2 + 1 + 6);
        writer.finish().unwrap()
    }

    #[test]
    fn test_write_then_read() {
        let bytes = sample();
        let mut reader = StructReader::new(bytes.as_slice());
        assert_eq!(reader.read_u32().unwrap(), 7);
        assert_eq!(reader.read_i64().unwrap(), -42);
        assert_eq!(reader.read_varint().unwrap(), 300);
        assert_eq!(reader.read_string().unwrap(), "héllo");
        reader.verify_checksum().unwrap();
    }

    #[test]
    fn test_corruption_is_detected() {
        let mut bytes = sample();
        bytes[5] ^= 0xFF;
        let mut reader = StructReader::new(bytes.as_slice());
        reader.read_u32().unwrap();
        reader.read_i64().unwrap();
        reader.read_varint().unwrap();
        reader.read_string().unwrap();
        assert!(reader.verify_checksum().unwrap_err().is_format());
    }

    #[test]
    fn test_data_after_checksum_is_rejected() {
        let mut bytes = sample();
        bytes.extend_from_slice(b"GARBAGE");
        let mut reader = StructReader::new(bytes.as_slice());
        reader.read_u32().unwrap();
        reader.read_i64().unwrap();
        reader.read_varint().unwrap();
        reader.read_string().unwrap();

        let err = reader.verify_checksum().unwrap_err();
        assert!(err.is_format());
        assert!(err.to_string().contains("trailing data"));
    }

    #[test]
    fn test_truncation_is_a_format_error() {
        let bytes = sample();
        let mut reader = StructReader::new(&bytes[..10]);
        reader.read_u32().unwrap();
        assert!(reader.read_i64().unwrap_err().is_format());

        let mut writer = StructWriter::new(Vec::new());
        writer.write_varint(1_000_000).unwrap();
        let bytes = writer.finish().unwrap();
        let mut reader = StructReader::new(bytes.as_slice());
        assert!(reader.read_string().unwrap_err().is_format());
    }
}
