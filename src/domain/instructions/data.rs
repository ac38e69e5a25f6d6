//! Little-endian codec for hand-encoded instruction payloads.
//!
//! Optional numbers are written as a presence byte followed by a fixed-width slot
//! that is always present and zero-filled when the value is absent.
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum InstructionDataError {
    #[error("Unexpected end of data: needed {needed} bytes at offset {offset}")]
    UnexpectedEnd { offset: usize, needed: usize },

    #[error("Invalid discriminator: expected {expected}, found {found}")]
    InvalidDiscriminator { expected: u8, found: u8 },

    #[error("Invalid boolean byte {0}")]
    InvalidBool(u8),

    #[error("{0} trailing bytes after payload")]
    TrailingBytes(usize),
}

#[derive(Debug, Default, Clone)]
pub struct InstructionDataWriter {
    buffer: Vec<u8>,
}

impl InstructionDataWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_discriminator(discriminator: u8) -> Self {
        let mut writer = Self::new();
        writer.write_u8(discriminator);
        writer
    }

    pub fn write_u8(&mut self, value: u8) -> &mut Self {
        self.buffer.push(value);
        self
    }

    pub fn write_bool(&mut self, value: bool) -> &mut Self {
        self.write_u8(u8::from(value))
    }

    pub fn write_u64(&mut self, value: u64) -> &mut Self {
        self.buffer.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// Presence byte, then an 8-byte value slot that is zero when absent.
    pub fn write_optional_u64_fixed(&mut self, value: Option<u64>) -> &mut Self {
        self.write_bool(value.is_some());
        self.write_u64(value.unwrap_or(0))
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }
}

#[derive(Debug)]
pub struct InstructionDataReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> InstructionDataReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn take(&mut self, needed: usize) -> Result<&'a [u8], InstructionDataError> {
        let end = self
            .offset
            .checked_add(needed)
            .filter(|end| *end <= self.data.len())
            .ok_or(InstructionDataError::UnexpectedEnd {
                offset: self.offset,
                needed,
            })?;
        let slice = &self.data[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], InstructionDataError> {
        let mut array = [0u8; N];
        array.copy_from_slice(self.take(N)?);
        Ok(array)
    }

    pub fn expect_discriminator(&mut self, expected: u8) -> Result<(), InstructionDataError> {
        let found = self.read_u8()?;
        if found != expected {
            return Err(InstructionDataError::InvalidDiscriminator { expected, found });
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8, InstructionDataError> {
        Ok(self.take_array::<1>()?[0])
    }

    pub fn read_bool(&mut self) -> Result<bool, InstructionDataError> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(InstructionDataError::InvalidBool(other)),
        }
    }

    pub fn read_u64(&mut self) -> Result<u64, InstructionDataError> {
        Ok(u64::from_le_bytes(self.take_array()?))
    }

    /// Reads a presence byte and an 8-byte slot. The slot is consumed even when absent.
    pub fn read_optional_u64_fixed(&mut self) -> Result<Option<u64>, InstructionDataError> {
        let present = self.read_bool()?;
        let value = self.read_u64()?;
        Ok(present.then_some(value))
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Fails if any bytes were left unread.
    pub fn finish(self) -> Result<(), InstructionDataError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(InstructionDataError::TrailingBytes(n)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_little_endian_layout() {
        let mut writer = InstructionDataWriter::with_discriminator(7);
        writer.write_u64(0x0102030405060708).write_bool(true);

        assert_eq!(
            writer.into_bytes(),
            vec![7, 0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01, 1]
        );
    }

    #[test]
    fn test_optional_u64_fixed_absent_is_zero_filled() {
        let mut writer = InstructionDataWriter::new();
        writer.write_optional_u64_fixed(None);

        assert_eq!(writer.into_bytes(), vec![0; 9]);
    }

    #[test]
    fn test_optional_u64_fixed_reads_back() {
        let mut writer = InstructionDataWriter::new();
        writer
            .write_optional_u64_fixed(Some(u64::MAX))
            .write_optional_u64_fixed(None);
        let bytes = writer.into_bytes();

        let mut reader = InstructionDataReader::new(&bytes);
        assert_eq!(reader.read_optional_u64_fixed(), Ok(Some(u64::MAX)));
        assert_eq!(reader.read_optional_u64_fixed(), Ok(None));
        assert_eq!(reader.finish(), Ok(()));
    }

    #[test]
    fn test_reader_rejects_truncated_data() {
        let mut reader = InstructionDataReader::new(&[1, 2, 3]);

        assert_eq!(
            reader.read_u64(),
            Err(InstructionDataError::UnexpectedEnd {
                offset: 0,
                needed: 8
            })
        );
    }

    #[test]
    fn test_reader_rejects_invalid_bool() {
        let mut reader = InstructionDataReader::new(&[2]);
        assert_eq!(reader.read_bool(), Err(InstructionDataError::InvalidBool(2)));
    }

    #[test]
    fn test_reader_reports_trailing_bytes() {
        let mut reader = InstructionDataReader::new(&[1, 0, 0]);
        reader.read_u8().unwrap();
        assert_eq!(reader.finish(), Err(InstructionDataError::TrailingBytes(2)));
    }
}
