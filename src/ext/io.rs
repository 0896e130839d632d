//! Extensions for IO operations.
use std::io::*;

/// Extra integer readers for [Read] types. All multi-byte reads are
/// little-endian.
pub trait ReadExt {
    /// Reads a [u8] from the reader.
    fn read_u8(&mut self) -> Result<u8>;
    /// Reads a [u16] from the reader in little-endian order.
    fn read_u16(&mut self) -> Result<u16>;
    /// Reads a [u32] from the reader in little-endian order.
    fn read_u32(&mut self) -> Result<u32>;
    /// Reads an [i32] from the reader in little-endian order.
    fn read_i32(&mut self) -> Result<i32>;
}

impl<T: Read + ?Sized> ReadExt for T {
    fn read_u8(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    fn read_u16(&mut self) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    fn read_u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    fn read_i32(&mut self) -> Result<i32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(i32::from_le_bytes(buf))
    }
}

#[derive(Debug)]
/// A reader over a borrowed byte slice.
pub struct MemReaderRef<'a> {
    pub data: &'a [u8],
    pub pos: usize,
}

impl<'a> MemReaderRef<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        MemReaderRef { data, pos: 0 }
    }

    /// Number of bytes left to read.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.data.len()
    }
}

impl<'a> Read for MemReaderRef<'a> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let len = buf.len().min(self.remaining());
        buf[..len].copy_from_slice(&self.data[self.pos..self.pos + len]);
        self.pos += len;
        Ok(len)
    }
}
