//! cursor — безопасное чтение LE-полей из буфера дескриптора.
//!
//! Любое чтение за границей буфера возвращает `CodecError::Truncated`, а не панику.
//! Абсолютные чтения (`u16_at` и т.п.) не двигают позицию.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{CodecError, Result};

/// Read-only курсор над срезом с отслеживанием позиции.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.ensure(n)?;
        self.pos += n;
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let v = self.u8_at(self.pos)?;
        self.pos += 1;
        Ok(v)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let v = self.u16_at(self.pos)?;
        self.pos += 2;
        Ok(v)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let v = self.u32_at(self.pos)?;
        self.pos += 4;
        Ok(v)
    }

    /// Заимствовать следующие `n` байт без копирования.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let s = self.slice_at(self.pos, n)?;
        self.pos += n;
        Ok(s)
    }

    pub fn u8_at(&self, off: usize) -> Result<u8> {
        Ok(self.slice_at(off, 1)?[0])
    }

    pub fn u16_at(&self, off: usize) -> Result<u16> {
        Ok(LittleEndian::read_u16(self.slice_at(off, 2)?))
    }

    pub fn u32_at(&self, off: usize) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.slice_at(off, 4)?))
    }

    pub fn slice_at(&self, off: usize, n: usize) -> Result<&'a [u8]> {
        match off.checked_add(n) {
            Some(end) if end <= self.buf.len() => Ok(&self.buf[off..end]),
            _ => Err(self.truncated(off, n)),
        }
    }

    #[inline]
    fn ensure(&self, n: usize) -> Result<()> {
        if n > self.remaining() {
            return Err(self.truncated(self.pos, n));
        }
        Ok(())
    }

    fn truncated(&self, offset: usize, need: usize) -> CodecError {
        CodecError::Truncated {
            offset,
            need,
            have: self.buf.len().saturating_sub(offset),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_little_endian_and_tracks_position() {
        let buf = [0x01, 0x34, 0x12, 0x78, 0x56, 0x34, 0x12];
        let mut c = ByteCursor::new(&buf);
        assert_eq!(c.read_u8().unwrap(), 1);
        assert_eq!(c.read_u16().unwrap(), 0x1234);
        assert_eq!(c.read_u32().unwrap(), 0x1234_5678);
        assert_eq!(c.remaining(), 0);
    }

    #[test]
    fn out_of_bounds_is_truncated_not_panic() {
        let buf = [0u8; 3];
        let mut c = ByteCursor::new(&buf);
        c.skip(2).unwrap();
        assert!(matches!(c.read_u16(), Err(CodecError::Truncated { offset: 2, need: 2, have: 1 })));
        // позиция не сдвинулась после ошибки
        assert_eq!(c.position(), 2);
        assert!(c.u32_at(usize::MAX - 1).is_err());
        assert!(c.skip(2).is_err());
        assert!(c.skip(1).is_ok());
    }
}
