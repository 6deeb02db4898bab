//! source — откуда sniffer берёт байты дескриптора.
//!
//! `ByteSource` — минимальный контракт: позиционное чтение и размер. Источник передаётся
//! в `classify` по значению, поэтому файл закрывается на любом пути выхода (Drop).

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

pub trait ByteSource {
    /// Прочитать ровно `len` байт с `offset`; короткое чтение — ошибка.
    fn read_exact_at(&mut self, offset: u64, len: usize) -> io::Result<Vec<u8>>;

    fn file_size(&mut self) -> io::Result<u64>;

    /// Весь образ целиком (для legacy fallback).
    fn read_all(&mut self) -> io::Result<Vec<u8>> {
        let size = self.file_size()?;
        let len = usize::try_from(size)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "image does not fit in memory"))?;
        self.read_exact_at(0, len)
    }
}

/// Дескриптор на диске.
#[derive(Debug)]
pub struct FileSource {
    file: File,
}

impl FileSource {
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().read(true).open(path)?;
        Ok(Self { file })
    }

    pub fn from_file(file: File) -> Self {
        Self { file }
    }
}

impl ByteSource for FileSource {
    fn read_exact_at(&mut self, offset: u64, len: usize) -> io::Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn file_size(&mut self) -> io::Result<u64> {
        Ok(self.file.metadata()?.len())
    }
}

/// Образ в памяти (тесты, уже прочитанные файлы).
#[derive(Debug, Clone, Copy)]
pub struct SliceSource<'a> {
    bytes: &'a [u8],
}

impl<'a> SliceSource<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }
}

impl ByteSource for SliceSource<'_> {
    fn read_exact_at(&mut self, offset: u64, len: usize) -> io::Result<Vec<u8>> {
        let start = usize::try_from(offset).unwrap_or(usize::MAX);
        match start.checked_add(len) {
            Some(end) if end <= self.bytes.len() => Ok(self.bytes[start..end].to_vec()),
            _ => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "read {} bytes at {} past end of {}-byte image",
                    len,
                    offset,
                    self.bytes.len()
                ),
            )),
        }
    }

    fn file_size(&mut self) -> io::Result<u64> {
        Ok(self.bytes.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_source_short_read_is_eof() {
        let data = [1u8, 2, 3, 4];
        let mut s = SliceSource::new(&data);
        assert_eq!(s.read_exact_at(1, 2).unwrap(), vec![2, 3]);
        let err = s.read_exact_at(3, 2).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert_eq!(s.read_all().unwrap(), data.to_vec());
    }
}
