//! header — фиксированный 64-байтовый заголовок дескриптора (LE, по смещениям).
//!
//! Формат (только то, что нужно sniffer'у):
//! [0]  0xFE, [1] 0x01, [2] frm_version (6..=11)     — либо "TYPE=VIEW\n" для view
//! [3]  legacy_db_type u8
//! [4]  extra2_len u16
//! [6]  record_offset u16
//! [14] record_offset_hi u16 (0xFFFF => настоящее смещение в [47] u32)
//! [16] reclength u16
//! [39] table_options u8 (нибл 0x30 — флаг sequence)
//! [47] record_offset_ext u32
//! [55] extra_name_len u32
//! [61] part_db_type u8
//! [64] extra2 (или '/' у старых файлов); [64]=0,[65]=16,[66..82] — tabledef version

use serde::{Serialize, Serializer};
use std::fmt;

use crate::consts::{
    EXTRA2_TABLEDEF_VERSION, FRM_HEADER_SIZE, FRM_MAGIC0, FRM_MAGIC1, FRM_VER, FRM_VER_CURRENT,
    OFF_EXTRA2, OFF_EXTRA2_LEN, OFF_EXTRA_NAME_LEN, OFF_FRM_VERSION, OFF_LEGACY_DB_TYPE,
    OFF_PART_DB_TYPE, OFF_RECLENGTH, OFF_RECORD_OFFSET, OFF_RECORD_OFFSET_EXT,
    OFF_RECORD_OFFSET_HI, OFF_TABLE_OPTIONS, RECORD_OFFSET_OVERFLOW, SEQUENCE_MASK, SEQUENCE_YES,
    UUID_SIZE, VIEW_MARKER,
};
use crate::cursor::ByteCursor;
use crate::error::Result;

/// Начинается ли образ с текстового маркера view.
pub fn is_view_header(buf: &[u8]) -> bool {
    buf.len() >= VIEW_MARKER.len() && &buf[..VIEW_MARKER.len()] == VIEW_MARKER
}

/// Бинарная сигнатура дескриптора таблицы.
pub fn is_binary_header(buf: &[u8]) -> bool {
    buf.len() > OFF_FRM_VERSION
        && buf[0] == FRM_MAGIC0
        && buf[1] == FRM_MAGIC1
        && (FRM_VER..=FRM_VER_CURRENT).contains(&buf[OFF_FRM_VERSION])
}

/// Поля фиксированного заголовка.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedHeader {
    pub frm_version: u8,
    pub legacy_db_type: u8,
    pub extra2_len: u16,
    pub record_offset_base: u16,
    pub record_offset_hi: u16,
    pub reclength: u16,
    pub table_options: u8,
    pub record_offset_ext: u32,
    pub extra_name_len: u32,
    pub part_db_type: u8,
}

impl FixedHeader {
    /// Разобрать заголовок. Сигнатуру не проверяет (см. `is_binary_header`).
    pub fn parse(buf: &[u8]) -> Result<Self> {
        let c = ByteCursor::new(buf);
        // весь заголовок должен быть на месте, даже если поле в конце не нужно
        c.slice_at(0, FRM_HEADER_SIZE)?;
        Ok(Self {
            frm_version: c.u8_at(OFF_FRM_VERSION)?,
            legacy_db_type: c.u8_at(OFF_LEGACY_DB_TYPE)?,
            extra2_len: c.u16_at(OFF_EXTRA2_LEN)?,
            record_offset_base: c.u16_at(OFF_RECORD_OFFSET)?,
            record_offset_hi: c.u16_at(OFF_RECORD_OFFSET_HI)?,
            reclength: c.u16_at(OFF_RECLENGTH)?,
            table_options: c.u8_at(OFF_TABLE_OPTIONS)?,
            record_offset_ext: c.u32_at(OFF_RECORD_OFFSET_EXT)?,
            extra_name_len: c.u32_at(OFF_EXTRA_NAME_LEN)?,
            part_db_type: c.u8_at(OFF_PART_DB_TYPE)?,
        })
    }

    #[inline]
    pub fn is_sequence(&self) -> bool {
        (self.table_options & SEQUENCE_MASK) == SEQUENCE_YES
    }

    /// Смещение записи значений по умолчанию (с учётом 0xFFFF-переполнения).
    pub fn record_offset(&self) -> u64 {
        let hi = if self.record_offset_hi == RECORD_OFFSET_OVERFLOW {
            self.record_offset_ext as u64
        } else {
            self.record_offset_hi as u64
        };
        self.record_offset_base as u64 + hi
    }

    /// Начало блока extra-данных за записью значений по умолчанию.
    pub fn extra_data_offset(&self) -> u64 {
        self.record_offset() + self.reclength as u64
    }
}

/// 16-байтовый идентификатор версии определения таблицы (UUID).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableVersion([u8; UUID_SIZE]);

impl TableVersion {
    pub fn from_bytes(bytes: [u8; UUID_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; UUID_SIZE] {
        &self.0
    }

    /// Версия сразу за заголовком: [64]=tag version, [65]=16, [66..82] — UUID.
    pub fn sniff(buf: &[u8]) -> Option<Self> {
        let c = ByteCursor::new(buf);
        if c.u8_at(OFF_EXTRA2).ok()? != EXTRA2_TABLEDEF_VERSION
            || c.u8_at(OFF_EXTRA2 + 1).ok()? as usize != UUID_SIZE
        {
            return None;
        }
        let bytes = c.slice_at(OFF_EXTRA2 + 2, UUID_SIZE).ok()?;
        Some(Self(bytes.try_into().ok()?))
    }
}

impl fmt::Display for TableVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.0.iter().enumerate() {
            if matches!(i, 4 | 6 | 8 | 10) {
                f.write_str("-")?;
            }
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl fmt::Debug for TableVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TableVersion({})", self)
    }
}

impl Serialize for TableVersion {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_header() -> Vec<u8> {
        let mut h = vec![0u8; FRM_HEADER_SIZE + 2 + UUID_SIZE];
        h[0] = FRM_MAGIC0;
        h[1] = FRM_MAGIC1;
        h[2] = 10;
        h
    }

    #[test]
    fn signature_checks() {
        let mut h = base_header();
        assert!(is_binary_header(&h));
        h[2] = 12;
        assert!(!is_binary_header(&h));
        h[2] = 5;
        assert!(!is_binary_header(&h));
        assert!(is_view_header(b"TYPE=VIEW\nquery=select 1"));
        assert!(!is_view_header(b"TYPE=VIEW"));
    }

    #[test]
    fn record_offset_overflow_indirection() {
        let mut h = base_header();
        h[6..8].copy_from_slice(&100u16.to_le_bytes());
        h[14..16].copy_from_slice(&0x20u16.to_le_bytes());
        h[16..18].copy_from_slice(&7u16.to_le_bytes());
        let fh = FixedHeader::parse(&h).unwrap();
        assert_eq!(fh.record_offset(), 132);
        assert_eq!(fh.extra_data_offset(), 139);

        h[14..16].copy_from_slice(&0xFFFFu16.to_le_bytes());
        h[47..51].copy_from_slice(&70_000u32.to_le_bytes());
        let fh = FixedHeader::parse(&h).unwrap();
        assert_eq!(fh.record_offset(), 70_100);
    }

    #[test]
    fn sequence_nibble() {
        let mut h = base_header();
        h[39] = 0x20 | 0x0F;
        assert!(FixedHeader::parse(&h).unwrap().is_sequence());
        h[39] = 0x10;
        assert!(!FixedHeader::parse(&h).unwrap().is_sequence());
        h[39] = 0x30;
        assert!(!FixedHeader::parse(&h).unwrap().is_sequence());
    }

    #[test]
    fn version_sniff_and_display() {
        let mut h = base_header();
        assert!(TableVersion::sniff(&h).is_none()); // [65]=0
        h[65] = 16;
        for i in 0..16 {
            h[66 + i] = i as u8;
        }
        let v = TableVersion::sniff(&h).unwrap();
        assert_eq!(v.to_string(), "00010203-0405-0607-0809-0a0b0c0d0e0f");
        h[64] = 1;
        assert!(TableVersion::sniff(&h).is_none());
        assert!(FixedHeader::parse(&h[..63]).is_err());
    }
}
