//! extra2/raw — нетипизированный проход по записям [tag u8][len u8 | 0,len u16][payload].
//!
//! Общий для строгого reader'а и для lenient-сканера. Итератор останавливается, когда
//! до конца сегмента осталось меньше 3 байт; остаток проверяет вызывающий код.

use crate::consts::{EXTRA2_LONG_LEN_MIN, FRM_HEADER_SIZE, OFF_EXTRA2, OFF_EXTRA2_LEN, OLD_FORMAT_MARKER};
use crate::cursor::ByteCursor;
use crate::error::{CodecError, Result};

/// Минимальная запись: tag + len + 1 байт payload.
pub const MIN_RECORD_SIZE: usize = 3;

/// Запись как она лежит на диске.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRecord<'a> {
    pub code: u8,
    /// Смещение записи относительно начала сегмента.
    pub offset: usize,
    pub payload: &'a [u8],
}

impl RawRecord<'_> {
    /// Размер записи вместе с заголовком.
    pub fn encoded_len(&self) -> usize {
        record_size(self.payload.len())
    }
}

/// Сколько байт займёт запись с payload длины `len`.
#[inline]
pub fn record_size(len: usize) -> usize {
    let len_bytes = if len >= EXTRA2_LONG_LEN_MIN { 3 } else { 1 };
    1 + len_bytes + len
}

/// Выделить сегмент extra2 из образа дескриптора.
///
/// - `Ok(None)` — старый формат ('/' в первом байте сегмента).
/// - `Truncated` — объявленная длина не помещается в образ.
pub fn extra2_segment(image: &[u8]) -> Result<Option<&[u8]>> {
    let c = ByteCursor::new(image);
    let declared = c.u16_at(OFF_EXTRA2_LEN)? as usize;
    if image.len() < FRM_HEADER_SIZE + declared {
        return Err(CodecError::Truncated {
            offset: OFF_EXTRA2,
            need: declared,
            have: image.len().saturating_sub(OFF_EXTRA2),
        });
    }
    if image.get(OFF_EXTRA2) == Some(&OLD_FORMAT_MARKER) {
        return Ok(None);
    }
    Ok(Some(&image[OFF_EXTRA2..OFF_EXTRA2 + declared]))
}

/// Итератор записей сегмента.
#[derive(Debug, Clone)]
pub struct RawRecords<'a> {
    cur: ByteCursor<'a>,
    failed: bool,
}

impl<'a> RawRecords<'a> {
    pub fn new(segment: &'a [u8]) -> Self {
        Self {
            cur: ByteCursor::new(segment),
            failed: false,
        }
    }

    /// Позиция курсора внутри сегмента.
    pub fn position(&self) -> usize {
        self.cur.position()
    }

    /// Байт, не покрытых ни одной записью.
    pub fn remaining(&self) -> usize {
        self.cur.remaining()
    }

    fn next_record(&mut self) -> Result<RawRecord<'a>> {
        let offset = self.cur.position();
        let code = self.cur.read_u8()?;
        let mut len = self.cur.read_u8()? as usize;
        if len == 0 {
            // расширенная длина: [0][u16 LE], только для len >= 256
            if self.cur.remaining() < 2 {
                return Err(CodecError::Truncated {
                    offset: self.cur.position(),
                    need: 2,
                    have: self.cur.remaining(),
                });
            }
            len = self.cur.read_u16()? as usize;
            if len < EXTRA2_LONG_LEN_MIN {
                return Err(CodecError::malformed(format!(
                    "tag {} at {}: extended length {} < {}",
                    code, offset, len, EXTRA2_LONG_LEN_MIN
                )));
            }
        }
        let payload = self.cur.read_bytes(len)?;
        Ok(RawRecord {
            code,
            offset,
            payload,
        })
    }
}

impl<'a> Iterator for RawRecords<'a> {
    type Item = Result<RawRecord<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.cur.remaining() < MIN_RECORD_SIZE {
            return None;
        }
        let r = self.next_record();
        self.failed = r.is_err();
        Some(r)
    }
}
