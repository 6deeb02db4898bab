//! extra2/scan — lenient проход по сегменту для диагностики и legacy fallback.
//!
//! В отличие от reader'а ничего не валидирует сверх границ: на первой битой записи
//! просто останавливается, неизвестные важные теги не считаются ошибкой.

use super::raw::{RawRecord, RawRecords};

/// Все записи до первой неразбираемой.
pub fn scan_records(segment: &[u8]) -> Vec<RawRecord<'_>> {
    RawRecords::new(segment).map_while(Result::ok).collect()
}

/// Payload первой записи с кодом `code`.
pub fn find_tag(segment: &[u8], code: u8) -> Option<&[u8]> {
    RawRecords::new(segment)
        .map_while(Result::ok)
        .find(|r| r.code == code)
        .map(|r| r.payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::EXTRA2_DEFAULT_PART_ENGINE;

    #[test]
    fn finds_tag_past_important_unknown() {
        let seg = [200u8, 1, 0xFF, EXTRA2_DEFAULT_PART_ENGINE, 4, b'A', b'r', b'i', b'a'];
        assert_eq!(find_tag(&seg, EXTRA2_DEFAULT_PART_ENGINE), Some(&b"Aria"[..]));
        assert_eq!(scan_records(&seg).len(), 2);
    }

    #[test]
    fn stops_at_broken_record() {
        let seg = [3u8, 1, 0x01, EXTRA2_DEFAULT_PART_ENGINE, 0, 5, 0, b'x'];
        assert_eq!(scan_records(&seg).len(), 1);
        assert_eq!(find_tag(&seg, EXTRA2_DEFAULT_PART_ENGINE), None);
    }
}
