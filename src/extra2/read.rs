//! extra2/read — строгий декодер сегмента.
//!
//! Политика:
//! - неизвестный тег < 128 пропускается, >= 128 — `Incompatible`;
//! - каждое поле максимум один раз; заранее выставленная version не перезаписывается,
//!   но длина обязана совпасть;
//! - после последней записи курсор обязан стоять ровно на конце сегмента.

use log::debug;

use super::raw::{extra2_segment, RawRecords};
use super::tag::Extra2Record;
use super::Extra2Metadata;
use crate::error::{CodecError, Result};

impl Extra2Metadata {
    /// Декодировать сегмент extra2 из образа дескриптора (заголовок + сегмент + ...).
    pub fn read(image: &[u8]) -> Result<Self> {
        Self::read_with(image, Self::default())
    }

    /// То же, что `read`, поверх уже заполненных метаданных (обычно только version).
    pub fn read_with(image: &[u8], preset: Self) -> Result<Self> {
        let Some(segment) = extra2_segment(image)? else {
            debug!("extra2: old format marker, no segment");
            return Ok(preset);
        };
        Self::decode_segment(segment, preset)
    }

    /// Декодировать голый сегмент (без заголовка).
    pub fn decode_segment(segment: &[u8], preset: Self) -> Result<Self> {
        let mut meta = preset;
        let mut exact = meta.is_empty();
        let mut it = RawRecords::new(segment);

        for raw in it.by_ref() {
            let raw = raw?;
            match Extra2Record::decode(raw.code, raw.payload)? {
                Some(rec) => {
                    if !meta.apply(rec)? {
                        exact = false;
                    }
                }
                None => {
                    debug!(
                        "extra2: skipping informational tag {} ({} bytes) at {}",
                        raw.code,
                        raw.payload.len(),
                        raw.offset
                    );
                    exact = false;
                }
            }
        }

        if it.remaining() != 0 {
            return Err(CodecError::malformed(format!(
                "{} trailing bytes at offset {} of {}-byte segment",
                it.remaining(),
                it.position(),
                segment.len()
            )));
        }

        if exact {
            debug_assert_eq!(meta.store_size(), segment.len());
        }
        Ok(meta)
    }
}
