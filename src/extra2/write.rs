//! extra2/write — канонический энкодер сегмента.
//!
//! Порядок записей фиксирован (см. `Extra2Metadata::records`); reader принимает любой.
//! Длина < 256 — один байт, иначе [0][u16 LE].

use byteorder::{ByteOrder, LittleEndian};

use super::tag::Extra2Record;
use super::Extra2Metadata;
use crate::consts::{
    EXTRA2_LONG_LEN_MIN, EXTRA2_MAX_SIZE, FRM_FIELDNO_SIZE, FRM_HEADER_SIZE, OFF_EXTRA2_LEN,
};
use crate::error::{CodecError, Result};

impl Extra2Metadata {
    /// Дописать сегмент в конец `out`. Возвращает число записанных байт (== store_size()).
    pub fn encode(&self, out: &mut Vec<u8>) -> Result<usize> {
        let size = self.checked_store_size()?;
        let start = out.len();
        out.reserve(size);
        for rec in self.records() {
            put_record(out, &rec);
        }
        let written = out.len() - start;
        debug_assert_eq!(written, size, "extra2 writer disagrees with store_size()");
        Ok(written)
    }

    /// Записать сегмент в образ сразу за фиксированным заголовком.
    ///
    /// Возвращает записанный срез `image[64..64 + store_size()]`. Поле длины в заголовке
    /// не трогается (см. `write_image`).
    pub fn write<'b>(&self, image: &'b mut [u8]) -> Result<&'b mut [u8]> {
        let size = self.checked_store_size()?;
        let need = FRM_HEADER_SIZE + size;
        if image.len() < need {
            return Err(CodecError::BufferTooSmall {
                need,
                have: image.len(),
            });
        }
        let mut buf = Vec::with_capacity(size);
        self.encode(&mut buf)?;
        let dst = &mut image[FRM_HEADER_SIZE..need];
        dst.copy_from_slice(&buf);
        Ok(dst)
    }

    /// `write` + сохранить длину сегмента по смещению 4. Возвращает длину сегмента.
    pub fn write_image(&self, image: &mut [u8]) -> Result<usize> {
        let size = self.write(image)?.len();
        LittleEndian::write_u16(&mut image[OFF_EXTRA2_LEN..OFF_EXTRA2_LEN + 2], size as u16);
        Ok(size)
    }

    fn checked_store_size(&self) -> Result<usize> {
        for rec in self.records() {
            if rec.payload().is_empty() {
                return Err(CodecError::malformed(format!(
                    "{} has empty payload",
                    rec.tag().name()
                )));
            }
        }
        // reader принимает только пару номеров полей
        if let Some(p) = &self.system_period {
            if p.len() != 2 * FRM_FIELDNO_SIZE {
                return Err(CodecError::malformed(format!(
                    "system period is {} bytes (expected {})",
                    p.len(),
                    2 * FRM_FIELDNO_SIZE
                )));
            }
        }
        let size = self.store_size();
        if size > EXTRA2_MAX_SIZE {
            return Err(CodecError::SegmentTooLarge {
                size,
                max: EXTRA2_MAX_SIZE,
            });
        }
        Ok(size)
    }
}

fn put_record(out: &mut Vec<u8>, rec: &Extra2Record<'_>) {
    let payload = rec.payload();
    out.push(rec.tag().code());
    if payload.len() < EXTRA2_LONG_LEN_MIN {
        out.push(payload.len() as u8);
    } else {
        let mut len = [0u8; 2];
        LittleEndian::write_u16(&mut len, payload.len() as u16);
        out.push(0);
        out.extend_from_slice(&len);
    }
    out.extend_from_slice(payload);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{EXTRA2_ENGINE_TABLEOPTS, EXTRA2_TABLEDEF_VERSION};

    #[test]
    fn canonical_order_and_length_forms() {
        let m = Extra2Metadata {
            engine_options: Some(vec![0xEE; 300]),
            version: Some(vec![0xAB; 16]),
            ..Extra2Metadata::default()
        };
        let mut out = Vec::new();
        let n = m.encode(&mut out).unwrap();
        assert_eq!(n, m.store_size());
        assert_eq!(out[0], EXTRA2_TABLEDEF_VERSION);
        assert_eq!(out[1], 16);
        assert_eq!(out[18], EXTRA2_ENGINE_TABLEOPTS);
        assert_eq!(&out[19..22], &[0, 0x2C, 0x01]);
        assert_eq!(out.len(), 18 + 4 + 300);
    }

    #[test]
    fn write_lands_after_header_and_checks_room() {
        let m = Extra2Metadata::with_version(vec![1u8; 16]);
        let mut small = vec![0u8; 70];
        assert!(matches!(m.write(&mut small), Err(CodecError::BufferTooSmall { need: 82, have: 70 })));

        let mut image = vec![0u8; 100];
        let n = m.write_image(&mut image).unwrap();
        assert_eq!(n, 18);
        assert_eq!(u16::from_le_bytes([image[4], image[5]]), 18);
        assert_eq!(&image[64..66], &[0, 16]);
        assert_eq!(Extra2Metadata::read(&image).unwrap(), m);
    }

    #[test]
    fn empty_payload_and_oversize_rejected() {
        let m = Extra2Metadata {
            gis: Some(Vec::new()),
            ..Extra2Metadata::default()
        };
        assert!(matches!(m.encode(&mut Vec::new()), Err(CodecError::Malformed(_))));

        let m = Extra2Metadata {
            field_flags: Some(vec![0u8; EXTRA2_MAX_SIZE]),
            ..Extra2Metadata::default()
        };
        assert!(matches!(m.encode(&mut Vec::new()), Err(CodecError::SegmentTooLarge { .. })));
    }
}
