//! legacy — имя движка из старой раскладки, когда id движка динамический.
//!
//! Смещения вычисляются из полей заголовка:
//!   extra = record_offset + reclength
//!   [extra .. extra + extra_name_len): [connect_len u16][connect][name_len u16][name]...
//! Всё, что не доказуемо лежит внутри образа, — `Truncated` (fail closed).

use crate::consts::{EXTRA2_DEFAULT_PART_ENGINE, NAME_CHAR_LEN};
use crate::cursor::ByteCursor;
use crate::engine::EngineName;
use crate::error::{CodecError, Result};
use crate::extra2::{extra2_segment, find_tag};
use crate::header::FixedHeader;

/// Имя движка из блока extra-данных за записью значений по умолчанию.
///
/// `Ok(None)` — блок пуст, после connect string нет места под имя, либо имя длиннее
/// `NAME_CHAR_LEN`.
pub fn engine_name_from_image(image: &[u8], hdr: &FixedHeader) -> Result<Option<EngineName>> {
    if hdr.extra_name_len == 0 {
        return Ok(None);
    }
    let start = hdr.extra_data_offset();
    let end = start + hdr.extra_name_len as u64;
    if end > image.len() as u64 {
        return Err(CodecError::Truncated {
            offset: usize::try_from(start).unwrap_or(usize::MAX),
            need: hdr.extra_name_len as usize,
            have: image.len().saturating_sub(usize::try_from(start).unwrap_or(usize::MAX)),
        });
    }
    let window = &image[start as usize..end as usize];
    let mut c = ByteCursor::new(window);

    let connect_len = c.read_u16()? as usize;
    c.skip(connect_len)?;
    if c.remaining() <= 2 {
        return Ok(None);
    }
    let len = c.read_u16()? as usize;
    if len > NAME_CHAR_LEN {
        return Ok(None);
    }
    let name = c.read_bytes(len)?;
    EngineName::from_bytes(name).map(Some)
}

/// Движок партиций из extra2 (lenient-скан, как для битых файлов).
pub fn partition_engine_from_image(image: &[u8]) -> Result<Option<EngineName>> {
    let Some(segment) = extra2_segment(image)? else {
        return Ok(None);
    };
    match find_tag(segment, EXTRA2_DEFAULT_PART_ENGINE) {
        Some(p) => EngineName::from_bytes(p).map(Some),
        None => Ok(None),
    }
}
