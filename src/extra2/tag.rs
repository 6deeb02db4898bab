//! extra2/tag — коды тегов и закрытое объединение типизированных записей.

use crate::consts::{
    EXTRA2_APPLICATION_TIME_PERIOD, EXTRA2_DEFAULT_PART_ENGINE, EXTRA2_ENGINE_IMPORTANT,
    EXTRA2_ENGINE_TABLEOPTS, EXTRA2_FIELD_DATA_TYPE_INFO, EXTRA2_FIELD_FLAGS, EXTRA2_GIS, EXTRA2_INDEX_FLAGS, EXTRA2_PERIOD_FOR_SYSTEM_TIME,
    EXTRA2_PERIOD_WITHOUT_OVERLAPS, EXTRA2_TABLEDEF_VERSION, FRM_FIELDNO_SIZE,
};
use crate::error::{CodecError, Result};

/// Известные теги сегмента extra2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Extra2Tag {
    TabledefVersion = EXTRA2_TABLEDEF_VERSION,
    DefaultPartEngine = EXTRA2_DEFAULT_PART_ENGINE,
    Gis = EXTRA2_GIS,
    ApplicationTimePeriod = EXTRA2_APPLICATION_TIME_PERIOD,
    PeriodForSystemTime = EXTRA2_PERIOD_FOR_SYSTEM_TIME,
    IndexFlags = EXTRA2_INDEX_FLAGS,
    EngineTableOpts = EXTRA2_ENGINE_TABLEOPTS,
    FieldFlags = EXTRA2_FIELD_FLAGS,
    FieldDataTypeInfo = EXTRA2_FIELD_DATA_TYPE_INFO,
    PeriodWithoutOverlaps = EXTRA2_PERIOD_WITHOUT_OVERLAPS,
}

impl Extra2Tag {
    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            EXTRA2_TABLEDEF_VERSION => Self::TabledefVersion,
            EXTRA2_DEFAULT_PART_ENGINE => Self::DefaultPartEngine,
            EXTRA2_GIS => Self::Gis,
            EXTRA2_APPLICATION_TIME_PERIOD => Self::ApplicationTimePeriod,
            EXTRA2_PERIOD_FOR_SYSTEM_TIME => Self::PeriodForSystemTime,
            EXTRA2_INDEX_FLAGS => Self::IndexFlags,
            EXTRA2_ENGINE_TABLEOPTS => Self::EngineTableOpts,
            EXTRA2_FIELD_FLAGS => Self::FieldFlags,
            EXTRA2_FIELD_DATA_TYPE_INFO => Self::FieldDataTypeInfo,
            EXTRA2_PERIOD_WITHOUT_OVERLAPS => Self::PeriodWithoutOverlaps,
            _ => return None,
        })
    }

    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::TabledefVersion => "tabledef_version",
            Self::DefaultPartEngine => "default_part_engine",
            Self::Gis => "gis",
            Self::ApplicationTimePeriod => "application_time_period",
            Self::PeriodForSystemTime => "period_for_system_time",
            Self::IndexFlags => "index_flags",
            Self::EngineTableOpts => "engine_table_options",
            Self::FieldFlags => "field_flags",
            Self::FieldDataTypeInfo => "field_data_type_info",
            Self::PeriodWithoutOverlaps => "period_without_overlaps",
        }
    }
}

/// Неизвестный тег с таким кодом нельзя молча пропустить.
#[inline]
pub fn is_important(code: u8) -> bool {
    code >= EXTRA2_ENGINE_IMPORTANT
}

/// Одна типизированная запись extra2; payload заимствован из сегмента или из метаданных.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extra2Record<'a> {
    Version(&'a [u8]),
    PartitionEngine(&'a str),
    EngineOptions(&'a [u8]),
    Gis(&'a [u8]),
    FieldDataTypeInfo(&'a [u8]),
    IndexFlags(&'a [u8]),
    SystemPeriod(&'a [u8]),
    ApplicationPeriod(&'a [u8]),
    PeriodWithoutOverlaps(&'a [u8]),
    FieldFlags(&'a [u8]),
}

impl<'a> Extra2Record<'a> {
    /// Типизировать сырую запись.
    ///
    /// `Ok(None)` — неизвестный информационный тег (пропускается);
    /// неизвестный важный тег — `Incompatible`.
    pub fn decode(code: u8, payload: &'a [u8]) -> Result<Option<Self>> {
        if payload.is_empty() {
            return Err(CodecError::malformed(format!("tag {} has empty payload", code)));
        }
        let Some(tag) = Extra2Tag::from_code(code) else {
            if is_important(code) {
                return Err(CodecError::Incompatible(code));
            }
            return Ok(None);
        };
        let rec = match tag {
            Extra2Tag::TabledefVersion => Self::Version(payload),
            Extra2Tag::DefaultPartEngine => {
                let s = std::str::from_utf8(payload).map_err(|e| {
                    CodecError::malformed(format!("partition engine is not UTF-8: {}", e))
                })?;
                Self::PartitionEngine(s)
            }
            Extra2Tag::EngineTableOpts => Self::EngineOptions(payload),
            Extra2Tag::Gis => Self::Gis(payload),
            Extra2Tag::FieldDataTypeInfo => Self::FieldDataTypeInfo(payload),
            Extra2Tag::IndexFlags => Self::IndexFlags(payload),
            Extra2Tag::PeriodForSystemTime => {
                if payload.len() != 2 * FRM_FIELDNO_SIZE {
                    return Err(CodecError::malformed(format!(
                        "system period is {} bytes (expected {})",
                        payload.len(),
                        2 * FRM_FIELDNO_SIZE
                    )));
                }
                Self::SystemPeriod(payload)
            }
            Extra2Tag::ApplicationTimePeriod => Self::ApplicationPeriod(payload),
            Extra2Tag::PeriodWithoutOverlaps => Self::PeriodWithoutOverlaps(payload),
            Extra2Tag::FieldFlags => Self::FieldFlags(payload),
        };
        Ok(Some(rec))
    }

    pub fn tag(&self) -> Extra2Tag {
        match self {
            Self::Version(_) => Extra2Tag::TabledefVersion,
            Self::PartitionEngine(_) => Extra2Tag::DefaultPartEngine,
            Self::EngineOptions(_) => Extra2Tag::EngineTableOpts,
            Self::Gis(_) => Extra2Tag::Gis,
            Self::FieldDataTypeInfo(_) => Extra2Tag::FieldDataTypeInfo,
            Self::IndexFlags(_) => Extra2Tag::IndexFlags,
            Self::SystemPeriod(_) => Extra2Tag::PeriodForSystemTime,
            Self::ApplicationPeriod(_) => Extra2Tag::ApplicationTimePeriod,
            Self::PeriodWithoutOverlaps(_) => Extra2Tag::PeriodWithoutOverlaps,
            Self::FieldFlags(_) => Extra2Tag::FieldFlags,
        }
    }

    pub fn payload(&self) -> &'a [u8] {
        match *self {
            Self::PartitionEngine(s) => s.as_bytes(),
            Self::Version(p)
            | Self::EngineOptions(p)
            | Self::Gis(p)
            | Self::FieldDataTypeInfo(p)
            | Self::IndexFlags(p)
            | Self::SystemPeriod(p)
            | Self::ApplicationPeriod(p)
            | Self::PeriodWithoutOverlaps(p)
            | Self::FieldFlags(p) => p,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_roundtrip_through_enum() {
        for code in 0u8..=255 {
            if let Some(t) = Extra2Tag::from_code(code) {
                assert_eq!(t.code(), code);
            }
        }
        assert_eq!(Extra2Tag::from_code(6), None);
        assert_eq!(Extra2Tag::EngineTableOpts.code(), 128);
        // маркер старого формата не пересекается с кодом version
        assert_ne!(Extra2Tag::TabledefVersion.code(), b'/');
    }

    #[test]
    fn decode_applies_importance_gate() {
        assert_eq!(Extra2Record::decode(77, b"x").unwrap(), None);
        assert!(matches!(Extra2Record::decode(200, b"x"), Err(CodecError::Incompatible(200))));
        assert!(matches!(Extra2Record::decode(0, b""), Err(CodecError::Malformed(_))));
    }

    #[test]
    fn system_period_width_is_checked() {
        assert!(Extra2Record::decode(EXTRA2_PERIOD_FOR_SYSTEM_TIME, &[1, 0, 2, 0]).is_ok());
        assert!(Extra2Record::decode(EXTRA2_PERIOD_FOR_SYSTEM_TIME, &[1, 0, 2]).is_err());
    }
}
