//! extra2 — расширяемый tagged-сегмент, следующий за фиксированным заголовком.
//!
//! Разделение по подмодулям:
//! - tag.rs   — коды тегов и типизированное объединение `Extra2Record`.
//! - raw.rs   — проход по сырым записям и выделение сегмента из образа.
//! - read.rs  — строгий декодер в `Extra2Metadata`.
//! - write.rs — канонический энкодер.
//! - scan.rs  — lenient-сканер (поиск тега в повреждённых файлах).
//!
//! Инвариант: `store_size()` — чистая функция набора полей, и ровно столько байт
//! потребляет reader и выдаёт writer.

pub mod raw;
pub mod read;
pub mod scan;
pub mod tag;
pub mod write;

pub use raw::{extra2_segment, record_size, RawRecord, RawRecords};
pub use scan::{find_tag, scan_records};
pub use tag::{is_important, Extra2Record, Extra2Tag};

use crate::consts::UUID_SIZE;
use crate::error::{CodecError, Result};
use crate::header::TableVersion;

/// Decoded extra2 segment. Every field appears at most once; payloads are owned copies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extra2Metadata {
    pub version: Option<Vec<u8>>,
    pub partition_engine: Option<String>,
    pub engine_options: Option<Vec<u8>>,
    pub gis: Option<Vec<u8>>,
    pub field_data_type_info: Option<Vec<u8>>,
    pub index_flags: Option<Vec<u8>>,
    pub system_period: Option<Vec<u8>>,
    pub application_period: Option<Vec<u8>>,
    pub period_without_overlaps: Option<Vec<u8>>,
    pub field_flags: Option<Vec<u8>>,
}

impl Extra2Metadata {
    /// Метаданные с заранее выставленной версией (как при создании таблицы из SQL).
    pub fn with_version(version: impl Into<Vec<u8>>) -> Self {
        Self {
            version: Some(version.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    /// Присутствующие поля в каноническом порядке записи.
    pub fn records(&self) -> Vec<Extra2Record<'_>> {
        let mut out = Vec::with_capacity(10);
        if let Some(v) = &self.version {
            out.push(Extra2Record::Version(v));
        }
        if let Some(e) = &self.partition_engine {
            out.push(Extra2Record::PartitionEngine(e));
        }
        if let Some(v) = &self.engine_options {
            out.push(Extra2Record::EngineOptions(v));
        }
        if let Some(v) = &self.gis {
            out.push(Extra2Record::Gis(v));
        }
        if let Some(v) = &self.field_data_type_info {
            out.push(Extra2Record::FieldDataTypeInfo(v));
        }
        if let Some(v) = &self.index_flags {
            out.push(Extra2Record::IndexFlags(v));
        }
        if let Some(v) = &self.system_period {
            out.push(Extra2Record::SystemPeriod(v));
        }
        if let Some(v) = &self.application_period {
            out.push(Extra2Record::ApplicationPeriod(v));
        }
        if let Some(v) = &self.period_without_overlaps {
            out.push(Extra2Record::PeriodWithoutOverlaps(v));
        }
        if let Some(v) = &self.field_flags {
            out.push(Extra2Record::FieldFlags(v));
        }
        out
    }

    /// Размер сериализованного сегмента.
    pub fn store_size(&self) -> usize {
        self.records()
            .iter()
            .map(|r| record_size(r.payload().len()))
            .sum()
    }

    /// Версия как UUID, если её длина равна 16.
    pub fn table_version(&self) -> Option<TableVersion> {
        let v = self.version.as_deref()?;
        let bytes: [u8; UUID_SIZE] = v.try_into().ok()?;
        Some(TableVersion::from_bytes(bytes))
    }

    /// Положить типизированную запись в соответствующее поле.
    ///
    /// Возвращает `false`, если запись не изменила метаданные (повтор version той же длины).
    pub fn apply(&mut self, rec: Extra2Record<'_>) -> Result<bool> {
        match rec {
            Extra2Record::Version(p) => {
                if let Some(existing) = &self.version {
                    if existing.len() != p.len() {
                        return Err(CodecError::malformed(format!(
                            "tabledef version is {} bytes, already have {}",
                            p.len(),
                            existing.len()
                        )));
                    }
                    return Ok(false);
                }
                self.version = Some(p.to_vec());
            }
            Extra2Record::PartitionEngine(s) => {
                if self.partition_engine.is_some() {
                    return Err(duplicate(rec.tag()));
                }
                self.partition_engine = Some(s.to_string());
            }
            Extra2Record::EngineOptions(p) => set_once(&mut self.engine_options, rec.tag(), p)?,
            Extra2Record::Gis(p) => set_once(&mut self.gis, rec.tag(), p)?,
            Extra2Record::FieldDataTypeInfo(p) => {
                set_once(&mut self.field_data_type_info, rec.tag(), p)?
            }
            Extra2Record::IndexFlags(p) => set_once(&mut self.index_flags, rec.tag(), p)?,
            Extra2Record::SystemPeriod(p) => set_once(&mut self.system_period, rec.tag(), p)?,
            Extra2Record::ApplicationPeriod(p) => {
                set_once(&mut self.application_period, rec.tag(), p)?
            }
            Extra2Record::PeriodWithoutOverlaps(p) => {
                set_once(&mut self.period_without_overlaps, rec.tag(), p)?
            }
            Extra2Record::FieldFlags(p) => set_once(&mut self.field_flags, rec.tag(), p)?,
        }
        Ok(true)
    }
}

fn set_once(slot: &mut Option<Vec<u8>>, tag: Extra2Tag, payload: &[u8]) -> Result<()> {
    if slot.is_some() {
        return Err(duplicate(tag));
    }
    *slot = Some(payload.to_vec());
    Ok(())
}

fn duplicate(tag: Extra2Tag) -> CodecError {
    CodecError::malformed(format!("duplicate {} record", tag.name()))
}
