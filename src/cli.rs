//! cli — операторские команды поверх кодека: inspect / extra2 / rewrite.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::classify::{Classification, Sniffer, TableKind, Want};
use crate::config::SnifferConfig;
use crate::engine::{EngineName, EngineRegistry};
use crate::extra2::{extra2_segment, is_important, scan_records, Extra2Metadata, Extra2Tag};
use crate::header::TableVersion;
use crate::source::{ByteSource, FileSource};
use crate::util::{display_text, hex_dump, hex_preview};

const PREVIEW_BYTES: usize = 32;

#[derive(Parser, Debug)]
#[command(
    name = "frmdef",
    version,
    about = "Inspect table-definition descriptors and their extra2 segment",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Тип объекта, движок, версия и поля extra2.
    Inspect {
        #[arg(long)]
        path: PathBuf,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Сырые записи extra2 (lenient-скан).
    Extra2 {
        #[arg(long)]
        path: PathBuf,
        #[arg(long, default_value_t = false)]
        json: bool,
        /// Полный hex payload вместо превью.
        #[arg(long, default_value_t = false)]
        dump: bool,
    },
    /// Перекодировать extra2 в канонический порядок и записать копию файла.
    Rewrite {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let cfg = SnifferConfig::from_env();
    info!("sniffer config: {}", cfg);

    match cli.cmd {
        Cmd::Inspect { path, json } => cmd_inspect(&path, json, cfg),
        Cmd::Extra2 { path, json, dump } => cmd_extra2(&path, json, dump, &cfg),
        Cmd::Rewrite { path, out } => cmd_rewrite(&path, &out, &cfg),
    }
}

// ---------------- inspect ----------------

#[derive(Serialize)]
struct FieldReport {
    tag: &'static str,
    code: u8,
    len: usize,
    hex: String,
}

#[derive(Serialize)]
struct InspectReport {
    path: String,
    kind: TableKind,
    legacy_db_type: Option<u8>,
    engine: Option<EngineName>,
    partition_engine: Option<EngineName>,
    version: Option<TableVersion>,
    extra2: Option<Vec<FieldReport>>,
    engine_error: Option<String>,
    metadata_error: Option<String>,
}

impl InspectReport {
    fn new(path: &Path, c: Classification) -> Self {
        let extra2 = c.metadata.as_ref().map(fields_of);
        Self {
            path: path.display().to_string(),
            kind: c.kind,
            legacy_db_type: c.legacy_db_type,
            engine: c.engine,
            partition_engine: c.partition_engine,
            version: c.version,
            extra2,
            engine_error: c.engine_error.map(|e| e.to_string()),
            metadata_error: c.metadata_error.map(|e| e.to_string()),
        }
    }
}

fn fields_of(m: &Extra2Metadata) -> Vec<FieldReport> {
    m.records()
        .iter()
        .map(|r| FieldReport {
            tag: r.tag().name(),
            code: r.tag().code(),
            len: r.payload().len(),
            hex: hex_preview(r.payload(), PREVIEW_BYTES),
        })
        .collect()
}

pub fn cmd_inspect(path: &Path, json: bool, cfg: SnifferConfig) -> Result<()> {
    let sniffer = Sniffer::with_config(EngineRegistry::builtin(), cfg);
    let report = InspectReport::new(path, sniffer.classify_path(path, Want::all()));

    if json {
        println!("{}", serde_json::to_string(&report)?);
        return Ok(());
    }

    println!("path:             {}", report.path);
    println!("kind:             {:?}", report.kind);
    if let Some(id) = report.legacy_db_type {
        println!("legacy_db_type:   {}", id);
    }
    println!("engine:           {}", opt_str(report.engine.as_ref()));
    println!("partition_engine: {}", opt_str(report.partition_engine.as_ref()));
    println!("version:          {}", opt_str(report.version.as_ref()));
    if let Some(e) = &report.engine_error {
        println!("engine_error:     {}", e);
    }
    if let Some(e) = &report.metadata_error {
        println!("metadata_error:   {}", e);
    }
    match &report.extra2 {
        Some(fields) if fields.is_empty() => println!("extra2:           (empty)"),
        Some(fields) => {
            println!("extra2:");
            for f in fields {
                println!("  {:<24} code={:<3} len={:<5} {}", f.tag, f.code, f.len, f.hex);
            }
        }
        None => {}
    }
    Ok(())
}

fn opt_str<T: std::fmt::Display>(v: Option<&T>) -> String {
    v.map(|x| x.to_string()).unwrap_or_else(|| "-".to_string())
}

// ---------------- extra2 ----------------

#[derive(Serialize)]
struct RecordReport {
    offset: usize,
    code: u8,
    tag: String,
    len: usize,
    hex: String,
}

fn tag_label(code: u8) -> String {
    match Extra2Tag::from_code(code) {
        Some(t) => t.name().to_string(),
        None if is_important(code) => format!("unknown-important({})", code),
        None => format!("unknown({})", code),
    }
}

fn load(path: &Path, cfg: &SnifferConfig) -> Result<Vec<u8>> {
    let mut src = FileSource::open(path).with_context(|| format!("open {}", path.display()))?;
    let size = src.file_size()?;
    if size > cfg.max_image_bytes {
        return Err(anyhow!(
            "{} is {} bytes, above FRMDEF_MAX_IMAGE_BYTES={}",
            path.display(),
            size,
            cfg.max_image_bytes
        ));
    }
    src.read_all().with_context(|| format!("read {}", path.display()))
}

pub fn cmd_extra2(path: &Path, json: bool, dump: bool, cfg: &SnifferConfig) -> Result<()> {
    let image = load(path, cfg)?;
    let Some(segment) = extra2_segment(&image)? else {
        println!("{}: old format descriptor, no extra2 segment", path.display());
        return Ok(());
    };

    let records = scan_records(segment);
    let strict = Extra2Metadata::read(&image);

    if json {
        let rows: Vec<RecordReport> = records
            .iter()
            .map(|r| RecordReport {
                offset: r.offset,
                code: r.code,
                tag: tag_label(r.code),
                len: r.payload.len(),
                hex: if dump {
                    hex_preview(r.payload, usize::MAX)
                } else {
                    hex_preview(r.payload, PREVIEW_BYTES)
                },
            })
            .collect();
        let obj = serde_json::json!({
            "path": path.display().to_string(),
            "segment_len": segment.len(),
            "records": rows,
            "strict": match &strict {
                Ok(_) => "ok".to_string(),
                Err(e) => e.to_string(),
            },
        });
        println!("{}", obj);
        return Ok(());
    }

    println!("extra2 segment: {} bytes, {} records", segment.len(), records.len());
    for r in &records {
        println!(
            "  @{:<5} {:<26} len={:<5}",
            r.offset,
            tag_label(r.code),
            r.payload.len()
        );
        if r.code == Extra2Tag::DefaultPartEngine.code() {
            println!("         {}", display_text(r.payload));
        } else if dump {
            for line in hex_dump(r.payload).lines() {
                println!("         {}", line);
            }
        } else {
            println!("         {}", hex_preview(r.payload, PREVIEW_BYTES));
        }
    }
    match strict {
        Ok(_) => println!("strict decode: ok"),
        Err(e) => println!("strict decode: {}", e),
    }
    Ok(())
}

// ---------------- rewrite ----------------

pub fn cmd_rewrite(path: &Path, out: &Path, cfg: &SnifferConfig) -> Result<()> {
    let image = load(path, cfg)?;
    let segment = extra2_segment(&image)?
        .ok_or_else(|| anyhow!("{}: old format descriptor, nothing to rewrite", path.display()))?;
    let declared = segment.len();

    let meta = Extra2Metadata::read(&image)
        .with_context(|| format!("decode extra2 of {}", path.display()))?;
    let size = meta.store_size();
    if size != declared {
        // пропущенные информационные теги изменили бы раскладку файла
        return Err(anyhow!(
            "canonical extra2 is {} bytes but {} declares {}; refusing to shift the image",
            size,
            path.display(),
            declared
        ));
    }

    let mut rewritten = image.clone();
    meta.write_image(&mut rewritten)?;
    std::fs::write(out, &rewritten).with_context(|| format!("write {}", out.display()))?;

    let changed = rewritten != image;
    println!(
        "rewrote {} -> {} ({} extra2 bytes, {})",
        path.display(),
        out.display(),
        size,
        if changed { "reordered" } else { "already canonical" }
    );
    Ok(())
}
