use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;

use frmdef::cli::{cmd_extra2, cmd_inspect, cmd_rewrite};
use frmdef::consts::{EXTRA2_GIS, EXTRA2_TABLEDEF_VERSION, FRM_HEADER_SIZE};
use frmdef::{Extra2Metadata, SnifferConfig};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn unique_path(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("frmdef-cli-{prefix}-{pid}-{t}-{id}.frm"))
}

fn frm_file(prefix: &str, seg: &[u8]) -> Result<PathBuf> {
    let mut image = vec![0u8; FRM_HEADER_SIZE];
    image[0] = 0xFE;
    image[1] = 0x01;
    image[2] = 10;
    image[3] = 12;
    image[4..6].copy_from_slice(&(seg.len() as u16).to_le_bytes());
    image.extend_from_slice(seg);
    image.resize(image.len().max(160), 0x5A);
    let path = unique_path(prefix);
    fs::write(&path, &image)?;
    Ok(path)
}

/// GIS перед version: валидно, но не канонично.
fn out_of_order_segment() -> Vec<u8> {
    let mut seg = vec![EXTRA2_GIS, 2, 0xCA, 0xFE, EXTRA2_TABLEDEF_VERSION, 16];
    seg.extend_from_slice(&[0x42; 16]);
    seg
}

#[test]
fn rewrite_puts_records_in_canonical_order() -> Result<()> {
    let cfg = SnifferConfig::default();
    let src = frm_file("rewrite-src", &out_of_order_segment())?;
    let out = unique_path("rewrite-out");

    cmd_rewrite(&src, &out, &cfg)?;

    let before = fs::read(&src)?;
    let after = fs::read(&out)?;
    assert_eq!(before.len(), after.len());
    // version теперь первая запись
    assert_eq!(after[FRM_HEADER_SIZE], EXTRA2_TABLEDEF_VERSION);
    assert_eq!(after[FRM_HEADER_SIZE + 18], EXTRA2_GIS);
    // хвост за сегментом не тронут
    let end = FRM_HEADER_SIZE + out_of_order_segment().len();
    assert_eq!(&before[end..], &after[end..]);
    assert_eq!(Extra2Metadata::read(&before)?, Extra2Metadata::read(&after)?);

    let _ = fs::remove_file(src);
    let _ = fs::remove_file(out);
    Ok(())
}

#[test]
fn rewrite_refuses_to_drop_unknown_records() -> Result<()> {
    let mut seg = out_of_order_segment();
    seg.extend_from_slice(&[100, 1, 0x01]);
    let src = frm_file("rewrite-unknown", &seg)?;
    let out = unique_path("rewrite-unknown-out");

    assert!(cmd_rewrite(&src, &out, &SnifferConfig::default()).is_err());
    assert!(!out.exists());

    let _ = fs::remove_file(src);
    Ok(())
}

#[test]
fn inspect_and_extra2_run_ok() -> Result<()> {
    let cfg = SnifferConfig::default();
    let path = frm_file("inspect", &out_of_order_segment())?;

    // вывод в stdout; проверяем только отсутствие ошибок
    cmd_inspect(&path, true, cfg.clone())?;
    cmd_inspect(&path, false, cfg.clone())?;
    cmd_extra2(&path, true, false, &cfg)?;
    cmd_extra2(&path, false, true, &cfg)?;

    // повреждённый сегмент: extra2 печатает ошибку строгого декодера, но не падает
    let bad = frm_file("inspect-bad", &[200, 1, 0xAA])?;
    cmd_extra2(&bad, false, false, &cfg)?;
    cmd_inspect(&bad, true, cfg.clone())?;

    // лимит размера образа
    let capped = SnifferConfig::default().with_max_image_bytes(16);
    assert!(cmd_extra2(&path, false, false, &capped).is_err());

    let _ = fs::remove_file(path);
    let _ = fs::remove_file(bad);
    Ok(())
}
