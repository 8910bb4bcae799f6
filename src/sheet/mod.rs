//! スプレッドシート読み込み（calamine）
//!
//! 先頭シートの1行目を見出しとして、2行目以降を列名 → セル値の行にする。
//! 空セルは行に含めない。

use crate::error::{InventoryError, Result};
use box_inventory_common::{CellValue, SheetRow, SheetTable};
use calamine::{open_workbook_auto, Data, Reader};
use chrono::{Duration, NaiveDate};
use std::path::Path;

/// Excelのシリアル値（1900年方式）を日時文字列に変換
pub fn excel_serial_to_iso(serial: f64) -> Option<String> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    let dt = epoch.checked_add_signed(Duration::try_milliseconds(millis)?)?;

    if serial.fract() == 0.0 {
        Some(dt.format("%Y-%m-%d").to_string())
    } else {
        Some(dt.format("%Y-%m-%dT%H:%M:%S").to_string())
    }
}

/// セル値を変換
pub fn cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match excel_serial_to_iso(dt.as_f64()) {
            Some(iso) => CellValue::Text(iso),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}

/// 先頭シートを読み込む
pub fn read_first_sheet(path: &Path) -> Result<SheetTable> {
    if !path.exists() {
        return Err(InventoryError::FileNotFound(path.display().to_string()));
    }

    let mut workbook = open_workbook_auto(path)
        .map_err(|e| InventoryError::SheetRead(format!("{}: {}", path.display(), e)))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| InventoryError::SheetRead("シートがありません".into()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| InventoryError::SheetRead(format!("{}: {}", sheet_name, e)))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(first) => first.iter().map(|c| cell_value(c).as_text().trim().to_string()).collect(),
        None => return Ok(SheetTable::default()),
    };

    let mut table = SheetTable::new(headers.iter().filter(|h| !h.is_empty()).cloned().collect());
    for row in rows {
        let mut cells = SheetRow::new();
        for (header, data) in headers.iter().zip(row.iter()) {
            if header.is_empty() {
                continue;
            }
            let value = cell_value(data);
            if value != CellValue::Empty {
                cells.insert(header.clone(), value);
            }
        }
        table.push_row(cells);
    }

    log::info!(
        "read {} row(s) from sheet '{}' of {}",
        table.len(),
        sheet_name,
        path.display()
    );
    Ok(table)
}
