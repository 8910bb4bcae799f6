//! Excel出力（CLI版）
//!
//! 共通ライブラリで生成したバッファをファイルに書き込む

use crate::error::{InventoryError, Result};
use box_inventory_common::export::excel_core::write_sheet_buffer;
use box_inventory_common::ExportSheet;
use std::path::{Path, PathBuf};

/// 出力ディレクトリにxlsxを書き出し、書き出したパスを返す
pub fn write_export(sheet: &ExportSheet, output_dir: &Path) -> Result<PathBuf> {
    let buffer = write_sheet_buffer(sheet).map_err(InventoryError::ExcelWrite)?;

    std::fs::create_dir_all(output_dir)?;
    let output_path = output_dir.join(&sheet.file_name);
    std::fs::write(&output_path, buffer)?;

    log::info!(
        "wrote {} row(s) to {}",
        sheet.table.len(),
        output_path.display()
    );
    Ok(output_path)
}
