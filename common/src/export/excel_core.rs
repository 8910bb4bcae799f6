//! Excel生成（共通ライブラリ）
//!
//! ExportSheet を1シートのxlsxとしてバッファに書き出す。

use super::ExportSheet;
use crate::sheet::CellValue;
use rust_xlsxwriter::*;

/// Excelをバッファに生成
///
/// 1行目は太字の見出し。セル値は型を保ったまま書き込む。
pub fn write_sheet_buffer(sheet: &ExportSheet) -> Result<Vec<u8>, String> {
    let mut workbook = Workbook::new();
    let header_format = Format::new()
        .set_bold()
        .set_border_bottom(FormatBorder::Thin);

    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(&sheet.sheet_name)
        .map_err(|e| format!("シート名設定エラー: {}", e))?;

    for (col, header) in sheet.table.headers.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, header, &header_format)
            .map_err(|e| format!("見出し書き込みエラー: {}", e))?;
    }

    for (i, row) in sheet.table.rows.iter().enumerate() {
        let row_num = (i + 1) as u32;
        for (col, header) in sheet.table.headers.iter().enumerate() {
            let col = col as u16;
            let result = match row.get(header) {
                None | Some(CellValue::Empty) => continue,
                Some(CellValue::Text(s)) => worksheet.write_string(row_num, col, s),
                Some(CellValue::Number(n)) => worksheet.write_number(row_num, col, *n),
                Some(CellValue::Bool(b)) => worksheet.write_boolean(row_num, col, *b),
            };
            result.map_err(|e| format!("セル書き込みエラー ({}, {}): {}", row_num, col, e))?;
        }
    }

    worksheet.autofit();

    workbook
        .save_to_buffer()
        .map_err(|e| format!("Excel保存エラー: {}", e))
}
