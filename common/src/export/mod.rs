//! エクスポート（CLIと共有）
//!
//! レコード一覧を書き出し用の表に変換する。値はすべて文字列のまま出力する。

use crate::sheet::{CellValue, SheetRow, SheetTable};
use crate::types::{Field, Record};

#[cfg(feature = "excel")]
pub mod excel_core;

pub const DEFAULT_FILE_NAME: &str = "Inventory";
pub const SHEET_NAME: &str = "Inventory";
pub const FILE_EXTENSION: &str = ".xlsx";
pub const ID_COLUMN: &str = "_id";

/// 出力列（先頭はサーバID）
pub const EXPORT_COLUMNS: [&str; 7] = [
    ID_COLUMN,
    "boxNumber",
    "boxBarcode",
    "palletBarcode",
    "time",
    "status",
    "location",
];

/// 書き出し内容
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSheet {
    pub file_name: String,
    pub sheet_name: String,
    pub table: SheetTable,
}

/// 出力ファイル名（空欄なら "Inventory"）
pub fn export_file_name(name: Option<&str>) -> String {
    let base = name.map(str::trim).filter(|n| !n.is_empty()).unwrap_or(DEFAULT_FILE_NAME);
    format!("{}{}", base, FILE_EXTENSION)
}

/// 1レコード分の行
pub fn record_row(record: &Record) -> SheetRow {
    let mut row = SheetRow::new();
    row.insert(
        ID_COLUMN.to_string(),
        CellValue::Text(record.id.clone().unwrap_or_default()),
    );
    for field in Field::ALL {
        row.insert(field.key().to_string(), CellValue::from(record.get(field)));
    }
    row
}

/// レコード一覧を書き出し用の表に変換
pub fn export_sheet(records: &[Record], name: Option<&str>) -> ExportSheet {
    let mut table = SheetTable::new(EXPORT_COLUMNS.iter().map(|c| c.to_string()).collect());
    for record in records {
        table.push_row(record_row(record));
    }

    log::debug!("prepared {} record(s) for export", table.len());

    ExportSheet {
        file_name: export_file_name(name),
        sheet_name: SHEET_NAME.to_string(),
        table,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::ImportReconciler;

    fn record(id: Option<&str>, box_number: &str) -> Record {
        Record {
            id: id.map(str::to_string),
            box_number: box_number.to_string(),
            box_barcode: "0042".to_string(),
            pallet_barcode: "PL-1".to_string(),
            time: "2024-05-01T09:30:00Z".to_string(),
            status: "loaded".to_string(),
            location: "Dock 3".to_string(),
        }
    }

    #[test]
    fn test_file_name() {
        assert_eq!(export_file_name(None), "Inventory.xlsx");
        assert_eq!(export_file_name(Some("   ")), "Inventory.xlsx");
        assert_eq!(export_file_name(Some(" may-stock ")), "may-stock.xlsx");
    }

    #[test]
    fn test_columns_and_missing_id() {
        let sheet = export_sheet(&[record(None, "B1")], None);

        assert_eq!(sheet.sheet_name, "Inventory");
        assert_eq!(sheet.table.headers, EXPORT_COLUMNS.to_vec());
        assert_eq!(sheet.table.cell(0, "_id"), Some(&CellValue::Text(String::new())));
        assert_eq!(sheet.table.cell(0, "boxBarcode"), Some(&CellValue::from("0042")));
    }

    #[test]
    fn test_export_then_import_round_trip() {
        let records = vec![record(Some("a1"), "B1"), record(Some("a2"), "B2")];
        let sheet = export_sheet(&records, Some("stock"));

        let edit = ImportReconciler::reconcile(&sheet.table, Some(&sheet.file_name));
        let imported: Vec<Record> = edit.rows().iter().map(|r| r.to_record()).collect();

        let expected: Vec<Record> = records
            .into_iter()
            .map(|mut r| {
                r.id = None;
                r
            })
            .collect();
        assert_eq!(imported, expected);
    }

    #[test]
    fn test_empty_export() {
        let sheet = export_sheet(&[], Some("empty"));
        assert!(sheet.table.is_empty());
        assert_eq!(sheet.table.headers.len(), 7);
    }
}
