//! 取込照合
//!
//! スプレッドシートの読み込み結果を取込バッチ（ImportEdit）に変換する。
//! 値は型変換しない。利用者が読み込んだ内容をそのまま確認・修正できるようにするため、
//! 変更は location の補完とサーバID列の除去のみ。

use crate::buffer::ImportEdit;
use crate::sheet::{CellValue, SheetTable};
use crate::types::Field;

/// 取込時に除去する列（取込行はサーバIDを持たない）
pub const SERVER_ID_COLUMNS: &[&str] = &["_id", "id"];

/// 取込照合
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportReconciler;

impl ImportReconciler {
    /// 表を取込バッチに変換
    ///
    /// # Arguments
    /// * `table` - 先頭シートの読み込み結果
    /// * `source` - 取込元ファイル名（表示用）
    pub fn reconcile(table: &SheetTable, source: Option<&str>) -> ImportEdit {
        let location = Field::Location.key();

        let mut headers: Vec<String> = table
            .headers
            .iter()
            .filter(|h| !is_server_id(h))
            .cloned()
            .collect();
        if !headers.iter().any(|h| h == location) {
            headers.push(location.to_string());
        }

        let mut edit = ImportEdit::new(headers, source.map(str::to_string));

        for row in &table.rows {
            if row.values().all(CellValue::is_blank) {
                continue;
            }

            let mut cells = row.clone();
            cells.retain(|column, _| !is_server_id(column));

            let location_missing = cells.get(location).map_or(true, |v| *v == CellValue::Empty);
            if location_missing {
                cells.insert(location.to_string(), CellValue::Text(String::new()));
            }

            edit.push_row(cells);
        }

        log::debug!(
            "reconciled {} of {} sheet row(s) into import batch",
            edit.len(),
            table.len()
        );
        edit
    }
}

fn is_server_id(column: &str) -> bool {
    SERVER_ID_COLUMNS.contains(&column)
}
