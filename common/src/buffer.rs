//! 編集バッファ
//!
//! 送信前の作業コピーを保持する。2種類ある:
//! - ExistingEdit: サーバのレコードを1行ずつ編集して個別に更新する
//! - ImportEdit: 取込ファイルの行を編集して一括登録する
//!
//! 行は位置ではなく `RowKey` で識別する（検索・ページングで位置が変わるため）。
//! 送信は begin/finish の2段階で、送信中の行/バッチは再送信できないが
//! フィールド編集は受け付ける。

use crate::error::{Error, Result};
use crate::sheet::{CellValue, SheetRow};
use crate::store::RecordStore;
use crate::types::{Field, Record, RecordFields};
use log::debug;
use std::collections::HashSet;

/// 登録ペイロード（列名 → セル値、IDなし）
pub type NewRecord = SheetRow;

/// 行の識別子
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RowKey {
    /// サーバのID
    Server(String),
    /// 取込行の一時ID
    Temp(u64),
}

impl std::fmt::Display for RowKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowKey::Server(id) => write!(f, "{}", id),
            RowKey::Temp(n) => write!(f, "new-{}", n),
        }
    }
}

// =============================================
// ExistingEdit
// =============================================

/// 既存レコードの編集行
#[derive(Debug, Clone, PartialEq)]
pub struct EditRow {
    pub key: RowKey,
    pub record: Record,
}

/// 既存レコードの編集バッファ（ストアと同じ並び・同じ件数）
#[derive(Debug, Clone, Default)]
pub struct ExistingEdit {
    rows: Vec<EditRow>,
    in_flight: HashSet<RowKey>,
    generation: u64,
}

/// 1行分の更新送信
#[derive(Debug, Clone, PartialEq)]
pub struct RowCommit {
    pub key: RowKey,
    pub id: String,
    pub fields: RecordFields,
}

impl ExistingEdit {
    pub fn from_store(store: &RecordStore) -> Self {
        let mut edit = Self::default();
        edit.rebase(store);
        edit
    }

    /// ストアのコピーで作り直す
    ///
    /// 未送信の編集は破棄する。送信中フラグは残っている行についてのみ保持する。
    pub fn rebase(&mut self, store: &RecordStore) {
        self.rows = store
            .records()
            .iter()
            .map(|r| EditRow {
                key: RowKey::Server(r.id.clone().unwrap_or_default()),
                record: r.clone(),
            })
            .collect();
        self.generation = store.generation();

        let keys: HashSet<&RowKey> = self.rows.iter().map(|r| &r.key).collect();
        self.in_flight.retain(|k| keys.contains(k));
    }

    pub fn rows(&self) -> &[EditRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn get(&self, key: &RowKey) -> Option<&EditRow> {
        self.rows.iter().find(|r| &r.key == key)
    }

    fn position(&self, key: &RowKey) -> Result<usize> {
        self.rows
            .iter()
            .position(|r| &r.key == key)
            .ok_or_else(|| Error::UnknownRow(key.to_string()))
    }

    /// 1行の1フィールドを変更（値の検証は送信時にサーバが行う）
    pub fn set_field(&mut self, key: &RowKey, field: Field, value: impl Into<String>) -> Result<()> {
        let pos = self.position(key)?;
        self.rows[pos].record.set(field, value.into());
        Ok(())
    }

    pub fn set_field_at(&mut self, index: usize, field: Field, value: impl Into<String>) -> Result<()> {
        let len = self.rows.len();
        let row = self
            .rows
            .get_mut(index)
            .ok_or(Error::IndexOutOfRange { index, len })?;
        row.record.set(field, value.into());
        Ok(())
    }

    pub fn is_in_flight(&self, key: &RowKey) -> bool {
        self.in_flight.contains(key)
    }

    /// 行の送信を開始（全フィールドを送る）
    pub fn begin_commit(&mut self, key: &RowKey) -> Result<RowCommit> {
        let pos = self.position(key)?;
        let row = &self.rows[pos];

        let id = match &row.key {
            RowKey::Server(id) if !id.is_empty() => id.clone(),
            _ => return Err(Error::NotFound(format!("row {} has no server id", pos))),
        };

        if self.in_flight.contains(key) {
            return Err(Error::CommitInFlight(key.to_string()));
        }

        let commit = RowCommit {
            key: key.clone(),
            id,
            fields: row.record.fields(),
        };
        self.in_flight.insert(key.clone());
        Ok(commit)
    }

    /// 送信完了（失敗時も行はそのまま残す）
    pub fn finish_commit(&mut self, commit: &RowCommit, succeeded: bool) {
        self.in_flight.remove(&commit.key);
        debug!("row {} commit finished: succeeded={}", commit.key, succeeded);
    }

    pub fn reset(&mut self) {
        self.rows.clear();
        self.in_flight.clear();
    }
}

// =============================================
// ImportEdit
// =============================================

/// 取込行（セル値はそのまま保持）
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRow {
    pub key: RowKey,
    pub cells: SheetRow,
}

static EMPTY_CELL: CellValue = CellValue::Empty;

impl ImportRow {
    pub fn cell(&self, column: &str) -> &CellValue {
        self.cells.get(column).unwrap_or(&EMPTY_CELL)
    }

    /// 表示・比較用のRecord（IDなし）
    pub fn to_record(&self) -> Record {
        let mut record = Record::default();
        for field in Field::ALL {
            record.set(field, self.cell(field.key()).as_text().into_owned());
        }
        record
    }

    /// 登録ペイロード（location が空なら空文字を補う）
    pub fn payload(&self) -> NewRecord {
        let mut cells = self.cells.clone();
        let location = Field::Location.key();
        let missing = match cells.get(location) {
            None | Some(CellValue::Empty) => true,
            Some(CellValue::Text(s)) => s.is_empty(),
            _ => false,
        };
        if missing {
            cells.insert(location.to_string(), CellValue::Text(String::new()));
        }
        cells
    }
}

/// 取込バッチの編集バッファ
#[derive(Debug, Clone, Default)]
pub struct ImportEdit {
    rows: Vec<ImportRow>,
    headers: Vec<String>,
    /// 取込元ファイル名
    source: Option<String>,
    next_temp: u64,
    in_flight: bool,
}

/// 一括登録の送信内容
#[derive(Debug, Clone, PartialEq)]
pub struct BatchCommit {
    pub rows: Vec<(RowKey, NewRecord)>,
}

/// 行ごとの登録結果
#[derive(Debug, Clone, PartialEq)]
pub struct RowOutcome {
    pub key: RowKey,
    /// 失敗時のメッセージ
    pub error: Option<String>,
}

/// 一括登録の結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub outcomes: Vec<RowOutcome>,
}

impl BatchReport {
    /// 全行成功
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.error.is_none())
    }

    pub fn failures(&self) -> impl Iterator<Item = &RowOutcome> {
        self.outcomes.iter().filter(|o| o.error.is_some())
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &RowKey> {
        self.outcomes
            .iter()
            .filter(|o| o.error.is_none())
            .map(|o| &o.key)
    }

    pub fn failed_count(&self) -> usize {
        self.failures().count()
    }

    pub fn summary(&self) -> String {
        let failed = self.failed_count();
        if failed == 0 {
            format!("{} row(s) saved", self.outcomes.len())
        } else {
            format!(
                "{} of {} row(s) failed; the batch was kept for retry",
                failed,
                self.outcomes.len()
            )
        }
    }
}

impl ImportEdit {
    pub fn new(headers: Vec<String>, source: Option<String>) -> Self {
        Self {
            headers,
            source,
            ..Default::default()
        }
    }

    /// 行を追加して一時IDを払い出す
    pub fn push_row(&mut self, cells: SheetRow) -> RowKey {
        let key = RowKey::Temp(self.next_temp);
        self.next_temp += 1;
        self.rows.push(ImportRow { key: key.clone(), cells });
        key
    }

    pub fn rows(&self) -> &[ImportRow] {
        &self.rows
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, key: &RowKey) -> Option<&ImportRow> {
        self.rows.iter().find(|r| &r.key == key)
    }

    fn position(&self, key: &RowKey) -> Result<usize> {
        self.rows
            .iter()
            .position(|r| &r.key == key)
            .ok_or_else(|| Error::UnknownRow(key.to_string()))
    }

    fn write_cell(&mut self, pos: usize, column: &str, value: String) {
        if !self.headers.iter().any(|h| h == column) {
            self.headers.push(column.to_string());
        }
        self.rows[pos]
            .cells
            .insert(column.to_string(), CellValue::Text(value));
    }

    pub fn set_field(&mut self, key: &RowKey, column: &str, value: impl Into<String>) -> Result<()> {
        let pos = self.position(key)?;
        self.write_cell(pos, column, value.into());
        Ok(())
    }

    pub fn set_field_at(&mut self, index: usize, column: &str, value: impl Into<String>) -> Result<()> {
        if index >= self.rows.len() {
            return Err(Error::IndexOutOfRange { index, len: self.rows.len() });
        }
        self.write_cell(index, column, value.into());
        Ok(())
    }

    /// 行を取り除く（一部登録済みの行を外すため）
    pub fn remove_row(&mut self, key: &RowKey) -> Result<ImportRow> {
        if self.in_flight {
            return Err(Error::CommitInFlight("import batch".to_string()));
        }
        let pos = self.position(key)?;
        Ok(self.rows.remove(pos))
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// 一括登録を開始
    pub fn begin_commit(&mut self) -> Result<BatchCommit> {
        if self.in_flight {
            return Err(Error::CommitInFlight("import batch".to_string()));
        }
        if self.rows.is_empty() {
            return Err(Error::EmptyBatch);
        }
        self.in_flight = true;
        Ok(BatchCommit {
            rows: self
                .rows
                .iter()
                .map(|r| (r.key.clone(), r.payload()))
                .collect(),
        })
    }

    /// 一括登録の完了。全行成功した場合のみバッチを破棄する
    pub fn finish_commit(&mut self, report: &BatchReport) {
        self.in_flight = false;
        if report.is_success() {
            self.rows.clear();
            self.headers.clear();
            self.source = None;
        }
    }

    /// バッチとファイル選択を破棄
    pub fn reset(&mut self) {
        self.rows.clear();
        self.headers.clear();
        self.source = None;
        self.in_flight = false;
    }
}

// =============================================
// EditBuffer
// =============================================

/// 編集対象のバッファ
pub enum EditBuffer<'a> {
    Existing(&'a mut ExistingEdit),
    Import(&'a mut ImportEdit),
}

impl EditBuffer<'_> {
    pub fn len(&self) -> usize {
        match self {
            EditBuffer::Existing(b) => b.len(),
            EditBuffer::Import(b) => b.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn set_field(&mut self, key: &RowKey, field: Field, value: impl Into<String>) -> Result<()> {
        match self {
            EditBuffer::Existing(b) => b.set_field(key, field, value),
            EditBuffer::Import(b) => b.set_field(key, field.key(), value),
        }
    }

    pub fn set_field_at(&mut self, index: usize, field: Field, value: impl Into<String>) -> Result<()> {
        match self {
            EditBuffer::Existing(b) => b.set_field_at(index, field, value),
            EditBuffer::Import(b) => b.set_field_at(index, field.key(), value),
        }
    }

    pub fn reset(&mut self) {
        match self {
            EditBuffer::Existing(b) => b.reset(),
            EditBuffer::Import(b) => b.reset(),
        }
    }
}
