//! 表示ページの導出
//!
//! 基になる行・検索語・ページ番号から、表示するページを求める。
//! `project` は入力だけで結果が決まる（状態を持たない）ので、
//! 入力のたびに再計算してよい。ページ内容は保存せず、常にここから導出する。

use crate::buffer::{EditRow, ImportRow};
use crate::time::TimeDisplay;
use crate::types::{Field, Record};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// 検索対象になる行
pub trait Searchable {
    fn field_text(&self, field: Field) -> Cow<'_, str>;
}

impl Searchable for Record {
    fn field_text(&self, field: Field) -> Cow<'_, str> {
        Cow::Borrowed(self.get(field))
    }
}

impl Searchable for EditRow {
    fn field_text(&self, field: Field) -> Cow<'_, str> {
        Cow::Borrowed(self.record.get(field))
    }
}

impl Searchable for ImportRow {
    fn field_text(&self, field: Field) -> Cow<'_, str> {
        self.cell(field.key()).as_text()
    }
}

/// 検索対象フィールドの設定（ロールに依存しない）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchFields(Vec<Field>);

impl SearchFields {
    pub fn new(fields: impl IntoIterator<Item = Field>) -> Self {
        let mut list: Vec<Field> = Vec::new();
        for field in fields {
            if !list.contains(&field) {
                list.push(field);
            }
        }
        Self(list)
    }

    /// 箱番号のみ
    pub fn box_number_only() -> Self {
        Self(vec![Field::BoxNumber])
    }

    pub fn fields(&self) -> &[Field] {
        &self.0
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains(&field)
    }
}

impl Default for SearchFields {
    /// 箱番号・箱バーコード・パレットバーコード・日時（表示形式）・ステータス
    fn default() -> Self {
        Self(vec![
            Field::BoxNumber,
            Field::BoxBarcode,
            Field::PalletBarcode,
            Field::Time,
            Field::Status,
        ])
    }
}

/// 検索語とページ位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    search_term: String,
    /// 1始まり
    page_index: usize,
    page_size: usize,
}

impl ViewState {
    pub fn new(page_size: usize) -> Self {
        Self {
            search_term: String::new(),
            page_index: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// 検索語を変更（ページは1に戻る）
    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
        self.page_index = 1;
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.page_index = 1;
    }

    /// 次ページ（最終ページで止まる）
    pub fn next_page(&mut self, page_count: usize) {
        self.page_index = clamp_page(self.page_index.saturating_add(1), page_count);
    }

    /// 前ページ（1ページ目で止まる）
    pub fn prev_page(&mut self, page_count: usize) {
        self.page_index = clamp_page(self.page_index.saturating_sub(1), page_count);
    }

    pub fn go_to_page(&mut self, page: usize, page_count: usize) {
        self.page_index = clamp_page(page, page_count);
    }

    /// 再計算で補正されたページ位置を反映
    pub fn apply(&mut self, projection: &Projection) {
        self.page_index = projection.page_index;
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(10)
    }
}

/// 表示ページ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    /// 表示行の元スライス上の位置
    pub positions: Vec<usize>,
    /// 補正後のページ番号（1始まり）
    pub page_index: usize,
    pub page_count: usize,
    pub filtered_count: usize,
}

impl Projection {
    /// 表示行を取り出す
    pub fn rows<'a, T>(&self, base: &'a [T]) -> Vec<&'a T> {
        self.positions.iter().filter_map(|&i| base.get(i)).collect()
    }

    pub fn has_prev(&self) -> bool {
        self.page_index > 1
    }

    pub fn has_next(&self) -> bool {
        self.page_index < self.page_count
    }
}

/// ページ数（件数0なら0）
pub fn page_count(filtered_count: usize, page_size: usize) -> usize {
    filtered_count.div_ceil(page_size.max(1))
}

/// ページ番号を [1, max(page_count, 1)] に収める
pub fn clamp_page(page: usize, page_count: usize) -> usize {
    page.clamp(1, page_count.max(1))
}

/// 1行が検索語に一致するか（いずれかのフィールドに部分一致）
///
/// `needle` は小文字化済みであること。
pub fn matches<T: Searchable>(
    row: &T,
    needle: &str,
    fields: &SearchFields,
    time_display: &TimeDisplay,
) -> bool {
    fields.fields().iter().any(|&field| {
        let text = if field == Field::Time {
            Cow::Owned(time_display.format(&row.field_text(field)))
        } else {
            row.field_text(field)
        };
        text.to_lowercase().contains(needle)
    })
}

/// 検索語に一致する行の位置（空白のみの検索語は全件）
pub fn filter_positions<T: Searchable>(
    base: &[T],
    term: &str,
    fields: &SearchFields,
    time_display: &TimeDisplay,
) -> Vec<usize> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return (0..base.len()).collect();
    }

    base.iter()
        .enumerate()
        .filter(|(_, row)| matches(*row, &needle, fields, time_display))
        .map(|(i, _)| i)
        .collect()
}

/// 表示ページを導出
///
/// # Arguments
/// * `base` - 元の行（ストアのスナップショットや編集バッファ）
/// * `state` - 検索語とページ位置
/// * `fields` - 検索対象フィールド
/// * `time_display` - 日時の表示形式（日時も表示文字列で検索する）
pub fn project<T: Searchable>(
    base: &[T],
    state: &ViewState,
    fields: &SearchFields,
    time_display: &TimeDisplay,
) -> Projection {
    let filtered = filter_positions(base, state.search_term(), fields, time_display);
    let page_size = state.page_size().max(1);
    let page_count = page_count(filtered.len(), page_size);
    let page_index = clamp_page(state.page_index(), page_count);

    let start = (page_index - 1) * page_size;
    let positions = filtered
        .iter()
        .skip(start)
        .take(page_size)
        .copied()
        .collect();

    Projection {
        positions,
        page_index,
        page_count,
        filtered_count: filtered.len(),
    }
}
