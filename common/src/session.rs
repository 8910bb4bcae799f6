//! 在庫画面のセッション
//!
//! ストア・編集バッファ・表示状態・スキャン状態をまとめて持ち、
//! `InventoryApi` を使った非同期処理を実行する。
//!
//! 通信の失敗はここで受け止めてログと `Notice` に残す（呼び出し側には伝播しない）。
//! 失敗した送信はバッファをそのまま残し、失敗した取得は前回のスナップショットを残す。

use crate::buffer::{
    BatchCommit, BatchReport, EditBuffer, ExistingEdit, ImportEdit, RowCommit, RowKey, RowOutcome,
};
use crate::error::{Error, Result};
use crate::export::{export_sheet, ExportSheet};
use crate::import::ImportReconciler;
use crate::ports::InventoryApi;
use crate::projector::{project, Projection, SearchFields, ViewState};
use crate::resolver::{resolve, Resolution, ScanSession};
use crate::sheet::SheetTable;
use crate::store::RecordStore;
use crate::time::TimeDisplay;
use crate::types::Field;
use futures::future::join_all;
use log::{error, info, warn};

/// 利用者への通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Failure(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::Success(m) | Notice::Failure(m) => m,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Notice::Failure(_))
    }
}

/// セッションの設定
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub page_size: usize,
    pub search_fields: SearchFields,
    pub time_display: TimeDisplay,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            page_size: ViewState::default().page_size(),
            search_fields: SearchFields::default(),
            time_display: TimeDisplay::default(),
        }
    }
}

/// ページングと検索の対象
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pane {
    /// サーバのレコード一覧
    #[default]
    Records,
    /// 既存行の編集バッファ
    Edit,
    /// 取込バッチ
    Import,
}

impl Pane {
    pub const ALL: [Pane; 3] = [Pane::Records, Pane::Edit, Pane::Import];
}

/// 在庫画面のセッション
pub struct InventorySession<A> {
    api: A,
    store: RecordStore,
    existing: ExistingEdit,
    import: ImportEdit,
    pane: Pane,
    record_view: ViewState,
    edit_view: ViewState,
    import_view: ViewState,
    search_fields: SearchFields,
    time_display: TimeDisplay,
    scan: ScanSession,
    last_resolution: Option<Resolution>,
    notices: Vec<Notice>,
}

impl<A: InventoryApi> InventorySession<A> {
    pub fn new(api: A, options: SessionOptions) -> Self {
        Self {
            api,
            store: RecordStore::new(),
            existing: ExistingEdit::default(),
            import: ImportEdit::default(),
            pane: Pane::default(),
            record_view: ViewState::new(options.page_size),
            edit_view: ViewState::new(options.page_size),
            import_view: ViewState::new(options.page_size),
            search_fields: options.search_fields,
            time_display: options.time_display,
            scan: ScanSession::new(),
            last_resolution: None,
            notices: Vec::new(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn existing(&self) -> &ExistingEdit {
        &self.existing
    }

    pub fn import(&self) -> &ImportEdit {
        &self.import
    }

    pub fn time_display(&self) -> &TimeDisplay {
        &self.time_display
    }

    pub fn scan(&self) -> &ScanSession {
        &self.scan
    }

    pub fn last_resolution(&self) -> Option<&Resolution> {
        self.last_resolution.as_ref()
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn notify_failure(&mut self, message: String) {
        self.notices.push(Notice::Failure(message));
    }

    fn notify_success(&mut self, message: String) {
        self.notices.push(Notice::Success(message));
    }

    // =============================================
    // 取得
    // =============================================

    /// 全件を取り直してストアを置き換える
    ///
    /// 失敗時は前回のスナップショットを残して false を返す。
    /// 成功時は既存行の編集バッファも作り直す（未送信の編集は破棄）。
    pub async fn refresh(&mut self) -> bool {
        match self.api.fetch_all().await {
            Ok(records) => {
                info!("fetched {} inventory record(s)", records.len());
                self.store.load(records);
                self.existing.rebase(&self.store);
                true
            }
            Err(e) => {
                error!("Error fetching inventory: {}", e);
                self.notify_failure(format!("Error fetching inventory: {}", e));
                false
            }
        }
    }

    // =============================================
    // 表示
    // =============================================

    /// 現在操作中の表示
    pub fn pane(&self) -> Pane {
        self.pane
    }

    /// 操作する表示を切り替える（各表示の検索語・ページ位置はそれぞれ保持）
    pub fn show(&mut self, pane: Pane) {
        self.pane = pane;
    }

    /// 現在操作中の表示の検索語とページ位置
    pub fn view(&self) -> &ViewState {
        self.view_of(self.pane)
    }

    pub fn view_of(&self, pane: Pane) -> &ViewState {
        match pane {
            Pane::Records => &self.record_view,
            Pane::Edit => &self.edit_view,
            Pane::Import => &self.import_view,
        }
    }

    fn view_of_mut(&mut self, pane: Pane) -> &mut ViewState {
        match pane {
            Pane::Records => &mut self.record_view,
            Pane::Edit => &mut self.edit_view,
            Pane::Import => &mut self.import_view,
        }
    }

    /// 表示の基になる行で導出（状態は変えない）
    fn project_pane(&self, pane: Pane) -> Projection {
        let view = self.view_of(pane);
        match pane {
            Pane::Records => project(self.store.records(), view, &self.search_fields, &self.time_display),
            Pane::Edit => project(self.existing.rows(), view, &self.search_fields, &self.time_display),
            Pane::Import => project(self.import.rows(), view, &self.search_fields, &self.time_display),
        }
    }

    /// 導出して補正したページ番号をその表示に書き戻す
    fn recompute(&mut self, pane: Pane) -> Projection {
        let projection = self.project_pane(pane);
        self.view_of_mut(pane).apply(&projection);
        projection
    }

    /// サーバのレコード一覧の現在のページ
    pub fn projection(&mut self) -> Projection {
        self.recompute(Pane::Records)
    }

    /// 既存行編集バッファの現在のページ
    pub fn edit_projection(&mut self) -> Projection {
        self.recompute(Pane::Edit)
    }

    /// 取込バッチの現在のページ
    pub fn import_projection(&mut self) -> Projection {
        self.recompute(Pane::Import)
    }

    /// 現在操作中の表示のページ
    pub fn active_projection(&mut self) -> Projection {
        self.recompute(self.pane)
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        let pane = self.pane;
        self.view_of_mut(pane).set_search(term);
    }

    /// 1ページの件数（全表示共通）
    pub fn set_page_size(&mut self, page_size: usize) {
        for pane in Pane::ALL {
            self.view_of_mut(pane).set_page_size(page_size);
        }
    }

    pub fn next_page(&mut self) {
        let pane = self.pane;
        let count = self.project_pane(pane).page_count;
        self.view_of_mut(pane).next_page(count);
    }

    pub fn prev_page(&mut self) {
        let pane = self.pane;
        let count = self.project_pane(pane).page_count;
        self.view_of_mut(pane).prev_page(count);
    }

    pub fn go_to_page(&mut self, page: usize) {
        let pane = self.pane;
        let count = self.project_pane(pane).page_count;
        self.view_of_mut(pane).go_to_page(page, count);
    }

    // =============================================
    // 編集
    // =============================================

    fn buffer_for(&mut self, key: &RowKey) -> EditBuffer<'_> {
        match key {
            RowKey::Server(_) => EditBuffer::Existing(&mut self.existing),
            RowKey::Temp(_) => EditBuffer::Import(&mut self.import),
        }
    }

    /// 1行の1フィールドを変更（送信中でも受け付ける）
    pub fn set_field(&mut self, key: &RowKey, field: Field, value: impl Into<String>) -> Result<()> {
        self.buffer_for(key).set_field(key, field, value)
    }

    /// 既存行の送信を開始
    pub fn begin_commit_row(&mut self, key: &RowKey) -> Result<RowCommit> {
        self.existing.begin_commit(key)
    }

    /// 送信内容をサーバに送る（全フィールドで置き換え）
    pub async fn send_row(&self, commit: &RowCommit) -> Result<()> {
        self.api.update(&commit.id, &commit.fields).await
    }

    /// 既存行の送信を完了（成功時は取り直す）
    pub async fn finish_commit_row(&mut self, commit: RowCommit, outcome: Result<()>) -> bool {
        self.existing.finish_commit(&commit, outcome.is_ok());
        match outcome {
            Ok(()) => {
                info!("row {} updated", commit.key);
                self.notify_success("Product updated successfully!".to_string());
                self.refresh().await;
                true
            }
            Err(e) => {
                error!("Error updating product {}: {}", commit.key, e);
                self.notify_failure(format!("Failed to update product: {}", e));
                false
            }
        }
    }

    /// 既存行を送信
    pub async fn commit_row(&mut self, key: &RowKey) -> bool {
        let commit = match self.begin_commit_row(key) {
            Ok(commit) => commit,
            Err(e) => {
                warn!("cannot commit row {}: {}", key, e);
                self.notify_failure(format!("Failed to update product: {}", e));
                return false;
            }
        };
        let outcome = self.send_row(&commit).await;
        self.finish_commit_row(commit, outcome).await
    }

    // =============================================
    // 取込
    // =============================================

    /// 読み込んだ表を取込バッチにする（前のバッチは破棄）
    pub fn load_import(&mut self, table: &SheetTable, source: Option<&str>) -> Result<usize> {
        if self.import.is_in_flight() {
            return Err(Error::CommitInFlight("import batch".to_string()));
        }
        self.import = ImportReconciler::reconcile(table, source);
        self.import_view = ViewState::new(self.import_view.page_size());
        info!(
            "loaded {} row(s) for import from {}",
            self.import.len(),
            source.unwrap_or("<unnamed>")
        );
        Ok(self.import.len())
    }

    /// 取込バッチとファイル選択を破棄
    pub fn reset_import(&mut self) {
        EditBuffer::Import(&mut self.import).reset();
    }

    /// 取込行を外す（登録済みになった行など）
    pub fn remove_import_row(&mut self, key: &RowKey) -> Result<()> {
        self.import.remove_row(key).map(|_| ())
    }

    pub fn begin_commit_import(&mut self) -> Result<BatchCommit> {
        self.import.begin_commit()
    }

    /// 全行を同時に登録して行ごとの結果を集める
    pub async fn send_batch(&self, commit: &BatchCommit) -> BatchReport {
        let creates = commit.rows.iter().map(|(key, payload)| async move {
            let error = self.api.create(payload).await.err().map(|e| e.to_string());
            RowOutcome {
                key: key.clone(),
                error,
            }
        });

        BatchReport {
            outcomes: join_all(creates).await,
        }
    }

    /// 一括登録を完了（全行成功ならバッチを破棄して取り直す）
    pub async fn finish_commit_import(&mut self, report: BatchReport) -> BatchReport {
        self.import.finish_commit(&report);

        if report.is_success() {
            info!("{}", report.summary());
            self.notify_success(format!("Data saved successfully! {}", report.summary()));
            self.refresh().await;
        } else {
            for failure in report.failures() {
                warn!(
                    "row {} was not saved: {}",
                    failure.key,
                    failure.error.as_deref().unwrap_or_default()
                );
            }
            error!("Error saving data: {}", report.summary());
            self.notify_failure(format!("Error saving data: {}", report.summary()));
        }
        report
    }

    /// 取込バッチを一括登録
    pub async fn commit_import(&mut self) -> Option<BatchReport> {
        let commit = match self.begin_commit_import() {
            Ok(commit) => commit,
            Err(e) => {
                warn!("cannot commit import batch: {}", e);
                self.notify_failure(format!("Error saving data: {}", e));
                return None;
            }
        };
        let report = self.send_batch(&commit).await;
        Some(self.finish_commit_import(report).await)
    }

    // =============================================
    // スキャン
    // =============================================

    pub fn start_scan(&mut self) {
        self.scan.start();
    }

    pub fn stop_scan(&mut self) {
        self.scan.stop();
    }

    pub fn toggle_scan(&mut self) {
        self.scan.toggle();
    }

    /// 読み取り結果を受け取って照会（スキャン中の最初の1件のみ）
    pub async fn on_decode(&mut self, decoded: Option<&str>) -> Option<&Resolution> {
        let code = self.scan.accept_decode(decoded)?;

        match resolve(&self.api, &code).await {
            Ok(resolution) => {
                let message = resolution.summary(&self.time_display);
                if resolution.is_empty() {
                    self.notify_failure(message);
                } else {
                    self.notify_success(message);
                }
                self.last_resolution = Some(resolution);
                self.last_resolution.as_ref()
            }
            Err(e) => {
                error!("barcode lookup for {} failed: {}", code, e);
                self.notify_failure(format!("Barcode lookup failed for {}: {}", code, e));
                None
            }
        }
    }

    // =============================================
    // エクスポート
    // =============================================

    /// 現在のスナップショットを書き出し用の表にする
    pub fn export(&self, name: Option<&str>) -> ExportSheet {
        export_sheet(self.store.records(), name)
    }
}
