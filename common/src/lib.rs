//! Box Inventory Common Library
//!
//! 在庫画面のモデルとロジック（通信・ファイル入出力の実装はCLI側）

pub mod buffer;
pub mod error;
pub mod export;
pub mod import;
pub mod ports;
pub mod projector;
pub mod resolver;
pub mod session;
pub mod sheet;
pub mod store;
pub mod time;
pub mod types;

#[cfg(test)]
mod testing;

pub use buffer::{
    BatchCommit, BatchReport, EditBuffer, EditRow, ExistingEdit, ImportEdit, ImportRow, NewRecord,
    RowCommit, RowKey, RowOutcome,
};
pub use error::{Error, Result};
pub use export::{export_file_name, export_sheet, ExportSheet};
pub use import::ImportReconciler;
pub use ports::InventoryApi;
pub use projector::{project, Projection, SearchFields, Searchable, ViewState};
pub use resolver::{resolve, Resolution, ScanSession, ScanState};
pub use session::{InventorySession, Notice, Pane, SessionOptions};
pub use sheet::{CellValue, SheetRow, SheetTable};
pub use store::RecordStore;
pub use time::TimeDisplay;
pub use types::{Field, Record, RecordFields, StatusTag};
