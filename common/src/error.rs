//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// 取得・登録・更新・照会が完了しなかった（サーバ側の拒否も含む）
    #[error("Network error: {0}")]
    Network(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Row index {index} out of range (rows: {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Unknown row: {0}")]
    UnknownRow(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// 同じ行/バッチの送信が完了していない
    #[error("Commit already in flight: {0}")]
    CommitInFlight(String),

    #[error("Import batch is empty")]
    EmptyBatch,
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
