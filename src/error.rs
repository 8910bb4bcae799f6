use thiserror::Error;

#[derive(Error, Debug)]
pub enum InventoryError {
    #[error(transparent)]
    Common(#[from] box_inventory_common::Error),

    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIのURLが設定されていません。`box-inventory config --set-base-url URL` で設定してください")]
    MissingBaseUrl,

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("HTTPエラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error("スプレッドシート読み込みエラー: {0}")]
    SheetRead(String),

    #[error("Excel生成エラー: {0}")]
    ExcelWrite(String),

    #[error("入力エラー: {0}")]
    Prompt(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("中止しました")]
    Aborted,

    /// セッションが通知として記録した失敗
    #[error("{0}")]
    Failed(String),
}

pub type Result<T> = std::result::Result<T, InventoryError>;
