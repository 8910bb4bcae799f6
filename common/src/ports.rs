//! 外部連携のインターフェース
//!
//! 通信の実装（HTTPなど）はこのトレイトの外側に置く。

use crate::buffer::NewRecord;
use crate::error::Result;
use crate::types::{Record, RecordFields};

/// 在庫サーバとの連携
///
/// サーバの拒否（入力不備など）は `Error::Network` としてメッセージごと返す。
#[allow(async_fn_in_trait)]
pub trait InventoryApi {
    /// 全件取得（ページングはクライアント側で行う）
    async fn fetch_all(&self) -> Result<Vec<Record>>;

    /// バーコードで照会（0件以上）
    async fn lookup_by_barcode(&self, barcode: &str) -> Result<Vec<Record>>;

    /// 新規登録（IDなし）
    async fn create(&self, record: &NewRecord) -> Result<()>;

    /// 全フィールドで置き換え
    async fn update(&self, id: &str, fields: &RecordFields) -> Result<()>;
}
