//! 在庫レコードの型定義
//!
//! サーバ・編集バッファ・取込バッチで共有される型:
//! - Record: 箱/パレット1件分のレコード（サーバ由来なら `id` あり）
//! - RecordFields: 更新時に送る全フィールド（`id` なし）
//! - Field: 編集・検索の対象フィールド
//! - StatusTag: ステータス表示用の分類

use crate::error::Error;
use serde::{Deserialize, Deserializer, Serialize};

/// 在庫レコード
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// サーバが採番するID（未登録の取込行にはない）
    #[serde(
        rename = "_id",
        alias = "id",
        default,
        deserialize_with = "opaque_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "scalar_as_text")]
    pub box_number: String,       // 箱番号

    #[serde(default, deserialize_with = "scalar_as_text")]
    pub box_barcode: String,      // 箱バーコード

    #[serde(default, deserialize_with = "scalar_as_text")]
    pub pallet_barcode: String,   // パレットバーコード

    #[serde(default, deserialize_with = "scalar_as_text")]
    pub time: String,             // 日時（ISO形式）

    #[serde(default, deserialize_with = "scalar_as_text")]
    pub status: String,           // ステータス

    #[serde(default, deserialize_with = "scalar_as_text")]
    pub location: String,         // 保管場所
}

impl Record {
    /// フィールド値を取得
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::BoxNumber => &self.box_number,
            Field::BoxBarcode => &self.box_barcode,
            Field::PalletBarcode => &self.pallet_barcode,
            Field::Time => &self.time,
            Field::Status => &self.status,
            Field::Location => &self.location,
        }
    }

    /// フィールド値を設定（検証はしない）
    pub fn set(&mut self, field: Field, value: String) {
        match field {
            Field::BoxNumber => self.box_number = value,
            Field::BoxBarcode => self.box_barcode = value,
            Field::PalletBarcode => self.pallet_barcode = value,
            Field::Time => self.time = value,
            Field::Status => self.status = value,
            Field::Location => self.location = value,
        }
    }

    /// 更新用の全フィールド
    pub fn fields(&self) -> RecordFields {
        RecordFields {
            box_number: self.box_number.clone(),
            box_barcode: self.box_barcode.clone(),
            pallet_barcode: self.pallet_barcode.clone(),
            time: self.time.clone(),
            status: self.status.clone(),
            location: self.location.clone(),
        }
    }

    pub fn status_tag(&self) -> StatusTag {
        StatusTag::classify(&self.status)
    }
}

/// 更新ペイロード（差分ではなく常に全フィールド）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordFields {
    pub box_number: String,
    pub box_barcode: String,
    pub pallet_barcode: String,
    pub time: String,
    pub status: String,
    pub location: String,
}

/// レコードのフィールド
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    BoxNumber,
    BoxBarcode,
    PalletBarcode,
    Time,
    Status,
    Location,
}

impl Field {
    /// 表・シートの列順
    pub const ALL: [Field; 6] = [
        Field::BoxNumber,
        Field::BoxBarcode,
        Field::PalletBarcode,
        Field::Time,
        Field::Status,
        Field::Location,
    ];

    /// JSON/シート上のキー
    pub fn key(&self) -> &'static str {
        match self {
            Field::BoxNumber => "boxNumber",
            Field::BoxBarcode => "boxBarcode",
            Field::PalletBarcode => "palletBarcode",
            Field::Time => "time",
            Field::Status => "status",
            Field::Location => "location",
        }
    }

    /// 表示ラベル
    pub fn label(&self) -> &'static str {
        match self {
            Field::BoxNumber => "Box Number",
            Field::BoxBarcode => "Box Barcode",
            Field::PalletBarcode => "Pallet Barcode",
            Field::Time => "Time",
            Field::Status => "Status",
            Field::Location => "Location",
        }
    }
}

impl std::str::FromStr for Field {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Field::ALL
            .into_iter()
            .find(|f| {
                f.key().eq_ignore_ascii_case(wanted) || f.label().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| Error::UnknownField(s.to_string()))
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// ステータスの表示分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTag {
    Loaded,
    Missing,
    Issue,
    Available,
    Other,
}

impl StatusTag {
    /// 大文字小文字を区別せずに分類（未知の値は Other）
    pub fn classify(status: &str) -> Self {
        match status.trim().to_lowercase().as_str() {
            "loaded" => StatusTag::Loaded,
            "missing" => StatusTag::Missing,
            "issue" => StatusTag::Issue,
            "available" => StatusTag::Available,
            _ => StatusTag::Other,
        }
    }
}

impl std::fmt::Display for StatusTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusTag::Loaded => write!(f, "loaded"),
            StatusTag::Missing => write!(f, "missing"),
            StatusTag::Issue => write!(f, "issue"),
            StatusTag::Available => write!(f, "available"),
            StatusTag::Other => write!(f, "other"),
        }
    }
}

/// 文字列・数値・真偽値を文字列として保持（null は空文字）
fn scalar_as_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ScalarRepr {
        Text(String),
        Int(i64),
        UInt(u64),
        Float(f64),
        Bool(bool),
    }

    Ok(match Option::<ScalarRepr>::deserialize(deserializer)? {
        None => String::new(),
        Some(ScalarRepr::Text(s)) => s,
        Some(ScalarRepr::Int(n)) => n.to_string(),
        Some(ScalarRepr::UInt(n)) => n.to_string(),
        Some(ScalarRepr::Float(n)) => n.to_string(),
        Some(ScalarRepr::Bool(b)) => b.to_string(),
    })
}

/// 文字列・数値どちらのIDも文字列として保持
fn opaque_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdRepr {
        Text(String),
        Int(i64),
    }

    Ok(Option::<IdRepr>::deserialize(deserializer)?.map(|id| match id {
        IdRepr::Text(s) => s,
        IdRepr::Int(n) => n.to_string(),
    }))
}
