//! 日時表示
//!
//! レコードの `time`（ISO形式の文字列）をロケール形式で表示する。
//! 解釈できない値は "Invalid Date" とする。

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};

pub const INVALID_DATE: &str = "Invalid Date";

const DISPLAY_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// 表示タイムゾーン
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeDisplay {
    offset: FixedOffset,
}

impl TimeDisplay {
    /// 実行環境のローカルオフセット
    pub fn local() -> Self {
        Self { offset: Local::now().offset().fix() }
    }

    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    /// UTCからの分単位オフセット（範囲外はNone）
    pub fn with_offset_minutes(minutes: i32) -> Option<Self> {
        FixedOffset::east_opt(minutes.checked_mul(60)?).map(|offset| Self { offset })
    }

    /// `time` 文字列を表示形式に変換
    ///
    /// - オフセット付き（RFC 3339）: 表示オフセットに変換
    /// - オフセットなしの日時: 表示オフセットの現地時刻として扱う
    /// - 日付のみ: UTCの0時として扱う
    pub fn format(&self, raw: &str) -> String {
        match self.parse(raw) {
            Some(dt) => dt.format(DISPLAY_FORMAT).to_string(),
            None => INVALID_DATE.to_string(),
        }
    }

    fn parse(&self, raw: &str) -> Option<DateTime<FixedOffset>> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&self.offset));
        }

        for fmt in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
                return self.offset.from_local_datetime(&naive).single();
            }
        }

        let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
        let midnight = date.and_hms_opt(0, 0, 0)?;
        Some(Utc.from_utc_datetime(&midnight).with_timezone(&self.offset))
    }
}

impl Default for TimeDisplay {
    fn default() -> Self {
        Self::local()
    }
}
