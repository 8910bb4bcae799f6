//! バーコード照会
//!
//! スキャンで読み取ったコードに一致するレコードをすべて集めて表示用にまとめる。
//! スキャンは1回読み取ったら止まる（同じ読み取りで何度も照会しないため）。

use crate::error::Result;
use crate::ports::InventoryApi;
use crate::time::TimeDisplay;
use crate::types::Record;

pub const SEPARATOR: &str = "------------------";
pub const NO_LOCATION: &str = "N/A";

/// スキャンの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanState {
    #[default]
    Idle,
    Scanning,
}

/// スキャンセッション（Idle ⇄ Scanning）
#[derive(Debug, Clone, Default)]
pub struct ScanSession {
    state: ScanState,
    /// 最後に読み取ったコード（新しいセッションを始めても消えない）
    last_scanned: Option<String>,
}

impl ScanSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.state = ScanState::Scanning;
    }

    pub fn stop(&mut self) {
        self.state = ScanState::Idle;
    }

    pub fn toggle(&mut self) {
        match self.state {
            ScanState::Idle => self.start(),
            ScanState::Scanning => self.stop(),
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn is_scanning(&self) -> bool {
        self.state == ScanState::Scanning
    }

    pub fn last_scanned(&self) -> Option<&str> {
        self.last_scanned.as_deref()
    }

    /// 読み取り結果を受け取る
    ///
    /// スキャン中に空でないコードを受け取ったときだけ照会対象を返し、Idle に戻る。
    /// 空・未検出・Idle 中の読み取りは無視する。
    pub fn accept_decode(&mut self, decoded: Option<&str>) -> Option<String> {
        if self.state != ScanState::Scanning {
            return None;
        }
        let code = decoded.map(str::trim).filter(|c| !c.is_empty())?;

        self.state = ScanState::Idle;
        self.last_scanned = Some(code.to_string());
        Some(code.to_string())
    }
}

/// 照会結果（一致したレコードを照会順にすべて保持）
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub barcode: String,
    pub matches: Vec<Record>,
}

impl Resolution {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// 表示用の文字列
    pub fn summary(&self, time_display: &TimeDisplay) -> String {
        if self.matches.is_empty() {
            return format!("No product(s) found for barcode: {}", self.barcode);
        }

        let blocks: Vec<String> = self
            .matches
            .iter()
            .enumerate()
            .map(|(i, r)| match_block(i + 1, r, time_display))
            .collect();

        format!(
            "Barcode Scanned: {}\n\n{}",
            self.barcode,
            blocks.join(&format!("\n{}\n", SEPARATOR))
        )
    }
}

fn match_block(number: usize, record: &Record, time_display: &TimeDisplay) -> String {
    let location = if record.location.is_empty() {
        NO_LOCATION
    } else {
        record.location.as_str()
    };

    format!(
        "#{}:\nBox Number: {}\nBox Barcode: {}\nPallet Barcode: {}\nTime: {}\nStatus: {}\nLocation: {}",
        number,
        record.box_number,
        record.box_barcode,
        record.pallet_barcode,
        time_display.format(&record.time),
        record.status,
        location,
    )
}

/// バーコードを照会（0件はエラーではない）
pub async fn resolve<A: InventoryApi>(api: &A, barcode: &str) -> Result<Resolution> {
    log::debug!("looking up barcode {}", barcode);
    let matches = api.lookup_by_barcode(barcode).await?;
    log::info!("barcode {} matched {} record(s)", barcode, matches.len());

    Ok(Resolution {
        barcode: barcode.to_string(),
        matches,
    })
}
