//! サーバスナップショット
//!
//! 最後に取得したサーバのレコード一覧を保持する。
//! 部分更新はせず、取得のたびに丸ごと置き換える。

use crate::types::Record;
use std::sync::Arc;

/// 最後に取得したサーバのレコード一覧
#[derive(Debug, Clone)]
pub struct RecordStore {
    records: Arc<[Record]>,
    /// `load` のたびに増える世代番号
    generation: u64,
}

impl RecordStore {
    pub fn new() -> Self {
        Self {
            records: Arc::from(Vec::new()),
            generation: 0,
        }
    }

    /// スナップショットを丸ごと置き換え
    pub fn load(&mut self, records: Vec<Record>) {
        self.records = Arc::from(records);
        self.generation += 1;
    }

    /// 現在のスナップショット（古いものを保持している側には影響しない）
    pub fn snapshot(&self) -> Arc<[Record]> {
        Arc::clone(&self.records)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// IDで検索
    pub fn find(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.id.as_deref() == Some(id))
    }
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, box_number: &str) -> Record {
        Record {
            id: Some(id.to_string()),
            box_number: box_number.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_store_starts_empty() {
        let store = RecordStore::new();
        assert!(store.is_empty());
        assert_eq!(store.generation(), 0);
    }

    #[test]
    fn test_load_replaces_everything() {
        let mut store = RecordStore::new();
        store.load(vec![record("1", "B1"), record("2", "B2")]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.generation(), 1);

        store.load(vec![record("3", "B3")]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.generation(), 2);
        assert!(store.find("1").is_none());
        assert_eq!(store.find("3").map(|r| r.box_number.as_str()), Some("B3"));
    }

    #[test]
    fn test_old_snapshot_is_unaffected_by_load() {
        let mut store = RecordStore::new();
        store.load(vec![record("1", "B1")]);
        let old = store.snapshot();

        store.load(vec![record("2", "B2"), record("3", "B3")]);

        assert_eq!(old.len(), 1);
        assert_eq!(old[0].box_number, "B1");
        assert_eq!(store.snapshot().len(), 2);
    }
}
