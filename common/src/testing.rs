//! テスト用のインメモリAPI

use crate::buffer::NewRecord;
use crate::error::{Error, Result};
use crate::ports::InventoryApi;
use crate::types::{Field, Record, RecordFields};
use std::collections::HashSet;
use std::sync::Mutex;

#[derive(Default)]
struct FakeState {
    records: Vec<Record>,
    next_id: u64,
    fetch_error: Option<String>,
    lookup_error: Option<String>,
    update_error: Option<String>,
    /// この boxNumber の登録は失敗させる
    reject_boxes: HashSet<String>,
    created: Vec<NewRecord>,
    updates: Vec<(String, RecordFields)>,
}

#[derive(Default)]
pub struct FakeApi {
    state: Mutex<FakeState>,
}

impl FakeApi {
    pub fn with_records(records: Vec<Record>) -> Self {
        let api = Self::default();
        api.state.lock().unwrap().records = records;
        api
    }

    pub fn fail_fetch(&self, message: Option<&str>) {
        self.state.lock().unwrap().fetch_error = message.map(str::to_string);
    }

    pub fn fail_lookups(&self, message: &str) {
        self.state.lock().unwrap().lookup_error = Some(message.to_string());
    }

    pub fn fail_updates(&self, message: Option<&str>) {
        self.state.lock().unwrap().update_error = message.map(str::to_string);
    }

    pub fn reject_box(&self, box_number: &str) {
        self.state
            .lock()
            .unwrap()
            .reject_boxes
            .insert(box_number.to_string());
    }

    pub fn accept_all(&self) {
        self.state.lock().unwrap().reject_boxes.clear();
    }

    pub fn created(&self) -> Vec<NewRecord> {
        self.state.lock().unwrap().created.clone()
    }

    pub fn updates(&self) -> Vec<(String, RecordFields)> {
        self.state.lock().unwrap().updates.clone()
    }

    pub fn records(&self) -> Vec<Record> {
        self.state.lock().unwrap().records.clone()
    }
}

impl InventoryApi for FakeApi {
    async fn fetch_all(&self) -> Result<Vec<Record>> {
        let state = self.state.lock().unwrap();
        match &state.fetch_error {
            Some(message) => Err(Error::Network(message.clone())),
            None => Ok(state.records.clone()),
        }
    }

    async fn lookup_by_barcode(&self, barcode: &str) -> Result<Vec<Record>> {
        let state = self.state.lock().unwrap();
        if let Some(message) = &state.lookup_error {
            return Err(Error::Network(message.clone()));
        }
        Ok(state
            .records
            .iter()
            .filter(|r| r.box_barcode == barcode || r.pallet_barcode == barcode)
            .cloned()
            .collect())
    }

    async fn create(&self, record: &NewRecord) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let box_number = record
            .get(Field::BoxNumber.key())
            .map(|v| v.as_text().into_owned())
            .unwrap_or_default();
        if state.reject_boxes.contains(&box_number) {
            return Err(Error::Network(format!("HTTP 400: invalid box {}", box_number)));
        }

        state.next_id += 1;
        let mut stored = Record {
            id: Some(format!("srv-{}", state.next_id)),
            ..Default::default()
        };
        for field in Field::ALL {
            if let Some(value) = record.get(field.key()) {
                stored.set(field, value.as_text().into_owned());
            }
        }
        state.records.push(stored);
        state.created.push(record.clone());
        Ok(())
    }

    async fn update(&self, id: &str, fields: &RecordFields) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(message) = &state.update_error {
            return Err(Error::Network(message.clone()));
        }
        let record = state
            .records
            .iter_mut()
            .find(|r| r.id.as_deref() == Some(id))
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        record.box_number = fields.box_number.clone();
        record.box_barcode = fields.box_barcode.clone();
        record.pallet_barcode = fields.pallet_barcode.clone();
        record.time = fields.time.clone();
        record.status = fields.status.clone();
        record.location = fields.location.clone();

        state.updates.push((id.to_string(), fields.clone()));
        Ok(())
    }
}
