//! 在庫APIクライアント（HTTP/JSON）
//!
//! - GET  {base}/api/inventory               全件取得
//! - GET  {base}/api/inventory/barcode/{code} バーコード照会
//! - POST {base}/api/inventory               新規登録
//! - PUT  {base}/api/inventory/{id}          更新

use crate::error::Result;
use box_inventory_common::{Error, InventoryApi, NewRecord, Record, RecordFields};
use log::{debug, warn};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::time::Duration;

const INVENTORY_PATH: &str = "/api/inventory";

pub struct HttpInventoryApi {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    token: Option<String>,
}

fn network(e: reqwest::Error) -> Error {
    Error::Network(e.to_string())
}

impl HttpInventoryApi {
    pub fn new(base_url: impl Into<String>, token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, suffix: &str) -> String {
        format!("{}{}{}", self.base_url, INVENTORY_PATH, suffix)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> box_inventory_common::Result<Response> {
        self.authorize(request).send().await.map_err(network)
    }

    /// 2xx以外はステータスと本文をそのまま持つエラーにする
    async fn rejected(response: Response) -> Error {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        warn!("inventory API returned {}: {}", status, body);
        Error::Network(format!("HTTP {}: {}", status.as_u16(), body))
    }
}

impl InventoryApi for HttpInventoryApi {
    async fn fetch_all(&self) -> box_inventory_common::Result<Vec<Record>> {
        let url = self.url("");
        debug!("GET {}", url);

        let response = self.send(self.client.get(&url)).await?;
        if !response.status().is_success() {
            return Err(Self::rejected(response).await);
        }

        let body = response.text().await.map_err(network)?;
        let records: Vec<Record> = serde_json::from_str(&body)?;
        Ok(records)
    }

    async fn lookup_by_barcode(&self, barcode: &str) -> box_inventory_common::Result<Vec<Record>> {
        let url = self.url(&format!("/barcode/{}", urlencoding::encode(barcode)));
        debug!("GET {}", url);

        let response = self.send(self.client.get(&url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(Self::rejected(response).await);
        }

        let body = response.text().await.map_err(network)?;
        let value: serde_json::Value = serde_json::from_str(&body)?;
        let records: Vec<Record> = match value {
            serde_json::Value::Null => Vec::new(),
            list @ serde_json::Value::Array(_) => serde_json::from_value(list)?,
            single => vec![serde_json::from_value(single)?],
        };
        Ok(records)
    }

    async fn create(&self, record: &NewRecord) -> box_inventory_common::Result<()> {
        let url = self.url("");
        debug!("POST {}", url);

        let response = self.send(self.client.post(&url).json(record)).await?;
        if !response.status().is_success() {
            return Err(Self::rejected(response).await);
        }
        Ok(())
    }

    async fn update(&self, id: &str, fields: &RecordFields) -> box_inventory_common::Result<()> {
        let url = self.url(&format!("/{}", urlencoding::encode(id)));
        debug!("PUT {}", url);

        let response = self.send(self.client.put(&url).json(fields)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(format!("record {}", id)));
        }
        if !response.status().is_success() {
            return Err(Self::rejected(response).await);
        }
        Ok(())
    }
}
