mod client;

pub use client::HttpInventoryApi;

use crate::config::Config;
use crate::error::Result;
use std::time::Duration;

/// 設定からAPIクライアントを作成
pub fn connect(config: &Config) -> Result<HttpInventoryApi> {
    let base_url = config.get_base_url()?;
    log::debug!("using inventory API at {}", base_url);
    HttpInventoryApi::new(
        base_url,
        config.get_token(),
        Duration::from_secs(config.timeout_seconds),
    )
}
