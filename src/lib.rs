//! Box Inventory CLI
//!
//! 共通ライブラリのセッションに、HTTP・スプレッドシート・設定の実装をつなぐ

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod role;
pub mod sheet;
pub mod view;
