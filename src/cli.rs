use clap::{Parser, Subcommand};
use crate::role::Role;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "box-inventory")]
#[command(about = "箱・パレット在庫の一覧/編集/取込/バーコード照会ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 役割 (admin/user)。省略時は設定ファイルの値
    #[arg(long, global = true)]
    pub role: Option<Role>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 在庫一覧を表示
    List {
        /// 検索語（部分一致、大文字小文字を区別しない）
        #[arg(short, long)]
        search: Option<String>,

        /// ページ番号（1始まり）
        #[arg(short, long, default_value = "1")]
        page: usize,

        /// 1ページの件数（省略時は役割の既定値）
        #[arg(long)]
        page_size: Option<usize>,
    },

    /// スプレッドシートを取り込んで一括登録
    Import {
        /// 取込ファイル (.xlsx/.xls/.xlsm/.ods)
        #[arg(required = true)]
        file: PathBuf,

        /// 確認せずに登録
        #[arg(short, long)]
        yes: bool,
    },

    /// 在庫一覧をExcelに書き出し
    Export {
        /// ファイル名（拡張子なし、デフォルト: Inventory）
        #[arg(short, long)]
        name: Option<String>,

        /// 出力ディレクトリ
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// バーコードを照会（省略時は標準入力から読み取り）
    Scan {
        #[arg(value_parser = non_blank)]
        barcode: Option<String>,
    },

    /// 1件を編集して更新
    Edit {
        /// レコードID
        #[arg(required = true)]
        id: String,

        /// 変更するフィールド (boxNumber/boxBarcode/palletBarcode/time/status/location)
        #[arg(short, long, requires = "value")]
        field: Option<String>,

        /// 新しい値
        #[arg(long, requires = "field")]
        value: Option<String>,
    },

    /// 設定を表示/編集
    Config {
        /// APIのURLを設定
        #[arg(long)]
        set_base_url: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

/// 空白だけの値は受け付けない
fn non_blank(value: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err("空の値は指定できません".to_string())
    } else {
        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list() {
        let cli = Cli::parse_from(["box-inventory", "--role", "admin", "list", "-s", "miss", "-p", "2"]);
        assert_eq!(cli.role, Some(Role::Admin));
        match cli.command {
            Commands::List { search, page, page_size } => {
                assert_eq!(search.as_deref(), Some("miss"));
                assert_eq!(page, 2);
                assert_eq!(page_size, None);
            }
            _ => panic!("list expected"),
        }
    }

    #[test]
    fn test_edit_field_requires_value() {
        assert!(Cli::try_parse_from(["box-inventory", "edit", "abc", "--field", "status"]).is_err());
        assert!(Cli::try_parse_from(["box-inventory", "edit", "abc", "--field", "status", "--value", "loaded"]).is_ok());
    }

    #[test]
    fn test_scan_without_barcode() {
        let cli = Cli::parse_from(["box-inventory", "-v", "scan"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Scan { barcode: None }));
    }

    #[test]
    fn test_scan_rejects_blank_barcode() {
        assert!(Cli::try_parse_from(["box-inventory", "scan", "   "]).is_err());
        assert!(Cli::try_parse_from(["box-inventory", "scan", ""]).is_err());

        let cli = Cli::parse_from(["box-inventory", "scan", " BX-1 "]);
        match cli.command {
            Commands::Scan { barcode } => assert_eq!(barcode.as_deref(), Some("BX-1")),
            _ => panic!("scan expected"),
        }
    }
}
