use box_inventory::{api, cli, config, error, export, sheet, view};
use box_inventory::role::Role;
use box_inventory_common::{Field, InventorySession, InventoryApi, Notice, RowKey};
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use dialoguer::{Confirm, Input, Select};
use error::{InventoryError, Result};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let config = Config::load()?;
    let role = cli.role.unwrap_or(config.role);

    match cli.command {
        Commands::List { search, page, page_size } => {
            println!("📦 box-inventory - 在庫一覧 ({})\n", role);

            let mut session = open_session(&config, role)?;
            if let Some(size) = page_size {
                session.set_page_size(size);
            }
            refresh_or_fail(&mut session).await?;

            if let Some(term) = search {
                session.set_search(term);
            }
            session.go_to_page(page);

            let projection = session.projection();
            println!(
                "{}",
                view::render_page(session.store().records(), &projection, session.time_display())
            );
        }

        Commands::Import { file, yes } => {
            println!("📥 box-inventory - 取込\n");

            println!("[1/3] ファイルを読み込み中...");
            let table = sheet::read_first_sheet(&file)?;
            let source = file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| file.display().to_string());

            let mut session = open_session(&config, role)?;
            let count = session.load_import(&table, Some(source.as_str()))?;
            if count == 0 {
                println!("取り込む行がありません: {}", source);
                return Ok(());
            }
            println!("✔ {}行を読み込み\n", count);
            println!("{}\n", view::render_import_preview(session.import()));

            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt(format!("{}行を登録しますか?", count))
                    .default(false)
                    .interact()
                    .map_err(|e| InventoryError::Prompt(e.to_string()))?;
                if !confirmed {
                    session.reset_import();
                    return Err(InventoryError::Aborted);
                }
            }

            println!("[2/3] 登録中...");
            let report = session.commit_import().await;
            print_notices(&mut session);

            println!("[3/3] 結果");
            match report {
                Some(report) if report.is_success() => {
                    println!("{}", view::render_report(&report));
                    println!("\n✅ 取込完了");
                }
                Some(report) => {
                    println!("{}", view::render_report(&report));
                    return Err(InventoryError::Failed(report.summary()));
                }
                None => return Err(InventoryError::Failed("取込を開始できませんでした".into())),
            }
        }

        Commands::Export { name, output } => {
            println!("📄 box-inventory - エクスポート\n");

            let mut session = open_session(&config, role)?;
            refresh_or_fail(&mut session).await?;

            let name = name.or_else(|| config.export_name.clone());
            let sheet = session.export(name.as_deref());
            let output_dir = output.unwrap_or_else(|| PathBuf::from("."));

            println!("- Excelを生成中... ({}件)", sheet.table.len());
            let path = export::write_export(&sheet, &output_dir)?;
            println!("✔ Excel出力: {}", path.display());
        }

        Commands::Scan { barcode } => {
            println!("🔍 box-inventory - バーコード照会\n");

            let mut session = open_session(&config, role)?;
            session.start_scan();

            match barcode {
                Some(code) => {
                    session.on_decode(Some(&code)).await;
                }
                None => {
                    println!("バーコードを読み取ってください（Ctrl+Dで終了）");
                    let mut lines = BufReader::new(tokio::io::stdin()).lines();
                    while session.scan().is_scanning() {
                        match lines.next_line().await? {
                            Some(line) => {
                                session.on_decode(Some(&line)).await;
                            }
                            None => break,
                        }
                    }
                    session.stop_scan();
                }
            }

            if print_notices(&mut session) {
                return Err(InventoryError::Failed("照会に失敗しました".into()));
            }
        }

        Commands::Edit { id, field, value } => {
            println!("✏️  box-inventory - 編集\n");

            let mut session = open_session(&config, role)?;
            refresh_or_fail(&mut session).await?;

            let key = RowKey::Server(id.clone());
            if session.existing().get(&key).is_none() {
                return Err(box_inventory_common::Error::NotFound(format!("record {}", id)).into());
            }

            match (field, value) {
                (Some(field), Some(value)) => {
                    let field: Field = field.parse()?;
                    session.set_field(&key, field, value)?;
                }
                _ => {
                    if !edit_interactive(&mut session, &key)? {
                        return Err(InventoryError::Aborted);
                    }
                }
            }

            let saved = session.commit_row(&key).await;
            print_notices(&mut session);
            if !saved {
                return Err(InventoryError::Failed(format!("{} を更新できませんでした", id)));
            }
        }

        Commands::Config { set_base_url, show } => {
            let mut config = config;

            if let Some(url) = set_base_url {
                config.set_base_url(url)?;
                println!("✔ APIのURLを設定しました");
            }

            if show {
                println!("設定:");
                println!("  パス: {}", Config::config_path()?.display());
                println!("  API URL: {}", config.get_base_url().unwrap_or_else(|_| "未設定".into()));
                println!("  トークン: {}", if config.get_token().is_some() { "設定済み" } else { "未設定" });
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  役割: {}", config.role);
                println!("  1ページの件数: {}", config.page_size_for(role));
                let fields: Vec<&str> = config.search_fields.fields().iter().map(|f| f.key()).collect();
                println!("  検索対象: {}", fields.join(", "));
                println!(
                    "  エクスポート名: {}",
                    config.export_name.as_deref().unwrap_or(box_inventory_common::export::DEFAULT_FILE_NAME)
                );
            }
        }
    }

    Ok(())
}

fn open_session(
    config: &Config,
    role: Role,
) -> Result<InventorySession<api::HttpInventoryApi>> {
    let client = api::connect(config)?;
    Ok(InventorySession::new(client, config.session_options(role)?))
}

/// 取得に失敗したら通知を表示してエラーにする
async fn refresh_or_fail<A: InventoryApi>(session: &mut InventorySession<A>) -> Result<()> {
    println!("- 在庫を取得中...");
    if session.refresh().await {
        println!("✔ {}件を取得\n", session.store().len());
        Ok(())
    } else {
        let message = session
            .take_notices()
            .into_iter()
            .rev()
            .find(Notice::is_failure)
            .map(|n| n.message().to_string())
            .unwrap_or_else(|| "在庫を取得できませんでした".into());
        Err(InventoryError::Failed(message))
    }
}

/// 通知を表示（失敗があれば true）
fn print_notices<A: InventoryApi>(session: &mut InventorySession<A>) -> bool {
    let notices = session.take_notices();
    for notice in &notices {
        println!("{}", view::render_notice(notice));
    }
    notices.iter().any(Notice::is_failure)
}

/// 対話式でフィールドを編集（保存するなら true）
fn edit_interactive<A: InventoryApi>(session: &mut InventorySession<A>, key: &RowKey) -> Result<bool> {
    loop {
        let row = session
            .existing()
            .get(key)
            .ok_or_else(|| box_inventory_common::Error::UnknownRow(key.to_string()))?;

        let mut items: Vec<String> = Field::ALL
            .iter()
            .map(|f| format!("{}: {}", f.label(), row.record.get(*f)))
            .collect();
        items.push("保存".to_string());
        items.push("中止".to_string());

        let choice = Select::new()
            .with_prompt("変更する項目")
            .items(&items)
            .default(0)
            .interact()
            .map_err(|e| InventoryError::Prompt(e.to_string()))?;

        if choice == Field::ALL.len() {
            return Ok(true);
        }
        if choice > Field::ALL.len() {
            return Ok(false);
        }

        let field = Field::ALL[choice];
        let current = row.record.get(field).to_string();
        let value: String = Input::new()
            .with_prompt(field.label())
            .with_initial_text(current)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| InventoryError::Prompt(e.to_string()))?;

        session.set_field(key, field, value)?;
    }
}
