//! 端末表示
//!
//! 一覧・取込プレビュー・通知を文字列に整形する。

use box_inventory_common::{
    BatchReport, Field, ImportEdit, Notice, Projection, Record, StatusTag, TimeDisplay,
};

const ID_HEADER: &str = "ID";

fn status_mark(tag: StatusTag) -> &'static str {
    match tag {
        StatusTag::Loaded => "●",
        StatusTag::Missing => "✖",
        StatusTag::Issue => "▲",
        StatusTag::Available => "○",
        StatusTag::Other => "-",
    }
}

/// 列幅を揃えた表
fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<width$}", c, width = *w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![line(headers)];
    out.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    out.extend(rows.iter().map(|r| line(r.as_slice())));
    out.join("\n")
}

/// 一覧の1ページ
pub fn render_page(records: &[Record], projection: &Projection, time_display: &TimeDisplay) -> String {
    if projection.filtered_count == 0 {
        return "該当するレコードがありません".to_string();
    }

    let mut headers = vec![ID_HEADER.to_string()];
    headers.extend(Field::ALL.iter().map(|f| f.label().to_string()));

    let rows: Vec<Vec<String>> = projection
        .rows(records)
        .into_iter()
        .map(|r| {
            let mut row = vec![r.id.clone().unwrap_or_default()];
            for field in Field::ALL {
                let value = match field {
                    Field::Time => time_display.format(&r.time),
                    Field::Status => format!("{} {}", status_mark(r.status_tag()), r.status),
                    _ => r.get(field).to_string(),
                };
                row.push(value);
            }
            row
        })
        .collect();

    format!(
        "{}\n\nPage {} of {} ({}件)",
        render_table(&headers, &rows),
        projection.page_index,
        projection.page_count,
        projection.filtered_count
    )
}

/// 取込バッチのプレビュー
pub fn render_import_preview(edit: &ImportEdit) -> String {
    let mut headers = vec!["#".to_string()];
    headers.extend(edit.headers().iter().cloned());

    let rows: Vec<Vec<String>> = edit
        .rows()
        .iter()
        .map(|r| {
            let mut row = vec![r.key.to_string()];
            row.extend(edit.headers().iter().map(|h| r.cell(h).as_text().into_owned()));
            row
        })
        .collect();

    render_table(&headers, &rows)
}

/// 一括登録の結果（失敗行の内訳つき）
pub fn render_report(report: &BatchReport) -> String {
    let mut lines = vec![report.summary()];
    for failure in report.failures() {
        lines.push(format!(
            "  ✖ {}: {}",
            failure.key,
            failure.error.as_deref().unwrap_or_default()
        ));
    }
    lines.join("\n")
}

pub fn render_notice(notice: &Notice) -> String {
    match notice {
        Notice::Success(m) => format!("✔ {}", m),
        Notice::Failure(m) => format!("✖ {}", m),
    }
}
