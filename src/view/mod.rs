use colored::Colorize;
use serde::Serialize;

use crate::session::SessionState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "table" | "text" | "txt" => Some(Self::Table),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RowView {
    pub id: String,
    pub mobile: String,
    pub amount: String,
    pub bank: String,
    pub pin: String,
}

/// Everything the presentation layer needs to draw one page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DisplayModel {
    pub total_submissions: usize,
    pub rows: Vec<RowView>,
    pub empty: bool,
    pub page: usize,
    pub total_pages: usize,
    pub page_label: String,
    pub prev_enabled: bool,
    pub next_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_summary: Option<String>,
}

pub fn search_summary(state: &SessionState) -> Option<String> {
    if state.term().is_empty() {
        return None;
    }
    Some(format!(
        "Found {} results for \"{}\"",
        state.filtered().len(),
        state.term()
    ))
}

pub fn project(state: &SessionState) -> DisplayModel {
    let pager = state.pager();
    let page = state.page();
    let total_pages = pager.total_pages();
    let rows = state
        .visible()
        .iter()
        .map(|r| RowView {
            id: r.id.clone(),
            mobile: r.mobile.clone(),
            amount: format!("₹{}", r.amount),
            bank: r.bank.clone(),
            pin: r.pin.clone(),
        })
        .collect();

    DisplayModel {
        total_submissions: state.all().len(),
        rows,
        empty: state.filtered().is_empty(),
        page,
        total_pages,
        page_label: format!("Page {page} of {total_pages}"),
        prev_enabled: pager.has_prev(page),
        next_enabled: pager.has_next(page),
        search_summary: search_summary(state),
    }
}

const HEADERS: [&str; 5] = ["Mobile Number", "Amount", "Bank", "UPI Pin", "Delete (id)"];

fn pad(value: &str, width: usize) -> String {
    let len = value.chars().count();
    if len >= width {
        value.to_string()
    } else {
        format!("{value}{}", " ".repeat(width - len))
    }
}

/// Draws the model as a terminal table. Styling follows the global
/// `colored` override, so `--no-color` output is plain text.
pub fn render_table(model: &DisplayModel) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        ":: {:<10}: {}\n",
        "Total",
        model.total_submissions.to_string().as_str().bold()
    ));
    if let Some(summary) = model.search_summary.as_deref() {
        out.push_str(&format!(":: {:<10}: {}\n", "Search", summary.dimmed()));
    }
    out.push('\n');

    if model.empty {
        out.push_str(&format!("{}\n\n", "No user submissions found.".yellow()));
    } else {
        let mut widths: Vec<usize> = HEADERS.iter().map(|h| h.chars().count()).collect();
        for row in &model.rows {
            let cells = [&row.mobile, &row.amount, &row.bank, &row.pin, &row.id];
            for (w, cell) in widths.iter_mut().zip(cells) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let header = HEADERS
            .iter()
            .zip(&widths)
            .map(|(h, w)| pad(h, *w))
            .collect::<Vec<_>>()
            .join("  ");
        out.push_str(&format!("{}\n", header.as_str().bold().white()));
        let rule = widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  ");
        out.push_str(&format!("{}\n", rule.as_str().dimmed()));

        for row in &model.rows {
            out.push_str(&format!(
                "{}  {}  {}  {}  {}\n",
                pad(&row.mobile, widths[0]),
                pad(&row.amount, widths[1]).as_str().green(),
                pad(&row.bank, widths[2]).as_str().blue(),
                pad(&row.pin, widths[3]).as_str().bold(),
                pad(&row.id, widths[4]).as_str().red(),
            ));
        }
        out.push('\n');
    }

    let prev = if model.prev_enabled {
        "[prev]".bold().to_string()
    } else {
        "[prev]".dimmed().to_string()
    };
    let next = if model.next_enabled {
        "[next]".bold().to_string()
    } else {
        "[next]".dimmed().to_string()
    };
    out.push_str(&format!("{prev}  {}  {next}\n", model.page_label));
    out
}

pub fn render_json(model: &DisplayModel) -> Vec<u8> {
    serde_json::to_vec_pretty(model).unwrap_or_else(|_| b"{}\n".to_vec())
}
