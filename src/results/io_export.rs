// Rendering of the parsed rows for the outside world.

use serde_json::json;
use serde_json::Value as JSValue;
use snafu::prelude::*;

use crate::results::*;

pub fn render(table: &ParsedTable, format: OutputFormat) -> ResultsResult<String> {
    match format {
        OutputFormat::Listing => Ok(render_listing(&table.rows)),
        OutputFormat::Csv => render_csv(&table.rows),
        OutputFormat::Json => {
            let js = table_to_json(table);
            let mut s = serde_json::to_string_pretty(&js).context(WritingJsonSnafu {})?;
            s.push('\n');
            Ok(s)
        }
    }
}

/// One line per riding, numbered from 1 in the order of the table.
fn render_listing(rows: &[ElectionRow]) -> String {
    rows.iter()
        .enumerate()
        .map(|(idx, r)| format!("{} {}\n", idx + 1, r))
        .collect()
}

fn render_csv(rows: &[ElectionRow]) -> ResultsResult<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(column_names()).context(WritingCsvSnafu {})?;
    for r in rows {
        wtr.write_record(r.to_record()).context(WritingCsvSnafu {})?;
    }
    let data = wtr
        .into_inner()
        .map_err(|e| e.into_error())
        .context(WritingFileSnafu { path: "csv buffer" })?;
    String::from_utf8(data).whatever_context("CSV output is not valid UTF-8")
}

fn row_to_json(r: &ElectionRow) -> JSValue {
    let mut votes = serde_json::Map::new();
    for (party, count) in r.votes.iter() {
        votes.insert(party.field_name().to_string(), json!(count));
    }
    json!({
        "riding": r.riding,
        "province": r.province,
        "winning_party": r.winning_party.code(),
        "winning_votes": r.winning_votes,
        "winning_share": r.winning_share,
        "winning_margin_num": r.winning_margin_num,
        "winning_margin_percent": r.winning_margin_percent,
        "turnout": r.turnout,
        "votes_total": r.votes_total,
        "votes": votes,
    })
}

fn table_to_json(table: &ParsedTable) -> JSValue {
    let rows: Vec<JSValue> = table.rows.iter().map(row_to_json).collect();
    let rejected: Vec<JSValue> = table
        .rejected
        .iter()
        .map(|r| {
            json!({
                "position": r.position,
                "kind": format!("{:?}", r.error.kind()),
                "error": r.error.to_string(),
            })
        })
        .collect();
    json!({
        "columns": column_names(),
        "rows": rows,
        "rejected": rejected,
    })
}
