use crate::results::*;

use snafu::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceSettings {
    #[serde(rename = "filePath")]
    pub file_path: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "tableIndex")]
    pub table_index: Option<usize>,
    #[serde(rename = "headerRows")]
    pub header_rows: Option<usize>,
}

/// Column positions, starting at 1 as in spreadsheets.
///
/// Every entry is optional and falls back on the layout of the 2019 page.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutSettings {
    #[serde(rename = "columnCount")]
    pub column_count: Option<JSValue>,
    #[serde(rename = "ridingColumnIndex")]
    pub riding_column_index: Option<JSValue>,
    #[serde(rename = "provinceColumnIndex")]
    pub province_column_index: Option<JSValue>,
    #[serde(rename = "winningPartyColumnIndex")]
    pub winning_party_column_index: Option<JSValue>,
    #[serde(rename = "winningVotesColumnIndex")]
    pub winning_votes_column_index: Option<JSValue>,
    #[serde(rename = "winningShareColumnIndex")]
    pub winning_share_column_index: Option<JSValue>,
    #[serde(rename = "marginVotesColumnIndex")]
    pub margin_votes_column_index: Option<JSValue>,
    #[serde(rename = "marginPercentColumnIndex")]
    pub margin_percent_column_index: Option<JSValue>,
    #[serde(rename = "turnoutColumnIndex")]
    pub turnout_column_index: Option<JSValue>,
    #[serde(rename = "firstPartyVotesColumnIndex")]
    pub first_party_votes_column_index: Option<JSValue>,
    #[serde(rename = "totalVotesColumnIndex")]
    pub total_votes_column_index: Option<JSValue>,
}

impl LayoutSettings {
    pub fn to_layout(&self) -> ResultsResult<ColumnLayout> {
        let d = ColumnLayout::WIKIPEDIA_2019;
        Ok(ColumnLayout {
            width: read_js_int(&self.column_count)?.unwrap_or(d.width),
            riding: read_column(&self.riding_column_index)?.unwrap_or(d.riding),
            province: read_column(&self.province_column_index)?.unwrap_or(d.province),
            winning_party: read_column(&self.winning_party_column_index)?
                .unwrap_or(d.winning_party),
            winning_votes: read_column(&self.winning_votes_column_index)?
                .unwrap_or(d.winning_votes),
            winning_share: read_column(&self.winning_share_column_index)?
                .unwrap_or(d.winning_share),
            winning_margin_num: read_column(&self.margin_votes_column_index)?
                .unwrap_or(d.winning_margin_num),
            winning_margin_percent: read_column(&self.margin_percent_column_index)?
                .unwrap_or(d.winning_margin_percent),
            turnout: read_column(&self.turnout_column_index)?.unwrap_or(d.turnout),
            first_party_votes: read_column(&self.first_party_votes_column_index)?
                .unwrap_or(d.first_party_votes),
            votes_total: read_column(&self.total_votes_column_index)?.unwrap_or(d.votes_total),
        })
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct HeaderLabel {
    pub column: JSValue,
    pub label: String,
}

/// Labels expected in one of the header rows.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct HeaderCheck {
    /// The header row, starting at 1.
    pub row: JSValue,
    pub labels: Vec<HeaderLabel>,
}

impl HeaderCheck {
    pub fn row_index(&self) -> ResultsResult<usize> {
        read_column(&Some(self.row.clone()))?.context(ParsingJsonNumberSnafu {})
    }

    /// The (0-based column, label) pairs.
    pub fn column_labels(&self) -> ResultsResult<Vec<(usize, String)>> {
        let mut res = Vec::new();
        for l in self.labels.iter() {
            let column = read_column(&Some(l.column.clone()))?.context(ParsingJsonNumberSnafu {})?;
            res.push((column, l.label.clone()));
        }
        Ok(res)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesSettings {
    #[serde(rename = "onRowError")]
    pub on_row_error: Option<String>,
    #[serde(rename = "expectedHeader")]
    pub expected_header: Option<HeaderCheck>,
}

impl RulesSettings {
    pub fn failure_policy(&self) -> ResultsResult<Option<FailurePolicy>> {
        match self.on_row_error.as_deref() {
            None => Ok(None),
            Some("failFast") => Ok(Some(FailurePolicy::FailFast)),
            Some("skipAndReport") => Ok(Some(FailurePolicy::SkipAndReport)),
            Some(x) => {
                whatever!(
                    "Cannot use onRowError {:?}: expected failFast or skipAndReport",
                    x
                )
            }
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
    pub format: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultsConfig {
    #[serde(default)]
    pub source: SourceSettings,
    #[serde(default)]
    pub layout: LayoutSettings,
    #[serde(default)]
    pub rules: RulesSettings,
    #[serde(rename = "outputSettings", default)]
    pub output_settings: OutputSettings,
}

pub fn read_config(path: &str) -> ResultsResult<ResultsConfig> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    debug!("read config: {:?}", contents);
    let config: ResultsConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(config)
}

fn read_js_int(x: &Option<JSValue>) -> ResultsResult<Option<usize>> {
    match x {
        None => Ok(None),
        Some(JSValue::Number(n)) => n
            .as_u64()
            .map(|x| Some(x as usize))
            .context(ParsingJsonNumberSnafu {}),
        Some(JSValue::String(s)) => s
            .parse::<usize>()
            .ok()
            .map(Some)
            .context(ParsingJsonNumberSnafu {}),
        _ => None.context(ParsingJsonNumberSnafu {}),
    }
}

// The index starts at 1 to respect most conventions in the spreadsheet world
fn read_column(x: &Option<JSValue>) -> ResultsResult<Option<usize>> {
    match read_js_int(x)? {
        Some(0) => whatever!("Column and row indices start at 1, found 0"),
        Some(i) => Ok(Some(i - 1)),
        None => Ok(None),
    }
}
