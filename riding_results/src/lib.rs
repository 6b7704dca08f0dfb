/*!
Parser for the per-riding results table of a Canadian federal election.

Each row of the table, once split into its cells, becomes an [`ElectionRow`].
The mapping from columns to fields is described by a [`ColumnLayout`], and
whole tables are parsed with the [`builder::Builder`].

```
use riding_results::{column_names, parse_row, Cell, ColumnLayout, Party};

let mut cells: Vec<Cell> = vec![Cell::empty(); 20];
cells[0] = "Beaches—East York".into();
cells[1] = "Ontario".into();
cells[5] = "Lib".into();
cells[6] = "24,456".into();
for c in [7, 9, 10] {
    cells[c] = "50.0%".into();
}

let row = parse_row(&cells, &ColumnLayout::WIKIPEDIA_2019)?;
assert_eq!(row.winning_party, Party::Lib);
assert_eq!(row.to_record().len(), column_names().len());
# Ok::<(), riding_results::ParseError>(())
```
*/

pub mod builder;
mod config;

use lazy_static::lazy_static;
use regex::Regex;
use snafu::prelude::*;

use std::fmt::Display;
use std::num::{ParseFloatError, ParseIntError};

pub use crate::builder::{parse_rows, ParsedTable, RejectedRow};
pub use crate::config::*;

// ********* Parties ***********

/// The closed set of parties tracked by the results table.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum Party {
    Lib,
    Con,
    Ndp,
    Bq,
    Green,
    Ppc,
    Ind,
    Other,
}

// (party, code in the table, record field, export column)
// The order is the order of the vote columns in the table.
const PARTY_TABLE: [(Party, &str, &str, &str); 8] = [
    (Party::Lib, "Lib", "LIB", "votes_lib"),
    (Party::Con, "Con", "CON", "votes_con"),
    (Party::Ndp, "NDP", "NDP", "votes_ndp"),
    (Party::Bq, "BQ", "BQ", "votes_bq"),
    (Party::Green, "Grn", "GREEN", "votes_green"),
    (Party::Ppc, "PPC", "PPC", "votes_ppc"),
    (Party::Ind, "Ind", "IND", "votes_ind"),
    (Party::Other, "Other", "OTHER", "votes_other"),
];

impl Party {
    pub const ALL: [Party; 8] = [
        Party::Lib,
        Party::Con,
        Party::Ndp,
        Party::Bq,
        Party::Green,
        Party::Ppc,
        Party::Ind,
        Party::Other,
    ];

    /// Looks up a party by the exact code used in the table (case sensitive).
    pub fn from_code(code: &str) -> Option<Party> {
        PARTY_TABLE
            .iter()
            .find(|(_, c, _, _)| *c == code)
            .map(|(p, _, _, _)| *p)
    }

    pub(crate) fn position(&self) -> usize {
        *self as usize
    }

    /// The abbreviation used in the results table, such as `Grn`.
    pub fn code(&self) -> &'static str {
        PARTY_TABLE[self.position()].1
    }

    /// The name of the vote count field, such as `GREEN`.
    pub fn field_name(&self) -> &'static str {
        PARTY_TABLE[self.position()].2
    }

    /// The name of the vote count column in exports, such as `votes_green`.
    pub fn export_column(&self) -> &'static str {
        PARTY_TABLE[self.position()].3
    }
}

impl Display for Party {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ********* Records ***********

/// The votes received by each party in a riding.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct PartyVoteCounts {
    pub lib: u64,
    pub con: u64,
    pub ndp: u64,
    pub bq: u64,
    pub green: u64,
    pub ppc: u64,
    pub ind: u64,
    pub other: u64,
}

impl PartyVoteCounts {
    pub fn get(&self, party: Party) -> u64 {
        match party {
            Party::Lib => self.lib,
            Party::Con => self.con,
            Party::Ndp => self.ndp,
            Party::Bq => self.bq,
            Party::Green => self.green,
            Party::Ppc => self.ppc,
            Party::Ind => self.ind,
            Party::Other => self.other,
        }
    }

    fn get_mut(&mut self, party: Party) -> &mut u64 {
        match party {
            Party::Lib => &mut self.lib,
            Party::Con => &mut self.con,
            Party::Ndp => &mut self.ndp,
            Party::Bq => &mut self.bq,
            Party::Green => &mut self.green,
            Party::Ppc => &mut self.ppc,
            Party::Ind => &mut self.ind,
            Party::Other => &mut self.other,
        }
    }

    /// The counts in the order of `Party::ALL`.
    pub fn iter(&self) -> impl Iterator<Item = (Party, u64)> + '_ {
        Party::ALL.iter().map(move |p| (*p, self.get(*p)))
    }
}

/// The results of one riding.
#[derive(PartialEq, Debug, Clone)]
pub struct ElectionRow {
    pub riding: String,
    pub province: String,
    pub winning_party: Party,
    pub winning_votes: u64,
    /// Percentage of the votes cast, between 0 and 100.
    pub winning_share: f64,
    /// Vote difference with the runner-up.
    pub winning_margin_num: u64,
    pub winning_margin_percent: f64,
    pub turnout: f64,
    pub votes_total: u64,
    pub votes: PartyVoteCounts,
}

impl ElectionRow {
    pub const FIELD_NAMES: [&'static str; 10] = [
        "riding",
        "province",
        "winning_party",
        "winning_votes",
        "winning_share",
        "winning_margin_num",
        "winning_margin_percent",
        "turnout",
        "votes_total",
        "votes",
    ];

    /// Flattens the record, in the order of `column_names()`.
    pub fn to_record(&self) -> Vec<String> {
        let mut res = vec![
            self.riding.clone(),
            self.province.clone(),
            self.winning_party.code().to_string(),
            self.winning_votes.to_string(),
            self.winning_share.to_string(),
            self.winning_margin_num.to_string(),
            self.winning_margin_percent.to_string(),
            self.turnout.to_string(),
            self.votes_total.to_string(),
        ];
        res.extend(self.votes.iter().map(|(_, count)| count.to_string()));
        res
    }
}

impl Display for ElectionRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.riding, self.province)
    }
}

/// The column names of a flattened `ElectionRow`.
///
/// All the record fields except the vote counts container, followed by one
/// column per party.
pub fn column_names() -> Vec<String> {
    let fields = ElectionRow::FIELD_NAMES;
    fields[..fields.len() - 1]
        .iter()
        .map(|s| s.to_string())
        .chain(Party::ALL.iter().map(|p| p.export_column().to_string()))
        .collect()
}

// ********* Input cells ***********

/// The content of a table cell.
///
/// Cells may contain nested markup (a link around a riding name for
/// example), which is kept as a tree of child cells.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Cell {
    Text(String),
    Nodes(Vec<Cell>),
}

impl Cell {
    pub fn empty() -> Cell {
        Cell::Nodes(Vec::new())
    }

    /// The first text node that is not blank, trimmed.
    pub fn first_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s.trim()).filter(|t| !t.is_empty()),
            Cell::Nodes(children) => children.iter().find_map(|c| c.first_text()),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

// ********* Errors ***********

/// A single value that cannot be normalized.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ValueError {
    #[snafu(display("{value:?} is not a vote count"))]
    InvalidCount {
        value: String,
        source: ParseIntError,
    },
    #[snafu(display("{value:?} does not end with a percent sign"))]
    MissingPercentSign { value: String },
    #[snafu(display("{value:?} is not a percentage"))]
    InvalidPercent {
        value: String,
        source: ParseFloatError,
    },
    #[snafu(display("{value:?} is not a finite percentage"))]
    NonFinitePercent { value: String },
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ParseError {
    #[snafu(display("row has {found} cells, expected {expected}"))]
    Structure { expected: usize, found: usize },
    #[snafu(display("column {column} ({field}) is outside of rows of {width} cells"))]
    Layout {
        field: &'static str,
        column: usize,
        width: usize,
    },
    #[snafu(display("column {column} ({field}) has no text"))]
    MissingText { field: &'static str, column: usize },
    #[snafu(display("header column {column} reads {found:?}, expected {expected:?}"))]
    HeaderMismatch {
        column: usize,
        expected: String,
        found: String,
    },
    #[snafu(display("column {column} ({field}): {value:?} is not a known party code"))]
    Domain {
        field: &'static str,
        column: usize,
        value: String,
    },
    #[snafu(display("column {column} ({field}): {source}"))]
    Format {
        field: &'static str,
        column: usize,
        source: ValueError,
    },
}

/// The broad families of row failures.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ErrorKind {
    /// The row does not have the expected shape.
    Structure,
    /// A value is outside of its closed set.
    Domain,
    /// A number or a percentage cannot be read.
    Format,
}

impl ParseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::Structure { .. }
            | ParseError::Layout { .. }
            | ParseError::MissingText { .. }
            | ParseError::HeaderMismatch { .. } => ErrorKind::Structure,
            ParseError::Domain { .. } => ErrorKind::Domain,
            ParseError::Format { .. } => ErrorKind::Format,
        }
    }
}

// ********* Normalization ***********

// Placeholder for a party that did not run (en dash).
const PLACEHOLDER_DASH: &str = "\u{2013}";

lazy_static! {
    static ref PUNCTUATION: Regex = Regex::new(r"[^\w\s]").unwrap();
}

/// Reads a vote count such as `12,345`.
///
/// A missing text, a blank text or a placeholder dash count as zero.
pub fn parse_votes(text: Option<&str>) -> Result<u64, ValueError> {
    let text = text.map(str::trim).unwrap_or_default();
    if text.is_empty() || text == PLACEHOLDER_DASH {
        return Ok(0);
    }
    let digits = PUNCTUATION.replace_all(text, "");
    digits
        .trim()
        .parse::<u64>()
        .context(InvalidCountSnafu { value: text })
}

/// Reads a percentage such as `42.5%`. The percent sign is mandatory.
pub fn parse_percent(text: &str) -> Result<f64, ValueError> {
    let text = text.trim();
    let number = text
        .strip_suffix('%')
        .context(MissingPercentSignSnafu { value: text })?;
    let percent = number
        .trim()
        .parse::<f64>()
        .context(InvalidPercentSnafu { value: text })?;
    ensure!(percent.is_finite(), NonFinitePercentSnafu { value: text });
    Ok(percent)
}

// ********* Row parsing ***********

fn cell<'a>(
    cells: &'a [Cell],
    field: &'static str,
    column: usize,
) -> Result<&'a Cell, ParseError> {
    cells.get(column).context(LayoutSnafu {
        field,
        column,
        width: cells.len(),
    })
}

fn read_text<'a>(
    cells: &'a [Cell],
    field: &'static str,
    column: usize,
) -> Result<&'a str, ParseError> {
    cell(cells, field, column)?
        .first_text()
        .context(MissingTextSnafu { field, column })
}

fn read_votes(cells: &[Cell], field: &'static str, column: usize) -> Result<u64, ParseError> {
    parse_votes(cell(cells, field, column)?.first_text()).context(FormatSnafu { field, column })
}

fn read_percent(cells: &[Cell], field: &'static str, column: usize) -> Result<f64, ParseError> {
    let text = cell(cells, field, column)?.first_text().unwrap_or_default();
    parse_percent(text).context(FormatSnafu { field, column })
}

/// Parses one row of the results table.
pub fn parse_row(cells: &[Cell], layout: &ColumnLayout) -> Result<ElectionRow, ParseError> {
    ensure!(
        cells.len() == layout.width,
        StructureSnafu {
            expected: layout.width,
            found: cells.len()
        }
    );

    let party_code = read_text(cells, "winning_party", layout.winning_party)?;
    let winning_party = Party::from_code(party_code).context(DomainSnafu {
        field: "winning_party",
        column: layout.winning_party,
        value: party_code,
    })?;

    let mut votes = PartyVoteCounts::default();
    for p in Party::ALL {
        *votes.get_mut(p) = read_votes(cells, p.export_column(), layout.party_votes(p))?;
    }

    Ok(ElectionRow {
        riding: read_text(cells, "riding", layout.riding)?.to_string(),
        province: read_text(cells, "province", layout.province)?.to_string(),
        winning_party,
        winning_votes: read_votes(cells, "winning_votes", layout.winning_votes)?,
        winning_share: read_percent(cells, "winning_share", layout.winning_share)?,
        winning_margin_num: read_votes(cells, "winning_margin_num", layout.winning_margin_num)?,
        winning_margin_percent: read_percent(
            cells,
            "winning_margin_percent",
            layout.winning_margin_percent,
        )?,
        turnout: read_percent(cells, "turnout", layout.turnout)?,
        votes_total: read_votes(cells, "votes_total", layout.votes_total)?,
        votes,
    })
}
