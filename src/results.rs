use log::{debug, info, warn};

use riding_results::builder::Builder;
use riding_results::*;
use snafu::prelude::*;

use std::fs;
use std::path::{Path, PathBuf};

use text_diff::print_diff;

use crate::args::Args;
use crate::results::config_reader::*;

pub mod config_reader;
pub mod io_common;
pub mod io_export;
pub mod io_html;

pub const DEFAULT_URL: &str = "https://en.wikipedia.org/wiki/Results_of_the_2019_Canadian_federal_election";
pub const DEFAULT_TABLE_INDEX: usize = 4;
pub const DEFAULT_HEADER_ROWS: usize = 5;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ResultsError {
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing file {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error downloading {url}"))]
    Fetching { source: reqwest::Error, url: String },
    #[snafu(display("Error reading the JSON configuration"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Expected a positive integer in the JSON configuration"))]
    ParsingJsonNumber {},
    #[snafu(display("Error writing JSON"))]
    WritingJson { source: serde_json::Error },
    #[snafu(display("Error writing CSV"))]
    WritingCsv { source: csv::Error },
    #[snafu(display("The page has {count} tables, table {index} does not exist"))]
    MissingTable { index: usize, count: usize },
    #[snafu(display("The table has {count} header rows, header row {index} does not exist"))]
    MissingHeaderRow { index: usize, count: usize },
    #[snafu(display("Invalid table layout"))]
    InvalidLayout { source: ParseError },
    #[snafu(display("Unexpected table header"))]
    InvalidHeader { source: ParseError },
    #[snafu(display("Error parsing data row {position}"))]
    ParsingRow { source: ParseError, position: usize },
    #[snafu(display("No parent directory for {path}"))]
    MissingParentDir { path: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type ResultsResult<T> = Result<T, ResultsError>;

/// Where the results page comes from.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum PageSource {
    File(String),
    Url(String),
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum OutputFormat {
    /// One line per riding, numbered from 1.
    Listing,
    Csv,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> ResultsResult<OutputFormat> {
        match s {
            "listing" => Ok(OutputFormat::Listing),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            x => whatever!("Unknown output format {:?}: expected listing, csv or json", x),
        }
    }
}

/// All the settings of a run, once the command line and the configuration file are merged.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Settings {
    pub source: PageSource,
    pub table_index: usize,
    pub header_rows: usize,
    pub rules: ParseRules,
    /// (0-based header row, [(0-based column, label)])
    pub header_check: Option<(usize, Vec<(usize, String)>)>,
    pub out: Option<String>,
    pub format: OutputFormat,
    pub reference: Option<String>,
}

/// Merges the command line with the configuration file, the command line taking precedence.
///
/// `config_dir` is the directory of the configuration file, against which relative
/// input paths of the file are resolved.
pub fn build_settings(
    args: &Args,
    config: &ResultsConfig,
    config_dir: Option<&Path>,
) -> ResultsResult<Settings> {
    let source = match (&args.input, &args.url) {
        (Some(p), _) => PageSource::File(p.clone()),
        (None, Some(u)) => PageSource::Url(u.clone()),
        (None, None) => match (&config.source.file_path, &config.source.url) {
            (Some(p), _) => {
                let full: PathBuf = match config_dir {
                    Some(dir) => dir.join(p),
                    None => PathBuf::from(p),
                };
                PageSource::File(full.display().to_string())
            }
            (None, Some(u)) => PageSource::Url(u.clone()),
            (None, None) => PageSource::Url(DEFAULT_URL.to_string()),
        },
    };

    let failure_policy = if args.skip_bad_rows {
        FailurePolicy::SkipAndReport
    } else {
        config
            .rules
            .failure_policy()?
            .unwrap_or(FailurePolicy::FailFast)
    };

    let header_check = match &config.rules.expected_header {
        Some(hc) => Some((hc.row_index()?, hc.column_labels()?)),
        None => None,
    };

    let format_name = args
        .format
        .clone()
        .or_else(|| config.output_settings.format.clone());
    let format = match format_name {
        Some(f) => OutputFormat::parse(f.as_str())?,
        None => OutputFormat::Listing,
    };

    Ok(Settings {
        source,
        table_index: args
            .table_index
            .or(config.source.table_index)
            .unwrap_or(DEFAULT_TABLE_INDEX),
        header_rows: args
            .header_rows
            .or(config.source.header_rows)
            .unwrap_or(DEFAULT_HEADER_ROWS),
        rules: ParseRules {
            layout: config.layout.to_layout()?,
            failure_policy,
        },
        header_check,
        out: args
            .out
            .clone()
            .or_else(|| config.output_settings.output_path.clone()),
        format,
        reference: args.reference.clone(),
    })
}

/// Parses the results table of a page.
pub fn process_page(html: &str, settings: &Settings) -> ResultsResult<ParsedTable> {
    let raw = io_html::read_table(html, settings.table_index, settings.header_rows)?;
    info!(
        "Found {} header rows and {} data rows",
        raw.header.len(),
        raw.rows.len()
    );

    let mut builder = Builder::new(&settings.rules).context(InvalidLayoutSnafu {})?;
    if let Some((row, labels)) = &settings.header_check {
        for (column, label) in labels.iter() {
            builder = builder.expect_header(*column, label);
        }
        let header = raw.header.get(*row).context(MissingHeaderRowSnafu {
            index: *row + 1,
            count: raw.header.len(),
        })?;
        builder.check_header(header).context(InvalidHeaderSnafu {})?;
    }

    for (idx, cells) in raw.rows.iter().enumerate() {
        debug!("process_page: row {} has {} cells", idx + 1, cells.len());
        builder
            .add_row(cells)
            .context(ParsingRowSnafu { position: idx + 1 })?;
    }
    let table = builder.build();
    for r in table.rejected.iter() {
        warn!("Skipped data row {}: {}", r.position, r.error);
    }
    Ok(table)
}

pub(crate) fn check_reference(reference_path: &str, output: &str) -> ResultsResult<()> {
    let reference =
        fs::read_to_string(reference_path).context(OpeningFileSnafu {
            path: reference_path,
        })?;
    if reference != output {
        warn!("Found differences with the reference {:?}", reference_path);
        print_diff(reference.as_str(), output, "\n");
        whatever!("Difference detected between the output and the reference output")
    }
    info!("Output matches the reference {:?}", reference_path);
    Ok(())
}

pub fn run(settings: &Settings) -> ResultsResult<()> {
    info!("settings: {:?}", settings);
    let html = io_common::read_page(&settings.source)?;
    let table = process_page(html.as_str(), settings)?;

    let output = io_export::render(&table, settings.format)?;
    io_common::write_output(settings.out.as_deref(), output.as_str())?;

    if let Some(reference_path) = &settings.reference {
        check_reference(reference_path, output.as_str())?;
    }
    Ok(())
}

pub fn run_from_args(args: &Args) -> ResultsResult<()> {
    let (config, config_dir) = match &args.config {
        Some(config_path) => {
            info!("Reading configuration {:?}", config_path);
            let config = read_config(config_path)?;
            let dir = Path::new(config_path.as_str())
                .parent()
                .context(MissingParentDirSnafu { path: config_path })?
                .to_path_buf();
            (config, Some(dir))
        }
        None => (ResultsConfig::default(), None),
    };
    let settings = build_settings(args, &config, config_dir.as_deref())?;
    run(&settings)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use clap::Parser;

    pub(crate) fn data_row(riding: &str, party: &str, votes: [&str; 8]) -> String {
        let mut cells = vec![
            format!("<a href=\"/wiki/{}\">{}</a>", riding.replace(' ', "_"), riding),
            "Ontario".to_string(),
            String::new(),
            "<span style=\"background-color:red\"></span>".to_string(),
            String::new(),
            party.to_string(),
            votes[0].to_string(),
            "45.2%".to_string(),
            "10,000".to_string(),
            "18.5%".to_string(),
            "68.5%".to_string(),
        ];
        cells.extend(votes.iter().map(|v| v.to_string()));
        cells.push("47,000".to_string());
        let tds: Vec<String> = cells.iter().map(|c| format!("<td>{}</td>", c)).collect();
        format!("<tr>{}</tr>", tds.join(""))
    }

    /// A page with a decoy table before the results table, which has one header row.
    pub(crate) fn page(rows: &[String]) -> String {
        format!(
            "<html><body>\
             <table><tr><td>Summary</td></tr></table>\
             <table>\
             <tr><th>Electoral district</th><th>Province</th></tr>\
             {}\
             </table>\
             </body></html>",
            rows.join("\n")
        )
    }

    const VOTES: [&str; 8] = [
        "24,456", "14,000", "5,000", "0", "2,000", "1,500", "–", "0",
    ];

    fn settings(args: &[&str]) -> Settings {
        let mut full = vec!["ridings", "--table-index", "1", "--header-rows", "1"];
        full.extend_from_slice(args);
        let args = Args::parse_from(full);
        build_settings(&args, &ResultsConfig::default(), None).unwrap()
    }

    #[test]
    fn defaults() {
        let args = Args::parse_from(["ridings"]);
        let s = build_settings(&args, &ResultsConfig::default(), None).unwrap();
        assert_eq!(s.source, PageSource::Url(DEFAULT_URL.to_string()));
        assert_eq!(s.table_index, DEFAULT_TABLE_INDEX);
        assert_eq!(s.header_rows, DEFAULT_HEADER_ROWS);
        assert_eq!(s.rules, ParseRules::DEFAULT_RULES);
        assert_eq!(s.format, OutputFormat::Listing);
    }

    #[test]
    fn command_line_overrides_config() {
        let config: ResultsConfig = serde_json::from_str(
            r#"{"source": {"filePath": "page.html", "tableIndex": 2},
                "rules": {"onRowError": "failFast"},
                "outputSettings": {"format": "json"}}"#,
        )
        .unwrap();
        let args = Args::parse_from(["ridings", "--skip-bad-rows", "--format", "csv"]);
        let s = build_settings(&args, &config, Some(Path::new("data"))).unwrap();
        let expected: PathBuf = ["data", "page.html"].iter().collect();
        assert_eq!(s.source, PageSource::File(expected.display().to_string()));
        assert_eq!(s.table_index, 2);
        assert_eq!(s.rules.failure_policy, FailurePolicy::SkipAndReport);
        assert_eq!(s.format, OutputFormat::Csv);
    }

    #[test]
    fn unknown_format() {
        let args = Args::parse_from(["ridings", "--format", "xlsx"]);
        assert!(build_settings(&args, &ResultsConfig::default(), None).is_err());
    }

    #[test]
    fn parse_page() {
        let html = page(&[
            data_row("Beaches—East York", "Lib", VOTES),
            data_row("Outremont", "NDP", VOTES),
        ]);
        let table = process_page(&html, &settings(&[])).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].riding, "Beaches—East York");
        assert_eq!(table.rows[0].votes.lib, 24456);
        assert_eq!(table.rows[0].votes.ind, 0);
        assert_eq!(table.rows[1].winning_party, Party::Ndp);
    }

    #[test]
    fn bad_row_stops_parsing() {
        let html = page(&[
            data_row("Beaches—East York", "Lib", VOTES),
            data_row("Toronto Centre", "Green", VOTES),
        ]);
        let err = process_page(&html, &settings(&[])).unwrap_err();
        assert!(matches!(
            err,
            ResultsError::ParsingRow {
                position: 2,
                ref source
            } if source.kind() == ErrorKind::Domain
        ));
    }

    #[test]
    fn bad_row_is_skipped() {
        let mut bad_votes = VOTES;
        bad_votes[2] = "N/A";
        let html = page(&[
            data_row("Toronto Centre", "Lib", bad_votes),
            data_row("Beaches—East York", "Lib", VOTES),
        ]);
        let table = process_page(&html, &settings(&["--skip-bad-rows"])).unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rejected[0].position, 1);
        assert_eq!(table.rejected[0].error.kind(), ErrorKind::Format);
    }

    #[test]
    fn header_labels() {
        let html = page(&[data_row("Outremont", "NDP", VOTES)]);
        let mut s = settings(&[]);
        s.header_check = Some((0, vec![(0, "Electoral district".to_string())]));
        assert!(process_page(&html, &s).is_ok());

        s.header_check = Some((0, vec![(1, "Electoral district".to_string())]));
        let err = process_page(&html, &s).unwrap_err();
        assert!(matches!(err, ResultsError::InvalidHeader { .. }));

        s.header_check = Some((3, vec![]));
        let err = process_page(&html, &s).unwrap_err();
        assert!(matches!(err, ResultsError::MissingHeaderRow { index: 4, count: 1 }));
    }

    #[test]
    fn missing_table() {
        let html = page(&[]);
        let mut s = settings(&[]);
        s.table_index = 4;
        let err = process_page(&html, &s).unwrap_err();
        assert!(matches!(err, ResultsError::MissingTable { index: 4, count: 2 }));
    }
}
