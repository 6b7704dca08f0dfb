use log::{debug, info, warn};

pub use crate::config::*;
use crate::{parse_row, Cell, ElectionRow, HeaderMismatchSnafu, ParseError};
use snafu::ensure;

/// A row that was set aside under `FailurePolicy::SkipAndReport`.
#[derive(Debug)]
pub struct RejectedRow {
    /// The position of the row among the data rows, starting at 1.
    pub position: usize,
    pub error: ParseError,
}

/// The outcome of parsing a whole table.
#[derive(Debug)]
pub struct ParsedTable {
    /// The parsed records, in source order.
    pub rows: Vec<ElectionRow>,
    pub rejected: Vec<RejectedRow>,
}

/// A builder for parsing a table row by row.
///
/// ```
/// use riding_results::builder::Builder;
/// use riding_results::{Cell, FailurePolicy, ParseRules};
///
/// let rules = ParseRules {
///     failure_policy: FailurePolicy::SkipAndReport,
///     ..ParseRules::DEFAULT_RULES
/// };
/// let mut builder = Builder::new(&rules)?.expect_header(0, "Electoral district");
///
/// builder.check_header(&["Electoral district".into(), "Province".into()])?;
/// // Too short: set aside, not fatal.
/// builder.add_row(&[Cell::from("Ottawa Centre")])?;
///
/// let table = builder.build();
/// assert!(table.rows.is_empty());
/// assert_eq!(table.rejected[0].position, 1);
/// # Ok::<(), riding_results::ParseError>(())
/// ```
pub struct Builder {
    pub(crate) _rules: ParseRules,
    pub(crate) _header_labels: Vec<(usize, String)>,
    pub(crate) _rows: Vec<ElectionRow>,
    pub(crate) _rejected: Vec<RejectedRow>,
    pub(crate) _seen: usize,
}

impl Builder {
    pub fn new(rules: &ParseRules) -> Result<Builder, ParseError> {
        rules.layout.validate()?;
        Ok(Builder {
            _rules: rules.clone(),
            _header_labels: Vec::new(),
            _rows: Vec::new(),
            _rejected: Vec::new(),
            _seen: 0,
        })
    }

    /// Requires the given header column to read `label`.
    pub fn expect_header(mut self, column: usize, label: &str) -> Builder {
        self._header_labels.push((column, label.to_string()));
        self
    }

    /// Checks a header row against the expected labels.
    ///
    /// A header mismatch is always fatal, whatever the failure policy: it
    /// means that the layout itself cannot be trusted.
    pub fn check_header(&self, cells: &[Cell]) -> Result<(), ParseError> {
        for (column, label) in self._header_labels.iter() {
            let found = cells
                .get(*column)
                .and_then(|c| c.first_text())
                .unwrap_or_default();
            debug!("check_header: column {} found {:?}", column, found);
            ensure!(
                found == label.as_str(),
                HeaderMismatchSnafu {
                    column: *column,
                    expected: label.as_str(),
                    found
                }
            );
        }
        Ok(())
    }

    /// Parses the next data row.
    pub fn add_row(&mut self, cells: &[Cell]) -> Result<(), ParseError> {
        self._seen += 1;
        let position = self._seen;
        match parse_row(cells, &self._rules.layout) {
            Ok(row) => {
                debug!("add_row: {} {}", position, row);
                self._rows.push(row);
                Ok(())
            }
            Err(error) => match self._rules.failure_policy {
                FailurePolicy::FailFast => Err(error),
                FailurePolicy::SkipAndReport => {
                    warn!("add_row: skipping row {}: {}", position, error);
                    self._rejected.push(RejectedRow { position, error });
                    Ok(())
                }
            },
        }
    }

    pub fn build(self) -> ParsedTable {
        info!(
            "Parsed {} rows, rejected {}",
            self._rows.len(),
            self._rejected.len()
        );
        ParsedTable {
            rows: self._rows,
            rejected: self._rejected,
        }
    }
}

/// Parses all the data rows of a table, in order.
pub fn parse_rows(rows: &[Vec<Cell>], rules: &ParseRules) -> Result<ParsedTable, ParseError> {
    let mut builder = Builder::new(rules)?;
    for cells in rows {
        builder.add_row(cells)?;
    }
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::beaches_east_york;
    use crate::ErrorKind;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn sample_rows() -> Vec<Vec<Cell>> {
        let mut bad = beaches_east_york();
        bad[0] = "Toronto Centre".into();
        bad[5] = "Green".into();
        let mut other = beaches_east_york();
        other[0] = "Outremont".into();
        other[1] = "Quebec".into();
        other[5] = "NDP".into();
        vec![beaches_east_york(), bad, other]
    }

    #[test]
    fn fail_fast_stops_at_first_bad_row() {
        init();
        let err = parse_rows(&sample_rows(), &ParseRules::DEFAULT_RULES).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Domain);
    }

    #[test]
    fn skip_and_report_keeps_order() {
        init();
        let rules = ParseRules {
            failure_policy: FailurePolicy::SkipAndReport,
            ..ParseRules::DEFAULT_RULES
        };
        let table = parse_rows(&sample_rows(), &rules).unwrap();
        let ridings: Vec<&str> = table.rows.iter().map(|r| r.riding.as_str()).collect();
        assert_eq!(ridings, vec!["Beaches—East York", "Outremont"]);
        assert_eq!(table.rejected.len(), 1);
        assert_eq!(table.rejected[0].position, 2);
        assert_eq!(table.rejected[0].error.kind(), ErrorKind::Domain);
    }

    #[test]
    fn invalid_layout() {
        let rules = ParseRules {
            layout: ColumnLayout {
                votes_total: 25,
                ..ColumnLayout::WIKIPEDIA_2019
            },
            ..ParseRules::DEFAULT_RULES
        };
        assert!(Builder::new(&rules).is_err());
    }

    #[test]
    fn header_labels() {
        init();
        let builder = Builder::new(&ParseRules::DEFAULT_RULES)
            .unwrap()
            .expect_header(0, "Electoral district")
            .expect_header(1, "Province");
        let good: Vec<Cell> = vec![
            Cell::Nodes(vec![Cell::Nodes(vec!["Electoral district".into()])]),
            "Province\n".into(),
        ];
        assert!(builder.check_header(&good).is_ok());

        let swapped: Vec<Cell> = vec!["Province".into(), "Electoral district".into()];
        let err = builder.check_header(&swapped).unwrap_err();
        assert!(matches!(err, ParseError::HeaderMismatch { column: 0, .. }));

        let err = builder.check_header(&[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structure);
    }
}
