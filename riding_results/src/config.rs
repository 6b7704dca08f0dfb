// ********* Column layout **********

use snafu::ensure;

use crate::{LayoutSnafu, ParseError, Party};

/// Position of every extracted field in a results row.
///
/// The indices are 0-based. The per-party vote counts occupy
/// `Party::ALL.len()` contiguous columns starting at `first_party_votes`,
/// in the order of `Party::ALL`.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct ColumnLayout {
    /// The exact number of cells a data row must have.
    pub width: usize,
    pub riding: usize,
    pub province: usize,
    pub winning_party: usize,
    pub winning_votes: usize,
    pub winning_share: usize,
    pub winning_margin_num: usize,
    pub winning_margin_percent: usize,
    pub turnout: usize,
    pub first_party_votes: usize,
    pub votes_total: usize,
}

impl ColumnLayout {
    /// The table "Results by riding" of the 2019 Canadian federal election
    /// page on the English Wikipedia.
    pub const WIKIPEDIA_2019: ColumnLayout = ColumnLayout {
        width: 20,
        riding: 0,
        province: 1,
        winning_party: 5,
        winning_votes: 6,
        winning_share: 7,
        winning_margin_num: 8,
        winning_margin_percent: 9,
        turnout: 10,
        first_party_votes: 11,
        votes_total: 19,
    };

    /// The column holding the votes of the given party.
    pub fn party_votes(&self, party: Party) -> usize {
        self.first_party_votes + party.position()
    }

    /// All the (field name, column) pairs, in record order.
    pub fn named_columns(&self) -> Vec<(&'static str, usize)> {
        let mut res = vec![
            ("riding", self.riding),
            ("province", self.province),
            ("winning_party", self.winning_party),
            ("winning_votes", self.winning_votes),
            ("winning_share", self.winning_share),
            ("winning_margin_num", self.winning_margin_num),
            ("winning_margin_percent", self.winning_margin_percent),
            ("turnout", self.turnout),
            ("votes_total", self.votes_total),
        ];
        for p in Party::ALL {
            res.push((p.export_column(), self.party_votes(p)));
        }
        res
    }

    /// Checks that every column falls inside a row.
    pub fn validate(&self) -> Result<(), ParseError> {
        for (field, column) in self.named_columns() {
            ensure!(
                column < self.width,
                LayoutSnafu {
                    field,
                    column,
                    width: self.width
                }
            );
        }
        Ok(())
    }
}

impl Default for ColumnLayout {
    fn default() -> Self {
        ColumnLayout::WIKIPEDIA_2019
    }
}

/// What to do when a single row cannot be parsed.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum FailurePolicy {
    /// The first bad row stops the whole table.
    FailFast,
    /// Bad rows are set aside with their error, and parsing continues.
    SkipAndReport,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParseRules {
    pub layout: ColumnLayout,
    pub failure_policy: FailurePolicy,
}

impl ParseRules {
    pub const DEFAULT_RULES: ParseRules = ParseRules {
        layout: ColumnLayout::WIKIPEDIA_2019,
        failure_policy: FailurePolicy::FailFast,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn reference_layout_is_valid() {
        assert!(ColumnLayout::WIKIPEDIA_2019.validate().is_ok());
        assert_eq!(ColumnLayout::WIKIPEDIA_2019.party_votes(Party::Lib), 11);
        assert_eq!(ColumnLayout::WIKIPEDIA_2019.party_votes(Party::Other), 18);
    }

    #[test]
    fn party_columns_must_fit() {
        let layout = ColumnLayout {
            first_party_votes: 13,
            ..ColumnLayout::WIKIPEDIA_2019
        };
        let err = layout.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structure);
        assert!(matches!(
            err,
            ParseError::Layout {
                field: "votes_other",
                column: 20,
                width: 20
            }
        ));
    }

    #[test]
    fn narrow_rows_are_rejected() {
        let layout = ColumnLayout {
            width: 19,
            ..ColumnLayout::WIKIPEDIA_2019
        };
        assert!(layout.validate().is_err());
    }
}
