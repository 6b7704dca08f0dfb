// Primitives for reading the results table out of an HTML page.

use scraper::{ElementRef, Html, Node, Selector};
use snafu::prelude::*;

use crate::results::*;

/// The rows of a table, split into cells.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RawTable {
    pub header: Vec<Vec<Cell>>,
    pub rows: Vec<Vec<Cell>>,
}

fn selector(css: &str) -> ResultsResult<Selector> {
    match Selector::parse(css) {
        Ok(s) => Ok(s),
        Err(e) => whatever!("Invalid selector {:?}: {:?}", css, e),
    }
}

/// Selects the table at `table_index` (counting all the tables of the page, nested
/// ones included) and splits its rows into cells.
///
/// The first `header_rows` rows are returned separately, with both their `th` and `td`
/// cells. The data rows only keep their `td` cells.
pub fn read_table(html: &str, table_index: usize, header_rows: usize) -> ResultsResult<RawTable> {
    let document = Html::parse_document(html);
    let tables: Vec<ElementRef> = document.select(&selector("table")?).collect();
    debug!("read_table: found {} tables", tables.len());
    let table = tables.get(table_index).context(MissingTableSnafu {
        index: table_index,
        count: tables.len(),
    })?;

    let header_cells = selector("th, td")?;
    let data_cells = selector("td")?;
    let mut res = RawTable {
        header: Vec::new(),
        rows: Vec::new(),
    };
    for (idx, row) in table.select(&selector("tr")?).enumerate() {
        if idx < header_rows {
            res.header
                .push(row.select(&header_cells).map(to_cell).collect());
        } else {
            res.rows.push(row.select(&data_cells).map(to_cell).collect());
        }
    }
    Ok(res)
}

fn to_cell(element: ElementRef) -> Cell {
    let children = element
        .children()
        .filter_map(|node| match node.value() {
            Node::Text(text) => Some(Cell::Text(text.to_string())),
            Node::Element(_) => ElementRef::wrap(node).map(to_cell),
            _ => None,
        })
        .collect();
    Cell::Nodes(children)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::tests::page;

    #[test]
    fn nested_markup() {
        let html = r#"<table>
            <tr><th>District</th><th>Votes</th></tr>
            <tr><td><a href="/wiki/Outremont"><b>Outremont</b></a> (QC)</td><td>
            12,000</td><td></td></tr>
        </table>"#;
        let raw = read_table(html, 0, 1).unwrap();
        assert_eq!(raw.header.len(), 1);
        assert_eq!(raw.header[0][1].first_text(), Some("Votes"));
        assert_eq!(raw.rows.len(), 1);
        let row = &raw.rows[0];
        assert_eq!(row.len(), 3);
        assert_eq!(row[0].first_text(), Some("Outremont"));
        assert_eq!(row[1].first_text(), Some("12,000"));
        assert_eq!(row[2], Cell::empty());
    }

    #[test]
    fn header_rows_are_skipped() {
        let html = r#"<table>
            <tr><th>A</th></tr><tr><td>sub-header</td></tr>
            <tr><td>1</td></tr><tr><td>2</td></tr>
        </table>"#;
        let raw = read_table(html, 0, 2).unwrap();
        assert_eq!(raw.header[1][0].first_text(), Some("sub-header"));
        let firsts: Vec<Option<&str>> = raw.rows.iter().map(|r| r[0].first_text()).collect();
        assert_eq!(firsts, vec![Some("1"), Some("2")]);
    }

    #[test]
    fn table_index() {
        let html = page(&[]);
        let raw = read_table(&html, 0, 0).unwrap();
        assert_eq!(raw.rows[0][0].first_text(), Some("Summary"));
        assert!(read_table(&html, 2, 0).is_err());
    }
}
