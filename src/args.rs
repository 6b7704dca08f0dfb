use clap::Parser;

/// Extracts the results of each riding from the Wikipedia page of a Canadian federal election.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON file describing the source page, the table layout and the output.
    /// Command line options take precedence over the content of this file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) A saved copy of the results page, in HTML.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (url) The page to download. Defaults to the results page of the 2019 election when neither
    /// --input nor --url is given.
    #[clap(short, long, value_parser)]
    pub url: Option<String>,

    /// (default 4) The position of the results table among all the tables of the page, starting at 0.
    #[clap(long, value_parser)]
    pub table_index: Option<usize>,

    /// (default 5) The number of header rows at the top of the results table.
    #[clap(long, value_parser)]
    pub header_rows: Option<usize>,

    /// (file path, 'stdout' or empty) If specified, the rows will be exported to the given location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (default listing) One of listing, csv or json.
    #[clap(short, long, value_parser)]
    pub format: Option<String>,

    /// (file path) A reference export. If provided, the output is compared with it and
    /// any difference is reported as an error.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// If passed as an argument, rows that cannot be parsed are reported and skipped instead of
    /// stopping the program.
    #[clap(long, takes_value = false)]
    pub skip_bad_rows: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
