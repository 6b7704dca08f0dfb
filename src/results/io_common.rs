use crate::results::*;

use snafu::prelude::*;
use std::io::Write;

pub const USER_AGENT: &str = concat!("ridings/", env!("CARGO_PKG_VERSION"));

pub fn read_page(source: &PageSource) -> ResultsResult<String> {
    match source {
        PageSource::File(path) => {
            info!("Attempting to read page {:?}", path);
            fs::read_to_string(path).context(OpeningFileSnafu { path })
        }
        PageSource::Url(url) => fetch_page(url),
    }
}

fn fetch_page(url: &str) -> ResultsResult<String> {
    info!("Attempting to download page {:?}", url);
    let client = reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .context(FetchingSnafu { url })?;
    let text = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .and_then(|r| r.text())
        .context(FetchingSnafu { url })?;
    debug!("Downloaded {} bytes from {:?}", text.len(), url);
    Ok(text)
}

/// Writes to the given file, or to the standard output for `None` and `stdout`.
pub fn write_output(out: Option<&str>, content: &str) -> ResultsResult<()> {
    match out {
        None | Some("stdout") => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(content.as_bytes())
                .context(WritingFileSnafu { path: "stdout" })
        }
        Some(path) => {
            info!("Writing output to {:?}", path);
            fs::write(path, content).context(WritingFileSnafu { path })
        }
    }
}
