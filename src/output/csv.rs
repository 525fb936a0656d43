//! Backlink report export
//!
//! One row per inbound edge, grouped by target page in rank order, followed
//! by one row per isolated page with the backlink columns left empty. Every
//! row of a group carries the target's rank number.

use crate::graph::{CrawlResult, LinkGraph};
use crate::output::{OutputError, OutputResult};
use csv::Writer;
use std::io::Write;
use std::path::Path;

/// Fixed report header
pub const CSV_HEADER: [&str; 6] = [
    "rank",
    "target_title",
    "target_url",
    "source_title",
    "source_url",
    "anchor_text",
];

/// Serializes a crawl result as a UTF-8 CSV report
///
/// The header is always present, even for an empty result. Edges whose
/// target never became a page (failed, excluded or beyond the page limit)
/// have no rank and are not exported.
///
/// # Example
///
/// ```
/// use linkmap::graph::{CrawlResult, Page};
///
/// let mut result = CrawlResult::new("https://example.com/");
/// result.pages.push(Page::new("https://example.com/", "Home"));
/// let csv = linkmap::export_csv(&result).unwrap();
/// assert!(csv.starts_with("rank,target_title,target_url"));
/// ```
pub fn export_csv(result: &CrawlResult) -> OutputResult<String> {
    let mut writer = Writer::from_writer(Vec::new());
    write_rows(&mut writer, result)?;

    let bytes = writer
        .into_inner()
        .map_err(|e| OutputError::Format(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| OutputError::Format(e.to_string()))
}

/// Writes the CSV report to a file, replacing any existing content
pub fn write_csv(result: &CrawlResult, output_path: &Path) -> OutputResult<()> {
    let mut writer = Writer::from_path(output_path)?;
    write_rows(&mut writer, result)?;
    writer.flush()?;
    Ok(())
}

fn write_rows<W: Write>(writer: &mut Writer<W>, result: &CrawlResult) -> OutputResult<()> {
    writer.write_record(CSV_HEADER)?;

    let graph = LinkGraph::build(result);

    for ranked in graph.linked() {
        let rank = ranked.rank.to_string();
        for link in &ranked.backlinks {
            writer.write_record([
                rank.as_str(),
                ranked.page.title.as_str(),
                ranked.page.url.as_str(),
                link.source_title.as_str(),
                link.source.as_str(),
                link.anchor_text.as_str(),
            ])?;
        }
    }

    for ranked in graph.isolated() {
        writer.write_record([
            ranked.rank.to_string().as_str(),
            ranked.page.title.as_str(),
            ranked.page.url.as_str(),
            "",
            "",
            "",
        ])?;
    }

    Ok(())
}
