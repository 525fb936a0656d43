//! Markdown summary generation
//!
//! This module generates a human-readable markdown summary of a crawl run:
//! run information, counters, the most linked-to pages and the isolated
//! pages nothing links to.

use crate::graph::{CrawlResult, LinkGraph};
use crate::output::OutputResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Pages listed in the "Top Linked Pages" table
const TOP_PAGES: usize = 20;

/// Isolated pages listed before the list is truncated
const MAX_ISOLATED: usize = 50;

/// Generates a markdown summary and writes it to a file
///
/// # Arguments
///
/// * `result` - The finished crawl
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(result: &CrawlResult, output_path: &Path) -> OutputResult<()> {
    let generated_at = chrono::Utc::now().to_rfc3339();
    let markdown = format_markdown_summary(result, &generated_at);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl result as markdown
pub fn format_markdown_summary(result: &CrawlResult, generated_at: &str) -> String {
    let graph = LinkGraph::build(result);
    let stats = &result.stats;
    let mut md = String::new();

    md.push_str("# Linkmap Internal Link Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Base URL**: {}\n", result.base_url));
    md.push_str(&format!("- **Generated**: {}\n", generated_at));
    md.push_str(&format!("- **Outcome**: {}\n", result.outcome.as_str()));
    md.push_str(&format!(
        "- **Duration**: {:.2} seconds\n\n",
        stats.elapsed_ms as f64 / 1000.0
    ));

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str("| Metric | Count |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!("| Pages | {} |\n", result.pages.len()));
    md.push_str(&format!("| Internal Links | {} |\n", result.edges.len()));
    md.push_str(&format!("| Linked Pages | {} |\n", graph.linked().count()));
    md.push_str(&format!("| Isolated Pages | {} |\n", graph.isolated().count()));
    md.push_str(&format!("| Seeds | {} |\n", stats.seeds));
    md.push_str(&format!("| Fetched | {} |\n", stats.fetched));
    md.push_str(&format!("| Failed | {} |\n", stats.failed));
    md.push_str(&format!("| Excluded | {} |\n", stats.excluded));
    md.push_str(&format!("| Links Rejected | {} |\n", stats.links_rejected));
    md.push_str(&format!("| Duplicate Links | {} |\n\n", stats.duplicate_links));

    // Most linked-to pages
    if graph.linked().next().is_some() {
        md.push_str(&format!("## Top {} Linked Pages\n\n", TOP_PAGES));
        md.push_str("| Rank | Inbound | Title | URL |\n");
        md.push_str("|------|---------|-------|-----|\n");

        for ranked in graph.linked().take(TOP_PAGES) {
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                ranked.rank,
                ranked.inbound_count,
                escape_cell(&ranked.page.title),
                ranked.page.url
            ));
        }
        md.push('\n');
    }

    // Isolated pages
    let isolated: Vec<_> = graph.isolated().collect();
    if !isolated.is_empty() {
        md.push_str("## Isolated Pages\n\n");
        md.push_str(&format!("Total: {}\n\n", isolated.len()));
        for ranked in isolated.iter().take(MAX_ISOLATED) {
            md.push_str(&format!("- [{}]({})\n", ranked.page.title, ranked.page.url));
        }
        if isolated.len() > MAX_ISOLATED {
            md.push_str(&format!("\n... and {} more\n\n", isolated.len() - MAX_ISOLATED));
        } else {
            md.push('\n');
        }
    }

    md
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Link, Page};

    fn create_test_result() -> CrawlResult {
        let mut result = CrawlResult::new("https://example.com/");
        result.pages = vec![
            Page::new("https://example.com/", "Home"),
            Page::new("https://example.com/pillar", "Pillar | Guide"),
            Page::new("https://example.com/orphan", "Orphan"),
        ];
        result.edges = vec![Link {
            source: "https://example.com/".to_string(),
            target: "https://example.com/pillar".to_string(),
            anchor_text: "guide".to_string(),
            source_title: "Home".to_string(),
        }];
        result.stats.fetched = 3;
        result.stats.elapsed_ms = 1500;
        result
    }

    #[test]
    fn test_format_markdown_summary() {
        let markdown = format_markdown_summary(&create_test_result(), "2024-01-01T00:00:00Z");

        assert!(markdown.contains("# Linkmap Internal Link Summary"));
        assert!(markdown.contains("- **Base URL**: https://example.com/"));
        assert!(markdown.contains("- **Generated**: 2024-01-01T00:00:00Z"));
        assert!(markdown.contains("- **Duration**: 1.50 seconds"));
        assert!(markdown.contains("| Pages | 3 |"));
    }

    #[test]
    fn test_markdown_lists_top_and_isolated() {
        let markdown = format_markdown_summary(&create_test_result(), "now");

        assert!(markdown.contains("| 1 | 1 | Pillar \\| Guide | https://example.com/pillar |"));
        assert!(markdown.contains("## Isolated Pages"));
        assert!(markdown.contains("- [Orphan](https://example.com/orphan)"));
        assert!(markdown.contains("- [Home](https://example.com/)"));
    }

    #[test]
    fn test_markdown_without_links() {
        let result = CrawlResult::new("https://example.com/");
        let markdown = format_markdown_summary(&result, "now");

        assert!(!markdown.contains("Top 20 Linked Pages"));
        assert!(!markdown.contains("## Isolated Pages"));
    }

    #[test]
    fn test_generate_markdown_summary_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.md");

        generate_markdown_summary(&create_test_result(), &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# Linkmap Internal Link Summary"));
    }
}
