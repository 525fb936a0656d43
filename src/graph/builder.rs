use crate::graph::{CrawlResult, Link, Page};
use std::collections::{HashMap, HashSet};

/// Counts distinct source URLs per target URL
///
/// Counting sources rather than edges keeps the number meaningful even for an
/// edge list that was not deduplicated.
pub fn inbound_counts(edges: &[Link]) -> HashMap<&str, usize> {
    let mut sources: HashMap<&str, HashSet<&str>> = HashMap::new();
    for edge in edges {
        sources
            .entry(edge.target.as_str())
            .or_default()
            .insert(edge.source.as_str());
    }
    sources
        .into_iter()
        .map(|(target, set)| (target, set.len()))
        .collect()
}

/// Recomputes `inbound_count` on every page from the edge set
pub fn finalize_inbound_counts(result: &mut CrawlResult) {
    let counts: HashMap<String, usize> = inbound_counts(&result.edges)
        .into_iter()
        .map(|(url, count)| (url.to_string(), count))
        .collect();

    for page in &mut result.pages {
        page.inbound_count = counts.get(&page.url).copied().unwrap_or(0);
    }
}

/// Retargets edges that point at a redirected URL to where it landed
///
/// Edges that collapse onto an existing `(source, target)` pair, or onto
/// their own source, are dropped (the first registration wins), and each
/// page's `outbound_links` are rebuilt from the surviving edges. Returns the
/// number of dropped edges.
pub fn apply_redirects(result: &mut CrawlResult, redirects: &HashMap<String, String>) -> usize {
    if redirects.is_empty() {
        return 0;
    }

    let before = result.edges.len();
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let edges = std::mem::take(&mut result.edges);

    for mut edge in edges {
        if let Some(landed) = redirects.get(&edge.target) {
            edge.target = landed.clone();
        }
        if edge.target == edge.source
            || !seen.insert((edge.source.clone(), edge.target.clone()))
        {
            continue;
        }
        result.edges.push(edge);
    }

    let mut outbound: HashMap<&str, Vec<String>> = HashMap::new();
    for edge in &result.edges {
        outbound
            .entry(edge.source.as_str())
            .or_default()
            .push(edge.target.clone());
    }
    for page in &mut result.pages {
        page.outbound_links = outbound.remove(page.url.as_str()).unwrap_or_default();
    }

    before - result.edges.len()
}

/// A page with its rank number and backlinks
#[derive(Debug, Clone)]
pub struct RankedPage<'a> {
    /// 1-based position in the ranking; shared by every backlink row
    pub rank: usize,
    pub page: &'a Page,
    pub inbound_count: usize,
    /// One edge per distinct source, in edge registration order
    pub backlinks: Vec<&'a Link>,
}

impl RankedPage<'_> {
    /// True for pages no other crawled page links to
    pub fn is_isolated(&self) -> bool {
        self.inbound_count == 0
    }
}

/// Rank-ordered view over a crawl result
///
/// Pages are ordered by inbound count (descending), then title, then URL, so
/// the ordering depends only on the edge set and never on crawl order.
#[derive(Debug, Clone)]
pub struct LinkGraph<'a> {
    ranked: Vec<RankedPage<'a>>,
}

impl<'a> LinkGraph<'a> {
    pub fn build(result: &'a CrawlResult) -> Self {
        let counts = inbound_counts(&result.edges);

        let mut backlinks: HashMap<&str, Vec<&'a Link>> = HashMap::new();
        let mut seen_pairs: HashSet<(&str, &str)> = HashSet::new();
        for edge in &result.edges {
            if seen_pairs.insert((edge.source.as_str(), edge.target.as_str())) {
                backlinks.entry(edge.target.as_str()).or_default().push(edge);
            }
        }

        // Pages are unique by URL; keep the first record if a caller built
        // a result by hand with duplicates.
        let mut seen_pages: HashSet<&str> = HashSet::new();
        let mut pages: Vec<&'a Page> = result
            .pages
            .iter()
            .filter(|p| seen_pages.insert(p.url.as_str()))
            .collect();

        pages.sort_by(|a, b| {
            let ca = counts.get(a.url.as_str()).copied().unwrap_or(0);
            let cb = counts.get(b.url.as_str()).copied().unwrap_or(0);
            cb.cmp(&ca)
                .then_with(|| a.title.cmp(&b.title))
                .then_with(|| a.url.cmp(&b.url))
        });

        let ranked = pages
            .into_iter()
            .enumerate()
            .map(|(idx, page)| RankedPage {
                rank: idx + 1,
                page,
                inbound_count: counts.get(page.url.as_str()).copied().unwrap_or(0),
                backlinks: backlinks.remove(page.url.as_str()).unwrap_or_default(),
            })
            .collect();

        Self { ranked }
    }

    /// All pages in rank order
    pub fn ranked(&self) -> &[RankedPage<'a>] {
        &self.ranked
    }

    /// Pages with at least one inbound link, in rank order
    pub fn linked(&self) -> impl Iterator<Item = &RankedPage<'a>> {
        self.ranked.iter().filter(|r| !r.is_isolated())
    }

    /// Pages with no inbound links, in rank order
    pub fn isolated(&self) -> impl Iterator<Item = &RankedPage<'a>> {
        self.ranked.iter().filter(|r| r.is_isolated())
    }

    /// Inbound count for a URL; 0 when it is not a recorded page
    pub fn inbound_count(&self, url: &str) -> usize {
        self.ranked
            .iter()
            .find(|r| r.page.url == url)
            .map(|r| r.inbound_count)
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(source: &str, target: &str) -> Link {
        Link {
            source: source.to_string(),
            target: target.to_string(),
            anchor_text: format!("to {}", target),
            source_title: source.to_uppercase(),
        }
    }

    fn scenario_a() -> CrawlResult {
        let mut result = CrawlResult::new("a");
        result.pages = vec![Page::new("a", "A"), Page::new("b", "B"), Page::new("c", "C")];
        result.edges = vec![link("a", "b"), link("a", "c"), link("b", "c")];
        result
    }

    #[test]
    fn test_inbound_counts_scenario_a() {
        let result = scenario_a();
        let counts = inbound_counts(&result.edges);
        assert_eq!(counts.get("a"), None);
        assert_eq!(counts.get("b"), Some(&1));
        assert_eq!(counts.get("c"), Some(&2));
    }

    #[test]
    fn test_inbound_counts_distinct_sources() {
        let edges = vec![link("a", "c"), link("a", "c"), link("b", "c")];
        assert_eq!(inbound_counts(&edges).get("c"), Some(&2));
    }

    #[test]
    fn test_redirected_targets_are_retargeted_and_collapsed() {
        let mut result = CrawlResult::new("a");
        let mut home = Page::new("a", "A");
        home.outbound_links = vec!["old".to_string(), "new".to_string(), "a-alias".to_string()];
        result.pages = vec![home, Page::new("new", "New")];
        result.edges = vec![link("a", "old"), link("a", "new"), link("a", "a-alias")];

        let redirects = HashMap::from([
            ("old".to_string(), "new".to_string()),
            ("a-alias".to_string(), "a".to_string()),
        ]);
        assert_eq!(apply_redirects(&mut result, &redirects), 2);

        assert_eq!(result.edges.len(), 1);
        assert_eq!(result.edges[0].target, "new");
        assert_eq!(result.edges[0].anchor_text, "to old");
        assert_eq!(result.pages[0].outbound_links, vec!["new".to_string()]);

        finalize_inbound_counts(&mut result);
        assert_eq!(result.pages[1].inbound_count, 1);
    }

    #[test]
    fn test_finalize_sets_page_counts() {
        let mut result = scenario_a();
        finalize_inbound_counts(&mut result);
        let counts: Vec<usize> = result.pages.iter().map(|p| p.inbound_count).collect();
        assert_eq!(counts, vec![0, 1, 2]);
    }

    #[test]
    fn test_rank_order_scenario_a() {
        let result = scenario_a();
        let graph = LinkGraph::build(&result);

        let order: Vec<(&str, usize)> = graph
            .ranked()
            .iter()
            .map(|r| (r.page.url.as_str(), r.rank))
            .collect();
        assert_eq!(order, vec![("c", 1), ("b", 2), ("a", 3)]);

        assert_eq!(graph.linked().count(), 2);
        let isolated: Vec<&str> = graph.isolated().map(|r| r.page.url.as_str()).collect();
        assert_eq!(isolated, vec!["a"]);
    }

    #[test]
    fn test_ties_broken_by_title_then_url() {
        let mut result = CrawlResult::new("root");
        result.pages = vec![
            Page::new("https://x/3", "Same"),
            Page::new("https://x/2", "Alpha"),
            Page::new("https://x/1", "Same"),
        ];
        let graph = LinkGraph::build(&result);
        let urls: Vec<&str> = graph.ranked().iter().map(|r| r.page.url.as_str()).collect();
        assert_eq!(urls, vec!["https://x/2", "https://x/1", "https://x/3"]);
    }

    #[test]
    fn test_ranking_ignores_page_order() {
        let forward = scenario_a();
        let mut reversed = scenario_a();
        reversed.pages.reverse();

        let a: Vec<String> = LinkGraph::build(&forward)
            .ranked()
            .iter()
            .map(|r| r.page.url.clone())
            .collect();
        let b: Vec<String> = LinkGraph::build(&reversed)
            .ranked()
            .iter()
            .map(|r| r.page.url.clone())
            .collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_backlinks_keep_registration_order() {
        let result = scenario_a();
        let graph = LinkGraph::build(&result);
        let top = &graph.ranked()[0];
        let sources: Vec<&str> = top.backlinks.iter().map(|l| l.source.as_str()).collect();
        assert_eq!(sources, vec!["a", "b"]);
        assert_eq!(graph.inbound_count("c"), 2);
        assert_eq!(graph.inbound_count("missing"), 0);
    }
}
