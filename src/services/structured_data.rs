use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;

use crate::domain::job::StructuredPosting;

const JOB_POSTING_TYPE: &str = "JobPosting";

/// Scan the page's JSON-LD blocks for the first JobPosting object and pull
/// out whatever subset of title/company/location/description it carries.
/// Malformed blocks are expected in the wild and skipped silently.
pub fn parse_job_posting(html: &str) -> StructuredPosting {
    let document = Html::parse_document(html);
    let script_selector = Selector::parse(r#"script[type="application/ld+json"]"#).unwrap();

    for script in document.select(&script_selector) {
        let raw: String = script.text().collect();
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }

        let data: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(_) => continue,
        };

        for candidate in candidate_objects(&data) {
            if is_job_posting(candidate) {
                // First JobPosting in document order wins.
                return posting_from_candidate(candidate);
            }
        }
    }

    StructuredPosting::default()
}

/// A block's top level can be a plain object, an array of objects, or an
/// object wrapping a @graph collection.
fn candidate_objects(data: &Value) -> Vec<&Value> {
    match data {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => match map.get("@graph") {
            Some(Value::Array(graph)) => graph.iter().collect(),
            _ => vec![data],
        },
        _ => vec![],
    }
}

fn is_job_posting(candidate: &Value) -> bool {
    match candidate.get("@type") {
        Some(Value::String(marker)) => marker == JOB_POSTING_TYPE,
        Some(Value::Array(markers)) => markers
            .iter()
            .any(|marker| marker.as_str() == Some(JOB_POSTING_TYPE)),
        _ => false,
    }
}

fn posting_from_candidate(candidate: &Value) -> StructuredPosting {
    let title = text_field(candidate, "title").or_else(|| text_field(candidate, "name"));

    let company = candidate
        .get("hiringOrganization")
        .and_then(|org| text_field(org, "name"));

    let location = candidate.get("jobLocation").and_then(location_text);

    let description = text_field(candidate, "description")
        .map(|html| strip_html(&html))
        .filter(|text| !text.is_empty());

    StructuredPosting {
        title,
        company,
        location,
        description,
    }
}

fn text_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// jobLocation is an object or a list of objects. The first entry whose
/// address yields any text wins: "locality, region" when both are present,
/// the locality alone otherwise.
fn location_text(location: &Value) -> Option<String> {
    let entries: Vec<&Value> = match location {
        Value::Array(items) => items.iter().collect(),
        Value::Object(_) => vec![location],
        _ => return None,
    };

    for entry in entries {
        let Some(address) = entry.get("address") else {
            continue;
        };
        let locality = text_field(address, "addressLocality");
        let region = text_field(address, "addressRegion");

        match (locality, region) {
            (Some(locality), Some(region)) => return Some(format!("{}, {}", locality, region)),
            (Some(locality), None) => return Some(locality),
            _ => {}
        }
    }

    None
}

/// Best-effort conversion of an HTML description into readable text.
/// Line breaks and paragraph ends become newlines, every other tag becomes a
/// space, the two common escapes are decoded, and whitespace is collapsed.
pub fn strip_html(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }

    let br_tag = Regex::new(r"(?i)<br\s*/?>").unwrap();
    let p_close_tag = Regex::new(r"(?i)</p\s*>").unwrap();
    let any_tag = Regex::new(r"<[^>]+>").unwrap();
    let space_before_newline = Regex::new(r"\s+\n").unwrap();
    let space_after_newline = Regex::new(r"\n\s+").unwrap();
    let space_run = Regex::new(r"[ \t]+").unwrap();

    let text = br_tag.replace_all(html, "\n");
    let text = p_close_tag.replace_all(&text, "\n");
    let text = any_tag.replace_all(&text, " ");
    let text = text.replace("&nbsp;", " ").replace("&amp;", "&");
    let text = space_before_newline.replace_all(&text, "\n");
    let text = space_after_newline.replace_all(&text, "\n");
    let text = space_run.replace_all(&text, " ");

    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::{parse_job_posting, strip_html};

    fn page(blocks: &[&str]) -> String {
        let scripts: Vec<String> = blocks
            .iter()
            .map(|block| {
                format!(
                    r#"<script type="application/ld+json">{}</script>"#,
                    block
                )
            })
            .collect();
        format!(
            "<html><head>{}</head><body><h1>Fallback Title</h1></body></html>",
            scripts.join("\n")
        )
    }

    #[test]
    fn extracts_all_fields_from_a_job_posting_block() {
        let html = page(&[r#"{
            "@type": "JobPosting",
            "title": "Data Scientist",
            "hiringOrganization": {"@type": "Organization", "name": "Acme Corp"},
            "jobLocation": {"address": {"addressLocality": "Austin", "addressRegion": "TX"}},
            "description": "<p>Build models.</p><p>Ship&nbsp;them.</p>"
        }"#]);

        let posting = parse_job_posting(&html);

        assert_eq!(posting.title.as_deref(), Some("Data Scientist"));
        assert_eq!(posting.company.as_deref(), Some("Acme Corp"));
        assert_eq!(posting.location.as_deref(), Some("Austin, TX"));
        assert_eq!(posting.description.as_deref(), Some("Build models.\nShip them."));
    }

    #[test]
    fn absent_fields_stay_absent() {
        let html = page(&[r#"{"@type": "JobPosting", "title": "Data Scientist"}"#]);

        let posting = parse_job_posting(&html);

        assert_eq!(posting.title.as_deref(), Some("Data Scientist"));
        assert_eq!(posting.company, None);
        assert_eq!(posting.location, None);
        assert_eq!(posting.description, None);
    }

    #[test]
    fn malformed_block_is_skipped_and_scanning_continues() {
        let html = page(&[
            r#"{"@type": "JobPosting", "title": unquoted}"#,
            r#"{"@type": "JobPosting", "title": "Backend Engineer"}"#,
        ]);

        let posting = parse_job_posting(&html);

        assert_eq!(posting.title.as_deref(), Some("Backend Engineer"));
    }

    #[test]
    fn first_job_posting_wins_across_blocks() {
        let html = page(&[
            r#"{"@type": "Organization", "name": "Not a job"}"#,
            r#"{"@type": "JobPosting", "title": "First"}"#,
            r#"{"@type": "JobPosting", "title": "Second", "hiringOrganization": {"name": "Late Corp"}}"#,
        ]);

        let posting = parse_job_posting(&html);

        assert_eq!(posting.title.as_deref(), Some("First"));
        assert_eq!(posting.company, None);
    }

    #[test]
    fn finds_job_posting_inside_a_graph_wrapper() {
        let html = page(&[r#"{
            "@context": "https://schema.org",
            "@graph": [
                {"@type": "WebPage", "name": "Listing"},
                {"@type": "JobPosting", "title": "Platform Engineer"}
            ]
        }"#]);

        let posting = parse_job_posting(&html);

        assert_eq!(posting.title.as_deref(), Some("Platform Engineer"));
    }

    #[test]
    fn matches_list_valued_type_markers() {
        let html = page(&[r#"{"@type": ["Thing", "JobPosting"], "title": "SRE"}"#]);

        let posting = parse_job_posting(&html);

        assert_eq!(posting.title.as_deref(), Some("SRE"));
    }

    #[test]
    fn top_level_array_of_candidates() {
        let html = page(&[r#"[
            {"@type": "BreadcrumbList"},
            {"@type": "JobPosting", "name": "Analyst"}
        ]"#]);

        let posting = parse_job_posting(&html);

        // name is the alternate when title is missing
        assert_eq!(posting.title.as_deref(), Some("Analyst"));
    }

    #[test]
    fn location_list_variants() {
        let both = page(&[r#"{"@type": "JobPosting",
            "jobLocation": [{"address": {"addressLocality": "Austin", "addressRegion": "TX"}}]}"#]);
        let city_only = page(&[r#"{"@type": "JobPosting",
            "jobLocation": [{"address": {"addressLocality": "Austin"}}]}"#]);
        let empty_address = page(&[r#"{"@type": "JobPosting",
            "jobLocation": [{"address": {}}]}"#]);

        assert_eq!(
            parse_job_posting(&both).location.as_deref(),
            Some("Austin, TX")
        );
        assert_eq!(
            parse_job_posting(&city_only).location.as_deref(),
            Some("Austin")
        );
        assert_eq!(parse_job_posting(&empty_address).location, None);
    }

    #[test]
    fn first_location_with_text_wins() {
        let html = page(&[r#"{"@type": "JobPosting", "jobLocation": [
            {"address": {}},
            {"address": {"addressLocality": "Remote"}},
            {"address": {"addressLocality": "Austin", "addressRegion": "TX"}}
        ]}"#]);

        let posting = parse_job_posting(&html);

        assert_eq!(posting.location.as_deref(), Some("Remote"));
    }

    #[test]
    fn no_structured_data_yields_empty_posting() {
        let html = "<html><body><h1>Just a page</h1></body></html>";

        let posting = parse_job_posting(html);

        assert_eq!(posting, Default::default());
    }

    #[test]
    fn strip_html_empty_input() {
        assert_eq!(strip_html(""), "");
    }

    #[test]
    fn strip_html_paragraph_and_nbsp() {
        assert_eq!(strip_html("<p>Hi&nbsp;there</p>"), "Hi there");
    }

    #[test]
    fn strip_html_breaks_become_newlines() {
        assert_eq!(
            strip_html("Requirements:<br/>Rust<br>SQL &amp; Python"),
            "Requirements:\nRust\nSQL & Python"
        );
    }

    #[test]
    fn strip_html_collapses_whitespace_around_newlines() {
        assert_eq!(
            strip_html("<p>First paragraph.   </p>\n   <p>Second\t\tparagraph.</p>"),
            "First paragraph.\nSecond paragraph."
        );
    }

    #[test]
    fn strip_html_is_idempotent() {
        let once = strip_html("<div><p>We are&nbsp;hiring.</p><br/>Apply  now &amp; soon.</div>");
        let twice = strip_html(&once);

        assert_eq!(once, twice);
    }

    #[test]
    fn strip_html_tags_only_input_yields_empty() {
        assert_eq!(strip_html("<div><span></span></div>"), "");
    }
}
