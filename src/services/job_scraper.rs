use std::io::{self, Write};
use std::time::Duration;

use itertools::Itertools;
use thirtyfour::error::WebDriverResult;
use thirtyfour::prelude::ElementQueryable;
use thirtyfour::{By, WebDriver};
use url::Url;

use crate::configuration::ScrapeSettings;
use crate::domain::job::{resolve_field, JobRecord, Lookup, StructuredPosting};
use crate::services::droid::Droid;
use crate::services::structured_data::parse_job_posting;

const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(500);

const COMPANY_SELECTOR: &str = "a[href*='/Overview/']";
// Short comma-containing text near the header. Heuristic: on unusual page
// layouts this can match unrelated text such as a date range.
const LOCATION_XPATH: &str =
    "(//div[contains(text(), ',') and string-length(normalize-space(text())) < 40])[1]";
const DESCRIPTION_XPATH: &str =
    "//div[contains(@class,'jobDescriptionContent') or @id='JobDescriptionContainer']";

pub fn build_search_url(base: &str, keyword: &str) -> String {
    format!("{}?sc.keyword={}", base, keyword.replace(' ', "%20"))
}

/// Keep well-formed listing links, de-duplicated in document order and capped
/// at the requested count.
pub fn filter_listing_urls(hrefs: Vec<String>, listing_path: &str, max: usize) -> Vec<String> {
    hrefs
        .into_iter()
        .filter(|href| href.contains(listing_path))
        .filter(|href| Url::parse(href).is_ok())
        .unique()
        .take(max)
        .collect()
}

async fn harvest_listing_urls(
    driver: &WebDriver,
    settings: &ScrapeSettings,
    max: usize,
) -> WebDriverResult<Vec<String>> {
    let mut hrefs = vec![];
    for a_tag in driver.find_all(By::Tag("a")).await? {
        if let Some(href) = a_tag.attr("href").await? {
            hrefs.push(href);
        }
    }

    Ok(filter_listing_urls(hrefs, &settings.listing_path, max))
}

/// One DOM fallback attempt. Any driver error or empty text is `NotFound`.
async fn lookup_text(driver: &WebDriver, by: By) -> Lookup {
    match driver.find(by).await {
        Ok(element) => match element.text().await {
            Ok(text) => Lookup::from_text(text),
            Err(_) => Lookup::NotFound,
        },
        Err(_) => Lookup::NotFound,
    }
}

/// Field-by-field merge: structured metadata wins, the page-specific lookup
/// fills the gaps, anything unresolved becomes the sentinel.
async fn resolve_record(driver: &WebDriver, structured: StructuredPosting) -> JobRecord {
    let title = resolve_field(structured.title, lookup_text(driver, By::Tag("h1")).await);
    let company = resolve_field(
        structured.company,
        lookup_text(driver, By::Css(COMPANY_SELECTOR)).await,
    );
    let location = resolve_field(
        structured.location,
        lookup_text(driver, By::XPath(LOCATION_XPATH)).await,
    );
    let description = resolve_field(
        structured.description,
        lookup_text(driver, By::XPath(DESCRIPTION_XPATH)).await,
    );

    JobRecord {
        title,
        company,
        location,
        description,
    }
}

/// Visit one listing URL and build its record. `None` means the page never
/// rendered its heading within the wait window and the URL is skipped.
async fn scrape_job(
    driver: &WebDriver,
    settings: &ScrapeSettings,
    url: &str,
) -> WebDriverResult<Option<JobRecord>> {
    driver.goto(url).await?;

    let heading = driver
        .query(By::Tag("h1"))
        .wait(
            Duration::from_secs(settings.page_load_timeout_secs),
            WAIT_POLL_INTERVAL,
        )
        .first()
        .await;
    if heading.is_err() {
        log::warn!("Job page never rendered a heading, skipping: {}", url);
        return Ok(None);
    }

    tokio::time::sleep(Duration::from_secs(settings.render_pause_secs)).await;

    let page_source = driver.source().await?;
    let structured = parse_job_posting(&page_source);
    let record = resolve_record(driver, structured).await;

    Ok(Some(record))
}

/// Run the whole pipeline: open the search page, let the operator clear any
/// interstitial, harvest listing links, then resolve one record per link.
/// URL-level failures are logged and skipped; the run always completes.
pub async fn get_jobs(
    droid: &Droid,
    settings: &ScrapeSettings,
    keyword: &str,
    num_jobs: usize,
) -> anyhow::Result<Vec<JobRecord>> {
    let driver = &droid.driver;

    let search_url = build_search_url(&settings.search_url, keyword);
    driver.goto(&search_url).await?;

    wait_for_operator()?;
    tokio::time::sleep(Duration::from_secs(settings.render_pause_secs)).await;

    let urls = harvest_listing_urls(driver, settings, num_jobs).await?;
    log::info!("Found {} job urls", urls.len());

    let mut records = vec![];
    for url in urls.iter() {
        match scrape_job(driver, settings, url).await {
            Ok(Some(record)) => {
                log::info!("{}", record.title);
                records.push(record);
            }
            Ok(None) => {}
            Err(e) => log::error!("Driver error on {}: {:?}", url, e),
        }
    }

    Ok(records)
}

fn wait_for_operator() -> io::Result<()> {
    print!("Press ENTER once job listings are visible... ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;

    Ok(())
}
