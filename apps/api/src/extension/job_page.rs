//! Job data from captured job-board pages.

use chrono::Utc;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::models::job::JobDescription;
use crate::tailoring::jd_parser::{extract_requirements, extract_skills};

/// Hosts (or URL fragments) that mark a page as a job posting.
pub const JOB_SITES: &[&str] = &[
    "linkedin.com",
    "indeed.com",
    "naukri.com",
    "monster.com",
    "glassdoor.com",
    "dice.com",
    "ziprecruiter.com",
    "builtin.com",
    "techcrunch.com",
    "careers",
];

const UNKNOWN: &str = "Unknown";

struct SiteSelectors {
    site: &'static str,
    title: &'static str,
    company: Option<&'static str>,
    description: &'static str,
}

/// Tried in order; the first board whose title and description both match wins.
const SITES: &[SiteSelectors] = &[
    SiteSelectors {
        site: "linkedin",
        title: "h2.show-more-less-html__title",
        company: Some("a[href*='company']"),
        description: ".show-more-less-html__markup",
    },
    SiteSelectors {
        site: "indeed",
        title: "h1.jobsearch-JobInfoHeader-title",
        company: Some("a[data-testid='company-name']"),
        description: "#jobDescriptionText",
    },
    SiteSelectors {
        site: "naukri",
        title: ".jd-header .naukri-text",
        company: None,
        description: ".job-desc",
    },
    SiteSelectors {
        site: "glassdoor",
        title: "[data-test='jobTitle']",
        company: Some("[data-test='companyName']"),
        description: "[data-test='JobDescription']",
    },
];

pub fn is_job_site(url: &str) -> bool {
    let url = url.to_lowercase();
    JOB_SITES.iter().any(|site| url.contains(site))
}

/// Pulls title, company and description out of a known job board's markup and
/// runs keyword extraction over the description. `None` when no board matches.
pub fn extract_job_from_html(html: &str, url: Option<&str>) -> Option<JobDescription> {
    let document = Html::parse_document(html);

    SITES.iter().find_map(|site| {
        let title = first_text(&document, site.title)?;
        let description = first_text(&document, site.description)?;
        let company = site
            .company
            .and_then(|selector| first_text(&document, selector))
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| UNKNOWN.to_string());

        debug!("Matched {} job page markup", site.site);

        Some(JobDescription {
            title: if title.is_empty() { UNKNOWN.to_string() } else { title },
            company,
            location: None,
            requirements: extract_requirements(&description),
            skills: extract_skills(&description),
            description,
            url: url.map(str::to_string),
            extracted_at: Some(Utc::now()),
        })
    })
}

fn first_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document.select(&selector).next().map(element_text)
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
