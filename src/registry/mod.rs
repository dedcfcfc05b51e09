//! ClinicalTrials.gov query client.
//!
//! Four independent queries, each one GET against the studies endpoint with
//! its own field projection, page size, and filters. Upstream non-200
//! responses are captured as [`UpstreamError`] values; transport failures
//! propagate to the caller. No retries, no backoff.

mod types;

pub use types::{
    EligibilityReport, Facility, FacilityReport, Phase, PhaseReport, QueryOutcome, TrialCount,
    TrialEligibility, TrialPhases, TrialStatus, UpstreamError, NOT_AVAILABLE,
};

use reqwest::StatusCode;
use url::Url;

use crate::config::SummaryLimits;

use types::StudiesPage;

/// Public v2 studies endpoint.
pub const DEFAULT_BASE_URL: &str = "https://clinicaltrials.gov/api/v2/studies";

/// Page size for count queries; effectively "everything" for demo purposes.
const COUNT_PAGE_SIZE: u32 = 1000;
const LOCATION_PAGE_SIZE: u32 = 50;
const PHASE_PAGE_SIZE: u32 = 100;

/// Client for the ClinicalTrials.gov studies endpoint.
///
/// Owns its HTTP client; construct one per process and share it behind an
/// `Arc`. All queries are independent, so sharing is safe.
pub struct RegistryClient {
    http: reqwest::Client,
    base_url: Url,
    limits: SummaryLimits,
}

enum Fetched {
    Page(StudiesPage),
    Upstream(UpstreamError),
}

impl RegistryClient {
    pub fn new(base_url: Url, limits: SummaryLimits) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            limits,
        }
    }

    /// Count trials for a condition and recruitment status.
    ///
    /// The summary carries up to `sample_title_cap` brief titles alongside
    /// the count.
    pub async fn count_trials(
        &self,
        condition: &str,
        status: TrialStatus,
    ) -> anyhow::Result<QueryOutcome<TrialCount>> {
        let params = [
            ("format", "json".to_string()),
            ("pageSize", COUNT_PAGE_SIZE.to_string()),
            ("query.cond", condition.to_string()),
            ("filter.overallStatus", status.to_string()),
            ("fields", "NCTId,BriefTitle".to_string()),
        ];

        let page = match self.fetch(&params).await? {
            Fetched::Page(page) => page,
            Fetched::Upstream(err) => return Ok(QueryOutcome::Upstream(err)),
        };

        let sample_titles = page
            .studies
            .iter()
            .take(self.limits.sample_title_cap)
            .map(|s| s.protocol_section.identification_module.brief_title())
            .collect();

        Ok(QueryOutcome::Summary(TrialCount {
            count: page.studies.len(),
            condition: condition.to_string(),
            status,
            sample_titles,
        }))
    }

    /// Collect eligibility criteria from recruiting trials of a condition.
    ///
    /// `max_trials` bounds the page size; `None` uses the configured
    /// default.
    pub async fn eligibility_criteria(
        &self,
        condition: &str,
        max_trials: Option<u32>,
    ) -> anyhow::Result<QueryOutcome<EligibilityReport>> {
        let max_trials = max_trials.unwrap_or(self.limits.eligibility_max_trials);
        let params = [
            ("format", "json".to_string()),
            ("pageSize", max_trials.to_string()),
            ("query.cond", condition.to_string()),
            ("filter.overallStatus", TrialStatus::Recruiting.to_string()),
            (
                "fields",
                "NCTId,BriefTitle,EligibilityCriteria,Sex,MinimumAge,MaximumAge".to_string(),
            ),
        ];

        let page = match self.fetch(&params).await? {
            Fetched::Page(page) => page,
            Fetched::Upstream(err) => return Ok(QueryOutcome::Upstream(err)),
        };

        let criteria: Vec<TrialEligibility> = page
            .studies
            .iter()
            .map(|study| {
                let protocol = &study.protocol_section;
                let eligibility = &protocol.eligibility_module;
                TrialEligibility {
                    nct_id: protocol.identification_module.nct_id(),
                    title: protocol.identification_module.brief_title(),
                    criteria: eligibility.criteria(),
                    sex: eligibility.sex(),
                    age_range: eligibility.age_range(),
                }
            })
            .collect();

        Ok(QueryOutcome::Summary(EligibilityReport {
            condition: condition.to_string(),
            number_of_trials: criteria.len(),
            criteria,
        }))
    }

    /// List unique facilities running trials for a condition, optionally
    /// filtered by country (case-insensitive).
    ///
    /// A facility is duplicate when its (facility, city, country) triple
    /// was already seen in this call; first-seen order is kept. The
    /// returned list is capped at `facility_cap`, the reported total is
    /// not.
    pub async fn trial_locations(
        &self,
        condition: &str,
        country: Option<&str>,
    ) -> anyhow::Result<QueryOutcome<FacilityReport>> {
        let mut params = vec![
            ("format", "json".to_string()),
            ("pageSize", LOCATION_PAGE_SIZE.to_string()),
            ("query.cond", condition.to_string()),
            (
                "fields",
                "NCTId,BriefTitle,LocationFacility,LocationCity,LocationCountry".to_string(),
            ),
        ];
        if let Some(country) = country {
            params.push(("query.locn", country.to_string()));
        }

        let page = match self.fetch(&params).await? {
            Fetched::Page(page) => page,
            Fetched::Upstream(err) => return Ok(QueryOutcome::Upstream(err)),
        };

        let mut facilities: Vec<Facility> = Vec::new();
        for study in &page.studies {
            for location in &study.protocol_section.contacts_locations_module.locations {
                if let Some(filter) = country {
                    let location_country = location.country.as_deref().unwrap_or("");
                    if location_country.to_lowercase() != filter.to_lowercase() {
                        continue;
                    }
                }

                let entry = location.to_facility();
                if !facilities.contains(&entry) {
                    facilities.push(entry);
                }
            }
        }

        let number_of_facilities = facilities.len();
        facilities.truncate(self.limits.facility_cap);

        Ok(QueryOutcome::Summary(FacilityReport {
            condition: condition.to_string(),
            country: country.unwrap_or("all").to_string(),
            number_of_facilities,
            facilities,
        }))
    }

    /// List trials of a condition in a given phase, with start and
    /// completion dates.
    pub async fn trial_phases(
        &self,
        condition: &str,
        phase: Phase,
    ) -> anyhow::Result<QueryOutcome<PhaseReport>> {
        let params = [
            ("format", "json".to_string()),
            ("pageSize", PHASE_PAGE_SIZE.to_string()),
            ("query.cond", condition.to_string()),
            ("query.term", phase.to_string()),
            ("fields", "NCTId,BriefTitle,Phase,StartDate,CompletionDate".to_string()),
        ];

        let page = match self.fetch(&params).await? {
            Fetched::Page(page) => page,
            Fetched::Upstream(err) => return Ok(QueryOutcome::Upstream(err)),
        };

        let trials: Vec<TrialPhases> = page
            .studies
            .iter()
            .map(|study| {
                let protocol = &study.protocol_section;
                TrialPhases {
                    nct_id: protocol.identification_module.nct_id(),
                    title: protocol.identification_module.brief_title(),
                    phase: protocol.design_module.phases(),
                    start_date: protocol.status_module.start_date(),
                    completion_date: protocol.status_module.completion_date(),
                }
            })
            .collect();

        Ok(QueryOutcome::Summary(PhaseReport {
            condition: condition.to_string(),
            phase,
            count: trials.len(),
            trials,
        }))
    }

    /// Issue one GET and split the outcome: 200 parses into a page,
    /// anything else becomes an upstream error value.
    async fn fetch(&self, params: &[(&str, String)]) -> anyhow::Result<Fetched> {
        let response = self
            .http
            .get(self.base_url.clone())
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!(status = status.as_u16(), "Registry returned an error status");
            return Ok(Fetched::Upstream(UpstreamError::from_status(status)));
        }

        tracing::debug!(url = %self.base_url, "Registry query succeeded");
        Ok(Fetched::Page(response.json().await?))
    }
}
