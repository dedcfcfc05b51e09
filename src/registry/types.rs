//! Payload and summary types for the ClinicalTrials.gov v2 API.
//!
//! The payload structs mirror the slice of the registry schema this crate
//! reads. Every field is optional on the wire; accessors substitute the
//! `N/A` placeholder so summaries never carry holes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder substituted for any field the registry did not return.
pub const NOT_AVAILABLE: &str = "N/A";

fn or_na(field: &Option<String>) -> String {
    field.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Overall recruitment status accepted by the registry's status filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrialStatus {
    Recruiting,
    Completed,
    Terminated,
    ActiveNotRecruiting,
}

impl TrialStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Recruiting => "RECRUITING",
            Self::Completed => "COMPLETED",
            Self::Terminated => "TERMINATED",
            Self::ActiveNotRecruiting => "ACTIVE_NOT_RECRUITING",
        }
    }
}

impl fmt::Display for TrialStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trial phase accepted by the registry's term query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Phase1,
    Phase2,
    Phase3,
    Phase4,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Phase1 => "PHASE1",
            Self::Phase2 => "PHASE2",
            Self::Phase3 => "PHASE3",
            Self::Phase4 => "PHASE4",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Registry payload ─────────────────────────────────────────────────────

/// Top-level studies page. A missing `studies` key means zero results.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct StudiesPage {
    #[serde(default)]
    pub studies: Vec<Study>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Study {
    #[serde(default)]
    pub protocol_section: ProtocolSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProtocolSection {
    #[serde(default)]
    pub identification_module: IdentificationModule,
    #[serde(default)]
    pub eligibility_module: EligibilityModule,
    #[serde(default)]
    pub status_module: StatusModule,
    #[serde(default)]
    pub design_module: DesignModule,
    #[serde(default)]
    pub contacts_locations_module: ContactsLocationsModule,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IdentificationModule {
    pub nct_id: Option<String>,
    pub brief_title: Option<String>,
}

impl IdentificationModule {
    pub fn nct_id(&self) -> String {
        or_na(&self.nct_id)
    }

    pub fn brief_title(&self) -> String {
        or_na(&self.brief_title)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EligibilityModule {
    pub eligibility_criteria: Option<String>,
    pub sex: Option<String>,
    pub minimum_age: Option<String>,
    pub maximum_age: Option<String>,
}

impl EligibilityModule {
    pub fn criteria(&self) -> String {
        or_na(&self.eligibility_criteria)
    }

    pub fn sex(&self) -> String {
        or_na(&self.sex)
    }

    /// Age bounds joined as a single `min - max` range.
    pub fn age_range(&self) -> String {
        format!("{} - {}", or_na(&self.minimum_age), or_na(&self.maximum_age))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StatusModule {
    pub start_date_struct: Option<DateStruct>,
    pub completion_date_struct: Option<DateStruct>,
}

impl StatusModule {
    pub fn start_date(&self) -> String {
        date_or_na(&self.start_date_struct)
    }

    pub fn completion_date(&self) -> String {
        date_or_na(&self.completion_date_struct)
    }
}

fn date_or_na(field: &Option<DateStruct>) -> String {
    field
        .as_ref()
        .and_then(|d| d.date.clone())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DateStruct {
    pub date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DesignModule {
    pub phases: Option<Vec<String>>,
}

impl DesignModule {
    pub fn phases(&self) -> Vec<String> {
        self.phases
            .clone()
            .unwrap_or_else(|| vec![NOT_AVAILABLE.to_string()])
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ContactsLocationsModule {
    #[serde(default)]
    pub locations: Vec<Location>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Location {
    pub facility: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

impl Location {
    pub fn to_facility(&self) -> Facility {
        Facility {
            facility: or_na(&self.facility),
            city: or_na(&self.city),
            country: or_na(&self.country),
        }
    }
}

// ── Summaries ────────────────────────────────────────────────────────────

/// Count of trials matching a condition and status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialCount {
    pub count: usize,
    pub condition: String,
    pub status: TrialStatus,
    pub sample_titles: Vec<String>,
}

/// Eligibility criteria collected from recruiting trials of a condition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EligibilityReport {
    pub condition: String,
    pub number_of_trials: usize,
    pub criteria: Vec<TrialEligibility>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialEligibility {
    pub nct_id: String,
    pub title: String,
    pub criteria: String,
    pub sex: String,
    pub age_range: String,
}

/// Unique facilities running trials for a condition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacilityReport {
    pub condition: String,

    /// Country filter, or `all` when none was given
    pub country: String,

    /// Count of all unique facilities, even when the list below is capped
    pub number_of_facilities: usize,

    pub facilities: Vec<Facility>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Facility {
    pub facility: String,
    pub city: String,
    pub country: String,
}

/// Trials of a condition in a given phase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseReport {
    pub condition: String,
    pub phase: Phase,
    pub count: usize,
    pub trials: Vec<TrialPhases>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialPhases {
    pub nct_id: String,
    pub title: String,
    pub phase: Vec<String>,
    pub start_date: String,
    pub completion_date: String,
}

// ── Outcome ──────────────────────────────────────────────────────────────

/// Upstream non-200 preserved as a value, so the model still receives a
/// meaningful (if degraded) tool result instead of the call failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpstreamError {
    pub error: String,
    pub status: u16,
}

impl UpstreamError {
    pub fn from_status(status: reqwest::StatusCode) -> Self {
        Self {
            error: format!("API error: {}", status.as_u16()),
            status: status.as_u16(),
        }
    }
}

/// Outcome of one registry query: a summary, or the upstream error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryOutcome<T> {
    Summary(T),
    Upstream(UpstreamError),
}

impl<T> QueryOutcome<T> {
    pub fn summary(&self) -> Option<&T> {
        match self {
            Self::Summary(summary) => Some(summary),
            Self::Upstream(_) => None,
        }
    }

    pub fn upstream_error(&self) -> Option<&UpstreamError> {
        match self {
            Self::Summary(_) => None,
            Self::Upstream(err) => Some(err),
        }
    }
}
