use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::Application;
use super::transitions::{ApplicationStatus, TransitionError};

/// Read access to the fields the list view filters and sorts on.
pub trait PipelineEntry {
    fn name(&self) -> &str;
    fn email(&self) -> &str;
    fn department(&self) -> Option<&str>;
    fn status(&self) -> ApplicationStatus;
    fn resume_score(&self) -> u8;
    fn applied_at(&self) -> DateTime<Utc>;
    fn updated_at(&self) -> DateTime<Utc>;
}

impl PipelineEntry for Application {
    fn name(&self) -> &str {
        &self.candidate.name
    }

    fn email(&self) -> &str {
        &self.candidate.email
    }

    fn department(&self) -> Option<&str> {
        self.candidate.department.as_deref()
    }

    fn status(&self) -> ApplicationStatus {
        self.status
    }

    fn resume_score(&self) -> u8 {
        self.resume_score
    }

    fn applied_at(&self) -> DateTime<Utc> {
        self.applied_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StatusFilter {
    #[default]
    All,
    Only(ApplicationStatus),
}

impl TryFrom<String> for StatusFilter {
    type Error = TransitionError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        if raw.trim().is_empty() || raw.trim().eq_ignore_ascii_case("all") {
            Ok(StatusFilter::All)
        } else {
            raw.parse().map(StatusFilter::Only)
        }
    }
}

impl From<StatusFilter> for String {
    fn from(filter: StatusFilter) -> Self {
        match filter {
            StatusFilter::All => "all".to_string(),
            StatusFilter::Only(status) => status.label().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    AppliedAt,
    ResumeScore,
    UpdatedAt,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// List-view query: which applications to show and in what order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationFilter {
    pub status: StatusFilter,
    #[serde(rename = "search")]
    pub search_text: Option<String>,
    pub score_min: Option<u8>,
    pub score_max: Option<u8>,
    #[serde(rename = "sort")]
    pub sort_key: SortKey,
    #[serde(rename = "order")]
    pub sort_order: SortOrder,
}

impl ApplicationFilter {
    fn matches<T: PipelineEntry>(&self, item: &T, needle: Option<&str>) -> bool {
        if let StatusFilter::Only(status) = self.status {
            if item.status() != status {
                return false;
            }
        }

        let score = item.resume_score();
        if self.score_min.is_some_and(|min| score < min) {
            return false;
        }
        if self.score_max.is_some_and(|max| score > max) {
            return false;
        }

        match needle {
            None => true,
            Some(needle) => {
                item.name().to_lowercase().contains(needle)
                    || item.email().to_lowercase().contains(needle)
                    || item
                        .department()
                        .is_some_and(|department| department.to_lowercase().contains(needle))
            }
        }
    }

    fn compare<T: PipelineEntry>(&self, a: &T, b: &T) -> Ordering {
        let ordering = match self.sort_key {
            SortKey::AppliedAt => a.applied_at().cmp(&b.applied_at()),
            SortKey::ResumeScore => a.resume_score().cmp(&b.resume_score()),
            SortKey::UpdatedAt => a.updated_at().cmp(&b.updated_at()),
        };

        match self.sort_order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

/// Filter then stable-sort `items`. Ties keep their input order.
pub fn apply_filters<T>(items: &[T], filter: &ApplicationFilter) -> Vec<T>
where
    T: PipelineEntry + Clone,
{
    let needle = filter
        .search_text
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_lowercase);

    let mut selected: Vec<T> = items
        .iter()
        .filter(|item| filter.matches(*item, needle.as_deref()))
        .cloned()
        .collect();
    selected.sort_by(|a, b| filter.compare(a, b));
    selected
}
