use chrono::{DateTime, NaiveDateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use talentflow::store::InMemoryStore;
use talentflow::workflows::access::{OrganizationId, Recruiter, Role, UserId};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) const SAMPLE_ORGANIZATION: OrganizationId = OrganizationId(1);

/// Recruiter directory used by local runs and the CLI demo.
pub(crate) fn sample_recruiters() -> Vec<Recruiter> {
    vec![
        Recruiter {
            id: UserId(1),
            name: "Dana Whitfield".to_string(),
            email: "dana@talentflow.test".to_string(),
            role: Role::OrgAdmin,
        },
        Recruiter {
            id: UserId(2),
            name: "Omar Haddad".to_string(),
            email: "omar@talentflow.test".to_string(),
            role: Role::Hr,
        },
        Recruiter {
            id: UserId(3),
            name: "Sofia Lindqvist".to_string(),
            email: "sofia@talentflow.test".to_string(),
            role: Role::Recruiter,
        },
    ]
}

pub(crate) fn sample_store() -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::default());
    store.seed_recruiters(SAMPLE_ORGANIZATION, sample_recruiters());
    store
}

/// Parse an RFC 3339 timestamp or a `YYYY-MM-DD HH:MM` wall time read as UTC.
pub(crate) fn parse_datetime(raw: &str) -> Result<DateTime<Utc>, String> {
    let trimmed = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M")
        .map(|naive| naive.and_utc())
        .map_err(|err| {
            format!("failed to parse '{raw}' as RFC 3339 or YYYY-MM-DD HH:MM ({err})")
        })
}
