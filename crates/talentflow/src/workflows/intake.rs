//! Resume intake: turns an uploaded resume into a pre-filled application form.
//!
//! Parsing is delegated to an external service. When it fails the candidate gets
//! an empty form to fill in by hand; intake never blocks an application.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::pipeline::CandidateProfile;
use super::WorkflowError;

/// Uploaded resume as received from the candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeDocument {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Best-effort structured profile returned by the parsing service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsedResume {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub skills: Vec<String>,
    pub education: Vec<String>,
    pub experience: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ParserError {
    #[error("resume parser unavailable: {0}")]
    Unavailable(String),
    #[error("unsupported resume format: {0}")]
    UnsupportedFormat(String),
    #[error("resume could not be read: {0}")]
    Malformed(String),
}

/// Contract for the external resume parsing service.
pub trait ResumeParser: Send + Sync {
    fn parse(&self, document: &ResumeDocument) -> Result<ParsedResume, ParserError>;
}

impl<F> ResumeParser for F
where
    F: Fn(&ResumeDocument) -> Result<ParsedResume, ParserError> + Send + Sync,
{
    fn parse(&self, document: &ResumeDocument) -> Result<ParsedResume, ParserError> {
        self(document)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrefillSource {
    Parsed,
    Manual,
}

/// Application form contents offered to the candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResumePrefill {
    pub source: PrefillSource,
    pub profile: CandidateProfile,
    pub education: Vec<String>,
    pub experience: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl ResumePrefill {
    fn manual(warning: String) -> Self {
        Self {
            source: PrefillSource::Manual,
            profile: CandidateProfile {
                name: String::new(),
                email: String::new(),
                phone: None,
                department: None,
                skills: Vec::new(),
            },
            education: Vec::new(),
            experience: Vec::new(),
            warning: Some(warning),
        }
    }
}

/// Pre-fill the application form from a resume, degrading to manual entry on failure.
pub fn prefill_from_resume<P>(parser: &P, document: &ResumeDocument) -> ResumePrefill
where
    P: ResumeParser + ?Sized,
{
    match parser.parse(document) {
        Ok(parsed) => {
            info!(
                file_name = %document.file_name,
                skills = parsed.skills.len(),
                "resume parsed"
            );
            ResumePrefill {
                source: PrefillSource::Parsed,
                profile: CandidateProfile {
                    name: clean(parsed.name),
                    email: clean(parsed.email),
                    phone: parsed.phone.map(|phone| phone.trim().to_string()),
                    department: None,
                    skills: dedupe_skills(parsed.skills),
                },
                education: parsed.education,
                experience: parsed.experience,
                warning: None,
            }
        }
        Err(err) => {
            let failure = WorkflowError::UpstreamServiceFailure(err.to_string());
            warn!(
                file_name = %document.file_name,
                error = %failure,
                "resume parsing failed; falling back to manual entry"
            );
            ResumePrefill::manual(failure.to_string())
        }
    }
}

fn clean(value: Option<String>) -> String {
    value.map(|text| text.trim().to_string()).unwrap_or_default()
}

fn dedupe_skills(skills: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(skills.len());
    for skill in skills {
        let skill = skill.trim();
        if skill.is_empty() || seen.iter().any(|kept| kept.eq_ignore_ascii_case(skill)) {
            continue;
        }
        seen.push(skill.to_string());
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> ResumeDocument {
        ResumeDocument {
            file_name: "ada.pdf".to_string(),
            content_type: Some("application/pdf".to_string()),
            bytes: b"%PDF-1.7".to_vec(),
        }
    }

    #[test]
    fn parsed_resume_fills_the_form() {
        let parser = |_: &ResumeDocument| {
            Ok::<_, ParserError>(ParsedResume {
                name: Some("  Ada Lovelace ".to_string()),
                email: Some("ada@example.com".to_string()),
                skills: vec!["Rust".into(), "rust".into(), " ".into(), "SQL".into()],
                education: vec!["BSc Mathematics".into()],
                ..ParsedResume::default()
            })
        };

        let prefill = prefill_from_resume(&parser, &document());
        assert_eq!(prefill.source, PrefillSource::Parsed);
        assert_eq!(prefill.profile.name, "Ada Lovelace");
        assert_eq!(prefill.profile.skills, vec!["Rust", "SQL"]);
        assert_eq!(prefill.education, vec!["BSc Mathematics"]);
        assert!(prefill.warning.is_none());
    }

    #[test]
    fn parser_outage_degrades_to_manual_entry() {
        let parser = |_: &ResumeDocument| {
            Err::<ParsedResume, _>(ParserError::Unavailable("connection refused".to_string()))
        };

        let prefill = prefill_from_resume(&parser, &document());
        assert_eq!(prefill.source, PrefillSource::Manual);
        assert!(prefill.profile.name.is_empty());
        assert!(prefill.profile.skills.is_empty());
        let warning = prefill.warning.expect("warning surfaced");
        assert!(warning.contains("upstream service unavailable"));
        assert!(warning.contains("connection refused"));
    }

    #[test]
    fn works_through_a_trait_object() {
        let parser: Box<dyn ResumeParser> = Box::new(|_: &ResumeDocument| {
            Err::<ParsedResume, _>(ParserError::UnsupportedFormat("image/png".to_string()))
        });
        let prefill = prefill_from_resume(parser.as_ref(), &document());
        assert_eq!(prefill.source, PrefillSource::Manual);
    }
}
