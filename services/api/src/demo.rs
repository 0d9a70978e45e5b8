use crate::infra::{sample_store, SAMPLE_ORGANIZATION};
use chrono::{DateTime, Duration, Utc};
use clap::Args;
use talentflow::config::{AppConfig, WorkflowConfig};
use talentflow::error::AppError;
use talentflow::workflows::access::{RecruiterEdit, RequestContext, Role, UserId};
use talentflow::workflows::assessment::{
    propose_end, validate_window, Answer, AssessmentPolicy, AssessmentService, AssignmentRequest,
    GradingService, MarkEdit, QuestionDraft, QuestionKind, SubmittedAnswer, TestDraft,
};
use talentflow::workflows::intake::{
    prefill_from_resume, ParsedResume, ParserError, PrefillSource, ResumeDocument,
};
use talentflow::workflows::jobs::{JobDraft, JobService, JobStatus};
use talentflow::workflows::pipeline::{
    ApplicationStatus, ApplicationSubmission, CandidateProfile, PipelineService,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// When the candidate's test window opens (RFC 3339 or YYYY-MM-DD HH:MM). Defaults to now.
    #[arg(long, value_parser = crate::infra::parse_datetime)]
    pub(crate) test_start: Option<DateTime<Utc>>,
    /// Simulate an outage of the resume parsing service.
    #[arg(long)]
    pub(crate) parser_offline: bool,
    /// Stop after the application review portion of the demo.
    #[arg(long)]
    pub(crate) skip_assessment: bool,
}

#[derive(Args, Debug)]
pub(crate) struct WindowArgs {
    /// Test duration in minutes
    #[arg(long)]
    pub(crate) duration: u32,
    /// Window start (RFC 3339 or YYYY-MM-DD HH:MM)
    #[arg(long, value_parser = crate::infra::parse_datetime)]
    pub(crate) start: DateTime<Utc>,
    /// Window end; omitted ends are proposed from the duration
    #[arg(long, value_parser = crate::infra::parse_datetime)]
    pub(crate) end: Option<DateTime<Utc>>,
    /// Override the configured grace period in minutes
    #[arg(long)]
    pub(crate) grace: Option<u32>,
}

/// The `--grace` flag wins; otherwise the configured grace period applies.
fn grace_minutes(flag: Option<u32>) -> Result<u32, AppError> {
    match flag {
        Some(minutes) => Ok(minutes),
        None => Ok(AppConfig::load()?.workflow.test_grace_minutes),
    }
}

pub(crate) fn run_window_check(args: WindowArgs) -> Result<(), AppError> {
    let grace = grace_minutes(args.grace)?;
    let end = args
        .end
        .unwrap_or_else(|| propose_end(args.start, args.duration, grace));
    let check = validate_window(args.start, end, args.duration, grace);

    println!("Test window check");
    println!("  Start: {}", args.start.to_rfc3339());
    println!(
        "  End:   {}{}",
        end.to_rfc3339(),
        if args.end.is_none() { " (proposed)" } else { "" }
    );
    println!(
        "  Length: {} minutes (needs {} = {} test + {} grace)",
        check.actual_minutes, check.required_minutes, args.duration, grace
    );
    if check.valid {
        println!("  Result: window fits the test");
    } else {
        println!(
            "  Result: too short by {} minutes",
            check.required_minutes - check.actual_minutes
        );
    }
    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        test_start,
        parser_offline,
        skip_assessment,
    } = args;

    let store = sample_store();
    let config = WorkflowConfig::default();
    let jobs = JobService::new(store.clone());
    let pipeline = PipelineService::new(store.clone());
    let assessments = AssessmentService::new(store.clone(), AssessmentPolicy::from(&config));
    let grading = GradingService::new(store, config.bulk_mark_concurrency);

    let admin = RequestContext::new(1, SAMPLE_ORGANIZATION.0, Role::OrgAdmin);
    let recruiter = RequestContext::new(3, SAMPLE_ORGANIZATION.0, Role::Recruiter);
    let now = Utc::now();

    println!("TalentFlow hiring demo");
    let job = jobs.create(
        &admin,
        JobDraft {
            title: "Platform Engineer".to_string(),
            department: Some("Infrastructure".to_string()),
            description: "Keep the deploy pipeline fast and boring".to_string(),
            location: Some("Remote (EU)".to_string()),
            compensation: None,
            status: Some(JobStatus::Active),
        },
        now,
    )?;
    println!("  Job #{} '{}' is {}", job.id.0, job.title, job.status.label());

    let access = jobs.update_recruiters(
        &admin,
        job.id,
        &[RecruiterEdit::Add {
            recruiter_id: UserId(3),
        }],
        now,
    )?;
    println!(
        "  Recruiters added alongside the owner: {}",
        access
            .partition
            .additional
            .iter()
            .map(|recruiter| recruiter.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    println!("\nResume intake");
    let document = ResumeDocument {
        file_name: "jordan-okafor.pdf".to_string(),
        content_type: Some("application/pdf".to_string()),
        bytes: b"%PDF-1.7 sample".to_vec(),
    };
    let parser = move |_: &ResumeDocument| {
        if parser_offline {
            return Err(ParserError::Unavailable(
                "parser responded with 503".to_string(),
            ));
        }
        Ok(ParsedResume {
            name: Some("Jordan Okafor".to_string()),
            email: Some("jordan.okafor@example.com".to_string()),
            phone: Some("+44 20 7946 0018".to_string()),
            skills: vec!["Rust".into(), "Kubernetes".into(), "rust".into()],
            education: vec!["MEng Computer Systems".into()],
            experience: vec!["4 years SRE at a payments company".into()],
        })
    };
    let prefill = prefill_from_resume(&parser, &document);
    let candidate = match prefill.source {
        PrefillSource::Parsed => {
            println!(
                "  Parsed {} with skills: {}",
                prefill.profile.name,
                prefill.profile.skills.join(", ")
            );
            prefill.profile
        }
        PrefillSource::Manual => {
            println!(
                "  {} (candidate fills the form by hand)",
                prefill.warning.as_deref().unwrap_or("resume parsing failed")
            );
            CandidateProfile {
                name: "Jordan Okafor".to_string(),
                email: "jordan.okafor@example.com".to_string(),
                phone: None,
                department: None,
                skills: vec!["Rust".to_string()],
            }
        }
    };

    let application = pipeline.submit(
        ApplicationSubmission {
            job_id: job.id,
            candidate,
            resume_score: Some(84),
        },
        now,
    )?;
    println!(
        "  Application #{} submitted with resume score {}",
        application.id.0, application.resume_score
    );

    println!("\nApplication review (as recruiter)");
    let actions = pipeline.available_actions(&recruiter, application.id)?;
    println!(
        "  Available actions: {}",
        actions
            .iter()
            .map(|action| action.action_label)
            .collect::<Vec<_>>()
            .join(" | ")
    );
    let update = pipeline.change_status(
        &recruiter,
        application.id,
        ApplicationStatus::Shortlisted,
        None,
        now,
    )?;
    println!("  {}", update.change.note);

    if skip_assessment {
        return Ok(());
    }

    println!("\nSkill test");
    let mut test = assessments.create_test(
        &admin,
        TestDraft {
            title: "Systems fundamentals".to_string(),
            description: "Concurrency and operations basics".to_string(),
            duration_minutes: 45,
            passing_marks: Some(70),
            is_proctored: true,
            proctoring: Default::default(),
        },
        now,
    )?;
    for draft in demo_questions() {
        test = assessments.add_question(&admin, test.id, draft)?;
    }
    println!(
        "  Test #{} '{}': {} questions, {} marks, pass at {}%",
        test.id.0, test.title, test.question_count, test.total_marks, test.passing_marks
    );

    let starts_at = test_start.unwrap_or(now);
    let outcome = assessments.assign(
        &recruiter,
        AssignmentRequest {
            test_id: test.id,
            application_id: application.id,
            starts_at,
            ends_at: None,
        },
        now,
    )?;
    println!(
        "  Scheduled {} to {}",
        outcome.assignment.starts_at.to_rfc3339(),
        outcome.assignment.ends_at.to_rfc3339()
    );
    if let Some(update) = &outcome.status_update {
        println!("  {}", update.change.note);
    }

    let sitting_at = starts_at + Duration::minutes(1);
    let attempt = assessments.start_attempt(outcome.assignment.id, sitting_at)?;
    let questions = assessments.questions(&admin, test.id)?;
    let answers = questions
        .iter()
        .map(|question| SubmittedAnswer {
            question_id: question.id,
            answer: match question.kind {
                QuestionKind::McqSingle | QuestionKind::McqMultiple => {
                    Answer::Options(question.correct_options.clone())
                }
                QuestionKind::Text | QuestionKind::Coding => Answer::Text(
                    "Bound the queue and shed load once the pool is saturated.".to_string(),
                ),
            },
        })
        .collect();
    let report =
        assessments.submit_attempt(attempt.id, answers, sitting_at + Duration::minutes(30))?;
    println!(
        "  Auto-graded: {}/{} ({}%), {} awaiting review",
        report.summary.total_score,
        report.summary.total_possible,
        report.summary.percentage,
        report.summary.pending_review
    );

    let edits: Vec<MarkEdit> = grading
        .responses(&recruiter, attempt.id)?
        .into_iter()
        .filter(|response| response.needs_review)
        .map(|response| MarkEdit {
            response_id: response.id,
            marks: response.max_marks * 0.75,
            reason: "Sound approach, missing backpressure metrics".to_string(),
        })
        .collect();
    if !edits.is_empty() {
        let saved = grading
            .adjust_marks(&recruiter, edits, sitting_at + Duration::hours(2))
            .await?;
        for adjusted in &saved.updated {
            println!(
                "  Response #{}: {} -> {} ({})",
                adjusted.response.id.0,
                adjusted.adjustment.previous,
                adjusted.adjustment.new,
                adjusted.adjustment.reason
            );
        }
    }

    let final_report = grading.summary(&recruiter, attempt.id)?;
    println!(
        "  Final: {}/{} ({}%), {}",
        final_report.summary.total_score,
        final_report.summary.total_possible,
        final_report.summary.percentage,
        if final_report.summary.passed {
            "passed"
        } else {
            "did not pass"
        }
    );

    Ok(())
}

fn demo_questions() -> Vec<QuestionDraft> {
    vec![
        QuestionDraft {
            kind: QuestionKind::McqSingle,
            prompt: "Which primitive limits concurrent access to N holders?".to_string(),
            options: vec!["Mutex".into(), "Semaphore".into(), "Barrier".into()],
            correct_answer: None,
            correct_options: vec![1],
            marks: 20.0,
            difficulty: Default::default(),
        },
        QuestionDraft {
            kind: QuestionKind::McqMultiple,
            prompt: "Which signals usually indicate saturation?".to_string(),
            options: vec![
                "Queue depth".into(),
                "Binary size".into(),
                "p99 latency".into(),
            ],
            correct_answer: None,
            correct_options: vec![0, 2],
            marks: 20.0,
            difficulty: Default::default(),
        },
        QuestionDraft {
            kind: QuestionKind::Text,
            prompt: "How would you protect a service from a traffic spike?".to_string(),
            options: Vec::new(),
            correct_answer: None,
            correct_options: Vec::new(),
            marks: 20.0,
            difficulty: Default::default(),
        },
    ]
}
