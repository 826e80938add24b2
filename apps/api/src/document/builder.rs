//! Content Model Builder — normalizes raw user-submitted fields into a `DocumentModel`.
//!
//! Every problem in the input is collected into one `ValidationError`; the builder
//! never stops at the first bad field. Nothing here touches the network.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::document::model::{
    DateBound, DocumentModel, Entry, Profile, Record, Section, SectionKind, TargetRole,
};
use crate::errors::{FieldIssue, ValidationError};

// ────────────────────────────────────────────────────────────────────────────
// Raw input
// ────────────────────────────────────────────────────────────────────────────

/// Raw field mapping as submitted by the caller. Every field is optional at the
/// type level; required-ness is checked by `build_document`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub links: Vec<String>,
    pub summary: Option<String>,
    pub experience: Vec<RawExperience>,
    pub projects: Vec<RawProject>,
    pub education: Vec<RawEducation>,
    pub skills: Vec<String>,
    pub certifications: Vec<String>,
    pub target: Option<RawTarget>,
    /// Cover-letter body; paragraphs separated by blank lines.
    pub letter: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawExperience {
    pub role: Option<String>,
    #[serde(alias = "org", alias = "company")]
    pub organization: Option<String>,
    pub location: Option<String>,
    #[serde(alias = "start_date")]
    pub start: Option<String>,
    #[serde(alias = "end_date")]
    pub end: Option<String>,
    #[serde(alias = "description")]
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawProject {
    pub name: Option<String>,
    pub role: Option<String>,
    pub url: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawEducation {
    pub degree: Option<String>,
    #[serde(alias = "field_of_study")]
    pub field: Option<String>,
    pub institution: Option<String>,
    pub location: Option<String>,
    #[serde(alias = "start_date")]
    pub start: Option<String>,
    #[serde(alias = "end_date")]
    pub end: Option<String>,
    pub details: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawTarget {
    pub job_title: Option<String>,
    #[serde(alias = "company_name")]
    pub company: Option<String>,
    pub hiring_manager: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Builder
// ────────────────────────────────────────────────────────────────────────────

/// Validates `raw` and produces the canonical document model.
///
/// Sections are emitted in a fixed order: Summary (always), then Experience,
/// Projects, Education, Skills, Certifications and Letter when the input has
/// content for them.
pub fn build_document(raw: &RawInput) -> Result<DocumentModel, ValidationError> {
    let mut issues = Vec::new();

    let name = clean(raw.name.as_deref());
    if name.is_none() {
        issues.push(FieldIssue::required("name"));
    }

    let email = clean(raw.email.as_deref());
    if let Some(email) = &email {
        if !looks_like_email(email) {
            issues.push(FieldIssue::new("email", format!("email malformed: '{email}'")));
        }
    }

    let experience: Vec<Record> = raw
        .experience
        .iter()
        .enumerate()
        .filter_map(|(i, e)| experience_record(i, e, &mut issues))
        .collect();
    let projects: Vec<Record> = raw
        .projects
        .iter()
        .enumerate()
        .filter_map(|(i, p)| project_record(i, p, &mut issues))
        .collect();
    let education: Vec<Record> = raw
        .education
        .iter()
        .enumerate()
        .filter_map(|(i, e)| education_record(i, e, &mut issues))
        .collect();

    if !issues.is_empty() {
        return Err(ValidationError { issues });
    }

    let profile = Profile {
        name: name.unwrap_or_default(),
        email,
        phone: clean(raw.phone.as_deref()),
        location: clean(raw.location.as_deref()),
        links: clean_list(&raw.links),
    };

    let target = raw.target.as_ref().and_then(|t| {
        let target = TargetRole {
            job_title: clean(t.job_title.as_deref()),
            company: clean(t.company.as_deref()),
            hiring_manager: clean(t.hiring_manager.as_deref()),
        };
        (target != TargetRole::default()).then_some(target)
    });

    let summary = clean(raw.summary.as_deref())
        .map(|s| vec![Entry::Text(s)])
        .unwrap_or_default();

    let letter: Vec<Entry> = raw
        .letter
        .as_deref()
        .map(split_paragraphs)
        .unwrap_or_default()
        .into_iter()
        .map(Entry::Text)
        .collect();

    let candidates = [
        (SectionKind::Experience, records(experience)),
        (SectionKind::Projects, records(projects)),
        (SectionKind::Education, records(education)),
        (SectionKind::Skills, texts(dedup_case_insensitive(&raw.skills))),
        (
            SectionKind::Certifications,
            texts(dedup_case_insensitive(&raw.certifications)),
        ),
        (SectionKind::Letter, letter),
    ];

    let mut doc = DocumentModel::new(profile, target);
    doc.push_section(Section::new(SectionKind::Summary, summary))?;
    for (kind, entries) in candidates {
        if !entries.is_empty() {
            doc.push_section(Section::new(kind, entries))?;
        }
    }

    debug!(
        "Built document for '{}' with sections {:?}",
        doc.profile.name,
        doc.section_titles()
    );
    Ok(doc)
}

fn experience_record(
    index: usize,
    raw: &RawExperience,
    issues: &mut Vec<FieldIssue>,
) -> Option<Record> {
    let path = format!("experience[{index}]");
    let organization = clean(raw.organization.as_deref());
    if organization.is_none() {
        issues.push(FieldIssue::required(format!("{path}.organization")));
    }
    if clean(raw.start.as_deref()).is_none() && clean(raw.end.as_deref()).is_none() {
        issues.push(FieldIssue::new(
            format!("{path}.start"),
            format!("{path} requires a start or end date"),
        ));
    }
    let (start, end) = date_bounds(&path, raw.start.as_deref(), raw.end.as_deref(), issues);

    Some(Record {
        title: clean(raw.role.as_deref()).unwrap_or_default(),
        organization: organization?,
        location: clean(raw.location.as_deref()),
        start,
        end,
        bullets: clean_list(&raw.bullets),
    })
}

fn project_record(index: usize, raw: &RawProject, issues: &mut Vec<FieldIssue>) -> Option<Record> {
    let path = format!("projects[{index}]");
    let name = clean(raw.name.as_deref());
    if name.is_none() {
        issues.push(FieldIssue::required(format!("{path}.name")));
    }
    let (start, end) = date_bounds(&path, raw.start.as_deref(), raw.end.as_deref(), issues);

    let mut bullets = clean_list(&raw.bullets);
    if let Some(url) = clean(raw.url.as_deref()) {
        bullets.push(url);
    }

    Some(Record {
        title: name?,
        organization: clean(raw.role.as_deref()).unwrap_or_default(),
        location: None,
        start,
        end,
        bullets,
    })
}

fn education_record(
    index: usize,
    raw: &RawEducation,
    issues: &mut Vec<FieldIssue>,
) -> Option<Record> {
    let path = format!("education[{index}]");
    let institution = clean(raw.institution.as_deref());
    if institution.is_none() {
        issues.push(FieldIssue::required(format!("{path}.institution")));
    }
    let (start, end) = date_bounds(&path, raw.start.as_deref(), raw.end.as_deref(), issues);

    let title = match (clean(raw.degree.as_deref()), clean(raw.field.as_deref())) {
        (Some(degree), Some(field)) => format!("{degree} in {field}"),
        (Some(degree), None) => degree,
        (None, Some(field)) => field,
        (None, None) => String::new(),
    };

    Some(Record {
        title,
        organization: institution?,
        location: clean(raw.location.as_deref()),
        start,
        end,
        bullets: clean_list(&raw.details),
    })
}

/// Parses both bounds, recording malformed values and inverted ranges.
fn date_bounds(
    path: &str,
    start: Option<&str>,
    end: Option<&str>,
    issues: &mut Vec<FieldIssue>,
) -> (Option<DateBound>, Option<DateBound>) {
    let mut parse = |field: &str, raw: Option<&str>| {
        let raw = clean(raw)?;
        let parsed = DateBound::parse(&raw);
        if parsed.is_none() {
            issues.push(FieldIssue::new(
                format!("{path}.{field}"),
                format!("{path}.{field} malformed: '{raw}'"),
            ));
        }
        parsed
    };
    let start = parse("start", start);
    let end = parse("end", end);

    if let (Some(s), Some(e)) = (
        start.and_then(|s| s.first_day()),
        end.and_then(|e| e.last_day()),
    ) {
        if s > e {
            issues.push(FieldIssue::new(
                format!("{path}.end"),
                format!("{path} ends before it starts"),
            ));
        }
    }

    (start, end)
}

// ────────────────────────────────────────────────────────────────────────────
// Normalization helpers
// ────────────────────────────────────────────────────────────────────────────

fn clean(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn clean_list(values: &[String]) -> Vec<String> {
    values.iter().filter_map(|v| clean(Some(v))).collect()
}

/// Trims, drops empties, and keeps the first spelling of case-insensitive duplicates.
fn dedup_case_insensitive(values: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    clean_list(values)
        .into_iter()
        .filter(|v| seen.insert(v.to_lowercase()))
        .collect()
}

pub(crate) fn split_paragraphs(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .split("\n\n")
        .map(|p| p.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|p| !p.is_empty())
        .collect()
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@') && !value.contains(' ')
        }
        None => false,
    }
}

fn records(records: Vec<Record>) -> Vec<Entry> {
    records.into_iter().map(Entry::Record).collect()
}

fn texts(texts: Vec<String>) -> Vec<Entry> {
    texts.into_iter().map(Entry::Text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> RawInput {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_jane_doe_example_builds_summary_and_experience() {
        let raw = parse(json!({
            "name": "Jane Doe",
            "experience": [{"org": "Acme", "start": "2020", "end": "2023"}]
        }));
        let doc = build_document(&raw).unwrap();
        assert_eq!(doc.section_titles(), vec!["Summary", "Experience"]);
        let acme = doc
            .section(SectionKind::Experience)
            .unwrap()
            .records()
            .next()
            .unwrap();
        assert_eq!(acme.organization, "Acme");
        assert_eq!(acme.start, Some(DateBound::Year(2020)));
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let raw = parse(json!({"name": "   "}));
        let err = build_document(&raw).unwrap_err();
        assert!(err.has_message("name required"));
    }

    #[test]
    fn test_reports_every_issue_not_just_the_first() {
        let raw = parse(json!({
            "name": "",
            "email": "not-an-email",
            "experience": [
                {"role": "Engineer"},
                {"organization": "Acme", "start": "someday"}
            ],
            "education": [{"degree": "BSc"}]
        }));
        let err = build_document(&raw).unwrap_err();
        let messages: Vec<&str> = err.issues.iter().map(|i| i.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "name required",
                "email malformed: 'not-an-email'",
                "experience[0].organization required",
                "experience[0] requires a start or end date",
                "experience[1].start malformed: 'someday'",
                "education[0].institution required",
            ]
        );
    }

    #[test]
    fn test_inverted_date_range_is_rejected() {
        let raw = parse(json!({
            "name": "Jane Doe",
            "experience": [{"organization": "Acme", "start": "2023-05", "end": "2021"}]
        }));
        let err = build_document(&raw).unwrap_err();
        assert!(err.has_message("experience[0] ends before it starts"));
    }

    #[test]
    fn test_mixed_precision_ranges_compare_against_end_of_period() {
        for (start, end) in [("2023-05", "2023"), ("2023-05-10", "2023-05"), ("2023-12-31", "2023")] {
            let raw = parse(json!({
                "name": "Jane Doe",
                "experience": [{"organization": "Acme", "start": start, "end": end}]
            }));
            assert!(build_document(&raw).is_ok(), "{start} to {end} should be valid");
        }

        let raw = parse(json!({
            "name": "Jane Doe",
            "experience": [{"organization": "Acme", "start": "2023-06", "end": "2023-05"}]
        }));
        let err = build_document(&raw).unwrap_err();
        assert!(err.has_message("experience[0] ends before it starts"));
    }

    #[test]
    fn test_present_end_is_not_compared() {
        let raw = parse(json!({
            "name": "Jane Doe",
            "experience": [{"organization": "Acme", "start": "2023", "end": "present"}]
        }));
        assert!(build_document(&raw).is_ok());
    }

    #[test]
    fn test_section_count_matches_recognized_sections() {
        let raw = parse(json!({
            "name": "Jane Doe",
            "summary": "Backend engineer.",
            "experience": [{"organization": "Acme", "end": "2023"}],
            "projects": [{"name": "folio"}],
            "education": [{"institution": "MIT", "degree": "BSc", "field": "CS"}],
            "skills": ["Rust"],
            "certifications": ["CKA"],
            "letter": "Hello.\n\nBye."
        }));
        let doc = build_document(&raw).unwrap();
        assert_eq!(
            doc.section_titles(),
            vec![
                "Summary",
                "Experience",
                "Projects",
                "Education",
                "Skills",
                "Certifications",
                "Letter"
            ]
        );
        let education = doc.section(SectionKind::Education).unwrap();
        assert_eq!(education.records().next().unwrap().title, "BSc in CS");
        assert_eq!(doc.section(SectionKind::Letter).unwrap().entries.len(), 2);
    }

    #[test]
    fn test_empty_lists_produce_no_sections() {
        let raw = parse(json!({"name": "Jane Doe", "skills": ["  "], "experience": []}));
        let doc = build_document(&raw).unwrap();
        assert_eq!(doc.section_titles(), vec!["Summary"]);
        assert!(doc.section(SectionKind::Summary).unwrap().entries.is_empty());
    }

    #[test]
    fn test_skills_deduplicated_keeping_order() {
        let raw = parse(json!({"name": "Jane Doe", "skills": ["Rust", "SQL", "rust", " Go "]}));
        let doc = build_document(&raw).unwrap();
        let skills = &doc.section(SectionKind::Skills).unwrap().entries;
        assert_eq!(
            skills,
            &vec![
                Entry::Text("Rust".to_string()),
                Entry::Text("SQL".to_string()),
                Entry::Text("Go".to_string())
            ]
        );
    }

    #[test]
    fn test_blank_target_is_dropped() {
        let raw = parse(json!({"name": "Jane Doe", "target": {"company": " "}}));
        assert!(build_document(&raw).unwrap().target.is_none());
    }

    #[test]
    fn test_split_paragraphs_collapses_whitespace() {
        assert_eq!(
            split_paragraphs("First  line\nwraps.\r\n\r\n\n\nSecond."),
            vec!["First line wraps.", "Second."]
        );
    }
}
