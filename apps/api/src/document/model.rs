//! Canonical in-memory document model.
//!
//! A `DocumentModel` owns an ordered list of sections. Section identities are a
//! closed set (`SectionKind`) and are unique within one document; that invariant
//! is enforced on construction and on deserialization.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::{FieldIssue, ValidationError};

// ────────────────────────────────────────────────────────────────────────────
// Section identity
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Summary,
    Experience,
    Projects,
    Education,
    Skills,
    Certifications,
    /// Free-form cover-letter body. Ignored by the resume template.
    Letter,
}

impl SectionKind {
    pub const ALL: [SectionKind; 7] = [
        SectionKind::Summary,
        SectionKind::Experience,
        SectionKind::Projects,
        SectionKind::Education,
        SectionKind::Skills,
        SectionKind::Certifications,
        SectionKind::Letter,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SectionKind::Summary => "summary",
            SectionKind::Experience => "experience",
            SectionKind::Projects => "projects",
            SectionKind::Education => "education",
            SectionKind::Skills => "skills",
            SectionKind::Certifications => "certifications",
            SectionKind::Letter => "letter",
        }
    }

    /// Display title used as the section heading.
    pub fn title(self) -> &'static str {
        match self {
            SectionKind::Summary => "Summary",
            SectionKind::Experience => "Experience",
            SectionKind::Projects => "Projects",
            SectionKind::Education => "Education",
            SectionKind::Skills => "Skills",
            SectionKind::Certifications => "Certifications",
            SectionKind::Letter => "Letter",
        }
    }

    /// Sections whose entries are structured records rather than free text.
    pub fn holds_records(self) -> bool {
        matches!(
            self,
            SectionKind::Experience | SectionKind::Projects | SectionKind::Education
        )
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionKind {
    type Err = ValidationError;

    /// Accepts the snake_case id or the display title, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        SectionKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(wanted) || k.title().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                ValidationError::single(FieldIssue::new(
                    "sections",
                    format!("unknown section '{wanted}'"),
                ))
            })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Dates
// ────────────────────────────────────────────────────────────────────────────

/// A start or end bound of a dated record, at whatever precision the user gave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateBound {
    Year(i32),
    Month { year: i32, month: u32 },
    Day(NaiveDate),
    Present,
}

impl DateBound {
    /// Parses `YYYY`, `YYYY-MM`, `YYYY-MM-DD`, `MM/YYYY` or `present`/`current`/`now`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if ["present", "current", "now"]
            .iter()
            .any(|p| raw.eq_ignore_ascii_case(p))
        {
            return Some(DateBound::Present);
        }

        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Some(DateBound::Day(date));
        }

        let month_parts = raw
            .split_once('-')
            .or_else(|| raw.split_once('/').map(|(m, y)| (y, m)));
        if let Some((year, month)) = month_parts {
            let year: i32 = year.parse().ok()?;
            let month: u32 = month.parse().ok()?;
            NaiveDate::from_ymd_opt(year, month, 1)?;
            return Some(DateBound::Month { year, month });
        }

        if raw.len() == 4 && raw.chars().all(|c| c.is_ascii_digit()) {
            return raw.parse().ok().map(DateBound::Year);
        }

        None
    }

    /// Earliest calendar day covered by this bound. `None` for `Present`.
    pub fn first_day(&self) -> Option<NaiveDate> {
        match *self {
            DateBound::Year(year) => NaiveDate::from_ymd_opt(year, 1, 1),
            DateBound::Month { year, month } => NaiveDate::from_ymd_opt(year, month, 1),
            DateBound::Day(date) => Some(date),
            DateBound::Present => None,
        }
    }

    /// Last calendar day covered by the bound. `None` for `Present`.
    pub fn last_day(&self) -> Option<NaiveDate> {
        match *self {
            DateBound::Year(year) => NaiveDate::from_ymd_opt(year, 12, 31),
            DateBound::Month { year, month } => {
                let (next_year, next_month) = if month == 12 {
                    (year + 1, 1)
                } else {
                    (year, month + 1)
                };
                NaiveDate::from_ymd_opt(next_year, next_month, 1).and_then(|d| d.pred_opt())
            }
            DateBound::Day(date) => Some(date),
            DateBound::Present => None,
        }
    }
}

impl fmt::Display for DateBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            DateBound::Year(year) => write!(f, "{year}"),
            DateBound::Month { year, month } => match NaiveDate::from_ymd_opt(year, month, 1) {
                Some(d) => write!(f, "{}", d.format("%b %Y")),
                None => write!(f, "{month:02}/{year}"),
            },
            DateBound::Day(date) => write!(f, "{} {}, {}", date.format("%b"), date.day(), date.year()),
            DateBound::Present => f.write_str("Present"),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Entries and sections
// ────────────────────────────────────────────────────────────────────────────

/// A dated, structured entry: a role at an organization, a degree at an
/// institution, or a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Role, degree, or project name. May be empty.
    pub title: String,
    /// Organization or institution. May be empty for projects.
    pub organization: String,
    pub location: Option<String>,
    pub start: Option<DateBound>,
    pub end: Option<DateBound>,
    pub bullets: Vec<String>,
}

impl Record {
    /// `"Title, Organization"`, skipping whichever part is empty.
    pub fn heading(&self) -> String {
        [self.title.as_str(), self.organization.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn date_range(&self) -> Option<String> {
        match (&self.start, &self.end) {
            (Some(s), Some(e)) => Some(format!("{s} - {e}")),
            (Some(s), None) => Some(s.to_string()),
            (None, Some(e)) => Some(e.to_string()),
            (None, None) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Entry {
    Text(String),
    Record(Record),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub kind: SectionKind,
    pub entries: Vec<Entry>,
}

impl Section {
    pub fn new(kind: SectionKind, entries: Vec<Entry>) -> Self {
        Self { kind, entries }
    }

    pub fn title(&self) -> &'static str {
        self.kind.title()
    }

    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.entries.iter().filter_map(|e| match e {
            Entry::Record(r) => Some(r),
            Entry::Text(_) => None,
        })
    }

    /// Flattened plain-text view of the section, as sent to the generation service.
    pub fn text(&self) -> String {
        self.entries
            .iter()
            .map(|entry| match entry {
                Entry::Text(t) => t.clone(),
                Entry::Record(r) => {
                    let mut out = r.heading();
                    if let Some(dates) = r.date_range() {
                        out.push_str(&format!(" ({dates})"));
                    }
                    for bullet in &r.bullets {
                        out.push_str("\n- ");
                        out.push_str(bullet);
                    }
                    out
                }
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Document
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub links: Vec<String>,
}

impl Profile {
    /// Contact details in display order.
    pub fn contact_parts(&self) -> Vec<&str> {
        [&self.email, &self.phone, &self.location]
            .into_iter()
            .filter_map(|v| v.as_deref())
            .chain(self.links.iter().map(String::as_str))
            .collect()
    }
}

/// The role a cover letter is addressed to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRole {
    pub job_title: Option<String>,
    pub company: Option<String>,
    pub hiring_manager: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedDocument")]
pub struct DocumentModel {
    pub profile: Profile,
    pub target: Option<TargetRole>,
    sections: Vec<Section>,
}

impl DocumentModel {
    pub fn new(profile: Profile, target: Option<TargetRole>) -> Self {
        Self {
            profile,
            target,
            sections: Vec::new(),
        }
    }

    /// Appends a section, rejecting a second section of the same kind.
    pub fn push_section(&mut self, section: Section) -> Result<(), ValidationError> {
        if self.section(section.kind).is_some() {
            return Err(ValidationError::single(FieldIssue::new(
                "sections",
                format!("duplicate section '{}'", section.title()),
            )));
        }
        self.sections.push(section);
        Ok(())
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    pub(crate) fn section_mut(&mut self, kind: SectionKind) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.kind == kind)
    }

    pub fn section_titles(&self) -> Vec<&'static str> {
        self.sections.iter().map(Section::title).collect()
    }
}

/// Wire shape of `DocumentModel` before the uniqueness check.
#[derive(Deserialize)]
struct UncheckedDocument {
    profile: Profile,
    #[serde(default)]
    target: Option<TargetRole>,
    #[serde(default)]
    sections: Vec<Section>,
}

impl TryFrom<UncheckedDocument> for DocumentModel {
    type Error = ValidationError;

    fn try_from(raw: UncheckedDocument) -> Result<Self, Self::Error> {
        let mut doc = DocumentModel::new(raw.profile, raw.target);
        for section in raw.sections {
            doc.push_section(section)?;
        }
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> Profile {
        Profile {
            name: "Jane Doe".to_string(),
            ..Profile::default()
        }
    }

    #[test]
    fn test_date_bound_parses_supported_forms() {
        assert_eq!(DateBound::parse("2020"), Some(DateBound::Year(2020)));
        assert_eq!(
            DateBound::parse("2021-03"),
            Some(DateBound::Month {
                year: 2021,
                month: 3
            })
        );
        assert_eq!(
            DateBound::parse("03/2021"),
            Some(DateBound::Month {
                year: 2021,
                month: 3
            })
        );
        assert_eq!(
            DateBound::parse("2021-03-05"),
            NaiveDate::from_ymd_opt(2021, 3, 5).map(DateBound::Day)
        );
        assert_eq!(DateBound::parse(" Present "), Some(DateBound::Present));
    }

    #[test]
    fn test_date_bound_rejects_garbage() {
        assert_eq!(DateBound::parse("last spring"), None);
        assert_eq!(DateBound::parse("2021-13"), None);
        assert_eq!(DateBound::parse("20"), None);
    }

    #[test]
    fn test_date_bound_last_day() {
        assert_eq!(DateBound::Year(2023).last_day(), NaiveDate::from_ymd_opt(2023, 12, 31));
        assert_eq!(
            DateBound::Month {
                year: 2024,
                month: 2
            }
            .last_day(),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert_eq!(
            DateBound::Month {
                year: 2023,
                month: 12
            }
            .last_day(),
            NaiveDate::from_ymd_opt(2023, 12, 31)
        );
        assert_eq!(DateBound::Present.last_day(), None);
    }

    #[test]
    fn test_date_bound_display() {
        assert_eq!(DateBound::Year(2020).to_string(), "2020");
        assert_eq!(
            DateBound::Month {
                year: 2021,
                month: 3
            }
            .to_string(),
            "Mar 2021"
        );
        assert_eq!(DateBound::Present.to_string(), "Present");
    }

    #[test]
    fn test_push_section_rejects_duplicate_kind() {
        let mut doc = DocumentModel::new(profile(), None);
        doc.push_section(Section::new(SectionKind::Summary, vec![]))
            .unwrap();
        let err = doc
            .push_section(Section::new(SectionKind::Summary, vec![]))
            .unwrap_err();
        assert!(err.has_message("duplicate section 'Summary'"));
        assert_eq!(doc.sections().len(), 1);
    }

    #[test]
    fn test_deserialize_rejects_duplicate_sections() {
        let json = serde_json::json!({
            "profile": {"name": "Jane Doe", "email": null, "phone": null, "location": null, "links": []},
            "sections": [
                {"kind": "skills", "entries": []},
                {"kind": "skills", "entries": []}
            ]
        });
        assert!(serde_json::from_value::<DocumentModel>(json).is_err());
    }

    #[test]
    fn test_section_kind_from_title_or_id() {
        assert_eq!("Experience".parse::<SectionKind>().unwrap(), SectionKind::Experience);
        assert_eq!("skills".parse::<SectionKind>().unwrap(), SectionKind::Skills);
        assert!("hobbies".parse::<SectionKind>().is_err());
    }

    #[test]
    fn test_record_heading_and_text() {
        let record = Record {
            title: "Engineer".to_string(),
            organization: "Acme".to_string(),
            location: None,
            start: Some(DateBound::Year(2020)),
            end: Some(DateBound::Year(2023)),
            bullets: vec!["Shipped billing".to_string()],
        };
        assert_eq!(record.heading(), "Engineer, Acme");
        let section = Section::new(SectionKind::Experience, vec![Entry::Record(record)]);
        assert_eq!(section.text(), "Engineer, Acme (2020 - 2023)\n- Shipped billing");
    }
}
