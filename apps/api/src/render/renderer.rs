//! Block assembly for each template body.
//!
//! Rendering is a pure function of the model and the template rules: no clock,
//! no randomness, no map iteration order.

use crate::document::model::{DocumentModel, Entry, Record, Section, SectionKind, TargetRole};
use crate::render::templates::{rules_for, Body, TemplateRules};
use crate::render::{Block, RenderedDocument, TemplateId, UnknownTemplateError};

/// Renders `doc` with the template named `template`.
pub fn render(doc: &DocumentModel, template: &str) -> Result<RenderedDocument, UnknownTemplateError> {
    let id: TemplateId = template.parse()?;
    Ok(render_template(doc, id))
}

pub fn render_template(doc: &DocumentModel, id: TemplateId) -> RenderedDocument {
    let rules = rules_for(id);

    let mut blocks = vec![Block::heading(1, doc.profile.name.clone())];
    let contact = doc.profile.contact_parts();
    if !contact.is_empty() {
        blocks.push(Block::paragraph(contact.join(rules.contact_separator)));
    }

    match rules.body {
        Body::Resume => resume_body(doc, rules, &mut blocks),
        Body::Letter => letter_body(doc, rules, &mut blocks),
    }

    RenderedDocument {
        template: id,
        blocks,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Resume
// ────────────────────────────────────────────────────────────────────────────

fn resume_body(doc: &DocumentModel, rules: &TemplateRules, blocks: &mut Vec<Block>) {
    for &kind in rules.sections {
        let Some(section) = doc.section(kind) else {
            continue;
        };
        if section.entries.is_empty() {
            continue;
        }
        blocks.push(Block::heading(2, section.title()));
        match kind {
            SectionKind::Skills => blocks.push(Block::paragraph(texts(section).join(", "))),
            SectionKind::Certifications => blocks.push(Block::BulletList {
                items: texts(section),
            }),
            _ => section_entries(section, rules, blocks),
        }
    }
}

fn section_entries(section: &Section, rules: &TemplateRules, blocks: &mut Vec<Block>) {
    for entry in &section.entries {
        match entry {
            Entry::Text(text) => blocks.push(Block::paragraph(text.clone())),
            Entry::Record(record) => record_blocks(record, rules, blocks),
        }
    }
}

fn record_blocks(record: &Record, rules: &TemplateRules, blocks: &mut Vec<Block>) {
    blocks.push(Block::heading(3, record.heading()));

    let meta: Vec<String> = record
        .date_range()
        .into_iter()
        .chain(record.location.clone())
        .collect();
    if !meta.is_empty() {
        blocks.push(Block::paragraph(meta.join(rules.contact_separator)));
    }

    if !record.bullets.is_empty() {
        blocks.push(Block::BulletList {
            items: record.bullets.clone(),
        });
    }
}

fn texts(section: &Section) -> Vec<String> {
    section
        .entries
        .iter()
        .filter_map(|e| match e {
            Entry::Text(t) => Some(t.clone()),
            Entry::Record(_) => None,
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Cover letter
// ────────────────────────────────────────────────────────────────────────────

fn letter_body(doc: &DocumentModel, rules: &TemplateRules, blocks: &mut Vec<Block>) {
    let target = doc.target.as_ref();

    if let Some(recipient) = target.and_then(recipient_line) {
        blocks.push(Block::paragraph(recipient));
    }

    let salutation = target
        .and_then(|t| t.hiring_manager.as_deref())
        .map(|manager| format!("Dear {manager},"))
        .unwrap_or_else(|| rules.default_salutation.to_string());
    blocks.push(Block::paragraph(salutation));

    if let Some(opening) = target.and_then(opening_line) {
        blocks.push(Block::paragraph(opening));
    }

    for &kind in rules.sections {
        if let Some(section) = doc.section(kind) {
            blocks.extend(texts(section).into_iter().map(Block::paragraph));
        }
    }

    let has_letter = doc
        .section(SectionKind::Letter)
        .is_some_and(|s| !s.entries.is_empty());
    if !has_letter {
        let highlights: Vec<String> = doc
            .section(SectionKind::Experience)
            .map(|s| {
                s.records()
                    .take(rules.highlight_limit)
                    .map(highlight)
                    .collect()
            })
            .unwrap_or_default();
        if !highlights.is_empty() {
            blocks.push(Block::BulletList { items: highlights });
        }
    }

    blocks.push(Block::paragraph(rules.closing));
    blocks.push(Block::paragraph(doc.profile.name.clone()));
}

fn recipient_line(target: &TargetRole) -> Option<String> {
    let parts: Vec<&str> = [target.hiring_manager.as_deref(), target.company.as_deref()]
        .into_iter()
        .flatten()
        .collect();
    (!parts.is_empty()).then(|| parts.join(", "))
}

fn opening_line(target: &TargetRole) -> Option<String> {
    match (target.job_title.as_deref(), target.company.as_deref()) {
        (Some(title), Some(company)) => Some(format!(
            "I am writing to apply for the {title} position at {company}."
        )),
        (Some(title), None) => Some(format!("I am writing to apply for the {title} position.")),
        (None, Some(company)) => Some(format!(
            "I am writing to express my interest in joining {company}."
        )),
        (None, None) => None,
    }
}

fn highlight(record: &Record) -> String {
    match (record.title.is_empty(), record.organization.is_empty()) {
        (false, false) => format!("{} at {}", record.title, record.organization),
        (false, true) => record.title.clone(),
        _ => record.organization.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::builder::{build_document, RawInput};

    fn build(json: serde_json::Value) -> DocumentModel {
        let raw: RawInput = serde_json::from_value(json).unwrap();
        build_document(&raw).unwrap()
    }

    fn full_document() -> DocumentModel {
        build(serde_json::json!({
            "name": "Jane Doe",
            "email": "jane@example.com",
            "phone": "555-0100",
            "summary": "Backend engineer.",
            "experience": [
                {"role": "Engineer", "org": "Acme", "start": "2020", "end": "2023",
                 "location": "Remote", "bullets": ["Built billing"]},
                {"role": "Intern", "org": "Initech", "start": "2019"}
            ],
            "education": [{"degree": "BSc", "field": "CS", "institution": "State U", "end": "2019"}],
            "skills": ["Rust", "SQL"],
            "certifications": ["AWS SA"],
            "target": {"job_title": "Staff Engineer", "company_name": "Globex"}
        }))
    }

    #[test]
    fn test_jane_doe_resume_example() {
        let doc = build(serde_json::json!({
            "name": "Jane Doe",
            "experience": [{"org": "Acme", "start": "2020", "end": "2023"}]
        }));
        assert_eq!(doc.section_titles(), vec!["Summary", "Experience"]);

        let rendered = render(&doc, "resume").unwrap();
        assert_eq!(rendered.blocks[0], Block::heading(1, "Jane Doe"));
        let acme = rendered
            .blocks
            .iter()
            .position(|b| matches!(b, Block::Heading { level: 3, text } if text.contains("Acme")))
            .unwrap();
        assert!(acme > 0);
        assert_eq!(rendered.blocks[acme + 1], Block::paragraph("2020 - 2023"));
    }

    #[test]
    fn test_resume_layout() {
        let rendered = render_template(&full_document(), TemplateId::Resume);
        let headings: Vec<&str> = rendered
            .blocks
            .iter()
            .filter_map(|b| match b {
                Block::Heading { level: 2, text } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(
            headings,
            vec!["Summary", "Experience", "Education", "Skills", "Certifications"]
        );
        assert_eq!(
            rendered.blocks[1],
            Block::paragraph("jane@example.com · 555-0100")
        );
        assert!(rendered.blocks.contains(&Block::paragraph("2020 - 2023 · Remote")));
        assert!(rendered.blocks.contains(&Block::paragraph("Rust, SQL")));
        assert!(rendered.blocks.contains(&Block::heading(3, "BSc in CS, State U")));
        assert!(rendered.blocks.contains(&Block::BulletList {
            items: vec!["AWS SA".to_string()]
        }));
    }

    #[test]
    fn test_empty_summary_has_no_heading() {
        let doc = build(serde_json::json!({"name": "Jane Doe", "skills": ["Rust"]}));
        let rendered = render_template(&doc, TemplateId::Resume);
        assert!(!rendered.blocks.contains(&Block::heading(2, "Summary")));
    }

    #[test]
    fn test_cover_letter_without_body_lists_highlights() {
        let rendered = render_template(&full_document(), TemplateId::CoverLetter);
        assert_eq!(rendered.blocks[0], Block::heading(1, "Jane Doe"));
        assert!(rendered.blocks.contains(&Block::paragraph("Globex")));
        assert!(rendered.blocks.contains(&Block::paragraph("Dear Hiring Manager,")));
        assert!(rendered.blocks.contains(&Block::paragraph(
            "I am writing to apply for the Staff Engineer position at Globex."
        )));
        assert!(rendered.blocks.contains(&Block::BulletList {
            items: vec!["Engineer at Acme".to_string(), "Intern at Initech".to_string()]
        }));
        let n = rendered.blocks.len();
        assert_eq!(rendered.blocks[n - 2], Block::paragraph("Sincerely,"));
        assert_eq!(rendered.blocks[n - 1], Block::paragraph("Jane Doe"));
    }

    #[test]
    fn test_cover_letter_uses_letter_paragraphs_and_manager() {
        let doc = build(serde_json::json!({
            "name": "Jane Doe",
            "experience": [{"org": "Acme", "start": "2020"}],
            "target": {"hiring_manager": "Ms. Park"},
            "letter": "First paragraph.\n\nSecond paragraph."
        }));
        let rendered = render_template(&doc, TemplateId::CoverLetter);
        assert!(rendered.blocks.contains(&Block::paragraph("Dear Ms. Park,")));
        assert!(rendered.blocks.contains(&Block::paragraph("Second paragraph.")));
        assert!(!rendered
            .blocks
            .iter()
            .any(|b| matches!(b, Block::BulletList { .. })));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let doc = full_document();
        for id in [TemplateId::Resume, TemplateId::CoverLetter] {
            assert_eq!(render_template(&doc, id), render_template(&doc, id));
        }
    }

    #[test]
    fn test_unknown_template_name() {
        let err = render(&full_document(), "brochure").unwrap_err();
        assert_eq!(err.0, "brochure");
    }
}
