//! Static template rule tables. One entry per `TemplateId`.

use crate::document::model::SectionKind;
use crate::render::TemplateId;

/// How the body of a template is assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Body {
    /// Section-by-section with headings.
    Resume,
    /// Salutation, prose, closing.
    Letter,
}

/// Rendering rules for one template.
#[derive(Debug)]
pub struct TemplateRules {
    pub body: Body,
    /// Sections emitted, in output order. Anything else in the model is ignored.
    pub sections: &'static [SectionKind],
    pub contact_separator: &'static str,
    /// Max experience records listed as highlights when a letter has no body.
    pub highlight_limit: usize,
    pub default_salutation: &'static str,
    pub closing: &'static str,
}

static RESUME: TemplateRules = TemplateRules {
    body: Body::Resume,
    sections: &[
        SectionKind::Summary,
        SectionKind::Experience,
        SectionKind::Projects,
        SectionKind::Education,
        SectionKind::Skills,
        SectionKind::Certifications,
    ],
    contact_separator: " · ",
    highlight_limit: 0,
    default_salutation: "",
    closing: "",
};

static COVER_LETTER: TemplateRules = TemplateRules {
    body: Body::Letter,
    sections: &[SectionKind::Summary, SectionKind::Letter],
    contact_separator: " · ",
    highlight_limit: 3,
    default_salutation: "Dear Hiring Manager,",
    closing: "Sincerely,",
};

pub fn rules_for(id: TemplateId) -> &'static TemplateRules {
    match id {
        TemplateId::Resume => &RESUME,
        TemplateId::CoverLetter => &COVER_LETTER,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_template_has_its_own_body() {
        assert_eq!(rules_for(TemplateId::Resume).body, Body::Resume);
        assert_eq!(rules_for(TemplateId::CoverLetter).body, Body::Letter);
    }

    #[test]
    fn test_resume_never_renders_letter_body() {
        assert!(!rules_for(TemplateId::Resume)
            .sections
            .contains(&SectionKind::Letter));
    }
}
