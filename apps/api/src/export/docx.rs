//! DOCX backend built on `docx-rs`.

use std::io::Cursor;

use docx_rs::{
    AbstractNumbering, Docx, IndentLevel, Level, LevelJc, LevelText, NumberFormat, Numbering,
    NumberingId, Paragraph, Run, SpecialIndentType, Start, Style, StyleType,
};

use crate::export::{ExportConfig, ExportFormat, ExportIoError, Primitive, Styled};

const BULLET_NUMBERING_ID: usize = 1;

/// Paragraph style id for each heading primitive. `None` for plain paragraphs.
fn style_id(primitive: Primitive) -> Option<&'static str> {
    match primitive {
        Primitive::Title => Some("Heading1"),
        Primitive::SectionHeading => Some("Heading2"),
        Primitive::EntryHeading => Some("Heading3"),
        Primitive::Body | Primitive::Bullet => None,
    }
}

/// Word sizes are in half-points.
fn half_points(points: i64) -> usize {
    usize::try_from(points * 2).unwrap_or(22)
}

fn heading_styles(config: &ExportConfig) -> [Style; 3] {
    let [h1, h2, h3] = config.heading_sizes;
    [
        Style::new("Heading1", StyleType::Paragraph)
            .name("Heading 1")
            .size(half_points(h1))
            .bold(),
        Style::new("Heading2", StyleType::Paragraph)
            .name("Heading 2")
            .size(half_points(h2))
            .bold(),
        Style::new("Heading3", StyleType::Paragraph)
            .name("Heading 3")
            .size(half_points(h3))
            .bold(),
    ]
}

fn bullet_numbering() -> AbstractNumbering {
    AbstractNumbering::new(BULLET_NUMBERING_ID).add_level(
        Level::new(
            0,
            Start::new(1),
            NumberFormat::new("bullet"),
            LevelText::new("•"),
            LevelJc::new("left"),
        )
        .indent(Some(720), Some(SpecialIndentType::Hanging(360)), None, None),
    )
}

pub fn write_docx(styled: &[Styled<'_>], config: &ExportConfig) -> Result<Vec<u8>, ExportIoError> {
    let body_size = half_points(config.body_size);

    let mut docx = Docx::new()
        .add_abstract_numbering(bullet_numbering())
        .add_numbering(Numbering::new(BULLET_NUMBERING_ID, BULLET_NUMBERING_ID));
    for style in heading_styles(config) {
        docx = docx.add_style(style);
    }

    for item in styled {
        for text in &item.lines {
            let run = Run::new().add_text(*text);
            let paragraph = match (item.primitive, style_id(item.primitive)) {
                (_, Some(style)) => Paragraph::new().add_run(run).style(style),
                (Primitive::Bullet, None) => Paragraph::new()
                    .add_run(run.size(body_size))
                    .numbering(NumberingId::new(BULLET_NUMBERING_ID), IndentLevel::new(0)),
                (_, None) => Paragraph::new().add_run(run.size(body_size)),
            };
            docx = docx.add_paragraph(paragraph);
        }
    }

    let mut cursor = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut cursor)
        .map_err(|e| ExportIoError::new(ExportFormat::Docx, e))?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::tests::every_block_kind;
    use crate::export::{export, lower};
    use crate::import::extract::docx_text;

    #[test]
    fn test_docx_is_readable_and_keeps_block_order() {
        let artifact = export(&every_block_kind(), ExportFormat::Docx, &ExportConfig::default()).unwrap();
        assert!(artifact.bytes.starts_with(b"PK"));

        let text = docx_text(&artifact.bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Jane Doe",
                "jane@example.com · 555-0100",
                "Experience",
                "Engineer, Acme",
                "2020 - 2023",
                "Built billing",
                "Cut costs",
            ]
        );
    }

    #[test]
    fn test_each_bullet_item_is_its_own_paragraph() {
        let doc = every_block_kind();
        let styled = lower(&doc, ExportFormat::Docx).unwrap();
        let bytes = write_docx(&styled, &ExportConfig::default()).unwrap();
        let text = docx_text(&bytes).unwrap();
        assert_eq!(text.lines().filter(|l| l.starts_with("Cut")).count(), 1);
    }

    #[test]
    fn test_heading_primitives_have_styles() {
        assert_eq!(style_id(Primitive::Title), Some("Heading1"));
        assert_eq!(style_id(Primitive::EntryHeading), Some("Heading3"));
        assert_eq!(style_id(Primitive::Bullet), None);
    }
}
