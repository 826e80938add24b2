//! Markdown backend.

use crate::export::{Primitive, Styled};

fn prefix(primitive: Primitive) -> &'static str {
    match primitive {
        Primitive::Title => "# ",
        Primitive::SectionHeading => "## ",
        Primitive::EntryHeading => "### ",
        Primitive::Body => "",
        Primitive::Bullet => "- ",
    }
}

/// Backslash-escapes a leading heading, quote, list or ordered-list marker so
/// user text cannot change the block structure.
fn escape_leading_marker(line: &str) -> String {
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &line[digits..];
        return if rest.starts_with('.') || rest.starts_with(')') {
            format!("{}\\{}", &line[..digits], rest)
        } else {
            line.to_string()
        };
    }
    let mut chars = line.chars();
    match (chars.next(), chars.next()) {
        (Some('#' | '>'), _) | (Some('-' | '+' | '*'), None | Some(' ')) => format!("\\{line}"),
        _ => line.to_string(),
    }
}

fn markdown_line(primitive: Primitive, line: &str) -> String {
    let line = line.trim();
    match primitive {
        Primitive::Body | Primitive::Bullet => {
            format!("{}{}", prefix(primitive), escape_leading_marker(line))
        }
        _ => format!("{}{}", prefix(primitive), line),
    }
}

pub fn write_markdown(styled: &[Styled<'_>]) -> String {
    let blocks: Vec<String> = styled
        .iter()
        .map(|item| {
            item.lines
                .iter()
                .map(|line| markdown_line(item.primitive, line))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .collect();
    let mut out = blocks.join("\n\n");
    out.push('\n');
    out
}
