// All LLM prompt constants for the augmentation module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for prose sections (summary and letter).
pub const PROSE_SYSTEM: &str = "You are an expert resume and cover-letter editor. \
    Rewrite the section you are given so it reads clearly and confidently. \
    Respond with the rewritten text only: no headings, no preamble, no markdown. \
    Separate paragraphs with a blank line.";

/// Prose rewrite prompt. Replace `{section_title}`, `{style}`, `{grounding_instruction}`,
/// `{length_rule}` and `{section_text}` before sending.
pub const PROSE_PROMPT_TEMPLATE: &str = "\
Rewrite the \"{section_title}\" section of a candidate's document.\n\
\n\
STYLE: {style}\n\
\n\
{grounding_instruction}\n\
\n\
RULES:\n\
1. {length_rule}\n\
2. Avoid cliches and generic statements\n\
3. Be confident but not arrogant\n\
\n\
CURRENT TEXT:\n\
{section_text}";

/// Length rule for prose sections without a requested length.
pub const KEEP_LENGTH_RULE: &str = "Keep roughly the same length as the original (never more than double)";

/// Bullet rewrite prompt for record sections. Replace `{section_title}`, `{style}`,
/// `{grounding_instruction}`, `{record_count}` and `{section_text}` before sending.
pub const BULLETS_PROMPT_TEMPLATE: &str = r#"Rewrite the bullet points of the "{section_title}" section of a resume.

STYLE: {style}

{grounding_instruction}

The section contains {record_count} entries, listed below in order. For EACH entry,
return its rewritten bullet points. Lead every bullet with a strong action verb and
keep each bullet to one or two lines. An entry without bullets may get one bullet
summarising its heading, or an empty list.

Return a JSON array with EXACTLY {record_count} elements, one per entry in the same
order, each element an array of strings:
[["bullet for entry 1", "another bullet"], ["bullet for entry 2"]]

ENTRIES:
{section_text}"#;
