// Prompt constants for resume import.

/// Structures extracted resume text into the builder's input shape.
/// Replace `{grounding_instruction}` and `{resume_text}` before sending.
pub const STRUCTURE_PROMPT_TEMPLATE: &str = r#"Extract the candidate's details from the resume text below.

{grounding_instruction}

Return a JSON object with exactly this shape (omit fields you cannot find, use
empty arrays for missing lists):
{
  "name": "string",
  "email": "string",
  "phone": "string",
  "location": "string",
  "links": ["string"],
  "summary": "string",
  "experience": [{"role": "string", "organization": "string", "location": "string",
                  "start": "YYYY or YYYY-MM", "end": "YYYY, YYYY-MM or present",
                  "bullets": ["string"]}],
  "projects": [{"name": "string", "role": "string", "url": "string", "bullets": ["string"]}],
  "education": [{"degree": "string", "field": "string", "institution": "string",
                 "start": "YYYY", "end": "YYYY", "details": ["string"]}],
  "skills": ["string"],
  "certifications": ["string"]
}

RESUME TEXT:
{resume_text}"#;
