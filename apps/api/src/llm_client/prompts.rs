// Fragments appended to system prompts that expect a JSON reply, and placeholder filling.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-z_]+)\}").expect("placeholder pattern is valid"));

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_INSTRUCTION: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Instruction shared by every prompt that reads a candidate's resume.
pub const EVIDENCE_INSTRUCTION: &str = "\
    Base every statement ONLY on the documents provided. \
    Do NOT infer, interpolate, or invent details that are not present in the text.";

/// Substitutes `{name}` placeholders in one pass. Inserted values are not rescanned,
/// so a document that itself contains `{resume}` reaches the model verbatim.
/// Unknown placeholders are left as they are.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures<'_>| {
            match values.iter().find(|(name, _)| *name == &caps[1]) {
                Some((_, value)) => (*value).to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}
