use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::ExtractionFailure;

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"```[A-Za-z0-9_-]*").expect("CODE_FENCE is a valid regex pattern")
});

/// Isolates the JSON object in raw model output.
///
/// Code fences are removed, then everything between the first `{` and the last `}` is
/// returned. The slice is not checked for JSON validity.
pub fn extract_json(raw: &str) -> Result<String, ExtractionFailure> {
    let unfenced = CODE_FENCE.replace_all(raw, "");

    let start = unfenced.find('{').ok_or(ExtractionFailure)?;
    let end = unfenced.rfind('}').ok_or(ExtractionFailure)?;
    if end < start {
        return Err(ExtractionFailure);
    }

    Ok(unfenced[start..=end].to_string())
}
