use crate::ConfigError;

/// Symptom terms recognised by the keyword extractor when no vocabulary file is configured
pub const DEFAULT_SYMPTOM_VOCABULARY: &[&str] = &[
    "fever",
    "cough",
    "fatigue",
    "difficulty breathing",
    "wheezing",
    "chest pain",
    "high blood sugar",
    "nausea",
    "sensitivity to light",
    "headache",
    "joint pain",
    "swelling",
    "persistent cough",
    "weight loss",
    "brain damage",
    "memory loss",
    "cognitive decline",
    "indigestion",
    "mucus production",
    "seizures",
    "liver inflammation",
    "bone fractures",
    "skin itchiness",
    "skin patches",
    "abdominal pain",
    "excessive worry",
    "sadness",
    "redness",
    "autoimmune reaction",
];

/// Load the symptom vocabulary from a JSON array file, or the built-in list when `path` is `None`.
///
/// Entries are trimmed, lower-cased and deduplicated keeping first occurrence order.
pub fn load_vocabulary(path: Option<&str>) -> Result<Vec<String>, ConfigError> {
    let raw: Vec<String> = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Vocabulary {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
            serde_json::from_str(&content).map_err(|e| ConfigError::Vocabulary {
                path: path.to_string(),
                reason: e.to_string(),
            })?
        }
        None => DEFAULT_SYMPTOM_VOCABULARY.iter().map(|s| s.to_string()).collect(),
    };

    let vocabulary = normalize_vocabulary(raw);
    if vocabulary.is_empty() {
        return Err(ConfigError::Vocabulary {
            path: path.unwrap_or("<built-in>").to_string(),
            reason: "vocabulary is empty".to_string(),
        });
    }

    tracing::debug!(terms = vocabulary.len(), "Symptom vocabulary loaded");
    Ok(vocabulary)
}

pub fn normalize_vocabulary<I, S>(terms: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = std::collections::HashSet::new();
    terms
        .into_iter()
        .map(|t| t.as_ref().trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.clone()))
        .collect()
}
