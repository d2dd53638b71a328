use serde_json::Value;

const PRIMARY_FIELD_WEIGHT: u32 = 2;

/// Lowercased alphanumeric terms of `text`.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|term| !term.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Occurrences of `terms` in the named string fields of `source`.
pub(crate) fn score(source: &Value, terms: &[String], fields: &[String]) -> u32 {
    fields
        .iter()
        .enumerate()
        .map(|(position, field)| {
            let weight = if position == 0 { PRIMARY_FIELD_WEIGHT } else { 1 };
            let text = source.get(field).and_then(Value::as_str).unwrap_or_default();
            let hits = tokenize(text).iter().filter(|t| terms.contains(t)).count();
            u32::try_from(hits).unwrap_or(u32::MAX).saturating_mul(weight)
        })
        .fold(0u32, u32::saturating_add)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tokenize_splits_and_lowercases() {
        assert_eq!(tokenize("Blue-Mug, 12oz!"), vec!["blue", "mug", "12oz"]);
        assert!(tokenize("  ,; ").is_empty());
    }

    #[test]
    fn test_name_matches_outweigh_description_matches() {
        let fields = vec!["name".to_string(), "description".to_string()];
        let terms = tokenize("mug");
        let in_name = json!({"name": "Mug", "description": "ceramic"});
        let in_description = json!({"name": "Cup", "description": "a mug shaped cup"});
        let nowhere = json!({"name": "Plate", "description": "flat"});

        assert_eq!(score(&in_name, &terms, &fields), 2);
        assert_eq!(score(&in_description, &terms, &fields), 1);
        assert_eq!(score(&nowhere, &terms, &fields), 0);
    }
}
