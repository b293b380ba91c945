//! Cohort key resolution for joint shoulder/height blocks.

use crate::aliases;
use crate::value::{identifier, non_empty_str};
use serde_json::Value;

/// Map a gender label onto a cohort key (`"F"` becomes `cisFemale`).
pub fn gender_to_cohort(label: &str) -> Option<&'static str> {
    let folded = label.trim().to_lowercase();
    aliases::GENDER_COHORTS
        .iter()
        .find(|(spellings, _)| spellings.contains(&folded.as_str()))
        .map(|(_, cohort)| *cohort)
}

/// Ordered, deduplicated cohort keys for one cohort block.
///
/// Sources in order: the explicit key (object-map key), the block's own
/// `cohortKeys`, `cohortKey`, `cohort`, `key`, `id` and `gender` fields,
/// then the dataset-level `cohortKeys`, `cohortKey` and `gender`. Yields
/// `["default"]` when nothing matches; `default` is dropped whenever a more
/// specific key exists.
pub fn determine_cohort_keys(
    block: &Value,
    dataset_meta: &Value,
    explicit: Option<&str>,
) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    let mut push = |key: String| {
        if !keys.contains(&key) {
            keys.push(key);
        }
    };

    if let Some(key) = explicit.map(str::trim).filter(|k| !k.is_empty()) {
        push(key.to_string());
    }

    collect_from(block, &mut push, true);
    collect_from(dataset_meta, &mut push, false);

    if keys.is_empty() {
        keys.push(aliases::DEFAULT_COHORT.to_string());
    } else if keys.len() > 1 {
        keys.retain(|key| key != aliases::DEFAULT_COHORT);
    }
    keys
}

fn collect_from(source: &Value, push: &mut impl FnMut(String), with_identity: bool) {
    let Some(object) = source.as_object() else {
        return;
    };

    if let Some(list) = object.get(aliases::COHORT_KEYS).and_then(Value::as_array) {
        list.iter().filter_map(identifier).for_each(&mut *push);
    }

    if with_identity {
        for field in aliases::COHORT_KEY_FIELDS {
            if let Some(key) = object.get(*field).and_then(identifier) {
                push(key);
            }
        }
    } else if let Some(key) = object.get(aliases::COHORT_KEY).and_then(identifier) {
        push(key);
    }

    if let Some(cohort) = object
        .get(aliases::GENDER)
        .and_then(non_empty_str)
        .and_then(gender_to_cohort)
    {
        push(cohort.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_gender_vocabulary() {
        assert_eq!(gender_to_cohort("Female"), Some("cisFemale"));
        assert_eq!(gender_to_cohort(" m "), Some("cisMale"));
        assert_eq!(gender_to_cohort("enby"), Some("nonBinary"));
        assert_eq!(gender_to_cohort("Trans-Feminine"), Some("transfeminine"));
        assert_eq!(gender_to_cohort("coed"), Some("combined"));
        assert_eq!(gender_to_cohort("unknown"), None);
    }

    #[test]
    fn test_default_when_nothing_identifies() {
        assert_eq!(determine_cohort_keys(&json!({}), &json!(null), None), vec!["default"]);
    }

    #[test]
    fn test_default_dropped_with_specific_keys() {
        let block = json!({"id": "default", "gender": "female"});
        assert_eq!(determine_cohort_keys(&block, &json!({}), None), vec!["cisFemale"]);
    }

    #[test]
    fn test_order_and_dedup() {
        let block = json!({
            "cohortKeys": ["female", "cisFemale"],
            "cohort": "female",
            "gender": "F"
        });
        let meta = json!({"cohortKey": "all", "gender": "male"});
        assert_eq!(
            determine_cohort_keys(&block, &meta, Some("women_2020")),
            vec!["women_2020", "female", "cisFemale", "all", "cisMale"]
        );
    }

    #[test]
    fn test_dataset_meta_identity_fields_ignored() {
        // Only cohortKeys, cohortKey and gender are read from the dataset level
        let meta = json!({"id": "who-2007", "gender": "women"});
        assert_eq!(determine_cohort_keys(&json!({}), &meta, None), vec!["cisFemale"]);
    }
}
