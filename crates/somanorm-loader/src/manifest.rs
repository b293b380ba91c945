//! Dataset manifests.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use somanorm_dataset::aliases;
use somanorm_dataset::normalize::collect_source_titles;
use somanorm_dataset::value::{first_key, identifier, non_empty_str};
use somanorm_dataset::MetaValue;

/// One selectable dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub id: String,
    /// Defaults to the id.
    pub name: String,
    /// Path relative to the data root.
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<MetaValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_size: Option<MetaValue>,
}

/// Entries of the population manifest's `datasets` list.
///
/// Entries without an id or a file are skipped.
pub fn parse_population_manifest(manifest: &Value) -> Vec<ManifestEntry> {
    let Some(items) = manifest.get("datasets").and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let id = item.get("id").and_then(identifier)?;
            let file = item.get("file").and_then(non_empty_str)?.to_string();
            let name = item
                .get("name")
                .and_then(non_empty_str)
                .map_or_else(|| id.clone(), str::to_string);
            Some(ManifestEntry {
                id,
                name,
                file,
                description: None,
                sources: Vec::new(),
                year: None,
                sample_size: None,
            })
        })
        .collect()
}

/// Dataset list of a model manifest, or `None` when it has neither a
/// `datasets` nor a `models` array.
pub fn parse_model_manifest(manifest: &Value) -> Option<Vec<ManifestEntry>> {
    let items = aliases::MANIFEST_LISTS
        .iter()
        .find_map(|key| manifest.get(*key).and_then(Value::as_array))?;
    Some(items.iter().filter_map(model_entry).collect())
}

fn model_entry(item: &Value) -> Option<ManifestEntry> {
    if !item.is_object() {
        return None;
    }
    let id = first_key(item, aliases::MANIFEST_ID).and_then(identifier)?;
    let file = first_key(item, aliases::MANIFEST_FILE)
        .and_then(non_empty_str)?
        .to_string();
    let text = |keys: &[&str]| {
        first_key(item, keys)
            .and_then(non_empty_str)
            .map(str::to_string)
    };

    Some(ManifestEntry {
        name: text(aliases::MANIFEST_NAME).unwrap_or_else(|| id.clone()),
        description: text(aliases::MANIFEST_DESCRIPTION),
        sources: first_key(item, aliases::MANIFEST_SOURCE)
            .map(collect_source_titles)
            .unwrap_or_default(),
        year: first_key(item, aliases::MANIFEST_YEAR).and_then(meta_value),
        sample_size: first_key(item, aliases::MANIFEST_SAMPLE_SIZE).and_then(meta_value),
        id,
        file,
    })
}

fn meta_value(value: &Value) -> Option<MetaValue> {
    match value {
        Value::Number(n) => n.as_f64().map(MetaValue::Number),
        other => non_empty_str(other).map(|s| MetaValue::Text(s.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_population_manifest() {
        let manifest = json!({"datasets": [
            {"id": "twn", "name": "Taiwan", "file": "assets/data/twn.json"},
            {"id": "usa", "file": "assets/data/usa.json"},
            {"id": "broken"},
            {"file": "orphan.json"},
            "junk"
        ]});
        let entries = parse_population_manifest(&manifest);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "Taiwan");
        assert_eq!(entries[1].name, "usa");
        assert!(parse_population_manifest(&json!({"models": []})).is_empty());
    }

    #[test]
    fn test_model_manifest_aliases() {
        let manifest = json!({"models": [{
            "datasetId": "vogue-2020",
            "path": "assets/data/models/vogue.json",
            "title": "Runway 2020",
            "summary": "Editorial castings",
            "sources": ["Agency sheets", {"name": "Casting notes"}],
            "releaseYear": 2020,
            "N": "412"
        }]});
        let entries = parse_model_manifest(&manifest).unwrap();
        let entry = &entries[0];
        assert_eq!(entry.id, "vogue-2020");
        assert_eq!(entry.file, "assets/data/models/vogue.json");
        assert_eq!(entry.name, "Runway 2020");
        assert_eq!(entry.description.as_deref(), Some("Editorial castings"));
        assert_eq!(entry.sources, vec!["Agency sheets", "Casting notes"]);
        assert_eq!(entry.year, Some(MetaValue::Number(2020.0)));
        assert_eq!(entry.sample_size, Some(MetaValue::Text("412".to_string())));
    }

    #[test]
    fn test_model_manifest_without_list() {
        assert!(parse_model_manifest(&json!({"items": []})).is_none());
        assert_eq!(parse_model_manifest(&json!({"datasets": []})), Some(vec![]));
    }
}
