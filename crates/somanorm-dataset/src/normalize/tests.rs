//! Tests for dataset normalization.

use super::*;
use serde_json::json;
use somanorm_stats::{PercentileMethod, QuantilePoint};

fn population_payload() -> Value {
    json!({
        "id": "twn-adults-2019",
        "name": "Taiwan adults",
        "source": [{"title": "National Nutrition Survey"}, "MOHW"],
        "metadata": {"year": "2017-2020", "n": "3,521"},
        "gender": "female",
        "metrics": {
            "bmi": {"unit": "kg/m2", "p10": 18.7, "p50": 22.4, "p90": 28.1},
            "whtR": {"p25": 0.42, "p50": 0.46, "p75": 0.51, "cut": 0.5, "betterDirection": "lower"},
            "whrFemale": {"p50": 0.8, "cut": 0.85},
            "shoulderHeightRatio": {
                "p50": 0.225,
                "cisFemale": {"median": "35.6"},
                "computedFrom": {
                    "height_mm": {"unit": "mm", "p5": 1500, "p50": 1590, "p95": 1680},
                    "biacromial_mm": {"unit": "mm", "p5": 330, "p50": 356, "p95": 382},
                    "assumptions": {"correlation_rho": 0.42}
                }
            },
            "bodyFatPct": {"values": [31, 22, 27]}
        }
    })
}

#[test]
fn test_non_object_payloads() {
    let registry = CohortRegistry::new();
    assert!(normalize_dataset(&json!(null), &registry).is_none());
    assert!(normalize_dataset(&json!([1, 2]), &registry).is_none());
    assert!(normalize_dataset(&json!("dataset"), &registry).is_none());
}

#[test]
fn test_empty_object_has_every_slot_empty() {
    let registry = CohortRegistry::new();
    let dataset = normalize_dataset(&json!({}), &registry).unwrap();
    assert!(dataset.metrics.is_empty());
    assert!(dataset.id.is_none());
    assert!(dataset.meta.sources.is_empty());
    assert_eq!(dataset.shoulder_medians, ShoulderMedians::default());

    let value = serde_json::to_value(&dataset).unwrap();
    for key in MetricKey::ALL {
        assert!(value["metrics"][key.key()].is_null(), "{} should be null", key);
    }
}

#[test]
fn test_full_population_dataset() {
    let registry = CohortRegistry::new();
    let dataset = normalize_dataset(&population_payload(), &registry).unwrap();

    assert_eq!(dataset.id.as_deref(), Some("twn-adults-2019"));
    assert_eq!(dataset.name.as_deref(), Some("Taiwan adults"));
    assert_eq!(dataset.meta.sources, vec!["National Nutrition Survey", "MOHW"]);
    assert_eq!(dataset.meta.year, Some(MetaValue::Number(2017.0)));
    assert_eq!(dataset.meta.sample_size, Some(MetaValue::Number(3521.0)));

    let bmi = dataset.metric(MetricKey::Bmi).unwrap();
    assert_eq!(bmi.quantile_points.len(), 3);
    assert!(dataset.metric(MetricKey::WaistToHip).is_none());

    assert_eq!(dataset.waist_to_height_cut, Some(0.5));
    assert_eq!(dataset.whr_female_cut, Some(0.85));
    assert!(dataset.whr_male_cut.is_none());
    assert_eq!(dataset.shoulder_medians.cis_female, Some(35.6));
    assert!(dataset.shoulder_medians.cis_male.is_none());

    let body_fat = dataset.metric(MetricKey::BodyFatPct).unwrap();
    assert_eq!(body_fat.raw_samples, Some(vec![22.0, 27.0, 31.0]));
    assert_eq!(body_fat.percentile_rank(27.0).method, PercentileMethod::Empirical);
}

#[test]
fn test_joint_annex_built_and_registered() {
    let registry = CohortRegistry::new();
    let dataset = normalize_dataset(&population_payload(), &registry).unwrap();

    let shoulder = dataset.metric(MetricKey::ShoulderToHeight).unwrap();
    assert_eq!(shoulder.quantile_points, vec![QuantilePoint::new(50.0, 0.225)]);

    let joint = dataset.joint().unwrap();
    assert_eq!(joint.keys().collect::<Vec<_>>(), vec!["cisFemale"]);
    let entry = joint["cisFemale"];
    assert!((entry.mu_height - 159.0).abs() < 1e-9);
    assert!((entry.mu_shoulder - 35.6).abs() < 1e-9);
    assert_eq!(entry.rho, Some(0.42));
    assert_eq!(registry.lookup("cisFemale"), Some(entry));

    let result = registry
        .compute_conditional_shoulder(159.0, Some(35.6), "cisFemale")
        .unwrap();
    assert!((result.pr.unwrap() - 50.0).abs() < 1e-9);
}

#[test]
fn test_shoulder_metric_without_quantiles_still_carries_joint() {
    let registry = CohortRegistry::new();
    let payload = json!({
        "metrics": {
            "shoulderHeightRatio": {
                "unit": "ratio",
                "computedFrom": {
                    "cohorts": {
                        "cisMale": {
                            "stature": {"p10": 165, "p50": 173, "p90": 181},
                            "shoulder": {"p10": 37, "p50": 40, "p90": 43},
                            "rho": 0.5
                        }
                    }
                }
            }
        }
    });
    let dataset = normalize_dataset(&payload, &registry).unwrap();
    let shoulder = dataset.metric(MetricKey::ShoulderToHeight).unwrap();
    assert!(shoulder.quantile_points.is_empty());
    assert_eq!(shoulder.unit.as_deref(), Some("ratio"));
    assert!(shoulder.joint.as_ref().unwrap().contains_key("cisMale"));
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_existing_joint_kept() {
    let registry = CohortRegistry::new();
    let first = normalize_dataset(&population_payload(), &registry).unwrap();
    let joint = serde_json::to_value(first.joint().unwrap()).unwrap();

    registry.reset();
    let payload = json!({
        "metrics": {
            "shoulderHeightRatio": {
                "p50": 0.23,
                "joint": joint,
                "computedFrom": {"height": {"p5": 1, "p50": 2, "p95": 3}}
            }
        }
    });
    let second = normalize_dataset(&payload, &registry).unwrap();
    assert_eq!(second.joint(), first.joint());
    assert!(registry.lookup("cisFemale").is_some());
}

#[test]
fn test_existing_joint_entries_are_validated() {
    let registry = CohortRegistry::new();
    let entry = |rho: f64, sigma_shoulder: f64| {
        json!({
            "muHeight": 176.0, "sigmaHeight": 7.0,
            "muShoulder": 40.0, "sigmaShoulder": sigma_shoulder,
            "rho": rho,
            "heightRange": {"low": 164.0, "high": 188.0},
            "shoulderRange": {"low": 35.0, "high": 45.0}
        })
    };
    let payload = json!({
        "metrics": {
            "shoulderHeightRatio": {
                "joint": {
                    "cisMale": entry(1.7, 3.0),
                    "cisFemale": entry(0.4, -3.0)
                }
            }
        }
    });
    let dataset = normalize_dataset(&payload, &registry).unwrap();

    let joint = dataset.joint().unwrap();
    assert!(!joint.contains_key("cisFemale"));
    assert!(registry.lookup("cisFemale").is_none());

    let male = registry.lookup("cisMale").unwrap();
    assert!((male.rho.unwrap() - somanorm_stats::RHO_LIMIT).abs() < 1e-12);
    assert_eq!(joint["cisMale"], male);

    let result = registry
        .compute_conditional_shoulder(185.0, Some(40.0), "cisMale")
        .unwrap();
    assert!(result.sigma_cond.unwrap() > somanorm_stats::MIN_SIGMA);
}

#[test]
fn test_malformed_joint_falls_back_to_computed_from() {
    let registry = CohortRegistry::new();
    let payload = json!({
        "gender": "male",
        "metrics": {
            "shoulderHeightRatio": {
                "joint": {"cisMale": {"muHeight": "tall"}},
                "computedFrom": {
                    "height": {"p5": 165, "p50": 176, "p95": 187},
                    "shoulder": {"p5": 37, "p50": 40, "p95": 43},
                    "rho": 0.45
                }
            }
        }
    });
    let dataset = normalize_dataset(&payload, &registry).unwrap();
    let entry = dataset.joint().unwrap()["cisMale"];
    assert!((entry.mu_height - 176.0).abs() < 1e-9);
    assert_eq!(registry.lookup("cisMale"), Some(entry));

    let model_registry = CohortRegistry::new();
    let patched = attach_joint_to_model(&payload, &model_registry);
    assert!(patched["metrics"]["shoulderHeightRatio"]["joint"]["cisMale"]["muHeight"].is_number());
    assert!(model_registry.lookup("cisMale").is_some());
}

#[test]
fn test_normalize_idempotent() {
    let first_registry = CohortRegistry::new();
    let second_registry = CohortRegistry::new();
    let payload = population_payload();

    let first = normalize_dataset(&payload, &first_registry).unwrap();
    let second = normalize_dataset(&payload, &first_registry).unwrap();
    let fresh = normalize_dataset(&payload, &second_registry).unwrap();

    assert_eq!(first, second);
    assert_eq!(first, fresh);
    assert_eq!(
        serde_json::to_value(&first).unwrap(),
        serde_json::to_value(&second).unwrap()
    );
    assert_eq!(first_registry.keys(), second_registry.keys());
    for key in first_registry.keys() {
        assert_eq!(first_registry.lookup(&key), second_registry.lookup(&key));
    }
}

#[test]
fn test_degraded_metric_sections() {
    let registry = CohortRegistry::new();
    let payload = json!({
        "metrics": {
            "bmi": "22.1",
            "whr": [0.8, 0.9],
            "BMI": {"p50": 21},
            "shoulderHeightRatio": {"computedFrom": {"height": {"p50": 160}}}
        }
    });
    let dataset = normalize_dataset(&payload, &registry).unwrap();
    // "bmi" is not an object, so the "BMI" alias is used
    assert_eq!(dataset.metric(MetricKey::Bmi).unwrap().quantile_at(50.0), Some(21.0));
    assert!(dataset.metric(MetricKey::WaistToHip).is_none());
    let shoulder = dataset.metric(MetricKey::ShoulderToHeight).unwrap();
    assert!(shoulder.joint.is_none());
    assert!(registry.is_empty());
}

#[test]
fn test_metric_aliases() {
    let registry = CohortRegistry::new();
    let payload = json!({"metrics": {"waist_height_ratio": {"p50": 0.47}}});
    let dataset = normalize_dataset(&payload, &registry).unwrap();
    assert_eq!(
        dataset.metric(MetricKey::WaistToHeight).unwrap().quantile_at(50.0),
        Some(0.47)
    );
}

#[test]
fn test_shoulder_medians_spellings() {
    let medians = ShoulderMedians::extract(Some(&json!({
        "cis": {"male": {"p50": 40.2}},
        "cisMale": "n/a",
        "median_cis_female": 35
    })));
    assert_eq!(medians.cis_male, Some(40.2));
    assert_eq!(medians.cis_female, Some(35.0));
    assert_eq!(ShoulderMedians::extract(None), ShoulderMedians::default());

    let (male, female) = medians.deviation_pct(35.0);
    assert!((male.unwrap() - 12.935_323_383).abs() < 1e-6);
    assert_eq!(female, Some(0.0));
}

#[test]
fn test_canonical_output_shape() {
    let registry = CohortRegistry::new();
    let dataset = normalize_dataset(&population_payload(), &registry).unwrap();
    let value = serde_json::to_value(&dataset).unwrap();

    assert_eq!(value["whtRCut"], 0.5);
    assert_eq!(value["whrFemaleCut"], 0.85);
    assert_eq!(value["shoulderMedians"]["cisFemale"], 35.6);
    assert_eq!(value["metrics"]["whtR"]["betterDirection"], "lower");
    assert_eq!(value["metrics"]["whtR"]["cutThreshold"], 0.5);
    assert!(value["metrics"]["bmi"].get("joint").is_none());
    assert!(value["metrics"]["shoulderHeightRatio"]["joint"]["cisFemale"].is_object());

    let back: CanonicalDataset = serde_json::from_value(value).unwrap();
    assert_eq!(back, dataset);
}

#[test]
fn test_attach_joint_to_model() {
    let registry = CohortRegistry::new();
    let model = json!({
        "ranges": {"runway": {"whtR": [0.38, 0.44]}},
        "metrics": {
            "shoulderHeightRatio": {
                "computedFrom": {
                    "gender": "m",
                    "height": {"p5": 175, "p50": 183, "p95": 191},
                    "shoulder": {"p5": 40, "p50": 43, "p95": 46},
                    "rho": 0.3
                }
            }
        }
    });
    let patched = attach_joint_to_model(&model, &registry);
    assert!(patched["metrics"]["shoulderHeightRatio"]["joint"]["cisMale"].is_object());
    assert_eq!(patched["ranges"], model["ranges"]);
    assert!(registry.lookup("cisMale").is_some());
}

#[test]
fn test_attach_joint_to_model_passthrough() {
    let registry = CohortRegistry::new();
    let model = json!({"ranges": {"flat": {"bmi": {"min": 17, "max": 20}}}});
    assert_eq!(attach_joint_to_model(&model, &registry), model);

    let broken = json!({"metrics": {"shoulderHeightRatio": {"computedFrom": {}}}});
    assert_eq!(attach_joint_to_model(&broken, &registry), broken);
    assert_eq!(attach_joint_to_model(&json!(7), &registry), json!(7));
}
