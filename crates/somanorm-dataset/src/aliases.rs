//! Key spellings accepted for each field of a dataset payload.
//!
//! Tables are tried in order; the first present entry wins.

use crate::value::KeyPath;

/// Height section of a joint cohort block.
pub const HEIGHT_SECTION: &[KeyPath] = &[
    &["height_mm"],
    &["stature_mm"],
    &["stature"],
    &["height"],
    &["heightMm"],
    &["statureMm"],
];

/// Shoulder (biacromial breadth) section of a joint cohort block.
pub const SHOULDER_SECTION: &[KeyPath] = &[
    &["biacromial_mm"],
    &["shoulder_mm"],
    &["biacromial"],
    &["shoulder"],
    &["biacromialMm"],
    &["shoulderMm"],
    &["shoulderWidth_mm"],
    &["shoulderWidthMm"],
];

/// Height/shoulder correlation coefficient.
pub const RHO: &[KeyPath] = &[
    &["rho"],
    &["correlation"],
    &["correlation_rho"],
    &["correlationRho"],
    &["assumptions", "correlation_rho"],
    &["assumptions", "correlationRho"],
    &["assumptions", "rho"],
    &["assumptions", "correlation"],
];

pub const UNIT: &[&str] = &["unit", "units"];

/// Containers of explicit quantile tables.
pub const QUANTILE_TABLE: &[&str] = &["quantiles", "percentiles"];

/// Percentile field of one quantile-table entry.
pub const QUANTILE_PERCENTILE: &[&str] = &["percentile", "p", "quantile"];

/// Value field of one quantile-table entry.
pub const QUANTILE_VALUE: &[&str] = &["value", "val", "metric"];

/// Raw sample arrays.
pub const RAW_SAMPLES: &[&str] = &["values", "raw", "samples"];

/// Cut-off threshold on a metric.
pub const CUT: &[&str] = &["cut", "cutoff", "threshold"];

pub const BETTER_DIRECTION: &[&str] = &["betterDirection", "better_direction"];

/// Joint-annex source under the shoulder/height metric.
pub const COMPUTED_FROM: &[&str] = &["computedFrom", "computed_from"];

pub const COHORTS: &str = "cohorts";

pub const EXISTING_JOINT: &str = "joint";

/// Cohort key fields on a cohort block, after `cohortKeys`.
pub const COHORT_KEY_FIELDS: &[&str] = &["cohortKey", "cohort", "key", "id"];

pub const COHORT_KEYS: &str = "cohortKeys";
pub const COHORT_KEY: &str = "cohortKey";
pub const GENDER: &str = "gender";

/// Fallback cohort key when nothing identifies the cohort.
pub const DEFAULT_COHORT: &str = "default";

/// Gender vocabulary mapped onto cohort keys. Matching is case-insensitive.
pub const GENDER_COHORTS: &[(&[&str], &str)] = &[
    (&["female", "woman", "women", "cisfemale", "f"], "cisFemale"),
    (&["male", "man", "men", "cismale", "m"], "cisMale"),
    (&["nonbinary", "non-binary", "nb", "enby"], "nonBinary"),
    (&["transfeminine", "trans-feminine"], "transfeminine"),
    (&["transmasculine", "trans-masculine"], "transmasculine"),
    (&["mixed", "coed", "all", "combined", "general"], "combined"),
];

/// Bibliographic source fields at the dataset root.
pub const SOURCES: &[&str] = &["source", "sources", "references", "citations"];

/// Title field of one structured source entry.
pub const SOURCE_TITLE: &[&str] = &["title", "name", "source", "label"];

/// Metadata containers, root first.
pub const META_CONTAINERS: &[KeyPath] = &[&[], &["metadata"], &["meta"], &["info"], &["details"]];

pub const YEAR: &[&str] = &[
    "year",
    "dataYear",
    "releaseYear",
    "publicationYear",
    "published",
    "yearRange",
    "years",
];

pub const SAMPLE_SIZE: &[&str] = &[
    "n",
    "N",
    "sampleSize",
    "sample_size",
    "samples",
    "sample",
    "count",
];

pub const SHOULDER_MEDIAN_MALE: &[KeyPath] = &[
    &["cis_male"],
    &["cisMale"],
    &["cis", "male"],
    &["cisMaleMedian"],
    &["median_cis_male"],
];

pub const SHOULDER_MEDIAN_FEMALE: &[KeyPath] = &[
    &["cis_female"],
    &["cisFemale"],
    &["cis", "female"],
    &["cisFemaleMedian"],
    &["median_cis_female"],
];

/// Median field of a structured shoulder-median block.
pub const MEDIAN_VALUE: &[&str] = &["median", "p50", "P50", "p_50", "value"];

/// Model segment types and their accepted spellings.
pub const MODEL_TYPES: &[(&str, &[&str])] = &[
    (
        "flat",
        &[
            "flat",
            "print",
            "catalog",
            "catalogue",
            "commercial",
            "editorial-flat",
            "plane",
            "plane-model",
            "平面",
            "平面模特",
            "平面模特兒",
        ],
    ),
    (
        "runway",
        &[
            "runway",
            "catwalk",
            "editorial",
            "show",
            "runway-model",
            "伸展台",
            "伸展台模特",
        ],
    ),
];

/// Containers that may hold model ranges, in lookup order.
pub const MODEL_CONTAINERS: &[&str] = &["ranges", "metrics", "groups", "categories", "segments", "data"];

pub const RANGE_LO: &[&str] = &["lo", "low", "min", "lower", "lowerBound"];
pub const RANGE_HI: &[&str] = &["hi", "high", "max", "upper", "upperBound"];
pub const RANGE_AVG: &[&str] = &["avg", "mean", "average"];
pub const RANGE_SD: &[&str] = &["sd", "std", "stddev", "stdev"];
pub const RANGE_Q1: &[&str] = &["q1", "p25", "firstQuartile"];
pub const RANGE_Q3: &[&str] = &["q3", "p75", "thirdQuartile"];

/// Model manifest fields.
pub const MANIFEST_ID: &[&str] = &["id", "datasetId"];
pub const MANIFEST_FILE: &[&str] = &["file", "path"];
pub const MANIFEST_NAME: &[&str] = &["name", "title"];
pub const MANIFEST_DESCRIPTION: &[&str] = &["description", "summary"];
pub const MANIFEST_SOURCE: &[&str] = &["source", "sources"];
pub const MANIFEST_YEAR: &[&str] = &["year", "dataYear", "releaseYear"];
pub const MANIFEST_SAMPLE_SIZE: &[&str] = &["sampleSize", "samples", "sample_size", "n", "N"];
pub const MANIFEST_LISTS: &[&str] = &["datasets", "models"];
