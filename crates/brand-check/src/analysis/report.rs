use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Report shape requested from the model. A deployment runs exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportSchema {
    /// Separate contradiction, risk, and recommendation lists.
    V1,
    /// Merged contradictions/risks and priority-annotated improvements.
    #[default]
    V2,
}

impl ReportSchema {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V2 => "v2",
        }
    }

    /// JSON keys the model is asked to fill for this schema.
    pub fn field_names(self) -> &'static [&'static str] {
        match self {
            Self::V1 => &LEGACY_FIELDS,
            Self::V2 => &PRIORITIZED_FIELDS,
        }
    }
}

const LEGACY_FIELDS: [&str; 10] = [
    "overallComment",
    "contradictions",
    "priorityActions",
    "weaknesses",
    "recommendations",
    "risks",
    "actionPlan3Months",
    "actionPlan6Months",
    "actionPlan1Year",
    "phaseAdvice",
];

const PRIORITIZED_FIELDS: [&str; 7] = [
    "overallComment",
    "contradictionsAndRisks",
    "improvements",
    "actionPlan3Months",
    "actionPlan6Months",
    "actionPlan1Year",
    "phaseAdvice",
];

impl fmt::Display for ReportSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportSchema {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "v1" | "legacy" => Ok(Self::V1),
            "v2" | "prioritized" => Ok(Self::V2),
            other => Err(format!("unknown report schema '{other}'")),
        }
    }
}

/// First-generation report: contradictions, risks, and recommendations kept apart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LegacyReport {
    #[serde(deserialize_with = "lenient_text")]
    pub overall_comment: String,
    #[serde(deserialize_with = "lenient_list")]
    pub contradictions: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub priority_actions: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub weaknesses: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub recommendations: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub risks: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub action_plan_3_months: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub action_plan_6_months: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub action_plan_1_year: Vec<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub phase_advice: String,
}

/// Current report: merged contradiction/risk list and ★-annotated improvements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrioritizedReport {
    #[serde(deserialize_with = "lenient_text")]
    pub overall_comment: String,
    #[serde(deserialize_with = "lenient_list")]
    pub contradictions_and_risks: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub improvements: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub action_plan_3_months: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub action_plan_6_months: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub action_plan_1_year: Vec<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub phase_advice: String,
}

/// Structured analysis attached to a submission, tagged by schema version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "schemaVersion")]
pub enum AnalysisReport {
    #[serde(rename = "v1")]
    Legacy(LegacyReport),
    #[serde(rename = "v2")]
    Prioritized(PrioritizedReport),
}

impl AnalysisReport {
    /// Decode an untagged model payload into the variant for `schema`.
    ///
    /// Missing, null, or mistyped fields decode as empty; a payload that is not
    /// an object yields an empty report.
    pub fn from_payload(schema: ReportSchema, payload: Value) -> Self {
        let fields = match payload {
            Value::Object(fields) => fields,
            other => {
                debug!(%schema, kind = json_kind(&other), "report payload is not an object");
                Map::new()
            }
        };

        let ignored: Vec<&str> = fields
            .keys()
            .map(String::as_str)
            .filter(|key| !schema.field_names().iter().any(|name| name == key))
            .collect();
        if !ignored.is_empty() {
            debug!(%schema, ?ignored, "report payload carries fields outside the schema");
        }

        let payload = Value::Object(fields);
        match schema {
            ReportSchema::V1 => Self::Legacy(LegacyReport::deserialize(payload).unwrap_or_default()),
            ReportSchema::V2 => {
                Self::Prioritized(PrioritizedReport::deserialize(payload).unwrap_or_default())
            }
        }
    }

    pub fn schema(&self) -> ReportSchema {
        match self {
            Self::Legacy(_) => ReportSchema::V1,
            Self::Prioritized(_) => ReportSchema::V2,
        }
    }

    pub fn overall_comment(&self) -> &str {
        match self {
            Self::Legacy(report) => &report.overall_comment,
            Self::Prioritized(report) => &report.overall_comment,
        }
    }
}

/// Text field: strings pass through, anything else reads as empty.
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        _ => String::new(),
    })
}

/// List field: string entries of an array are kept, anything else reads as empty.
fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(text) => Some(text),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
