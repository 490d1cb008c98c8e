use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

/// Static per-section configuration read from the section root's `data-*` attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingConfig {
    pub query: String,
    pub endpoint: String,
    pub display: String,
}

impl ListingConfig {
    /// `{endpoint}{query}&start_rank={offset}`; the query already carries its own `?`/`&`.
    pub fn request_url(&self, offset: u32) -> String {
        format!("{}{}&start_rank={}", self.endpoint, self.query, offset)
    }
}

/// A search record as the backend sends it. Everything is optional; records are heterogeneous.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawResult {
    #[serde(deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub summary: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub live_url: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub image_url: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub image_alt: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub taxonomy: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub taxonomy_url: Option<String>,
    #[serde(rename = "type", deserialize_with = "lenient_text")]
    pub kind: Option<String>,
    /// Funnelback sends either a date string or epoch milliseconds.
    #[serde(deserialize_with = "lenient_text")]
    pub date: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub video_url: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub size: Option<String>,
    #[serde(deserialize_with = "lenient_flag")]
    pub is_teaser: Option<bool>,
    #[serde(deserialize_with = "lenient_text")]
    pub display_configuration: Option<String>,
    /// Funnelback metadata classes, each holding one or more values.
    #[serde(deserialize_with = "lenient_metadata")]
    pub list_metadata: HashMap<String, Vec<String>>,
}

impl RawResult {
    pub(crate) fn meta(&self, key: &str) -> Option<String> {
        self.list_metadata
            .get(key)
            .and_then(|values| values.first())
            .filter(|v| !v.is_empty())
            .cloned()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub response: Option<ResponseBody>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseBody {
    #[serde(default)]
    pub result_packet: Option<ResultPacket>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultPacket {
    #[serde(default)]
    pub results_summary: Option<ResultsSummary>,
    /// Records are read one by one; a record that is not an object is skipped.
    #[serde(default, deserialize_with = "lenient_results")]
    pub results: Vec<RawResult>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsSummary {
    #[serde(default)]
    pub total_matching: u32,
    #[serde(default)]
    pub num_ranks: u32,
}

impl SearchResponse {
    pub fn summary(&self) -> Option<ResultsSummary> {
        self.packet().and_then(|p| p.results_summary)
    }

    pub fn results(&self) -> &[RawResult] {
        self.packet()
            .map(|p| p.results.as_slice())
            .unwrap_or_default()
    }

    fn packet(&self) -> Option<&ResultPacket> {
        self.response
            .as_ref()
            .and_then(|r| r.result_packet.as_ref())
    }
}

/// Normalized card shape handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardModel {
    pub title: String,
    pub description: Option<String>,
    pub live_url: Option<String>,
    pub image_url: Option<String>,
    pub image_alt: Option<String>,
    pub taxonomy: Option<String>,
    pub taxonomy_url: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub date: Option<String>,
    pub video_url: Option<String>,
    pub size: Option<String>,
    pub is_teaser: bool,
    /// Fresh per normalization; only correlates a card with its modal inside one render pass.
    #[serde(rename = "uniqueID")]
    pub unique_id: String,
    pub display_configuration: Option<String>,
}

impl CardModel {
    pub fn is_video(&self) -> bool {
        self.kind.as_deref() == Some("Video")
            || self.video_url.as_deref().is_some_and(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModalDescriptor {
    #[serde(rename = "uniqueID")]
    pub unique_id: String,
    pub video_id: String,
    pub title: String,
    pub is_vertical: bool,
    pub no_auto_play: bool,
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn scalar_text(value: Value) -> Result<String, Value> {
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(other),
    }
}

/// Strings, numbers and booleans are kept as text; anything else is dropped.
fn lenient_text<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    match Value::deserialize(de)? {
        Value::Null => Ok(None),
        value => match scalar_text(value) {
            Ok(text) => Ok(Some(text)),
            Err(other) => {
                warn!(
                    found = json_type(&other),
                    "dropping non-scalar search field"
                );
                Ok(None)
            }
        },
    }
}

fn lenient_flag<'de, D: Deserializer<'de>>(de: D) -> Result<Option<bool>, D::Error> {
    let value = Value::deserialize(de)?;
    let flag = match &value {
        Value::Null => return Ok(None),
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|n| n != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" | "" => Some(false),
            _ => None,
        },
        Value::Array(_) | Value::Object(_) => None,
    };
    if flag.is_none() {
        warn!(found = json_type(&value), "dropping unreadable search flag");
    }
    Ok(flag)
}

fn lenient_metadata<'de, D: Deserializer<'de>>(
    de: D,
) -> Result<HashMap<String, Vec<String>>, D::Error> {
    let entries = match Value::deserialize(de)? {
        Value::Object(entries) => entries,
        Value::Null => return Ok(HashMap::new()),
        other => {
            warn!(found = json_type(&other), "dropping search metadata");
            return Ok(HashMap::new());
        }
    };
    let mut metadata = HashMap::with_capacity(entries.len());
    for (key, value) in entries {
        let values = match value {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|v| scalar_text(v).ok())
                .collect(),
            Value::Null => continue,
            scalar => match scalar_text(scalar) {
                Ok(text) => vec![text],
                Err(other) => {
                    warn!(
                        key = %key,
                        found = json_type(&other),
                        "dropping search metadata class"
                    );
                    continue;
                }
            },
        };
        metadata.insert(key, values);
    }
    Ok(metadata)
}

fn lenient_results<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<RawResult>, D::Error> {
    let records = match Value::deserialize(de)? {
        Value::Array(records) => records,
        Value::Null => return Ok(Vec::new()),
        other => {
            warn!(found = json_type(&other), "search results are not a list");
            return Ok(Vec::new());
        }
    };
    let results = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| {
            if !record.is_object() {
                warn!(index, found = json_type(&record), "skipping search record");
                return None;
            }
            match RawResult::deserialize(record) {
                Ok(raw) => Some(raw),
                Err(e) => {
                    warn!(index, error = %e, "skipping search record");
                    None
                }
            }
        })
        .collect();
    Ok(results)
}
