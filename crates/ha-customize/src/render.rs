//! YAML renderer
//!
//! Serializes the merged store with keys sorted at every level, applies
//! cosmetic quoting fixes line by line, and hands the per-entity blocks to
//! the [`BannerFormatter`].

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde_yaml::{Mapping, Value};

use crate::banner::{BannerFormatter, EntityBlock};
use crate::error::CustomizeResult;
use crate::store::CustomizeStore;

static QUOTED_ICON: OnceLock<Regex> = OnceLock::new();
static SINGLE_QUOTED_VALUE: OnceLock<Regex> = OnceLock::new();
static BLOCK_SCALAR_HEADER: OnceLock<Regex> = OnceLock::new();

/// `icon: 'mdi:...'`
fn quoted_icon() -> &'static Regex {
    QUOTED_ICON.get_or_init(|| Regex::new(r"icon: '(mdi:[^']+)'").expect("icon pattern is valid"))
}

/// `key: '<non-space>...'` spanning to end of line
fn single_quoted_value() -> &'static Regex {
    SINGLE_QUOTED_VALUE.get_or_init(|| {
        Regex::new(r"^(.*?: )'(\S.*)'$").expect("quoted value pattern is valid")
    })
}

/// A line whose value opens a literal or folded block scalar (`key: |-`, `- >`)
fn block_scalar_header() -> &'static Regex {
    BLOCK_SCALAR_HEADER.get_or_init(|| {
        Regex::new(r"(?:^|[:-] )\s*[|>][0-9+-]*$").expect("block scalar pattern is valid")
    })
}

/// Rendering switches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Rewrite single-quoted scalar values with double quotes
    pub double_quote_strings: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            double_quote_strings: true,
        }
    }
}

/// Turns a merged store into the final customize document
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    options: RenderOptions,
    banners: BannerFormatter,
}

impl Renderer {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            banners: BannerFormatter::default(),
        }
    }

    /// Render the document with `generated_at` in the footer
    pub fn render(&self, store: &CustomizeStore, generated_at: &str) -> CustomizeResult<String> {
        let blocks = self.blocks(store)?;
        Ok(self.banners.format(&blocks, generated_at))
    }

    /// Serialize each entity to its own post-processed YAML block, sorted
    pub fn blocks(&self, store: &CustomizeStore) -> CustomizeResult<Vec<EntityBlock>> {
        store
            .iter()
            .map(|(entity_id, attributes)| -> CustomizeResult<EntityBlock> {
                let mut entry = Mapping::new();
                entry.insert(
                    Value::String(entity_id.clone()),
                    sort_keys(Value::Mapping(attributes.clone())),
                );
                let text = serde_yaml::to_string(&Value::Mapping(entry))?;
                Ok(EntityBlock::new(entity_id.clone(), self.post_process(&text)))
            })
            .collect()
    }

    /// Apply the quoting fixes line by line
    ///
    /// Content lines of block scalars are user text and pass through as-is.
    fn post_process(&self, text: &str) -> String {
        let mut output = Vec::new();
        // Indent of the line that opened the current block scalar
        let mut block_indent: Option<usize> = None;

        for line in text.lines() {
            if let Some(indent) = block_indent {
                if line.trim().is_empty() || indentation(line) > indent {
                    output.push(line.to_string());
                    continue;
                }
                block_indent = None;
            }

            if block_scalar_header().is_match(line) {
                block_indent = Some(indentation(line));
            }

            let line = unquote_icons(line);
            if self.options.double_quote_strings {
                output.push(double_quote_value(&line).into_owned());
            } else {
                output.push(line.into_owned());
            }
        }

        output.join("\n")
    }
}

/// Recursively sort mapping keys
///
/// Keys compare by their string form so mixed key types still order
/// deterministically.
pub fn sort_keys(value: Value) -> Value {
    match value {
        Value::Mapping(map) => {
            let mut entries: Vec<(Value, Value)> = map.into_iter().collect();
            entries.sort_by_cached_key(|(key, _)| key_string(key));
            Value::Mapping(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, sort_keys(value)))
                    .collect(),
            )
        }
        Value::Sequence(seq) => Value::Sequence(seq.into_iter().map(sort_keys).collect()),
        Value::Tagged(mut tagged) => {
            tagged.value = sort_keys(tagged.value);
            Value::Tagged(tagged)
        }
        other => other,
    }
}

fn key_string(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => "null".to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}

fn indentation(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

/// Drop the quotes around `mdi:` icon names
pub fn unquote_icons(text: &str) -> Cow<'_, str> {
    quoted_icon().replace_all(text, "icon: $1")
}

/// Rewrite `key: 'value'` as `key: "value"`, escaping for double quotes
pub fn double_quote_value(line: &str) -> Cow<'_, str> {
    single_quoted_value().replace(line, |caps: &Captures| {
        let body = caps[2].replace("''", "'");
        let escaped = body.replace('\\', "\\\\").replace('"', "\\\"");
        format!("{}\"{}\"", &caps[1], escaped)
    })
}
