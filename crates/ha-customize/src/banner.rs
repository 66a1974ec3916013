//! Banner formatter
//!
//! Lays out already-serialized entity blocks into the final document: a
//! file header, one section banner per entity domain, a blank line above
//! every entity, and a footer with the generation time.

use std::sync::OnceLock;

use regex::Regex;

use crate::classifier::title_case;

/// Width of the file header and footer rules
pub const DOCUMENT_RULE_WIDTH: usize = 64;

/// Width of the per-domain section rules
pub const SECTION_RULE_WIDTH: usize = 48;

static ENTITY_KEY: OnceLock<Regex> = OnceLock::new();

/// Entity ids that get a section banner: `domain.name`, both word characters
fn entity_key() -> &'static Regex {
    ENTITY_KEY.get_or_init(|| {
        Regex::new(r"^([A-Za-z0-9_]+)\.([A-Za-z0-9_]+)$").expect("entity key pattern is valid")
    })
}

/// One top-level entry of the rendered document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityBlock {
    /// Top-level key
    pub entity_id: String,
    /// Serialized YAML for the entry, starting with the key line
    pub text: String,
}

impl EntityBlock {
    pub fn new(entity_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            text: text.into(),
        }
    }

    /// Domain used for grouping, `None` for keys outside the `domain.name` shape
    pub fn group_domain(&self) -> Option<&str> {
        entity_key()
            .captures(&self.entity_id)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

/// Wraps entity blocks in header, section and footer banners
#[derive(Debug, Clone)]
pub struct BannerFormatter {
    title: String,
}

impl Default for BannerFormatter {
    fn default() -> Self {
        Self::new("Customize")
    }
}

impl BannerFormatter {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    /// Produce the full document text
    ///
    /// Blocks must already be in output order. An empty block list renders
    /// as `{}` so the document still parses as a mapping.
    pub fn format(&self, blocks: &[EntityBlock], generated_at: &str) -> String {
        let mut output: Vec<String> = Vec::new();

        output.push(rule(DOCUMENT_RULE_WIDTH));
        output.push(format!("## {}", self.title));
        output.push(rule(DOCUMENT_RULE_WIDTH));

        if blocks.is_empty() {
            output.push("{}".to_string());
        }

        let mut current_domain: Option<&str> = None;
        for block in blocks {
            if let Some(domain) = block.group_domain() {
                if current_domain != Some(domain) {
                    current_domain = Some(domain);
                    output.push(String::new());
                    output.push(rule(SECTION_RULE_WIDTH));
                    output.push(format!("## {}", section_title(domain)));
                    output.push(rule(SECTION_RULE_WIDTH));
                }
                output.push(String::new());
            }
            output.extend(block.text.lines().map(String::from));
        }

        output.push(String::new());
        output.push(rule(DOCUMENT_RULE_WIDTH));
        output.push(format!("# Last Generated: {}", generated_at));
        output.push(rule(DOCUMENT_RULE_WIDTH));
        output.push(String::new());

        output.join("\n")
    }
}

fn rule(width: usize) -> String {
    "#".repeat(width)
}

/// `binary_sensor` -> `Binary Sensor`
pub fn section_title(domain: &str) -> String {
    title_case(&domain.replace('_', " "))
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENERATED: &str = "Sun Oct 18 2026 09:30:00 GMT+0000";

    fn block(id: &str, body: &str) -> EntityBlock {
        EntityBlock::new(id, format!("{}:\n{}", id, body))
    }

    #[test]
    fn test_group_domain() {
        assert_eq!(block("light.a", "").group_domain(), Some("light"));
        assert_eq!(block("binary_sensor.door_1", "").group_domain(), Some("binary_sensor"));
        assert_eq!(block("sensor.a.b", "").group_domain(), None);
        assert_eq!(block("sensor.a-b", "").group_domain(), None);
        assert_eq!(block("nodot", "").group_domain(), None);
    }

    #[test]
    fn test_section_title() {
        assert_eq!(section_title("light"), "Light");
        assert_eq!(section_title("binary_sensor"), "Binary Sensor");
        assert_eq!(section_title("input_boolean"), "Input Boolean");
    }

    #[test]
    fn test_two_domains() {
        let blocks = vec![
            block("light.a", "  friendly_name: A"),
            block("switch.b", "  friendly_name: B"),
        ];
        let text = BannerFormatter::default().format(&blocks, GENERATED);
        let expected = [
            "################################################################",
            "## Customize",
            "################################################################",
            "",
            "################################################",
            "## Light",
            "################################################",
            "",
            "light.a:",
            "  friendly_name: A",
            "",
            "################################################",
            "## Switch",
            "################################################",
            "",
            "switch.b:",
            "  friendly_name: B",
            "",
            "################################################################",
            "# Last Generated: Sun Oct 18 2026 09:30:00 GMT+0000",
            "################################################################",
            "",
        ]
        .join("\n");

        assert_eq!(text, expected);
    }

    #[test]
    fn test_same_domain_blank_line_between_entities() {
        let blocks = vec![
            block("light.a", "  friendly_name: A"),
            block("light.b", "  friendly_name: B"),
        ];
        let text = BannerFormatter::default().format(&blocks, GENERATED);

        assert_eq!(text.matches("## Light").count(), 1);
        assert!(text.contains("  friendly_name: A\n\nlight.b:\n"));
    }

    #[test]
    fn test_ungroupable_key_appended_without_separator() {
        let blocks = vec![
            block("light.a", "  friendly_name: A"),
            EntityBlock::new("sensor.a.b", "sensor.a.b:\n  friendly_name: AB"),
        ];
        let text = BannerFormatter::default().format(&blocks, GENERATED);

        assert!(text.contains("  friendly_name: A\nsensor.a.b:\n  friendly_name: AB\n"));
        assert!(!text.contains("## Sensor"));
    }

    #[test]
    fn test_empty_document() {
        let text = BannerFormatter::default().format(&[], GENERATED);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[3], "{}");
        assert_eq!(lines[4], "");
        assert!(text.ends_with("################################################################\n"));
    }
}
