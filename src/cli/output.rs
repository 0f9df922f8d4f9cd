//! Shared output formatting utilities for CLI commands
//!
//! Supports JSON and a plain table for secret descriptions.

use anyhow::{Context, Result};
use serde::Serialize;
use std::str::FromStr;

use crate::secrets::SecretDescription;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    Json,
    #[default]
    Table,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "table" => Ok(OutputFormat::Table),
            _ => anyhow::bail!("Unsupported output format: '{}'. Use 'json' or 'table'.", s),
        }
    }
}

/// Print data as JSON
pub fn print_json<T: Serialize>(data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data).context("Failed to serialize to JSON")?;
    println!("{}", json);
    Ok(())
}

/// Print a secret description in the requested format
pub fn print_description(description: &SecretDescription, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(description),
        OutputFormat::Table => {
            print!("{}", render_description_table(description));
            Ok(())
        }
    }
}

/// Render the stage map of a secret as a fixed-width table
pub fn render_description_table(description: &SecretDescription) -> String {
    let mut out = String::new();
    out.push_str(&format!("Secret:           {}\n", description.secret_id));
    out.push_str(&format!("Rotation enabled: {}\n", description.rotation_enabled));
    if let Some(at) = description.last_rotated_at {
        out.push_str(&format!("Last rotated:     {}\n", at.format("%Y-%m-%d %H:%M:%S UTC")));
    }
    out.push('\n');
    out.push_str(&format!("{:<40} {}\n", "Version", "Stages"));
    out.push_str(&format!("{}\n", "-".repeat(70)));

    for (version_id, stages) in description.versions.iter() {
        let labels: Vec<&str> = stages.iter().map(|s| s.as_label()).collect();
        out.push_str(&format!("{:<40} {}\n", truncate(version_id, 40), labels.join(", ")));
    }
    out
}

/// Truncate string to maximum length with ellipsis
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::{StageMap, VersionStage};

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("table".parse::<OutputFormat>().unwrap(), OutputFormat::Table);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_render_description_table() {
        let description = SecretDescription {
            secret_id: "trakt".to_string(),
            rotation_enabled: true,
            versions: StageMap::new()
                .with_version("v1", [VersionStage::Previous])
                .with_version("v2", [VersionStage::Current, VersionStage::Pending]),
            last_rotated_at: None,
        };

        let table = render_description_table(&description);
        assert!(table.contains("Rotation enabled: true"));
        assert!(table.lines().any(|l| l.starts_with("v1") && l.ends_with("AWSPREVIOUS")));
        assert!(table.lines().any(|l| l.starts_with("v2") && l.contains("AWSCURRENT")));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a-very-long-version-id", 10), "a-very-...");
    }
}
