use crate::{
    config::ReportConfig,
    models::Item,
    report::Report,
    Error, Result,
};
use std::fs::File;
use std::io::Write;
use std::path::Path;

const ASSET_DISCLAIMER: &str =
    "*These are saved for extracting assets, not for direct inclusion in the modpack.*";

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Markdown,
    Json,
}

impl ExportFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "md" | "markdown" => Some(ExportFormat::Markdown),
            "json" => Some(ExportFormat::Json),
            _ => None,
        }
    }
}

/// Renders a finished `Report`; no decisions get made in here
pub struct Exporter;

impl Exporter {
    /// Export a report to a file with automatic format detection
    pub fn export_to_file<P: AsRef<Path>>(
        report: &Report,
        settings: &ReportConfig,
        path: P,
    ) -> Result<()> {
        let path = path.as_ref();

        // Detect format from extension
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(ExportFormat::from_extension)
            .ok_or_else(|| {
                Error::ExportError(
                    "Could not determine export format from extension. Use .md or .json"
                        .to_string(),
                )
            })?;

        Self::export_to_file_with_format(report, settings, path, format)
    }

    /// Export a report to a file with explicit format
    ///
    /// Content is rendered before the file is created, so a failed render
    /// never leaves a half-written report behind.
    pub fn export_to_file_with_format<P: AsRef<Path>>(
        report: &Report,
        settings: &ReportConfig,
        path: P,
        format: ExportFormat,
    ) -> Result<()> {
        let content = match format {
            ExportFormat::Markdown => Self::to_markdown(report, settings),
            ExportFormat::Json => Self::to_json(report)?,
        };

        let mut file = File::create(path.as_ref())
            .map_err(|e| Error::ExportError(format!("Failed to create file: {}", e)))?;

        file.write_all(content.as_bytes())
            .map_err(|e| Error::ExportError(format!("Failed to write file: {}", e)))?;

        tracing::info!("Wrote report to {}", path.as_ref().display());
        Ok(())
    }

    /// Export the report structure as pretty JSON
    pub fn to_json(report: &Report) -> Result<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }

    /// Render the categorized markdown report
    ///
    /// Section labels are relied on by older reports, keep them stable.
    pub fn to_markdown(report: &Report, settings: &ReportConfig) -> String {
        let max_len = settings.description_max_len;
        let version = &report.target.game_version;
        let mut output = String::new();

        output.push_str(&format!("# {}\n\n", settings.title));

        if let Some(meta) = report.metadata.as_ref().filter(|m| !m.is_empty()) {
            if let Some(user) = &meta.username {
                output.push_str(&format!("**User**: {}  \n", user));
            }
            if let Some(modpack) = &settings.modpack {
                output.push_str(&format!("**Modpack**: {}  \n", modpack));
            }
            output.push_str(&format!(
                "**Target Version**: Minecraft {} {} {}  \n",
                meta.modpack_version.as_deref().unwrap_or(version),
                report.target.loader,
                meta.forge_version
                    .as_deref()
                    .unwrap_or(&report.target.loader_version),
            ));
            if let Some(updated) = &meta.last_updated {
                output.push_str(&format!("**Last Updated**: {}  \n", updated));
            }
            output.push('\n');
        }

        if let Some(tagline) = &settings.tagline {
            output.push_str(&format!("*{}*\n\n", tagline));
        }
        output.push_str("---\n\n");

        // Compatible entries, grouped by category
        output.push_str(&format!(
            "## Compatible Mods ({} {})\n\n",
            version, report.target.loader
        ));
        output.push_str(&format!(
            "*{} mods compatible with the target version*\n\n",
            report.summary.compatible
        ));

        for group in &report.compatible {
            output.push_str(&format!("### {}\n\n", group.label));
            for item in &group.items {
                output.push_str(&format!(
                    "- {}{}\n",
                    Self::item_link(item),
                    Self::description_suffix(item, max_len)
                ));
            }
            output.push('\n');
        }

        if !report.asset_reference.is_empty() {
            output.push_str("---\n\n");
            output.push_str("## Resource Packs (For Asset Reference)\n\n");
            output.push_str(&format!("{}\n\n", ASSET_DISCLAIMER));
            for item in &report.asset_reference {
                output.push_str(&format!(
                    "- {} ({}){}\n",
                    Self::item_link(item),
                    Self::version_list(item),
                    Self::description_suffix(item, max_len)
                ));
            }
            output.push('\n');
        }

        if !report.incompatible.is_empty() {
            output.push_str("---\n\n");
            output.push_str(&format!("## Non-{} Mods (For Asset Reference)\n\n", version));
            output.push_str(&format!("{}\n\n", ASSET_DISCLAIMER));
            for item in &report.incompatible {
                output.push_str(&format!(
                    "- {} (Available: {}){}\n",
                    Self::item_link(item),
                    Self::version_list(item),
                    Self::description_suffix(item, max_len)
                ));
            }
            output.push('\n');
        }

        if !report.unknown_version.is_empty() {
            output.push_str("---\n\n");
            output.push_str("## Mods with Unknown Version Compatibility\n\n");
            output.push_str("*Version information needed for these mods.*\n\n");
            for item in &report.unknown_version {
                output.push_str(&format!(
                    "- {}{}\n",
                    Self::item_link(item),
                    Self::description_suffix(item, max_len)
                ));
            }
            output.push('\n');
        }

        let summary = &report.summary;
        output.push_str("---\n\n");
        output.push_str("## Summary\n\n");
        output.push_str(&format!("- **Compatible Mods**: {}\n", summary.compatible));
        output.push_str(&format!("- **Resource Packs**: {}\n", summary.asset_reference));
        output.push_str(&format!(
            "- **Non-{} Mods**: {}\n",
            version, summary.incompatible
        ));
        output.push_str(&format!("- **Unknown Version**: {}\n", summary.unknown_version));
        if summary.skipped > 0 {
            output.push_str(&format!("- **Skipped Records**: {}\n", summary.skipped));
        }
        output.push_str(&format!("- **Total**: {}\n", summary.total));

        output
    }

    /// Cut a description down to `max_len` characters, marking the cut with "..."
    pub fn truncate_description(description: &str, max_len: usize) -> String {
        match description.char_indices().nth(max_len) {
            Some((cut, _)) => format!("{}...", &description[..cut]),
            None => description.to_string(),
        }
    }

    fn item_link(item: &Item) -> String {
        format!("**[{}]({})**", item.name(), item.link())
    }

    fn description_suffix(item: &Item, max_len: usize) -> String {
        if item.description().is_empty() {
            String::new()
        } else {
            format!(
                " - {}",
                Self::truncate_description(item.description(), max_len)
            )
        }
    }

    fn version_list(item: &Item) -> String {
        if item.has_declared_versions() {
            item.compatible_versions().join(", ")
        } else {
            "version not specified".to_string()
        }
    }
}
