//! Output formatting for CLI commands.
//!
//! Reports render either as colored text tables or as pretty JSON for
//! scripting.

use colored::Colorize;
use serde::Serialize;
use serde_json::Value;
use std::fmt::Write;
use tabled::{Table, Tabled};

use crate::analyzer::{
    OutputChange, PlanReport, PropertyAction, PropertyChange, ProviderGroup, ReplacementType,
    ResourceChange, RiskLevel,
};
use crate::config::{AnalysisConfig, ValidationResult};
use crate::plan::ChangeType;

use super::commands::OutputFormat;

/// Maximum width of a value cell before it is shortened.
const VALUE_WIDTH: usize = 40;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Display switches for plan summaries.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryOptions {
    /// Show property-level changes for each resource.
    pub details: bool,
    /// Include resources with no changes.
    pub show_unchanged: bool,
}

/// Resource row for table display.
#[derive(Tabled)]
struct ResourceRow {
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Resource")]
    address: String,
    #[tabled(rename = "Type")]
    resource_type: String,
    #[tabled(rename = "Replacement")]
    replacement: String,
    #[tabled(rename = "Risk")]
    risk: String,
    #[tabled(rename = "Notes")]
    notes: String,
}

/// Output row for table display.
#[derive(Tabled)]
struct OutputRow {
    #[tabled(rename = "")]
    indicator: String,
    #[tabled(rename = "Output")]
    name: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Before")]
    before: String,
    #[tabled(rename = "After")]
    after: String,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats an analyzed plan for display.
    ///
    /// `groups` is empty when resources are listed as one table.
    #[must_use]
    pub fn format_report(
        &self,
        report: &PlanReport,
        groups: &[ProviderGroup<'_>],
        options: SummaryOptions,
    ) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(&ReportJson::new(report, groups)).unwrap_or_default()
            }
            OutputFormat::Text => Self::format_report_text(report, groups, options),
        }
    }

    /// Formats a report as text.
    fn format_report_text(
        report: &PlanReport,
        groups: &[ProviderGroup<'_>],
        options: SummaryOptions,
    ) -> String {
        let mut output = String::new();

        let _ = writeln!(
            output,
            "\nPlan summary (format {}, terraform {})\n",
            report.format_version, report.terraform_version
        );

        if !report.has_changes() {
            let _ = writeln!(
                output,
                "{} No changes. Infrastructure matches the configuration.",
                "✓".green()
            );
            if !options.show_unchanged {
                return output;
            }
        }

        let dangerous = report.dangerous_resources();
        if !dangerous.is_empty() {
            let _ = writeln!(output, "{}", "Dangerous changes:".red().bold());
            for resource in &dangerous {
                let _ = writeln!(
                    output,
                    "  {} {}: {}",
                    "!".red(),
                    resource.address,
                    resource.danger_reason.as_deref().unwrap_or_default()
                );
            }
            output.push('\n');
        }

        if groups.is_empty() {
            Self::write_resources(&mut output, &report.ranked_resources(), options);
        } else {
            for group in groups {
                let _ = writeln!(
                    output,
                    "{} ({} resources)",
                    group.provider.bold(),
                    group.resources.len()
                );
                Self::write_resources(&mut output, &group.resources, options);
            }
        }

        let outputs: Vec<&OutputChange> = report
            .outputs
            .iter()
            .filter(|o| options.show_unchanged || o.change_type != ChangeType::NoOp)
            .collect();
        if !outputs.is_empty() {
            let _ = writeln!(output, "Changes to outputs:");
            output.push_str(&Self::outputs_table(&outputs));
            output.push_str("\n\n");
        }

        let stats = &report.statistics;
        let _ = writeln!(
            output,
            "Plan: {} to add, {} to change, {} to destroy, {} to replace ({} high risk)",
            stats.to_add.to_string().green(),
            stats.to_change.to_string().yellow(),
            stats.to_destroy.to_string().red(),
            stats.replacements.to_string().magenta(),
            stats.high_risk.to_string().red().bold()
        );

        output
    }

    /// Writes one resource table, followed by property details when enabled.
    fn write_resources(output: &mut String, resources: &[&ResourceChange], options: SummaryOptions) {
        let shown: Vec<&ResourceChange> = resources
            .iter()
            .copied()
            .filter(|r| options.show_unchanged || r.has_changes())
            .collect();
        if shown.is_empty() {
            return;
        }

        let rows: Vec<ResourceRow> = shown
            .iter()
            .map(|r| ResourceRow {
                action: Self::format_change_type(r.change_type),
                address: r.address.clone(),
                resource_type: r.resource_type.clone(),
                replacement: Self::format_replacement(r.replacement_type),
                risk: Self::format_risk(r.risk_level),
                notes: Self::truncate(&Self::notes(r), VALUE_WIDTH),
            })
            .collect();
        output.push_str(&Table::new(rows).to_string());
        output.push_str("\n\n");

        if options.details {
            for resource in shown.iter().filter(|r| !r.property_changes.is_empty()) {
                Self::write_properties(output, resource);
            }
        }
    }

    /// Writes the property-level changes of one resource.
    fn write_properties(output: &mut String, resource: &ResourceChange) {
        let _ = writeln!(
            output,
            "{} {}",
            resource.change_type.indicator(),
            resource.address.bold()
        );
        for change in &resource.property_changes.changes {
            let _ = writeln!(output, "    {}", Self::format_property(change));
        }
        if resource.property_changes.truncated {
            let _ = writeln!(
                output,
                "    {}",
                "(some changes omitted: analysis limits reached)".dimmed()
            );
        }
        output.push('\n');
    }

    /// Formats a single property change line.
    fn format_property(change: &PropertyChange) -> String {
        let path = change.path_string();
        let mut line = match change.action {
            PropertyAction::Add => format!(
                "{} {path} = {}",
                "+".green(),
                Self::format_value(&change.after)
            ),
            PropertyAction::Remove => format!(
                "{} {path} = {}",
                "-".red(),
                Self::format_value(&change.before)
            ),
            PropertyAction::Update => format!(
                "{} {path}: {} -> {}",
                "~".yellow(),
                Self::format_value(&change.before),
                Self::format_value(&change.after)
            ),
        };
        if change.triggers_replacement {
            let _ = write!(line, " {}", "# forces replacement".red());
        }
        line
    }

    /// Builds the notes column: danger reason first, then unknown values.
    fn notes(resource: &ResourceChange) -> String {
        let mut notes = Vec::new();
        if let Some(reason) = &resource.danger_reason {
            notes.push(reason.clone());
        }
        if resource.has_unknown_values {
            notes.push(format!(
                "{} unknown until apply",
                resource.unknown_properties.len()
            ));
        }
        notes.join("; ")
    }

    /// Renders the outputs table.
    fn outputs_table(outputs: &[&OutputChange]) -> String {
        let rows: Vec<OutputRow> = outputs
            .iter()
            .map(|o| OutputRow {
                indicator: o.indicator.clone(),
                name: o.name.clone(),
                action: o.action.clone(),
                before: Self::truncate(&Self::format_value(&o.before), VALUE_WIDTH),
                after: Self::truncate(&Self::format_value(&o.after), VALUE_WIDTH),
            })
            .collect();
        Table::new(rows).to_string()
    }

    /// Formats the effective configuration.
    #[must_use]
    pub fn format_config(&self, config: &AnalysisConfig) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(config).unwrap_or_default(),
            OutputFormat::Text => serde_yaml::to_string(config).unwrap_or_default(),
        }
    }

    /// Formats a validation result.
    #[must_use]
    pub fn format_validation(&self, result: &ValidationResult, show_warnings: bool) -> String {
        match self.format {
            OutputFormat::Json => {
                let json = ValidationJson {
                    valid: result.is_valid(),
                    errors: result
                        .errors
                        .iter()
                        .map(|e| FieldMessageJson {
                            field: &e.field,
                            message: &e.message,
                        })
                        .collect(),
                    warnings: if show_warnings {
                        result.warnings.iter().map(String::as_str).collect()
                    } else {
                        Vec::new()
                    },
                };
                serde_json::to_string_pretty(&json).unwrap_or_default()
            }
            OutputFormat::Text => {
                let mut output = String::new();
                for error in &result.errors {
                    let _ = writeln!(output, "{} {}: {}", "✗".red(), error.field, error.message);
                }
                if show_warnings {
                    for warning in &result.warnings {
                        let _ = writeln!(output, "{} {warning}", "⚠".yellow());
                    }
                }
                if result.is_valid() {
                    let _ = writeln!(output, "{} Configuration is valid", "✓".green());
                }
                output
            }
        }
    }

    /// Formats a change type with color.
    fn format_change_type(change_type: ChangeType) -> String {
        let label = format!("{} {change_type}", change_type.indicator());
        match change_type {
            ChangeType::Create => label.green().to_string(),
            ChangeType::Update => label.yellow().to_string(),
            ChangeType::Delete => label.red().to_string(),
            ChangeType::Replace => label.magenta().to_string(),
            ChangeType::NoOp => label.dimmed().to_string(),
        }
    }

    /// Formats a replacement type with color.
    fn format_replacement(replacement: ReplacementType) -> String {
        match replacement {
            ReplacementType::Never => String::from("-"),
            ReplacementType::Conditional => "conditional".yellow().to_string(),
            ReplacementType::Always => "always".red().to_string(),
        }
    }

    /// Formats a risk level with color.
    fn format_risk(risk: RiskLevel) -> String {
        match risk {
            RiskLevel::Low => "low".green().to_string(),
            RiskLevel::Medium => "medium".yellow().to_string(),
            RiskLevel::High => "high".red().to_string(),
            RiskLevel::Critical => "critical".red().bold().to_string(),
        }
    }

    /// Formats a value compactly: strings bare, everything else as JSON.
    fn format_value(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Truncates a string to a maximum number of characters.
    fn truncate(s: &str, max_len: usize) -> String {
        if s.chars().count() <= max_len {
            s.to_string()
        } else {
            let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
            format!("{kept}...")
        }
    }
}

// JSON serialization helpers

#[derive(Serialize)]
struct ReportJson<'a> {
    #[serde(flatten)]
    report: &'a PlanReport,
    provider_groups: Vec<GroupJson<'a>>,
}

#[derive(Serialize)]
struct GroupJson<'a> {
    provider: &'a str,
    resources: Vec<&'a str>,
}

impl<'a> ReportJson<'a> {
    fn new(report: &'a PlanReport, groups: &'a [ProviderGroup<'a>]) -> Self {
        Self {
            report,
            provider_groups: groups
                .iter()
                .map(|g| GroupJson {
                    provider: &g.provider,
                    resources: g.resources.iter().map(|r| r.address.as_str()).collect(),
                })
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct ValidationJson<'a> {
    valid: bool,
    errors: Vec<FieldMessageJson<'a>>,
    warnings: Vec<&'a str>,
}

#[derive(Serialize)]
struct FieldMessageJson<'a> {
    field: &'a str,
    message: &'a str,
}
