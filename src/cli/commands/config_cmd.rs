//! config command - Show the effective configuration

use anyhow::Result;

use crate::cli::Context;
use crate::core::config::FilterSpec;
use crate::ui::output;

fn describe(spec: &FilterSpec) -> String {
    match spec {
        FilterSpec::Compact(text) => text.clone(),
        FilterSpec::Structured(selector) => {
            serde_json::to_string(selector).unwrap_or_else(|_| format!("{:?}", selector))
        }
    }
}

/// List loaded config files, named filters and output settings.
pub fn list(ctx: &Context) -> Result<()> {
    let config = &ctx.config;
    let mut lines = vec!["# Sources".to_string()];
    let show_path = |path: Option<&std::path::Path>| {
        path.map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none)".to_string())
    };
    lines.push(format!("global = {}", show_path(config.global_config_loaded_from())));
    lines.push(format!("project = {}", show_path(config.project_config_loaded_from())));

    lines.push(String::new());
    lines.push("# Filters".to_string());
    let filters = config.filters();
    if filters.is_empty() {
        lines.push("(none)".to_string());
    }
    for (name, spec, scope) in filters {
        lines.push(format!("@{} = {}\t({})", name, describe(spec), scope.as_str()));
    }

    lines.push(String::new());
    lines.push("# Output".to_string());
    lines.push(format!("output.pretty = {}", config.pretty()));
    lines.push(format!("output.nested = {}", config.nested()));

    output::data(lines.join("\n"));
    Ok(())
}
