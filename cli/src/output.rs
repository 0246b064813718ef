// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Rendering of navigator responses

use anyhow::Result;
use colored::Colorize;

use tapestry_engine::domain::NavigatorResponse;

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed JSON, one document per response
    Json,
    /// Human-readable table
    Table,
}

pub fn print_response(response: &NavigatorResponse, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(response)?),
        OutputFormat::Table => print!("{}", render_table(response)),
    }
    Ok(())
}

/// Table rendering of a response, one row per result
pub fn render_table(response: &NavigatorResponse) -> String {
    if response.is_empty() {
        return format!("{}\n", "No results".dimmed());
    }

    let mut out = String::new();
    match response {
        NavigatorResponse::FacetTypes(types) => {
            out.push_str(&format!("{:<12} {}\n", "TYPE".bold(), "DESCRIPTION".bold()));
            for (name, description) in types {
                out.push_str(&format!("{:<12} {}\n", name.cyan(), description));
            }
        }
        NavigatorResponse::TopFacets(rows) => {
            out.push_str(&format!("{:<38} {:>7}  {}\n", "FACET".bold(), "THREADS".bold(), "LABEL".bold()));
            for row in rows {
                out.push_str(&format!(
                    "{:<38} {:>7}  {}\n",
                    row.facet.id.as_str().dimmed(),
                    row.count,
                    row.facet.label.cyan()
                ));
            }
        }
        NavigatorResponse::SearchFacets(rows) => {
            out.push_str(&format!("{:<38} {:>7}  {}\n", "FACET".bold(), "SCORE".bold(), "LABEL".bold()));
            for row in rows {
                let score = format!("{:.4}", row.score);
                let score = if row.score >= 0.8 { score.green() } else { score.normal() };
                out.push_str(&format!(
                    "{:<38} {:>7}  {}\n",
                    row.facet.id.as_str().dimmed(),
                    score,
                    row.facet.label.cyan()
                ));
            }
        }
        NavigatorResponse::FacetThreads(threads) => {
            out.push_str(&format!("{:<38} {}\n", "THREAD".bold(), "OCCURRED".bold()));
            for thread in threads {
                out.push_str(&format!("{:<38} {}\n", thread.id.as_str().cyan(), thread.occurred_at.to_rfc3339()));
            }
        }
        NavigatorResponse::FacetMemories(memories) => {
            out.push_str(&format!("{:<38} {:<26} {}\n", "MEMORY".bold(), "CREATED".bold(), "CONTENT".bold()));
            for memory in memories {
                out.push_str(&format!(
                    "{:<38} {:<26} {}\n",
                    memory.id.as_str().cyan(),
                    memory.created_at.to_rfc3339(),
                    preview(&memory.content)
                ));
            }
        }
        NavigatorResponse::RelatedFacets(rows) => {
            out.push_str(&format!("{:<38} {:>7}  {}\n", "FACET".bold(), "SHARED".bold(), "LABEL".bold()));
            for row in rows {
                out.push_str(&format!(
                    "{:<38} {:>7}  {}\n",
                    row.facet.id.as_str().dimmed(),
                    row.shared_thread_count,
                    row.facet.label.cyan()
                ));
            }
        }
        NavigatorResponse::RelatedMemories(rows) => {
            out.push_str(&format!("{:<38} {:>7}  {}\n", "MEMORY".bold(), "SHARED".bold(), "CONTENT".bold()));
            for row in rows {
                out.push_str(&format!(
                    "{:<38} {:>7}  {}\n",
                    row.memory.id.as_str().cyan(),
                    row.shared_facet_count,
                    preview(&row.memory.content)
                ));
            }
        }
    }
    out
}

fn preview(content: &str) -> String {
    const MAX_CHARS: usize = 60;
    let line = content.lines().next().unwrap_or_default();
    if line.chars().count() > MAX_CHARS || content.lines().nth(1).is_some() {
        let cut: String = line.chars().take(MAX_CHARS).collect();
        format!("{}…", cut)
    } else {
        line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_empty_response_renders_placeholder() {
        colored::control::set_override(false);
        let rendered = render_table(&NavigatorResponse::FacetThreads(Vec::new()));
        assert_eq!(rendered, "No results\n");
    }

    #[test]
    fn test_facet_types_table() {
        colored::control::set_override(false);
        let mut types = BTreeMap::new();
        types.insert("people".to_string(), "Individuals".to_string());
        let rendered = render_table(&NavigatorResponse::FacetTypes(types));
        assert!(rendered.starts_with("TYPE"));
        assert!(rendered.contains("people"));
        assert!(rendered.contains("Individuals"));
    }

    #[test]
    fn test_preview_truncates_long_content() {
        let long = "x".repeat(100);
        let short = preview(&long);
        assert_eq!(short.chars().count(), 61);
        assert_eq!(preview("one\ntwo"), "one…");
        assert_eq!(preview("short"), "short");
    }
}
