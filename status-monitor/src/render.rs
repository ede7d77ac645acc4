//! Plain-text and JSON views of the registry.

use crate::config::{DisplayConfig, DisplayFormat};
use crate::utils::errors::Result;
use status_core::timestamp::NEVER;
use status_core::{ClientRecord, Registry, Selection};
use std::fmt::Write;

/// How snapshots are printed.
#[derive(Debug, Clone, Copy)]
pub struct View {
    pub format: DisplayFormat,
    pub max_backups: usize,
}

impl View {
    pub fn new(format: DisplayFormat, max_backups: usize) -> Self {
        Self { format, max_backups }
    }

    pub fn render(&self, registry: &Registry, selection: &Selection) -> Result<String> {
        match self.format {
            DisplayFormat::Text => Ok(render_text(registry, selection, self.max_backups)),
            DisplayFormat::Json => render_json(registry),
        }
    }
}

impl From<&DisplayConfig> for View {
    fn from(config: &DisplayConfig) -> Self {
        Self::new(config.format, config.max_backups)
    }
}

/// One block per client: a summary line, then its newest backups.
///
/// The selected backup, if shown, is marked with `>`.
pub fn render_text(registry: &Registry, selection: &Selection, max_backups: usize) -> String {
    if registry.is_empty() {
        return "no clients\n".to_string();
    }

    let width = registry.clients().map(|c| c.name().chars().count()).max().unwrap_or(0);
    let mut out = String::new();
    for client in registry.clients() {
        write_client(&mut out, client, selection, max_backups, width);
    }
    out
}

fn write_client(out: &mut String, client: &ClientRecord, selection: &Selection, max_backups: usize, width: usize) {
    let backups = client.backups();
    let _ = writeln!(
        out,
        "{:<width$}  {:<14}  {} backup{}",
        client.name(),
        client.status,
        backups.len(),
        if backups.len() == 1 { "" } else { "s" },
        width = width,
    );

    for entry in backups.iter().take(max_backups) {
        let marker = if selection.is_selected(entry.id()) { '>' } else { ' ' };
        let when = entry.timestamp.as_deref().unwrap_or(NEVER);
        let _ = write!(out, "  {} {:>7}  {:<19}", marker, entry.number, when);
        if !entry.flags.is_empty() {
            let _ = write!(out, "  {}", entry.flags);
        }
        out.push('\n');
    }

    if backups.len() > max_backups {
        let _ = writeln!(out, "    ... {} older", backups.len() - max_backups);
    }
}

/// The whole registry as a JSON array of clients.
pub fn render_json(registry: &Registry) -> Result<String> {
    Ok(serde_json::to_string_pretty(registry)?)
}
