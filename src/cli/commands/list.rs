//! List command implementation.
//!
//! Lists conversations with search, date range and sort options.

use std::io::{self, Write};

use serde::Serialize;

use crate::cli::{Cli, ListArgs, OutputFormat};
use crate::config::Config;
use crate::error::Result;
use crate::model::Conversation;
use crate::parser::ParseStats;
use crate::util::truncate;

use super::load_state;

const TITLE_WIDTH: usize = 60;

/// One row of JSON output.
#[derive(Debug, Serialize)]
struct ConversationInfo<'a> {
    id: &'a str,
    title: &'a str,
    inserted_at: String,
    updated_at: String,
    messages: usize,
    branch_points: usize,
}

impl<'a> From<&'a Conversation> for ConversationInfo<'a> {
    fn from(conversation: &'a Conversation) -> Self {
        let stats = ParseStats::of(std::slice::from_ref(conversation));
        Self {
            id: &conversation.id,
            title: conversation.display_title(),
            inserted_at: conversation.inserted_at.to_rfc3339(),
            updated_at: conversation.updated_at.to_rfc3339(),
            messages: stats.messages,
            branch_points: stats.branch_points,
        }
    }
}

/// Run the list command.
pub fn run(cli: &Cli, config: &Config, args: &ListArgs) -> Result<()> {
    let mut state = load_state(config, &args.file)?;
    if let Some(sort) = args.sort {
        state.set_sort(sort);
    }
    state.set_date_from(args.from);
    state.set_date_to(args.to);
    state.set_query(args.search.as_deref().unwrap_or_default());

    let limit = args.limit.unwrap_or(usize::MAX);
    let rows: Vec<&Conversation> = state.visible().take(limit).map(|c| c.as_ref()).collect();
    let stats = state.stats(0);
    let options = config.render_options();

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.effective_output() {
        OutputFormat::Json => {
            let output: Vec<_> = rows.iter().map(|c| ConversationInfo::from(*c)).collect();
            writeln!(out, "{}", serde_json::to_string_pretty(&output)?)?;
        }
        OutputFormat::Tsv => {
            writeln!(out, "id\ttitle\tinserted_at\tupdated_at")?;
            for conversation in &rows {
                writeln!(
                    out,
                    "{}\t{}\t{}\t{}",
                    conversation.id,
                    conversation.display_title().replace('\t', " "),
                    conversation.inserted_at.to_rfc3339(),
                    conversation.updated_at.to_rfc3339()
                )?;
            }
        }
        OutputFormat::Compact => {
            for conversation in &rows {
                writeln!(out, "{} {}", conversation.id, conversation.display_title())?;
            }
        }
        OutputFormat::Text => {
            if rows.is_empty() {
                writeln!(out, "No conversations found.")?;
                return Ok(());
            }

            writeln!(
                out,
                "Conversations ({} of {}, sorted by {}):",
                rows.len(),
                state.conversations().len(),
                state.sort()
            )?;
            if !state.query().is_empty() {
                writeln!(out, "Search \"{}\": {} title matches", state.query(), stats.title_matches)?;
            }
            writeln!(out)?;

            for conversation in &rows {
                writeln!(
                    out,
                    "  {}  {}  {}",
                    conversation.id,
                    options.zone.format(&conversation.inserted_at, &options.datetime_format),
                    truncate(conversation.display_title(), TITLE_WIDTH)
                )?;
            }
        }
    }

    Ok(())
}
