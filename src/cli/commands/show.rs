//! Show command implementation.
//!
//! Renders one conversation along its selected branch path.

use std::io::{self, Write};

use serde::Serialize;

use crate::branch::SelectedPath;
use crate::cli::{Cli, OutputFormat, ShowArgs};
use crate::config::Config;
use crate::error::Result;
use crate::model::{Conversation, Message};
use crate::render::ansi::lines_to_ansi;
use crate::render::{Document, DocumentRenderer};
use crate::search::SearchStats;
use crate::util::truncate;

use super::load_state;

const TEXT_WIDTH: usize = 80;

#[derive(Debug, Serialize)]
struct BranchInfo {
    branch_point: String,
    selected: usize,
    alternatives: usize,
}

#[derive(Debug, Serialize)]
struct ShowOutput<'a> {
    id: &'a str,
    title: &'a str,
    path: Vec<&'a str>,
    branches: Vec<BranchInfo>,
    stats: SearchStats,
    text: String,
}

/// Messages along the selected path, in order.
fn path_messages<'a>(
    conversation: &'a Conversation,
    path: &'a SelectedPath,
) -> impl Iterator<Item = (&'a str, &'a Message)> + 'a {
    path.node_ids().into_iter().filter_map(move |node_id| {
        let message = conversation.mapping.get(node_id)?.message.as_ref()?;
        Some((node_id, message))
    })
}

/// All text fragments of a message on one line.
fn flatten(message: &Message) -> String {
    message
        .fragments
        .iter()
        .filter_map(|fragment| fragment.content.as_deref())
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run the show command.
pub fn run(cli: &Cli, config: &Config, args: &ShowArgs) -> Result<()> {
    let mut state = load_state(config, &args.file)?;
    let query = args.search.as_deref().unwrap_or_default();
    state.set_query(query);

    let view = state.open_id(&args.id)?;
    view.apply_choices(&args.branches);

    let mut renderer = DocumentRenderer::new(config.theme(), config.render_options());
    renderer.set_query(query);
    let view = state.view().ok_or_else(|| crate::error::ReaderError::ConversationNotFound {
        id: args.id.clone(),
    })?;
    let document: Document = renderer.render(view.conversation(), view.path(), None);
    let stats = state.stats(document.highlights);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.effective_output() {
        OutputFormat::Json => {
            let conversation = view.conversation();
            let output = ShowOutput {
                id: &conversation.id,
                title: conversation.display_title(),
                path: view.path().node_ids(),
                branches: view
                    .branch_points()
                    .into_iter()
                    .map(|bp| BranchInfo {
                        branch_point: bp.identity.to_string(),
                        selected: bp.selected + 1,
                        alternatives: bp.child_count,
                    })
                    .collect(),
                stats,
                text: lines_to_ansi(&document.lines, false),
            };
            writeln!(out, "{}", serde_json::to_string_pretty(&output)?)?;
        }
        OutputFormat::Tsv => {
            writeln!(out, "node_id\ttype\tmodel\tinserted_at\ttext")?;
            for (node_id, message) in path_messages(view.conversation(), view.path()) {
                writeln!(
                    out,
                    "{node_id}\t{}\t{}\t{}\t{}",
                    message.type_summary(),
                    message.model(),
                    message.inserted_at.map(|dt| dt.to_rfc3339()).unwrap_or_default(),
                    flatten(message)
                )?;
            }
        }
        OutputFormat::Compact => {
            for (node_id, message) in path_messages(view.conversation(), view.path()) {
                writeln!(
                    out,
                    "{node_id} {}: {}",
                    message.type_summary(),
                    truncate(&flatten(message), TEXT_WIDTH)
                )?;
            }
        }
        OutputFormat::Text => {
            out.write_all(lines_to_ansi(&document.lines, cli.use_color(config)).as_bytes())?;
            if !query.is_empty() {
                writeln!(out)?;
                writeln!(out, "Search \"{query}\": {stats}")?;
            }
        }
    }

    Ok(())
}
