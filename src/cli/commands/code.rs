//! Code command implementation.
//!
//! Lists the code blocks on a conversation's selected path and optionally
//! saves them to files named by the language's extension.

use std::io::{self, Write};
use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use crate::cli::{Cli, CodeArgs, OutputFormat};
use crate::config::Config;
use crate::error::{ReaderError, Result};
use crate::render::{file_extension, CodeBlock, DocumentRenderer};
use crate::util::atomic_write;

use super::load_state;

#[derive(Debug, Serialize)]
struct CodeOutput<'a> {
    index: usize,
    language: &'a str,
    extension: &'a str,
    lines: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    saved_to: Option<PathBuf>,
    code: &'a str,
}

/// File name a code block is saved under.
#[must_use]
pub fn file_name(index: usize, block: &CodeBlock) -> String {
    format!("code-{index}.{}", file_extension(&block.language))
}

/// Run the code command.
pub fn run(cli: &Cli, config: &Config, args: &CodeArgs) -> Result<()> {
    let mut state = load_state(config, &args.file)?;
    state.open_id(&args.id)?.apply_choices(&args.branches);
    let view = state.view().ok_or_else(|| ReaderError::ConversationNotFound {
        id: args.id.clone(),
    })?;

    let mut renderer = DocumentRenderer::new(config.theme(), config.render_options());
    let document = renderer.render(view.conversation(), view.path(), None);

    let blocks: Vec<(usize, &CodeBlock)> = document
        .code_blocks
        .iter()
        .enumerate()
        .map(|(i, (_, block))| (i + 1, block))
        .filter(|(_, block)| {
            args.lang
                .as_deref()
                .map_or(true, |lang| block.language.eq_ignore_ascii_case(lang))
        })
        .collect();

    let mut saved = Vec::with_capacity(blocks.len());
    for (index, block) in &blocks {
        let path = match &args.save {
            Some(dir) => {
                let path = dir.join(file_name(*index, block));
                let mut content = block.code.clone();
                content.push('\n');
                atomic_write(&path, content.as_bytes()).map_err(|e| ReaderError::ExportError {
                    message: format!("Failed to save {}: {e}", path.display()),
                    source: Some(Box::new(e)),
                })?;
                info!(path = %path.display(), language = %block.language, "Saved code block");
                Some(path)
            }
            None => None,
        };
        saved.push(path);
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.effective_output() {
        OutputFormat::Json => {
            let output: Vec<_> = blocks
                .iter()
                .zip(&saved)
                .map(|((index, block), saved_to)| CodeOutput {
                    index: *index,
                    language: &block.language,
                    extension: file_extension(&block.language),
                    lines: block.code.lines().count(),
                    saved_to: saved_to.clone(),
                    code: &block.code,
                })
                .collect();
            writeln!(out, "{}", serde_json::to_string_pretty(&output)?)?;
        }
        OutputFormat::Tsv => {
            writeln!(out, "index\tlanguage\tlines\tsaved_to")?;
            for ((index, block), saved_to) in blocks.iter().zip(&saved) {
                writeln!(
                    out,
                    "{index}\t{}\t{}\t{}",
                    block.language,
                    block.code.lines().count(),
                    saved_to.as_ref().map(|p| p.display().to_string()).unwrap_or_default()
                )?;
            }
        }
        OutputFormat::Compact => {
            for ((index, block), saved_to) in blocks.iter().zip(&saved) {
                match saved_to {
                    Some(path) => writeln!(out, "{index} {} {}", block.language, path.display())?,
                    None => writeln!(out, "{index} {}", block.language)?,
                }
            }
        }
        OutputFormat::Text => {
            if blocks.is_empty() {
                writeln!(out, "No code blocks found.")?;
                return Ok(());
            }
            for ((index, block), saved_to) in blocks.iter().zip(&saved) {
                match saved_to {
                    Some(path) => writeln!(out, "Saved #{index} ({}) to {}", block.language, path.display())?,
                    None => {
                        writeln!(
                            out,
                            "#{index} {} ({} lines)",
                            block.language.to_uppercase(),
                            block.code.lines().count()
                        )?;
                        writeln!(out, "{}", block.code)?;
                        writeln!(out)?;
                    }
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_uses_extension_map() {
        let block = CodeBlock {
            language: "python".to_string(),
            code: String::new(),
        };
        assert_eq!(file_name(3, &block), "code-3.py");

        let block = CodeBlock {
            language: "go".to_string(),
            code: String::new(),
        };
        assert_eq!(file_name(1, &block), "code-1.go");
    }
}
