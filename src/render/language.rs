//! Code language detection and download extensions.

use once_cell::sync::Lazy;
use regex::Regex;

/// Language reported when nothing matches.
pub const PLAIN_TEXT: &str = "txt";

/// Guess the language of a code snippet.
///
/// The checks run in a fixed order and the first match wins, even when a
/// later check would also match.
#[must_use]
pub fn detect_language(code: &str) -> &'static str {
    let has = |needle: &str| code.contains(needle);

    if has("function") && has("{") && has("}") {
        "javascript"
    } else if has("def ") && has(":") {
        "python"
    } else if has("<?php") || has("$") {
        "php"
    } else if has("import ") && (has("java.") || has("class ")) {
        "java"
    } else if has("#include") || has("using namespace") {
        "cpp"
    } else if has("<html") || has("<div") || has("<span") {
        "html"
    } else if has("SELECT") || has("FROM") || has("WHERE") {
        "sql"
    } else if has("package ") || has("import ") || has("func ") {
        "go"
    } else if has("fn ") || has("let ") || has("mut ") {
        "rust"
    } else {
        PLAIN_TEXT
    }
}

static INFO_WORD: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^\w+").ok());

/// Language named by a fenced code block's info string.
///
/// Only the leading word counts (`rust,ignore` is `rust`). An empty info
/// string or `txt` yields `None` so the caller falls back to detection.
#[must_use]
pub fn declared_language(info: &str) -> Option<String> {
    let word = INFO_WORD.as_ref()?.find(info.trim())?.as_str().to_lowercase();
    (word != PLAIN_TEXT).then_some(word)
}

/// Declared language, or the detected one when none is declared.
#[must_use]
pub fn resolve_language(info: &str, code: &str) -> String {
    declared_language(info).unwrap_or_else(|| detect_language(code).to_string())
}

/// File extension used when saving a code block.
///
/// Languages without an override use their own name.
#[must_use]
pub fn file_extension(language: &str) -> &str {
    match language {
        "javascript" => "js",
        "python" => "py",
        "csharp" => "cs",
        "ruby" => "rb",
        "rust" => "rs",
        "kotlin" => "kt",
        "typescript" => "ts",
        "htm" => "html",
        "bash" | "shell" => "sh",
        "markdown" => "md",
        "text" => "txt",
        "batch" => "bat",
        "powershell" => "ps1",
        "objective" => "m",
        "perl" => "pl",
        "haskell" => "hs",
        "erlang" => "erl",
        "elixir" => "ex",
        "yml" => "yaml",
        "makefile" => "mk",
        other => other,
    }
}
