//! Shell-word tokenizer for configured command lines (panic-free).
//!
//! Supported syntax is the POSIX quoting subset:
//! - Unquoted whitespace separates words.
//! - `'...'` is literal up to the closing quote.
//! - `"..."` is literal except `\` before `"`, `\`, `$`, `` ` `` or newline.
//! - Unquoted `\x` yields `x`; backslash-newline is a line continuation.
//! - Adjacent segments join into one word; `""` yields an empty word.
//!
//! No expansion, globbing, pipes or redirection. Commands that need a shell
//! say so explicitly (`sh -c "..."`).

use std::fmt;

use crate::error::{ExporterError, Result};

/// A tokenized command: program plus argument vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for a in &self.args {
            write!(f, " {a:?}")?;
        }
        Ok(())
    }
}

/// Split a command line into words.
pub fn split(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut cur = String::new();
    // A word exists once any segment (even an empty quoted one) was seen.
    let mut in_word = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(ch) => cur.push(ch),
                        None => {
                            return Err(ExporterError::CommandLine(
                                "unterminated single quote".into(),
                            ))
                        }
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some('\n') => {}
                            Some(ch @ ('"' | '\\' | '$' | '`')) => cur.push(ch),
                            Some(ch) => {
                                cur.push('\\');
                                cur.push(ch);
                            }
                            None => {
                                return Err(ExporterError::CommandLine(
                                    "unterminated double quote".into(),
                                ))
                            }
                        },
                        Some(ch) => cur.push(ch),
                        None => {
                            return Err(ExporterError::CommandLine(
                                "unterminated double quote".into(),
                            ))
                        }
                    }
                }
            }
            '\\' => match chars.next() {
                Some('\n') => {}
                Some(ch) => {
                    in_word = true;
                    cur.push(ch);
                }
                None => {
                    return Err(ExporterError::CommandLine(
                        "trailing backslash".into(),
                    ))
                }
            },
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut cur));
                    in_word = false;
                }
            }
            c => {
                in_word = true;
                cur.push(c);
            }
        }
    }

    if in_word {
        words.push(cur);
    }
    Ok(words)
}

/// Parse a command line into program and arguments.
pub fn parse(line: &str) -> Result<CommandLine> {
    let mut words = split(line)?.into_iter();
    let program = words
        .next()
        .ok_or_else(|| ExporterError::CommandLine("empty command line".into()))?;
    Ok(CommandLine {
        program,
        args: words.collect(),
    })
}
