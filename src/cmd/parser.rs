/*!
`parser.rs`

Per-command argument parser driven by a command's [`ArgumentSpec`] list.

Accepted token shapes:
  - `--flag value` and `--flag=value`
  - bare `--flag` (zero-or-one arity only; records `true`)
  - positionals, filled in declaration order
  - `--` ends flag processing; everything after is positional

Flag names match with `_` and `-` treated alike, so the historical
`--tenant_id` spelling resolves to `--tenant-id`.

Any problem is an `ArgumentError` and no `ParsedArguments` is produced.
*/

use std::collections::BTreeMap;

use anyhow::anyhow;

use crate::cmd::registry::{Arity, ArgumentSpec, Command};
use crate::errors::{ShellError, ShellResult};
use crate::utils::string_to_bool;

/// A parsed argument value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Str(String),
    Bool(bool),
}

impl From<&str> for ArgValue {
    fn from(s: &str) -> Self {
        ArgValue::Str(s.to_string())
    }
}

impl From<bool> for ArgValue {
    fn from(b: bool) -> Self {
        ArgValue::Bool(b)
    }
}

/// Destination name -> value. Absent destinations were neither given nor defaulted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedArguments {
    values: BTreeMap<String, ArgValue>,
}

impl ParsedArguments {
    #[cfg(test)]
    pub fn is_present(&self, dest: &str) -> bool {
        self.values.contains_key(dest)
    }

    /// String value, if one was given. A bare flag has no string value.
    pub fn str(&self, dest: &str) -> Option<&str> {
        match self.values.get(dest) {
            Some(ArgValue::Str(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// String value of an argument the parser guarantees (required or defaulted).
    pub fn value(&self, dest: &str) -> ShellResult<&str> {
        self.str(dest)
            .ok_or_else(|| ShellError::Other(anyhow!("argument '{dest}' has no value")))
    }

    /// Boolean view: strings go through `string_to_bool`.
    pub fn bool(&self, dest: &str) -> Option<bool> {
        match self.values.get(dest)? {
            ArgValue::Bool(b) => Some(*b),
            ArgValue::Str(s) => Some(string_to_bool(s)),
        }
    }

    /// Like [`str`](Self::str), but an empty string counts as not given.
    pub fn non_empty(&self, dest: &str) -> Option<&str> {
        self.str(dest).filter(|s| !s.is_empty())
    }
}

/* ---- Parsing ---- */

/// Parse `tokens` (everything after the subcommand word) for `command`.
pub fn parse(command: &Command, tokens: &[String]) -> ShellResult<ParsedArguments> {
    let fail = |message: String| ShellError::ArgumentError {
        command: command.name().to_string(),
        message,
        usage: command.usage(),
    };

    let positionals: Vec<&ArgumentSpec> = command.positionals().collect();
    let mut next_positional = 0usize;
    let mut values: BTreeMap<String, ArgValue> = BTreeMap::new();
    let mut only_positionals = false;

    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        i += 1;

        if !only_positionals && token == "--" {
            only_positionals = true;
            continue;
        }

        if !only_positionals && token.starts_with("--") {
            let (raw_name, inline) = match token.split_once('=') {
                Some((n, v)) => (n, Some(v.to_string())),
                None => (token.as_str(), None),
            };
            let spec = find_flag(command, raw_name)
                .ok_or_else(|| fail(format!("unrecognized argument '{raw_name}'")))?;

            let value = match (inline, spec.arity) {
                (Some(v), _) => ArgValue::Str(v),
                (None, Arity::One) => match tokens.get(i) {
                    Some(next) if !looks_like_flag(next) => {
                        i += 1;
                        ArgValue::Str(next.clone())
                    }
                    _ => {
                        return Err(fail(format!(
                            "argument {} expects one value {}",
                            spec.name, spec.metavar
                        )));
                    }
                },
                (None, Arity::ZeroOrOne) => match tokens.get(i) {
                    Some(next) if !looks_like_flag(next) => {
                        i += 1;
                        ArgValue::Str(next.clone())
                    }
                    _ => ArgValue::Bool(true),
                },
            };
            values.insert(spec.dest.clone(), value);
            continue;
        }

        if !only_positionals && looks_like_flag(token) {
            return Err(fail(format!("unrecognized argument '{token}'")));
        }

        let Some(spec) = positionals.get(next_positional) else {
            return Err(fail(format!("unexpected argument '{token}'")));
        };
        next_positional += 1;
        values.insert(spec.dest.clone(), ArgValue::Str(token.clone()));
    }

    for spec in command.specs() {
        let Some(other) = spec.requires else {
            continue;
        };
        if values.contains_key(&spec.dest) && !values.contains_key(other) {
            let other_name = command
                .specs()
                .iter()
                .find(|s| s.dest == other)
                .map_or(other, |s| s.name);
            return Err(fail(format!(
                "argument {} requires {} to be given as well",
                spec.name, other_name
            )));
        }
    }

    let mut missing = Vec::new();
    for spec in command.specs() {
        if values.contains_key(&spec.dest) {
            continue;
        }
        if let Some(default) = &spec.default {
            values.insert(spec.dest.clone(), default.clone());
        } else if spec.required {
            missing.push(if spec.is_flag() {
                spec.name.to_string()
            } else {
                spec.metavar.to_string()
            });
        }
    }
    if !missing.is_empty() {
        return Err(fail(format!(
            "the following arguments are required: {}",
            missing.join(", ")
        )));
    }

    Ok(ParsedArguments { values })
}

fn normalize_flag(name: &str) -> String {
    name.replace('_', "-")
}

fn find_flag<'c>(command: &'c Command, raw: &str) -> Option<&'c ArgumentSpec> {
    let wanted = normalize_flag(raw);
    command.flags().find(|s| normalize_flag(s.name) == wanted)
}

fn looks_like_flag(token: &str) -> bool {
    token.len() > 1 && token.starts_with('-')
}

/* ---- Tests ---- */
