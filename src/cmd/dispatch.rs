/*!
`dispatch.rs`

Command dispatcher.

`CommandTable` maps public subcommand names to [`Command`]s. It is built
once at startup from every resource module's declarations and never
changes afterwards.

Dispatch happens in two steps so that no client connection is made for
input that is going to be rejected anyway:
  1. [`CommandTable::prepare`] resolves the subcommand word and parses the
     remaining tokens into `ParsedArguments`. Unknown names fail with
     `UnknownCommand`, bad arguments with `ArgumentError`; either way no
     handler is reached.
  2. [`Invocation::run`] calls the handler with a [`Session`] that carries
     the client handle and the output sink.

`help`, `help <command>` and `<command> --help` are answered in step 1 and
never need a client.
*/

use std::collections::BTreeMap;
use std::io::Write;

use anyhow::Context;
use tracing::debug;

use crate::client::{IdentityApi, Resource};
use crate::cmd::format::{self, StyleOptions};
use crate::cmd::parser::{self, ParsedArguments};
use crate::cmd::prompt::SecretPrompt;
use crate::cmd::registry::{Command, PROG};
use crate::errors::{ShellError, ShellResult};

/// Signature every subcommand implements.
pub type Handler = fn(&mut Session<'_>, &ParsedArguments) -> ShellResult<()>;

const SUGGESTION_TOLERANCE: f64 = 0.8;
const MAX_SUGGESTIONS: usize = 3;

/* ---- Session ---- */

/// Everything a handler may touch while it runs.
pub struct Session<'a> {
    pub client: &'a dyn IdentityApi,
    pub prompt: &'a dyn SecretPrompt,
    pub out: &'a mut dyn Write,
    pub style: StyleOptions,
    pub json: bool,
}

impl Session<'_> {
    /// Print a fixed-column listing.
    pub fn print_list(&mut self, items: &[Resource], fields: &[&str]) -> ShellResult<()> {
        let text = if self.json {
            format::render_list_json(items, fields)
        } else {
            format::render_list(items, fields, &self.style)
        };
        self.emit(&text)
    }

    /// Print every attribute of one resource.
    pub fn print_dict(&mut self, resource: &Resource) -> ShellResult<()> {
        let text = if self.json {
            format::render_dict_json(resource.info())
        } else {
            format::render_dict(resource.info(), &self.style)
        };
        self.emit(&text)
    }

    /// Print a plain status line (suppressed in JSON mode).
    pub fn message(&mut self, text: &str) -> ShellResult<()> {
        if self.json {
            return Ok(());
        }
        self.emit(text)
    }

    pub fn emit(&mut self, text: &str) -> ShellResult<()> {
        writeln!(self.out, "{text}").context("failed to write output")?;
        Ok(())
    }
}

/* ---- Command Table ---- */

#[derive(Debug)]
pub struct CommandTable {
    commands: BTreeMap<String, Command>,
}

/// Outcome of resolving and parsing one command line.
pub enum Invocation<'t> {
    Help(String),
    Run {
        command: &'t Command,
        args: ParsedArguments,
    },
}

impl CommandTable {
    pub fn new(commands: Vec<Command>) -> ShellResult<Self> {
        let mut map = BTreeMap::new();
        for cmd in commands {
            let name = cmd.name().to_string();
            if map.insert(name.clone(), cmd).is_some() {
                return Err(ShellError::Registry {
                    command: name,
                    message: "declared twice".into(),
                });
            }
        }
        Ok(Self { commands: map })
    }

    /// Table of every shipped command.
    pub fn builtin() -> ShellResult<Self> {
        let mut all = Vec::new();
        all.extend(crate::cmd::users::commands()?);
        all.extend(crate::cmd::tenants::commands()?);
        all.extend(crate::cmd::services::commands()?);
        all.extend(crate::cmd::roles::commands()?);
        all.extend(crate::cmd::ec2::commands()?);
        all.extend(crate::cmd::catalog::commands()?);
        Self::new(all)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    pub fn resolve(&self, name: &str) -> ShellResult<&Command> {
        self.commands
            .get(name)
            .ok_or_else(|| ShellError::UnknownCommand {
                name: name.to_string(),
                suggestions: self.suggest(name),
            })
    }

    /// Closest known names, best first.
    pub fn suggest(&self, name: &str) -> Vec<String> {
        let mut scored: Vec<(f64, &str)> = self
            .names()
            .map(|n| (strsim::jaro_winkler(name, n), n))
            .filter(|(score, n)| *score >= SUGGESTION_TOLERANCE || (!name.is_empty() && n.starts_with(name)))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|(_, n)| n.to_string())
            .collect()
    }

    /// Resolve `argv[0]` and parse the rest against that command's specs.
    pub fn prepare(&self, argv: &[String]) -> ShellResult<Invocation<'_>> {
        let Some((first, rest)) = argv.split_first() else {
            return Ok(Invocation::Help(self.overview()));
        };

        if first == "help" {
            return match rest.first() {
                Some(name) => Ok(Invocation::Help(self.resolve(name)?.help())),
                None => Ok(Invocation::Help(self.overview())),
            };
        }

        let command = self.resolve(first)?;
        debug!(command = command.name(), "resolved");

        let flags_end = rest.iter().position(|t| t == "--").unwrap_or(rest.len());
        if rest[..flags_end].iter().any(|t| t == "-h" || t == "--help") {
            return Ok(Invocation::Help(command.help()));
        }

        let args = parser::parse(command, rest)?;
        Ok(Invocation::Run { command, args })
    }

    /// Command list shown by bare `keystone` / `keystone help`.
    pub fn overview(&self) -> String {
        let mut out = format!("usage: {PROG} [global options] <command> [arguments]\n\nCommands:\n");
        for cmd in self.commands.values() {
            out.push_str(&format!("  {:<26}{}\n", cmd.name(), cmd.about()));
        }
        out.push_str(&format!(
            "  {:<26}Display help about this program or one of its commands.\n\n\
             See \"{PROG} help <command>\" for help on a specific command.",
            "help"
        ));
        out
    }
}

impl Invocation<'_> {
    pub fn run(self, session: &mut Session<'_>) -> ShellResult<()> {
        match self {
            Invocation::Help(text) => session.emit(&text),
            Invocation::Run { command, args } => {
                debug!(command = command.name(), "invoking handler");
                (command.handler())(session, &args)
            }
        }
    }
}

/* ---- Tests ---- */

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::client::fake::FakeClient;
    use crate::cmd::prompt::scripted::ScriptedPrompt;

    /// Resolve, parse and run in one go.
    pub fn dispatch(
        table: &CommandTable,
        argv: &[String],
        session: &mut Session<'_>,
    ) -> ShellResult<()> {
        table.prepare(argv)?.run(session)
    }

    /// Run `argv` against the shipped table; returns the outcome and captured stdout.
    pub fn run_with(
        client: &FakeClient,
        prompt: &ScriptedPrompt,
        argv: &[&str],
    ) -> (ShellResult<()>, String) {
        run_in_mode(client, prompt, argv, false)
    }

    /// Same as [`run`] with `--json` output.
    pub fn run_json(client: &FakeClient, argv: &[&str]) -> (ShellResult<()>, String) {
        run_in_mode(client, &ScriptedPrompt::default(), argv, true)
    }

    fn run_in_mode(
        client: &FakeClient,
        prompt: &ScriptedPrompt,
        argv: &[&str],
        json: bool,
    ) -> (ShellResult<()>, String) {
        let table = CommandTable::builtin().unwrap();
        let argv: Vec<String> = argv.iter().map(|s| s.to_string()).collect();
        let mut out = Vec::new();
        let res = {
            let mut session = Session {
                client,
                prompt,
                out: &mut out,
                style: StyleOptions::plain(),
                json,
            };
            dispatch(&table, &argv, &mut session)
        };
        (res, String::from_utf8(out).unwrap())
    }

    pub fn run(client: &FakeClient, argv: &[&str]) -> (ShellResult<()>, String) {
        run_with(client, &ScriptedPrompt::default(), argv)
    }
}
