/*!
`registry.rs`

Argument specification registry.

A [`Command`] couples one handler function with the ordered list of
[`ArgumentSpec`]s it accepts. Commands are declared with the [`command!`]
macro, which derives the public subcommand name from the handler's
identifier (`user_list` -> `user-list`), and then grow one spec at a time
through [`Command::attach`]. Attachment order is consumption order: the
first positional attached is the first positional the parser fills.

Declaration-time checks (reported as `ShellError::Registry`):
  - destination names are unique within a command
  - a required positional never follows an optional one
*/

use std::fmt;

use crate::cmd::dispatch::Handler;
use crate::cmd::parser::ArgValue;
use crate::errors::{ShellError, ShellResult};

/// Program name used in usage lines.
pub const PROG: &str = "keystone";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    Positional,
    Flag,
}

/// How many values an argument consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly one value.
    One,
    /// A value may follow. A bare flag records `true`.
    ZeroOrOne,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentSpec {
    /// `tenant` for positionals, `--default-tenant` for flags.
    pub name: &'static str,
    pub metavar: &'static str,
    pub help: &'static str,
    pub kind: ArgKind,
    pub arity: Arity,
    pub default: Option<ArgValue>,
    pub required: bool,
    pub dest: String,
    /// Destination that must also be given whenever this one is.
    pub requires: Option<&'static str>,
}

impl ArgumentSpec {
    /// A positional taking exactly one value. Required.
    pub fn positional(name: &'static str, metavar: &'static str, help: &'static str) -> Self {
        Self {
            name,
            metavar,
            help,
            kind: ArgKind::Positional,
            arity: Arity::One,
            default: None,
            required: true,
            dest: name.replace('-', "_"),
            requires: None,
        }
    }

    /// A `--flag` with an optional value. Not required.
    pub fn flag(name: &'static str, metavar: &'static str, help: &'static str) -> Self {
        Self {
            name,
            metavar,
            help,
            kind: ArgKind::Flag,
            arity: Arity::ZeroOrOne,
            default: None,
            required: false,
            dest: name.trim_start_matches('-').replace('-', "_"),
            requires: None,
        }
    }

    /// Zero-or-one arity. For positionals this also makes the argument optional.
    pub fn optional(mut self) -> Self {
        self.arity = Arity::ZeroOrOne;
        self.required = false;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn arity(mut self, arity: Arity) -> Self {
        self.arity = arity;
        self
    }

    pub fn default_value(mut self, value: impl Into<ArgValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn requires(mut self, other_dest: &'static str) -> Self {
        self.requires = Some(other_dest);
        self
    }

    pub fn dest(mut self, dest: &str) -> Self {
        self.dest = dest.to_string();
        self
    }

    pub fn is_flag(&self) -> bool {
        self.kind == ArgKind::Flag
    }

    /// Usage fragment: `<user_id>`, `[<tenant_id>]`, `--service <service_type>`, `[--name <name>]`.
    pub fn usage(&self) -> String {
        let core = match (self.kind, self.arity) {
            (ArgKind::Positional, _) => self.metavar.to_string(),
            (ArgKind::Flag, Arity::One) => format!("{} {}", self.name, self.metavar),
            (ArgKind::Flag, Arity::ZeroOrOne) => format!("{} [{}]", self.name, self.metavar),
        };
        if self.required {
            core
        } else {
            format!("[{core}]")
        }
    }
}

/* ---- Commands ---- */

/// One subcommand: public name, help line, handler and ordered argument specs.
#[derive(Clone)]
pub struct Command {
    name: String,
    about: &'static str,
    handler: Handler,
    specs: Vec<ArgumentSpec>,
}

impl Command {
    /// `declared` is the handler identifier; `_` becomes `-` in the public name.
    pub fn new(declared: &str, about: &'static str, handler: Handler) -> Self {
        Self {
            name: public_name(declared),
            about,
            handler,
            specs: Vec::new(),
        }
    }

    /// Return this command with one more argument spec appended.
    pub fn attach(mut self, spec: ArgumentSpec) -> ShellResult<Self> {
        if self.specs.iter().any(|s| s.dest == spec.dest) {
            return Err(self.invalid(format!("duplicate destination '{}'", spec.dest)));
        }
        if spec.is_flag() && !spec.name.starts_with("--") {
            return Err(self.invalid(format!("flag '{}' must start with --", spec.name)));
        }
        if !spec.is_flag()
            && spec.required
            && self
                .specs
                .iter()
                .any(|s| !s.is_flag() && !s.required)
        {
            return Err(self.invalid(format!(
                "required positional '{}' follows an optional one",
                spec.name
            )));
        }
        self.specs.push(spec);
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn about(&self) -> &'static str {
        self.about
    }

    pub fn handler(&self) -> Handler {
        self.handler
    }

    /// Attached specs in declaration order.
    pub fn specs(&self) -> &[ArgumentSpec] {
        &self.specs
    }

    pub fn positionals(&self) -> impl Iterator<Item = &ArgumentSpec> {
        self.specs.iter().filter(|s| !s.is_flag())
    }

    pub fn flags(&self) -> impl Iterator<Item = &ArgumentSpec> {
        self.specs.iter().filter(|s| s.is_flag())
    }

    /// One-line usage: flags first, then positionals in consumption order.
    pub fn usage(&self) -> String {
        let mut parts = vec![PROG.to_string(), self.name.clone()];
        parts.extend(self.flags().map(ArgumentSpec::usage));
        parts.extend(self.positionals().map(ArgumentSpec::usage));
        parts.join(" ")
    }

    /// Multi-line help: usage, description and one line per argument.
    pub fn help(&self) -> String {
        let mut out = format!("usage: {}\n\n{}\n", self.usage(), self.about);
        let positionals: Vec<_> = self.positionals().collect();
        if !positionals.is_empty() {
            out.push_str("\nPositional arguments:\n");
            for s in positionals {
                out.push_str(&format!("  {:<28}{}\n", s.metavar, s.help));
            }
        }
        let flags: Vec<_> = self.flags().collect();
        if !flags.is_empty() {
            out.push_str("\nOptional arguments:\n");
            for s in flags {
                out.push_str(&format!("  {:<28}{}\n", format!("{} {}", s.name, s.metavar), s.help));
            }
        }
        out
    }

    fn invalid(&self, message: String) -> ShellError {
        ShellError::Registry {
            command: self.name.clone(),
            message,
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("specs", &self.specs)
            .finish()
    }
}

/// `user_list` -> `user-list`.
pub fn public_name(declared: &str) -> String {
    declared.trim_start_matches("do_").replace('_', "-")
}

/// Declare a [`Command`] for a handler function in scope.
///
/// `command!(user_list, "List users")` registers `user_list` as `user-list`.
macro_rules! command {
    ($handler:ident, $about:expr) => {
        $crate::cmd::registry::Command::new(stringify!($handler), $about, $handler)
    };
}
pub(crate) use command;

/* ---- Tests ---- */
