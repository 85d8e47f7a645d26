//! Command routing
//!
//! Splits the raw token list into positionals and `--options`, then resolves
//! the first positionals against the fixed collection/subcommand registry.
//!
//! Option grammar: `--name value` consumes the next token unless it starts
//! with `--`, in which case `--name` is a bare flag. `--name=value` is also
//! accepted. Underscores in names are normalised to dashes. The last
//! occurrence of a repeated option wins.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, Result};
use crate::options::Options;

const OPTION_PREFIX: &str = "--";

/// Value attached to an option token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    /// Option given without a value
    Flag,
    /// Option followed by a value
    Value(String),
}

/// Tokenized command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    /// Non-option tokens in encountered order
    pub positionals: Vec<String>,
    /// Options keyed by normalised name
    pub options: BTreeMap<String, OptionValue>,
}

impl Invocation {
    /// Split tokens into positionals and options
    pub fn parse<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut invocation = Self::default();
        let mut tokens = tokens
            .into_iter()
            .map(|token| token.as_ref().to_string())
            .peekable();

        while let Some(token) = tokens.next() {
            let Some(name) = token.strip_prefix(OPTION_PREFIX) else {
                invocation.positionals.push(token);
                continue;
            };

            if let Some((name, value)) = name.split_once('=') {
                invocation
                    .options
                    .insert(normalize(name), OptionValue::Value(value.to_string()));
                continue;
            }

            let value = match tokens.next_if(|next| !next.starts_with(OPTION_PREFIX)) {
                Some(next) => OptionValue::Value(next),
                None => OptionValue::Flag,
            };
            invocation.options.insert(normalize(name), value);
        }

        invocation
    }
}

fn normalize(name: &str) -> String {
    name.replace('_', "-")
}

/// Top-level command groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Ping,
    Help,
    Search,
    Notes,
    Folders,
    Tags,
    Resources,
    Events,
    Revisions,
    Browser,
}

impl Collection {
    pub const ALL: [Collection; 10] = [
        Collection::Ping,
        Collection::Help,
        Collection::Search,
        Collection::Notes,
        Collection::Folders,
        Collection::Tags,
        Collection::Resources,
        Collection::Events,
        Collection::Revisions,
        Collection::Browser,
    ];

    /// Name used on the command line, also the API path segment
    pub const fn name(self) -> &'static str {
        match self {
            Collection::Ping => "ping",
            Collection::Help => "help",
            Collection::Search => "search",
            Collection::Notes => "notes",
            Collection::Folders => "folders",
            Collection::Tags => "tags",
            Collection::Resources => "resources",
            Collection::Events => "events",
            Collection::Revisions => "revisions",
            Collection::Browser => "browser",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// One-line description for help output
    pub const fn description(self) -> &'static str {
        match self {
            Collection::Ping => "Check that the notes service is running",
            Collection::Help => "Show this help",
            Collection::Search => "Full-text search (--limit, --type note|folder|tag)",
            Collection::Notes => "Notes",
            Collection::Folders => "Notebooks",
            Collection::Tags => "Tags and their note associations",
            Collection::Resources => "Attachments, with file upload and download",
            Collection::Events => "Change events (read-only, --cursor)",
            Collection::Revisions => "Note revisions (read-only)",
            Collection::Browser => "Chrome DevTools on the debugging port",
        }
    }

    /// Valid subcommands; the first one is used when none is given.
    /// Empty for collections that take positionals directly.
    pub const fn operations(self) -> &'static [Operation] {
        use Operation::*;
        match self {
            Collection::Ping | Collection::Help | Collection::Search => &[],
            Collection::Notes => &[List, Get, Create, Update, Delete, Tags, Resources],
            Collection::Folders => &[List, Get, Create, Update, Delete, Notes],
            Collection::Tags => &[List, Get, Create, Update, Delete, Notes, AddNote, RemoveNote],
            Collection::Resources => &[List, Get, Update, Delete, Notes, Upload, Download],
            Collection::Events | Collection::Revisions => &[List, Get],
            Collection::Browser => &[Status, Tabs, Open, Activate, Close, CloseAll, Eval],
        }
    }

    /// Whether commands in this collection talk to the notes API
    pub const fn needs_credential(self) -> bool {
        !matches!(
            self,
            Collection::Ping | Collection::Help | Collection::Browser
        )
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Subcommands across all collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
    Notes,
    Tags,
    Resources,
    AddNote,
    RemoveNote,
    Upload,
    Download,
    Status,
    Tabs,
    Open,
    Activate,
    Close,
    CloseAll,
    Eval,
}

impl Operation {
    pub const fn name(self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::Get => "get",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Notes => "notes",
            Operation::Tags => "tags",
            Operation::Resources => "resources",
            Operation::AddNote => "add-note",
            Operation::RemoveNote => "remove-note",
            Operation::Upload => "upload",
            Operation::Download => "download",
            Operation::Status => "status",
            Operation::Tabs => "tabs",
            Operation::Open => "open",
            Operation::Activate => "activate",
            Operation::Close => "close",
            Operation::CloseAll => "close-all",
            Operation::Eval => "eval",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A fully resolved command, ready for planning
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub collection: Collection,
    /// `None` for collections without subcommands
    pub operation: Option<Operation>,
    /// Remaining positionals (identifiers, search query, file path...)
    pub args: Vec<String>,
    pub options: Options,
}

impl Command {
    /// Positional argument at `index`, or `MissingArgument` naming it
    pub fn arg(&self, index: usize, what: &str) -> Result<&str> {
        self.args
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| Error::MissingArgument(what.to_string()))
    }
}

/// Resolve a raw token list into a [`Command`]
///
/// An empty token list resolves to `help`.
pub fn route<I, S>(tokens: I) -> Result<Command>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let invocation = Invocation::parse(tokens);
    let mut positionals = invocation.positionals.into_iter();

    let collection = match positionals.next() {
        None => Collection::Help,
        Some(name) => Collection::from_name(&name).ok_or(Error::UnknownCommand(name))?,
    };

    let valid = collection.operations();
    let operation = match valid.first() {
        None => None,
        Some(default) => match positionals.next() {
            None => Some(*default),
            Some(name) => Some(
                valid
                    .iter()
                    .copied()
                    .find(|op| op.name() == name)
                    .ok_or_else(|| Error::UnknownSubcommand {
                        collection: collection.name().to_string(),
                        subcommand: name,
                        valid: valid.iter().map(|op| op.name()).collect(),
                    })?,
            ),
        },
    };

    let options = Options::from_map(&invocation.options)?;

    Ok(Command {
        collection,
        operation,
        args: positionals.collect(),
        options,
    })
}
