//! Typed option record
//!
//! The router hands over a loose name → value map; this module turns it into
//! [`Options`], a closed set of recognised options. Unrecognised names are
//! logged and ignored.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::router::OptionValue;

/// Every option name the CLI understands
pub const KNOWN_OPTIONS: &[&str] = &[
    "limit",
    "page",
    "fields",
    "order-by",
    "order-dir",
    "type",
    "cursor",
    "title",
    "body",
    "body-html",
    "parent-id",
    "source-url",
    "author",
    "is-todo",
    "todo-due",
    "todo-completed",
    "output",
    "tab",
    "no-activate",
    "all",
];

/// Recognised options for one invocation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Options {
    // Query string
    pub limit: Option<String>,
    pub page: Option<String>,
    pub fields: Option<String>,
    pub order_by: Option<String>,
    pub order_dir: Option<String>,
    pub item_type: Option<String>,
    pub cursor: Option<String>,

    // Request body
    pub title: Option<String>,
    pub body: Option<String>,
    pub body_html: Option<String>,
    pub parent_id: Option<String>,
    pub source_url: Option<String>,
    pub author: Option<String>,
    pub is_todo: Option<bool>,
    pub todo_due: Option<i64>,
    pub todo_completed: Option<i64>,

    // Transfers
    pub output: Option<PathBuf>,

    // Browser
    pub tab: Option<String>,
    pub no_activate: bool,
    pub all: bool,
}

impl Options {
    /// Build the typed record from the router's option map
    pub fn from_map(map: &BTreeMap<String, OptionValue>) -> Result<Self> {
        for name in map.keys() {
            if !KNOWN_OPTIONS.contains(&name.as_str()) {
                tracing::warn!(option = %name, "Ignoring unrecognized option");
            }
        }

        let reader = Reader { map };
        Ok(Self {
            limit: reader.string("limit")?,
            page: reader.string("page")?,
            fields: reader.string("fields")?,
            order_by: reader.string("order-by")?,
            order_dir: reader.string("order-dir")?,
            item_type: reader.string("type")?,
            cursor: reader.string("cursor")?,
            title: reader.string("title")?,
            body: reader.string("body")?,
            body_html: reader.string("body-html")?,
            parent_id: reader.string("parent-id")?,
            source_url: reader.string("source-url")?,
            author: reader.string("author")?,
            is_todo: reader.boolean("is-todo")?,
            todo_due: reader.integer("todo-due")?,
            todo_completed: reader.integer("todo-completed")?,
            output: reader.string("output")?.map(PathBuf::from),
            tab: reader.string("tab")?,
            no_activate: reader.boolean("no-activate")?.unwrap_or(false),
            all: reader.boolean("all")?.unwrap_or(false),
        })
    }
}

struct Reader<'a> {
    map: &'a BTreeMap<String, OptionValue>,
}

impl Reader<'_> {
    fn string(&self, name: &str) -> Result<Option<String>> {
        match self.map.get(name) {
            None => Ok(None),
            Some(OptionValue::Value(value)) => Ok(Some(value.clone())),
            Some(OptionValue::Flag) => Err(Error::InvalidArgument(format!(
                "--{name} expects a value"
            ))),
        }
    }

    fn boolean(&self, name: &str) -> Result<Option<bool>> {
        match self.map.get(name) {
            None => Ok(None),
            Some(OptionValue::Flag) => Ok(Some(true)),
            Some(OptionValue::Value(value)) => match value.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(Some(true)),
                "false" | "0" | "no" => Ok(Some(false)),
                _ => Err(Error::InvalidArgument(format!(
                    "--{name} expects true or false, got '{value}'"
                ))),
            },
        }
    }

    fn integer(&self, name: &str) -> Result<Option<i64>> {
        self.string(name)?
            .map(|value| {
                value.parse::<i64>().map_err(|_| {
                    Error::InvalidArgument(format!("--{name} expects an integer, got '{value}'"))
                })
            })
            .transpose()
    }
}
