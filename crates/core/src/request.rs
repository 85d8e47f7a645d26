//! Request planning
//!
//! Turns a routed [`Command`] into a [`Plan`]: either a request descriptor
//! for the notes API, a transfer, the liveness check, or a browser action.
//! All argument validation happens here, so a plan that fails never touches
//! the network.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value, json};

use crate::error::{Error, Result};
use crate::options::Options;
use crate::query::QueryParams;
use crate::router::{Collection, Command, Operation};

/// HTTP method of a planned request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub const fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// One request against the notes API
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    /// Unencoded path segments, e.g. `["tags", "t1", "notes"]`
    pub segments: Vec<String>,
    pub query: QueryParams,
    /// JSON body, sent as `application/json`
    pub body: Option<Value>,
}

impl Request {
    pub fn new<I, S>(method: Method, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method,
            segments: segments.into_iter().map(Into::into).collect(),
            query: QueryParams::default(),
            body: None,
        }
    }

    pub fn with_query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Display form of the path, e.g. `/tags/t1/notes`
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }
}

/// Multipart upload of a local file
#[derive(Debug, Clone, PartialEq)]
pub struct UploadRequest {
    pub segments: Vec<String>,
    pub file: PathBuf,
    /// Metadata sent as the `props` part
    pub props: Map<String, Value>,
}

/// Streamed download into a local file
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadRequest {
    pub request: Request,
    pub output: PathBuf,
}

/// Browser DevTools actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserAction {
    Status,
    Tabs,
    Open { url: String, activate: bool },
    Activate { id: String },
    Close { id: String },
    CloseAll { keep_first: bool },
    Eval { expression: String, tab: Option<String> },
}

/// What an invocation will do
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    Help,
    Ping,
    Call(Request),
    Upload(UploadRequest),
    Download(DownloadRequest),
    Browser(BrowserAction),
}

/// Validate a command and build its plan
pub fn plan(command: &Command) -> Result<Plan> {
    let collection = command.collection;
    let opts = &command.options;

    let Some(operation) = command.operation else {
        return Ok(match collection {
            Collection::Help => Plan::Help,
            Collection::Ping => Plan::Ping,
            Collection::Search => {
                let query = command.arg(0, "search query")?;
                Plan::Call(
                    Request::new(Method::Get, ["search"])
                        .with_query(QueryParams::search(query, opts)),
                )
            }
            other => {
                return Err(Error::MissingArgument(format!("subcommand for '{other}'")));
            }
        });
    };

    if collection == Collection::Browser {
        return plan_browser(operation, command).map(Plan::Browser);
    }

    let base = collection.name();
    let list_query = QueryParams::from_options(opts);

    let plan = match operation {
        Operation::List => Plan::Call(Request::new(Method::Get, [base]).with_query(list_query)),
        Operation::Get => {
            let id = command.arg(0, "id")?;
            Plan::Call(Request::new(Method::Get, [base, id]).with_query(list_query))
        }
        Operation::Create => {
            let fields = body_fields(collection, opts);
            if opts.title.is_none() {
                return Err(Error::MissingArgument("--title".into()));
            }
            Plan::Call(Request::new(Method::Post, [base]).with_body(Value::Object(fields)))
        }
        Operation::Update => {
            let id = command.arg(0, "id")?;
            let fields = body_fields(collection, opts);
            if fields.is_empty() {
                return Err(Error::MissingArgument(format!(
                    "at least one field to update ({})",
                    field_names(collection)
                )));
            }
            Plan::Call(Request::new(Method::Put, [base, id]).with_body(Value::Object(fields)))
        }
        Operation::Delete => {
            let id = command.arg(0, "id")?;
            Plan::Call(Request::new(Method::Delete, [base, id]))
        }
        Operation::Notes | Operation::Tags | Operation::Resources => {
            let id = command.arg(0, "id")?;
            Plan::Call(
                Request::new(Method::Get, [base, id, operation.name()]).with_query(list_query),
            )
        }
        Operation::AddNote => {
            let tag = command.arg(0, "tag id")?;
            let note = command.arg(1, "note id")?;
            Plan::Call(Request::new(Method::Post, [base, tag, "notes"]).with_body(json!({ "id": note })))
        }
        Operation::RemoveNote => {
            let tag = command.arg(0, "tag id")?;
            let note = command.arg(1, "note id")?;
            Plan::Call(Request::new(Method::Delete, [base, tag, "notes", note]))
        }
        Operation::Upload => {
            let file = PathBuf::from(command.arg(0, "file path")?);
            if !file.is_file() {
                return Err(Error::FileNotFound(file));
            }
            let mut props = Map::new();
            if let Some(title) = &opts.title {
                props.insert("title".into(), Value::String(title.clone()));
            }
            Plan::Upload(UploadRequest {
                segments: vec![base.to_string()],
                file,
                props,
            })
        }
        Operation::Download => {
            let id = command.arg(0, "id")?;
            let output = opts
                .output
                .clone()
                .ok_or_else(|| Error::MissingArgument("--output".into()))?;
            ensure_parent_exists(&output)?;
            Plan::Download(DownloadRequest {
                request: Request::new(Method::Get, [base, id, "file"]),
                output,
            })
        }
        Operation::Status
        | Operation::Tabs
        | Operation::Open
        | Operation::Activate
        | Operation::Close
        | Operation::CloseAll
        | Operation::Eval => {
            return Err(Error::UnknownSubcommand {
                collection: base.to_string(),
                subcommand: operation.name().to_string(),
                valid: collection.operations().iter().map(|op| op.name()).collect(),
            });
        }
    };

    Ok(plan)
}

fn plan_browser(operation: Operation, command: &Command) -> Result<BrowserAction> {
    let opts = &command.options;
    Ok(match operation {
        Operation::Tabs => BrowserAction::Tabs,
        Operation::Open => BrowserAction::Open {
            url: command.arg(0, "url")?.to_string(),
            activate: !opts.no_activate,
        },
        Operation::Activate => BrowserAction::Activate {
            id: command.arg(0, "tab id")?.to_string(),
        },
        Operation::Close => BrowserAction::Close {
            id: command.arg(0, "tab id")?.to_string(),
        },
        Operation::CloseAll => BrowserAction::CloseAll {
            keep_first: !opts.all,
        },
        Operation::Eval => BrowserAction::Eval {
            expression: command.arg(0, "JavaScript expression")?.to_string(),
            tab: opts.tab.clone(),
        },
        _ => BrowserAction::Status,
    })
}

/// JSON body fields accepted by each collection
fn body_fields(collection: Collection, opts: &Options) -> Map<String, Value> {
    let mut fields = Map::new();

    put_str(&mut fields, "title", &opts.title);
    match collection {
        Collection::Notes => {
            put_str(&mut fields, "body", &opts.body);
            put_str(&mut fields, "body_html", &opts.body_html);
            put_str(&mut fields, "parent_id", &opts.parent_id);
            put_str(&mut fields, "source_url", &opts.source_url);
            put_str(&mut fields, "author", &opts.author);
            if let Some(is_todo) = opts.is_todo {
                fields.insert("is_todo".into(), json!(u8::from(is_todo)));
            }
            if let Some(due) = opts.todo_due {
                fields.insert("todo_due".into(), json!(due));
            }
            if let Some(completed) = opts.todo_completed {
                fields.insert("todo_completed".into(), json!(completed));
            }
        }
        Collection::Folders => put_str(&mut fields, "parent_id", &opts.parent_id),
        _ => {}
    }

    fields
}

fn put_str(fields: &mut Map<String, Value>, key: &str, value: &Option<String>) {
    if let Some(v) = value {
        fields.insert(key.to_string(), Value::String(v.clone()));
    }
}

fn field_names(collection: Collection) -> &'static str {
    match collection {
        Collection::Notes => {
            "--title, --body, --body-html, --parent-id, --source-url, --author, --is-todo, --todo-due, --todo-completed"
        }
        Collection::Folders => "--title, --parent-id",
        _ => "--title",
    }
}

fn ensure_parent_exists(output: &Path) -> Result<()> {
    match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => {
            Err(Error::FileNotFound(parent.to_path_buf()))
        }
        _ => Ok(()),
    }
}
