//! Plan execution
//!
//! Runs a [`Plan`] against the service traits and returns the JSON value the
//! CLI prints. `Plan::Help` is rendered by the CLI and never reaches here.

use serde_json::{Value, json};

use crate::error::{Error, Result};
use crate::request::{BrowserAction, Plan};
use crate::traits::{Browser, NotesApi, Tab};

/// Execute a plan and produce its printable result
pub async fn dispatch(plan: Plan, api: &dyn NotesApi, browser: &dyn Browser) -> Result<Value> {
    match plan {
        Plan::Help => Ok(Value::Null),
        Plan::Ping => Ok(serde_json::to_value(api.ping().await)?),
        Plan::Call(request) => {
            tracing::debug!(method = request.method.as_str(), path = %request.path(), "Calling notes API");
            api.call(&request).await
        }
        Plan::Upload(upload) => {
            tracing::debug!(file = %upload.file.display(), "Uploading resource");
            api.upload(&upload).await
        }
        Plan::Download(download) => {
            tracing::debug!(path = %download.request.path(), output = %download.output.display(), "Downloading resource");
            Ok(serde_json::to_value(api.download(&download).await?)?)
        }
        Plan::Browser(action) => run_browser(action, browser).await,
    }
}

async fn run_browser(action: BrowserAction, browser: &dyn Browser) -> Result<Value> {
    match action {
        BrowserAction::Status => Ok(match browser.version().await {
            Ok(version) => json!({
                "status": "ok",
                "browser": version.get("Browser").cloned().unwrap_or(Value::Null),
                "protocol": version.get("Protocol-Version").cloned().unwrap_or(Value::Null),
                "port": browser.port(),
            }),
            Err(e) => json!({
                "status": "error",
                "message": format!("Browser not reachable on port {}: {e}", browser.port()),
                "port": browser.port(),
            }),
        }),
        BrowserAction::Tabs => Ok(serde_json::to_value(browser.tabs().await?)?),
        BrowserAction::Open { url, activate } => {
            let tab = browser.open(&url).await?;
            if activate {
                browser.activate(&tab.id).await?;
            }
            Ok(serde_json::to_value(tab)?)
        }
        BrowserAction::Activate { id } => {
            browser.activate(&id).await?;
            Ok(json!({ "success": true, "activated": id }))
        }
        BrowserAction::Close { id } => {
            browser.close(&id).await?;
            Ok(json!({ "success": true, "closed": id }))
        }
        BrowserAction::CloseAll { keep_first } => {
            let tabs = browser.tabs().await?;
            let skip = usize::from(keep_first && !tabs.is_empty());
            let mut closed = 0;
            for tab in tabs.iter().skip(skip) {
                match browser.close(&tab.id).await {
                    Ok(()) => closed += 1,
                    Err(e) => tracing::warn!(tab = %tab.id, error = %e, "Failed to close tab"),
                }
            }
            Ok(json!({ "closed": closed }))
        }
        BrowserAction::Eval { expression, tab } => {
            let tabs = browser.tabs().await?;
            let target = select_tab(tabs, tab.as_deref())?;
            browser.evaluate(&target, &expression).await
        }
    }
}

/// The requested tab, or the first page tab when none was named
fn select_tab(tabs: Vec<Tab>, wanted: Option<&str>) -> Result<Tab> {
    let target = match wanted {
        Some(id) => tabs
            .into_iter()
            .find(|t| t.id == id)
            .ok_or_else(|| Error::NotFound(format!("Tab not found: {id}")))?,
        None => tabs
            .into_iter()
            .find(|t| t.kind == "page")
            .ok_or_else(|| Error::MalformedResponse("No page tabs found".into()))?,
    };

    if target.web_socket_url.is_empty() {
        return Err(Error::MalformedResponse(format!(
            "No WebSocket URL available for tab {}",
            target.id
        )));
    }
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::plan;
    use crate::router::route;
    use crate::traits::{DownloadOutcome, MockBrowser, MockNotesApi, PingReport};
    use std::path::PathBuf;

    fn tab(id: &str, kind: &str) -> Tab {
        Tab {
            id: id.into(),
            title: format!("Title {id}"),
            url: format!("https://example.com/{id}"),
            kind: kind.into(),
            web_socket_url: format!("ws://localhost:9222/devtools/page/{id}"),
        }
    }

    async fn run(tokens: &[&str], api: &MockNotesApi, browser: &MockBrowser) -> Result<Value> {
        let plan = plan(&route(tokens)?)?;
        dispatch(plan, api, browser).await
    }

    #[tokio::test]
    async fn test_call_issues_exactly_one_request() {
        let mut api = MockNotesApi::new();
        api.expect_call()
            .withf(|req| req.path() == "/notes" && req.body == Some(json!({"title": "T", "body": "B"})))
            .times(1)
            .returning(|_| Ok(json!({"id": "abc123"})));

        let value = run(&["notes", "create", "--title", "T", "--body", "B"], &api, &MockBrowser::new())
            .await
            .unwrap();
        assert_eq!(value, json!({"id": "abc123"}));
    }

    #[tokio::test]
    async fn test_invalid_command_issues_no_request() {
        let mut api = MockNotesApi::new();
        api.expect_call().times(0);

        let err = run(&["notes", "create", "--body", "B"], &api, &MockBrowser::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingArgument(_)));
    }

    #[tokio::test]
    async fn test_ping_report_is_value() {
        let mut api = MockNotesApi::new();
        api.expect_ping()
            .times(1)
            .returning(|| PingReport::error("Service not running on port 1", 1));

        let value = run(&["ping"], &api, &MockBrowser::new()).await.unwrap();
        assert_eq!(value["status"], "error");
        assert_eq!(value["port"], 1);
    }

    #[tokio::test]
    async fn test_download_outcome_is_value() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("f.bin");
        let expected = output.clone();

        let mut api = MockNotesApi::new();
        api.expect_download()
            .times(1)
            .returning(move |d| Ok(DownloadOutcome::new(d.output.clone(), 3)));

        let value = run(
            &["resources", "download", "r1", "--output", &output.to_string_lossy()],
            &api,
            &MockBrowser::new(),
        )
        .await
        .unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(PathBuf::from(value["path"].as_str().unwrap()), expected);
    }

    #[tokio::test]
    async fn test_browser_status_never_fails() {
        let mut browser = MockBrowser::new();
        browser.expect_port().return_const(9222u16);
        browser
            .expect_version()
            .returning(|| Err(Error::Transport("connection refused".into())));

        let value = run(&["browser", "status"], &MockNotesApi::new(), &browser)
            .await
            .unwrap();
        assert_eq!(value["status"], "error");
        assert_eq!(value["port"], 9222);
    }

    #[tokio::test]
    async fn test_close_all_keeps_first_tab() {
        let mut browser = MockBrowser::new();
        browser
            .expect_tabs()
            .returning(|| Ok(vec![tab("A", "page"), tab("B", "page"), tab("C", "page")]));
        browser
            .expect_close()
            .withf(|id| id != "A")
            .times(2)
            .returning(|_| Ok(()));

        let value = run(&["browser", "close-all"], &MockNotesApi::new(), &browser)
            .await
            .unwrap();
        assert_eq!(value, json!({"closed": 2}));
    }

    #[tokio::test]
    async fn test_open_activates_unless_disabled() {
        let mut browser = MockBrowser::new();
        browser
            .expect_open()
            .times(1)
            .returning(|_| Ok(tab("N", "page")));
        browser.expect_activate().times(0);

        let value = run(
            &["browser", "open", "https://example.com", "--no-activate"],
            &MockNotesApi::new(),
            &browser,
        )
        .await
        .unwrap();
        assert_eq!(value["id"], "N");
    }

    #[tokio::test]
    async fn test_eval_uses_first_page_tab() {
        let mut browser = MockBrowser::new();
        browser
            .expect_tabs()
            .returning(|| Ok(vec![tab("W", "service_worker"), tab("P", "page")]));
        browser
            .expect_evaluate()
            .withf(|t, expr| t.id == "P" && expr == "document.title")
            .times(1)
            .returning(|_, _| Ok(json!("Example")));

        let value = run(&["browser", "eval", "document.title"], &MockNotesApi::new(), &browser)
            .await
            .unwrap();
        assert_eq!(value, json!("Example"));
    }

    #[tokio::test]
    async fn test_eval_unknown_tab() {
        let mut browser = MockBrowser::new();
        browser.expect_tabs().returning(|| Ok(vec![tab("P", "page")]));
        browser.expect_evaluate().times(0);

        let err = run(
            &["browser", "eval", "1+1", "--tab", "missing"],
            &MockNotesApi::new(),
            &browser,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::NotFound(ref m) if m.contains("missing")));
    }
}
