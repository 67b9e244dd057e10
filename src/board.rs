//! Board assembly and the sinks that render or ship it.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::views::View;

/// A view placed on the board at an explicit layout position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub order: usize,
    #[serde(flatten)]
    pub view: View,
}

/// A named board page with ordered panels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Board {
    pub name: String,
    pub menu_path: String,
    pub panels: Vec<Panel>,
}

impl Board {
    /// Place views in sequence. Each view starts where the previous one's
    /// slots end.
    pub fn assemble(name: &str, menu_path: &str, views: Vec<View>) -> Self {
        let mut order = 0;
        let mut panels = Vec::with_capacity(views.len());
        for view in views {
            let slots = view.slots();
            panels.push(Panel { order, view });
            order += slots;
        }

        Self {
            name: name.to_string(),
            menu_path: menu_path.to_string(),
            panels,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize board")
    }
}

/// Anything that can render or store an assembled board.
pub trait PresentationSink {
    fn name(&self) -> &str;
    fn publish(&self, board: &Board) -> Result<()>;
}

/// Writes the board as a pretty JSON document.
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PresentationSink for JsonFileSink {
    fn name(&self) -> &str {
        "json-file"
    }

    fn publish(&self, board: &Board) -> Result<()> {
        let json = board.to_json()?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("failed to write board to {}", self.path.display()))?;
        info!(path = %self.path.display(), panels = board.panels.len(), "board written");
        Ok(())
    }
}

/// Prints the board JSON to stdout.
pub struct StdoutSink;

impl PresentationSink for StdoutSink {
    fn name(&self) -> &str {
        "stdout"
    }

    fn publish(&self, board: &Board) -> Result<()> {
        let json = board.to_json()?;
        let mut out = std::io::stdout().lock();
        writeln!(out, "{}", json).context("failed to write board to stdout")?;
        Ok(())
    }
}

/// POSTs the board to a dashboard service.
pub struct HttpSink {
    url: String,
    token: String,
    workspace_id: Option<String>,
    timeout: Duration,
}

impl HttpSink {
    pub fn new(url: &str, token: &str, workspace_id: Option<&str>, timeout: Duration) -> Self {
        Self {
            url: url.to_string(),
            token: token.to_string(),
            workspace_id: workspace_id.map(String::from),
            timeout,
        }
    }

    /// Request body: the board plus the target workspace.
    pub fn payload(&self, board: &Board) -> serde_json::Value {
        serde_json::json!({
            "workspace_id": self.workspace_id,
            "board": board,
        })
    }
}

impl PresentationSink for HttpSink {
    fn name(&self) -> &str {
        "http"
    }

    fn publish(&self, board: &Board) -> Result<()> {
        let response = ureq::post(&self.url)
            .timeout(self.timeout)
            .set("Authorization", &format!("Bearer {}", self.token))
            .send_json(self.payload(board))
            .with_context(|| format!("dashboard request to {} failed", self.url))?;

        info!(
            url = %self.url,
            status = response.status(),
            panels = board.panels.len(),
            "board published"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::{ChartKind, HeaderRecord, IndicatorRecord, LayoutHints, ViewData};
    use tempfile::TempDir;

    fn layout() -> LayoutHints {
        LayoutHints {
            rows_size: 1,
            cols_size: 10,
            padding: "0,1,0,1".to_string(),
            x: None,
            y: None,
            x_axis_name: None,
            y_axis_name: None,
            option_modifications: None,
        }
    }

    fn header_view() -> View {
        View {
            kind: ChartKind::Html,
            title: None,
            layout: layout(),
            data: ViewData::Header(HeaderRecord {
                title: "t".to_string(),
                subtitle: "s".to_string(),
            }),
        }
    }

    fn indicator_view(n: usize) -> View {
        let records = (0..n)
            .map(|i| IndicatorRecord {
                title: format!("k{}", i),
                value: i.to_string(),
                color: "success".to_string(),
                align: "center".to_string(),
                variant: "topColor".to_string(),
            })
            .collect();
        View {
            kind: ChartKind::Indicator,
            title: None,
            layout: layout(),
            data: ViewData::Indicators(records),
        }
    }

    #[test]
    fn test_assemble_assigns_order() {
        let board = Board::assemble(
            "Sales",
            "Overview",
            vec![header_view(), header_view(), indicator_view(5), header_view()],
        );
        let orders: Vec<usize> = board.panels.iter().map(|p| p.order).collect();
        // Indicator group of 5 occupies slots 2..=7.
        assert_eq!(orders, vec![0, 1, 2, 8]);
    }

    #[test]
    fn test_assemble_empty() {
        let board = Board::assemble("Sales", "Overview", vec![]);
        assert!(board.panels.is_empty());
        assert_eq!(board.name, "Sales");
    }

    #[test]
    fn test_panel_json_is_flat() {
        let board = Board::assemble("Sales", "Overview", vec![header_view()]);
        let value: serde_json::Value = serde_json::from_str(&board.to_json().unwrap()).unwrap();
        assert_eq!(value["menu_path"], "Overview");
        assert_eq!(value["panels"][0]["order"], 0);
        assert_eq!(value["panels"][0]["kind"], "html");
        assert_eq!(value["panels"][0]["layout"]["cols_size"], 10);
    }

    #[test]
    fn test_json_file_sink() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("board.json");
        let sink = JsonFileSink::new(&path);

        let board = Board::assemble("Sales", "Overview", vec![header_view(), indicator_view(2)]);
        sink.publish(&board).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["panels"].as_array().unwrap().len(), 2);
        assert_eq!(value["panels"][1]["data"][1]["title"], "k1");
        assert_eq!(sink.name(), "json-file");
    }

    #[test]
    fn test_json_file_sink_bad_path() {
        let tmp = TempDir::new().unwrap();
        let sink = JsonFileSink::new(tmp.path().join("missing").join("board.json"));
        let board = Board::assemble("Sales", "Overview", vec![]);
        assert!(sink.publish(&board).is_err());
    }

    #[test]
    fn test_http_payload_carries_workspace() {
        let sink = HttpSink::new(
            "http://localhost:9/boards",
            "secret",
            Some("ws-1"),
            Duration::from_secs(5),
        );
        let board = Board::assemble("Sales", "Overview", vec![header_view()]);
        let payload = sink.payload(&board);
        assert_eq!(payload["workspace_id"], "ws-1");
        assert_eq!(payload["board"]["name"], "Sales");
        assert!(!payload.to_string().contains("secret"));
    }
}
