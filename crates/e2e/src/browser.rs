//! Playwright browser automation
//!
//! The runner talks to the browser through the [`Automation`] contract; the
//! production implementation is [`PlaywrightHandle`], which stages a small
//! Node driver script in a temp directory and exchanges JSON lines with it
//! over stdin/stdout. One driver process owns one page for the whole suite,
//! so state filled into the target survives across commands.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command as TokioCommand};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{HarnessError, HarnessResult};

/// Capability contract consumed by the case runner.
///
/// `poll_text` is a bounded-wait operation: it suspends only the calling
/// case while repeatedly re-sampling the output surface, and fails with a
/// timeout-specific error carrying the last-seen value.
#[async_trait]
pub trait Automation: Send + Sync {
    /// Navigate the page, resolving relative paths against the target base.
    async fn navigate(&self, url: &str) -> HarnessResult<()>;

    /// Replace the current content of an input surface.
    async fn fill(&self, selector: &str, text: &str) -> HarnessResult<()>;

    /// Best-effort visibility probe, usable after a failure.
    async fn is_visible(&self, selector: &str) -> HarnessResult<bool>;

    /// Best-effort text read, usable after a failure.
    async fn read_text(&self, selector: &str) -> HarnessResult<String>;

    /// Repeatedly sample `selector` until its text strictly equals
    /// `expected` or `timeout` elapses. Read errors during the window are
    /// tolerated (the surface may not exist yet); the comparison itself
    /// preserves internal whitespace.
    async fn poll_text(
        &self,
        selector: &str,
        expected: &str,
        timeout: Duration,
        interval: Duration,
    ) -> HarnessResult<String> {
        let start = std::time::Instant::now();
        let mut last_seen = String::new();

        loop {
            match self.read_text(selector).await {
                Ok(text) => {
                    if text == expected {
                        return Ok(text);
                    }
                    last_seen = text;
                }
                Err(e) => {
                    debug!(selector, error = %e, "poll sample failed; retrying");
                }
            }

            if start.elapsed() >= timeout {
                return Err(HarnessError::Timeout {
                    selector: selector.to_string(),
                    last_seen,
                });
            }
            tokio::time::sleep(interval).await;
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

/// Configuration for the Playwright driver
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    pub base_url: String,
    pub browser: Browser,
    pub headless: bool,
    pub launch_timeout: Duration,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            browser: Browser::Chromium,
            headless: true,
            launch_timeout: Duration::from_secs(30),
        }
    }
}

/// Node driver program staged into a temp directory at launch.
///
/// Reads one JSON command per stdin line and answers with exactly one JSON
/// line, so the Rust side can correlate request and reply without framing.
const DRIVER_JS: &str = r#"
const { chromium, firefox, webkit } = require('playwright');
const readline = require('readline');

(async () => {
  const engines = { chromium, firefox, webkit };
  const engine = engines[process.argv[2]] || chromium;
  const browser = await engine.launch({ headless: process.argv[3] !== 'headed' });
  const page = await browser.newPage();
  console.log(JSON.stringify({ ok: true, ready: true }));

  const rl = readline.createInterface({ input: process.stdin });
  for await (const line of rl) {
    let cmd;
    try {
      cmd = JSON.parse(line);
    } catch (error) {
      console.log(JSON.stringify({ ok: false, error: 'bad command: ' + error.message }));
      continue;
    }
    try {
      switch (cmd.op) {
        case 'navigate':
          await page.goto(cmd.url);
          console.log(JSON.stringify({ ok: true }));
          break;
        case 'fill':
          await page.fill(cmd.selector, cmd.text);
          console.log(JSON.stringify({ ok: true }));
          break;
        case 'read_text': {
          const text = await page.locator(cmd.selector).innerText({ timeout: 1000 });
          console.log(JSON.stringify({ ok: true, text }));
          break;
        }
        case 'is_visible': {
          const visible = await page.locator(cmd.selector).isVisible();
          console.log(JSON.stringify({ ok: true, visible }));
          break;
        }
        case 'close':
          await browser.close();
          console.log(JSON.stringify({ ok: true }));
          process.exit(0);
        default:
          console.log(JSON.stringify({ ok: false, error: 'unknown op: ' + cmd.op }));
      }
    } catch (error) {
      console.log(JSON.stringify({ ok: false, error: error.message }));
    }
  }
  await browser.close();
})();
"#;

struct DriverIo {
    stdin: ChildStdin,
    lines: Lines<BufReader<ChildStdout>>,
}

/// Playwright-backed [`Automation`] implementation.
pub struct PlaywrightHandle {
    io: Mutex<DriverIo>,
    child: Child,
    base_url: String,
    // Keeps the staged driver script alive for the process lifetime.
    _driver_dir: tempfile::TempDir,
}

impl PlaywrightHandle {
    /// Check the install, stage the driver script, spawn Node, and wait for
    /// the driver's ready line.
    pub async fn launch(config: PlaywrightConfig) -> HarnessResult<Self> {
        Self::check_playwright_installed()?;

        let driver_dir = tempfile::tempdir()?;
        let script_path = driver_dir.path().join("driver.js");
        std::fs::write(&script_path, DRIVER_JS)?;

        debug!(
            script = %script_path.display(),
            browser = config.browser.as_str(),
            "spawning Playwright driver"
        );

        let mut child = TokioCommand::new("node")
            .arg(&script_path)
            .arg(config.browser.as_str())
            .arg(if config.headless { "headless" } else { "headed" })
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| HarnessError::Browser(format!("failed to spawn node: {e}")))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| HarnessError::Browser("driver stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| HarnessError::Browser("driver stdout unavailable".to_string()))?;
        let mut lines = BufReader::new(stdout).lines();

        let ready = tokio::time::timeout(config.launch_timeout, lines.next_line())
            .await
            .map_err(|_| HarnessError::Browser("driver did not become ready".to_string()))?
            .map_err(HarnessError::Io)?
            .ok_or_else(|| HarnessError::Browser("driver exited before ready".to_string()))?;
        let ready: serde_json::Value = serde_json::from_str(&ready)?;
        if !ready.get("ready").and_then(|v| v.as_bool()).unwrap_or(false) {
            return Err(HarnessError::Browser(format!("unexpected ready line: {ready}")));
        }

        Ok(Self {
            io: Mutex::new(DriverIo { stdin, lines }),
            child,
            base_url: config.base_url,
            _driver_dir: driver_dir,
        })
    }

    /// Check if Playwright is installed
    fn check_playwright_installed() -> HarnessResult<()> {
        let output = std::process::Command::new("npx")
            .args(["playwright", "--version"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match output {
            Ok(status) if status.success() => Ok(()),
            _ => Err(HarnessError::PlaywrightNotFound),
        }
    }

    /// Send one command line and read its one reply line.
    async fn command(&self, cmd: serde_json::Value) -> HarnessResult<serde_json::Value> {
        let mut io = self.io.lock().await;

        let mut line = serde_json::to_string(&cmd)?;
        line.push('\n');
        io.stdin.write_all(line.as_bytes()).await?;
        io.stdin.flush().await?;

        let reply = io
            .lines
            .next_line()
            .await?
            .ok_or_else(|| HarnessError::Browser("driver closed its output stream".to_string()))?;
        let value: serde_json::Value = serde_json::from_str(&reply)?;

        if value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false) {
            Ok(value)
        } else {
            Err(HarnessError::Browser(
                value
                    .get("error")
                    .and_then(|v| v.as_str())
                    .unwrap_or("unknown driver error")
                    .to_string(),
            ))
        }
    }

    fn resolve_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("{}{}", self.base_url.trim_end_matches('/'), url)
        }
    }

    /// Ask the driver to close the browser and wait for the process to end.
    pub async fn shutdown(mut self) -> HarnessResult<()> {
        if let Err(e) = self.command(json!({ "op": "close" })).await {
            warn!(error = %e, "driver close command failed; killing process");
        }
        let _ = self.child.wait().await;
        Ok(())
    }
}

#[async_trait]
impl Automation for PlaywrightHandle {
    async fn navigate(&self, url: &str) -> HarnessResult<()> {
        let url = self.resolve_url(url);
        self.command(json!({ "op": "navigate", "url": url })).await?;
        Ok(())
    }

    async fn fill(&self, selector: &str, text: &str) -> HarnessResult<()> {
        self.command(json!({ "op": "fill", "selector": selector, "text": text }))
            .await?;
        Ok(())
    }

    async fn is_visible(&self, selector: &str) -> HarnessResult<bool> {
        let reply = self
            .command(json!({ "op": "is_visible", "selector": selector }))
            .await?;
        Ok(reply.get("visible").and_then(|v| v.as_bool()).unwrap_or(false))
    }

    async fn read_text(&self, selector: &str) -> HarnessResult<String> {
        let reply = self
            .command(json!({ "op": "read_text", "selector": selector }))
            .await?;
        Ok(reply
            .get("text")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string())
    }
}
