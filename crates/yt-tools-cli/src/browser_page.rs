//! Page capabilities over a live browser context.
//!
//! Each capability is one JS snippet evaluated in the page. Snippets
//! return `JSON.stringify(...)` so `null` and structured values cross the
//! protocol as a plain string.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

use yt_tools::{PageDom, PlayerDataSource, PlayerResponse};

use crate::renderer::RenderContext;

/// Inline script bodies, in document order.
const INLINE_SCRIPTS_JS: &str = r#"JSON.stringify(
  Array.from(document.querySelectorAll('script:not([src])')).map(s => s.textContent || '')
)"#;

/// Only the captions subtree of the player response is read.
const PLAYER_RESPONSE_JS: &str = r#"JSON.stringify((() => {
  const r = window.ytInitialPlayerResponse;
  return r ? { captions: r.captions ?? null } : null;
})())"#;

fn text_of_js(selector: &str) -> String {
    let sel = js_string(selector);
    format!(
        "JSON.stringify((() => {{ const el = document.querySelector({sel}); \
         return el ? (el.innerText ?? el.textContent) : null; }})())"
    )
}

fn click_js(selector: &str) -> String {
    let sel = js_string(selector);
    format!(
        "JSON.stringify((() => {{ const el = document.querySelector({sel}); \
         if (!el) return false; el.click(); return true; }})())"
    )
}

/// Resolves once `selector` matches, watching DOM mutations, or `false` on timeout.
fn wait_for_element_js(selector: &str, timeout_ms: u64) -> String {
    let sel = js_string(selector);
    format!(
        r#"new Promise(resolve => {{
  if (document.querySelector({sel})) return resolve(JSON.stringify(true));
  const observer = new MutationObserver(() => {{
    if (document.querySelector({sel})) {{
      observer.disconnect();
      resolve(JSON.stringify(true));
    }}
  }});
  observer.observe(document.body || document.documentElement, {{ childList: true, subtree: true }});
  setTimeout(() => {{ observer.disconnect(); resolve(JSON.stringify(false)); }}, {timeout_ms});
}})"#
    )
}

fn js_string(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

/// A watch page shown in a renderer context.
pub struct BrowserPage {
    ctx: Box<dyn RenderContext>,
}

impl BrowserPage {
    pub fn new(ctx: Box<dyn RenderContext>) -> Self {
        Self { ctx }
    }

    /// Wait until `selector` appears, up to `timeout`. Returns whether it did.
    pub async fn wait_for_element(&self, selector: &str, timeout: Duration) -> Result<bool> {
        let ms = timeout.as_millis() as u64;
        self.eval(&wait_for_element_js(selector, ms)).await
    }

    /// Close the underlying context.
    pub async fn close(self) -> Result<()> {
        self.ctx.close().await
    }

    async fn eval<T: DeserializeOwned>(&self, script: &str) -> Result<T> {
        let value = self.ctx.execute_js(script).await?;
        let encoded = value
            .as_str()
            .context("page script did not return a string")?;
        serde_json::from_str(encoded).context("unexpected page script result")
    }
}

#[async_trait]
impl PageDom for BrowserPage {
    async fn current_url(&self) -> Result<String> {
        self.ctx.get_url().await
    }

    async fn text_of(&self, selector: &str) -> Result<Option<String>> {
        self.eval(&text_of_js(selector)).await
    }

    async fn click(&self, selector: &str) -> Result<bool> {
        self.eval(&click_js(selector)).await
    }

    async fn inline_scripts(&self) -> Result<Vec<String>> {
        self.eval(INLINE_SCRIPTS_JS).await
    }
}

#[async_trait]
impl PlayerDataSource for BrowserPage {
    async fn player_response(&self) -> Result<Option<PlayerResponse>> {
        self.eval(PLAYER_RESPONSE_JS).await
    }
}
