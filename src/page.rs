use std::time::{Duration, Instant};

use chromiumoxide::page::Page as CrPage;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::AutomationConfig;
use crate::element::Element;
use crate::error::{Error, Result};
use crate::fields::FormField;

/// Values that check a checkbox; anything else unchecks it.
const CHECKBOX_TRUTHY: &[&str] = &["yes", "true", "1", "on", "checked"];

/// Wrapper around a chromiumoxide Page with the operations the auto-fill
/// flow needs.
pub struct Page {
    inner: CrPage,
    default_timeout: Duration,
}

impl Page {
    pub(crate) fn new(inner: CrPage, default_timeout: Duration) -> Self {
        Self {
            inner,
            default_timeout,
        }
    }

    /// Returns a reference to the underlying chromiumoxide Page.
    pub fn inner(&self) -> &CrPage {
        &self.inner
    }

    // ── Navigation ──────────────────────────────────────────────────

    /// Navigate to the given URL and wait for the page to load.
    pub async fn goto(&self, url: &str) -> Result<()> {
        self.inner
            .goto(url)
            .await
            .map_err(|e| Error::NavigationError(e.to_string()))?;
        Ok(())
    }

    // ── Scripting ───────────────────────────────────────────────────

    /// Evaluate a JavaScript expression and deserialize its value.
    pub async fn eval_json<T: DeserializeOwned>(&self, expression: &str) -> Result<T> {
        let result = self
            .inner
            .evaluate(expression)
            .await
            .map_err(|e| Error::JsError(e.to_string()))?;
        result
            .into_value::<T>()
            .map_err(|e| Error::JsError(e.to_string()))
    }

    /// Evaluate a JavaScript expression without caring about the result.
    pub async fn evaluate_void(&self, expression: &str) -> Result<()> {
        self.inner
            .evaluate(expression)
            .await
            .map_err(|e| Error::JsError(e.to_string()))?;
        Ok(())
    }

    /// Poll a JavaScript expression every 100ms until it is truthy or the
    /// deadline passes.
    pub async fn wait_for_condition(&self, expression: &str, timeout: Duration) -> Result<()> {
        let interval = Duration::from_millis(100);
        let start = Instant::now();
        let probe = format!("!!({expression})");

        loop {
            if self.eval_json::<bool>(&probe).await.unwrap_or(false) {
                return Ok(());
            }
            if start.elapsed() >= timeout {
                return Err(Error::Timeout(format!(
                    "Timed out waiting for condition: {expression}"
                )));
            }
            tokio::time::sleep(interval).await;
        }
    }

    // ── Element queries ─────────────────────────────────────────────

    /// Find an element matching the given CSS selector.
    pub async fn find_element(&self, selector: &str) -> Result<Element> {
        let el = self
            .inner
            .find_element(selector)
            .await
            .map_err(|e| Error::ElementNotFound(e.to_string()))?;
        Ok(Element::new(el))
    }

    /// Wait for an element matching the given CSS selector to appear in the
    /// DOM. Polls every 100ms up to the configured default timeout.
    pub async fn wait_for_selector(&self, selector: &str) -> Result<Element> {
        let timeout = self.default_timeout;
        let interval = Duration::from_millis(100);
        let start = Instant::now();

        loop {
            match self.find_element(selector).await {
                Ok(el) => return Ok(el),
                Err(_) if start.elapsed() < timeout => {
                    tokio::time::sleep(interval).await;
                }
                Err(_) => {
                    return Err(Error::Timeout(format!(
                        "Timed out waiting for selector: {selector}"
                    )));
                }
            }
        }
    }

    // ── Form discovery ──────────────────────────────────────────────

    /// Collect every input, textarea and select inside the selected area as
    /// a [`FormField`] record, in DOM order.
    pub async fn form_fields(&self, area_selector: &str) -> Result<Vec<FormField>> {
        let selector_js = serde_json::to_string(area_selector)?;
        let js = format!(
            r#"
            JSON.stringify((() => {{
                const area = document.querySelector({selector_js});
                if (!area) return [];
                const fields = [];
                area.querySelectorAll('input, textarea, select').forEach(el => {{
                    const rect = el.getBoundingClientRect();
                    const label = el.closest('label') ||
                        (el.id ? document.querySelector(`label[for="${{el.id}}"]`) : null) ||
                        el.previousElementSibling;
                    fields.push({{
                        type: el.type || el.tagName.toLowerCase(),
                        label: label && label.textContent ? label.textContent.trim() : '',
                        placeholder: el.placeholder || '',
                        name: el.name || '',
                        id: el.id || '',
                        value: el.value || '',
                        required: !!el.required,
                        visible: rect.width > 0 && rect.height > 0,
                        selector: el.id ? '#' + el.id
                            : el.name ? `${{el.tagName.toLowerCase()}}[name="${{el.name}}"]`
                            : el.tagName.toLowerCase()
                    }});
                }});
                return fields;
            }})())
            "#
        );

        let result = self
            .inner
            .evaluate(js)
            .await
            .map_err(|e| Error::JsError(e.to_string()))?;
        let json_str: String = result
            .into_value()
            .map_err(|e| Error::JsError(e.to_string()))?;
        let fields: Vec<FormField> = serde_json::from_str(&json_str)?;
        debug!("found {} form fields in {area_selector}", fields.len());
        Ok(fields)
    }

    // ── Filling ─────────────────────────────────────────────────────

    /// Fill one form field with the resolved value, using a strategy picked
    /// by input type. Text-like fields are cleared and retyped with a
    /// per-keystroke delay to mimic a human.
    pub async fn fill_field(
        &self,
        field: &FormField,
        value: &str,
        automation: &AutomationConfig,
    ) -> Result<()> {
        let action_delay = Duration::from_millis(automation.action_delay_ms);
        tokio::time::sleep(action_delay).await;

        let element = self.wait_for_selector(&field.selector).await?;
        element.scroll_into_view().await?;
        tokio::time::sleep(action_delay).await;

        match field.r#type.as_str() {
            "text" | "email" | "tel" | "password" | "textarea" => {
                element.click().await?;
                self.clear_value(&field.selector).await?;
                tokio::time::sleep(action_delay).await;
                self.type_slowly(&element, value, automation.typing_delay_ms)
                    .await?;
            }
            "radio" => self.choose_radio(field, value).await?,
            "checkbox" => self.set_checkbox(field, value).await?,
            "select" | "select-one" => self.select_option(&field.selector, value).await?,
            _ => {}
        }

        debug!("filled {} ({})", field.selector, field.r#type);
        Ok(())
    }

    async fn type_slowly(&self, element: &Element, value: &str, delay_ms: u64) -> Result<()> {
        if delay_ms == 0 {
            return element.type_text(value).await;
        }
        let delay = Duration::from_millis(delay_ms);
        let mut buf = [0u8; 4];
        for ch in value.chars() {
            element.type_text(ch.encode_utf8(&mut buf)).await?;
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    async fn clear_value(&self, selector: &str) -> Result<()> {
        let selector_js = serde_json::to_string(selector)?;
        let js = format!(
            r#"
            (() => {{
                const el = document.querySelector({selector_js});
                if (el) {{
                    el.value = '';
                    el.dispatchEvent(new Event('input', {{ bubbles: true }}));
                }}
            }})()
            "#
        );
        self.evaluate_void(&js).await
    }

    /// Click the radio option whose label text overlaps the wanted value.
    async fn choose_radio(&self, field: &FormField, value: &str) -> Result<()> {
        let selector_js = serde_json::to_string(&field.selector)?;
        let value_js = serde_json::to_string(&value.to_lowercase())?;
        let js = format!(
            r#"
            (() => {{
                const wanted = {value_js};
                for (const radio of document.querySelectorAll({selector_js})) {{
                    const label = radio.closest('label') ||
                        (radio.id ? document.querySelector(`label[for="${{radio.id}}"]`) : null) ||
                        radio.nextElementSibling;
                    const text = label && label.textContent
                        ? label.textContent.trim().toLowerCase() : '';
                    if (text && (text.includes(wanted) || wanted.includes(text))) {{
                        radio.click();
                        return;
                    }}
                }}
            }})()
            "#
        );
        self.evaluate_void(&js).await
    }

    async fn set_checkbox(&self, field: &FormField, value: &str) -> Result<()> {
        let should_check = CHECKBOX_TRUTHY.contains(&value.to_lowercase().as_str());
        let selector_js = serde_json::to_string(&field.selector)?;
        let js = format!(
            r#"
            (() => {{
                const el = document.querySelector({selector_js});
                if (el && el.checked !== {should_check}) el.click();
            }})()
            "#
        );
        self.evaluate_void(&js).await
    }

    /// Select an option in a `<select>` element by its value attribute.
    async fn select_option(&self, selector: &str, value: &str) -> Result<()> {
        let selector_js = serde_json::to_string(selector)?;
        let value_js = serde_json::to_string(value)?;
        let js = format!(
            r#"
            (() => {{
                const el = document.querySelector({selector_js});
                if (!el) throw new Error('Element not found: ' + {selector_js});
                el.value = {value_js};
                el.dispatchEvent(new Event('change', {{ bubbles: true }}));
            }})()
            "#
        );
        self.evaluate_void(&js).await
    }
}
