//! Floating control panel injected into the target page.
//!
//! The panel is plain JS evaluated after navigation: two buttons (select a
//! form area, start auto-fill) and a status line. Selection state is parked
//! on `window.jobFormAutoFiller`, which the Rust side polls.

use std::time::Duration;

use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::page::Page;

/// How long to wait for the user to act on the panel.
const USER_WAIT: Duration = Duration::from_secs(300);

const PANEL_EXISTS: &str = "!!document.getElementById('job-form-autofiller-panel')";
const AREA_SELECTED: &str = "window.jobFormAutoFiller && window.jobFormAutoFiller.selectedArea";
const AUTOFILL_STARTED: &str =
    "window.jobFormAutoFiller && window.jobFormAutoFiller.startAutofill";

/// Inject the control panel. Idempotent: a page that already has the panel
/// is left untouched.
pub async fn inject(page: &Page) -> Result<()> {
    if page.eval_json::<bool>(PANEL_EXISTS).await? {
        return Ok(());
    }
    page.evaluate_void(PANEL_JS).await?;
    if !page.eval_json::<bool>(PANEL_EXISTS).await? {
        return Err(Error::JsError("control panel was not created".into()));
    }
    info!("control panel injected");
    Ok(())
}

/// Wait for the user to pick a form area; returns a CSS selector for it.
pub async fn wait_for_selection(page: &Page) -> Result<String> {
    info!("waiting for form area selection");
    page.wait_for_condition(AREA_SELECTED, USER_WAIT).await?;

    let selector: String = page
        .eval_json(
            r"
            (() => {
                const el = window.jobFormAutoFiller.selectedArea;
                if (el.id) return '#' + el.id;
                if (el.className) return '.' + el.className.split(' ').join('.');
                return el.tagName.toLowerCase();
            })()
            ",
        )
        .await?;
    info!("form area selected: {selector}");
    Ok(selector)
}

/// Wait for the user to press Start Auto-Fill.
pub async fn wait_for_start(page: &Page) -> Result<()> {
    info!("waiting for auto-fill start");
    page.wait_for_condition(AUTOFILL_STARTED, USER_WAIT).await
}

/// Update the status line in the panel. Best effort: a failure is logged,
/// never propagated.
pub async fn update_status(page: &Page, status: &str) {
    let result = async {
        let status_js = serde_json::to_string(status)?;
        let js = format!(
            "(() => {{ const el = document.getElementById('status-text'); \
             if (el) el.textContent = {status_js}; }})()"
        );
        page.evaluate_void(&js).await
    }
    .await;

    if let Err(e) = result {
        warn!("status update failed: {e}");
    }
}

/// Reset the panel and wait for the user to either pick another form area
/// (continue) or walk away (timeout ends the session).
pub async fn ask_continue(page: &Page) -> bool {
    if let Err(e) = page.evaluate_void(PANEL_RESET_JS).await {
        warn!("panel reset failed: {e}");
        return false;
    }
    page.wait_for_condition(AREA_SELECTED, USER_WAIT)
        .await
        .is_ok()
}

static PANEL_RESET_JS: &str = r"
(() => {
    const panel = document.getElementById('job-form-autofiller-panel');
    if (!panel) return;

    window.jobFormAutoFiller = window.jobFormAutoFiller || {};
    window.jobFormAutoFiller.selectedArea = null;
    window.jobFormAutoFiller.startAutofill = false;

    const selectBtn = document.getElementById('select-form-area-btn');
    if (selectBtn) {
        selectBtn.textContent = 'Select Form Area';
        selectBtn.style.background = '#4CAF50';
    }
    const startBtn = document.getElementById('start-autofill-btn');
    if (startBtn) {
        startBtn.disabled = true;
    }
    const statusEl = document.getElementById('status-text');
    if (statusEl) {
        statusEl.textContent = 'Select another form area to continue filling';
    }
})()
";

static PANEL_JS: &str = r"
(() => {
    if (document.getElementById('job-form-autofiller-panel')) return;

    const panel = document.createElement('div');
    panel.id = 'job-form-autofiller-panel';
    panel.style.cssText = [
        'position: fixed',
        'top: 20px',
        'right: 20px',
        'width: 250px',
        'background: #ffffff',
        'border: 2px solid #4CAF50',
        'border-radius: 8px',
        'box-shadow: 0 4px 12px rgba(0,0,0,0.15)',
        'padding: 15px',
        'z-index: 10000',
        'font-family: Arial, sans-serif',
        'font-size: 14px'
    ].join(';');

    panel.innerHTML =
        '<div style=\'margin-bottom: 10px; font-weight: bold; color: #4CAF50;\'>' +
        'Job Form AutoFiller</div>' +
        '<button id=\'select-form-area-btn\' style=\'width: 100%; padding: 8px; ' +
        'background: #4CAF50; color: white; border: none; border-radius: 4px; ' +
        'cursor: pointer; margin-bottom: 8px;\'>Select Form Area</button>' +
        '<button id=\'start-autofill-btn\' style=\'width: 100%; padding: 8px; ' +
        'background: #2196F3; color: white; border: none; border-radius: 4px; ' +
        'cursor: pointer; margin-bottom: 8px;\' disabled>Start Auto-Fill</button>' +
        '<div id=\'status-text\' style=\'font-size: 12px; color: #666;\'>' +
        'Ready to select form area</div>';

    document.body.appendChild(panel);

    let isSelecting = false;

    document.getElementById('select-form-area-btn').addEventListener('click', () => {
        if (isSelecting) {
            stopSelection();
        } else {
            startSelection();
        }
    });

    document.getElementById('start-autofill-btn').addEventListener('click', () => {
        window.jobFormAutoFiller = window.jobFormAutoFiller || {};
        window.jobFormAutoFiller.startAutofill = true;
    });

    function startSelection() {
        isSelecting = true;
        const btn = document.getElementById('select-form-area-btn');
        btn.textContent = 'Cancel Selection';
        btn.style.background = '#f44336';
        document.getElementById('status-text').textContent =
            'Click on the form area to select it';

        document.addEventListener('mouseover', highlightElement);
        document.addEventListener('click', selectElement);
        document.body.style.cursor = 'crosshair';
    }

    function stopSelection() {
        isSelecting = false;
        const btn = document.getElementById('select-form-area-btn');
        btn.textContent = 'Select Form Area';
        btn.style.background = '#4CAF50';

        document.removeEventListener('mouseover', highlightElement);
        document.removeEventListener('click', selectElement);
        document.body.style.cursor = 'default';

        document.querySelectorAll('.autofiller-highlight').forEach(el => {
            el.classList.remove('autofiller-highlight');
        });
    }

    function highlightElement(e) {
        if (!isSelecting) return;
        if (e.target.closest('#job-form-autofiller-panel')) return;

        document.querySelectorAll('.autofiller-highlight').forEach(el => {
            el.classList.remove('autofiller-highlight');
        });
        e.target.classList.add('autofiller-highlight');
    }

    function selectElement(e) {
        if (!isSelecting) return;
        if (e.target.closest('#job-form-autofiller-panel')) return;

        e.preventDefault();
        e.stopPropagation();

        window.jobFormAutoFiller = window.jobFormAutoFiller || {};
        window.jobFormAutoFiller.selectedArea = e.target;
        e.target.style.outline = '3px solid #4CAF50';

        stopSelection();

        const startBtn = document.getElementById('start-autofill-btn');
        startBtn.disabled = false;
        startBtn.style.background = '#2196F3';
        document.getElementById('status-text').textContent =
            'Form area selected. Ready to auto-fill!';
    }

    const style = document.createElement('style');
    style.textContent =
        '.autofiller-highlight { outline: 2px solid #ff9800 !important; ' +
        'outline-offset: 2px !important; }';
    document.head.appendChild(style);
})()
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panel_script_creates_expected_elements() {
        for id in ["job-form-autofiller-panel", "select-form-area-btn", "start-autofill-btn", "status-text"] {
            assert!(PANEL_JS.contains(id), "missing element id {id}");
        }
    }

    #[test]
    fn reset_script_clears_selection_state() {
        assert!(PANEL_RESET_JS.contains("selectedArea = null"));
        assert!(PANEL_RESET_JS.contains("startAutofill = false"));
    }

    #[test]
    fn poll_conditions_reference_the_shared_namespace() {
        assert!(AREA_SELECTED.contains("jobFormAutoFiller.selectedArea"));
        assert!(AUTOFILL_STARTED.contains("jobFormAutoFiller.startAutofill"));
    }
}
