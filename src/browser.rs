use chromiumoxide::browser::{Browser as CrBrowser, BrowserConfig as CrBrowserConfig};
use chromiumoxide::handler::viewport::Viewport;
use futures::StreamExt;
use tracing::info;

use crate::config::BrowserConfig;
use crate::error::{Error, Result};
use crate::page::Page;

/// Chrome flags for the automation session.
const LAUNCH_ARGS: &[&str] = &[
    "disable-gpu",
    "disable-dev-shm-usage",
    "disable-setuid-sandbox",
    "disable-web-security",
];

/// Key-value Chrome flags.
/// chromiumoxide adds the `--` prefix automatically, so keys must NOT include `--`.
const LAUNCH_KV_ARGS: &[(&str, &str)] = &[("disable-features", "IsolateOrigins,site-per-process")];

/// Owns the Chromium process for one auto-fill session.
pub struct FillerBrowser {
    browser: CrBrowser,
    default_timeout: std::time::Duration,
    _handler_task: tokio::task::JoinHandle<()>,
}

impl FillerBrowser {
    /// Launch a Chromium instance with the given configuration.
    pub async fn launch(config: &BrowserConfig) -> Result<Self> {
        let mut builder = CrBrowserConfig::builder();

        if config.headless {
            builder = builder.new_headless_mode().no_sandbox();
        } else {
            builder = builder.with_head().no_sandbox();
        }

        for arg in LAUNCH_ARGS {
            builder = builder.arg(*arg);
        }
        for (key, value) in LAUNCH_KV_ARGS {
            builder = builder.arg((*key, *value));
        }

        if let Some(ref path) = config.chrome_path {
            builder = builder.chrome_executable(path);
        }

        builder = builder.viewport(Viewport {
            width: config.viewport_width,
            height: config.viewport_height,
            device_scale_factor: None,
            emulating_mobile: false,
            is_landscape: false,
            has_touch: false,
        });

        let cr_config = builder
            .build()
            .map_err(|e| Error::LaunchError(e.to_string()))?;

        let (browser, mut handler) = CrBrowser::launch(cr_config)
            .await
            .map_err(|e| Error::LaunchError(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(_event) = handler.next().await {}
        });

        info!("browser started");

        Ok(Self {
            browser,
            default_timeout: config.default_timeout(),
            _handler_task: handler_task,
        })
    }

    /// Open a new page (tab) navigated to the given URL.
    pub async fn new_page(&self, url: &str) -> Result<Page> {
        let cr_page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| Error::NavigationError(e.to_string()))?;

        let page = Page::new(cr_page, self.default_timeout);
        page.goto(url).await?;
        Ok(page)
    }

    /// Close the browser and release the Chromium process.
    pub async fn close(mut self) -> Result<()> {
        self.browser.close().await.map_err(Error::CdpError)?;
        info!("browser closed");
        Ok(())
    }
}
