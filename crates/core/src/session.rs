//! Session acquisition: browser launch, login, interstitial dismissal.

use tracing::debug;

use crate::config::ExporterConfig;
use crate::engine::{Browser, Element, Page};
use crate::error::{ExportError, Result};
use crate::selectors::Selectors;

/// An authenticated browser plus its primary page.
///
/// A session is exclusively owned by one in-flight export call and the
/// browser must never outlive that call: [`Session::acquire`] closes the
/// partially built browser on any login failure, and the caller closes it
/// through [`Session::close`] on every other path.
pub struct Session<B: Browser> {
    browser: B,
    page: B::Page,
}

impl<B: Browser> Session<B> {
    /// Logs in against the application base URL and returns the ready
    /// session. The browser is closed before any error propagates.
    pub async fn acquire(browser: B, config: &ExporterConfig, selectors: &Selectors) -> Result<Self> {
        match login(&browser, config, selectors).await {
            Ok(page) => Ok(Self { browser, page }),
            Err(err) => {
                if let Err(close_err) = browser.close().await {
                    debug!(target = "fleetx", error = %close_err, "browser close after failed login");
                }
                Err(err)
            }
        }
    }

    pub fn browser(&self) -> &B {
        &self.browser
    }

    pub fn page(&self) -> &B::Page {
        &self.page
    }

    /// Swaps the active page, used after a click opened a new tab that is
    /// now the export target.
    pub fn set_page(&mut self, page: B::Page) {
        self.page = page;
    }

    /// Tears the owned browser down.
    pub async fn close(self) -> Result<()> {
        self.browser.close().await
    }
}

async fn login<B: Browser>(browser: &B, config: &ExporterConfig, selectors: &Selectors) -> Result<B::Page> {
    let page = browser.new_page().await?;
    page.goto(&config.base_url, config.timeout).await?;
    page.wait_for_idle(config.timeout).await?;

    if page.find(selectors.login_form).await?.is_some() {
        debug!(target = "fleetx", user = %config.credentials.username, "login form present, signing in");
        fill_login_form(&page, config, selectors).await?;
        page.wait_for_idle(config.timeout).await?;
    } else {
        // No form means an existing cookie already authenticates.
        debug!(target = "fleetx", "login form absent, session already valid");
    }

    dismiss_interstitial(&page, config, selectors).await?;
    Ok(page)
}

async fn fill_login_form<P: Page>(page: &P, config: &ExporterConfig, selectors: &Selectors) -> Result<()> {
    let username = page
        .find(selectors.login_username)
        .await?
        .ok_or_else(|| ExportError::Login(format!("username field not found: {}", selectors.login_username)))?;
    let password = page
        .find(selectors.login_password)
        .await?
        .ok_or_else(|| ExportError::Login(format!("password field not found: {}", selectors.login_password)))?;
    let submit = page
        .find(selectors.login_submit)
        .await?
        .ok_or_else(|| ExportError::Login(format!("submit control not found: {}", selectors.login_submit)))?;

    username.type_text(&config.credentials.username).await?;
    password.type_text(&config.credentials.password).await?;
    submit.click().await?;
    Ok(())
}

/// Dismisses the post-login release-notes splash when it shows up.
async fn dismiss_interstitial<P: Page>(page: &P, config: &ExporterConfig, selectors: &Selectors) -> Result<()> {
    if let Some(cont) = page.find(selectors.interstitial_continue).await? {
        debug!(target = "fleetx", "dismissing post-login interstitial");
        cont.click().await?;
        page.wait_for_idle(config.timeout).await?;
    }
    Ok(())
}
