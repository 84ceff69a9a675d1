//! Page interaction sequence that brings a product page to an extractable
//! state.
//!
//! The steps run strictly in order:
//!
//! 1. navigate and wait for DOMContentLoaded (fatal on timeout)
//! 2. reject the cookie consent banner, if it shows up
//! 3. settle
//! 4. answer the country prompt, if it shows up
//! 5. settle
//! 6. wait for the product data script (fatal on timeout)
//!
//! Steps 2 and 4 depend on geo and session state and are often absent. A
//! prompt that shows up but cannot be operated is skipped as well.

use crate::config::Timeouts;
use crate::error::ScrapeError;
use crate::trendyol::countries::Country;
use crate::trendyol::selectors;
use crate::trendyol::session::{CancelSignal, PageSession, WaitOutcome};
use std::time::Duration;
use tracing::{debug, info, warn};

/// An interaction that only happens if its trigger element appears.
#[derive(Debug, Clone, Copy)]
pub enum OptionalStep {
    /// Click "Reject All" on the consent banner.
    DismissConsent,
    /// Pick the country in the geo prompt and confirm.
    SelectCountry(Country),
}

impl OptionalStep {
    fn trigger(&self) -> &'static str {
        match self {
            OptionalStep::DismissConsent => selectors::CONSENT_REJECT,
            OptionalStep::SelectCountry(_) => selectors::COUNTRY_SELECT,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            OptionalStep::DismissConsent => "consent banner",
            OptionalStep::SelectCountry(_) => "country prompt",
        }
    }
}

/// Drives `page` from a blank tab to the point where the product script is
/// attached.
pub async fn prepare_page(
    page: &dyn PageSession,
    url: &str,
    country: Country,
    timeouts: &Timeouts,
    cancel: &CancelSignal,
) -> Result<(), ScrapeError> {
    debug!("Navigating to {}", url);
    cancel.guard(page.goto(url, timeouts.navigation())).await?;

    try_step(page, OptionalStep::DismissConsent, timeouts.consent(), cancel).await?;
    settle(timeouts.settle(), cancel).await?;

    try_step(page, OptionalStep::SelectCountry(country), timeouts.country(), cancel).await?;
    settle(timeouts.settle(), cancel).await?;

    debug!("Waiting for product data script");
    match cancel.guard(page.wait_for_attached(selectors::PRODUCT_SCRIPT, timeouts.data())).await? {
        WaitOutcome::Attached => Ok(()),
        WaitOutcome::TimedOut => Err(ScrapeError::DataNotReady { timeout_ms: timeouts.data_ms }),
    }
}

/// Runs `step` if its trigger element appears within `budget`.
///
/// Returns `Ok(true)` once the step's action ran and `Ok(false)` when the
/// element never showed up or the action failed. Only cancellation is an
/// error.
pub async fn try_step(
    page: &dyn PageSession,
    step: OptionalStep,
    budget: Duration,
    cancel: &CancelSignal,
) -> Result<bool, ScrapeError> {
    if cancel.guard(page.wait_for_attached(step.trigger(), budget)).await? == WaitOutcome::TimedOut
    {
        info!("No {} within {}ms, continuing", step.name(), budget.as_millis());
        return Ok(false);
    }

    match cancel.guard(run_step(page, step)).await {
        Ok(()) => {
            debug!("Handled {}", step.name());
            Ok(true)
        }
        Err(ScrapeError::Cancelled) => Err(ScrapeError::Cancelled),
        Err(e) => {
            warn!("Could not handle {}: {}. Continuing", step.name(), e);
            Ok(false)
        }
    }
}

async fn run_step(page: &dyn PageSession, step: OptionalStep) -> Result<(), ScrapeError> {
    match step {
        OptionalStep::DismissConsent => page.click(selectors::CONSENT_REJECT).await,
        OptionalStep::SelectCountry(country) => {
            page.select_option_by_label(selectors::COUNTRY_SELECT, country.display_name())
                .await?;
            page.click(selectors::COUNTRY_CONFIRM).await
        }
    }
}

async fn settle(pause: Duration, cancel: &CancelSignal) -> Result<(), ScrapeError> {
    if pause.is_zero() {
        return Ok(());
    }
    cancel
        .guard(async {
            tokio::time::sleep(pause).await;
            Ok(())
        })
        .await
}
