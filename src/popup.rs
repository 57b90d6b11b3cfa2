/// The popup action: switch the active page to its counterpart
use serde::Serialize;

use crate::converter::convert;
use crate::error::SwitchError;
use crate::host::{Host, Placement};
use crate::storage::{KeyValueStore, MappingStore};

/// What the popup page should show after a switch attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PopupOutcome {
    /// Navigation started; the popup has been asked to close
    Switched { target_url: String },
    /// Nothing configured for this page. `domain` is absent when the URL
    /// could not be parsed at all.
    NoMapping { domain: Option<String> },
    Unavailable { reason: String },
}

impl PopupOutcome {
    pub fn message(&self) -> String {
        match self {
            PopupOutcome::Switched { target_url } => format!("Switching to {}", target_url),
            PopupOutcome::NoMapping { domain: Some(domain) } => {
                format!("No mapping found for domain: {}", domain)
            }
            PopupOutcome::NoMapping { domain: None } => "No mapping found for this page".to_string(),
            PopupOutcome::Unavailable { reason } => reason.clone(),
        }
    }
}

/// Read the active URL, convert it against a fresh snapshot and navigate.
pub async fn run<H: Host, S: KeyValueStore>(
    host: &H,
    store: &MappingStore<S>,
    placement: Placement,
) -> PopupOutcome {
    let current_url = match host.active_url().await {
        Ok(Some(url)) => url,
        Ok(None) => {
            return PopupOutcome::Unavailable {
                reason: "Unable to get current tab URL".to_string(),
            };
        }
        Err(e) => {
            log::error!("Error reading active tab: {}", e);
            return PopupOutcome::Unavailable {
                reason: e.to_string(),
            };
        }
    };

    let mapping = store.load().await;

    match convert(&current_url, &mapping, store).await {
        Ok(target_url) => {
            if let Err(e) = host.navigate(&target_url, placement).await {
                log::error!("Error navigating to {}: {}", target_url, e);
                return PopupOutcome::Unavailable {
                    reason: e.to_string(),
                };
            }
            log::info!("Switching {} -> {}", current_url, target_url);
            host.close_popup();
            PopupOutcome::Switched { target_url }
        }
        Err(SwitchError::NoMappingConfigured { domain }) => {
            log::info!("No mapping configured for {}", domain);
            PopupOutcome::NoMapping {
                domain: Some(domain),
            }
        }
        Err(e) => {
            log::warn!("Cannot switch {}: {}", current_url, e);
            PopupOutcome::NoMapping { domain: None }
        }
    }
}

/// Open the options page and dismiss the popup
pub async fn open_settings<H: Host>(host: &H) -> Result<(), SwitchError> {
    host.open_settings().await?;
    host.close_popup();
    Ok(())
}
