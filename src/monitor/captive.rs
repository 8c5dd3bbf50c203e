//! Captive-portal detection.

use std::time::Duration;

use http::StatusCode;
use url::Url;

use crate::task::BoxFuture;

/// Default probe endpoint: answers `204 No Content` on an open network.
pub const DEFAULT_PROBE_URL: &str = "http://connectivitycheck.gstatic.com/generate_204";

/// Reports whether traffic is currently intercepted by a captive portal.
pub trait CaptivePortalCheck: Send + Sync {
    /// Returns true if a captive portal is intercepting traffic.
    ///
    /// Must not fail: inconclusive probes report `false`.
    fn is_restricted(&self) -> BoxFuture<'_, bool>;
}

/// Checker for hosts where portal detection is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverRestricted;

impl CaptivePortalCheck for NeverRestricted {
    fn is_restricted(&self) -> BoxFuture<'_, bool> {
        Box::pin(async { false })
    }
}

/// Probes a well-known "no content" URL over plain HTTP.
///
/// Redirects are not followed: a portal typically answers with a redirect
/// to its login page, and that redirect is the signal.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
    url: Url,
}

impl HttpProbe {
    /// Creates a probe for `url` with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(timeout)
            .build()?;
        Ok(Self { client, url })
    }

    /// The probed URL.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    async fn probe(&self) -> bool {
        match self.client.get(self.url.clone()).send().await {
            Ok(response) => {
                let restricted = classify_probe_status(response.status());
                tracing::debug!(status = %response.status(), restricted, "Captive portal probe");
                restricted
            }
            Err(error) => {
                // No connectivity at all is not a portal.
                tracing::debug!(error = %error, "Captive portal probe failed");
                false
            }
        }
    }
}

impl CaptivePortalCheck for HttpProbe {
    fn is_restricted(&self) -> BoxFuture<'_, bool> {
        Box::pin(self.probe())
    }
}

/// Classifies a probe response status.
///
/// `204` means open access. Any other success or redirect means something
/// answered in the probe server's place. Errors point at the probe server
/// itself and are not taken as a portal.
#[must_use]
pub fn classify_probe_status(status: StatusCode) -> bool {
    if status == StatusCode::NO_CONTENT {
        return false;
    }
    status.is_success() || status.is_redirection()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_content_is_open_access() {
        assert!(!classify_probe_status(StatusCode::NO_CONTENT));
    }

    #[test]
    fn redirect_is_restricted() {
        assert!(classify_probe_status(StatusCode::FOUND));
        assert!(classify_probe_status(StatusCode::TEMPORARY_REDIRECT));
    }

    #[test]
    fn login_page_is_restricted() {
        assert!(classify_probe_status(StatusCode::OK));
    }

    #[test]
    fn server_errors_are_not_restricted() {
        assert!(!classify_probe_status(StatusCode::NOT_FOUND));
        assert!(!classify_probe_status(StatusCode::SERVICE_UNAVAILABLE));
    }

    #[tokio::test]
    async fn never_restricted_reports_false() {
        assert!(!NeverRestricted.is_restricted().await);
    }

    #[test]
    fn probe_keeps_url() {
        let url = Url::parse(DEFAULT_PROBE_URL).unwrap();
        let probe = HttpProbe::new(url.clone(), Duration::from_secs(5)).unwrap();
        assert_eq!(probe.url(), &url);
    }
}
