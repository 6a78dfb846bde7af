use crate::config::{GatewayConfig, SECRET_HEADER};
use crate::error::Denial;
use crate::request::{canonical_header_name, Request};
use crate::Secret;

/// Request-scoped logger used by the gateway.
///
/// Every message carries the request path. On denial it dumps the full set
/// of received headers at debug level, which is how operators diagnose
/// proxy misconfigurations; the value of the shared-secret header is always
/// written as `[REDACTED]`. The dump can be disabled with
/// `log_denied_headers = false`.
///
/// Request-supplied strings (path, header names and values) are recorded as
/// `Debug` fields so that embedded line breaks are escaped and cannot start
/// a new log line.
#[derive(Debug)]
pub(crate) struct GateLog<'a> {
    request: &'a Request,
    dump_headers: bool,
}

impl<'a> GateLog<'a> {
    pub(crate) fn new(request: &'a Request, config: &GatewayConfig) -> Self {
        Self {
            request,
            dump_headers: config.log_denied_headers,
        }
    }

    pub(crate) fn path(&self) -> &str {
        self.request.path()
    }

    pub(crate) fn discarded_header(&self, header: &str) {
        tracing::debug!(
            path = ?self.path(),
            header = %header,
            "Discarding unauthenticated remote user header"
        );
    }

    pub(crate) fn rejected_header(&self, header: &str) {
        tracing::debug!(
            path = ?self.path(),
            header = %header,
            "Rejecting remote user header with control characters"
        );
    }

    pub(crate) fn display_server(&self, host: &str) {
        tracing::debug!(path = ?self.path(), host = ?host, "Request from display server");
    }

    pub(crate) fn forwarded(&self, identity: Option<&str>) {
        tracing::debug!(
            path = ?self.path(),
            identity = identity.unwrap_or("<none>"),
            "Forwarding request"
        );
    }

    pub(crate) fn denied(&self, denial: &Denial) {
        tracing::debug!(
            path = ?self.path(),
            reason = %denial.reason(),
            "Denying request"
        );

        if !self.dump_headers {
            return;
        }

        let secret_header = canonical_header_name(SECRET_HEADER);
        for (name, value) in self.request.headers().iter() {
            if canonical_header_name(name) == secret_header {
                tracing::debug!(
                    path = ?self.path(),
                    header = ?name,
                    value = %Secret::new(value),
                    "Received header"
                );
            } else {
                tracing::debug!(
                    path = ?self.path(),
                    header = ?name,
                    value = ?value,
                    "Received header"
                );
            }
        }
    }

    pub(crate) fn config_error(&self, error: &crate::GatewayError) {
        tracing::error!(path = ?self.path(), error = %error, "Gateway misconfiguration");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DenialReason;

    #[test]
    fn gate_log_reports_request_path() {
        let request = Request::new("/user/create");
        let config = GatewayConfig::default();
        let log = GateLog::new(&request, &config);

        assert_eq!(log.path(), "/user/create");
    }

    #[test]
    fn denied_without_subscriber_does_not_panic() {
        let request = Request::new("/").with_header("GX_SECRET", "s3cr3t");
        let config = GatewayConfig::default();
        let log = GateLog::new(&request, &config);

        log.denied(&Denial::new(DenialReason::MissingUsername, "admin"));
    }
}
