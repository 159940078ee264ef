//! Uniqueness validator backed by a remote check

use super::stringify;
use crate::transport::{uniqueness_url, Request, Response, Transport, TransportError};
use crate::validators::*;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Asks the validation endpoint whether the value is already taken
///
/// Returns a pending [`Validation`] and resolves it from a task on the
/// current tokio runtime once the response arrives. The response body is
/// the message list. A failed request or a non-2xx status faults the
/// validation; it never resolves as valid.
pub struct UniquenessValidator;

impl UniquenessValidator {
    pub fn new() -> Self {
        Self
    }

    /// Apply a transport outcome to `validation`
    fn settle(validation: &Validation, url: &str, outcome: Result<Response, TransportError>) {
        let response = match outcome {
            Ok(response) => response,
            Err(e) => {
                warn!("🚫 Uniqueness request to {} failed: {}", url, e);
                validation.fail(e.into());
                return;
            }
        };

        if !response.is_success() {
            warn!("🚫 Uniqueness request to {} returned {}", url, response.status);
            validation.fail(
                TransportError::UnexpectedStatus {
                    status: response.status,
                    url: url.to_string(),
                }
                .into(),
            );
            return;
        }

        debug!("Uniqueness response from {}: {}", url, response.body);
        if let Err(e) = validation.resolve(response.body) {
            validation.fail(e);
        }
    }

    async fn fetch(
        transport: &dyn Transport,
        request: &Request,
        timeout: Option<Duration>,
    ) -> Result<Response, TransportError> {
        match timeout {
            Some(limit) => tokio::time::timeout(limit, transport.get(request))
                .await
                .unwrap_or(Err(TransportError::Timeout(limit.as_secs()))),
            None => transport.get(request).await,
        }
    }
}

impl Default for UniquenessValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for UniquenessValidator {
    fn validate(&self, ctx: &FieldContext, spec: &ValidatorSpec) -> Result<Validation, ValidationError> {
        let value = ctx.value();

        // The record being edited already holds this value.
        if spec.original_value.as_ref().and_then(stringify).as_deref() == Some(value.as_str()) {
            debug!("Uniqueness check skipped for {}: value unchanged", ctx.element.name());
            return Ok(Validation::valid());
        }

        let transport: Arc<dyn Transport> = ctx.transport.clone().ok_or_else(|| {
            ValidationError::Config("uniqueness validator requires a transport".to_string())
        })?;
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| ValidationError::Runtime(format!("uniqueness validator needs a tokio runtime: {}", e)))?;

        let url = uniqueness_url(&ctx.settings.engine_path, ctx.element.name(), &value);
        let request = Request::get(url, &ctx.settings.uniqueness.requested_with);
        let timeout = ctx.settings.uniqueness_timeout();

        info!("🔍 Checking uniqueness of {} via {}", ctx.element.name(), request.url);

        let validation = Validation::pending();
        let pending = validation.clone();
        runtime.spawn(async move {
            let outcome = Self::fetch(transport.as_ref(), &request, timeout).await;
            Self::settle(&pending, &request.url, outcome);
        });

        Ok(validation)
    }

    fn name(&self) -> &str {
        "uniqueness"
    }

    fn validator_type(&self) -> ValidatorType {
        ValidatorType::Builtin
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::spec;
    use super::*;
    use crate::config::Settings;
    use crate::transport::StaticTransport;
    use async_trait::async_trait;
    use serde_json::json;

    const URL: &str = "/judge/validate?class=user&attribute=username&value=joe&kind=uniqueness";

    fn ctx(transport: Arc<dyn Transport>) -> FieldContext {
        FieldContext::new(Arc::new(FormField::new("user[username]", "joe"))).with_transport(transport)
    }

    /// Transport that never answers
    struct SilentTransport;

    #[async_trait]
    impl Transport for SilentTransport {
        async fn get(&self, _request: &Request) -> Result<Response, TransportError> {
            std::future::pending().await
        }
    }

    async fn wait_for_settle(validation: &Validation) {
        for _ in 0..100 {
            if validation.is_resolved() || validation.fault().is_some() {
                return;
            }
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_empty_body_resolves_valid() {
        let transport = Arc::new(StaticTransport::new());
        transport.respond(URL, Ok(Response::new(200, "[]")));

        let validation = UniquenessValidator::new()
            .validate(&ctx(transport.clone()), &spec("uniqueness", json!({}), &[]))
            .unwrap();
        assert_eq!(validation.status(), Status::Pending);

        wait_for_settle(&validation).await;
        assert_eq!(validation.status(), Status::Valid);

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].header("X-Requested-With"), Some("XMLHttpRequest"));
    }

    #[tokio::test]
    async fn test_messages_from_body() {
        let transport = Arc::new(StaticTransport::new());
        transport.respond(URL, Ok(Response::new(200, r#"["has already been taken"]"#)));

        let validation = UniquenessValidator::new()
            .validate(&ctx(transport), &spec("uniqueness", json!({}), &[]))
            .unwrap();

        wait_for_settle(&validation).await;
        assert_eq!(validation.messages(), Some(vec!["has already been taken".to_string()]));
    }

    #[tokio::test]
    async fn test_non_success_status_faults() {
        let transport = Arc::new(StaticTransport::new());
        transport.respond(URL, Ok(Response::new(500, "oops")));

        let validation = UniquenessValidator::new()
            .validate(&ctx(transport), &spec("uniqueness", json!({}), &[]))
            .unwrap();

        wait_for_settle(&validation).await;
        assert!(!validation.is_resolved());
        assert_eq!(
            validation.fault(),
            Some(ValidationError::Transport(TransportError::UnexpectedStatus {
                status: 500,
                url: URL.to_string(),
            }))
        );
    }

    #[tokio::test]
    async fn test_transport_failure_faults() {
        let transport = Arc::new(StaticTransport::new());

        let validation = UniquenessValidator::new()
            .validate(&ctx(transport), &spec("uniqueness", json!({}), &[]))
            .unwrap();

        wait_for_settle(&validation).await;
        assert!(matches!(
            validation.fault(),
            Some(ValidationError::Transport(TransportError::Connection(_)))
        ));
    }

    #[tokio::test]
    async fn test_malformed_body_faults() {
        let transport = Arc::new(StaticTransport::new());
        transport.respond(URL, Ok(Response::new(200, "<html></html>")));

        let validation = UniquenessValidator::new()
            .validate(&ctx(transport), &spec("uniqueness", json!({}), &[]))
            .unwrap();

        wait_for_settle(&validation).await;
        assert!(matches!(validation.fault(), Some(ValidationError::MalformedPayload(_))));
    }

    #[tokio::test]
    async fn test_unchanged_value_skips_request() {
        let transport = Arc::new(StaticTransport::new());
        let mut rule = spec("uniqueness", json!({}), &[]);
        rule.original_value = Some(json!("joe"));

        let validation = UniquenessValidator::new().validate(&ctx(transport.clone()), &rule).unwrap();
        assert_eq!(validation.status(), Status::Valid);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_without_response_stays_pending() {
        let validation = UniquenessValidator::new()
            .validate(&ctx(Arc::new(SilentTransport)), &spec("uniqueness", json!({}), &[]))
            .unwrap();

        wait_for_settle(&validation).await;
        assert_eq!(validation.status(), Status::Pending);
        assert_eq!(validation.fault(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_faults() {
        let settings = Settings::from_toml_str("[uniqueness]\ntimeout_seconds = 2\n").unwrap();
        let ctx = ctx(Arc::new(SilentTransport)).with_settings(Arc::new(settings));

        let validation = UniquenessValidator::new()
            .validate(&ctx, &spec("uniqueness", json!({}), &[]))
            .unwrap();

        tokio::time::sleep(Duration::from_secs(3)).await;
        wait_for_settle(&validation).await;
        assert_eq!(
            validation.fault(),
            Some(ValidationError::Transport(TransportError::Timeout(2)))
        );
    }

    #[test]
    fn test_requires_transport() {
        let ctx = FieldContext::new(Arc::new(FormField::new("user[username]", "joe")));
        let result = UniquenessValidator::new().validate(&ctx, &spec("uniqueness", json!({}), &[]));
        assert!(matches!(result, Err(ValidationError::Config(_))));
    }

    #[test]
    fn test_requires_runtime() {
        let result = UniquenessValidator::new()
            .validate(&ctx(Arc::new(StaticTransport::new())), &spec("uniqueness", json!({}), &[]));
        assert!(matches!(result, Err(ValidationError::Runtime(_))));
    }
}
