//! Tenant resolution stage.
//!
//! Every request must resolve to exactly one tenant before anything else is
//! decided about it. The default strategy reads the primary tenant header,
//! falling back to the alias header; deployments with other conventions
//! (subdomains mapped into a header, tenant claims in a gateway header)
//! plug in a resolver closure instead.

use crate::stage::{Stage, StageFlow, StageKind};
use cerberus_config::TenantConfig;
use cerberus_core::{AdmissionContext, BoxFuture, GateError, GateResult, RawRequest};
use http::HeaderMap;
use std::sync::Arc;

/// Pluggable tenant resolution strategy.
pub type TenantResolverFn = Arc<dyn Fn(&HeaderMap) -> Option<String> + Send + Sync>;

/// Stage 2: tenant resolution.
///
/// Pure function of the request headers; no side effects.
#[derive(Clone)]
pub struct TenantStage {
    primary_header: String,
    alias_header: String,
    resolver: Option<TenantResolverFn>,
}

impl std::fmt::Debug for TenantStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantStage")
            .field("primary_header", &self.primary_header)
            .field("alias_header", &self.alias_header)
            .field("resolver", &self.resolver.is_some())
            .finish()
    }
}

impl TenantStage {
    /// Creates the stage with the default header strategy.
    #[must_use]
    pub fn new(config: &TenantConfig) -> Self {
        Self {
            primary_header: config.primary_header.clone(),
            alias_header: config.alias_header.clone(),
            resolver: None,
        }
    }

    /// Replaces the header strategy with a custom resolver.
    #[must_use]
    pub fn with_resolver(mut self, resolver: TenantResolverFn) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Resolves the tenant from the request headers.
    fn resolve(&self, request: &RawRequest) -> Option<String> {
        if let Some(resolver) = &self.resolver {
            return resolver(request.headers());
        }

        request
            .header(&self.primary_header)
            .or_else(|| request.header(&self.alias_header))
            .map(ToString::to_string)
    }
}

impl Default for TenantStage {
    fn default() -> Self {
        Self::new(&TenantConfig::default())
    }
}

impl Stage for TenantStage {
    fn name(&self) -> &'static str {
        StageKind::Tenant.name()
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut AdmissionContext,
        request: &'a RawRequest,
    ) -> BoxFuture<'a, GateResult<StageFlow>> {
        Box::pin(async move {
            let tenant_id = self.resolve(request).filter(|t| !t.is_empty()).ok_or_else(|| {
                GateError::missing_tenant(format!(
                    "neither '{}' nor '{}' identified a tenant",
                    self.primary_header, self.alias_header
                ))
            })?;

            tracing::debug!(tenant_id = %tenant_id, "tenant resolved");
            ctx.set_tenant_id(tenant_id);
            Ok(StageFlow::Continue)
        })
    }
}
