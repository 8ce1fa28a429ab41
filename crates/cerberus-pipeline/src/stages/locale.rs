//! Locale and timezone detection stage.
//!
//! Reads the primary tag of `Accept-Language` (the text before the first
//! `,` or `;`) and the `X-Timezone` header, falling back to the configured
//! defaults. Never fails: a request with no preferences gets the platform
//! defaults.

use crate::stage::{Stage, StageFlow, StageKind};
use cerberus_config::LocaleConfig;
use cerberus_core::{AdmissionContext, BoxFuture, GateResult, RawRequest};

/// Stage 6: locale and timezone detection.
#[derive(Debug, Clone)]
pub struct LocaleStage {
    config: LocaleConfig,
}

impl LocaleStage {
    /// Creates the stage from its configuration section.
    #[must_use]
    pub fn new(config: &LocaleConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Extracts the primary language tag from an `Accept-Language` value.
    fn primary_tag(value: &str) -> Option<&str> {
        let tag = value.split([',', ';']).next()?.trim();
        (!tag.is_empty()).then_some(tag)
    }
}

impl Default for LocaleStage {
    fn default() -> Self {
        Self::new(&LocaleConfig::default())
    }
}

impl Stage for LocaleStage {
    fn name(&self) -> &'static str {
        StageKind::Locale.name()
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut AdmissionContext,
        request: &'a RawRequest,
    ) -> BoxFuture<'a, GateResult<StageFlow>> {
        Box::pin(async move {
            let locale = request
                .header(&self.config.language_header)
                .and_then(Self::primary_tag)
                .unwrap_or(&self.config.default_locale);

            let timezone = request
                .header(&self.config.timezone_header)
                .map(str::trim)
                .filter(|tz| !tz.is_empty())
                .unwrap_or(&self.config.default_timezone);

            ctx.set_locale(locale);
            ctx.set_timezone(timezone);
            Ok(StageFlow::Continue)
        })
    }
}
