//! Resolution of a project's build targets.

use crate::config::ResolvedConfig;
use crate::defaults::{self, TemplateContext};
use crate::derive::{derive, BackendKind, BuiltinTarget, NamedConfig, UserOverrides};
use crate::error::Result;
use crate::merge::StrategyTable;

pub const ESM: &str = "esm";
pub const CJS: &str = "cjs";
pub const UMD: &str = "umd";

/// Derive every enabled target for the project.
///
/// The streaming family (`esm` and any `rollup` extras) comes first, then the
/// callback family (`cjs`, `umd`, then `webpack` extras).
pub fn resolve_targets(config: &ResolvedConfig) -> Result<Vec<NamedConfig>> {
    resolve_targets_with(config, &StrategyTable::bundler_defaults())
}

pub fn resolve_targets_with(config: &ResolvedConfig, strategies: &StrategyTable) -> Result<Vec<NamedConfig>> {
    let ctx = TemplateContext::new(config);
    let settings = &config.settings;

    let streaming_builtins = [BuiltinTarget::new(
        ESM,
        BackendKind::StreamingBundler,
        settings.esm,
        defaults::esm(&ctx),
    )];
    let streaming_overrides = UserOverrides::from_section(
        "rollup",
        &settings.rollup,
        &[ESM],
        BackendKind::StreamingBundler,
    )?;

    let callback_builtins = [
        BuiltinTarget::new(CJS, BackendKind::CallbackBundler, settings.cjs, defaults::cjs(&ctx)),
        BuiltinTarget::new(UMD, BackendKind::CallbackBundler, settings.umd, defaults::umd(&ctx)),
    ];
    let callback_overrides = UserOverrides::from_section(
        "webpack",
        &settings.webpack,
        &[CJS, UMD],
        BackendKind::CallbackBundler,
    )?;

    let mut targets = derive(
        &defaults::streaming_base(&ctx),
        &streaming_builtins,
        &streaming_overrides,
        strategies,
    );
    targets.extend(derive(
        &defaults::callback_base(&ctx),
        &callback_builtins,
        &callback_overrides,
        strategies,
    ));

    tracing::debug!(count = targets.len(), "resolved build targets");
    Ok(targets)
}
