//! Default bundler configuration templates.
//!
//! Values that have no JSON form are written as descriptor objects which the
//! process backends revive when they emit the bundler's config module:
//!
//! - `{ "$regex": "...", "$flags": "i" }` -> `RegExp`
//! - `{ "$plugin": "<module>", "$export": "a.b", "$options": {...}, "$construct": bool }`
//!   -> plugin instance (`new` unless `$construct` is `false`)
//! - `{ "$resolve": "<module path>" }` -> `require.resolve(...)`

use serde_json::{json, Value};

use crate::config::ResolvedConfig;
use crate::merge::{merge, ConfigTree, MergeKey, MergeResolver};
use crate::paths::MODULE_FILE_EXTENSIONS;

/// Inputs shared by all templates.
#[derive(Debug, Clone, Copy)]
pub struct TemplateContext<'a> {
    pub config: &'a ResolvedConfig,
}

impl<'a> TemplateContext<'a> {
    pub fn new(config: &'a ResolvedConfig) -> Self {
        Self { config }
    }

    fn name(&self) -> &str {
        &self.config.name
    }

    fn build_path(&self) -> String {
        self.config.paths.app_build.to_string_lossy().into_owned()
    }

    fn entry(&self) -> String {
        self.config.paths.app_index_file.to_string_lossy().into_owned()
    }
}

/// `"widgets"` -> `"Widgets"`.
pub fn library_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn regex(pattern: &str) -> Value {
    json!({ "$regex": pattern })
}

fn plugin(module: &str, export: Option<&str>, options: Value) -> Value {
    let mut descriptor = json!({ "$plugin": module, "$options": options });
    if let Some(export) = export {
        descriptor["$export"] = json!(export);
    }
    descriptor
}

fn factory(module: &str, export: Option<&str>, options: Value) -> Value {
    let mut descriptor = plugin(module, export, options);
    descriptor["$construct"] = json!(false);
    descriptor
}

fn object(value: Value) -> ConfigTree {
    match value {
        Value::Object(map) => map,
        _ => ConfigTree::new(),
    }
}

fn extensions() -> Vec<String> {
    MODULE_FILE_EXTENSIONS.iter().map(|ext| format!(".{ext}")).collect()
}

/// Babel presets and plugins shared by both bundlers.
pub fn babel_options(ctx: &TemplateContext<'_>) -> Value {
    let mut options = json!({
        "presets": ["@babel/env", "@babel/typescript"],
        "plugins": [
            "@babel/plugin-syntax-bigint",
            "@babel/plugin-proposal-object-rest-spread",
            "@babel/plugin-proposal-class-properties",
            "@babel/transform-runtime",
            "@babel/plugin-proposal-numeric-separator"
        ],
        "sourceType": "unambiguous",
        "babelrc": false,
        "configFile": false
    });

    let paths = &ctx.config.paths;
    if paths.has_browserslist_config() {
        options["browserslistConfigFile"] = json!(paths.browserslist_config.to_string_lossy());
    } else {
        options["targets"] = json!(ctx.config.settings.browserslist);
    }
    options
}

pub fn babel_loader(ctx: &TemplateContext<'_>) -> Value {
    let mut options = babel_options(ctx);
    options["cacheDirectory"] = json!(true);
    options["cacheCompression"] = json!(false);

    json!({
        "test": regex(r"\.(ts|js)x?$"),
        "exclude": regex("(node_modules|bower_components)"),
        "use": { "loader": "babel-loader", "options": options }
    })
}

/// Generic callback-bundler base shared by every callback target.
pub fn callback_base(ctx: &TemplateContext<'_>) -> ConfigTree {
    object(json!({
        "mode": "production",
        "devtool": "source-map",
        "entry": ctx.entry(),
        "target": "web",
        "output": {
            "path": ctx.build_path(),
            "library": {}
        },
        "resolve": {
            "extensions": extensions(),
            "alias": {
                "bn.js": { "$resolve": "bn.js/lib/bn.js" }
            }
        },
        "plugins": [
            plugin("webpack", Some("IgnorePlugin"), json!({
                "resourceRegExp": regex(r"^\./wordlists/(?!english)"),
                "contextRegExp": regex(r"bip39/src$")
            }))
        ],
        "module": {
            "rules": [babel_loader(ctx)]
        },
        "node": {}
    }))
}

pub fn cjs(ctx: &TemplateContext<'_>) -> ConfigTree {
    let mut externals: Vec<Value> = ctx
        .config
        .manifest
        .dependencies
        .keys()
        .map(|dep| json!(dep))
        .collect();
    externals.push(json!({ "$regex": "^(@babel/runtime)", "$flags": "i" }));
    externals.push(factory("webpack-node-externals", None, Value::Null));

    object(json!({
        "optimization": { "minimize": false },
        "output": {
            "filename": format!("{}.cjs.js", ctx.name()),
            "library": { "type": "commonjs2" }
        },
        "plugins": [],
        "externals": externals,
        "externalsPresets": { "node": true },
        "node": {}
    }))
}

pub fn umd(ctx: &TemplateContext<'_>) -> ConfigTree {
    let settings = &ctx.config.settings;

    object(json!({
        "output": {
            "filename": format!("{}.umd.min.js", ctx.name()),
            "library": {
                "type": "umd",
                "name": library_name(ctx.name())
            }
        },
        "plugins": [
            plugin("webpack", Some("optimize.LimitChunkCountPlugin"), json!({ "maxChunks": 1 })),
            plugin("webpack-bundle-analyzer", Some("BundleAnalyzerPlugin"), json!({
                "analyzerMode": settings.analyzer_mode.as_str(),
                "openAnalyzer": false
            })),
            plugin("webpack", Some("ProvidePlugin"), json!({ "Buffer": ["buffer", "Buffer"] })),
            plugin("webpack", Some("ProvidePlugin"), json!({ "process": "process/browser.js" }))
        ],
        "resolve": {
            "fallback": Value::Object(polyfill_fallback(&settings.polyfill_node_deps))
        }
    }))
}

/// Generic streaming-bundler base shared by every streaming target.
pub fn streaming_base(ctx: &TemplateContext<'_>) -> ConfigTree {
    let mut babel = babel_options(ctx);
    babel["babelHelpers"] = json!("runtime");
    babel["extensions"] = json!(extensions());
    babel["exclude"] = json!("node_modules/**");

    let mut external: Vec<Value> = ctx
        .config
        .manifest
        .external_names()
        .into_iter()
        .map(Value::String)
        .collect();
    external.push(regex("^@babel/runtime"));

    object(json!({
        "input": ctx.entry(),
        "external": external,
        "plugins": [
            factory("@rollup/plugin-node-resolve", None, json!({ "extensions": extensions() })),
            factory("@rollup/plugin-babel", Some("babel"), babel)
        ]
    }))
}

/// ES module build output, applied beneath [`streaming_base`].
pub fn esm(ctx: &TemplateContext<'_>) -> ConfigTree {
    object(json!({
        "output": [{
            "file": format!("{}/{}.esm.js", ctx.build_path(), ctx.name()),
            "format": "es",
            "sourcemap": true
        }]
    }))
}

/// Browser polyfills for Node core modules.
pub fn default_polyfills() -> ConfigTree {
    object(json!({
        "http": { "$resolve": "stream-http/index.js" },
        "https": { "$resolve": "https-browserify/index.js" },
        "os": { "$resolve": "os-browserify/browser.js" },
        "crypto": { "$resolve": "crypto-browserify/index.js" },
        "assert": { "$resolve": "assert/build/assert.js" },
        "stream": { "$resolve": "stream-browserify/index.js" },
        "url": { "$resolve": "url/url.js" },
        "buffer": { "$resolve": "buffer/index.js" },
        "zlib": { "$resolve": "browserify-zlib/lib/index.js" },
        "fs": false,
        "path": false
    }))
}

/// Resolver for polyfill overrides: `true` keeps the default, a string
/// replaces it, anything else uses the default merge.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolyfillResolver;

impl MergeResolver for PolyfillResolver {
    fn resolve(&self, base: &Value, over: &Value, _key: MergeKey<'_>) -> Option<Value> {
        match over {
            Value::Bool(true) => Some(base.clone()),
            Value::String(_) => Some(over.clone()),
            _ => None,
        }
    }
}

/// Merge user polyfill overrides into [`default_polyfills`].
pub fn polyfill_fallback(user: &ConfigTree) -> ConfigTree {
    merge(&default_polyfills(), user, &PolyfillResolver)
}
