//! Target derivation: flags, extras and ordering.

use sether_config::{derive, BackendKind, BuiltinTarget, ConfigTree, StrategyTable, UserOverrides};
use serde_json::{json, Value};

fn tree(value: Value) -> ConfigTree {
    serde_json::from_value(value).expect("object")
}

fn builtin(name: &str, enabled: bool) -> BuiltinTarget {
    BuiltinTarget::new(
        name,
        BackendKind::CallbackBundler,
        enabled,
        tree(json!({ "output": { "filename": format!("lib.{name}.js") }, "plugins": [name] })),
    )
}

#[test]
fn nothing_enabled_yields_empty() {
    let configs = derive(
        &tree(json!({ "mode": "production" })),
        &[builtin("a", false), builtin("b", false)],
        &UserOverrides::default(),
        &StrategyTable::bundler_defaults(),
    );
    assert!(configs.is_empty());
}

#[test]
fn enabled_builtins_then_extras_in_declaration_order() {
    let section = tree(json!({
        "bConfig": { "devtool": false },
        "legacy": { "output": { "filename": "lib.legacy.js" }, "target": "es5" }
    }));
    let overrides =
        UserOverrides::from_section("webpack", &section, &["a", "b"], BackendKind::CallbackBundler)
            .unwrap();

    let configs = derive(
        &tree(json!({ "mode": "production", "plugins": ["base"] })),
        &[builtin("a", true), builtin("b", false)],
        &overrides,
        &StrategyTable::bundler_defaults(),
    );

    let names: Vec<_> = configs.iter().map(|c| c.name()).collect();
    assert_eq!(names, vec!["a", "legacy"]);
}

#[test]
fn extras_receive_generic_base_only() {
    let overrides = UserOverrides {
        shared_base: tree(json!({ "plugins": ["shared"] })),
        extra: [(
            "legacy".to_string(),
            tree(json!({ "output": { "filename": "lib.legacy.js" }, "plugins": ["legacy"] })),
        )]
        .into_iter()
        .collect(),
        ..Default::default()
    };

    let configs = derive(
        &tree(json!({ "mode": "production", "plugins": ["base"] })),
        &[builtin("a", true)],
        &overrides,
        &StrategyTable::bundler_defaults(),
    );

    assert_eq!(configs.len(), 2);
    let a = configs[0].tree();
    assert_eq!(a["plugins"], json!(["a", "base", "shared"]));
    assert_eq!(a["mode"], json!("production"));

    let legacy = configs[1].tree();
    assert_eq!(configs[1].backend(), BackendKind::CallbackBundler);
    assert_eq!(legacy["plugins"], json!(["base", "shared", "legacy"]));
    assert_eq!(legacy["output"], json!({ "filename": "lib.legacy.js" }));
}

#[test]
fn extras_use_family_backend() {
    let section = tree(json!({ "modern": { "output": { "file": "dist/lib.modern.js" } } }));
    let overrides =
        UserOverrides::from_section("rollup", &section, &["esm"], BackendKind::StreamingBundler)
            .unwrap();

    let configs = derive(&ConfigTree::new(), &[], &overrides, &StrategyTable::new());
    assert_eq!(configs.len(), 1);
    assert_eq!(configs[0].backend(), BackendKind::StreamingBundler);
}

#[test]
fn configs_are_independent_copies() {
    let overrides = UserOverrides {
        shared_base: tree(json!({ "plugins": [{ "$plugin": "webpack", "$export": "ProvidePlugin" }] })),
        ..Default::default()
    };

    let mut configs = derive(
        &ConfigTree::new(),
        &[builtin("a", true), builtin("b", true)],
        &overrides,
        &StrategyTable::bundler_defaults(),
    );

    let mut first = configs.remove(0).into_tree();
    first["plugins"].as_array_mut().unwrap().clear();

    assert_eq!(configs[0].name(), "b");
    assert_eq!(configs[0].tree()["plugins"].as_array().unwrap().len(), 2);
}
