//! Library-level tests: custom plugins driven through the full pipeline

use std::sync::Arc;

use serde::Deserialize;
use sourcedocs::test_utils::{MemoryFs, TestTree};
use sourcedocs::{
    CommentToken, Config, DocNode, LineCursor, LocalFs, NodeId, NodeMetadata, ParserContext,
    ParserPlugin, Pipeline, PipelineError, PluginRegistry, SourceLocation, core_plugin,
    define_command,
};

#[derive(Deserialize)]
struct CalloutArgs {
    kind: String,
    #[serde(default)]
    collapsed: bool,
}

/// `@callout kind=<kind> [collapsed]` followed by comment lines up to the
/// first non-comment line.
fn callout_plugin() -> ParserPlugin {
    ParserPlugin::new("callouts", "1.0.0").command(
        "callout",
        define_command(
            |cursor: &mut LineCursor, ctx: &ParserContext<'_>, args: CalloutArgs| {
                cursor.next();
                let body: Vec<String> = cursor
                    .take_until(|line| ctx.stripper.strip(line).is_none())
                    .iter()
                    .filter_map(|line| ctx.stripper.strip(line))
                    .collect();
                let end = cursor.current_index().saturating_sub(1);
                let text = body.join(" ");

                Some(
                    DocNode::new(
                        NodeId::scoped(ctx.file, &format!("callout-{}", ctx.start_line)),
                        "callout",
                    )
                    .with_attribute("kind", args.kind)
                    .with_attribute("collapsed", args.collapsed)
                    .with_attribute("text", text.as_str())
                    .with_metadata(NodeMetadata::new(
                        SourceLocation::span(ctx.file, ctx.start_line, end),
                        &text,
                    )),
                )
            },
        ),
    )
}

fn registry() -> PluginRegistry {
    let mut registry = PluginRegistry::new();
    registry.register(core_plugin()).register(callout_plugin());
    registry
}

#[test]
fn test_registered_plugins_in_order() {
    let registry = registry();
    let names: Vec<_> = registry
        .registered_plugins()
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(names, vec!["core", "callouts"]);
    assert_eq!(
        registry.command_map().names(),
        vec!["callout", "chapter", "snippet"]
    );
}

#[test]
fn test_custom_plugin_on_local_files() {
    let tree = TestTree::new();
    tree.add_file(
        "contracts/Vault.sol",
        "\
/// @callout kind=warning collapsed
/// Withdrawals are delayed
/// by one epoch.
contract Vault {}
/// @snippet id=deposit
function deposit() external {}
/// @end
",
    );

    let config = Config::default()
        .with_root(tree.path())
        .with_include(["contracts/**/*.sol"]);
    let pipeline = Pipeline::new(config, registry().into_command_map(), Arc::new(LocalFs));
    let nodes = pipeline.collect_nodes().unwrap();

    assert_eq!(nodes.len(), 2);
    let callout = &nodes[0];
    assert_eq!(callout.id, NodeId::new("contracts/Vault.sol:callout-0"));
    assert_eq!(callout.attributes["kind"], "warning");
    assert_eq!(callout.attributes["collapsed"], true);
    assert_eq!(
        callout.attributes["text"],
        "Withdrawals are delayed by one epoch."
    );
    let source = callout.source().unwrap();
    assert_eq!((source.start_line, source.end_line), (0, 2));

    assert_eq!(nodes[1].id, NodeId::new("contracts/Vault.sol:deposit"));
    assert_eq!(nodes[1].attributes["lang"], "solidity");
}

#[test]
fn test_custom_comment_token_on_memory_fs() {
    let fs = MemoryFs::new().with_file(
        "/repo/notes.yml",
        "# @callout kind=info\n# YAML too\nkey: value\n",
    );
    let config = Config::default()
        .with_root("/repo")
        .with_include(["*.yml"])
        .with_comment_token(".yml", CommentToken::Start("#".to_string()));
    let pipeline = Pipeline::new(config, registry().into_command_map(), Arc::new(fs));

    let nodes = pipeline.collect_nodes().unwrap();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].attributes["text"], "YAML too");
    assert_eq!(nodes[0].attributes["collapsed"], false);
}

#[test]
fn test_bad_custom_arguments_abort() {
    let fs = MemoryFs::new().with_file("/repo/a.ts", "/// @callout collapsed\n");
    let config = Config::default()
        .with_root("/repo")
        .with_include(["*.ts"]);
    let pipeline = Pipeline::new(config, registry().into_command_map(), Arc::new(fs));

    let err = pipeline.collect_nodes().unwrap_err();
    assert!(matches!(err, PipelineError::Parse(_)));
    assert!(err.to_string().contains("@callout"));
}

#[test]
fn test_serialized_node_shape() {
    let fs = MemoryFs::new().with_file("/repo/a.rs", "/// @chapter id=intro title=Intro\n");
    let config = Config::default()
        .with_root("/repo")
        .with_include(["*.rs"]);
    let pipeline = Pipeline::new(config, registry().into_command_map(), Arc::new(fs));

    let nodes = pipeline.collect_nodes().unwrap();
    let json = serde_json::to_value(&nodes[0]).unwrap();
    assert_eq!(json["id"], "a.rs:intro");
    assert_eq!(json["type"], "chapter");
    assert_eq!(json["children"], serde_json::json!([]));
    assert!(json.get("parentId").is_none());
    assert_eq!(json["metadata"]["source"]["absolutePath"], "/repo/a.rs");
    assert_eq!(json["metadata"]["source"]["language"], "rust");
    assert_eq!(json["metadata"]["pluginData"], serde_json::json!({}));
}
