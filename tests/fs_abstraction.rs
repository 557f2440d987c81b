use std::fs;
use std::path::Path;
use std::sync::Arc;

use wsrun::dag::Origin;
use wsrun::engine::{PlanRequest, resolve_plan};
use wsrun::fs::RealFileSystem;
use wsrun::fs::mock::MockFileSystem;
use wsrun::types::Propagation;
use wsrun::workspace::{ManifestReader, ScriptLookup, parse_workspace_info};

const INFO: &str = r#"{
    "app": { "location": "packages/app", "workspaceDependencies": ["lib", "tools"] },
    "lib": { "location": "packages/lib", "workspaceDependencies": [] },
    "tools": { "location": "packages/tools", "workspaceDependencies": ["lib"] }
}"#;

fn build_request() -> PlanRequest {
    PlanRequest {
        script: "build".to_string(),
        filters: vec!["^app$".to_string()],
        propagation: Propagation {
            upstream: true,
            downstream: false,
        },
    }
}

#[test]
fn test_plan_from_mock_manifests() {
    let fs = MockFileSystem::new();
    fs.add_file(
        "/repo/packages/app/package.json",
        br#"{ "name": "app", "scripts": { "build": "tsc", "start": "node ." } }"#,
    );
    fs.add_file(
        "/repo/packages/lib/package.json",
        br#"{ "name": "lib", "scripts": { "build": "tsc" } }"#,
    );
    // tools has no build script
    fs.add_file(
        "/repo/packages/tools/package.json",
        br#"{ "name": "tools", "scripts": { "lint": "eslint ." } }"#,
    );

    let info = parse_workspace_info(INFO.as_bytes(), Path::new("/repo")).unwrap();
    let manifests = ManifestReader::new(Arc::new(fs), "package.json");

    let resolved = resolve_plan(&info, &build_request(), &manifests).unwrap();

    assert_eq!(
        resolved.plan.names(),
        vec!["lib".to_string(), "app".to_string()]
    );
    assert_eq!(resolved.plan.missing_with_origin(Origin::Upstream), vec!["tools"]);
}

#[test]
fn test_plan_from_manifests_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    for (name, scripts) in [
        ("app", r#"{ "build": "tsc" }"#),
        ("lib", r#"{ "build": "tsc", "test": "jest" }"#),
        ("tools", r#"{ "build": "tsc" }"#),
    ] {
        let pkg_dir = root.join("packages").join(name);
        fs::create_dir_all(&pkg_dir).unwrap();
        fs::write(
            pkg_dir.join("package.json"),
            format!(r#"{{ "name": "{name}", "scripts": {scripts} }}"#),
        )
        .unwrap();
    }

    let info = parse_workspace_info(INFO.as_bytes(), root).unwrap();
    let manifests = ManifestReader::new(Arc::new(RealFileSystem), "package.json");

    assert!(manifests.has_script(&root.join("packages/lib"), "test"));
    assert!(!manifests.has_script(&root.join("packages/app"), "test"));

    let resolved = resolve_plan(&info, &build_request(), &manifests).unwrap();
    assert_eq!(
        resolved.plan.names(),
        vec!["lib".to_string(), "tools".to_string(), "app".to_string()]
    );
}

#[test]
fn test_missing_manifest_means_no_scripts() {
    let fs = MockFileSystem::new();
    let manifests = ManifestReader::new(Arc::new(fs), "package.json");

    assert!(manifests.scripts_of(Path::new("/repo/packages/ghost")).is_empty());
}
