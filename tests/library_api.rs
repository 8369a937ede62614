//! Integration tests for the layerguard library API.

use layerguard::model::{Layer, RuleKind, Severity};
use layerguard::{CheckOptions, Config, LayerguardError, Verdict, check};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_files(dir.path(), files);
    dir
}

fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (rel, content) in files {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
    }
}

fn root_of(dir: &TempDir) -> PathBuf {
    dir.path().canonicalize().unwrap()
}

#[test]
fn test_shared_may_not_reference_upward() {
    let dir = project(&[
        (
            "shared/format.ts",
            "import { a } from '../app/main';\n\
             import { o } from '../modules/orders/store';\n\
             import { t } from '../core/transport';\n\
             import { d } from './dates';\n\
             import React from 'react';\n",
        ),
        ("shared/dates.ts", "export const d = 1;\n"),
        ("app/main.ts", "export const a = 1;\n"),
        ("modules/orders/store.ts", "export const o = 1;\n"),
        ("core/transport.ts", "export const t = 1;\n"),
    ]);

    let report = check(dir.path(), CheckOptions::default()).unwrap();
    let hierarchy: Vec<_> = report
        .violations
        .iter()
        .filter(|v| v.rule == RuleKind::Hierarchy)
        .collect();

    assert_eq!(hierarchy.len(), 3);
    let targets: Vec<Layer> = hierarchy
        .iter()
        .map(|v| v.edge().unwrap().target.layer)
        .collect();
    assert!(targets.contains(&Layer::Application));
    assert!(targets.contains(&Layer::Module));
    assert!(targets.contains(&Layer::Core));
    assert!(hierarchy.iter().all(|v| v.severity == Severity::High));
}

#[test]
fn test_orders_ui_reaching_into_billing() {
    let dir = project(&[
        (
            "modules/orders/ui.ts",
            "import { orders } from './store';\nimport { invoices } from '../billing/store';\n",
        ),
        ("modules/orders/store.ts", "export const orders = [];\n"),
        ("modules/billing/store.ts", "export const invoices = [];\n"),
    ]);

    let report = check(dir.path(), CheckOptions::default()).unwrap();

    assert_eq!(report.count(RuleKind::Isolation), 1);
    assert_eq!(report.count(RuleKind::Hierarchy), 0);
    assert_eq!(report.high_count(), 1);
    assert_eq!(report.verdict, Verdict::Fail);

    let v = report
        .violations
        .iter()
        .find(|v| v.rule == RuleKind::Isolation)
        .unwrap();
    assert_eq!(v.file, root_of(&dir).join("modules/orders/ui.ts"));
    assert_eq!(v.line, Some(2));
}

#[test]
fn test_core_transport_reaching_into_module() {
    let dir = project(&[
        ("core/transport.ts", "import { load } from '../modules/orders/service';\n"),
        ("modules/orders/service.ts", "export const load = () => [];\n"),
    ]);

    let report = check(dir.path(), CheckOptions::default()).unwrap();
    assert_eq!(report.count(RuleKind::Hierarchy), 1);
    assert_eq!(report.high_count(), 1);
    assert_eq!(report.verdict, Verdict::Fail);
}

#[test]
fn test_type_only_removes_exactly_the_isolation_violation() {
    let files = [
        (
            "modules/orders/ui.ts",
            "import { Invoice } from '../billing/model';\nimport { t } from '../../core/transport';\n",
        ),
        ("modules/billing/model.ts", "export interface Invoice {}\n"),
        ("core/transport.ts", "export const t = 1;\n"),
    ];
    let dir = project(&files);
    let before = check(dir.path(), CheckOptions::default()).unwrap();
    assert_eq!(before.count(RuleKind::Isolation), 1);

    write_files(
        dir.path(),
        &[(
            "modules/orders/ui.ts",
            "import type { Invoice } from '../billing/model';\nimport { t } from '../../core/transport';\n",
        )],
    );
    let after = check(dir.path(), CheckOptions::default()).unwrap();

    assert_eq!(after.count(RuleKind::Isolation), 0);
    let remaining: Vec<_> = before
        .violations
        .iter()
        .filter(|v| v.rule != RuleKind::Isolation)
        .map(|v| (v.rule, v.severity, v.line, v.message.clone()))
        .collect();
    let now: Vec<_> = after
        .violations
        .iter()
        .map(|v| (v.rule, v.severity, v.line, v.message.clone()))
        .collect();
    assert_eq!(remaining, now);
    // Ui files may not reach the transport at all
    assert_eq!(after.count(RuleKind::Responsibility), 1);
}

#[test]
fn test_repeated_runs_are_byte_identical() {
    let dir = project(&[
        ("modules/a/index.ts", "import { b } from '../b';\nimport './gone';\n"),
        ("modules/b/index.ts", "import { a } from '../a';\nexport * from '../c/store';\n"),
        ("modules/c/store.ts", "const lazy = () => import('../a');\n"),
        ("scripts/tool.ts", "import '../modules/a';\n"),
    ]);

    let first = serde_json::to_string(&check(dir.path(), CheckOptions::default()).unwrap()).unwrap();
    let second = serde_json::to_string(&check(dir.path(), CheckOptions::default()).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_module_cycle_reported_once_regardless_of_names() {
    // files sort in a different order than the cycle's modules
    let dir = project(&[
        ("modules/zeta/index.ts", "import { alpha } from '../alpha';\n"),
        ("modules/alpha/index.ts", "import { mid } from '../mid';\n"),
        ("modules/mid/index.ts", "import { zeta } from '../zeta';\n"),
        ("modules/mid/types.ts", "import type { A } from '../alpha';\n"),
    ]);

    let report = check(dir.path(), CheckOptions::default()).unwrap();
    let cycles: Vec<Vec<String>> = report
        .violations
        .iter()
        .filter_map(|v| v.cycle().map(|c| c.to_vec()))
        .collect();

    assert_eq!(cycles, vec![vec!["alpha", "mid", "zeta"]]);
    assert_eq!(report.count(RuleKind::Cycle), 1);
}

#[test]
fn test_commented_references_are_ignored() {
    let dir = project(&[
        (
            "modules/orders/store.ts",
            "// import { x } from '../billing/store';\n/*\nimport { y } from '../billing/store';\n*/\nexport const s = 1;\n",
        ),
        ("modules/billing/store.ts", "export const x = 1;\n"),
    ]);

    let report = check(dir.path(), CheckOptions::default()).unwrap();
    assert_eq!(report.verdict, Verdict::Pass);
    assert_eq!(report.stats.edges, 0);
}

#[test]
fn test_reference_text_inside_strings_is_not_an_edge() {
    let dir = project(&[
        (
            "modules/orders/help.ts",
            "export const hint = \"use import('../billing/store') lazily\";\nexport const tpl = `require('../billing/store')`;\n",
        ),
        ("modules/billing/store.ts", "export const x = 1;\n"),
    ]);

    let report = check(dir.path(), CheckOptions::default()).unwrap();
    assert_eq!(report.stats.edges, 0);
    assert_eq!(report.verdict, Verdict::Pass);
}

#[test]
fn test_unresolved_and_outside_files_are_structural() {
    let dir = project(&[
        ("app/main.ts", "import { x } from './missing';\nimport React from 'react';\n"),
        ("tools/build.ts", "export const build = 1;\n"),
    ]);

    let report = check(dir.path(), CheckOptions::default()).unwrap();
    assert_eq!(report.count(RuleKind::Structural), 2);
    assert_eq!(report.verdict, Verdict::Warn);
    assert_eq!(report.stats.unresolved_edges, 2);
}

#[test]
fn test_config_file_and_aliases() {
    let dir = project(&[
        (
            ".layerguard.toml",
            "[layers]\nmodules = \"src/features\"\ncore = \"src/core\"\n\n[aliases]\n\"@/\" = \"src/\"\n",
        ),
        ("src/core/http.ts", "import { cart } from '@/features/cart/store';\n"),
        ("src/features/cart/store.ts", "export const cart = 1;\n"),
    ]);

    let report = check(dir.path(), CheckOptions::default()).unwrap();
    assert_eq!(report.count(RuleKind::Hierarchy), 1);
    assert_eq!(report.stats.modules, 1);
}

#[test]
fn test_options_override_config() {
    let dir = project(&[
        ("modules/a/index.ts", "import { b } from '../b';\n"),
        ("modules/b/index.ts", "export const b = 1;\n"),
        ("legacy/modules/c/index.js", "import { b } from '../../../modules/b';\n"),
    ]);

    let options = CheckOptions {
        config: Some(Config::default()),
        extensions: vec!["ts".to_string()],
        exclude: vec!["legacy".to_string()],
    };
    let report = check(dir.path(), options).unwrap();
    assert_eq!(report.stats.files, 2);
    assert_eq!(report.count(RuleKind::Isolation), 1);
}

#[test]
fn test_invalid_path() {
    match check(Path::new("/nonexistent/path"), CheckOptions::default()) {
        Err(LayerguardError::PathNotFound(_)) => {}
        Err(e) => panic!("Expected PathNotFound error, got: {:?}", e),
        Ok(_) => panic!("Expected error for invalid path"),
    }
}

#[test]
fn test_missing_scan_root_is_fatal() {
    let dir = project(&[("app/main.ts", "")]);
    let mut config = Config::default();
    config.scan_roots = vec![PathBuf::from("src")];

    let result = check(
        dir.path(),
        CheckOptions {
            config: Some(config),
            ..Default::default()
        },
    );
    assert!(matches!(result, Err(LayerguardError::Discovery(_))));
}
