use crate::model::{Reference, ReferenceKind, ReferenceMode};
use crate::parser::{LineIndex, MaskedSource, ReferenceExtractor};
use regex::Regex;
use std::sync::LazyLock;

/// `import … from "x"` / `export … from "x"`, possibly spanning lines.
static FROM_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*(import|export)\b([\w\s{},*$]*?)\bfrom\s*['"]([^'"\n]+)['"][ \t]*;?"#)
        .expect("valid from-clause pattern")
});

/// `import "x"`
static SIDE_EFFECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*(import)\s*['"]([^'"\n]+)['"][ \t]*;?"#)
        .expect("valid side-effect pattern")
});

/// `import("x")` / `require("x")`
static CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:^|[^.\w$])((?:import|require)\s*\(\s*['"]([^'"\n]+)['"]\s*\))"#)
        .expect("valid call pattern")
});

/// Extractor for the JavaScript/TypeScript family, by textual pattern.
pub struct ScriptExtractor {
    extensions: Vec<String>,
}

impl ScriptExtractor {
    pub fn new(extensions: Vec<String>) -> Self {
        Self { extensions }
    }
}

impl Default for ScriptExtractor {
    fn default() -> Self {
        Self::new(
            ["ts", "tsx", "js", "jsx", "mjs", "cjs", "mts", "cts"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
    }
}

impl ReferenceExtractor for ScriptExtractor {
    fn handles(&self, extension: &str) -> bool {
        self.extensions.iter().any(|e| e == extension)
    }

    fn extract(&self, source: &str) -> Vec<Reference> {
        let source = MaskedSource::new(source);
        let masked = source.text.as_str();
        let lines = LineIndex::new(masked);
        let mut references = Vec::new();

        let mut at = 0;
        while let Some(caps) = FROM_CLAUSE.captures_at(masked, at) {
            let (Some(whole), Some(keyword), Some(clause), Some(target)) =
                (caps.get(0), caps.get(1), caps.get(2), caps.get(3))
            else {
                break;
            };
            // `export enum E { A }` followed by an import on a later line
            if let Some(offset) = nested_statement(clause.as_str()) {
                at = clause.start() + offset;
                continue;
            }
            if source.in_string(keyword.start()) {
                at = keyword.end();
                continue;
            }
            at = whole.end();
            let kind = if keyword.as_str() == "export" {
                ReferenceKind::ReExport
            } else {
                ReferenceKind::Static
            };
            references.push(Reference {
                target: target.as_str().to_string(),
                mode: clause_mode(clause.as_str()),
                kind,
                line: lines.line_of(keyword.start()),
                span: keyword.start()..whole.end(),
            });
        }

        for caps in SIDE_EFFECT.captures_iter(masked) {
            let (Some(whole), Some(keyword), Some(target)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            if source.in_string(keyword.start()) {
                continue;
            }
            references.push(Reference {
                target: target.as_str().to_string(),
                mode: ReferenceMode::Value,
                kind: ReferenceKind::Static,
                line: lines.line_of(keyword.start()),
                span: keyword.start()..whole.end(),
            });
        }

        for caps in CALL.captures_iter(masked) {
            let (Some(call), Some(target)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            if source.in_string(call.start()) {
                continue;
            }
            let mode = if masked[..call.start()].trim_end().ends_with("typeof") {
                ReferenceMode::Type
            } else {
                ReferenceMode::Value
            };
            references.push(Reference {
                target: target.as_str().to_string(),
                mode,
                kind: ReferenceKind::Dynamic,
                line: lines.line_of(call.start()),
                span: call.range(),
            });
        }

        references.sort_by_key(|r| r.span.start);
        references
    }

    fn demote_to_type_only(&self, statement: &str) -> Option<String> {
        let trimmed = statement.trim_start();
        let keyword = ["import", "export"]
            .into_iter()
            .find(|k| trimmed.starts_with(k))?;
        let rest = &trimmed[keyword.len()..];
        let quote = rest.find(['\'', '"'])?;
        let from = rest[..quote].rfind("from")?;
        let clause = rest[..from].trim();
        if clause.is_empty() || clause_mode(clause) == ReferenceMode::Type {
            return None;
        }
        // type-only imports cannot combine a default binding with named ones
        if let Some(open) = clause.find('{') {
            if !clause[..open].trim().is_empty() {
                return None;
            }
        }
        let clause = strip_inline_type_modifiers(clause);
        Some(format!("{} type {} {}", keyword, clause, rest[from..].trim_end()))
    }

    fn render_reference(&self, target: &str, mode: ReferenceMode, binding: &str) -> String {
        match mode {
            ReferenceMode::Type => format!("import type {{ {} }} from \"{}\";", binding, target),
            ReferenceMode::Value => format!("import {{ {} }} from \"{}\";", binding, target),
        }
    }
}

/// Offset of a line inside `clause` that starts a new import/export
/// statement, meaning the match ran past the end of an unrelated declaration.
fn nested_statement(clause: &str) -> Option<usize> {
    let mut offset = 0;
    for line in clause.split_inclusive('\n') {
        if offset > 0 {
            let body = line.trim_start();
            let starts_statement = ["import", "export"].iter().any(|k| {
                body.strip_prefix(k)
                    .is_some_and(|r| !r.starts_with(|c: char| c.is_alphanumeric() || c == '_' || c == '$'))
            });
            if starts_statement {
                return Some(offset);
            }
        }
        offset += line.len();
    }
    None
}

/// Decide type-only vs value from the text between the keyword and `from`.
fn clause_mode(clause: &str) -> ReferenceMode {
    let clause = clause.trim();
    // `import type from "x"` imports a default binding named `type`
    if clause == "type" {
        return ReferenceMode::Value;
    }
    if let Some(rest) = clause.strip_prefix("type") {
        if rest.starts_with(|c: char| c.is_whitespace() || c == '{' || c == '*') {
            return ReferenceMode::Type;
        }
    }
    if let Some(inner) = clause.strip_prefix('{').and_then(|c| c.strip_suffix('}')) {
        let specifiers: Vec<&str> = inner
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        if !specifiers.is_empty() && specifiers.iter().all(|s| is_inline_type(s)) {
            return ReferenceMode::Type;
        }
    }
    ReferenceMode::Value
}

fn is_inline_type(specifier: &str) -> bool {
    specifier
        .strip_prefix("type")
        .is_some_and(|rest| rest.starts_with(char::is_whitespace))
}

fn strip_inline_type_modifiers(clause: &str) -> String {
    let Some(open) = clause.find('{') else {
        return clause.to_string();
    };
    let Some(close) = clause.rfind('}') else {
        return clause.to_string();
    };
    let specifiers: Vec<String> = clause[open + 1..close]
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            if is_inline_type(s) {
                s["type".len()..].trim_start().to_string()
            } else {
                s.to_string()
            }
        })
        .collect();
    format!(
        "{}{{ {} }}{}",
        &clause[..open],
        specifiers.join(", "),
        &clause[close + 1..]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(source: &str) -> Vec<Reference> {
        ScriptExtractor::default().extract(source)
    }

    #[test]
    fn test_static_forms() {
        let refs = extract(
            "import a from './a';\nimport { b, c as d } from \"../b\"\nimport * as e from '@/e';\nimport './polyfill';\n",
        );
        let targets: Vec<_> = refs.iter().map(|r| r.target.as_str()).collect();
        assert_eq!(targets, vec!["./a", "../b", "@/e", "./polyfill"]);
        assert!(refs.iter().all(|r| r.kind == ReferenceKind::Static));
        assert!(refs.iter().all(|r| r.mode == ReferenceMode::Value));
        assert_eq!(refs.iter().map(|r| r.line).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_type_only_forms() {
        let refs = extract(
            "import type { A } from './a';\nimport { type B, type C } from './b';\nimport { type D, e } from './d';\nimport type from './t';\nexport type { F } from './f';\n",
        );
        let modes: Vec<_> = refs.iter().map(|r| r.mode).collect();
        assert_eq!(
            modes,
            vec![
                ReferenceMode::Type,
                ReferenceMode::Type,
                ReferenceMode::Value,
                ReferenceMode::Value,
                ReferenceMode::Type,
            ]
        );
    }

    #[test]
    fn test_dynamic_and_reexport_forms() {
        let refs = extract(
            "export * from './all';\nexport { x } from './x';\nconst m = await import('./lazy');\nconst r = require(\"./legacy\");\nobj.require('./not-a-ref');\ntype T = typeof import('./types');\n",
        );
        let summary: Vec<_> = refs
            .iter()
            .map(|r| (r.target.as_str(), r.kind, r.mode))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("./all", ReferenceKind::ReExport, ReferenceMode::Value),
                ("./x", ReferenceKind::ReExport, ReferenceMode::Value),
                ("./lazy", ReferenceKind::Dynamic, ReferenceMode::Value),
                ("./legacy", ReferenceKind::Dynamic, ReferenceMode::Value),
                ("./types", ReferenceKind::Dynamic, ReferenceMode::Type),
            ]
        );
    }

    #[test]
    fn test_multiline_statement_reports_first_line() {
        let source = "// header\nimport {\n  a,\n  b,\n} from './ab';\n";
        let refs = extract(source);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].line, 2);
        assert_eq!(&source[refs[0].span.clone()], "import {\n  a,\n  b,\n} from './ab';");
    }

    #[test]
    fn test_declaration_does_not_swallow_next_import() {
        let refs = extract("export enum Kind {\n  A,\n  B\n}\nimport { b } from './b';\n");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].kind, ReferenceKind::Static);
        assert_eq!(refs[0].line, 5);
    }

    #[test]
    fn test_commented_references_are_ignored() {
        let refs = extract("// import a from './a';\n/* require('./b') */\n");
        assert!(refs.is_empty());
    }

    #[test]
    fn test_references_inside_strings_are_ignored() {
        let refs = extract(
            "const s = \"import('./c')\";\nconst t = `require('./d')`;\nconst u = `\nimport x from './e';\n`;\nimport { f } from './f';\n",
        );
        let targets: Vec<_> = refs.iter().map(|r| r.target.as_str()).collect();
        assert_eq!(targets, vec!["./f"]);
    }

    #[test]
    fn test_same_target_twice_is_two_references() {
        let refs = extract("import type { T } from './x';\nimport { v } from './x';\n");
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].mode, ReferenceMode::Type);
        assert_eq!(refs[1].mode, ReferenceMode::Value);
    }

    #[test]
    fn test_demote_to_type_only() {
        let ex = ScriptExtractor::default();
        assert_eq!(
            ex.demote_to_type_only("import { a, type B } from '../billing/store';").as_deref(),
            Some("import type { a, B } from '../billing/store';")
        );
        assert_eq!(
            ex.demote_to_type_only("export * from './x'").as_deref(),
            Some("export type * from './x'")
        );
        assert_eq!(ex.demote_to_type_only("import type { A } from './a';"), None);
        assert_eq!(ex.demote_to_type_only("import './side-effect';"), None);
        assert_eq!(ex.demote_to_type_only("import React, { useState } from 'react';"), None);
        assert_eq!(
            ex.demote_to_type_only("import { a } from '../from/a';").as_deref(),
            Some("import type { a } from '../from/a';")
        );
    }
}
