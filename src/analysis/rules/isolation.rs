use crate::model::{Layer, ReferenceEdge, SourceFile, Violation};

/// Module → other module at runtime. Type-only references are exempt.
pub fn check(source: &SourceFile, edge: &ReferenceEdge) -> Option<Violation> {
    if source.layer != Layer::Module || edge.target.layer != Layer::Module {
        return None;
    }
    if edge.is_type_only() {
        return None;
    }
    let from = source.module.as_deref()?;
    let to = edge.target.module.as_deref()?;
    (from != to).then(|| Violation::isolation(edge, from, to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Classification, FileRole, ReferenceKind, ReferenceMode};
    use std::path::PathBuf;

    fn in_module(name: &str) -> Classification {
        Classification {
            layer: Layer::Module,
            module: Some(name.to_string()),
            role: Some(FileRole::Store),
        }
    }

    fn edge(target: &str, mode: ReferenceMode) -> ReferenceEdge {
        ReferenceEdge {
            from: PathBuf::from("/p/modules/orders/ui.ts"),
            raw_target: format!("../{target}/store"),
            resolved: Some(PathBuf::from(format!("/p/modules/{target}/store.ts"))),
            target: in_module(target),
            mode,
            kind: ReferenceKind::Static,
            line: 2,
        }
    }

    #[test]
    fn test_cross_module_value_reference() {
        let source = SourceFile::new(PathBuf::from("/p/modules/orders/ui.ts"), in_module("orders"));

        let v = check(&source, &edge("billing", ReferenceMode::Value)).unwrap();
        assert!(v.message.contains("`orders`"));
        assert!(v.message.contains("`billing`"));

        assert!(check(&source, &edge("billing", ReferenceMode::Type)).is_none());
        assert!(check(&source, &edge("orders", ReferenceMode::Value)).is_none());
    }

    #[test]
    fn test_file_outside_any_module_is_ignored() {
        let loose = SourceFile::new(
            PathBuf::from("/p/modules/registry.ts"),
            Classification {
                layer: Layer::Module,
                module: None,
                role: Some(FileRole::Other),
            },
        );
        assert!(check(&loose, &edge("billing", ReferenceMode::Value)).is_none());
    }
}
