use crate::model::{Layer, ReferenceEdge, SourceFile, Violation};

/// Relative or aliased target that matches no known file.
pub fn check_edge(edge: &ReferenceEdge) -> Option<Violation> {
    (!edge.is_resolved() && edge.target.layer == Layer::Unknown)
        .then(|| Violation::unresolved_reference(edge))
}

pub fn check_file(source: &SourceFile) -> Option<Violation> {
    (source.layer == Layer::Unknown).then(|| Violation::outside_layers(source.path.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Classification, ReferenceKind, ReferenceMode, Severity};
    use std::path::PathBuf;

    fn edge(resolved: Option<&str>, target: Classification) -> ReferenceEdge {
        ReferenceEdge {
            from: PathBuf::from("/p/app/main.ts"),
            raw_target: "./gone".to_string(),
            resolved: resolved.map(PathBuf::from),
            target,
            mode: ReferenceMode::Value,
            kind: ReferenceKind::Static,
            line: 4,
        }
    }

    #[test]
    fn test_unresolved_relative_target_is_low() {
        let v = check_edge(&edge(None, Classification::unknown())).unwrap();
        assert_eq!(v.severity, Severity::Low);
        assert_eq!(v.line, Some(4));

        assert!(check_edge(&edge(None, Classification::external())).is_none());
        assert!(check_edge(&edge(Some("/p/scripts/x.ts"), Classification::unknown())).is_none());
    }

    #[test]
    fn test_file_outside_layers() {
        let outside = SourceFile::new(PathBuf::from("/p/scripts/x.ts"), Classification::unknown());
        assert!(check_file(&outside).is_some());
    }
}
