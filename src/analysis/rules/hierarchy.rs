use crate::model::{ReferenceEdge, SourceFile, Violation};

/// Upward references (e.g. Core → Module) break the layer order.
/// External and Unknown endpoints are never ranked, so they never match.
pub fn check(source: &SourceFile, edge: &ReferenceEdge) -> Option<Violation> {
    let from = source.layer.rank()?;
    let to = edge.target.layer.rank()?;
    (to > from).then(|| Violation::hierarchy(edge, source.layer))
}
