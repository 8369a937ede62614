mod contract;
mod layer;
mod reference;
mod violation;

pub use contract::{ForbiddenTarget, ResponsibilityTable, RoleContract, glob_match};
pub use layer::{Classification, FileRole, Layer, SourceFile};
pub use reference::{Reference, ReferenceEdge, ReferenceKind, ReferenceMode};
pub use violation::{RuleKind, Severity, Subject, Violation};
