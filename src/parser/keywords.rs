//! Keyword tables driving the parser's lookahead dispatch
//!
//! Tables are ordered longest-prefix-first: `"connection def"` must be tried
//! before `"connection"`, and `"use case def"` before `"use case"`.

use crate::syntax::ElementKind;

/// Namespace declarations
pub const PACKAGE_KEYWORDS: &[(&str, ElementKind)] = &[
    ("library package", ElementKind::LibraryPackage),
    ("package", ElementKind::Package),
];

/// Definition declarations (`<keyword> def Name ...`)
pub const DEFINITION_KEYWORDS: &[(&str, ElementKind)] = &[
    ("use case def", ElementKind::UseCaseDef),
    ("part def", ElementKind::PartDef),
    ("port def", ElementKind::PortDef),
    ("item def", ElementKind::ItemDef),
    ("attribute def", ElementKind::AttributeDef),
    ("enum def", ElementKind::EnumDef),
    ("connection def", ElementKind::ConnectionDef),
    ("interface def", ElementKind::InterfaceDef),
    ("allocation def", ElementKind::AllocationDef),
    ("requirement def", ElementKind::RequirementDef),
    ("constraint def", ElementKind::ConstraintDef),
    ("verification def", ElementKind::VerificationDef),
    ("action def", ElementKind::ActionDef),
    ("state def", ElementKind::StateDef),
    ("calc def", ElementKind::CalcDef),
    ("view def", ElementKind::ViewDef),
];

/// Usage declarations (`<keyword> name : Type ...`)
pub const USAGE_KEYWORDS: &[(&str, ElementKind)] = &[
    ("use case", ElementKind::UseCaseUsage),
    ("part", ElementKind::PartUsage),
    ("port", ElementKind::PortUsage),
    ("item", ElementKind::ItemUsage),
    ("attribute", ElementKind::AttributeUsage),
    ("enum", ElementKind::EnumValue),
    ("connection", ElementKind::ConnectionUsage),
    ("interface", ElementKind::InterfaceUsage),
    ("allocation", ElementKind::AllocationUsage),
    ("requirement", ElementKind::RequirementUsage),
    ("constraint", ElementKind::ConstraintUsage),
    ("verification", ElementKind::VerificationUsage),
    ("action", ElementKind::ActionUsage),
    ("state", ElementKind::StateUsage),
    ("calc", ElementKind::CalcUsage),
    ("view", ElementKind::ViewUsage),
];

pub const VISIBILITY_KEYWORDS: &[&str] = &["public", "private", "protected"];

/// Prefix modifiers that are accepted and dropped
pub const IGNORED_PREFIXES: &[&str] = &[
    "standard",
    "readonly",
    "derived",
    "end",
    "variation",
    "individual",
];

/// Find the first table entry whose keyword matches at the cursor.
pub fn lookup(
    table: &'static [(&'static str, ElementKind)],
    mut at_keyword: impl FnMut(&str) -> bool,
) -> Option<(&'static str, ElementKind)> {
    table.iter().copied().find(|(keyword, _)| at_keyword(keyword))
}
