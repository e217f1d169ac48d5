//! Element kinds shared by the syntax tree and the semantic model.
//!
//! One flat enum is used for both layers: the semantic model mirrors the
//! syntax kinds, and the few purely syntactic kinds (imports, aliases,
//! documentation, comments) are simply never indexed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of a syntax node / semantic node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ElementKind {
    // Namespaces
    Package,
    LibraryPackage,

    // Non-semantic syntax
    Import,
    Alias,
    Doc,
    Comment,

    // Structure
    PartDef,
    PartUsage,
    PortDef,
    PortUsage,
    ItemDef,
    ItemUsage,
    AttributeDef,
    AttributeUsage,
    EnumDef,
    EnumValue,

    // Interconnection
    ConnectionDef,
    ConnectionUsage,
    InterfaceDef,
    InterfaceUsage,
    FlowUsage,
    BindingUsage,
    AllocationDef,
    AllocationUsage,
    Dependency,

    // Requirements
    RequirementDef,
    RequirementUsage,
    ConstraintDef,
    ConstraintUsage,
    Satisfy,
    Verify,
    VerificationDef,
    VerificationUsage,
    UseCaseDef,
    UseCaseUsage,

    // Behavior
    ActionDef,
    ActionUsage,
    StateDef,
    StateUsage,
    TransitionUsage,
    CalcDef,
    CalcUsage,

    // Views
    ViewDef,
    ViewUsage,

    Unknown,
}

impl ElementKind {
    /// Every kind, in declaration order.
    pub const ALL: &'static [ElementKind] = &[
        Self::Package,
        Self::LibraryPackage,
        Self::Import,
        Self::Alias,
        Self::Doc,
        Self::Comment,
        Self::PartDef,
        Self::PartUsage,
        Self::PortDef,
        Self::PortUsage,
        Self::ItemDef,
        Self::ItemUsage,
        Self::AttributeDef,
        Self::AttributeUsage,
        Self::EnumDef,
        Self::EnumValue,
        Self::ConnectionDef,
        Self::ConnectionUsage,
        Self::InterfaceDef,
        Self::InterfaceUsage,
        Self::FlowUsage,
        Self::BindingUsage,
        Self::AllocationDef,
        Self::AllocationUsage,
        Self::Dependency,
        Self::RequirementDef,
        Self::RequirementUsage,
        Self::ConstraintDef,
        Self::ConstraintUsage,
        Self::Satisfy,
        Self::Verify,
        Self::VerificationDef,
        Self::VerificationUsage,
        Self::UseCaseDef,
        Self::UseCaseUsage,
        Self::ActionDef,
        Self::ActionUsage,
        Self::StateDef,
        Self::StateUsage,
        Self::TransitionUsage,
        Self::CalcDef,
        Self::CalcUsage,
        Self::ViewDef,
        Self::ViewUsage,
        Self::Unknown,
    ];

    /// Stable tag used in diagram styles and debug paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Package => "Package",
            Self::LibraryPackage => "LibraryPackage",
            Self::Import => "Import",
            Self::Alias => "Alias",
            Self::Doc => "Doc",
            Self::Comment => "Comment",
            Self::PartDef => "PartDef",
            Self::PartUsage => "PartUsage",
            Self::PortDef => "PortDef",
            Self::PortUsage => "PortUsage",
            Self::ItemDef => "ItemDef",
            Self::ItemUsage => "ItemUsage",
            Self::AttributeDef => "AttributeDef",
            Self::AttributeUsage => "AttributeUsage",
            Self::EnumDef => "EnumDef",
            Self::EnumValue => "EnumValue",
            Self::ConnectionDef => "ConnectionDef",
            Self::ConnectionUsage => "ConnectionUsage",
            Self::InterfaceDef => "InterfaceDef",
            Self::InterfaceUsage => "InterfaceUsage",
            Self::FlowUsage => "FlowUsage",
            Self::BindingUsage => "BindingUsage",
            Self::AllocationDef => "AllocationDef",
            Self::AllocationUsage => "AllocationUsage",
            Self::Dependency => "Dependency",
            Self::RequirementDef => "RequirementDef",
            Self::RequirementUsage => "RequirementUsage",
            Self::ConstraintDef => "ConstraintDef",
            Self::ConstraintUsage => "ConstraintUsage",
            Self::Satisfy => "Satisfy",
            Self::Verify => "Verify",
            Self::VerificationDef => "VerificationDef",
            Self::VerificationUsage => "VerificationUsage",
            Self::UseCaseDef => "UseCaseDef",
            Self::UseCaseUsage => "UseCaseUsage",
            Self::ActionDef => "ActionDef",
            Self::ActionUsage => "ActionUsage",
            Self::StateDef => "StateDef",
            Self::StateUsage => "StateUsage",
            Self::TransitionUsage => "TransitionUsage",
            Self::CalcDef => "CalcDef",
            Self::CalcUsage => "CalcUsage",
            Self::ViewDef => "ViewDef",
            Self::ViewUsage => "ViewUsage",
            Self::Unknown => "Unknown",
        }
    }

    /// Leading keyword(s) of the textual declaration.
    ///
    /// Empty for [`ElementKind::Unknown`], whose keyword is whatever the
    /// source used.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Package => "package",
            Self::LibraryPackage => "library package",
            Self::Import => "import",
            Self::Alias => "alias",
            Self::Doc => "doc",
            Self::Comment => "comment",
            Self::PartDef => "part def",
            Self::PartUsage => "part",
            Self::PortDef => "port def",
            Self::PortUsage => "port",
            Self::ItemDef => "item def",
            Self::ItemUsage => "item",
            Self::AttributeDef => "attribute def",
            Self::AttributeUsage => "attribute",
            Self::EnumDef => "enum def",
            Self::EnumValue => "enum",
            Self::ConnectionDef => "connection def",
            Self::ConnectionUsage => "connection",
            Self::InterfaceDef => "interface def",
            Self::InterfaceUsage => "interface",
            Self::FlowUsage => "flow",
            Self::BindingUsage => "binding",
            Self::AllocationDef => "allocation def",
            Self::AllocationUsage => "allocation",
            Self::Dependency => "dependency",
            Self::RequirementDef => "requirement def",
            Self::RequirementUsage => "requirement",
            Self::ConstraintDef => "constraint def",
            Self::ConstraintUsage => "constraint",
            Self::Satisfy => "satisfy",
            Self::Verify => "verify",
            Self::VerificationDef => "verification def",
            Self::VerificationUsage => "verification",
            Self::UseCaseDef => "use case def",
            Self::UseCaseUsage => "use case",
            Self::ActionDef => "action def",
            Self::ActionUsage => "action",
            Self::StateDef => "state def",
            Self::StateUsage => "state",
            Self::TransitionUsage => "transition",
            Self::CalcDef => "calc def",
            Self::CalcUsage => "calc",
            Self::ViewDef => "view def",
            Self::ViewUsage => "view",
            Self::Unknown => "",
        }
    }

    /// Whether the kind participates in the semantic model.
    pub fn is_semantic(&self) -> bool {
        !matches!(self, Self::Import | Self::Alias | Self::Doc | Self::Comment)
    }

    pub fn is_package(&self) -> bool {
        matches!(self, Self::Package | Self::LibraryPackage)
    }

    /// `*Def` kinds.
    pub fn is_definition(&self) -> bool {
        matches!(
            self,
            Self::PartDef
                | Self::PortDef
                | Self::ItemDef
                | Self::AttributeDef
                | Self::EnumDef
                | Self::ConnectionDef
                | Self::InterfaceDef
                | Self::AllocationDef
                | Self::RequirementDef
                | Self::ConstraintDef
                | Self::VerificationDef
                | Self::UseCaseDef
                | Self::ActionDef
                | Self::StateDef
                | Self::CalcDef
                | Self::ViewDef
        )
    }

    /// `*Usage` kinds (including relation-shaped usages).
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            Self::PartUsage
                | Self::PortUsage
                | Self::ItemUsage
                | Self::AttributeUsage
                | Self::EnumValue
                | Self::ConnectionUsage
                | Self::InterfaceUsage
                | Self::FlowUsage
                | Self::BindingUsage
                | Self::AllocationUsage
                | Self::RequirementUsage
                | Self::ConstraintUsage
                | Self::VerificationUsage
                | Self::UseCaseUsage
                | Self::ActionUsage
                | Self::StateUsage
                | Self::TransitionUsage
                | Self::CalcUsage
                | Self::ViewUsage
        )
    }

    /// Kinds whose declaration can carry source/target endpoints.
    pub fn is_relation(&self) -> bool {
        matches!(
            self,
            Self::ConnectionUsage
                | Self::InterfaceUsage
                | Self::FlowUsage
                | Self::BindingUsage
                | Self::AllocationUsage
                | Self::Dependency
                | Self::Satisfy
                | Self::Verify
                | Self::TransitionUsage
        )
    }

    pub fn is_requirement(&self) -> bool {
        matches!(
            self,
            Self::RequirementDef
                | Self::RequirementUsage
                | Self::ConstraintDef
                | Self::ConstraintUsage
        )
    }

    pub fn is_verification(&self) -> bool {
        matches!(self, Self::VerificationDef | Self::VerificationUsage)
    }

    pub fn is_behavior(&self) -> bool {
        matches!(
            self,
            Self::ActionDef
                | Self::ActionUsage
                | Self::StateDef
                | Self::StateUsage
                | Self::TransitionUsage
                | Self::CalcDef
                | Self::CalcUsage
                | Self::UseCaseDef
                | Self::UseCaseUsage
        )
    }

    /// Structural/definitional kinds whose addition or removal can be
    /// applied to source text without review.
    pub fn is_auto_safe(&self) -> bool {
        self.is_package()
            || self.is_definition()
            || self.is_usage()
            || self.is_requirement()
            || self.is_verification()
    }

    /// Lowercase word used when synthesizing default names.
    pub fn name_stem(&self) -> &'static str {
        match self {
            Self::Unknown => "element",
            Self::Package | Self::LibraryPackage => "package",
            Self::UseCaseDef | Self::UseCaseUsage => "usecase",
            _ => {
                let keyword = self.keyword();
                keyword.split(' ').next().unwrap_or("element")
            }
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a kind tag is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown element kind tag: {0}")]
pub struct UnknownKindTag(pub String);

impl FromStr for ElementKind {
    type Err = UnknownKindTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownKindTag(s.to_string()))
    }
}
