//! Layout options

use crate::syntax::ElementKind;

/// Spacing and placement parameters
#[derive(Debug, Clone)]
pub struct LayoutOptions {
    /// Top-left corner of the first lane
    pub origin_x: f64,
    pub origin_y: f64,
    /// Space between nodes of one layer
    pub horizontal_gap: f64,
    /// Space between layers
    pub vertical_gap: f64,
    /// Space between lanes
    pub lane_gap: f64,
    /// Columns of the grid fallback
    pub grid_columns: usize,
    /// Offset applied per nudge when resolving overlap
    pub nudge_step: f64,
    /// Nudges tried before an overlap is accepted
    pub max_nudge_attempts: usize,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            origin_x: 40.0,
            origin_y: 40.0,
            horizontal_gap: 40.0,
            vertical_gap: 60.0,
            lane_gap: 120.0,
            grid_columns: 4,
            nudge_step: 20.0,
            max_nudge_attempts: 50,
        }
    }
}

impl LayoutOptions {
    pub fn with_origin(mut self, x: f64, y: f64) -> Self {
        self.origin_x = x;
        self.origin_y = y;
        self
    }

    pub fn with_gaps(mut self, horizontal: f64, vertical: f64) -> Self {
        self.horizontal_gap = horizontal;
        self.vertical_gap = vertical;
        self
    }

    pub fn with_lane_gap(mut self, gap: f64) -> Self {
        self.lane_gap = gap;
        self
    }

    pub fn with_grid_columns(mut self, columns: usize) -> Self {
        self.grid_columns = columns.max(1);
        self
    }

    pub fn with_max_nudge_attempts(mut self, attempts: usize) -> Self {
        self.max_nudge_attempts = attempts;
        self
    }
}

/// Default `(width, height)` of a node of `kind`.
pub fn default_size(kind: ElementKind) -> (f64, f64) {
    match kind {
        ElementKind::Package | ElementKind::LibraryPackage => (240.0, 140.0),
        ElementKind::PortDef | ElementKind::PortUsage => (120.0, 40.0),
        ElementKind::ConnectionUsage
        | ElementKind::InterfaceUsage
        | ElementKind::FlowUsage
        | ElementKind::BindingUsage
        | ElementKind::AllocationUsage
        | ElementKind::Dependency
        | ElementKind::TransitionUsage => (120.0, 60.0),
        ElementKind::UseCaseDef | ElementKind::UseCaseUsage => (160.0, 80.0),
        kind if kind.is_requirement() || kind.is_verification() => (200.0, 90.0),
        kind if kind.is_definition() => (180.0, 70.0),
        _ => (160.0, 60.0),
    }
}
