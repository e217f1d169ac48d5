//! Diagram interchange: semantic model ↔ draw.io (mxGraph) markup.
//!
//! ```text
//!                 DiagramWriter (view filter + layout completion)
//!   SemanticModel ───────────────────────────────────────────────▶ XML
//!        ▲                                                          │
//!        └──────────────────── DiagramReader ◀──────────────────────┘
//!              (tag → label keyword → shape → default kind)
//! ```
//!
//! Markup is the uncompressed draw.io format: an `mxGraphModel` whose root
//! holds the fixed cells `"0"` (root) and `"1"` (layer), one vertex per node
//! and one edge per semantic edge. Kinds and identity metadata travel in
//! the cell style (see [`style`]). `contains` edges are drawn faintly but
//! always written, so the reader can tell "no parent" from "parent lost".
//!
//! ## Usage
//!
//! ```ignore
//! use syster_sync::interchange::{from_drawio, to_drawio, validate_drawio};
//!
//! let xml = to_drawio(&model)?;
//! assert!(validate_drawio(&xml).valid);
//! let back = from_drawio(&xml)?;
//! ```

mod error;
mod reader;
pub mod style;
mod validate;
mod views;
mod writer;

pub use error::DiagramError;
pub use reader::{DiagramReader, from_drawio};
pub use validate::{DiagramValidation, validate_drawio};
pub use views::{DiagramView, UnknownView};
pub use writer::{DiagramWriter, LAYER_CELL, ROOT_CELL, to_drawio};
