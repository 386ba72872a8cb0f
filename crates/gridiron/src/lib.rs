//! GridIron
//!
//! Server-side HTML control framework. Templates are ordinary HTML with
//! framework tags mixed in (`<gi::Label id="title">...</gi::Label>`); each
//! framework tag is bound to a control object that renders it, and
//! everything else is copied to the output byte for byte.
//!
//! ```
//! use gridiron::{Config, ControlHandle, ControlRegistry, Label, Page};
//!
//! let registry = ControlRegistry::with_builtin();
//! let mut page = Page::from_source(
//!     Config::default(),
//!     &registry,
//!     "hello.html",
//!     "<p><gi::Label id=\"greeting\" auto=\"true\">Hello</gi::Label> \
//!      <gi::Label id=\"name\">?</gi::Label></p>",
//! )?;
//!
//! page.add_control(ControlHandle::ROOT, "name", Label::with_text("world"))?;
//!
//! assert_eq!(
//!     page.render(),
//!     "<p><div style=\"align: left;\">Hello</div> <div style=\"align: left;\">world</div></p>"
//! );
//! # Ok::<(), gridiron::GridError>(())
//! ```

pub mod config;
pub mod control;
pub mod diagnostic;
pub mod error;
pub mod page;
pub mod registry;
pub mod tag;
pub mod ui;
pub mod variables;

pub use config::{Config, ConfigError};
pub use control::{
    AttachContext, BindContext, Control, ControlHandle, ControlState, RegisteredControl,
};
pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use error::{GridError, GridResult};
pub use page::{Page, PageStatus, RenderContext, ERROR_MARKER};
pub use registry::{ControlDescriptor, ControlRegistry};
pub use tag::{is_custom_control, parse_tag, xml_encode, FrameworkTag};
pub use ui::{Label, Value};
pub use variables::{SharedText, VariableRegistry};

pub use gridiron_parser::{Node, NodeId, Tree};
