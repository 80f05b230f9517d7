//! Drill-down handler codec.
//!
//! Rows on a portal listing carry an inline `onclick` handler such as
//! `reopenJumper("101", "55", "3", "7", "1", "jslist")`. The six positional
//! arguments are everything needed to request the nested sub-listing; this
//! module parses them into named fields and re-encodes them as the portal's
//! `edit.php` navigation URL.

mod parse;
mod request;

pub use parse::{parse_handler, DrillHandlerCall, MalformedHandlerError, HANDLER_ARITY};
pub use request::{NavigationRequest, EDIT_PATH, EDU_LEVEL, SUB_LISTING_SUFFIX};
