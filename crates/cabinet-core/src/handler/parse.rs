//! Parse inline handler text into a typed call.

use thiserror::Error;

/// Number of positional arguments a drill handler must carry.
pub const HANDLER_ARITY: usize = 6;

/// The six arguments of a row's expand handler, by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrillHandlerCall {
    pub record_id: String,
    pub parent_id: String,
    pub record_type: String,
    pub form_id: String,
    pub request_type: String,
    /// Container name without the `tr` sub-listing suffix (e.g. `jslist`).
    pub container_base: String,
}

impl DrillHandlerCall {
    /// Arguments in wire order.
    pub fn fields(&self) -> [&str; HANDLER_ARITY] {
        [
            self.record_id.as_str(),
            self.parent_id.as_str(),
            self.record_type.as_str(),
            self.form_id.as_str(),
            self.request_type.as_str(),
            self.container_base.as_str(),
        ]
    }
}

/// Handler text did not normalize to exactly six arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed drill handler: expected {HANDLER_ARITY} arguments, found {found} in {input:?}")]
pub struct MalformedHandlerError {
    pub found: usize,
    pub input: String,
}

/// Parses `name("a", "b", ...)` into a [`DrillHandlerCall`].
///
/// The handler name is ignored. Quotes are dropped and `", "` separators are
/// collapsed before splitting on `,`. Field contents are not validated.
pub fn parse_handler(text: &str) -> Result<DrillHandlerCall, MalformedHandlerError> {
    let trimmed = text.trim().trim_end_matches(';').trim_end();
    let inner = match (trimmed.find('('), trimmed.rfind(')')) {
        (Some(open), Some(close)) if open < close => &trimmed[open + 1..close],
        (None, None) => trimmed,
        _ => {
            return Err(MalformedHandlerError {
                found: 0,
                input: text.to_string(),
            })
        }
    };

    let cleared = inner
        .replace(", ", ",")
        .replace(|c: char| c == '"' || c == '\'', "");
    let fields: Vec<String> = cleared.split(',').map(|f| f.trim().to_string()).collect();

    let found = fields.len();
    let Ok([record_id, parent_id, record_type, form_id, request_type, container_base]) =
        <[String; HANDLER_ARITY]>::try_from(fields)
    else {
        return Err(MalformedHandlerError {
            found,
            input: text.to_string(),
        });
    };

    Ok(DrillHandlerCall {
        record_id,
        parent_id,
        record_type,
        form_id,
        request_type,
        container_base,
    })
}
