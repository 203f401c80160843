//! Codec for `[type,id,action,body]` text frames.
//!
//! Frames are never treated as JSON documents. The header fields (type, id,
//! action, error code/description) are extracted with a bounded split and
//! the remainder is carried verbatim, so bodies may contain commas and
//! nested objects without confusing the splitter.

use thiserror::Error;

/// Message kind, taken from byte index 1 of the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameType {
    /// Type `2`: a request carrying an id, an action, and a body.
    Call,
    /// Type `3`: a success response correlated by id.
    CallResult,
    /// Type `4`: a failure response with code/description/details.
    CallError,
}

impl FrameType {
    /// Classify a raw payload without parsing it.
    pub fn of(payload: &str) -> Result<FrameType, FrameError> {
        let bytes = payload.as_bytes();
        if bytes.first() != Some(&b'[') {
            return Err(FrameError::Malformed("payload does not start with '['"));
        }
        match bytes.get(1) {
            Some(b'2') => Ok(FrameType::Call),
            Some(b'3') => Ok(FrameType::CallResult),
            Some(b'4') => Ok(FrameType::CallError),
            _ => Err(FrameError::Malformed("unknown message type")),
        }
    }
}

/// A parsed frame, borrowing from the raw payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame<'a> {
    Call {
        id: &'a str,
        action: &'a str,
        body: &'a str,
    },
    CallResult {
        id: &'a str,
        body: &'a str,
    },
    CallError {
        id: &'a str,
        code: &'a str,
        description: &'a str,
        details: &'a str,
    },
}

impl<'a> Frame<'a> {
    /// Parse a raw text payload into its header fields.
    pub fn parse(payload: &'a str) -> Result<Frame<'a>, FrameError> {
        let kind = FrameType::of(payload)?;
        let inner = payload[1..]
            .strip_suffix(']')
            .ok_or(FrameError::Malformed("payload does not end with ']'"))?;
        match kind {
            FrameType::Call => {
                let mut fields = inner.splitn(4, ',');
                let _type = fields.next();
                let id = next_field(&mut fields)?;
                let action = next_field(&mut fields)?;
                let body = fields.next().unwrap_or("");
                Ok(Frame::Call {
                    id: unquote(id),
                    action: unquote(action),
                    body,
                })
            }
            FrameType::CallResult => {
                let mut fields = inner.splitn(3, ',');
                let _type = fields.next();
                let id = next_field(&mut fields)?;
                let body = fields.next().unwrap_or("");
                Ok(Frame::CallResult {
                    id: unquote(id),
                    body,
                })
            }
            FrameType::CallError => {
                let mut fields = inner.splitn(5, ',');
                let _type = fields.next();
                let id = next_field(&mut fields)?;
                let code = next_field(&mut fields)?;
                let description = next_field(&mut fields)?;
                let details = fields.next().unwrap_or("");
                Ok(Frame::CallError {
                    id: unquote(id),
                    code: unquote(code),
                    description: unquote(description),
                    details,
                })
            }
        }
    }

    /// Correlation id of the frame.
    pub fn id(&self) -> &'a str {
        match self {
            Frame::Call { id, .. } | Frame::CallResult { id, .. } | Frame::CallError { id, .. } => {
                id
            }
        }
    }
}

/// Assemble a CALLRESULT frame. The body is an already-serialized JSON
/// document owned by the backend and is passed through untouched.
pub fn emit_call_result(id: &str, body: &str) -> String {
    format!("[3,\"{id}\",{body}]")
}

/// Assemble a synthesized bridge CALLERROR frame.
pub fn emit_call_error(id: &str, description: &str) -> String {
    format!("[4,\"{id}\",\"InternalError\",\"{description}\",{{}}]")
}

fn next_field<'a>(fields: &mut impl Iterator<Item = &'a str>) -> Result<&'a str, FrameError> {
    fields
        .next()
        .ok_or(FrameError::Malformed("missing header field"))
}

/// Strip one layer of double quotes, if present.
fn unquote(field: &str) -> &str {
    field
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(field)
}

/// Errors from frame parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// The payload is not a well-formed frame of a known type.
    #[error("malformed frame: {0}")]
    Malformed(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_call() {
        let frame = Frame::parse(r#"[2,"42","hello",{"x":1}]"#).unwrap();
        assert_eq!(
            frame,
            Frame::Call {
                id: "42",
                action: "hello",
                body: r#"{"x":1}"#
            }
        );
    }

    #[test]
    fn call_body_may_contain_commas_and_nesting() {
        let frame = Frame::parse(r#"[2,"7","cfg",{"a":[1,2],"b":{"c":3}}]"#).unwrap();
        assert_eq!(
            frame,
            Frame::Call {
                id: "7",
                action: "cfg",
                body: r#"{"a":[1,2],"b":{"c":3}}"#
            }
        );
    }

    #[test]
    fn parses_call_result() {
        let frame = Frame::parse(r#"[3,"42",{"y":2}]"#).unwrap();
        assert_eq!(
            frame,
            Frame::CallResult {
                id: "42",
                body: r#"{"y":2}"#
            }
        );
    }

    #[test]
    fn parses_call_error() {
        let frame = Frame::parse(r#"[4,"9","NotSupported","unknown action",{"detail":1}]"#).unwrap();
        assert_eq!(
            frame,
            Frame::CallError {
                id: "9",
                code: "NotSupported",
                description: "unknown action",
                details: r#"{"detail":1}"#
            }
        );
    }

    #[test]
    fn call_result_round_trips_byte_equal() {
        let raw = r#"[3,"42",{"y":2}]"#;
        let Frame::CallResult { id, body } = Frame::parse(raw).unwrap() else {
            panic!("wrong frame kind");
        };
        assert_eq!(emit_call_result(id, body), raw);
    }

    #[test]
    fn empty_body_round_trips_as_empty() {
        let raw = r#"[3,"42",]"#;
        let Frame::CallResult { id, body } = Frame::parse(raw).unwrap() else {
            panic!("wrong frame kind");
        };
        assert_eq!(body, "");
        assert_eq!(emit_call_result(id, body), raw);
    }

    #[test]
    fn emits_internal_error() {
        assert_eq!(
            emit_call_error("42", "connect failed"),
            r#"[4,"42","InternalError","connect failed",{}]"#
        );
    }

    #[test]
    fn rejects_missing_opening_bracket() {
        assert_eq!(
            FrameType::of(r#"2,"42","#),
            Err(FrameError::Malformed("payload does not start with '['"))
        );
    }

    #[test]
    fn rejects_unknown_type() {
        assert_eq!(
            FrameType::of(r#"[5,"42"]"#),
            Err(FrameError::Malformed("unknown message type"))
        );
        assert!(FrameType::of("").is_err());
        assert!(FrameType::of("[").is_err());
    }

    #[test]
    fn rejects_missing_fields() {
        assert!(Frame::parse("[2]").is_err());
        assert!(Frame::parse(r#"[4,"9"]"#).is_err());
        assert!(Frame::parse(r#"[3,"42""#).is_err());
    }

    #[test]
    fn missing_body_parses_as_empty() {
        let frame = Frame::parse(r#"[3,"42"]"#).unwrap();
        assert_eq!(
            frame,
            Frame::CallResult {
                id: "42",
                body: ""
            }
        );
    }

    #[test]
    fn unquote_strips_one_layer_only() {
        assert_eq!(unquote(r#""id""#), "id");
        assert_eq!(unquote(r#"""id""""#), r#""id""#);
        assert_eq!(unquote("bare"), "bare");
    }
}
