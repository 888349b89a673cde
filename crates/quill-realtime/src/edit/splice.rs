//! Applies an edit's payload to document content.
//!
//! Offsets count Unicode scalar values, not bytes.

use quill_core::error::AppError;
use quill_entity::document::{EditOperation, EditRequest};

/// Returns the content that results from applying `edit` to `current`.
pub fn apply(current: &str, edit: &EditRequest) -> Result<String, AppError> {
    match edit.operation {
        EditOperation::Replace => {
            let content = required(edit.content.as_deref(), "content")?;
            Ok(content.to_string())
        }
        EditOperation::Insert => {
            let content = required(edit.content.as_deref(), "content")?;
            let start = required(edit.start_position, "start_position")?;
            let len = current.chars().count();
            if start > len {
                return Err(AppError::invalid_range(format!(
                    "start_position {start} is past the end of the content ({len})"
                )));
            }

            let at = byte_offset(current, start);
            let mut next = String::with_capacity(current.len() + content.len());
            next.push_str(&current[..at]);
            next.push_str(content);
            next.push_str(&current[at..]);
            Ok(next)
        }
        EditOperation::Delete => {
            let start = required(edit.start_position, "start_position")?;
            let end = required(edit.end_position, "end_position")?;
            let len = current.chars().count();
            if start > end || end > len {
                return Err(AppError::invalid_range(format!(
                    "range {start}..{end} is outside the content (0..{len})"
                )));
            }

            let from = byte_offset(current, start);
            let to = byte_offset(current, end);
            let mut next = String::with_capacity(current.len() - (to - from));
            next.push_str(&current[..from]);
            next.push_str(&current[to..]);
            Ok(next)
        }
    }
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::validation(format!("Edit is missing '{field}'")))
}

/// Byte index of the `chars`-th character; `chars` must be `<= len`.
fn byte_offset(s: &str, chars: usize) -> usize {
    s.char_indices()
        .nth(chars)
        .map(|(idx, _)| idx)
        .unwrap_or(s.len())
}
