//! Splitting and reassembly of the built-in shader templates.
//!
//! Each editable pipeline stage has a fixed WGSL template containing a
//! marker line. At startup the template is split once around the marker;
//! whenever a user source changes, the compilable module is rebuilt as
//! `prefix + common block + user common + user code + postfix`. Both
//! operations are pure string work.

use crate::error::ShaderError;

/// A template split around its splice marker.
///
/// The prefix ends exactly at (and includes) the marker; the postfix begins
/// immediately after it, so `prefix + postfix` reconstructs the template.
#[derive(Debug, Clone)]
pub struct SplitTemplate {
    pub prefix: String,
    pub postfix: String,
}

/// Split `template` around the first occurrence of `marker`.
///
/// The marker is a literal substring fixed at build time; its absence means
/// the embedded template itself is broken, which is surfaced as
/// [`ShaderError::MarkerNotFound`] rather than silently producing an empty
/// split.
pub fn split(template: &str, marker: &'static str) -> Result<SplitTemplate, ShaderError> {
    let pos = template
        .find(marker)
        .ok_or(ShaderError::MarkerNotFound { marker })?
        + marker.len();

    Ok(SplitTemplate {
        prefix: template[..pos].to_owned(),
        postfix: template[pos..].to_owned(),
    })
}

/// Concatenate the pieces of one shader module.
///
/// Pure: the output is `prefix + '\n' + common + '\n' + user_common + '\n' +
/// user + postfix`, with exactly three inserted separator characters.
pub fn assemble(prefix: &str, common: &str, user_common: &str, user: &str, postfix: &str) -> String {
    let size = prefix.len() + common.len() + user_common.len() + user.len() + postfix.len() + 3;
    let mut src = String::with_capacity(size);
    src.push_str(prefix);
    src.push('\n');
    src.push_str(common);
    src.push('\n');
    src.push_str(user_common);
    src.push('\n');
    src.push_str(user);
    src.push_str(postfix);
    debug_assert_eq!(src.len(), size);
    src
}
