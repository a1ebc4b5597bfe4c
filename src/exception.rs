use crate::types::{ErrorTypeRegistry, UNNAMED_ERROR_TYPE};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::Write as _;

/// One link of an exception chain: type name, message, stack frames and
/// an optional cause.
///
/// Frames are pre-rendered lines, innermost first. A link built from a
/// `dyn Error` has no frames of its own; the layer attaches the captured
/// call stack to the outermost link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionInfo {
    pub type_name: String,
    pub message: String,
    pub frames: Vec<String>,
    pub cause: Option<Box<ExceptionInfo>>,
}

impl ExceptionInfo {
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        ExceptionInfo {
            type_name: type_name.into(),
            message: message.into(),
            frames: Vec::new(),
            cause: None,
        }
    }

    pub fn with_frames(mut self, frames: Vec<String>) -> Self {
        self.frames = frames;
        self
    }

    pub fn caused_by(mut self, cause: ExceptionInfo) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Build a chain from an error and its `source()` links, naming every
    /// link through `types`.
    pub fn from_error(err: &(dyn Error + 'static), types: &ErrorTypeRegistry) -> Self {
        let mut links = Vec::new();
        let mut current = Some(err);
        while let Some(e) = current {
            links.push(ExceptionInfo::new(types.name_of(e), e.to_string()));
            current = next_link(e, types);
        }

        // Fold from the innermost cause outwards.
        let mut chain: Option<ExceptionInfo> = None;
        while let Some(mut link) = links.pop() {
            link.cause = chain.map(Box::new);
            chain = Some(link);
        }
        chain.unwrap_or_else(|| ExceptionInfo::new(types.name_of(err), err.to_string()))
    }

    /// Iterate the chain from this link to the innermost cause.
    pub fn chain(&self) -> impl Iterator<Item = &ExceptionInfo> {
        std::iter::successors(Some(self), |e| e.cause.as_deref())
    }

    /// Follow cause links while the current link's type is a passthrough
    /// type and it has a cause.
    pub fn resolve_root<'a>(&'a self, passthrough: &HashSet<String>) -> &'a ExceptionInfo {
        let mut root = self;
        while passthrough.contains(&root.type_name) {
            match root.cause.as_deref() {
                Some(cause) => root = cause,
                None => break,
            }
        }
        root
    }

    /// Full trace of this link and every cause below it.
    pub fn render_trace(&self) -> String {
        let mut out = String::new();
        for (depth, link) in self.chain().enumerate() {
            if depth > 0 {
                out.push_str("Caused by: ");
            }
            out.push_str(&link.header());
            out.push('\n');
            for frame in &link.frames {
                let _ = writeln!(out, "\tat {}", frame);
            }
        }
        out
    }

    fn header(&self) -> String {
        if self.message.is_empty() {
            self.type_name.clone()
        } else {
            format!("{}: {}", self.type_name, self.message)
        }
    }
}

fn next_link<'a>(
    err: &'a (dyn Error + 'static),
    types: &ErrorTypeRegistry,
) -> Option<&'a (dyn Error + 'static)> {
    // A custom io::Error forwards source() to its payload's source, skipping
    // the payload. Plain message payloads are not a link of their own.
    if let Some(inner) = err.downcast_ref::<std::io::Error>().and_then(|io| io.get_ref()) {
        if types.name_of(inner) != UNNAMED_ERROR_TYPE {
            return Some(inner as &(dyn Error + 'static));
        }
    }
    err.source()
}
