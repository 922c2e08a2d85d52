use std::fmt::{Formatter as FmtFormatter, Result as FmtResult};

pub fn get_indent(depth: usize) -> String {
    "  ".repeat(depth)
}

/// Multi-line rendering used for debugging output and snapshots.
pub trait PrettyDisplay {
    fn pretty_fmt(&self, f: &mut FmtFormatter<'_>, depth: usize) -> FmtResult;
}
