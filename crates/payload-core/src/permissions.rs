//! Normalization of UNIX permission bits in archive entries.
//!
//! Extracted files must be writable only by their owner; shell scripts get
//! the owner-execute bit. Attributes tagged with any other host system are
//! left as they are.

use crate::codec::{ExternalAttributes, HostSystem};
use std::path::Path;

/// Group write.
pub const S_IWGRP: u32 = 0o020;
/// Others write.
pub const S_IWOTH: u32 = 0o002;
/// Owner execute.
pub const S_IXUSR: u32 = 0o100;

const WRITE_MASK: u32 = !((S_IWGRP | S_IWOTH) << 16);

pub fn normalize(name: &str, attributes: ExternalAttributes) -> ExternalAttributes {
    if attributes.system != HostSystem::Unix {
        return attributes;
    }

    let mut bits = attributes.bits & WRITE_MASK;
    if is_shell_script(name) {
        bits |= S_IXUSR << 16;
    }
    ExternalAttributes { bits, ..attributes }
}

fn is_shell_script(name: &str) -> bool {
    Path::new(name).extension().is_some_and(|ext| ext == "sh")
}
