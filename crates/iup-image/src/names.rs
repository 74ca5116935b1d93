// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Multi-selection file name lists in the toolkit's `dir|name1|name2|` form,
// assembled in a zero-wiped scratch buffer.

use iup_core::error::{IupError, Result};

use crate::array::GrowableArray;

const SEPARATOR: u8 = b'|';

/// Initial scratch size; paths rarely need more than one step of growth.
const SCRATCH_START: usize = 256;

/// Builder for a multi-selection value.
///
/// ```ignore
/// let mut list = SelectionList::new("/home/user")?;
/// list.push("a.txt")?;
/// list.push("b.txt")?;
/// assert_eq!(list.finish()?, "/home/user|a.txt|b.txt|");
/// ```
#[derive(Debug)]
pub struct SelectionList {
    scratch: GrowableArray<u8>,
    names: usize,
}

impl SelectionList {
    /// Start a list rooted at `directory`.
    pub fn new(directory: &str) -> Result<Self> {
        check_component(directory, true)?;
        let mut scratch = GrowableArray::with_capacity(SCRATCH_START)?;
        scratch.push_slice(directory.as_bytes())?;
        Ok(Self { scratch, names: 0 })
    }

    /// Append one selected file name.
    pub fn push(&mut self, name: &str) -> Result<()> {
        check_component(name, false)?;
        self.scratch.push_slice(&[SEPARATOR])?;
        self.scratch.push_slice(name.as_bytes())?;
        self.names += 1;
        Ok(())
    }

    /// Number of names pushed so far.
    pub fn len(&self) -> usize {
        self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names == 0
    }

    /// Produce the final value. No names yields the directory alone, a
    /// single name the plain joined path (`dir/name`), and several names
    /// `dir|name1|...|nameN|`.
    pub fn finish(mut self) -> Result<String> {
        if self.names == 1 {
            let bytes = self.scratch.as_mut_slice();
            if let Some(pos) = bytes.iter().position(|&b| b == SEPARATOR) {
                if pos > 0 && bytes[pos - 1] == b'/' {
                    // Directory already ends in a slash: drop the separator.
                    self.scratch.remove(pos, 1);
                } else {
                    bytes[pos] = b'/';
                }
            }
        } else if self.names > 1 {
            self.scratch.push_slice(&[SEPARATOR])?;
        }
        String::from_utf8(self.scratch.release())
            .map_err(|err| IupError::InvalidName(err.to_string()))
    }
}

/// Split a multi-selection value back into its directory and file names.
///
/// A value without separators is a single path and is returned as
/// `(path, [])`.
pub fn split_selection(value: &str) -> (String, Vec<String>) {
    let trimmed = value.strip_suffix('|').unwrap_or(value);
    let mut parts = trimmed.split('|');
    let directory = parts.next().unwrap_or_default().to_string();
    let names = parts
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();
    (directory, names)
}

fn check_component(part: &str, allow_empty: bool) -> Result<()> {
    if part.contains('|') || (!allow_empty && part.is_empty()) {
        return Err(IupError::InvalidName(part.to_string()));
    }
    Ok(())
}
