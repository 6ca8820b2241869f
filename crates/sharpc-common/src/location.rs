//! Source file table and packed locations.
//!
//! A [`Location`] packs a file index and a row into one `u32`. The number of
//! bits used for the file index is fixed by [`LocationTable::initialize`],
//! which runs once every file named on the command line is known. Two spare
//! bits are reserved for files that only show up later through `#line`
//! directives; once those are used up, new files map to the unregistered
//! index 0 and their locations degrade to the null location.

use crate::diagnostics::{diagnostic_codes, diagnostic_messages, format_message};
use crate::error::InternalError;
use crate::report::Report;
use rustc_hash::FxHashMap;
use serde::Serialize;
use tracing::{debug, warn};

/// Index bits reserved for files introduced by `#line` after initialization.
const LINE_DIRECTIVE_HEADROOM_BITS: u32 = 2;

/// A registered source file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    /// 1-based; 0 is the unregistered marker.
    pub index: u32,
}

/// Packed (file, row) token. Token 0 is "no location".
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Location(u32);

impl Location {
    pub const NULL: Location = Location(0);

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    pub const fn token(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct LocationTable {
    files: Vec<SourceFile>,
    by_name: FxHashMap<String, u32>,
    file_bits: u32,
    initialized: bool,
}

impl LocationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source file named on the command line.
    ///
    /// A file registered twice produces warning CS2002 and keeps its first index.
    pub fn add_file(&mut self, name: &str, report: &mut Report) -> u32 {
        if let Some(&index) = self.by_name.get(name) {
            report.warning(
                diagnostic_codes::SOURCE_FILE_SPECIFIED_MULTIPLE_TIMES,
                1,
                Location::NULL,
                format_message(
                    diagnostic_messages::SOURCE_FILE_SPECIFIED_MULTIPLE_TIMES,
                    &[name],
                ),
            );
            return index;
        }
        if self.initialized {
            return self.lookup_or_register(name);
        }
        self.push_file(name)
    }

    /// Freeze the encoding. Calling it again is a no-op.
    pub fn initialize(&mut self) {
        if self.initialized {
            return;
        }
        // Index 0 is reserved, so `files.len() + 1` distinct values must fit.
        let needed = self.files.len() as u64 + 1;
        let mut bits = 1;
        while (1u64 << bits) < needed {
            bits += 1;
        }
        self.file_bits = bits + LINE_DIRECTIVE_HEADROOM_BITS;
        self.initialized = true;
        debug!(
            files = self.files.len(),
            file_bits = self.file_bits,
            "location table initialized"
        );
    }

    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Number of file indices the frozen encoding can represent (including 0).
    pub fn capacity(&self) -> u32 {
        if self.initialized { 1 << self.file_bits } else { u32::MAX }
    }

    /// Find a file by name, registering it if there is still room.
    ///
    /// Used for `#line "file"` directives. When the reserved index space is
    /// exhausted this returns 0 instead of failing.
    pub fn lookup_or_register(&mut self, name: &str) -> u32 {
        if let Some(&index) = self.by_name.get(name) {
            return index;
        }
        if !self.initialized {
            return self.push_file(name);
        }
        let next = self.files.len() as u32 + 1;
        if next >= self.capacity() {
            warn!(file = name, "source file table exhausted; file left unregistered");
            return 0;
        }
        self.push_file(name)
    }

    fn push_file(&mut self, name: &str) -> u32 {
        let index = self.files.len() as u32 + 1;
        self.files.push(SourceFile {
            name: name.to_string(),
            index,
        });
        self.by_name.insert(name.to_string(), index);
        index
    }

    /// Encode a location. File 0 yields the null location.
    pub fn location(&self, file: u32, row: u32) -> Result<Location, InternalError> {
        if !self.initialized {
            return Err(InternalError::LocationTableNotInitialized);
        }
        if file == 0 || file as usize > self.files.len() {
            return Ok(Location::NULL);
        }
        let max_row = u32::MAX >> self.file_bits;
        let row = row.clamp(1, max_row);
        Ok(Location((row << self.file_bits) | file))
    }

    /// Location of a `#line row "file"` directive.
    pub fn line_directive(&mut self, name: &str, row: u32) -> Result<Location, InternalError> {
        let file = self.lookup_or_register(name);
        self.location(file, row)
    }

    /// Row of a location; 1 for the null location.
    pub fn row(&self, loc: Location) -> u32 {
        if loc.is_null() || !self.initialized {
            return 1;
        }
        loc.0 >> self.file_bits
    }

    pub fn file_index(&self, loc: Location) -> u32 {
        if !self.initialized {
            return 0;
        }
        loc.0 & ((1 << self.file_bits) - 1)
    }

    pub fn file(&self, loc: Location) -> Option<&SourceFile> {
        match self.file_index(loc) {
            0 => None,
            index => self.files.get(index as usize - 1),
        }
    }

    pub fn file_by_index(&self, index: u32) -> Option<&SourceFile> {
        index
            .checked_sub(1)
            .and_then(|i| self.files.get(i as usize))
    }

    /// `file(row)`, or `None` for locations without a file.
    pub fn describe(&self, loc: Location) -> Option<String> {
        self.file(loc)
            .map(|file| format!("{}({})", file.name, self.row(loc)))
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn reset(&mut self) {
        self.files.clear();
        self.by_name.clear();
        self.file_bits = 0;
        self.initialized = false;
    }
}

#[cfg(test)]
#[path = "../tests/location_tests.rs"]
mod location_tests;
