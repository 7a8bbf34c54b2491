//! MIME type detection module
//!
//! Maps file extensions to Content-Type values. The table is an owned,
//! read-only value built at startup: built-in entries, then configured
//! overrides, then the `.wasm` mapping, which always wins. Extensions the
//! table does not know fall back to the `mime_guess` database.

use std::collections::HashMap;
use std::path::Path;

pub const WASM_EXTENSION: &str = "wasm";
pub const WASM_MIME_TYPE: &str = "application/wasm";
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Entries that differ from, or are missing in, `mime_guess`
const BUILTIN_TYPES: &[(&str, &str)] = &[
    // Text
    ("html", "text/html; charset=utf-8"),
    ("htm", "text/html; charset=utf-8"),
    ("css", "text/css; charset=utf-8"),
    ("txt", "text/plain; charset=utf-8"),
    ("md", "text/plain; charset=utf-8"),
    ("csv", "text/csv; charset=utf-8"),
    // JavaScript/WASM
    ("js", "text/javascript; charset=utf-8"),
    ("mjs", "text/javascript; charset=utf-8"),
    ("json", "application/json"),
    ("map", "application/json"),
    ("webmanifest", "application/manifest+json"),
    ("wasm", WASM_MIME_TYPE),
    // Archives
    ("gz", "application/gzip"),
    ("tgz", "application/gzip"),
    // Databases shipped with WASM apps
    ("sqlite", "application/vnd.sqlite3"),
    ("sqlite3", "application/vnd.sqlite3"),
    ("db", "application/vnd.sqlite3"),
];

/// Extension -> MIME type table
#[derive(Debug, Clone)]
pub struct MimeTable {
    types: HashMap<String, String>,
}

impl MimeTable {
    /// Build the table from built-in entries plus `overrides`.
    ///
    /// Override keys are case-insensitive and may carry a leading dot
    /// (`".map.json"` and `"map.json"` are the same entry).
    pub fn with_overrides<'a, I>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mut types: HashMap<String, String> = BUILTIN_TYPES
            .iter()
            .map(|(ext, mime)| ((*ext).to_string(), (*mime).to_string()))
            .collect();

        for (ext, mime) in overrides {
            types.insert(normalize_extension(ext), mime.clone());
        }

        types.insert(WASM_EXTENSION.to_string(), WASM_MIME_TYPE.to_string());

        Self { types }
    }

    /// Exact lookup of a single (possibly compound) extension
    pub fn lookup(&self, extension: &str) -> Option<&str> {
        self.types
            .get(&normalize_extension(extension))
            .map(String::as_str)
    }

    /// Content-Type for a file path, preferring the longest known suffix.
    ///
    /// `bundle.d.ts` tries `d.ts` before `ts`; the last extension is then
    /// looked up in `mime_guess`. A leading dot marks a hidden file, not an
    /// extension, so `.env` has none.
    pub fn content_type(&self, path: &Path) -> &str {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return DEFAULT_MIME_TYPE;
        };
        let name = name.to_ascii_lowercase();

        let suffixes = name
            .char_indices()
            .skip(1)
            .filter(|&(_, c)| c == '.')
            .map(|(i, _)| &name[i + 1..]);

        if let Some(known) = suffixes.clone().find_map(|ext| self.lookup(ext)) {
            return known;
        }
        suffixes
            .last()
            .and_then(|ext| mime_guess::from_ext(ext).first_raw())
            .unwrap_or(DEFAULT_MIME_TYPE)
    }
}

impl Default for MimeTable {
    fn default() -> Self {
        Self::with_overrides(&HashMap::<String, String>::new())
    }
}

fn normalize_extension(extension: &str) -> String {
    extension.trim_start_matches('.').to_ascii_lowercase()
}
