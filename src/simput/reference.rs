// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! SIMPUT reference strings, which locate a source's payload.
//!
//! The grammar is `<file>[<ext>,<version>]`, where an empty `<file>` means
//! the catalog's own file. Spectra stored as rows of a single extension also
//! carry a row selector, either in a second bracket group
//! (`<file>[spectrum,<version>][NAME=='<name>']`) or in the same one
//! (`<file>[spectrum,<version>,ROW=='<row>']`). A `ROW` selector is a 0-indexed
//! row number; any other selector is matched against the `NAME` column.

use std::{fmt, str::FromStr};

use lazy_static::lazy_static;
use regex::Regex;
use strum_macros::{Display, EnumString};

use super::SimputError;

lazy_static! {
    /// A file part without brackets, then one or more bracket groups.
    static ref REFERENCE: Regex = Regex::new(r"^([^\[\]]*)((?:\[[^\[\]]*\])+)$").unwrap();

    static ref BRACKET_GROUP: Regex = Regex::new(r"\[([^\[\]]*)\]").unwrap();
}

/// The kinds of SIMPUT extensions that a reference can point to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum ExtensionKind {
    #[strum(serialize = "phlist")]
    PhotonList,

    #[strum(serialize = "spectrum")]
    Spectrum,

    #[strum(serialize = "image")]
    Image,
}

impl ExtensionKind {
    /// The `EXTNAME` of this kind of extension.
    pub fn extname(self) -> &'static str {
        match self {
            ExtensionKind::PhotonList => "PHLIST",
            ExtensionKind::Spectrum => "SPECTRUM",
            ExtensionKind::Image => "IMAGE",
        }
    }
}

/// Selects one spectrum out of an extension holding many.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowSelector {
    /// A 0-indexed row.
    Index(usize),

    /// A value of the `NAME` column.
    Name(String),
}

/// A parsed SIMPUT reference string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReference {
    /// The file holding the payload. Empty means the catalog's own file.
    pub file: String,

    pub kind: ExtensionKind,

    /// `None` means the first extension of this kind.
    pub version: Option<u32>,

    pub row: Option<RowSelector>,
}

impl SourceReference {
    fn malformed(s: &str, reason: &'static str) -> SimputError {
        SimputError::MalformedReference {
            reference: s.to_string(),
            reason,
        }
    }
}

fn parse_row_selector(s: &str, selector: &str) -> Result<RowSelector, SimputError> {
    let (key, value) = selector
        .split_once("==")
        .ok_or_else(|| SourceReference::malformed(s, "row selectors look like ROW=='<row>'"))?;
    let value = value.trim().trim_matches(|c| c == '\'' || c == '"');
    if key.trim().eq_ignore_ascii_case("row") {
        value
            .parse()
            .map(RowSelector::Index)
            .map_err(|_| {
                SourceReference::malformed(s, "ROW selectors must be non-negative integers")
            })
    } else {
        Ok(RowSelector::Name(value.to_string()))
    }
}

impl FromStr for SourceReference {
    type Err = SimputError;

    fn from_str(s: &str) -> Result<SourceReference, SimputError> {
        let s = s.trim();
        let captures = REFERENCE
            .captures(s)
            .ok_or_else(|| SourceReference::malformed(s, "unbalanced or misplaced brackets"))?;
        let file = captures[1].to_string();
        let groups: Vec<&str> = BRACKET_GROUP
            .captures_iter(&captures[2])
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str())
            .collect();
        if groups.len() > 2 {
            return Err(SourceReference::malformed(s, "too many bracket groups"));
        }

        let mut parts = groups[0].split(',').map(str::trim);
        let tag = parts.next().unwrap_or_default();
        let kind: ExtensionKind = tag
            .parse()
            .map_err(|_| SimputError::UnrecognisedExtension(tag.to_string()))?;
        let version = match parts.next() {
            None | Some("") => None,
            Some(v) => Some(
                v.parse()
                    .map_err(|_| SourceReference::malformed(s, "the version must be an integer"))?,
            ),
        };
        let inline_row = parts.next();
        if parts.next().is_some() {
            return Err(SourceReference::malformed(s, "too many items in brackets"));
        }

        let row = match (inline_row, groups.get(1)) {
            (Some(_), Some(_)) => {
                return Err(SourceReference::malformed(s, "more than one row selector"))
            }
            (Some(selector), None) | (None, Some(&selector)) => {
                if kind != ExtensionKind::Spectrum {
                    return Err(SourceReference::malformed(
                        s,
                        "only spectra can have a row selector",
                    ));
                }
                Some(parse_row_selector(s, selector)?)
            }
            (None, None) => None,
        };

        Ok(SourceReference {
            file,
            kind,
            version,
            row,
        })
    }
}

impl fmt::Display for SourceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}", self.file, self.kind.extname())?;
        if let Some(v) = self.version {
            write!(f, ",{v}")?;
        }
        write!(f, "]")?;
        match &self.row {
            Some(RowSelector::Index(i)) => write!(f, "[ROW=='{i}']"),
            Some(RowSelector::Name(n)) => write!(f, "[NAME=='{n}']"),
            None => Ok(()),
        }
    }
}
