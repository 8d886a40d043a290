// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with instrument specifications and the registry.

use std::path::PathBuf;

use thiserror::Error;

use super::registry::SPEC_FILE_TYPES_COMMA_SEPARATED;

#[derive(Error, Debug)]
pub enum InstrumentError {
    #[error("An instrument specification must be a JSON/YAML object (a mapping of items)")]
    NotAnObject,

    #[error("The instrument with name '{0}' is already in the registry! Assign a different name!")]
    AlreadyRegistered(String),

    #[error("Instrument '{0}' not in registry!")]
    NotInRegistry(String),

    #[error("Instrument '{0}': gratings instrument specifications cannot have 'imaging' == true")]
    GratingAndImaging(String),

    #[error("Instrument '{0}' is not an imaging instrument")]
    NotImaging(String),

    #[error("One or more items is missing from the instrument specification '{name}'! Items needed: {}", .fields.join(", "))]
    MissingFields { name: String, fields: Vec<String> },

    #[error("The instrument specification '{name}' has unexpected items: {}", .fields.join(", "))]
    ExtraFields { name: String, fields: Vec<String> },

    #[error("Invalid chip specification {0}; expected [\"Box\", x0, y0, width, height], [\"Circle\", x0, y0, radius] or [\"Polygon\", [x...], [y...]]")]
    BadChip(String),

    #[error("Invalid PSF specification {0}; expected [\"gaussian\", fwhm], [\"image\", file, extension] or [\"multi_image\", file]")]
    BadPsf(String),

    #[error("Invalid value for instrument item '{field}': {err}")]
    BadField {
        field: &'static str,
        err: serde_json::Error,
    },

    #[error("Instrument specification file '{}' doesn't have a recognised file extension! Valid extensions are: {}", .0.display(), *SPEC_FILE_TYPES_COMMA_SEPARATED)]
    UnknownFileType(PathBuf),

    #[error("Couldn't decode instrument specification from {}:\n{}", .file.display(), .err)]
    Parse { file: PathBuf, err: String },

    #[error("Couldn't serialise instrument '{name}' to JSON: {err}")]
    Serialise {
        name: String,
        err: serde_json::Error,
    },

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
