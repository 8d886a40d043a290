// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The instrument registry.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
    str::FromStr,
};

use indexmap::IndexMap;
use itertools::Itertools;
use log::{debug, info};
use serde_json::Value;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use super::{builtin::builtin_instruments, ChipSpec, InstrumentError, InstrumentSpec};

#[derive(Debug, Display, EnumIter, EnumString)]
enum SpecFileType {
    #[strum(serialize = "json")]
    Json,
    #[strum(serialize = "yaml", serialize = "yml")]
    Yaml,
}

lazy_static::lazy_static! {
    pub(super) static ref SPEC_FILE_TYPES_COMMA_SEPARATED: String = SpecFileType::iter().join(", ");
}

/// A collection of named instrument specifications.
///
/// Specifications are never replaced once added, and lookups hand out copies,
/// so nothing outside of the registry can change what it holds. The registry
/// is a plain value; share it across threads the way you would share any other
/// collection.
#[derive(Debug, Clone, Default)]
pub struct InstrumentRegistry {
    specs: IndexMap<String, InstrumentSpec>,
}

impl InstrumentRegistry {
    /// An empty registry.
    pub fn new() -> InstrumentRegistry {
        InstrumentRegistry::default()
    }

    /// A registry holding the built-in instrument specifications.
    pub fn with_builtins() -> InstrumentRegistry {
        let specs = builtin_instruments()
            .into_iter()
            .map(|spec| (spec.name.clone(), spec))
            .collect();
        InstrumentRegistry { specs }
    }

    /// Add a specification, returning its name.
    pub fn add(&mut self, spec: InstrumentSpec) -> Result<String, InstrumentError> {
        spec.validate()?;
        if self.specs.contains_key(&spec.name) {
            return Err(InstrumentError::AlreadyRegistered(spec.name));
        }
        let name = spec.name.clone();
        self.specs.insert(name.clone(), spec);
        debug!("The {name} instrument specification has been added to the instrument registry.");
        Ok(name)
    }

    /// Validate and add a specification given as a JSON object.
    pub fn add_value(&mut self, value: Value) -> Result<String, InstrumentError> {
        let spec = InstrumentSpec::try_from(value)?;
        self.add(spec)
    }

    /// Validate and add a specification stored in a JSON or YAML file.
    pub fn add_from_file<P: AsRef<Path>>(&mut self, file: P) -> Result<String, InstrumentError> {
        let file = file.as_ref();
        debug!("Attempting to parse instrument file {}", file.display());
        let file_type = file
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .and_then(|e| SpecFileType::from_str(&e).ok());
        let value: Value = match file_type {
            Some(SpecFileType::Json) => {
                let buf = BufReader::new(File::open(file)?);
                serde_json::from_reader(buf).map_err(|e| InstrumentError::Parse {
                    file: file.to_path_buf(),
                    err: e.to_string(),
                })?
            }
            Some(SpecFileType::Yaml) => {
                let buf = BufReader::new(File::open(file)?);
                serde_yaml::from_reader(buf).map_err(|e| InstrumentError::Parse {
                    file: file.to_path_buf(),
                    err: e.to_string(),
                })?
            }
            None => return Err(InstrumentError::UnknownFileType(file.to_path_buf())),
        };
        self.add_value(value)
    }

    /// Get a copy of a specification.
    pub fn get(&self, name: &str) -> Result<InstrumentSpec, InstrumentError> {
        self.specs
            .get(name)
            .cloned()
            .ok_or_else(|| InstrumentError::NotInRegistry(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.specs.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// The names of all specifications, in the order that they were added.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.specs.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &InstrumentSpec)> {
        self.specs.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Using an existing imaging instrument, add a simple square instrument
    /// with the given field of view \[arcminutes\] and number of pixels on a
    /// side.
    #[allow(clippy::too_many_arguments)]
    pub fn make_simple_instrument(
        &mut self,
        base_inst: &str,
        new_inst: &str,
        fov: f64,
        num_pixels: u32,
        no_bkgnd: bool,
        no_psf: bool,
        no_dither: bool,
    ) -> Result<String, InstrumentError> {
        let mut spec = self.get(base_inst)?;
        let imaging = spec
            .imaging
            .as_mut()
            .ok_or_else(|| InstrumentError::NotImaging(base_inst.to_string()))?;
        let n = num_pixels as f64;
        imaging.chips = Some(vec![ChipSpec::Box {
            x0: 0.0,
            y0: 0.0,
            width: n,
            height: n,
        }]);
        imaging.fov = fov;
        imaging.num_pixels = num_pixels;
        if no_psf {
            imaging.psf = None;
        }
        if imaging.dither {
            imaging.dither = !no_dither;
        }
        if no_bkgnd {
            spec.bkgnd = None;
        } else if base_inst.starts_with("aciss") {
            // ACIS-S uses the back-illuminated background of S3.
            spec.bkgnd = Some(super::BkgndSpec::Alias("aciss".to_string()));
        }
        spec.name = new_inst.to_string();
        self.add(spec)
    }

    /// Write a specification to a JSON file, e.g. to make a new specification
    /// by editing an existing one.
    pub fn write_instrument_json<P: AsRef<Path>>(
        &self,
        name: &str,
        file: P,
    ) -> Result<(), InstrumentError> {
        let spec = self.get(name)?;
        let mut buf = BufWriter::new(File::create(file.as_ref())?);
        serde_json::to_writer_pretty(&mut buf, &spec).map_err(|err| InstrumentError::Serialise {
            name: name.to_string(),
            err,
        })?;
        buf.write_all(b"\n")?;
        buf.flush()?;
        info!(
            "Wrote the {name} instrument specification to {}",
            file.as_ref().display()
        );
        Ok(())
    }

    /// A human-readable listing of every specification.
    pub fn show(&self) -> String {
        let mut out = String::new();
        for (name, spec) in self.iter() {
            out.push_str(&format!("Instrument: {name}\n"));
            if let Value::Object(map) = Value::from(spec.clone()) {
                for (k, v) in map {
                    out.push_str(&format!("    {k}: {v}\n"));
                }
            }
        }
        out
    }
}
