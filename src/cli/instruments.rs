// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Instrument registry utilities.

use std::path::PathBuf;

use clap::Parser;
use log::info;

use crate::{instrument::InstrumentRegistry, XmockError};

/// List the instruments in the registry.
#[derive(Parser, Debug)]
pub struct InstrumentsArgs {
    /// JSON or YAML instrument specifications to add to the registry before
    /// listing it.
    #[clap(name = "SPEC_FILES", parse(from_os_str))]
    spec_files: Vec<PathBuf>,

    /// Only print the names of the instruments.
    #[clap(short, long)]
    names_only: bool,
}

impl InstrumentsArgs {
    pub fn run(self) -> Result<(), XmockError> {
        let registry = registry_with_files(&self.spec_files)?;
        if self.names_only {
            for name in registry.names() {
                info!("{name}");
            }
        } else {
            for line in registry.show().lines() {
                info!("{line}");
            }
        }
        info!("{} instruments in the registry", registry.len());
        Ok(())
    }
}

/// Write an instrument specification to a JSON file.
#[derive(Parser, Debug)]
pub struct InstrumentJsonArgs {
    /// The name of the instrument.
    #[clap(name = "NAME")]
    name: String,

    /// The JSON file to write.
    #[clap(name = "OUTPUT_FILE", parse(from_os_str))]
    output: PathBuf,

    /// JSON or YAML instrument specifications to add to the registry first.
    #[clap(short, long, parse(from_os_str))]
    spec_files: Vec<PathBuf>,
}

impl InstrumentJsonArgs {
    pub fn run(self) -> Result<(), XmockError> {
        let registry = registry_with_files(&self.spec_files)?;
        registry.write_instrument_json(&self.name, &self.output)?;
        Ok(())
    }
}

fn registry_with_files(spec_files: &[PathBuf]) -> Result<InstrumentRegistry, XmockError> {
    let mut registry = InstrumentRegistry::with_builtins();
    for file in spec_files {
        let name = registry.add_from_file(file)?;
        info!("Added instrument '{name}' from {}", file.display());
    }
    Ok(registry)
}
