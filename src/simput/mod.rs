// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! SIMPUT ("SIMulation inPUT") files.
//!
//! A catalog is an index table (`SRC_CAT`) with one row per source. Each row
//! points at the source's payload (a `SPECTRUM` or `PHLIST` extension) and,
//! optionally, an `IMAGE` extension with a [reference string](SourceReference).
//! Payloads may live in the catalog file or in other files. Extensions of the
//! same kind in one file are told apart by their `EXTVER`.

mod catalog;
mod error;
mod hdu;
mod reference;
mod source;
#[cfg(test)]
mod tests;

pub use catalog::{
    read_simput_catalog, CatalogParameters, LazySources, LazySourcesIter, SimputCatalog,
};
pub use error::SimputError;
pub use reference::{ExtensionKind, RowSelector, SourceReference};
pub use source::{PhotonList, SimputSource, SourcePayload};
