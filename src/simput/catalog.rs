// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! SIMPUT catalogs.

use std::{
    borrow::Cow,
    path::{Path, PathBuf},
};

use log::{debug, info, warn};

use super::{
    hdu::{
        next_extver, read_image, read_index_table, read_photon_list, read_spectrum,
        replace_index_table, write_index_table, write_source_hdus, IndexColumns,
    },
    ExtensionKind, SimputError, SimputSource, SourceReference,
};
use crate::{
    constants::{SIMPUT_NULL, SIMPUT_STRING_WIDTH},
    io::fits::*,
    spatial::SkyImage,
};

/// A SIMPUT catalog: an index table (`SRC_CAT`) of sources whose payloads
/// live in the same file or in other files.
///
/// Entries are only ever appended. Each append rewrites the whole index table
/// and then writes the payload; these two steps are not atomic, so a failure
/// while writing the payload leaves an index entry that can't be resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct SimputCatalog {
    path: PathBuf,
    columns: IndexColumns,
}

/// The catalog-wide parameters of every source.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogParameters {
    pub emin: Vec<f64>,
    pub emax: Vec<f64>,
    pub src_names: Vec<String>,
    pub flux: Vec<f64>,
}

impl SimputCatalog {
    /// Write a catalog with no sources. If `path` already exists, its index
    /// table is replaced and its other extensions are kept.
    pub fn create_empty<P: AsRef<Path>>(path: P) -> Result<SimputCatalog, SimputError> {
        let catalog = SimputCatalog {
            path: path.as_ref().to_path_buf(),
            columns: IndexColumns::default(),
        };
        catalog.write_index(&catalog.columns, false)?;
        Ok(catalog)
    }

    /// Make a new catalog holding a single source. The source is written to
    /// `target` if given, otherwise to the catalog file. With `overwrite`, an
    /// existing catalog file is replaced rather than extended, and so is an
    /// existing `target`.
    pub fn from_source<P: AsRef<Path>>(
        path: P,
        source: &SimputSource,
        target: Option<&Path>,
        overwrite: bool,
    ) -> Result<SimputCatalog, SimputError> {
        check_source_name(&source.name)?;
        let mut catalog = SimputCatalog {
            path: path.as_ref().to_path_buf(),
            columns: IndexColumns::default(),
        };
        catalog.write_index(&catalog.columns, overwrite)?;
        catalog.append(source, target, overwrite)?;
        Ok(catalog)
    }

    /// Read the index table of an existing catalog. No sources are read.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<SimputCatalog, SimputError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SimputError::NotFound {
                file: path.to_path_buf(),
                what: "the file".to_string(),
            });
        }
        let mut fptr = fits_open(path)?;
        let hdu = fits_open_hdu_by_name(&mut fptr, "SRC_CAT", None)?.ok_or_else(|| {
            SimputError::NotFound {
                file: path.to_path_buf(),
                what: "a SRC_CAT extension".to_string(),
            }
        })?;
        let columns = read_index_table(&mut fptr, &hdu)?;
        debug!(
            "Read {} catalog entries from {}",
            columns.spectra.len(),
            path.display()
        );
        Ok(SimputCatalog {
            path: path.to_path_buf(),
            columns,
        })
    }

    /// Add a source to the catalog. The source is written to `target` if
    /// given, otherwise to the catalog file. If `target` exists and
    /// `overwrite` is false, the source is appended to it; otherwise `target`
    /// is recreated holding only this source. The catalog file itself is never
    /// overwritten.
    ///
    /// A source with an image gets the same version for its payload and image
    /// extensions, higher than any existing version of either in `target`.
    ///
    /// If the index table can't be written, neither the catalog file nor
    /// `self` is changed.
    pub fn append(
        &mut self,
        source: &SimputSource,
        target: Option<&Path>,
        overwrite: bool,
    ) -> Result<(), SimputError> {
        check_source_name(&source.name)?;
        let target = target.unwrap_or(self.path.as_path()).to_path_buf();
        let same_file = is_same_file(&target, &self.path);
        let overwrite = overwrite && !same_file;

        let kind = source.kind();
        // An overwritten target starts from scratch.
        let extver = if overwrite {
            1
        } else {
            let extver = next_extver(&target, kind.extname())?;
            match source.image {
                Some(_) => extver.max(next_extver(&target, ExtensionKind::Image.extname())?),
                None => extver,
            }
        };
        let file = if same_file {
            String::new()
        } else {
            target.display().to_string()
        };
        let spectrum_ref = SourceReference {
            file: file.clone(),
            kind,
            version: Some(extver),
            row: None,
        }
        .to_string();
        let image_ref = match source.image {
            Some(_) => SourceReference {
                file,
                kind: ExtensionKind::Image,
                version: Some(extver),
                row: None,
            }
            .to_string(),
            None => SIMPUT_NULL.to_string(),
        };
        for reference in [&spectrum_ref, &image_ref] {
            if reference.len() > SIMPUT_STRING_WIDTH {
                return Err(SimputError::ReferenceTooLong(reference.clone()));
            }
        }

        let mut columns = self.columns.clone();
        columns.ra.push(source.ra);
        columns.dec.push(source.dec);
        columns.emin.push(source.emin);
        columns.emax.push(source.emax);
        columns.flux.push(source.flux);
        columns.spectra.push(spectrum_ref);
        columns.images.push(image_ref);
        columns.timing.push(SIMPUT_NULL.to_string());
        columns.src_names.push(source.name.clone());

        self.write_index(&columns, false)?;
        self.columns = columns;

        let mut fptr = if target.exists() && !overwrite {
            info!("Appending this source to {}.", target.display());
            fits_edit(&target)?
        } else {
            if target.exists() {
                warn!("Overwriting {} with this source.", target.display());
            } else {
                info!("Writing source to {}.", target.display());
            }
            fits_create(&target)?
        };
        write_source_hdus(&mut fptr, source, extver)
    }

    /// (Re)write the index table with `columns`.
    fn write_index(&self, columns: &IndexColumns, overwrite: bool) -> Result<(), SimputError> {
        if self.path.exists() && !overwrite {
            let mut fptr = fits_edit(&self.path)?;
            replace_index_table(&mut fptr, columns)
        } else {
            let mut fptr = fits_create(&self.path)?;
            write_index_table(&mut fptr, columns)
        }
    }

    /// The file holding the index table.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The number of sources.
    pub fn len(&self) -> usize {
        self.columns.spectra.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.spectra.is_empty()
    }

    /// \[degrees\]
    pub fn ra(&self) -> &[f64] {
        &self.columns.ra
    }

    /// \[degrees\]
    pub fn dec(&self) -> &[f64] {
        &self.columns.dec
    }

    /// \[erg/(s cm²)\]
    pub fn flux(&self) -> &[f64] {
        &self.columns.flux
    }

    /// \[keV\]
    pub fn emin(&self) -> &[f64] {
        &self.columns.emin
    }

    /// \[keV\]
    pub fn emax(&self) -> &[f64] {
        &self.columns.emax
    }

    /// The reference strings of the source payloads.
    pub fn spectra(&self) -> &[String] {
        &self.columns.spectra
    }

    /// The reference strings of the source images ("NULL" when there is
    /// none).
    pub fn images(&self) -> &[String] {
        &self.columns.images
    }

    /// Always "NULL"; time variability isn't supported.
    pub fn timing(&self) -> &[String] {
        &self.columns.timing
    }

    pub fn src_names(&self) -> &[String] {
        &self.columns.src_names
    }

    pub fn parameters(&self) -> CatalogParameters {
        CatalogParameters {
            emin: self.columns.emin.clone(),
            emax: self.columns.emax.clone(),
            src_names: self.columns.src_names.clone(),
            flux: self.columns.flux.clone(),
        }
    }

    /// A view that reads sources on demand.
    pub fn sources(&self) -> LazySources<'_> {
        LazySources {
            catalog: Cow::Borrowed(self),
        }
    }

    /// Read source `i` from disk. A new [`SimputSource`] is made on every
    /// call.
    pub fn read_source(&self, i: usize) -> Result<SimputSource, SimputError> {
        let reference_str = self
            .columns
            .spectra
            .get(i)
            .ok_or(SimputError::IndexOutOfBounds {
                index: i,
                len: self.len(),
            })?;
        let reference: SourceReference = reference_str.parse()?;
        let file = self.resolve_file(&reference.file);
        let mut fptr = open_existing(&file)?;
        let hdu = open_referenced_hdu(&mut fptr, &file, &reference)?;

        let name = self.columns.src_names[i].clone();
        let mut source = match reference.kind {
            ExtensionKind::PhotonList => {
                let photons = read_photon_list(&mut fptr, &hdu)?;
                SimputSource::from_photon_list(photons, self.columns.flux[i], &name)?
            }
            ExtensionKind::Spectrum => {
                let spectrum = read_spectrum(&mut fptr, &hdu, reference.row.as_ref())?;
                SimputSource::from_spectrum(
                    &name,
                    spectrum,
                    self.columns.ra[i],
                    self.columns.dec[i],
                )
            }
            ExtensionKind::Image => {
                return Err(SimputError::UnsupportedType(reference_str.clone()))
            }
        };
        source.image = self.read_image(i)?;
        Ok(source)
    }

    /// Read the image of source `i`, if it has one.
    fn read_image(&self, i: usize) -> Result<Option<SkyImage>, SimputError> {
        let image_str = &self.columns.images[i];
        if image_str.eq_ignore_ascii_case(SIMPUT_NULL) {
            return Ok(None);
        }
        let image_ref: SourceReference = image_str.parse()?;
        let image_file = self.resolve_file(&image_ref.file);
        let mut fptr = open_existing(&image_file)?;
        let hdu = open_referenced_hdu(&mut fptr, &image_file, &image_ref)?;
        Ok(Some(read_image(&mut fptr, &hdu)?))
    }

    /// An empty file part of a reference means the catalog file.
    fn resolve_file(&self, file: &str) -> PathBuf {
        if file.is_empty() {
            self.path.clone()
        } else {
            PathBuf::from(file)
        }
    }
}

/// Source names must fit in the index table's `SRC_NAME` column.
fn check_source_name(name: &str) -> Result<(), SimputError> {
    if name.len() > SIMPUT_STRING_WIDTH {
        return Err(SimputError::BadSourceName {
            name: name.to_string(),
            reason: "it is longer than 80 characters",
        });
    }
    if name.contains('\0') {
        return Err(SimputError::BadSourceName {
            name: name.escape_default().to_string(),
            reason: "it contains a NUL byte",
        });
    }
    Ok(())
}

fn open_existing(file: &Path) -> Result<fitsio::FitsFile, SimputError> {
    if !file.exists() {
        return Err(SimputError::NotFound {
            file: file.to_path_buf(),
            what: "the file".to_string(),
        });
    }
    Ok(fits_open(file)?)
}

fn open_referenced_hdu(
    fptr: &mut fitsio::FitsFile,
    file: &Path,
    reference: &SourceReference,
) -> Result<fitsio::hdu::FitsHdu, SimputError> {
    let extname = reference.kind.extname();
    fits_open_hdu_by_name(fptr, extname, reference.version)?.ok_or_else(|| {
        SimputError::NotFound {
            file: file.to_path_buf(),
            what: match reference.version {
                Some(v) => format!("extension {extname},{v}"),
                None => format!("extension {extname}"),
            },
        }
    })
}

/// Are these paths the same file? Paths that can't be canonicalised (e.g.
/// because they don't exist yet) are compared as written.
fn is_same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Read a catalog's index table, returning a view that reads its sources on
/// demand along with the catalog-wide source parameters.
pub fn read_simput_catalog<P: AsRef<Path>>(
    path: P,
) -> Result<(LazySources<'static>, CatalogParameters), SimputError> {
    let catalog = SimputCatalog::load(path)?;
    let parameters = catalog.parameters();
    Ok((
        LazySources {
            catalog: Cow::Owned(catalog),
        },
        parameters,
    ))
}

/// The sources of a catalog, read from disk only when asked for. Nothing is
/// cached; each access makes a new [`SimputSource`], and iterating again
/// starts from the first source.
#[derive(Debug, Clone)]
pub struct LazySources<'a> {
    catalog: Cow<'a, SimputCatalog>,
}

impl<'a> LazySources<'a> {
    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    /// Read source `i`.
    pub fn get(&self, i: usize) -> Result<SimputSource, SimputError> {
        self.catalog.read_source(i)
    }

    pub fn catalog(&self) -> &SimputCatalog {
        &self.catalog
    }

    pub fn iter(&self) -> LazySourcesIter<'_, 'a> {
        LazySourcesIter {
            sources: self,
            next: 0,
        }
    }
}

impl<'b, 'a> IntoIterator for &'b LazySources<'a> {
    type Item = Result<SimputSource, SimputError>;
    type IntoIter = LazySourcesIter<'b, 'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterates over [`LazySources`], reading each source as it goes.
#[derive(Debug)]
pub struct LazySourcesIter<'b, 'a> {
    sources: &'b LazySources<'a>,
    next: usize,
}

impl Iterator for LazySourcesIter<'_, '_> {
    type Item = Result<SimputSource, SimputError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.sources.len() {
            return None;
        }
        let source = self.sources.get(self.next);
        self.next += 1;
        Some(source)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.sources.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for LazySourcesIter<'_, '_> {}
