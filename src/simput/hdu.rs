// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Reading and writing the FITS extensions of SIMPUT files.

use std::path::Path;

use fitsio::{
    hdu::FitsHdu,
    tables::{ColumnDataType, ConcreteColumnDescription},
    FitsFile,
};
use log::{debug, warn};
use ndarray::Array2;

use super::{PhotonList, RowSelector, SimputError, SimputSource, SourcePayload};
use crate::{
    constants::{SIMPUT_HDUVERS, SIMPUT_STRING_WIDTH},
    io::fits::*,
    spatial::{SkyImage, TanWcs},
    spectra::Spectrum,
};

/// The columns of a catalog index table.
#[derive(Debug, Clone, Default, PartialEq)]
pub(super) struct IndexColumns {
    pub(super) ra: Vec<f64>,
    pub(super) dec: Vec<f64>,
    pub(super) emin: Vec<f64>,
    pub(super) emax: Vec<f64>,
    pub(super) flux: Vec<f64>,
    pub(super) spectra: Vec<String>,
    pub(super) images: Vec<String>,
    pub(super) timing: Vec<String>,
    pub(super) src_names: Vec<String>,
}

fn column(name: &str, data_type: ColumnDataType) -> Result<ConcreteColumnDescription, FitsError> {
    fits_column(name, data_type, 1)
}

fn string_column(name: &str) -> Result<ConcreteColumnDescription, FitsError> {
    fits_column(name, ColumnDataType::String, SIMPUT_STRING_WIDTH)
}

/// Write the catalog index (`SRC_CAT`) table into a file. The table is always
/// appended; see [`replace_index_table`] for files that already have one.
pub(super) fn write_index_table(
    fptr: &mut FitsFile,
    columns: &IndexColumns,
) -> Result<(), SimputError> {
    let descriptions = [
        column("SRC_ID", ColumnDataType::Int)?,
        column("RA", ColumnDataType::Double)?,
        column("DEC", ColumnDataType::Double)?,
        column("E_MIN", ColumnDataType::Double)?,
        column("E_MAX", ColumnDataType::Double)?,
        column("FLUX", ColumnDataType::Double)?,
        string_column("SPECTRUM")?,
        string_column("IMAGE")?,
        string_column("TIMING")?,
        string_column("SRC_NAME")?,
    ];
    let hdu = fits_create_table(fptr, "SRC_CAT", &descriptions)?;

    let src_id: Vec<i32> = (0..columns.ra.len() as i32).collect();
    fits_write_col(fptr, &hdu, "SRC_ID", &src_id)?;
    fits_write_col(fptr, &hdu, "RA", &columns.ra)?;
    fits_write_col(fptr, &hdu, "DEC", &columns.dec)?;
    fits_write_col(fptr, &hdu, "E_MIN", &columns.emin)?;
    fits_write_col(fptr, &hdu, "E_MAX", &columns.emax)?;
    fits_write_col(fptr, &hdu, "FLUX", &columns.flux)?;
    fits_write_col(fptr, &hdu, "SPECTRUM", &columns.spectra)?;
    fits_write_col(fptr, &hdu, "IMAGE", &columns.images)?;
    fits_write_col(fptr, &hdu, "TIMING", &columns.timing)?;
    fits_write_col(fptr, &hdu, "SRC_NAME", &columns.src_names)?;

    fits_write_key(fptr, &hdu, "HDUCLASS", "HEASARC")?;
    fits_write_key(fptr, &hdu, "HDUCLAS1", "SIMPUT")?;
    fits_write_key(fptr, &hdu, "HDUCLAS2", "SRC_CAT")?;
    fits_write_key(fptr, &hdu, "HDUVERS", SIMPUT_HDUVERS)?;
    fits_write_key(fptr, &hdu, "RADECSYS", "FK5")?;
    fits_write_key(fptr, &hdu, "EQUINOX", 2000.0)?;
    for (key, unit) in [
        ("TUNIT2", "deg"),
        ("TUNIT3", "deg"),
        ("TUNIT4", "keV"),
        ("TUNIT5", "keV"),
        ("TUNIT6", "erg/s/cm**2"),
    ] {
        fits_write_key(fptr, &hdu, key, unit)?;
    }
    debug!(
        "Wrote SRC_CAT with {} sources to {}",
        columns.ra.len(),
        fptr.file_path().display()
    );
    Ok(())
}

/// Replace the index table of an existing file. The new table is written
/// before any old `SRC_CAT` table is removed, so a failed write leaves the
/// previous index as it was.
pub(super) fn replace_index_table(
    fptr: &mut FitsFile,
    columns: &IndexColumns,
) -> Result<(), SimputError> {
    let num_old_hdus = fits_num_hdus(fptr)?;
    if let Err(e) = write_index_table(fptr, columns) {
        // Remove whatever part of the new table made it into the file.
        for i in (num_old_hdus..fits_num_hdus(fptr)?).rev() {
            if let Err(cleanup_error) = fits_delete_hdu(fptr, i) {
                warn!("Couldn't remove a partially written SRC_CAT: {cleanup_error}");
            }
        }
        return Err(e);
    }

    for i in (1..num_old_hdus).rev() {
        let hdu = fits_open_hdu(fptr, i)?;
        let name: Option<String> = fits_get_optional_key(fptr, &hdu, "EXTNAME")?;
        if name.is_some_and(|n| n.eq_ignore_ascii_case("SRC_CAT")) {
            fits_delete_hdu(fptr, i)?;
        }
    }
    Ok(())
}

/// Read the catalog index (`SRC_CAT`) table. Tables without `IMAGE` or
/// `TIMING` columns get "NULL" entries.
pub(super) fn read_index_table(
    fptr: &mut FitsFile,
    hdu: &FitsHdu,
) -> Result<IndexColumns, SimputError> {
    let col_names = fits_get_col_names(fptr, hdu)?;
    let has_col = |name: &str| col_names.iter().any(|c| c.eq_ignore_ascii_case(name));
    let spectra: Vec<String> = fits_get_col(fptr, hdu, "SPECTRUM")?;
    let null_col = || vec![crate::constants::SIMPUT_NULL.to_string(); spectra.len()];
    let images = if has_col("IMAGE") {
        fits_get_col(fptr, hdu, "IMAGE")?
    } else {
        null_col()
    };
    let timing = if has_col("TIMING") {
        fits_get_col(fptr, hdu, "TIMING")?
    } else {
        null_col()
    };

    Ok(IndexColumns {
        ra: fits_get_col(fptr, hdu, "RA")?,
        dec: fits_get_col(fptr, hdu, "DEC")?,
        emin: fits_get_col(fptr, hdu, "E_MIN")?,
        emax: fits_get_col(fptr, hdu, "E_MAX")?,
        flux: fits_get_col(fptr, hdu, "FLUX")?,
        spectra: spectra.iter().map(|s| s.trim().to_string()).collect(),
        images: images.iter().map(|s| s.trim().to_string()).collect(),
        timing,
        src_names: fits_get_col::<String>(fptr, hdu, "SRC_NAME")?
            .into_iter()
            .map(|s| s.trim().to_string())
            .collect(),
    })
}

/// Append a source's payload extension (and its image, if any) to a file.
pub(super) fn write_source_hdus(
    fptr: &mut FitsFile,
    source: &SimputSource,
    extver: u32,
) -> Result<(), SimputError> {
    let extname = source.kind().extname();
    let (hdu, hduclas1) = match &source.payload {
        SourcePayload::Spectrum(spectrum) => {
            let hdu = fits_create_table(
                fptr,
                extname,
                &[
                    column("ENERGY", ColumnDataType::Float)?,
                    column("FLUXDENSITY", ColumnDataType::Double)?,
                ],
            )?;
            let emid: Vec<f32> = spectrum.emid().into_iter().map(|e| e as f32).collect();
            fits_write_col(fptr, &hdu, "ENERGY", &emid)?;
            fits_write_col(fptr, &hdu, "FLUXDENSITY", spectrum.flux())?;
            fits_write_key(fptr, &hdu, "TUNIT1", "keV")?;
            fits_write_key(fptr, &hdu, "TUNIT2", "photon/(cm**2*s*keV)")?;
            (hdu, "SPECTRUM")
        }
        SourcePayload::PhotonList(photons) => {
            let hdu = fits_create_table(
                fptr,
                extname,
                &[
                    column("ENERGY", ColumnDataType::Float)?,
                    column("RA", ColumnDataType::Double)?,
                    column("DEC", ColumnDataType::Double)?,
                ],
            )?;
            let energy: Vec<f32> = photons.energy().iter().map(|&e| e as f32).collect();
            fits_write_col(fptr, &hdu, "ENERGY", &energy)?;
            fits_write_col(fptr, &hdu, "RA", photons.ra())?;
            fits_write_col(fptr, &hdu, "DEC", photons.dec())?;
            fits_write_key(fptr, &hdu, "TUNIT1", "keV")?;
            fits_write_key(fptr, &hdu, "TUNIT2", "deg")?;
            fits_write_key(fptr, &hdu, "TUNIT3", "deg")?;
            (hdu, "PHOTONS")
        }
    };
    fits_write_key(fptr, &hdu, "HDUCLASS", "HEASARC/SIMPUT")?;
    fits_write_key(fptr, &hdu, "HDUCLAS1", hduclas1)?;
    fits_write_key(fptr, &hdu, "HDUVERS", SIMPUT_HDUVERS)?;
    fits_write_key(fptr, &hdu, "REFRA", source.ra)?;
    fits_write_key(fptr, &hdu, "REFDEC", source.dec)?;
    fits_write_key(fptr, &hdu, "EXTVER", i64::from(extver))?;
    debug!(
        "Wrote {extname},{extver} for source '{}' to {}",
        source.name,
        fptr.file_path().display()
    );

    if let Some(image) = &source.image {
        write_image_hdu(fptr, image, extver)?;
    }
    Ok(())
}

fn write_image_hdu(fptr: &mut FitsFile, image: &SkyImage, extver: u32) -> Result<(), SimputError> {
    let (ny, nx) = image.data.dim();
    let hdu = fits_create_image(fptr, "IMAGE", &[ny, nx])?;
    let data: Vec<f64> = image.data.iter().copied().collect();
    fits_write_image(fptr, &hdu, &data)?;

    let wcs = &image.wcs;
    fits_write_key(fptr, &hdu, "EXTVER", i64::from(extver))?;
    fits_write_key(fptr, &hdu, "HDUCLASS", "HEASARC/SIMPUT")?;
    fits_write_key(fptr, &hdu, "HDUCLAS1", "IMAGE")?;
    fits_write_key(fptr, &hdu, "HDUVERS", SIMPUT_HDUVERS)?;
    fits_write_key(fptr, &hdu, "CTYPE1", "RA---TAN")?;
    fits_write_key(fptr, &hdu, "CTYPE2", "DEC--TAN")?;
    fits_write_key(fptr, &hdu, "CUNIT1", "deg")?;
    fits_write_key(fptr, &hdu, "CUNIT2", "deg")?;
    fits_write_key(fptr, &hdu, "CRVAL1", wcs.crval.0)?;
    fits_write_key(fptr, &hdu, "CRVAL2", wcs.crval.1)?;
    fits_write_key(fptr, &hdu, "CRPIX1", wcs.crpix.0)?;
    fits_write_key(fptr, &hdu, "CRPIX2", wcs.crpix.1)?;
    fits_write_key(fptr, &hdu, "CDELT1", wcs.cdelt.0)?;
    fits_write_key(fptr, &hdu, "CDELT2", wcs.cdelt.1)?;
    Ok(())
}

/// Read a photon list extension.
pub(super) fn read_photon_list(
    fptr: &mut FitsFile,
    hdu: &FitsHdu,
) -> Result<PhotonList, SimputError> {
    let energy: Vec<f32> = fits_get_col(fptr, hdu, "ENERGY")?;
    PhotonList::new(
        fits_get_col(fptr, hdu, "RA")?,
        fits_get_col(fptr, hdu, "DEC")?,
        energy.into_iter().map(f64::from).collect(),
    )
}

/// Read a spectrum extension. Spectra stored one per row (in vector or
/// variable-length columns) need a row; without one the first row is used.
pub(super) fn read_spectrum(
    fptr: &mut FitsFile,
    hdu: &FitsHdu,
    row: Option<&RowSelector>,
) -> Result<Spectrum, SimputError> {
    let (_, layout) = fits_get_col_layout(fptr, hdu, "ENERGY")?;
    let (emid, flux) = if layout == ColumnLayout::Scalar {
        if row.is_some() {
            debug!("Ignoring the row selector for a single-row spectrum");
        }
        let emid: Vec<f64> = fits_get_col(fptr, hdu, "ENERGY")?;
        let flux: Vec<f64> = fits_get_col(fptr, hdu, "FLUXDENSITY")?;
        (emid, flux)
    } else {
        let num_rows = fits_get_num_rows(fptr, hdu)?;
        let row_index = match row {
            None => 0,
            Some(RowSelector::Index(i)) => *i,
            Some(RowSelector::Name(name)) => {
                let names: Vec<String> = fits_get_col(fptr, hdu, "NAME")?;
                names
                    .iter()
                    .position(|n| n.trim() == name)
                    .ok_or_else(|| SimputError::NotFound {
                        file: fptr.file_path().to_path_buf(),
                        what: format!("a spectrum named '{name}'"),
                    })?
            }
        };
        if row_index >= num_rows {
            return Err(SimputError::NotFound {
                file: fptr.file_path().to_path_buf(),
                what: format!("spectrum row {row_index} ({num_rows} rows available)"),
            });
        }
        (
            fits_get_row_f64(fptr, hdu, "ENERGY", row_index)?,
            fits_get_row_f64(fptr, hdu, "FLUXDENSITY", row_index)?,
        )
    };
    Ok(Spectrum::from_midpoints(&emid, flux)?)
}

/// Read an image extension along with its WCS.
pub(super) fn read_image(fptr: &mut FitsFile, hdu: &FitsHdu) -> Result<SkyImage, SimputError> {
    let shape = fits_get_image_size(fptr, hdu)?.clone();
    if shape.len() != 2 {
        return Err(SimputError::BadImageShape {
            file: fptr.file_path().to_path_buf(),
            shape,
        });
    }
    let data: Vec<f64> = fits_get_image(fptr, hdu)?;
    let data = Array2::from_shape_vec((shape[0], shape[1]), data).map_err(|_| {
        SimputError::BadImageShape {
            file: fptr.file_path().to_path_buf(),
            shape: shape.clone(),
        }
    })?;
    let wcs = TanWcs {
        crval: (
            fits_get_required_key(fptr, hdu, "CRVAL1")?,
            fits_get_required_key(fptr, hdu, "CRVAL2")?,
        ),
        crpix: (
            fits_get_required_key(fptr, hdu, "CRPIX1")?,
            fits_get_required_key(fptr, hdu, "CRPIX2")?,
        ),
        cdelt: (
            fits_get_required_key(fptr, hdu, "CDELT1")?,
            fits_get_required_key(fptr, hdu, "CDELT2")?,
        ),
    };
    Ok(SkyImage { data, wcs })
}

/// The version to give a new extension called `extname` in `file`: one more
/// than the largest `EXTVER` of the existing extensions with that name, or 1.
pub(super) fn next_extver(file: &Path, extname: &str) -> Result<u32, SimputError> {
    if !file.exists() {
        return Ok(1);
    }
    let mut fptr = fits_open(file)?;
    let mut max_extver = 0;
    for i in 0..fits_num_hdus(&mut fptr)? {
        let hdu = fits_open_hdu(&mut fptr, i)?;
        let name: Option<String> = fits_get_optional_key(&mut fptr, &hdu, "EXTNAME")?;
        if name.map(|n| n.eq_ignore_ascii_case(extname)) == Some(true) {
            let extver: Option<u32> = fits_get_optional_key(&mut fptr, &hdu, "EXTVER")?;
            max_extver = max_extver.max(extver.unwrap_or(1));
        }
    }
    Ok(max_extver + 1)
}
