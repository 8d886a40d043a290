// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Helper functions for reading and writing FITS files.
//!
//! Every function here attaches the FITS filename, the HDU and the caller's
//! source location to any error, because cfitsio errors by themselves are
//! quite spartan.

mod error;

pub use error::FitsError;

use std::{ffi::CString, fmt::Display, path::Path, ptr};

use fitsio::{
    hdu::*,
    tables::{ColumnDataType, ColumnDescription, ConcreteColumnDescription},
    FitsFile,
};

/// cfitsio's status for "keyword not found" (and "value undefined").
const KEY_NOT_FOUND: [i32; 2] = [202, 204];

/// cfitsio's status when a requested HDU doesn't exist.
const BAD_HDU_NUM: i32 = 301;

/// `ANY_HDU` in cfitsio's headers.
const ANY_HDU: i32 = -1;

/// Wrap a fitsio result with our error, using the caller's location.
macro_rules! fe {
    ($fptr:expr, $hdu_description:expr, $result:expr) => {{
        $result.map_err(|e| {
            let caller = std::panic::Location::caller();
            FitsError::Fitsio {
                fits_error: Box::new(e),
                fits_filename: $fptr.file_path().to_path_buf().into_boxed_path(),
                hdu_description: format!("{}", $hdu_description).into_boxed_str(),
                source_file: caller.file(),
                source_line: caller.line(),
                source_column: caller.column(),
            }
        })
    }};
}

/// Open a fits file.
#[track_caller]
pub(crate) fn fits_open<P: AsRef<Path>>(file: P) -> Result<FitsFile, FitsError> {
    FitsFile::open(file.as_ref()).map_err(|e| {
        let caller = std::panic::Location::caller();
        FitsError::Open {
            fits_error: Box::new(e),
            fits_filename: file.as_ref().to_path_buf().into_boxed_path(),
            source_file: caller.file(),
            source_line: caller.line(),
            source_column: caller.column(),
        }
    })
}

/// Open a fits file for reading and writing.
#[track_caller]
pub(crate) fn fits_edit<P: AsRef<Path>>(file: P) -> Result<FitsFile, FitsError> {
    FitsFile::edit(file.as_ref()).map_err(|e| {
        let caller = std::panic::Location::caller();
        FitsError::Open {
            fits_error: Box::new(e),
            fits_filename: file.as_ref().to_path_buf().into_boxed_path(),
            source_file: caller.file(),
            source_line: caller.line(),
            source_column: caller.column(),
        }
    })
}

/// Create a new fits file with an empty primary HDU. Any existing file at this
/// path is removed first.
#[track_caller]
pub(crate) fn fits_create<P: AsRef<Path>>(file: P) -> Result<FitsFile, FitsError> {
    let file = file.as_ref();
    let caller = std::panic::Location::caller();
    let create_error = |e: fitsio::errors::Error| FitsError::Create {
        fits_error: Box::new(e),
        fits_filename: file.to_path_buf().into_boxed_path(),
        source_file: caller.file(),
        source_line: caller.line(),
        source_column: caller.column(),
    };
    if file.exists() {
        std::fs::remove_file(file)
            .map_err(|e| create_error(fitsio::errors::Error::Message(e.to_string())))?;
    }
    FitsFile::create(file).open().map_err(create_error)
}

/// Open a fits file's HDU.
#[track_caller]
pub(crate) fn fits_open_hdu<T: DescribesHdu + Display + Copy>(
    fits_fptr: &mut FitsFile,
    hdu_description: T,
) -> Result<FitsHdu, FitsError> {
    fe!(fits_fptr, hdu_description, fits_fptr.hdu(hdu_description))
}

/// Move to the HDU with the supplied `EXTNAME` and (optionally) `EXTVER`. If
/// `extver` is `None`, the first HDU with a matching name is used. `Ok(None)`
/// is returned if there is no such HDU.
#[track_caller]
pub(crate) fn fits_open_hdu_by_name(
    fits_fptr: &mut FitsFile,
    extname: &str,
    extver: Option<u32>,
) -> Result<Option<FitsHdu>, FitsError> {
    let extname_ffi =
        CString::new(extname).expect("fits_open_hdu_by_name: CString::new() failed for extname");
    let mut status = 0;
    unsafe {
        // ffmnhd = fits_movnam_hdu
        fitsio_sys::ffmnhd(
            fits_fptr.as_raw(),              /* I - FITS file pointer            */
            ANY_HDU,                         /* I - type of HDU to find          */
            extname_ffi.as_ptr() as *mut _,  /* I - EXTNAME value to find        */
            extver.unwrap_or(0) as _,        /* I - EXTVER value (0 = any)       */
            &mut status,                     /* IO - error status                */
        );
    }
    match status {
        0 => {
            // Equivalent of fitsio's crate-private `FitsFile::current_hdu`.
            let mut hdu_num = 0;
            unsafe {
                // ffghdn = fits_get_hdu_num
                fitsio_sys::ffghdn(fits_fptr.as_raw(), &mut hdu_num);
            }
            let hdu = fe!(fits_fptr, extname, fits_fptr.hdu((hdu_num - 1) as usize))?;
            Ok(Some(hdu))
        }
        BAD_HDU_NUM => Ok(None),
        _ => fe!(
            fits_fptr,
            extname,
            fitsio::errors::check_status(status).map(|_| None)
        ),
    }
}

/// Get the number of HDUs in a fits file.
#[track_caller]
pub(crate) fn fits_num_hdus(fits_fptr: &mut FitsFile) -> Result<usize, FitsError> {
    fe!(fits_fptr, "<all>", fits_fptr.num_hdus())
}

/// Given a FITS file pointer, a HDU that belongs to it, and a keyword that may
/// or may not exist, pull out the value of the keyword, parsing it into the
/// desired type.
#[track_caller]
pub(crate) fn fits_get_optional_key<T: std::str::FromStr>(
    fits_fptr: &mut FitsFile,
    hdu: &FitsHdu,
    keyword: &str,
) -> Result<Option<T>, FitsError> {
    let unparsed_value: String = match hdu.read_key(fits_fptr, keyword) {
        Ok(key_value) => key_value,
        Err(fitsio::errors::Error::Fits(fe)) if KEY_NOT_FOUND.contains(&fe.status) => {
            return Ok(None)
        }
        Err(e) => return fe!(fits_fptr, hdu.number + 1, Err(e)),
    };

    match unparsed_value.trim().parse() {
        Ok(parsed_value) => Ok(Some(parsed_value)),
        Err(_) => {
            let caller = std::panic::Location::caller();
            Err(FitsError::Parse {
                key: keyword.to_string().into_boxed_str(),
                fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
                hdu_num: hdu.number + 1,
                source_file: caller.file(),
                source_line: caller.line(),
                source_column: caller.column(),
            })
        }
    }
}

/// Given a FITS file pointer, a HDU that belongs to it, and a keyword, pull out
/// the value of the keyword, parsing it into the desired type.
#[track_caller]
pub(crate) fn fits_get_required_key<T: std::str::FromStr>(
    fits_fptr: &mut FitsFile,
    hdu: &FitsHdu,
    keyword: &str,
) -> Result<T, FitsError> {
    match fits_get_optional_key(fits_fptr, hdu, keyword) {
        Ok(Some(value)) => Ok(value),
        Ok(None) => {
            let caller = std::panic::Location::caller();
            Err(FitsError::MissingKey {
                key: keyword.to_string().into_boxed_str(),
                fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
                hdu_num: hdu.number + 1,
                source_file: caller.file(),
                source_line: caller.line(),
                source_column: caller.column(),
            })
        }
        Err(error) => Err(error),
    }
}

/// Write a keyword into a HDU's header.
#[track_caller]
pub(crate) fn fits_write_key<T: fitsio::headers::WritesKey>(
    fits_fptr: &mut FitsFile,
    hdu: &FitsHdu,
    keyword: &str,
    value: T,
) -> Result<(), FitsError> {
    fe!(
        fits_fptr,
        hdu.number + 1,
        hdu.write_key(fits_fptr, keyword, value)
    )
}

/// Get the names of the columns of a table HDU.
#[track_caller]
pub(crate) fn fits_get_col_names(
    fits_fptr: &FitsFile,
    hdu: &FitsHdu,
) -> Result<Vec<String>, FitsError> {
    match &hdu.info {
        HduInfo::TableInfo {
            column_descriptions,
            ..
        } => Ok(column_descriptions
            .iter()
            .map(|cd| cd.name.clone())
            .collect()),
        _ => {
            let caller = std::panic::Location::caller();
            Err(FitsError::NotTable {
                fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
                hdu_num: hdu.number + 1,
                source_file: caller.file(),
                source_line: caller.line(),
                source_column: caller.column(),
            })
        }
    }
}

/// Get the number of rows of a table HDU.
#[track_caller]
pub(crate) fn fits_get_num_rows(fits_fptr: &FitsFile, hdu: &FitsHdu) -> Result<usize, FitsError> {
    match &hdu.info {
        HduInfo::TableInfo { num_rows, .. } => Ok(*num_rows),
        _ => {
            let caller = std::panic::Location::caller();
            Err(FitsError::NotTable {
                fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
                hdu_num: hdu.number + 1,
                source_file: caller.file(),
                source_line: caller.line(),
                source_column: caller.column(),
            })
        }
    }
}

/// Get a column from a fits file's HDU. An empty table yields an empty
/// vector.
#[track_caller]
pub(crate) fn fits_get_col<T: fitsio::tables::ReadsCol>(
    fits_fptr: &mut FitsFile,
    hdu: &FitsHdu,
    col_name: &str,
) -> Result<Vec<T>, FitsError> {
    if fits_get_num_rows(fits_fptr, hdu)? == 0 {
        return Ok(vec![]);
    }
    fe!(fits_fptr, hdu.number + 1, hdu.read_col(fits_fptr, col_name))
}

/// Write a column into a fits file's HDU. Nothing is done for empty data.
#[track_caller]
pub(crate) fn fits_write_col<T: fitsio::tables::WritesCol>(
    fits_fptr: &mut FitsFile,
    hdu: &FitsHdu,
    col_name: &str,
    data: &[T],
) -> Result<(), FitsError> {
    if data.is_empty() {
        return Ok(());
    }
    fe!(
        fits_fptr,
        hdu.number + 1,
        hdu.write_col(fits_fptr, col_name, data)
    )?;
    Ok(())
}

/// Describes how a numeric table column stores its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ColumnLayout {
    /// One value per row.
    Scalar,

    /// A fixed number of values per row.
    Vector(usize),

    /// A variable-length array per row.
    Variable,
}

/// Find the (1-indexed) column number and layout of a table column.
#[track_caller]
pub(crate) fn fits_get_col_layout(
    fits_fptr: &mut FitsFile,
    hdu: &FitsHdu,
    col_name: &str,
) -> Result<(i32, ColumnLayout), FitsError> {
    let col_names = fits_get_col_names(fits_fptr, hdu)?;
    let col_num = match col_names
        .iter()
        .position(|n| n.eq_ignore_ascii_case(col_name))
    {
        Some(i) => i as i32 + 1,
        None => {
            let caller = std::panic::Location::caller();
            return Err(FitsError::MissingColumn {
                column: col_name.to_string().into_boxed_str(),
                fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
                hdu_num: hdu.number + 1,
                source_file: caller.file(),
                source_line: caller.line(),
                source_column: caller.column(),
            });
        }
    };

    fits_open_hdu(fits_fptr, hdu.number)?;
    let mut status = 0;
    let mut type_code = 0;
    let mut repeat = 0;
    let mut width = 0;
    unsafe {
        // ffgtcl = fits_get_coltype
        fitsio_sys::ffgtcl(
            fits_fptr.as_raw(), /* I - FITS file pointer         */
            col_num,            /* I - column number             */
            &mut type_code,     /* O - datatype code of column   */
            &mut repeat,        /* O - repeat count of field     */
            &mut width,         /* O - width of single element   */
            &mut status,        /* IO - error status             */
        );
    }
    fe!(
        fits_fptr,
        hdu.number + 1,
        fitsio::errors::check_status(status)
    )?;

    let layout = if type_code < 0 {
        ColumnLayout::Variable
    } else if repeat > 1 {
        ColumnLayout::Vector(repeat as usize)
    } else {
        ColumnLayout::Scalar
    };
    Ok((col_num, layout))
}

/// Read all the values of a numeric column in a single (0-indexed) row. This
/// works for fixed-width vector columns as well as variable-length arrays.
#[track_caller]
pub(crate) fn fits_get_row_f64(
    fits_fptr: &mut FitsFile,
    hdu: &FitsHdu,
    col_name: &str,
    row: usize,
) -> Result<Vec<f64>, FitsError> {
    let (col_num, layout) = fits_get_col_layout(fits_fptr, hdu, col_name)?;
    let num_elements = match layout {
        ColumnLayout::Scalar => 1,
        ColumnLayout::Vector(n) => n,
        ColumnLayout::Variable => {
            let mut status = 0;
            let mut length = 0;
            let mut heap_address = 0;
            unsafe {
                // ffgdes = fits_read_descript
                fitsio_sys::ffgdes(
                    fits_fptr.as_raw(), /* I - FITS file pointer         */
                    col_num,            /* I - column number             */
                    row as i64 + 1,     /* I - row number                */
                    &mut length,        /* O - number of elements in row */
                    &mut heap_address,  /* O - heap pointer to the data  */
                    &mut status,        /* IO - error status             */
                );
            }
            fe!(
                fits_fptr,
                hdu.number + 1,
                fitsio::errors::check_status(status)
            )?;
            length as usize
        }
    };

    let mut values = vec![0.0; num_elements];
    let mut status = 0;
    let mut any_null = 0;
    unsafe {
        // ffgcvd = fits_read_col_dbl
        fitsio_sys::ffgcvd(
            fits_fptr.as_raw(),   /* I - FITS file pointer          */
            col_num,              /* I - column number              */
            row as i64 + 1,       /* I - first row (1 = 1st row)    */
            1,                    /* I - first vector element       */
            num_elements as i64,  /* I - number of values to read   */
            f64::NAN,             /* I - value for undefined pixels */
            values.as_mut_ptr(),  /* O - array of values            */
            &mut any_null,        /* O - set to 1 if any nulls      */
            &mut status,          /* IO - error status              */
        );
    }
    fe!(
        fits_fptr,
        hdu.number + 1,
        fitsio::errors::check_status(status)
    )?;
    Ok(values)
}

/// Describe a table column. `repeat` is the number of values per row (or
/// the width of a string column).
#[track_caller]
pub(crate) fn fits_column(
    name: &str,
    data_type: ColumnDataType,
    repeat: usize,
) -> Result<ConcreteColumnDescription, FitsError> {
    ColumnDescription::new(name)
        .with_type(data_type)
        .that_repeats(repeat)
        .create()
        .map_err(|e| {
            let caller = std::panic::Location::caller();
            FitsError::Fitsio {
                fits_error: Box::new(e),
                fits_filename: Path::new("<none>").to_path_buf().into_boxed_path(),
                hdu_description: format!("column {name}").into_boxed_str(),
                source_file: caller.file(),
                source_line: caller.line(),
                source_column: caller.column(),
            }
        })
}

/// Append a binary table HDU with the supplied name and columns.
#[track_caller]
pub(crate) fn fits_create_table(
    fits_fptr: &mut FitsFile,
    extname: &str,
    columns: &[ConcreteColumnDescription],
) -> Result<FitsHdu, FitsError> {
    fe!(fits_fptr, extname, fits_fptr.create_table(extname, columns))
}

/// Append a double-precision image HDU with the supplied name. `shape` is in
/// row-major order, i.e. `[ny, nx]`.
#[track_caller]
pub(crate) fn fits_create_image(
    fits_fptr: &mut FitsFile,
    extname: &str,
    shape: &[usize],
) -> Result<FitsHdu, FitsError> {
    let description = fitsio::images::ImageDescription {
        data_type: fitsio::images::ImageType::Double,
        dimensions: shape,
    };
    fe!(fits_fptr, extname, fits_fptr.create_image(extname, &description))
}

/// Write (row-major) pixel data into an image HDU.
#[track_caller]
pub(crate) fn fits_write_image(
    fits_fptr: &mut FitsFile,
    hdu: &FitsHdu,
    data: &[f64],
) -> Result<(), FitsError> {
    fe!(fits_fptr, hdu.number + 1, hdu.write_image(fits_fptr, data))
}

/// Get the size of the image on the supplied FITS file pointer and HDU.
#[track_caller]
pub(crate) fn fits_get_image_size<'a>(
    fits_fptr: &FitsFile,
    hdu: &'a FitsHdu,
) -> Result<&'a Vec<usize>, FitsError> {
    match &hdu.info {
        HduInfo::ImageInfo { shape, .. } => Ok(shape),
        _ => {
            let caller = std::panic::Location::caller();
            Err(FitsError::NotImage {
                fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
                hdu_num: hdu.number + 1,
                source_file: caller.file(),
                source_line: caller.line(),
                source_column: caller.column(),
            })
        }
    }
}

/// Given a FITS file pointer and a HDU, read the associated image.
#[track_caller]
pub(crate) fn fits_get_image<T: fitsio::images::ReadImage>(
    fits_fptr: &mut FitsFile,
    hdu: &FitsHdu,
) -> Result<T, FitsError> {
    fits_get_image_size(fits_fptr, hdu)?;
    fe!(fits_fptr, hdu.number + 1, hdu.read_image(fits_fptr))
}

/// Delete a HDU (0-indexed). Later HDUs move down by one.
#[track_caller]
pub(crate) fn fits_delete_hdu(fits_fptr: &mut FitsFile, hdu_num: usize) -> Result<(), FitsError> {
    fits_open_hdu(fits_fptr, hdu_num)?;
    let mut status = 0;
    unsafe {
        // ffdhdu = fits_delete_hdu
        fitsio_sys::ffdhdu(fits_fptr.as_raw(), ptr::null_mut(), &mut status);
    }
    fe!(fits_fptr, hdu_num + 1, fitsio::errors::check_status(status))
}
