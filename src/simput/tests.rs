// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::Path;

use approx::{assert_abs_diff_eq, assert_relative_eq};
use fitsio::tables::ColumnDataType;
use tempfile::TempDir;

use super::{hdu::*, *};
use crate::{
    io::fits::*,
    misc::make_rng,
    spatial::{BetaModel, PointSourceModel},
    spectra::Spectrum,
};

fn spectrum_source(name: &str) -> SimputSource {
    let spectrum = Spectrum::from_power_law(1.8, 1e-3, 0.5, 7.0, 100).unwrap();
    SimputSource::from_spectrum(name, spectrum, 30.0, 45.0)
}

fn photon_list_source() -> SimputSource {
    SimputSource::photon_list(
        vec![10.0, 10.5, 11.0, 11.5],
        vec![-5.0, -5.25, -5.5, -5.75],
        vec![1.0, 2.5, 3.25, 7.0],
        1.5e-12,
        "photons",
    )
    .unwrap()
}

fn read_string_key(file: &Path, extname: &str, extver: Option<u32>, key: &str) -> String {
    let mut fptr = fits_open(file).unwrap();
    let hdu = fits_open_hdu_by_name(&mut fptr, extname, extver)
        .unwrap()
        .unwrap();
    fits_get_required_key(&mut fptr, &hdu, key).unwrap()
}

#[test]
fn test_parse_references() {
    assert_eq!(
        "[spectrum,2]".parse::<SourceReference>().unwrap(),
        SourceReference {
            file: String::new(),
            kind: ExtensionKind::Spectrum,
            version: Some(2),
            row: None
        }
    );
    assert_eq!(
        "f.fits[phlist,1]".parse::<SourceReference>().unwrap(),
        SourceReference {
            file: "f.fits".to_string(),
            kind: ExtensionKind::PhotonList,
            version: Some(1),
            row: None
        }
    );

    // Case doesn't matter, and the version is optional.
    let r: SourceReference = "dir/src.fits[SPECTRUM]".parse().unwrap();
    assert_eq!(r.file, "dir/src.fits");
    assert_eq!(r.kind, ExtensionKind::Spectrum);
    assert_eq!(r.version, None);
    let r: SourceReference = "[Image,3]".parse().unwrap();
    assert_eq!(r.kind, ExtensionKind::Image);

    // Row selectors.
    let r: SourceReference = "spec.fits[spectrum,1][NAME=='cluster']".parse().unwrap();
    assert_eq!(r.row, Some(RowSelector::Name("cluster".to_string())));
    let r: SourceReference = "[spectrum,1,ROW=='4']".parse().unwrap();
    assert_eq!(r.row, Some(RowSelector::Index(4)));
    let r: SourceReference = "[spectrum,1][row==2]".parse().unwrap();
    assert_eq!(r.row, Some(RowSelector::Index(2)));
}

#[test]
fn test_malformed_references() {
    for bad in [
        "[spectrum,2",
        "spectrum,2]",
        "f.fits",
        "",
        "[spectrum,2]]",
        "[[spectrum,2]]",
        "f.fits[spectrum,1]extra",
        "[spectrum,one]",
        "[spectrum,1,ROW=='x']",
        "[spectrum,1,2,3]",
        "[spectrum,1][ROW=='1'][ROW=='2']",
        "[spectrum,1,ROW=='1'][ROW=='2']",
        "[phlist,1][ROW=='1']",
        "[spectrum,1][ROW]",
    ] {
        let result = bad.parse::<SourceReference>();
        assert!(
            matches!(result, Err(SimputError::MalformedReference { .. })),
            "'{bad}' gave {result:?}"
        );
    }

    assert!(matches!(
        "f.fits[events,1]".parse::<SourceReference>(),
        Err(SimputError::UnrecognisedExtension(tag)) if tag == "events"
    ));
}

#[test]
fn test_references_display() {
    for s in [
        "[SPECTRUM,2]",
        "f.fits[PHLIST,1]",
        "f.fits[IMAGE]",
        "[SPECTRUM,1][ROW=='3']",
        "[SPECTRUM,1][NAME=='abc']",
    ] {
        let r: SourceReference = s.parse().unwrap();
        assert_eq!(r.to_string(), s);
    }
}

#[test]
fn test_photon_list_fields() {
    let source = photon_list_source();
    assert_eq!(source.kind(), ExtensionKind::PhotonList);
    assert_eq!((source.ra, source.dec), (0.0, 0.0));
    assert_abs_diff_eq!(source.emin, 1.0);
    assert_abs_diff_eq!(source.emax, 7.0);

    let photons = source.photons().unwrap();
    assert_eq!(photons.len(), 4);
    assert_eq!(photons.get("energy").unwrap(), &[1.0, 2.5, 3.25, 7.0]);
    assert_eq!(photons.get("ra").unwrap(), photons.ra());
    assert!(photons.contains("dec"));
    assert!(!photons.contains("time"));
    assert_eq!(photons.keys().collect::<Vec<_>>(), vec!["ra", "dec", "energy"]);
    assert!(matches!(
        photons.get("time"),
        Err(SimputError::NoSuchField(key)) if key == "time"
    ));

    assert!(matches!(
        SimputSource::photon_list(vec![1.0], vec![], vec![1.0], 1.0, "bad"),
        Err(SimputError::PhotonListLengths { .. })
    ));
    assert!(matches!(
        SimputSource::photon_list(vec![], vec![], vec![], 1.0, "empty"),
        Err(SimputError::EmptyPhotonList(_))
    ));
}

#[test]
fn test_photon_list_from_models() {
    let spectrum = Spectrum::from_constant(1e-3, 1.0, 2.0, 10).unwrap();
    let model = PointSourceModel {
        ra: 30.0,
        dec: 45.0,
    };
    let mut rng = make_rng(Some(10));
    let source =
        SimputSource::photon_list_from_models("pt", &spectrum, &model, 1000.0, 1000.0, &mut rng)
            .unwrap();
    let photons = source.photons().unwrap();
    // 1e-3 * 1 keV * 1000 s * 1000 cm² = 1000 expected photons.
    assert!((photons.len() as f64 - 1000.0).abs() < 200.0);
    assert!(photons.ra().iter().all(|&ra| ra == 30.0));
    assert!(source.emin >= 1.0 && source.emax <= 2.0);
    let expected_flux =
        photons.energy().iter().sum::<f64>() * crate::constants::ERG_PER_KEV / 1e6;
    assert_relative_eq!(source.flux, expected_flux, max_relative = 1e-12);
}

#[test]
fn test_spectrum_round_trip() {
    let dir = TempDir::new().unwrap();
    for num_bins in [2, 3, 10, 77, 1000] {
        let path = dir.path().join(format!("spec_{num_bins}.fits"));
        let spectrum = Spectrum::from_constant(2.0, 0.1, 10.0, num_bins).unwrap();
        let source = SimputSource::from_spectrum("src", spectrum.clone(), 1.0, 2.0);
        let catalog = SimputCatalog::from_source(&path, &source, None, false).unwrap();

        let read = catalog.read_source(0).unwrap();
        let read_spectrum = read.spectrum().unwrap();
        assert_eq!(read_spectrum.num_bins(), num_bins);
        for (a, b) in spectrum.ebins().iter().zip(read_spectrum.ebins()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-5);
        }
        assert_eq!(read_spectrum.flux(), spectrum.flux());
        assert_eq!(read.name, "src");
        assert_eq!((read.ra, read.dec), (1.0, 2.0));
        assert!(read.image.is_none());
    }
}

#[test]
fn test_photon_list_round_trip_is_exact() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("phlist.fits");
    let source = photon_list_source();
    let catalog = SimputCatalog::from_source(&path, &source, None, false).unwrap();
    assert_eq!(catalog.spectra(), &["[PHLIST,1]"]);
    assert_eq!(catalog.images(), &["NULL"]);

    let loaded = SimputCatalog::load(&path).unwrap();
    assert_eq!(loaded, catalog);
    let read = loaded.read_source(0).unwrap();
    assert_eq!(read, source);
    assert_eq!(
        read_string_key(&path, "PHLIST", Some(1), "HDUCLAS1"),
        "PHOTONS"
    );
}

#[test]
fn test_versions() {
    let dir = TempDir::new().unwrap();
    let cat_path = dir.path().join("cat.fits");
    let mut catalog = SimputCatalog::create_empty(&cat_path).unwrap();
    assert!(catalog.is_empty());

    catalog.append(&spectrum_source("a"), None, false).unwrap();
    catalog.append(&spectrum_source("b"), None, false).unwrap();
    catalog.append(&photon_list_source(), None, false).unwrap();
    // The catalog file is never overwritten.
    catalog.append(&spectrum_source("c"), None, true).unwrap();
    assert_eq!(
        catalog.spectra(),
        &["[SPECTRUM,1]", "[SPECTRUM,2]", "[PHLIST,1]", "[SPECTRUM,3]"]
    );
    assert_eq!(
        read_string_key(&cat_path, "SPECTRUM", Some(2), "HDUCLAS1"),
        "SPECTRUM"
    );

    // Sources in another file.
    let target = dir.path().join("sources.fits");
    let target_str = target.display().to_string();
    catalog
        .append(&spectrum_source("d"), Some(&target), false)
        .unwrap();
    catalog
        .append(&spectrum_source("e"), Some(&target), false)
        .unwrap();
    assert_eq!(catalog.spectra()[4], format!("{target_str}[SPECTRUM,1]"));
    assert_eq!(catalog.spectra()[5], format!("{target_str}[SPECTRUM,2]"));
    assert_eq!(catalog.read_source(5).unwrap().name, "e");

    // Overwriting the target starts again at 1...
    catalog
        .append(&spectrum_source("f"), Some(&target), true)
        .unwrap();
    assert_eq!(catalog.spectra()[6], format!("{target_str}[SPECTRUM,1]"));
    let mut fptr = fits_open(&target).unwrap();
    assert_eq!(fits_num_hdus(&mut fptr).unwrap(), 2);
    drop(fptr);
    // ... and the old references no longer resolve.
    assert!(matches!(
        catalog.read_source(5),
        Err(SimputError::NotFound { .. })
    ));
    assert_eq!(catalog.read_source(4).unwrap().name, "f");

    let loaded = SimputCatalog::load(&cat_path).unwrap();
    assert_eq!(loaded.len(), 7);
    assert_eq!(loaded, catalog);
}

#[test]
fn test_index_table_headers() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cat.fits");
    SimputCatalog::from_source(&path, &spectrum_source("a"), None, false).unwrap();
    for (key, value) in [
        ("HDUCLASS", "HEASARC"),
        ("HDUCLAS1", "SIMPUT"),
        ("HDUCLAS2", "SRC_CAT"),
        ("HDUVERS", "1.1.0"),
        ("RADECSYS", "FK5"),
        ("TUNIT6", "erg/s/cm**2"),
    ] {
        assert_eq!(read_string_key(&path, "SRC_CAT", None, key), value);
    }
    assert_eq!(
        read_string_key(&path, "SPECTRUM", Some(1), "HDUCLASS"),
        "HEASARC/SIMPUT"
    );

    let mut fptr = fits_open(&path).unwrap();
    let hdu = fits_open_hdu_by_name(&mut fptr, "SPECTRUM", Some(1))
        .unwrap()
        .unwrap();
    let ref_ra: f64 = fits_get_required_key(&mut fptr, &hdu, "REFRA").unwrap();
    assert_abs_diff_eq!(ref_ra, 30.0);
    let hdu = fits_open_hdu_by_name(&mut fptr, "SRC_CAT", None)
        .unwrap()
        .unwrap();
    let equinox: f64 = fits_get_required_key(&mut fptr, &hdu, "EQUINOX").unwrap();
    assert_abs_diff_eq!(equinox, 2000.0);
}

#[test]
fn test_images() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cat.fits");
    let model = BetaModel {
        ra0: 30.0,
        dec0: 45.0,
        r_c: 10.0,
        beta: 0.7,
    };
    let spectrum = Spectrum::from_constant(1.0, 0.5, 2.0, 15).unwrap();
    let source =
        SimputSource::from_spectral_and_spatial_model("beta", spectrum, &model, 2.0, 16);
    assert_eq!((source.ra, source.dec), (30.0, 45.0));

    let mut catalog = SimputCatalog::from_source(&path, &source, None, false).unwrap();
    catalog.append(&spectrum_source("no image"), None, false).unwrap();
    catalog.append(&source, None, false).unwrap();
    assert_eq!(catalog.images(), &["[IMAGE,1]", "NULL", "[IMAGE,3]"]);

    for i in [0, 2] {
        let read = catalog.read_source(i).unwrap();
        let image = read.image.unwrap();
        let expected = source.image.as_ref().unwrap();
        assert_eq!(image.data, expected.data);
        assert_relative_eq!(image.wcs.crval.0, expected.wcs.crval.0, max_relative = 1e-8);
        assert_relative_eq!(image.wcs.crpix.1, expected.wcs.crpix.1, max_relative = 1e-8);
        assert_relative_eq!(image.wcs.cdelt.0, expected.wcs.cdelt.0, max_relative = 1e-8);
    }
    assert!(catalog.read_source(1).unwrap().image.is_none());
}

#[test]
fn test_lazy_sources() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cat.fits");
    let mut catalog =
        SimputCatalog::from_source(&path, &spectrum_source("a"), None, false).unwrap();
    catalog.append(&photon_list_source(), None, false).unwrap();

    let (sources, parameters) = read_simput_catalog(&path).unwrap();
    assert_eq!(sources.len(), 2);
    assert_eq!(parameters.src_names, vec!["a", "photons"]);
    assert_abs_diff_eq!(parameters.emin[1], 1.0);
    assert_abs_diff_eq!(parameters.emax[0], 7.0, epsilon = 1e-12);
    assert_abs_diff_eq!(parameters.flux[1], 1.5e-12);

    // Each access gives a fresh source, and iteration can be restarted.
    let mut first = sources.get(0).unwrap();
    first.name = "changed".to_string();
    assert_eq!(sources.get(0).unwrap().name, "a");
    let names: Vec<String> = sources.iter().map(|s| s.unwrap().name).collect();
    assert_eq!(names, vec!["a", "photons"]);
    assert_eq!(sources.iter().len(), 2);
    let mut count = 0;
    for source in &sources {
        source.unwrap();
        count += 1;
    }
    assert_eq!(count, 2);

    assert!(matches!(
        sources.get(2),
        Err(SimputError::IndexOutOfBounds { index: 2, len: 2 })
    ));

    let view = catalog.sources();
    assert_eq!(view.get(1).unwrap().kind(), ExtensionKind::PhotonList);
}

#[test]
fn test_resolution_failures() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cat.fits");
    let missing = dir.path().join("missing.fits");
    {
        let mut fptr = fits_create(&path).unwrap();
        let columns = IndexColumns {
            ra: vec![0.0; 4],
            dec: vec![0.0; 4],
            emin: vec![0.5; 4],
            emax: vec![7.0; 4],
            flux: vec![1e-12; 4],
            spectra: vec![
                format!("{}[SPECTRUM,1]", missing.display()),
                "[SPECTRUM,7]".to_string(),
                "[IMAGE,1]".to_string(),
                "[SPECTRUM,1".to_string(),
            ],
            images: vec!["NULL".to_string(); 4],
            timing: vec!["NULL".to_string(); 4],
            src_names: vec!["x".to_string(); 4],
        };
        write_index_table(&mut fptr, &columns).unwrap();
    }
    let catalog = SimputCatalog::load(&path).unwrap();
    assert!(matches!(
        catalog.read_source(0),
        Err(SimputError::NotFound { file, .. }) if file == missing
    ));
    assert!(matches!(
        catalog.read_source(1),
        Err(SimputError::NotFound { .. })
    ));
    assert!(matches!(
        catalog.read_source(2),
        Err(SimputError::UnsupportedType(_))
    ));
    assert!(matches!(
        catalog.read_source(3),
        Err(SimputError::MalformedReference { .. })
    ));

    assert!(matches!(
        SimputCatalog::load(&missing),
        Err(SimputError::NotFound { .. })
    ));
}

#[test]
fn test_multi_row_spectra() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cat.fits");
    {
        let mut fptr = fits_create(&path).unwrap();
        let hdu = fits_create_table(
            &mut fptr,
            "SPECTRUM",
            &[
                fits_column("NAME", ColumnDataType::String, 80).unwrap(),
                fits_column("ENERGY", ColumnDataType::Float, 3).unwrap(),
                fits_column("FLUXDENSITY", ColumnDataType::Double, 3).unwrap(),
            ],
        )
        .unwrap();
        fits_write_col(&mut fptr, &hdu, "NAME", &["first".to_string(), "second".to_string()])
            .unwrap();
        fits_write_col(&mut fptr, &hdu, "ENERGY", &[1.0_f32, 2.0, 3.0, 2.0, 4.0, 6.0]).unwrap();
        fits_write_col(
            &mut fptr,
            &hdu,
            "FLUXDENSITY",
            &[1.0_f64, 1.0, 1.0, 5.0, 6.0, 7.0],
        )
        .unwrap();
        fits_write_key(&mut fptr, &hdu, "EXTVER", 1_i64).unwrap();

        let columns = IndexColumns {
            ra: vec![0.0; 3],
            dec: vec![0.0; 3],
            emin: vec![0.5; 3],
            emax: vec![7.0; 3],
            flux: vec![1e-12; 3],
            spectra: vec![
                "[SPECTRUM,1][NAME=='second']".to_string(),
                "[SPECTRUM,1,ROW=='0']".to_string(),
                "[SPECTRUM,1][NAME=='third']".to_string(),
            ],
            images: vec!["NULL".to_string(); 3],
            timing: vec!["NULL".to_string(); 3],
            src_names: vec!["x".to_string(); 3],
        };
        write_index_table(&mut fptr, &columns).unwrap();
    }

    let catalog = SimputCatalog::load(&path).unwrap();
    let second = catalog.read_source(0).unwrap();
    let spectrum = second.spectrum().unwrap();
    assert_eq!(spectrum.ebins(), &[1.0, 3.0, 5.0, 7.0]);
    assert_eq!(spectrum.flux(), &[5.0, 6.0, 7.0]);

    let first = catalog.read_source(1).unwrap();
    assert_eq!(first.spectrum().unwrap().ebins(), &[0.5, 1.5, 2.5, 3.5]);

    assert!(matches!(
        catalog.read_source(2),
        Err(SimputError::NotFound { .. })
    ));
}

#[test]
fn test_catalog_without_image_column() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cat.fits");
    {
        let mut fptr = fits_create(&path).unwrap();
        let hdu = fits_create_table(
            &mut fptr,
            "SRC_CAT",
            &[
                fits_column("SRC_ID", ColumnDataType::Int, 1).unwrap(),
                fits_column("RA", ColumnDataType::Double, 1).unwrap(),
                fits_column("DEC", ColumnDataType::Double, 1).unwrap(),
                fits_column("E_MIN", ColumnDataType::Double, 1).unwrap(),
                fits_column("E_MAX", ColumnDataType::Double, 1).unwrap(),
                fits_column("FLUX", ColumnDataType::Double, 1).unwrap(),
                fits_column("SPECTRUM", ColumnDataType::String, 80).unwrap(),
                fits_column("SRC_NAME", ColumnDataType::String, 80).unwrap(),
            ],
        )
        .unwrap();
        fits_write_col(&mut fptr, &hdu, "SRC_ID", &[0_i32, 1]).unwrap();
        for col in ["RA", "DEC", "E_MIN", "E_MAX", "FLUX"] {
            fits_write_col(&mut fptr, &hdu, col, &[1.0_f64, 2.0]).unwrap();
        }
        fits_write_col(
            &mut fptr,
            &hdu,
            "SPECTRUM",
            &["[SPECTRUM,1]".to_string(), "[SPECTRUM,2]".to_string()],
        )
        .unwrap();
        fits_write_col(&mut fptr, &hdu, "SRC_NAME", &["a".to_string(), "b".to_string()])
            .unwrap();
    }
    let catalog = SimputCatalog::load(&path).unwrap();
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.images(), &["NULL", "NULL"]);
    assert_eq!(catalog.timing(), &["NULL", "NULL"]);
    assert_eq!(catalog.src_names(), &["a", "b"]);
}

#[test]
fn test_create_empty_keeps_other_extensions() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cat.fits");
    let mut catalog =
        SimputCatalog::from_source(&path, &spectrum_source("a"), None, false).unwrap();
    catalog.append(&spectrum_source("b"), None, false).unwrap();

    // A new, empty index replaces the old one; the payloads stay.
    let catalog = SimputCatalog::create_empty(&path).unwrap();
    assert!(catalog.is_empty());
    let mut fptr = fits_open(&path).unwrap();
    assert_eq!(fits_num_hdus(&mut fptr).unwrap(), 4);
    drop(fptr);
    assert!(SimputCatalog::load(&path).unwrap().is_empty());
    assert_eq!(next_extver(&path, "SPECTRUM").unwrap(), 3);

    // Overwriting starts from scratch.
    let catalog = SimputCatalog::from_source(&path, &spectrum_source("c"), None, true).unwrap();
    assert_eq!(catalog.spectra(), &["[SPECTRUM,1]"]);
    let mut fptr = fits_open(&path).unwrap();
    assert_eq!(fits_num_hdus(&mut fptr).unwrap(), 3);
}

#[test]
fn test_image_versions_are_unique_across_source_types() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cat.fits");
    let image_of = |r_c: f64, nx: usize| {
        let model = BetaModel {
            ra0: 30.0,
            dec0: 45.0,
            r_c,
            beta: 0.7,
        };
        let spectrum = Spectrum::from_constant(1.0, 0.5, 2.0, 15).unwrap();
        SimputSource::from_spectral_and_spatial_model("model", spectrum, &model, 2.0, nx)
            .image
            .unwrap()
    };
    let image_a = image_of(10.0, 8);
    let image_b = image_of(30.0, 12);

    let mut photons = photon_list_source();
    photons.image = Some(image_a.clone());
    let mut spectrum = spectrum_source("b");
    spectrum.image = Some(image_b.clone());

    let mut catalog = SimputCatalog::from_source(&path, &photons, None, false).unwrap();
    catalog.append(&spectrum, None, false).unwrap();
    assert_eq!(catalog.spectra(), &["[PHLIST,1]", "[SPECTRUM,2]"]);
    assert_eq!(catalog.images(), &["[IMAGE,1]", "[IMAGE,2]"]);
    assert_eq!(
        read_string_key(&path, "SPECTRUM", Some(2), "HDUCLAS1"),
        "SPECTRUM"
    );

    // Each source gets its own image back, photon lists included.
    let read = catalog.read_source(0).unwrap();
    assert!(read.photons().is_some());
    assert_eq!(read.image.unwrap().data, image_a.data);
    let read = catalog.read_source(1).unwrap();
    assert_eq!(read.image.unwrap().data, image_b.data);
}

#[test]
fn test_bad_source_names_change_nothing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cat.fits");
    let mut catalog =
        SimputCatalog::from_source(&path, &spectrum_source("a"), None, false).unwrap();
    let mut fptr = fits_open(&path).unwrap();
    let num_hdus = fits_num_hdus(&mut fptr).unwrap();
    drop(fptr);

    let long_name = "x".repeat(100);
    for name in [long_name.as_str(), "bad\0name"] {
        assert!(matches!(
            catalog.append(&spectrum_source(name), None, false),
            Err(SimputError::BadSourceName { .. })
        ));
        assert_eq!(catalog.len(), 1);
    }
    let mut fptr = fits_open(&path).unwrap();
    assert_eq!(fits_num_hdus(&mut fptr).unwrap(), num_hdus);
    drop(fptr);
    assert_eq!(SimputCatalog::load(&path).unwrap(), catalog);

    // A name that fills the column exactly is kept whole.
    let full_name = "y".repeat(80);
    catalog
        .append(&spectrum_source(&full_name), None, false)
        .unwrap();
    assert_eq!(catalog.spectra(), &["[SPECTRUM,1]", "[SPECTRUM,2]"]);
    assert_eq!(catalog.read_source(1).unwrap().name, full_name);

    // Nothing is written for a catalog that can't hold its first source.
    let other = dir.path().join("other.fits");
    assert!(matches!(
        SimputCatalog::from_source(&other, &spectrum_source(&long_name), None, false),
        Err(SimputError::BadSourceName { .. })
    ));
    assert!(!other.exists());
}

#[test]
fn test_failed_index_rewrite_keeps_old_index() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cat.fits");
    let mut catalog =
        SimputCatalog::from_source(&path, &spectrum_source("a"), None, false).unwrap();
    catalog.append(&photon_list_source(), None, false).unwrap();

    let mut fptr = fits_edit(&path).unwrap();
    let num_hdus = fits_num_hdus(&mut fptr).unwrap();
    let hdu = fits_open_hdu_by_name(&mut fptr, "SRC_CAT", None)
        .unwrap()
        .unwrap();
    let mut columns = read_index_table(&mut fptr, &hdu).unwrap();
    columns.src_names[1] = "bad\0name".to_string();
    assert!(replace_index_table(&mut fptr, &columns).is_err());
    assert_eq!(fits_num_hdus(&mut fptr).unwrap(), num_hdus);
    drop(fptr);

    let loaded = SimputCatalog::load(&path).unwrap();
    assert_eq!(loaded, catalog);
    assert_eq!(loaded.src_names(), &["a", "photons"]);

    // A good rewrite leaves exactly one index table.
    catalog.append(&spectrum_source("c"), None, false).unwrap();
    let mut fptr = fits_open(&path).unwrap();
    let num_src_cats = (0..fits_num_hdus(&mut fptr).unwrap())
        .filter(|&i| {
            let hdu = fits_open_hdu(&mut fptr, i).unwrap();
            let name: Option<String> = fits_get_optional_key(&mut fptr, &hdu, "EXTNAME").unwrap();
            name.as_deref() == Some("SRC_CAT")
        })
        .count();
    assert_eq!(num_src_cats, 1);
    drop(fptr);
    assert_eq!(SimputCatalog::load(&path).unwrap().len(), 3);
}
