// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Instrument specifications and the registry that holds them.
//!
//! A specification is exchanged as a JSON (or YAML) object with a fixed set of
//! items. Imaging instruments carry
//! `{name, arf, rmf, bkgnd, fov, chips, aimpt_coords, focal_length, num_pixels, dither, psf, imaging, grating}`;
//! everything else carries `{name, arf, rmf, bkgnd, focal_length, imaging, grating}`.
//! Any other set of items is rejected. Specifications written before the
//! `imaging` and `grating` items existed are accepted with a warning.

mod builtin;
mod error;
mod registry;

pub use error::InstrumentError;
pub use registry::InstrumentRegistry;

use log::warn;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// The items of an imaging instrument specification, in the order that they
/// are written out.
const IMAGING_ITEMS: [&str; 13] = [
    "name",
    "arf",
    "rmf",
    "bkgnd",
    "fov",
    "num_pixels",
    "aimpt_coords",
    "chips",
    "focal_length",
    "dither",
    "psf",
    "imaging",
    "grating",
];

/// The items of a non-imaging instrument specification.
const NON_IMAGING_ITEMS: [&str; 7] = [
    "name",
    "arf",
    "rmf",
    "bkgnd",
    "focal_length",
    "imaging",
    "grating",
];

/// An instrument configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct InstrumentSpec {
    /// The short, unique name of the instrument.
    pub name: String,

    /// The file containing the effective area (ARF).
    pub arf: String,

    /// The file containing the response matrix (RMF).
    pub rmf: String,

    /// The particle background, if any.
    pub bkgnd: Option<BkgndSpec>,

    /// \[metres\]
    pub focal_length: f64,

    /// Is this a gratings instrument (for spectra only)?
    pub grating: bool,

    /// The imaging geometry. `None` means that this is not an imaging
    /// instrument.
    pub imaging: Option<ImagingSpec>,
}

/// The geometry of an imaging instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagingSpec {
    /// The field of view \[arcminutes\].
    pub fov: f64,

    /// The number of pixels on a side of the field of view.
    pub num_pixels: u32,

    /// The detector coordinates of the aimpoint.
    pub aimpt_coords: [f64; 2],

    /// The detector chips. `None` means a single square chip covering the
    /// field of view.
    pub chips: Option<Vec<ChipSpec>>,

    /// Whether or not the pointing dithers.
    pub dither: bool,

    pub psf: Option<PsfSpec>,
}

impl ImagingSpec {
    /// The width of a detector pixel on the sky \[arcminutes\].
    pub fn pixel_scale(&self) -> f64 {
        self.fov / self.num_pixels as f64
    }

    /// The chips of this instrument, expanding the "no chips" case into a
    /// single square chip.
    pub fn chip_regions(&self) -> Vec<ChipSpec> {
        match &self.chips {
            Some(chips) => chips.clone(),
            None => {
                let n = self.num_pixels as f64;
                vec![ChipSpec::Box {
                    x0: 0.0,
                    y0: 0.0,
                    width: n,
                    height: n,
                }]
            }
        }
    }
}

/// A detector chip in detector pixel coordinates. Box and circle positions are
/// centres.
#[derive(Debug, Clone, PartialEq)]
pub enum ChipSpec {
    Box {
        x0: f64,
        y0: f64,
        width: f64,
        height: f64,
    },
    Circle {
        x0: f64,
        y0: f64,
        radius: f64,
    },
    Polygon {
        x: Vec<f64>,
        y: Vec<f64>,
    },
}

impl ChipSpec {
    /// The area of the chip \[pixels²\].
    pub fn pixel_area(&self) -> f64 {
        match self {
            ChipSpec::Box { width, height, .. } => width * height,
            ChipSpec::Circle { radius, .. } => std::f64::consts::PI * radius * radius,
            ChipSpec::Polygon { x, y } => {
                // Shoelace formula.
                let n = x.len();
                let twice_area: f64 = (0..n)
                    .map(|i| {
                        let j = (i + 1) % n;
                        x[i] * y[j] - x[j] * y[i]
                    })
                    .sum();
                0.5 * twice_area.abs()
            }
        }
    }

    /// The bounding box of the chip as `(x_min, x_max, y_min, y_max)`.
    pub fn bounding_box(&self) -> (f64, f64, f64, f64) {
        match self {
            ChipSpec::Box {
                x0,
                y0,
                width,
                height,
            } => (
                x0 - 0.5 * width,
                x0 + 0.5 * width,
                y0 - 0.5 * height,
                y0 + 0.5 * height,
            ),
            ChipSpec::Circle { x0, y0, radius } => {
                (x0 - radius, x0 + radius, y0 - radius, y0 + radius)
            }
            ChipSpec::Polygon { x, y } => (
                x.iter().copied().fold(f64::INFINITY, f64::min),
                x.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                y.iter().copied().fold(f64::INFINITY, f64::min),
                y.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            ),
        }
    }

    /// Is the detector position inside the chip?
    pub fn contains(&self, px: f64, py: f64) -> bool {
        match self {
            ChipSpec::Box { .. } => {
                let (x_min, x_max, y_min, y_max) = self.bounding_box();
                (x_min..=x_max).contains(&px) && (y_min..=y_max).contains(&py)
            }
            ChipSpec::Circle { x0, y0, radius } => {
                (px - x0).powi(2) + (py - y0).powi(2) <= radius * radius
            }
            ChipSpec::Polygon { x, y } => {
                // Even-odd ray casting.
                let n = x.len();
                let mut inside = false;
                let mut j = n - 1;
                for i in 0..n {
                    if (y[i] > py) != (y[j] > py)
                        && px < (x[j] - x[i]) * (py - y[i]) / (y[j] - y[i]) + x[i]
                    {
                        inside = !inside;
                    }
                    j = i;
                }
                inside
            }
        }
    }

    fn from_json(value: &Value) -> Result<ChipSpec, InstrumentError> {
        let bad = || InstrumentError::BadChip(value.to_string());
        let items = value.as_array().ok_or_else(bad)?;
        let numbers = |values: &[Value]| -> Option<Vec<f64>> {
            values.iter().map(Value::as_f64).collect()
        };
        match (items.first().and_then(Value::as_str), items.len()) {
            (Some("Box"), 5) => {
                let v = numbers(&items[1..]).ok_or_else(bad)?;
                Ok(ChipSpec::Box {
                    x0: v[0],
                    y0: v[1],
                    width: v[2],
                    height: v[3],
                })
            }
            (Some("Circle"), 4) => {
                let v = numbers(&items[1..]).ok_or_else(bad)?;
                Ok(ChipSpec::Circle {
                    x0: v[0],
                    y0: v[1],
                    radius: v[2],
                })
            }
            (Some("Polygon"), 3) => {
                let x = items[1]
                    .as_array()
                    .and_then(|a| numbers(a.as_slice()))
                    .ok_or_else(bad)?;
                let y = items[2]
                    .as_array()
                    .and_then(|a| numbers(a.as_slice()))
                    .ok_or_else(bad)?;
                if x.len() != y.len() || x.len() < 3 {
                    return Err(bad());
                }
                Ok(ChipSpec::Polygon { x, y })
            }
            _ => Err(bad()),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            ChipSpec::Box {
                x0,
                y0,
                width,
                height,
            } => json!([
                "Box",
                number(*x0),
                number(*y0),
                number(*width),
                number(*height)
            ]),
            ChipSpec::Circle { x0, y0, radius } => {
                json!(["Circle", number(*x0), number(*y0), number(*radius)])
            }
            ChipSpec::Polygon { x, y } => json!([
                "Polygon",
                x.iter().copied().map(number).collect::<Vec<_>>(),
                y.iter().copied().map(number).collect::<Vec<_>>()
            ]),
        }
    }
}

/// The point-spread function of an imaging instrument.
#[derive(Debug, Clone, PartialEq)]
pub enum PsfSpec {
    /// A Gaussian with the given FWHM \[arcseconds\].
    Gaussian(f64),

    /// A single image in the given extension of a file.
    Image { file: String, extension: i64 },

    /// A set of images (one per energy/off-axis angle) in a file.
    MultiImage(String),
}

impl PsfSpec {
    fn from_json(value: &Value) -> Result<PsfSpec, InstrumentError> {
        let bad = || InstrumentError::BadPsf(value.to_string());
        let items = value.as_array().ok_or_else(bad)?;
        match (items.first().and_then(Value::as_str), items.len()) {
            (Some("gaussian"), 2) => Ok(PsfSpec::Gaussian(items[1].as_f64().ok_or_else(bad)?)),
            (Some("image"), 3) => Ok(PsfSpec::Image {
                file: items[1].as_str().ok_or_else(bad)?.to_string(),
                extension: items[2].as_i64().ok_or_else(bad)?,
            }),
            (Some("multi_image"), 2) => Ok(PsfSpec::MultiImage(
                items[1].as_str().ok_or_else(bad)?.to_string(),
            )),
            _ => Err(bad()),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            PsfSpec::Gaussian(fwhm) => json!(["gaussian", number(*fwhm)]),
            PsfSpec::Image { file, extension } => json!(["image", file, extension]),
            PsfSpec::MultiImage(file) => json!(["multi_image", file]),
        }
    }
}

/// The particle background of an instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BkgndSpec {
    /// A named background that is looked up elsewhere (e.g. "aciss").
    Alias(String),

    /// A background spectrum file and the area it was extracted from
    /// \[arcmin²\].
    Single(String, f64),

    /// One `[file, area]` pair per chip.
    PerChip(Vec<(String, f64)>),
}

impl InstrumentSpec {
    pub fn is_imaging(&self) -> bool {
        self.imaging.is_some()
    }

    /// The imaging geometry, or an error if this isn't an imaging instrument.
    pub fn imaging_spec(&self) -> Result<&ImagingSpec, InstrumentError> {
        self.imaging
            .as_ref()
            .ok_or_else(|| InstrumentError::NotImaging(self.name.clone()))
    }

    /// Check the things that the types can't.
    pub(crate) fn validate(&self) -> Result<(), InstrumentError> {
        if self.grating && self.imaging.is_some() {
            return Err(InstrumentError::GratingAndImaging(self.name.clone()));
        }
        Ok(())
    }
}

impl TryFrom<Value> for InstrumentSpec {
    type Error = InstrumentError;

    fn try_from(value: Value) -> Result<InstrumentSpec, InstrumentError> {
        let mut map = match value {
            Value::Object(map) => map,
            _ => return Err(InstrumentError::NotAnObject),
        };
        let display_name = map
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("<unnamed>")
            .to_string();

        // Older specifications don't distinguish between imaging and
        // non-imaging instruments.
        if !map.contains_key("imaging") {
            warn!("Instrument specifications must now include an 'imaging' item, which determines whether or not this instrument specification supports imaging. Default is true.");
            map.insert("imaging".to_string(), Value::Bool(true));
        }
        if !map.contains_key("grating") {
            warn!("Instrument specifications must now include a 'grating' item, which determines whether or not this instrument specification corresponds to a gratings instrument. Default is false.");
            map.insert("grating".to_string(), Value::Bool(false));
        }
        let imaging: bool = field(&map, "imaging")?;
        let grating: bool = field(&map, "grating")?;
        if imaging && grating {
            return Err(InstrumentError::GratingAndImaging(display_name));
        }

        let expected: &[&str] = if imaging {
            &IMAGING_ITEMS
        } else {
            &NON_IMAGING_ITEMS
        };
        let missing: Vec<String> = expected
            .iter()
            .filter(|item| !map.contains_key(**item))
            .map(|item| item.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(InstrumentError::MissingFields {
                name: display_name,
                fields: missing,
            });
        }
        let extra: Vec<String> = map
            .keys()
            .filter(|key| !expected.contains(&key.as_str()))
            .cloned()
            .collect();
        if !extra.is_empty() {
            return Err(InstrumentError::ExtraFields {
                name: display_name,
                fields: extra,
            });
        }

        let imaging = if imaging {
            let chips = match &map["chips"] {
                Value::Null => None,
                Value::Array(chips) => Some(
                    chips
                        .iter()
                        .map(ChipSpec::from_json)
                        .collect::<Result<Vec<_>, _>>()?,
                ),
                other => return Err(InstrumentError::BadChip(other.to_string())),
            };
            let psf = match &map["psf"] {
                Value::Null => None,
                other => Some(PsfSpec::from_json(other)?),
            };
            Some(ImagingSpec {
                fov: field(&map, "fov")?,
                num_pixels: field(&map, "num_pixels")?,
                aimpt_coords: field(&map, "aimpt_coords")?,
                chips,
                dither: field(&map, "dither")?,
                psf,
            })
        } else {
            None
        };

        Ok(InstrumentSpec {
            name: field(&map, "name")?,
            arf: field(&map, "arf")?,
            rmf: field(&map, "rmf")?,
            bkgnd: field(&map, "bkgnd")?,
            focal_length: field(&map, "focal_length")?,
            grating,
            imaging,
        })
    }
}

impl From<InstrumentSpec> for Value {
    fn from(spec: InstrumentSpec) -> Value {
        let mut map = Map::new();
        map.insert("name".to_string(), Value::String(spec.name));
        map.insert("arf".to_string(), Value::String(spec.arf));
        map.insert("rmf".to_string(), Value::String(spec.rmf));
        map.insert(
            "bkgnd".to_string(),
            match spec.bkgnd {
                None => Value::Null,
                Some(BkgndSpec::Alias(alias)) => Value::String(alias),
                Some(BkgndSpec::Single(file, area)) => json!([file, area]),
                Some(BkgndSpec::PerChip(pairs)) => Value::Array(
                    pairs
                        .into_iter()
                        .map(|(file, area)| json!([file, area]))
                        .collect(),
                ),
            },
        );
        if let Some(imaging) = &spec.imaging {
            map.insert("fov".to_string(), number(imaging.fov));
            map.insert("num_pixels".to_string(), json!(imaging.num_pixels));
            map.insert(
                "aimpt_coords".to_string(),
                json!([imaging.aimpt_coords[0], imaging.aimpt_coords[1]]),
            );
            map.insert(
                "chips".to_string(),
                match &imaging.chips {
                    None => Value::Null,
                    Some(chips) => Value::Array(chips.iter().map(ChipSpec::to_json).collect()),
                },
            );
        }
        map.insert("focal_length".to_string(), json!(spec.focal_length));
        if let Some(imaging) = &spec.imaging {
            map.insert("dither".to_string(), Value::Bool(imaging.dither));
            map.insert(
                "psf".to_string(),
                imaging.psf.as_ref().map(PsfSpec::to_json).unwrap_or(Value::Null),
            );
        }
        map.insert("imaging".to_string(), Value::Bool(spec.imaging.is_some()));
        map.insert("grating".to_string(), Value::Bool(spec.grating));
        Value::Object(map)
    }
}

/// Deserialise a single item of a specification.
fn field<T: DeserializeOwned>(
    map: &Map<String, Value>,
    key: &'static str,
) -> Result<T, InstrumentError> {
    let value = map.get(key).cloned().unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|err| InstrumentError::BadField { field: key, err })
}

/// Whole numbers are written without a fractional part, so that pixel
/// coordinates read like the integers they usually are.
fn number(v: f64) -> Value {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        json!(v as i64)
    } else {
        json!(v)
    }
}
