//! Feature collection input schema.
//!
//! Input files are GeoJSON-shaped documents. This module deserializes the
//! envelope and geometry with serde and distills the loosely-shaped
//! `properties` objects into typed per-kind views ([`SectorProperties`],
//! [`ProcedurePointProperties`]) exactly once at ingestion, so downstream
//! code never re-checks optionality or re-applies defaults.
//!
//! # Property Defaults
//!
//! - Sector `Position` missing or empty → the [`UNKNOWN_POSITION`] sentinel
//! - Sector `Fill` (or legacy `Color`) missing/unparseable → default fill
//! - Procedure `altitudes`/`speed` missing → empty constraint lists
//! - Procedure `from` accepts a single id or a list of ids

use serde::Deserialize;
use serde_json::Value;

use crate::style::Color;

/// Position value assigned to sector features that carry none.
pub const UNKNOWN_POSITION: &str = "UNKNOWN";

/// A longitude/latitude pair.
///
/// GeoJSON positions are `[lon, lat]` arrays, optionally with a trailing
/// elevation which is accepted and ignored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

impl<'de> Deserialize<'de> for LonLat {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = Vec::<f64>::deserialize(deserializer)?;
        if raw.len() < 2 {
            return Err(serde::de::Error::invalid_length(
                raw.len(),
                &"a [lon, lat] position",
            ));
        }
        Ok(LonLat {
            lon: raw[0],
            lat: raw[1],
        })
    }
}

/// Geometry of a feature, one variant per supported GeoJSON type.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: LonLat },
    MultiPoint { coordinates: Vec<LonLat> },
    LineString { coordinates: Vec<LonLat> },
    MultiLineString { coordinates: Vec<Vec<LonLat>> },
    Polygon { coordinates: Vec<Vec<LonLat>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<LonLat>>> },
}

impl Geometry {
    /// Whether this geometry is a point or multi-point.
    pub fn is_point(&self) -> bool {
        matches!(self, Geometry::Point { .. } | Geometry::MultiPoint { .. })
    }

    /// Collect the line sequences of this geometry, if it is line-shaped.
    pub fn line_sequences(&self) -> Vec<Vec<LonLat>> {
        match self {
            Geometry::LineString { coordinates } => vec![coordinates.clone()],
            Geometry::MultiLineString { coordinates } => coordinates.clone(),
            _ => Vec::new(),
        }
    }

    /// Collect the polygons of this geometry (each polygon is a ring list).
    pub fn polygons(&self) -> Vec<Vec<Vec<LonLat>>> {
        match self {
            Geometry::Polygon { coordinates } => vec![coordinates.clone()],
            Geometry::MultiPolygon { coordinates } => coordinates.clone(),
            _ => Vec::new(),
        }
    }
}

/// One feature of a collection.
///
/// `properties` stays a raw JSON value here; the typed views below are the
/// only sanctioned way to read it after ingestion.
#[derive(Debug, Clone, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub properties: Value,
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

/// A feature collection envelope.
///
/// `features` is required: a document without it is malformed and fails the
/// load of that one file.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub name: Option<String>,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    /// Display name for the item built from this collection: the embedded
    /// `name`, or the file's base name when the collection supplies none.
    pub fn item_name(&self, path: &str) -> String {
        if let Some(name) = self.name.as_deref() {
            if !name.is_empty() {
                return name.to_string();
            }
        }
        file_stem(path)
    }
}

/// Base name of a relative path, without extension.
fn file_stem(path: &str) -> String {
    let base = path.rsplit('/').next().unwrap_or(path);
    match base.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => base.to_string(),
    }
}

/// A scalar property that may arrive as a JSON string or number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ScalarText {
    Text(String),
    Number(serde_json::Number),
}

impl ScalarText {
    fn into_string(self) -> String {
        match self {
            ScalarText::Text(s) => s,
            ScalarText::Number(n) => n.to_string(),
        }
    }
}

/// A property that may arrive as one string or a list of strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawSectorProperties {
    #[serde(rename = "Position")]
    position: Option<String>,
    #[serde(rename = "Low")]
    low: Option<ScalarText>,
    #[serde(rename = "High")]
    high: Option<ScalarText>,
    #[serde(rename = "Fill")]
    fill: Option<String>,
    #[serde(rename = "Color")]
    color: Option<String>,
    #[serde(rename = "Notes")]
    notes: Option<String>,
}

/// Validated properties of a sector polygon feature.
#[derive(Debug, Clone, PartialEq)]
pub struct SectorProperties {
    /// Owning position, [`UNKNOWN_POSITION`] when absent.
    pub position: String,
    /// Lower altitude bound, as carried by the data (string or number).
    pub low: Option<String>,
    /// Upper altitude bound.
    pub high: Option<String>,
    /// Fill color, with the legacy `Color` key and the default as fallbacks.
    pub fill: Color,
    /// Free-form notes shown on hover by UI collaborators.
    pub notes: Option<String>,
}

impl SectorProperties {
    /// Read and normalize the sector properties of a feature.
    pub fn from_feature(feature: &Feature) -> Self {
        let raw: RawSectorProperties =
            serde_json::from_value(feature.properties.clone()).unwrap_or_default();
        let position = match raw.position {
            Some(p) if !p.trim().is_empty() => p,
            _ => UNKNOWN_POSITION.to_string(),
        };
        Self {
            position,
            low: raw.low.map(ScalarText::into_string),
            high: raw.high.map(ScalarText::into_string),
            fill: Color::from_hex_or_default(raw.fill.as_deref().or(raw.color.as_deref())),
            notes: raw.notes,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawPointProperties {
    id: Option<ScalarText>,
    #[serde(default)]
    altitudes: Option<Vec<String>>,
    #[serde(default)]
    speed: Option<Vec<String>>,
    #[serde(default)]
    from: Option<OneOrMany>,
    color: Option<String>,
    icon: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// Validated properties of a procedure point feature.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcedurePointProperties {
    /// Fix/waypoint identifier used as the marker label.
    pub id: Option<String>,
    /// Raw altitude constraint strings.
    pub altitudes: Vec<String>,
    /// Raw speed constraint strings.
    pub speed: Vec<String>,
    /// Identifiers of predecessor points this one connects from.
    pub from: Vec<String>,
    /// Marker color.
    pub color: Color,
    /// Glyph selection: explicit `icon`, or the legacy `type` key.
    pub icon: Option<String>,
}

impl ProcedurePointProperties {
    /// Read and normalize the procedure properties of a point feature.
    pub fn from_feature(feature: &Feature) -> Self {
        let raw: RawPointProperties =
            serde_json::from_value(feature.properties.clone()).unwrap_or_default();
        Self {
            id: raw.id.map(ScalarText::into_string),
            altitudes: raw.altitudes.unwrap_or_default(),
            speed: raw.speed.unwrap_or_default(),
            from: raw.from.map(OneOrMany::into_vec).unwrap_or_default(),
            color: Color::from_hex_or_default(raw.color.as_deref()),
            icon: raw.icon.or(raw.kind),
        }
    }
}
