use geo::{BoundingRect, Geometry, MultiPolygon, Rect};
use geojson::feature::Id;
use geojson::{Feature, FeatureCollection};
use rayon::prelude::*;

use crate::lookup::{pad_fips, state_abbrev, NON_CONTINENTAL};

/// A boundary polygon ready for rasterizing and hit-testing
#[derive(Clone, Debug)]
pub struct Region {
    /// Join key: state abbreviation or padded county FIPS.
    /// `None` when the feature cannot be joined to any data row.
    pub key: Option<String>,
    /// Display name (state name or county FIPS)
    pub name: String,
    pub shape: MultiPolygon<f64>,
    pub bbox: Rect<f64>,
}

impl Region {
    /// Center of the bounding box as (lon, lat)
    pub fn center(&self) -> (f64, f64) {
        let c = self.bbox.center();
        (c.x, c.y)
    }
}

/// Extract the polygonal part of a feature's geometry
fn feature_shape(feature: Feature) -> Option<MultiPolygon<f64>> {
    let geometry = feature.geometry?;
    match Geometry::<f64>::try_from(geometry.value).ok()? {
        Geometry::Polygon(p) => Some(MultiPolygon::new(vec![p])),
        Geometry::MultiPolygon(mp) => Some(mp),
        Geometry::GeometryCollection(gc) => {
            let polys: Vec<_> = gc
                .into_iter()
                .flat_map(|g| match g {
                    Geometry::Polygon(p) => vec![p],
                    Geometry::MultiPolygon(mp) => mp.0,
                    _ => Vec::new(),
                })
                .collect();
            (!polys.is_empty()).then(|| MultiPolygon::new(polys))
        }
        _ => None,
    }
}

fn into_region(key: Option<String>, name: String, feature: Feature) -> Option<Region> {
    let shape = feature_shape(feature)?;
    let bbox = shape.bounding_rect()?;
    Some(Region {
        key,
        name,
        shape,
        bbox,
    })
}

/// Zero-padded FIPS string for a county feature id.
///
/// Ids are usually numeric (`1001`), occasionally strings (`"01001"`).
pub fn feature_fips(feature: &Feature) -> Option<String> {
    let raw = match feature.id.as_ref()? {
        Id::String(s) => s.clone(),
        Id::Number(n) => match (n.as_u64(), n.as_f64()) {
            (Some(u), _) => u.to_string(),
            (None, Some(f)) if f >= 0.0 => (f as u64).to_string(),
            _ => n.to_string(),
        },
    };
    Some(pad_fips(&raw))
}

/// Convert the national state boundaries into regions.
///
/// Alaska, Hawaii and Puerto Rico are dropped. Features whose name is not
/// in the state table stay in the layer with no join key.
pub fn state_regions(fc: FeatureCollection) -> Vec<Region> {
    fc.features
        .into_iter()
        .filter_map(|feature| {
            let name = feature
                .property("name")
                .and_then(|v| v.as_str())
                .map(str::to_string)?;
            if NON_CONTINENTAL.contains(&name.as_str()) {
                return None;
            }
            let key = state_abbrev(&name).map(str::to_string);
            if key.is_none() {
                log::debug!("state feature {name:?} has no abbreviation");
            }
            into_region(key, name, feature)
        })
        .collect()
}

/// Convert county boundaries into regions for one state.
///
/// Keeps exactly the features whose padded id starts with `prefix`.
pub fn county_regions(fc: FeatureCollection, prefix: &str) -> Vec<Region> {
    fc.features
        .into_par_iter()
        .filter_map(|feature| {
            let fips = feature_fips(&feature)?;
            if !fips.starts_with(prefix) {
                return None;
            }
            into_region(Some(fips.clone()), fips, feature)
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use geojson::{GeoJson, JsonObject, JsonValue};

    /// Axis-aligned square feature for tests
    pub fn square_feature(min: (f64, f64), size: f64) -> Feature {
        let (x, y) = min;
        let ring = vec![
            vec![x, y],
            vec![x + size, y],
            vec![x + size, y + size],
            vec![x, y + size],
            vec![x, y],
        ];
        Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geojson::Value::Polygon(vec![ring]))),
            id: None,
            properties: None,
            foreign_members: None,
        }
    }

    pub fn named_state(name: &str, min: (f64, f64), size: f64) -> Feature {
        let mut feature = square_feature(min, size);
        let mut props = JsonObject::new();
        props.insert("name".to_string(), JsonValue::from(name));
        feature.properties = Some(props);
        feature
    }

    pub fn county(id: u64, min: (f64, f64), size: f64) -> Feature {
        let mut feature = square_feature(min, size);
        feature.id = Some(Id::Number(id.into()));
        feature
    }

    fn collection(features: Vec<Feature>) -> FeatureCollection {
        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }

    #[test]
    fn test_non_continental_states_dropped() {
        let fc = collection(vec![
            named_state("Texas", (-106.0, 26.0), 10.0),
            named_state("Alaska", (-170.0, 55.0), 20.0),
            named_state("Hawaii", (-160.0, 19.0), 3.0),
            named_state("Puerto Rico", (-67.0, 18.0), 1.0),
            named_state("Atlantis", (-40.0, 30.0), 1.0),
        ]);
        let regions = state_regions(fc);
        let names: Vec<_> = regions.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Texas", "Atlantis"]);
        assert_eq!(regions[0].key.as_deref(), Some("TX"));
        assert_eq!(regions[1].key, None);
    }

    #[test]
    fn test_county_filter_by_padded_prefix() {
        let fc = collection(vec![
            county(1001, (-87.0, 32.0), 0.5),
            county(1003, (-88.0, 30.5), 0.5),
            county(10001, (-75.5, 39.0), 0.5),
            county(48201, (-95.5, 29.5), 0.5),
        ]);
        let regions = county_regions(fc, "01");
        let mut keys: Vec<_> = regions.iter().filter_map(|r| r.key.clone()).collect();
        keys.sort();
        assert_eq!(keys, ["01001", "01003"]);
    }

    #[test]
    fn test_feature_fips_string_and_number() {
        let mut f = county(6037, (0.0, 0.0), 1.0);
        assert_eq!(feature_fips(&f).as_deref(), Some("06037"));
        f.id = Some(Id::String("48201".to_string()));
        assert_eq!(feature_fips(&f).as_deref(), Some("48201"));
        f.id = None;
        assert_eq!(feature_fips(&f), None);
    }

    #[test]
    fn test_region_center_is_bbox_center() {
        let fc = collection(vec![named_state("Colorado", (-109.0, 37.0), 4.0)]);
        let region = &state_regions(fc)[0];
        assert_eq!(region.center(), (-107.0, 39.0));
    }

    #[test]
    fn test_parse_feature_collection_text() {
        let text = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","id":1001,"properties":{},
             "geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,1],[0,0]]]}}]}"#;
        let GeoJson::FeatureCollection(fc) = text.parse::<GeoJson>().unwrap() else {
            panic!("expected a FeatureCollection");
        };
        assert_eq!(county_regions(fc, "01").len(), 1);
    }
}
