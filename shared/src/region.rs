use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// Backend position, `[longitude, latitude]`.
pub type Position = [f64; 2];
pub type Ring = Vec<Position>;
pub type PolygonRings = Vec<Ring>;

/// Position as the map surface expects it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Flip a backend `[longitude, latitude]` pair.
    pub const fn from_lon_lat(position: Position) -> Self {
        Self {
            lat: position[1],
            lng: position[0],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeometryKind {
    Polygon,
    MultiPolygon,
}

/// Region outline. A `Polygon` is one fewer nesting level than a `MultiPolygon`.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Polygon(PolygonRings),
    MultiPolygon(Vec<PolygonRings>),
}

impl Geometry {
    pub const fn kind(&self) -> GeometryKind {
        match self {
            Self::Polygon(_) => GeometryKind::Polygon,
            Self::MultiPolygon(_) => GeometryKind::MultiPolygon,
        }
    }

    /// Every polygon of the geometry, a plain `Polygon` counting as a
    /// single-element multipolygon.
    pub fn polygons(&self) -> &[PolygonRings] {
        match self {
            Self::Polygon(rings) => std::slice::from_ref(rings),
            Self::MultiPolygon(polygons) => polygons,
        }
    }

    /// One outline per polygon, with that polygon's rings concatenated and
    /// every position flipped to latitude/longitude.
    pub fn outlines(&self) -> Vec<Vec<LatLng>> {
        self.polygons()
            .iter()
            .map(|rings| {
                rings
                    .iter()
                    .flatten()
                    .copied()
                    .map(LatLng::from_lon_lat)
                    .collect()
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawRegion")]
pub struct Region {
    pub name: String,
    pub geometry: Geometry,
}

impl Region {
    pub fn new(name: impl Into<String>, geometry: Geometry) -> Self {
        Self {
            name: name.into(),
            geometry,
        }
    }

    pub fn outlines(&self) -> Vec<Vec<LatLng>> {
        self.geometry.outlines()
    }
}

impl Serialize for Region {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut region = serializer.serialize_struct("Region", 3)?;
        region.serialize_field("name", &self.name)?;
        region.serialize_field("type", &self.geometry.kind())?;
        match &self.geometry {
            Geometry::Polygon(rings) => region.serialize_field("coordinates", rings)?,
            Geometry::MultiPolygon(polygons) => region.serialize_field("coordinates", polygons)?,
        }
        region.end()
    }
}

#[derive(Deserialize)]
struct RawRegion {
    name: String,
    #[serde(rename = "type")]
    kind: GeometryKind,
    coordinates: serde_json::Value,
}

impl TryFrom<RawRegion> for Region {
    type Error = String;

    fn try_from(raw: RawRegion) -> Result<Self, Self::Error> {
        let geometry = match raw.kind {
            GeometryKind::Polygon => {
                let rings: Vec<Vec<Vec<f64>>> = serde_json::from_value(raw.coordinates)
                    .map_err(|e| format!("region {}: invalid Polygon coordinates: {e}", raw.name))?;
                Geometry::Polygon(parse_rings(&raw.name, rings)?)
            }
            GeometryKind::MultiPolygon => {
                let polygons: Vec<Vec<Vec<Vec<f64>>>> = serde_json::from_value(raw.coordinates)
                    .map_err(|e| {
                        format!("region {}: invalid MultiPolygon coordinates: {e}", raw.name)
                    })?;
                Geometry::MultiPolygon(
                    polygons
                        .into_iter()
                        .map(|rings| parse_rings(&raw.name, rings))
                        .collect::<Result<_, _>>()?,
                )
            }
        };

        Ok(Self {
            name: raw.name,
            geometry,
        })
    }
}

// GeoJSON positions may carry an altitude; only the first two axes are kept.
fn parse_rings(name: &str, rings: Vec<Vec<Vec<f64>>>) -> Result<PolygonRings, String> {
    rings
        .into_iter()
        .map(|ring| {
            ring.into_iter()
                .map(|position| match position.as_slice() {
                    [lon, lat, ..] => Ok([*lon, *lat]),
                    _ => Err(format!(
                        "region {name}: position needs at least two axes, got {}",
                        position.len()
                    )),
                })
                .collect()
        })
        .collect()
}

const TURKISH_ALPHABET: &str = "abcçdefgğhıijklmnoöprsştuüvwxyz";

/// Sort key ordering region names the way a Turkish, base-sensitivity
/// collator does: case is ignored, circumflexes fold onto their base letter
/// and `ç ğ ı ö ş ü` sort right after `c g h o s u`.
pub fn collation_key(name: &str) -> Vec<u32> {
    name.chars()
        .flat_map(turkish_lowercase)
        .map(|c| {
            let c = match c {
                'â' => 'a',
                'î' => 'i',
                'û' => 'u',
                other => other,
            };
            match TURKISH_ALPHABET.chars().position(|letter| letter == c) {
                Some(rank) => 0x1_0000 + rank as u32,
                None if c.is_alphabetic() => 0x2_0000 + c as u32,
                None => c as u32,
            }
        })
        .collect()
}

fn turkish_lowercase(c: char) -> impl Iterator<Item = char> {
    let mapped: Option<char> = match c {
        'I' => Some('ı'),
        'İ' => Some('i'),
        _ => None,
    };
    mapped
        .into_iter()
        .chain(mapped.is_none().then(|| c.to_lowercase()).into_iter().flatten())
}

/// Sort names in place with [`collation_key`].
pub fn sort_names(names: &mut [String]) {
    names.sort_by_cached_key(|name| collation_key(name));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(offset: f64) -> Ring {
        vec![
            [offset, 40.0],
            [offset + 1.0, 40.0],
            [offset + 1.0, 41.0],
            [offset, 40.0],
        ]
    }

    #[test]
    fn polygon_and_single_multipolygon_share_outlines() {
        let rings = vec![square(28.0), square(28.25)];
        let polygon = Geometry::Polygon(rings.clone());
        let multi = Geometry::MultiPolygon(vec![rings]);

        assert_eq!(polygon.outlines(), multi.outlines());
        assert_eq!(polygon.outlines().len(), 1);
        assert_eq!(polygon.outlines()[0].len(), 8);
    }

    #[test]
    fn outlines_swap_to_lat_lng() {
        let geometry = Geometry::Polygon(vec![vec![[29.02, 40.99]]]);
        assert_eq!(geometry.outlines(), vec![vec![LatLng::new(40.99, 29.02)]]);
    }

    #[test]
    fn multipolygon_yields_one_outline_per_polygon() {
        let geometry = Geometry::MultiPolygon(vec![vec![square(28.0)], vec![square(29.0)]]);
        let outlines = geometry.outlines();
        assert_eq!(outlines.len(), 2);
        assert_eq!(outlines[1][0], LatLng::new(40.0, 29.0));
    }

    #[test]
    fn region_decodes_both_geometry_kinds() {
        let json = r#"[
            {"name":"Kadikoy","type":"Polygon","coordinates":[[[29.0,40.9],[29.1,40.9],[29.0,40.9]]]},
            {"name":"Adalar","type":"MultiPolygon","coordinates":[[[[29.1,40.8],[29.2,40.8],[29.1,40.8]]],[[[29.0,40.86,12.5],[29.05,40.86],[29.0,40.86]]]]}
        ]"#;
        let regions: Vec<Region> = serde_json::from_str(json).expect("regions decode");

        assert_eq!(regions[0].geometry.kind(), GeometryKind::Polygon);
        assert_eq!(regions[1].geometry.kind(), GeometryKind::MultiPolygon);
        assert_eq!(regions[1].geometry.polygons().len(), 2);
        assert_eq!(regions[1].geometry.polygons()[1][0][0], [29.0, 40.86]);
    }

    #[test]
    fn region_rejects_mismatched_nesting() {
        let json = r#"{"name":"Broken","type":"MultiPolygon","coordinates":[[[29.0,40.9]]]}"#;
        let err = serde_json::from_str::<Region>(json).expect_err("nesting mismatch");
        assert!(err.to_string().contains("Broken"));
    }

    #[test]
    fn region_rejects_short_positions() {
        let json = r#"{"name":"Flat","type":"Polygon","coordinates":[[[29.0]]]}"#;
        assert!(serde_json::from_str::<Region>(json).is_err());
    }

    #[test]
    fn region_serializes_wire_shape() {
        let region = Region::new("Besiktas", Geometry::Polygon(vec![vec![[29.0, 41.0]]]));
        let value = serde_json::to_value(&region).expect("serialize region");
        assert_eq!(
            value,
            serde_json::json!({
                "name": "Besiktas",
                "type": "Polygon",
                "coordinates": [[[29.0, 41.0]]]
            })
        );
        let back: Region = serde_json::from_value(value).expect("decode region");
        assert_eq!(back, region);
    }

    #[test]
    fn names_sort_with_turkish_letters() {
        let mut names = vec![
            "Şile".to_string(),
            "Sarıyer".to_string(),
            "Çatalca".to_string(),
            "Esenler".to_string(),
            "beykoz".to_string(),
            "Üsküdar".to_string(),
            "Ümraniye".to_string(),
            "Cihangir".to_string(),
        ];
        sort_names(&mut names);
        assert_eq!(
            names,
            vec![
                "beykoz", "Cihangir", "Çatalca", "Esenler", "Sarıyer", "Şile", "Ümraniye",
                "Üsküdar",
            ]
        );
    }

    #[test]
    fn dotted_and_dotless_i_sort_apart() {
        assert!(collation_key("Istanbul") < collation_key("İstanbul"));
        assert_eq!(collation_key("İzmir"), collation_key("izmir"));
    }
}
