use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub mod path;
pub mod template;
pub mod validate;

pub use path::{DocError, DocPath, FieldValue, PathStep};
pub use validate::{validate, ValidityWarning};

/// Unique identifier of a part within a document
pub type PartId = String;

/// Insertion-ordered string-keyed map.
///
/// Part/face/loop order is semantically meaningful for the generation
/// service (later parts boolean against earlier ones), so the document
/// cannot use a hash map. Serializes as a plain JSON object, preserving
/// entry order both ways.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V>(Vec<(String, V)>);

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.0.iter_mut().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }

    /// Insert a value, replacing in place if the key already exists
    /// (original position kept).
    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        match self.get_mut(&key) {
            Some(slot) => *slot = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<V> {
        let idx = self.0.iter().position(|(k, _)| k == key)?;
        Some(self.0.remove(idx).1)
    }

    pub fn first(&self) -> Option<(&str, &V)> {
        self.0.first().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut V)> {
        self.0.iter_mut().map(|(k, v)| (k.as_str(), v))
    }
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MapVisitor<V>(std::marker::PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for MapVisitor<V> {
            type Value = OrderedMap<V>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, V>()? {
                    entries.push((key, value));
                }
                Ok(OrderedMap(entries))
            }
        }

        deserializer.deserialize_map(MapVisitor(std::marker::PhantomData))
    }
}

/// Part placement: euler rotation (degrees) plus translation.
///
/// Wire field names are a compatibility surface with the generation
/// service and must not change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateSystem {
    #[serde(rename = "Euler Angles")]
    pub euler_angles: [f64; 3],
    #[serde(rename = "Translation Vector")]
    pub translation: [f64; 3],
}

impl Default for CoordinateSystem {
    fn default() -> Self {
        Self {
            euler_angles: [0.0, 0.0, 0.0],
            translation: [0.0, 0.0, 0.0],
        }
    }
}

/// One 2D sketch segment.
///
/// The wire format carries no type tag; the kind is implied by which
/// fields are present. Variant order matters for untagged
/// deserialization: `Arc` must come before `Line`, otherwise an arc body
/// (which has "Start Point"/"End Point" plus "Mid Point") would be
/// absorbed by the line variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Segment {
    Circle {
        #[serde(rename = "Center")]
        center: [f64; 2],
        #[serde(rename = "Radius")]
        radius: f64,
    },
    Arc {
        #[serde(rename = "Start Point")]
        start: [f64; 2],
        #[serde(rename = "Mid Point")]
        mid: [f64; 2],
        #[serde(rename = "End Point")]
        end: [f64; 2],
    },
    Line {
        #[serde(rename = "Start Point")]
        start: [f64; 2],
        #[serde(rename = "End Point")]
        end: [f64; 2],
    },
}

impl Segment {
    /// Human-readable kind name
    pub fn kind(&self) -> &'static str {
        match self {
            Segment::Circle { .. } => "circle",
            Segment::Arc { .. } => "arc",
            Segment::Line { .. } => "line",
        }
    }

    /// Chain start of the segment (None for circles, which stand alone)
    pub fn chain_start(&self) -> Option<[f64; 2]> {
        match self {
            Segment::Circle { .. } => None,
            Segment::Arc { start, .. } | Segment::Line { start, .. } => Some(*start),
        }
    }

    /// Chain end of the segment (None for circles)
    pub fn chain_end(&self) -> Option<[f64; 2]> {
        match self {
            Segment::Circle { .. } => None,
            Segment::Arc { end, .. } | Segment::Line { end, .. } => Some(*end),
        }
    }
}

/// Boolean combination mode of an extrusion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtrudeOperation {
    #[serde(rename = "NewBodyFeatureOperation")]
    NewBody,
    #[serde(rename = "CutFeatureOperation")]
    Cut,
    #[serde(rename = "JoinFeatureOperation")]
    Join,
    #[serde(rename = "IntersectFeatureOperation")]
    Intersect,
}

impl ExtrudeOperation {
    /// Display label for the editor UI
    pub fn label(&self) -> &'static str {
        match self {
            ExtrudeOperation::NewBody => "New Body",
            ExtrudeOperation::Cut => "Cut",
            ExtrudeOperation::Join => "Join",
            ExtrudeOperation::Intersect => "Intersect",
        }
    }

    pub fn all() -> &'static [ExtrudeOperation] {
        &[
            ExtrudeOperation::NewBody,
            ExtrudeOperation::Cut,
            ExtrudeOperation::Join,
            ExtrudeOperation::Intersect,
        ]
    }
}

/// Extrusion parameters turning a part's sketch into a solid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extrusion {
    pub extrude_depth_towards_normal: f64,
    pub extrude_depth_opposite_normal: f64,
    pub sketch_scale: f64,
    pub operation: ExtrudeOperation,
}

impl Default for Extrusion {
    fn default() -> Self {
        Self {
            extrude_depth_towards_normal: 1.0,
            extrude_depth_opposite_normal: 0.0,
            sketch_scale: 1.0,
            operation: ExtrudeOperation::NewBody,
        }
    }
}

/// A loop: ordered segments expected (but not required) to chain closed
pub type Loop = OrderedMap<Segment>;

/// A sketch face: ordered loops
pub type Face = OrderedMap<Loop>;

/// One part: placement + 2D sketch + extrusion
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Part {
    pub coordinate_system: CoordinateSystem,
    pub sketch: OrderedMap<Face>,
    pub extrusion: Extrusion,
}

/// Flattened reference to one segment inside a part's sketch
#[derive(Debug, Clone, Copy)]
pub struct SegmentRef<'a> {
    pub face_id: &'a str,
    pub loop_id: &'a str,
    pub segment_id: &'a str,
    pub segment: &'a Segment,
}

impl Part {
    /// Flatten the face → loop → segment nesting into an ordered list.
    /// The editor renders this directly instead of re-walking the tree.
    pub fn segments(&self) -> Vec<SegmentRef<'_>> {
        let mut out = Vec::new();
        for (face_id, face) in self.sketch.iter() {
            for (loop_id, lp) in face.iter() {
                for (segment_id, segment) in lp.iter() {
                    out.push(SegmentRef {
                        face_id,
                        loop_id,
                        segment_id,
                        segment,
                    });
                }
            }
        }
        out
    }
}

/// The parametric CAD document: ordered parts plus the opaque
/// `distances` matrix the service round-trips.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CadDocument {
    pub parts: OrderedMap<Part>,
    #[serde(default)]
    pub distances: Vec<Vec<f64>>,
}

impl CadDocument {
    /// Ordered part identifiers (creation order)
    pub fn part_ids(&self) -> Vec<&str> {
        self.parts.keys().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip<T: Serialize + for<'de> Deserialize<'de> + PartialEq + std::fmt::Debug>(val: &T) {
        let json = serde_json::to_string(val).expect("serialize");
        let back: T = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(*val, back);
    }

    fn line(start: [f64; 2], end: [f64; 2]) -> Segment {
        Segment::Line { start, end }
    }

    // --- OrderedMap ---

    #[test]
    fn test_ordered_map_preserves_insertion_order() {
        let mut map: OrderedMap<i32> = OrderedMap::new();
        map.insert("part_3", 3);
        map.insert("part_1", 1);
        map.insert("part_2", 2);
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["part_3", "part_1", "part_2"]);
    }

    #[test]
    fn test_ordered_map_insert_replaces_in_place() {
        let mut map: OrderedMap<i32> = OrderedMap::new();
        map.insert("a", 1);
        map.insert("b", 2);
        map.insert("a", 10);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("a"), Some(&10));
        assert_eq!(map.keys().next(), Some("a"));
    }

    #[test]
    fn test_ordered_map_serde_keeps_order() {
        let mut map: OrderedMap<i32> = OrderedMap::new();
        map.insert("z", 1);
        map.insert("a", 2);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"z":1,"a":2}"#);
        let back: OrderedMap<i32> = serde_json::from_str(&json).unwrap();
        let keys: Vec<&str> = back.keys().collect();
        assert_eq!(keys, vec!["z", "a"]);
    }

    #[test]
    fn test_ordered_map_remove() {
        let mut map: OrderedMap<i32> = OrderedMap::new();
        map.insert("a", 1);
        map.insert("b", 2);
        assert_eq!(map.remove("a"), Some(1));
        assert_eq!(map.remove("a"), None);
        assert_eq!(map.len(), 1);
    }

    // --- Wire format exactness ---

    #[test]
    fn test_coordinate_system_wire_names() {
        let cs = CoordinateSystem::default();
        let json = serde_json::to_string(&cs).unwrap();
        assert!(json.contains(r#""Euler Angles""#));
        assert!(json.contains(r#""Translation Vector""#));
        roundtrip(&cs);
    }

    #[test]
    fn test_line_wire_names() {
        let seg = line([0.0, 0.0], [1.0, 0.0]);
        let json = serde_json::to_string(&seg).unwrap();
        assert_eq!(json, r#"{"Start Point":[0.0,0.0],"End Point":[1.0,0.0]}"#);
        roundtrip(&seg);
    }

    #[test]
    fn test_arc_wire_names() {
        let seg = Segment::Arc {
            start: [0.0, 0.0],
            mid: [0.5, 0.5],
            end: [1.0, 0.0],
        };
        let json = serde_json::to_string(&seg).unwrap();
        assert!(json.contains(r#""Mid Point""#));
        roundtrip(&seg);
    }

    #[test]
    fn test_circle_wire_names() {
        let seg = Segment::Circle {
            center: [1.0, 2.0],
            radius: 0.5,
        };
        let json = serde_json::to_string(&seg).unwrap();
        assert!(json.contains(r#""Center""#));
        assert!(json.contains(r#""Radius""#));
        roundtrip(&seg);
    }

    #[test]
    fn test_arc_does_not_deserialize_as_line() {
        // Untagged resolution: the extra "Mid Point" field must select Arc.
        let json = r#"{"Start Point":[0,0],"Mid Point":[1,1],"End Point":[2,0]}"#;
        let seg: Segment = serde_json::from_str(json).unwrap();
        assert!(matches!(seg, Segment::Arc { .. }));
    }

    #[test]
    fn test_extrude_operation_wire_strings() {
        assert_eq!(
            serde_json::to_string(&ExtrudeOperation::NewBody).unwrap(),
            r#""NewBodyFeatureOperation""#
        );
        assert_eq!(
            serde_json::to_string(&ExtrudeOperation::Cut).unwrap(),
            r#""CutFeatureOperation""#
        );
        assert_eq!(
            serde_json::to_string(&ExtrudeOperation::Join).unwrap(),
            r#""JoinFeatureOperation""#
        );
        assert_eq!(
            serde_json::to_string(&ExtrudeOperation::Intersect).unwrap(),
            r#""IntersectFeatureOperation""#
        );
        for op in ExtrudeOperation::all() {
            roundtrip(op);
        }
    }

    #[test]
    fn test_extrusion_wire_names() {
        let ext = Extrusion::default();
        let json = serde_json::to_string(&ext).unwrap();
        assert!(json.contains(r#""extrude_depth_towards_normal""#));
        assert!(json.contains(r#""extrude_depth_opposite_normal""#));
        assert!(json.contains(r#""sketch_scale""#));
        roundtrip(&ext);
    }

    // --- Document ---

    #[test]
    fn test_document_from_service_json() {
        let json = r#"{
            "parts": {
                "part_1": {
                    "coordinate_system": {
                        "Euler Angles": [0.0, 0.0, -90.0],
                        "Translation Vector": [0.0, 0.0, 0.0]
                    },
                    "sketch": {
                        "face_1": {
                            "loop_1": {
                                "line_1": {"Start Point": [0.0, 0.0], "End Point": [0.75, 0.0]},
                                "arc_1": {"Start Point": [0.75, 0.0], "Mid Point": [0.85, 0.25], "End Point": [0.75, 0.5]},
                                "line_2": {"Start Point": [0.75, 0.5], "End Point": [0.0, 0.5]},
                                "line_3": {"Start Point": [0.0, 0.5], "End Point": [0.0, 0.0]}
                            }
                        },
                        "face_2": {
                            "loop_1": {
                                "circle_1": {"Center": [0.4, 0.25], "Radius": 0.1}
                            }
                        }
                    },
                    "extrusion": {
                        "extrude_depth_towards_normal": 0.25,
                        "extrude_depth_opposite_normal": 0.0,
                        "sketch_scale": 0.75,
                        "operation": "NewBodyFeatureOperation"
                    }
                }
            },
            "distances": [[0.0, 1.5], [1.5, 0.0]]
        }"#;

        let doc: CadDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.part_ids(), vec!["part_1"]);
        assert_eq!(doc.distances, vec![vec![0.0, 1.5], vec![1.5, 0.0]]);

        let part = doc.parts.get("part_1").unwrap();
        assert_eq!(part.coordinate_system.euler_angles, [0.0, 0.0, -90.0]);
        assert_eq!(part.extrusion.sketch_scale, 0.75);

        let segs = part.segments();
        assert_eq!(segs.len(), 5);
        assert_eq!(segs[0].segment_id, "line_1");
        assert_eq!(segs[1].segment.kind(), "arc");
        assert_eq!(segs[4].face_id, "face_2");
        assert!(matches!(segs[4].segment, Segment::Circle { .. }));

        roundtrip(&doc);
    }

    #[test]
    fn test_document_missing_distances_defaults_empty() {
        let json = r#"{"parts": {}}"#;
        let doc: CadDocument = serde_json::from_str(json).unwrap();
        assert!(doc.distances.is_empty());
    }

    #[test]
    fn test_part_order_preserved_through_serde() {
        let mut doc = CadDocument::default();
        doc.parts.insert("part_2", Part::default());
        doc.parts.insert("part_1", Part::default());
        let json = serde_json::to_string(&doc).unwrap();
        let back: CadDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back.part_ids(), vec!["part_2", "part_1"]);
    }

    #[test]
    fn test_segment_chain_endpoints() {
        let seg = line([0.0, 0.0], [1.0, 2.0]);
        assert_eq!(seg.chain_start(), Some([0.0, 0.0]));
        assert_eq!(seg.chain_end(), Some([1.0, 2.0]));

        let circle = Segment::Circle {
            center: [0.0, 0.0],
            radius: 1.0,
        };
        assert_eq!(circle.chain_start(), None);
        assert_eq!(circle.chain_end(), None);
    }
}
