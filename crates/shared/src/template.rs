//! Built-in default document.

use crate::{
    CadDocument, CoordinateSystem, Extrusion, ExtrudeOperation, Face, Loop, OrderedMap, Part,
    Segment,
};

fn line(start: [f64; 2], end: [f64; 2]) -> Segment {
    Segment::Line { start, end }
}

impl CadDocument {
    /// The fixed single-part template used as the application's initial
    /// and fallback state: a 0.75 × 0.5 rectangle with a notch cut out
    /// of its top-right corner, extruded as a new body.
    pub fn template() -> CadDocument {
        let mut lp = Loop::new();
        lp.insert("line_1", line([0.0, 0.0], [0.75, 0.0]));
        lp.insert("line_2", line([0.75, 0.0], [0.75, 0.35]));
        lp.insert("line_3", line([0.75, 0.35], [0.55, 0.35]));
        lp.insert("line_4", line([0.55, 0.35], [0.55, 0.5]));
        lp.insert("line_5", line([0.55, 0.5], [0.0, 0.5]));
        lp.insert("line_6", line([0.0, 0.5], [0.0, 0.0]));

        let mut face = Face::new();
        face.insert("loop_1", lp);

        let mut sketch = OrderedMap::new();
        sketch.insert("face_1", face);

        let part = Part {
            coordinate_system: CoordinateSystem::default(),
            sketch,
            extrusion: Extrusion {
                extrude_depth_towards_normal: 0.25,
                extrude_depth_opposite_normal: 0.0,
                sketch_scale: 0.75,
                operation: ExtrudeOperation::NewBody,
            },
        };

        let mut doc = CadDocument::default();
        doc.parts.insert("part_1", part);
        doc
    }
}
