//! Binary FBX decoder.
//!
//! Walks the FBX 7.x node tree and pulls `Vertices` / `PolygonVertexIndex`
//! out of every geometry. Only raw-encoded (encoding 0) property arrays
//! are supported; zlib-compressed arrays are reported as malformed input
//! rather than mis-parsed.

use super::{IngestError, MeshDecoder, RawGeometry};

pub struct FbxDecoder;

const MAGIC: &[u8] = b"Kaydara FBX Binary  \x00";

fn malformed(reason: impl Into<String>) -> IngestError {
    IngestError::Malformed {
        format: "FBX",
        reason: reason.into(),
    }
}

impl MeshDecoder for FbxDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<RawGeometry, IngestError> {
        if bytes.len() < 27 || &bytes[..MAGIC.len()] != MAGIC {
            return Err(malformed("missing binary FBX magic"));
        }
        let version = u32::from_le_bytes([bytes[23], bytes[24], bytes[25], bytes[26]]);
        // 7500+ widened the node-record header fields to 64 bits.
        let wide = version >= 7500;

        let mut cursor = Cursor {
            bytes,
            pos: 27,
            wide,
        };

        let mut collector = Collector::default();
        while cursor.pos < bytes.len() {
            match parse_node(&mut cursor, &mut collector)? {
                NodeOutcome::Node => {}
                NodeOutcome::Sentinel => break,
            }
        }

        let mut positions: Vec<f32> = Vec::new();
        let mut indices: Vec<u32> = Vec::new();
        let geom_count = collector.vertices.len().min(collector.polygons.len());
        for g in 0..geom_count {
            let verts = &collector.vertices[g];
            let polys = &collector.polygons[g];
            let base = (positions.len() / 3) as u32;

            if verts.len() % 3 != 0 {
                return Err(malformed("vertex array length is not a multiple of 3"));
            }
            positions.extend(verts.iter().map(|&v| v as f32));
            let vertex_count = (verts.len() / 3) as i64;

            // Polygons are index runs; a negative value (~idx) marks the
            // final corner. Fan-triangulate each run.
            let mut poly: Vec<u32> = Vec::new();
            for &raw_idx in polys {
                let (idx, last) = if raw_idx < 0 {
                    (!raw_idx as i64, true)
                } else {
                    (raw_idx as i64, false)
                };
                if idx < 0 || idx >= vertex_count {
                    return Err(malformed(format!("polygon index {idx} out of range")));
                }
                poly.push(base + idx as u32);
                if last {
                    if poly.len() >= 3 {
                        for k in 1..poly.len() - 1 {
                            indices.extend_from_slice(&[poly[0], poly[k], poly[k + 1]]);
                        }
                    }
                    poly.clear();
                }
            }
        }

        Ok(RawGeometry {
            positions,
            normals: None,
            indices: Some(indices),
        })
    }
}

#[derive(Default)]
struct Collector {
    vertices: Vec<Vec<f64>>,
    polygons: Vec<Vec<i32>>,
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
    wide: bool,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], IngestError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&e| e <= self.bytes.len())
            .ok_or_else(|| malformed("unexpected end of file"))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, IngestError> {
        Ok(self.take(1)?[0])
    }

    fn u32(&mut self) -> Result<u32, IngestError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn u64(&mut self) -> Result<u64, IngestError> {
        let b = self.take(8)?;
        Ok(u64::from_le_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    /// Node-record length field: u32 pre-7500, u64 after
    fn offset(&mut self) -> Result<u64, IngestError> {
        if self.wide {
            self.u64()
        } else {
            Ok(self.u32()? as u64)
        }
    }

    fn sentinel_len(&self) -> usize {
        if self.wide {
            25
        } else {
            13
        }
    }
}

enum NodeOutcome {
    Node,
    Sentinel,
}

fn parse_node(cursor: &mut Cursor, collector: &mut Collector) -> Result<NodeOutcome, IngestError> {
    let end_offset = cursor.offset()?;
    let num_props = cursor.offset()?;
    let prop_list_len = cursor.offset()?;
    let name_len = cursor.u8()? as usize;
    let name = cursor.take(name_len)?;

    if end_offset == 0 {
        // Null record terminating a child list.
        return Ok(NodeOutcome::Sentinel);
    }
    let end_offset = end_offset as usize;
    if end_offset > cursor.bytes.len() {
        return Err(malformed("node end offset past end of file"));
    }

    match name {
        b"Vertices" => {
            let values = read_f64_array(cursor, num_props)?;
            collector.vertices.push(values);
        }
        b"PolygonVertexIndex" => {
            let values = read_i32_array(cursor, num_props)?;
            collector.polygons.push(values);
        }
        _ => {
            // Skip the property block wholesale; only children matter.
            cursor.take(prop_list_len as usize)?;
        }
    }

    // Remaining bytes up to end_offset are nested nodes (plus sentinel).
    while cursor.pos + cursor.sentinel_len() <= end_offset {
        if let NodeOutcome::Sentinel = parse_node(cursor, collector)? {
            break;
        }
    }
    if cursor.pos < end_offset {
        cursor.take(end_offset - cursor.pos)?;
    }
    Ok(NodeOutcome::Node)
}

/// Array property header: length, encoding, byte length of the payload
fn array_header(cursor: &mut Cursor) -> Result<(usize, u32, usize), IngestError> {
    let len = cursor.u32()? as usize;
    let encoding = cursor.u32()?;
    let byte_len = cursor.u32()? as usize;
    Ok((len, encoding, byte_len))
}

fn read_f64_array(cursor: &mut Cursor, num_props: u64) -> Result<Vec<f64>, IngestError> {
    if num_props == 0 {
        return Err(malformed("vertex node without property"));
    }
    let code = cursor.u8()?;
    if code != b'd' {
        return Err(malformed(format!(
            "expected f64 array property, got '{}'",
            code as char
        )));
    }
    let (len, encoding, byte_len) = array_header(cursor)?;
    if encoding != 0 {
        return Err(malformed("compressed property arrays are not supported"));
    }
    if byte_len != len * 8 {
        return Err(malformed("f64 array length mismatch"));
    }
    let data = cursor.take(byte_len)?;
    Ok(data
        .chunks_exact(8)
        .map(|b| f64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]))
        .collect())
}

fn read_i32_array(cursor: &mut Cursor, num_props: u64) -> Result<Vec<i32>, IngestError> {
    if num_props == 0 {
        return Err(malformed("index node without property"));
    }
    let code = cursor.u8()?;
    if code != b'i' {
        return Err(malformed(format!(
            "expected i32 array property, got '{}'",
            code as char
        )));
    }
    let (len, encoding, byte_len) = array_header(cursor)?;
    if encoding != 0 {
        return Err(malformed("compressed property arrays are not supported"));
    }
    if byte_len != len * 4 {
        return Err(malformed("i32 array length mismatch"));
    }
    let data = cursor.take(byte_len)?;
    Ok(data
        .chunks_exact(4)
        .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}
