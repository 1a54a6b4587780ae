//! In-memory shapefile and DBF fixtures for tests.

const SHAPE_POINT: i32 = 1;
const SHAPE_POLYLINE: i32 = 3;
const SHAPE_POLYGON: i32 = 5;

fn shp_file(shape_type: i32, records: &[Vec<u8>], bbox: [f64; 4]) -> Vec<u8> {
    let body_len: usize = records.iter().map(|r| 8 + r.len()).sum();
    let file_words = ((100 + body_len) / 2) as i32;

    let mut out = Vec::with_capacity(100 + body_len);
    out.extend_from_slice(&9994i32.to_be_bytes());
    out.extend_from_slice(&[0u8; 20]);
    out.extend_from_slice(&file_words.to_be_bytes());
    out.extend_from_slice(&1000i32.to_le_bytes());
    out.extend_from_slice(&shape_type.to_le_bytes());
    for v in bbox {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out.extend_from_slice(&[0u8; 32]);

    for (i, content) in records.iter().enumerate() {
        out.extend_from_slice(&((i + 1) as i32).to_be_bytes());
        out.extend_from_slice(&((content.len() / 2) as i32).to_be_bytes());
        out.extend_from_slice(content);
    }
    out
}

fn bbox_of(points: impl Iterator<Item = (f64, f64)>) -> [f64; 4] {
    points.fold(
        [f64::MAX, f64::MAX, f64::MIN, f64::MIN],
        |[x0, y0, x1, y1], (x, y)| [x0.min(x), y0.min(y), x1.max(x), y1.max(y)],
    )
}

fn header_bbox(points: impl Iterator<Item = (f64, f64)>) -> [f64; 4] {
    let bbox = bbox_of(points);
    if bbox[0] > bbox[2] {
        [0.0; 4]
    } else {
        bbox
    }
}

/// A `.shp` file with one point record per coordinate.
pub fn point_shp(points: &[(f64, f64)]) -> Vec<u8> {
    let records: Vec<Vec<u8>> = points
        .iter()
        .map(|(x, y)| {
            let mut content = Vec::with_capacity(20);
            content.extend_from_slice(&SHAPE_POINT.to_le_bytes());
            content.extend_from_slice(&x.to_le_bytes());
            content.extend_from_slice(&y.to_le_bytes());
            content
        })
        .collect();
    shp_file(
        SHAPE_POINT,
        &records,
        header_bbox(points.iter().copied()),
    )
}

fn multipart_content(shape_type: i32, parts: &[Vec<(f64, f64)>]) -> Vec<u8> {
    let bbox = bbox_of(parts.iter().flatten().copied());
    let num_points: usize = parts.iter().map(Vec::len).sum();

    let mut content = Vec::new();
    content.extend_from_slice(&shape_type.to_le_bytes());
    for v in bbox {
        content.extend_from_slice(&v.to_le_bytes());
    }
    content.extend_from_slice(&(parts.len() as i32).to_le_bytes());
    content.extend_from_slice(&(num_points as i32).to_le_bytes());
    let mut start = 0i32;
    for part in parts {
        content.extend_from_slice(&start.to_le_bytes());
        start += part.len() as i32;
    }
    for (x, y) in parts.iter().flatten() {
        content.extend_from_slice(&x.to_le_bytes());
        content.extend_from_slice(&y.to_le_bytes());
    }
    content
}

/// A `.shp` file of polylines; each record is a list of parts.
pub fn polyline_shp(records: &[Vec<Vec<(f64, f64)>>]) -> Vec<u8> {
    let contents: Vec<Vec<u8>> = records
        .iter()
        .map(|parts| multipart_content(SHAPE_POLYLINE, parts))
        .collect();
    shp_file(
        SHAPE_POLYLINE,
        &contents,
        header_bbox(records.iter().flatten().flatten().copied()),
    )
}

/// A `.shp` file of polygons; each record is a list of rings.
///
/// Outer rings must be clockwise and holes counter-clockwise.
pub fn polygon_shp(records: &[Vec<Vec<(f64, f64)>>]) -> Vec<u8> {
    let contents: Vec<Vec<u8>> = records
        .iter()
        .map(|rings| multipart_content(SHAPE_POLYGON, rings))
        .collect();
    shp_file(
        SHAPE_POLYGON,
        &contents,
        header_bbox(records.iter().flatten().flatten().copied()),
    )
}

/// A dBase III/IV table. Fields are `(name, type, length)`.
pub fn dbf_file(fields: &[(&str, u8, u8)], records: &[Vec<&str>]) -> Vec<u8> {
    let header_len = 32 + 32 * fields.len() + 1;
    let record_len = 1 + fields.iter().map(|f| f.2 as usize).sum::<usize>();

    let mut out = Vec::new();
    out.push(0x03);
    out.extend_from_slice(&[124, 1, 1]);
    out.extend_from_slice(&(records.len() as u32).to_le_bytes());
    out.extend_from_slice(&(header_len as u16).to_le_bytes());
    out.extend_from_slice(&(record_len as u16).to_le_bytes());
    out.extend_from_slice(&[0u8; 20]);

    for (name, field_type, length) in fields {
        let mut name_bytes = [0u8; 11];
        name_bytes[..name.len()].copy_from_slice(name.as_bytes());
        out.extend_from_slice(&name_bytes);
        out.push(*field_type);
        out.extend_from_slice(&[0u8; 4]);
        out.push(*length);
        out.push(0);
        out.extend_from_slice(&[0u8; 14]);
    }
    out.push(0x0D);

    for record in records {
        out.push(b' ');
        for ((_, field_type, length), value) in fields.iter().zip(record) {
            let length = *length as usize;
            let cell = if *field_type == b'N' {
                format!("{:>length$}", value)
            } else {
                format!("{:<length$}", value)
            };
            out.extend_from_slice(&cell.as_bytes()[..length]);
        }
    }
    out.push(0x1A);
    out
}
