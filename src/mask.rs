//! Polygon rasterization for zone masks
//!
//! A pixel belongs to a shape when its centre falls inside one of the shape's
//! polygons, or, with [`MaskOptions::all_touched`], when its footprint
//! intersects the shape at all. Centres are tested one row at a time against
//! the polygon edges crossing that row. Crossings are half-open: a centre on a
//! west or south edge is inside, one on an east or north edge is outside, so a
//! centre on an edge shared by two adjacent polygons belongs to exactly one.
//!
//! Pixel positions are resolved through the raster's [`GeoTransform`] offset
//! by the raster's [`Window`], so a block of a larger array is masked in the
//! larger array's pixel grid.

use crate::errors::{GridZoneError, Result};
use crate::geotransform::GeoTransform;
use geo::{coord, BoundingRect, Geometry, Intersects, MultiPolygon, Rect};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Options controlling which pixels a shape selects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskOptions {
    /// Select every pixel touched by the shape instead of only those whose centre is inside
    pub all_touched: bool,
    /// Keep pixels outside the shape and blank those inside
    pub invert: bool,
}

/// Pixel offset of a raster within a larger pixel grid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Window {
    pub col_off: usize,
    pub row_off: usize,
}

/// Areal geometry usable as a zone mask
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneShape {
    polygons: MultiPolygon<f64>,
    bbox: Option<Rect<f64>>,
}

impl ZoneShape {
    /// Convert a GeoJSON geometry
    ///
    /// # Errors
    ///
    /// Returns an error if the geometry cannot be converted or is not areal.
    pub fn from_geojson(geometry: &geojson::Geometry) -> Result<Self> {
        let geometry = Geometry::<f64>::try_from(geometry.clone())?;
        Self::from_geometry(geometry)
    }

    /// Wrap an areal `geo` geometry
    ///
    /// # Errors
    ///
    /// Returns [`GridZoneError::InvalidGeometry`] for points, lines and
    /// collections containing them.
    pub fn from_geometry(geometry: Geometry<f64>) -> Result<Self> {
        let mut polygons = Vec::new();
        collect_polygons(geometry, &mut polygons)?;
        let polygons = MultiPolygon::new(polygons);
        let bbox = polygons.bounding_rect();
        Ok(Self { polygons, bbox })
    }

    #[must_use]
    pub fn polygons(&self) -> &MultiPolygon<f64> {
        &self.polygons
    }

    /// Spans `[x0, x1)` of the horizontal line at `y` that lie inside a polygon
    ///
    /// An edge crosses the line when exactly one of its ends has `y_end <= y`,
    /// so a line through a vertex or along a horizontal edge is counted once
    /// or not at all. Holes are crossed like any other ring.
    #[must_use]
    pub fn scanline_spans(&self, y: f64) -> Vec<(f64, f64)> {
        match self.bbox {
            Some(bbox) if y >= bbox.min().y && y <= bbox.max().y => {}
            _ => return Vec::new(),
        }

        let mut spans = Vec::new();
        for polygon in &self.polygons.0 {
            let mut crossings: Vec<f64> = std::iter::once(polygon.exterior())
                .chain(polygon.interiors())
                .flat_map(|ring| ring.lines())
                .filter(|line| (line.start.y <= y) != (line.end.y <= y))
                .map(|line| {
                    line.start.x + (y - line.start.y) * (line.end.x - line.start.x) / (line.end.y - line.start.y)
                })
                .collect();
            crossings.sort_by(f64::total_cmp);
            spans.extend(
                crossings
                    .chunks_exact(2)
                    .filter(|pair| pair[0] < pair[1])
                    .map(|pair| (pair[0], pair[1])),
            );
        }
        spans
    }

    /// Whether the footprint of pixel (col, row) intersects the shape
    fn touches(&self, transform: &GeoTransform, col: usize, row: usize) -> bool {
        let Some(bbox) = self.bbox else {
            return false;
        };
        let (min_x, min_y, max_x, max_y) = transform.pixel_bounds(col, row);
        if max_x < bbox.min().x || min_x > bbox.max().x || max_y < bbox.min().y || min_y > bbox.max().y {
            return false;
        }
        let cell = Rect::new(coord! { x: min_x, y: min_y }, coord! { x: max_x, y: max_y });
        self.polygons.0.iter().any(|polygon| polygon.intersects(&cell))
    }
}

fn collect_polygons(geometry: Geometry<f64>, out: &mut Vec<geo::Polygon<f64>>) -> Result<()> {
    match geometry {
        Geometry::Polygon(polygon) => out.push(polygon),
        Geometry::MultiPolygon(multi) => out.extend(multi.0),
        Geometry::Rect(rect) => out.push(rect.to_polygon()),
        Geometry::Triangle(triangle) => out.push(triangle.to_polygon()),
        Geometry::GeometryCollection(collection) => {
            for member in collection.0 {
                collect_polygons(member, out)?;
            }
        }
        other => {
            return Err(GridZoneError::InvalidGeometry(format!(
                "expected a polygonal geometry, got {}",
                geometry_kind(&other)
            )))
        }
    }
    Ok(())
}

fn geometry_kind(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
        #[allow(unreachable_patterns)]
        _ => "unsupported geometry",
    }
}

/// Boolean keep-mask of shape `(height, width)` for the union of `shapes`
///
/// `true` marks pixels that keep their value. Without `invert` those are the
/// pixels selected by any shape; with `invert` the complement.
#[must_use]
pub fn geometry_mask(
    shapes: &[ZoneShape],
    transform: &GeoTransform,
    window: Window,
    height: usize,
    width: usize,
    options: MaskOptions,
) -> Array2<bool> {
    let mut mask = Array2::from_elem((height, width), options.invert);

    for (row, mut line) in mask.rows_mut().into_iter().enumerate() {
        let grow = window.row_off + row;

        if options.all_touched {
            for (col, keep) in line.iter_mut().enumerate() {
                if shapes.iter().any(|shape| shape.touches(transform, window.col_off + col, grow)) {
                    *keep = !options.invert;
                }
            }
            continue;
        }

        let (_, y) = transform.pixel_center(window.col_off, grow);
        let spans: Vec<(f64, f64)> = shapes.iter().flat_map(|shape| shape.scanline_spans(y)).collect();
        if spans.is_empty() {
            continue;
        }
        for (col, keep) in line.iter_mut().enumerate() {
            let (x, _) = transform.pixel_center(window.col_off + col, grow);
            if spans.iter().any(|&(x0, x1)| x0 <= x && x < x1) {
                *keep = !options.invert;
            }
        }
    }

    mask
}
