//! Flow-accumulation raster source and polygon clipping.
//!
//! Clipping mirrors a masked crop: the output window is the polygon's bounding
//! box snapped outward to the pixel grid, and pixels are kept by the scanline
//! rule of a centre-sampled rasterizer. A centre lying exactly on the polygon
//! boundary is kept on the north and east sides and dropped on the south and
//! west sides.
use serde::{Deserialize, Serialize};

use crate::error::{ClipError, RasterError};
use crate::geometry::{Bounds, CellPolygon};
use crate::grid::ClippedGrid;

/// Slack (in pixels) when snapping polygon bounds to the pixel grid, so that
/// edges which coincide with pixel edges are not pushed out by rounding noise.
const SNAP_EPS: f64 = 1e-9;

/// North-up affine transform. Row 0 is the northern edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    /// X of the top-left corner.
    pub origin_x: f64,
    /// Y of the top-left corner.
    pub origin_y: f64,
    /// Pixel width, > 0.
    pub pixel_width: f64,
    /// Pixel height, < 0 for north-up rasters.
    pub pixel_height: f64,
}

impl GeoTransform {
    /// Square pixels of side `pixel_size` anchored at the top-left corner.
    pub fn north_up(origin_x: f64, origin_y: f64, pixel_size: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            pixel_width: pixel_size,
            pixel_height: -pixel_size,
        }
    }

    fn validate(&self) -> Result<(), RasterError> {
        if !(self.origin_x.is_finite() && self.origin_y.is_finite()) {
            return Err(RasterError::Transform("origin must be finite"));
        }
        if !(self.pixel_width.is_finite() && self.pixel_width > 0.0) {
            return Err(RasterError::Transform("pixel width must be finite and positive"));
        }
        if !(self.pixel_height.is_finite() && self.pixel_height < 0.0) {
            return Err(RasterError::Transform("pixel height must be finite and negative"));
        }
        Ok(())
    }

    /// World coordinates of the centre of pixel (`row`, `col`).
    #[inline]
    pub fn pixel_center(&self, row: usize, col: usize) -> (f64, f64) {
        (
            self.origin_x + (col as f64 + 0.5) * self.pixel_width,
            self.origin_y + (row as f64 + 0.5) * self.pixel_height,
        )
    }

    /// Fractional (row, col) of a world coordinate.
    #[inline]
    pub fn to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (y - self.origin_y) / self.pixel_height,
            (x - self.origin_x) / self.pixel_width,
        )
    }
}

/// Pixel-space window into a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelWindow {
    pub row_off: usize,
    pub col_off: usize,
    pub rows: usize,
    pub cols: usize,
}

/// Anything a cell polygon can be clipped against.
pub trait RasterSource: Sync {
    fn clip(&self, polygon: &CellPolygon) -> Result<ClippedGrid, ClipError>;
}

/// In-memory flow-accumulation raster, row-major, row 0 = north.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFlowRaster")]
pub struct FlowRaster {
    data: Vec<f32>,
    pub width: usize,
    pub height: usize,
    pub transform: GeoTransform,
    /// Sentinel for missing values; such pixels are always masked.
    pub nodata: Option<f32>,
}

#[derive(Deserialize)]
struct RawFlowRaster {
    data: Vec<f32>,
    width: usize,
    height: usize,
    transform: GeoTransform,
    #[serde(default)]
    nodata: Option<f32>,
}

impl TryFrom<RawFlowRaster> for FlowRaster {
    type Error = RasterError;

    fn try_from(raw: RawFlowRaster) -> Result<Self, Self::Error> {
        FlowRaster::new(raw.width, raw.height, raw.data, raw.transform, raw.nodata)
    }
}

impl FlowRaster {
    pub fn new(
        width: usize,
        height: usize,
        data: Vec<f32>,
        transform: GeoTransform,
        nodata: Option<f32>,
    ) -> Result<Self, RasterError> {
        if width == 0 || height == 0 {
            return Err(RasterError::ZeroSize { width, height });
        }
        if data.len() != width * height {
            return Err(RasterError::DataLength { width, height, actual: data.len() });
        }
        transform.validate()?;
        Ok(Self { data, width, height, transform, nodata })
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.width + col]
    }

    /// Whether the pixel carries a real accumulation value.
    #[inline]
    fn is_valid(&self, v: f32) -> bool {
        !v.is_nan() && self.nodata.map_or(true, |nd| v != nd)
    }

    /// Snap `bounds` outward to the pixel grid and intersect with the raster
    /// extent.
    pub fn window(&self, bounds: &Bounds) -> Result<PixelWindow, ClipError> {
        let t = &self.transform;
        let (top, left) = t.to_pixel(bounds.min_x, bounds.max_y);
        let (bottom, right) = t.to_pixel(bounds.max_x, bounds.min_y);

        let row_start = (top + SNAP_EPS).floor().max(0.0);
        let col_start = (left + SNAP_EPS).floor().max(0.0);
        let row_end = (bottom - SNAP_EPS).ceil().min(self.height as f64);
        let col_end = (right - SNAP_EPS).ceil().min(self.width as f64);

        tracing::trace!(top, left, bottom, right, "clip window in pixel space");

        if row_end <= row_start || col_end <= col_start {
            return Err(ClipError::NoOverlap);
        }
        let row_off = row_start as usize;
        let col_off = col_start as usize;
        Ok(PixelWindow {
            row_off,
            col_off,
            rows: row_end as usize - row_off,
            cols: col_end as usize - col_off,
        })
    }
}

impl RasterSource for FlowRaster {
    fn clip(&self, polygon: &CellPolygon) -> Result<ClippedGrid, ClipError> {
        let win = self.window(&polygon.bounds())?;
        let ring: Vec<(f64, f64)> = polygon
            .exterior()
            .coords()
            .map(|c| self.transform.to_pixel(c.x, c.y))
            .collect();

        let col_lo = win.col_off as i64;
        let col_hi = (win.col_off + win.cols) as i64;
        let mut cells = vec![None; win.rows * win.cols];
        for (i, r) in (win.row_off..win.row_off + win.rows).enumerate() {
            for (start, end) in scanline_spans(&ring, r) {
                for c in start.max(col_lo)..end.min(col_hi) {
                    let c = c as usize;
                    let v = self.get(r, c);
                    if self.is_valid(v) {
                        cells[i * win.cols + (c - win.col_off)] = Some(v);
                    }
                }
            }
        }

        let valid = cells.iter().filter(|v| v.is_some()).count();
        if valid == 0 {
            return Err(ClipError::EmptyMask { rows: win.rows, cols: win.cols });
        }
        ClippedGrid::new(win.cols, win.rows, cells)
    }
}

/// Column spans `[start, end)` filled on raster row `row`, given a closed
/// ring in fractional (row, col) pixel space.
///
/// An edge crosses the scanline through the row centre when the centre lies
/// in `[upper, lower)` of the edge's row extent; horizontal edges never
/// cross. Crossings pair up left to right, and a pair fills columns from
/// `floor(x0 + 0.5)` up to but excluding `floor(x1 + 0.5)`.
fn scanline_spans(ring: &[(f64, f64)], row: usize) -> Vec<(i64, i64)> {
    let y = row as f64 + 0.5;
    let mut xs: Vec<f64> = ring
        .windows(2)
        .filter_map(|seg| {
            let (a, b) = (seg[0], seg[1]);
            let ((ya, xa), (yb, xb)) = if a.0 < b.0 {
                (a, b)
            } else if a.0 > b.0 {
                (b, a)
            } else {
                return None;
            };
            (y >= ya && y < yb).then(|| xa + (y - ya) * (xb - xa) / (yb - ya))
        })
        .collect();
    xs.sort_by(|a, b| a.total_cmp(b));
    xs.chunks_exact(2)
        .map(|pair| ((pair[0] + 0.5).floor() as i64, (pair[1] + 0.5).floor() as i64))
        .filter(|(start, end)| start < end)
        .collect()
}
