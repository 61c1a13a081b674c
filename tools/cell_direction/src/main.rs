/// Batch driver: classify the flow-exit direction of every cell polygon in a
/// GeoJSON FeatureCollection against one flow-accumulation raster, and write
/// the collection back with `direction` / `direction_label` properties.
///
/// Raster input is either a serialised FlowRaster (`.json`) or a single-band
/// TIFF whose georeferencing is given on the command line.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use cellflow_core::{ClassifierConfig, Direction, FlowRaster, GeoTransform, GridCell};
use clap::Parser;
use geojson::{Feature, FeatureCollection, GeoJson, Value};
use serde::Serialize;
use serde_json::Value as JsonValue;
use tiff::decoder::{Decoder, DecodingResult};
use tracing::{debug, info, warn};

// ── CLI ──────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "cell_direction",
    about = "Assign Donnel-style pour-point flow directions to grid-cell polygons"
)]
struct Args {
    /// GeoJSON FeatureCollection of cell polygons
    #[arg(long)]
    cells: PathBuf,

    /// Flow-accumulation raster: FlowRaster JSON or single-band TIFF
    #[arg(long)]
    raster: PathBuf,

    /// Output GeoJSON path
    #[arg(short, long, default_value = "data/cell_directions.geojson")]
    output: PathBuf,

    /// Optional ClassifierConfig JSON; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Cell side length in georeferenced units
    #[arg(long)]
    cell_size: Option<f64>,

    /// Reproduce the reference tool's edge and quadrant index handling
    #[arg(long)]
    reference_compat: bool,

    /// TIFF only: X of the raster's top-left corner
    #[arg(long)]
    origin_x: Option<f64>,

    /// TIFF only: Y of the raster's top-left corner
    #[arg(long)]
    origin_y: Option<f64>,

    /// TIFF only: square pixel size
    #[arg(long)]
    pixel_size: Option<f64>,

    /// TIFF only: nodata sentinel
    #[arg(long)]
    nodata: Option<f32>,

    /// Log failing cells and write a null direction instead of aborting
    #[arg(long)]
    skip_errors: bool,

    /// Write a JSON run summary here
    #[arg(long)]
    summary: Option<PathBuf>,
}

// ── Run summary ──────────────────────────────────────────────────────────────

#[derive(Debug, Default, Serialize, PartialEq)]
struct Summary {
    classified: usize,
    failed: usize,
    /// Cell count per direction code 0..=8.
    by_code: [usize; 9],
}

// ── Inputs ───────────────────────────────────────────────────────────────────

fn load_config(args: &Args) -> Result<ClassifierConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Cannot read config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => ClassifierConfig::default(),
    };
    if let Some(cs) = args.cell_size {
        config.cell_size = cs;
    }
    if args.reference_compat {
        config.reference_compat = true;
    }
    config.validate()?;
    Ok(config)
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case("json"))
}

fn load_raster(args: &Args) -> Result<FlowRaster> {
    let path = &args.raster;
    if is_json(path) {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Cannot read raster {}", path.display()))?;
        return serde_json::from_str(&text)
            .with_context(|| format!("Invalid FlowRaster JSON {}", path.display()));
    }

    let (Some(ox), Some(oy), Some(px)) = (args.origin_x, args.origin_y, args.pixel_size) else {
        bail!("TIFF rasters need --origin-x, --origin-y and --pixel-size");
    };
    let file = fs::File::open(path).with_context(|| format!("Cannot open {}", path.display()))?;
    let (width, height, data) = decode_tiff(io::BufReader::new(file))
        .with_context(|| format!("Cannot decode TIFF {}", path.display()))?;
    let raster = FlowRaster::new(width, height, data, GeoTransform::north_up(ox, oy, px), args.nodata)?;
    Ok(raster)
}

/// Decode the first band of a TIFF into f32, row-major, row 0 = north.
fn decode_tiff<R: io::Read + io::Seek>(reader: R) -> Result<(usize, usize, Vec<f32>)> {
    let mut decoder = Decoder::new(reader)?;
    let (width, height) = decoder.dimensions()?;
    let data: Vec<f32> = match decoder.read_image()? {
        DecodingResult::F32(v) => v,
        DecodingResult::F64(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::U8(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::U16(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::U32(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::I16(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::I32(v) => v.into_iter().map(|x| x as f32).collect(),
        _ => bail!("unsupported TIFF sample type"),
    };
    let (width, height) = (width as usize, height as usize);
    if data.len() != width * height {
        bail!("expected a single-band {width}x{height} image, got {} samples", data.len());
    }
    Ok((width, height, data))
}

fn load_cells(path: &Path) -> Result<FeatureCollection> {
    let text = fs::read_to_string(path).with_context(|| format!("Cannot read cells {}", path.display()))?;
    parse_cells(&text).with_context(|| format!("Invalid cells GeoJSON {}", path.display()))
}

fn parse_cells(text: &str) -> Result<FeatureCollection> {
    match text.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(fc) => Ok(fc),
        _ => bail!("expected a FeatureCollection"),
    }
}

// ── Per-feature helpers ──────────────────────────────────────────────────────

/// Feature id, else its `id` property, else its index in the collection.
fn feature_id(feature: &Feature, index: usize) -> String {
    use geojson::feature::Id;
    match &feature.id {
        Some(Id::String(s)) => s.clone(),
        Some(Id::Number(n)) => n.to_string(),
        None => match feature.property("id") {
            Some(JsonValue::String(s)) => s.clone(),
            Some(v) if !v.is_null() => v.to_string(),
            _ => index.to_string(),
        },
    }
}

/// Exterior ring of a Polygon feature (or a single-part MultiPolygon).
fn exterior_ring(feature: &Feature) -> Result<Vec<(f64, f64)>> {
    let geometry = feature.geometry.as_ref().ok_or_else(|| anyhow!("feature has no geometry"))?;
    let rings = match &geometry.value {
        Value::Polygon(rings) => rings,
        Value::MultiPolygon(parts) if parts.len() == 1 => &parts[0],
        Value::MultiPolygon(parts) => bail!("multipolygon with {} parts", parts.len()),
        _ => bail!("geometry is not a polygon"),
    };
    let exterior = rings.first().ok_or_else(|| anyhow!("polygon has no rings"))?;
    exterior
        .iter()
        .map(|pos| match pos.as_slice() {
            [x, y, ..] => Ok((*x, *y)),
            _ => Err(anyhow!("position with fewer than two coordinates")),
        })
        .collect()
}

fn classify_feature(feature: &Feature, raster: &FlowRaster, config: &ClassifierConfig) -> Result<Direction> {
    let ring = exterior_ring(feature)?;
    let cell = GridCell::from_ring((), ring, raster, config)?;
    Ok(cell.direction())
}

/// Classify every feature in place. With `skip_errors`, failures get a null
/// direction and a `direction_error` message; otherwise the first aborts.
fn annotate(
    fc: &mut FeatureCollection,
    raster: &FlowRaster,
    config: &ClassifierConfig,
    skip_errors: bool,
) -> Result<Summary> {
    let mut summary = Summary::default();
    for (index, feature) in fc.features.iter_mut().enumerate() {
        let id = feature_id(feature, index);
        match classify_feature(feature, raster, config) {
            Ok(direction) => {
                debug!(cell = %id, code = direction.code(), "cell classified");
                feature.set_property("direction", direction.code());
                feature.set_property("direction_label", direction.label());
                summary.classified += 1;
                summary.by_code[direction.code() as usize] += 1;
            }
            Err(err) if skip_errors => {
                warn!(cell = %id, error = %err, "skipping cell");
                feature.set_property("direction", JsonValue::Null);
                feature.set_property("direction_label", JsonValue::Null);
                feature.set_property("direction_error", format!("{err:#}"));
                summary.failed += 1;
            }
            Err(err) => return Err(err.context(format!("cell {id}"))),
        }
    }
    Ok(summary)
}

// ── Main ─────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .compact()
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let raster = load_raster(&args)?;
    info!(
        width = raster.width,
        height = raster.height,
        cell_size = config.cell_size,
        "raster loaded from {}",
        args.raster.display()
    );

    let mut cells = load_cells(&args.cells)?;
    let summary = annotate(&mut cells, &raster, &config, args.skip_errors)?;
    info!(
        classified = summary.classified,
        failed = summary.failed,
        dirty = summary.by_code[0],
        "classification finished"
    );

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("Cannot create {}", parent.display()))?;
    }
    fs::write(&args.output, GeoJson::FeatureCollection(cells).to_string())
        .with_context(|| format!("Write failed: {}", args.output.display()))?;

    if let Some(path) = &args.summary {
        fs::write(path, serde_json::to_string_pretty(&summary)?)
            .with_context(|| format!("Write failed: {}", path.display()))?;
    }
    Ok(())
}
