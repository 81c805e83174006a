use std::fs;
use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use log::{debug, info};
use nalgebra::Point2;

use crate::config::setup::SetupConfig;
use crate::error::{Result, SetupError};
use crate::state::Snapshot;

/// Consumer of per-frame snapshots. Called between steps only.
pub trait SnapshotSink {
    fn write(&mut self, frame: usize, snapshot: &Snapshot) -> Result<()>;
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq)]
struct PositionRow {
    x: f64,
    y: f64,
}

/// Writes one `frame_NNN.csv` per frame, with an `x,y` header and a row per particle.
pub struct CsvSnapshotWriter {
    dir: PathBuf,
}

impl CsvSnapshotWriter {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        fs::create_dir_all(dir.as_ref())?;
        info!("Writing snapshots to {}", dir.as_ref().display());
        Ok(CsvSnapshotWriter {
            dir: dir.as_ref().to_path_buf(),
        })
    }

    pub fn frame_path(&self, frame: usize) -> PathBuf {
        self.dir.join(format!("frame_{frame:03}.csv"))
    }
}

impl SnapshotSink for CsvSnapshotWriter {
    fn write(&mut self, frame: usize, snapshot: &Snapshot) -> Result<()> {
        let path = self.frame_path(frame);
        let mut wtr = csv::Writer::from_path(&path)?;
        for r in snapshot.positions.iter() {
            wtr.serialize(PositionRow { x: r.x, y: r.y })?;
        }
        wtr.flush()?;
        debug!(
            "FRAME {} step={} t={} n={} -> {}",
            frame,
            snapshot.step,
            snapshot.t,
            snapshot.len(),
            path.display()
        );
        Ok(())
    }
}

const PNG_SIZE_PX: u32 = 600;
const MARKER_RADIUS_PX: f64 = 3.0;
const MARKER_ALPHA: f64 = 0.7;
const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const MARKER_FILL: Rgb<u8> = Rgb([30, 144, 255]);
const MARKER_EDGE: Rgb<u8> = Rgb([0, 0, 0]);

/// Renders one `frame_NNN.png` per frame: translucent blue discs with a dark
/// rim on a white square spanning [0, l]^2, y up.
pub struct PngSnapshotWriter {
    dir: PathBuf,
    l: f64,
    size_px: u32,
}

impl PngSnapshotWriter {
    pub fn new<P: AsRef<Path>>(dir: P, l: f64) -> Result<Self> {
        if !(l > 0.0 && l.is_finite()) {
            return Err(SetupError::invalid_config(format!(
                "system length must be positive, got {l}"
            )));
        }
        fs::create_dir_all(dir.as_ref())?;
        info!("Writing frame images to {}", dir.as_ref().display());
        Ok(PngSnapshotWriter {
            dir: dir.as_ref().to_path_buf(),
            l,
            size_px: PNG_SIZE_PX,
        })
    }

    pub fn with_size(self, size_px: u32) -> Self {
        PngSnapshotWriter {
            size_px: size_px.max(1),
            ..self
        }
    }

    pub fn frame_path(&self, frame: usize) -> PathBuf {
        self.dir.join(format!("frame_{frame:03}.png"))
    }

    pub fn render(&self, positions: &[Point2<f64>]) -> RgbImage {
        let size = self.size_px;
        let mut img = RgbImage::from_pixel(size, size, BACKGROUND);
        let scale = size as f64 / self.l;
        for r in positions {
            let cx = r.x * scale;
            let cy = (self.l - r.y) * scale;
            let x_lo = (cx - MARKER_RADIUS_PX).floor().max(0.0) as u32;
            let y_lo = (cy - MARKER_RADIUS_PX).floor().max(0.0) as u32;
            let x_hi = ((cx + MARKER_RADIUS_PX).ceil().max(0.0) as u32).min(size);
            let y_hi = ((cy + MARKER_RADIUS_PX).ceil().max(0.0) as u32).min(size);
            for py in y_lo..y_hi {
                for px in x_lo..x_hi {
                    let d = (px as f64 + 0.5 - cx).hypot(py as f64 + 0.5 - cy);
                    if d > MARKER_RADIUS_PX {
                        continue;
                    }
                    let colour = if d > MARKER_RADIUS_PX - 1.0 {
                        MARKER_EDGE
                    } else {
                        MARKER_FILL
                    };
                    let pixel = img.get_pixel_mut(px, py);
                    *pixel = blend(*pixel, colour, MARKER_ALPHA);
                }
            }
        }
        img
    }
}

fn blend(under: Rgb<u8>, over: Rgb<u8>, alpha: f64) -> Rgb<u8> {
    let mix = |u: u8, o: u8| (alpha * o as f64 + (1.0 - alpha) * u as f64).round() as u8;
    Rgb([
        mix(under[0], over[0]),
        mix(under[1], over[1]),
        mix(under[2], over[2]),
    ])
}

impl SnapshotSink for PngSnapshotWriter {
    fn write(&mut self, frame: usize, snapshot: &Snapshot) -> Result<()> {
        let path = self.frame_path(frame);
        self.render(&snapshot.positions).save(&path)?;
        debug!("FRAME {} -> {}", frame, path.display());
        Ok(())
    }
}

/// Hands every snapshot to each sink in turn.
#[derive(Default)]
pub struct MultiSink {
    pub sinks: Vec<Box<dyn SnapshotSink>>,
}

impl SnapshotSink for MultiSink {
    fn write(&mut self, frame: usize, snapshot: &Snapshot) -> Result<()> {
        for sink in self.sinks.iter_mut() {
            sink.write(frame, snapshot)?;
        }
        Ok(())
    }
}

/// Keeps every snapshot in memory, in emission order.
#[derive(Default)]
pub struct MemorySink {
    pub frames: Vec<(usize, Snapshot)>,
}

impl SnapshotSink for MemorySink {
    fn write(&mut self, frame: usize, snapshot: &Snapshot) -> Result<()> {
        self.frames.push((frame, snapshot.clone()));
        Ok(())
    }
}

pub fn read_snapshot_positions<P: AsRef<Path>>(path: P) -> Result<Vec<Point2<f64>>> {
    let mut rdr = csv::Reader::from_path(path)?;
    let mut positions = Vec::new();
    for row in rdr.deserialize() {
        let PositionRow { x, y } = row?;
        positions.push(Point2::new(x, y));
    }
    Ok(positions)
}

// Parameters of the run, next to its frames. It parses back as a setup config.
pub fn write_run_metadata<P: AsRef<Path>>(dir: P, setup_config: &SetupConfig) -> Result<PathBuf> {
    fs::create_dir_all(dir.as_ref())?;
    let path = dir.as_ref().join("run.json");
    let file = fs::File::create(&path)?;
    serde_json::to_writer_pretty(file, setup_config)?;
    Ok(path)
}
