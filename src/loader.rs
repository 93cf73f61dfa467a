use crate::dictionary::WordFrequencyTable;
use crate::error::{GlideError, GlideResult};
use crate::geometry::{KeyGeometry, KeyboardGeometry};
use crate::gesture::Point2D;
use serde::Deserialize;
use std::fs::{self, File};
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct LayoutFile {
    name: String,
    keys: Vec<KeyEntry>,
}

#[derive(Debug, Deserialize)]
struct KeyEntry {
    #[serde(default)]
    code: Option<u32>,
    #[serde(default)]
    label: Option<String>,
    center_x: f32,
    center_y: f32,
    width: f32,
    height: f32,
}

impl KeyEntry {
    fn resolve_code(&self, idx: usize) -> GlideResult<u32> {
        if let Some(code) = self.code {
            return Ok(code);
        }
        let label = self.label.as_deref().unwrap_or_default();
        let mut chars = label.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c as u32),
            _ => Err(GlideError::Validation(format!(
                "Key #{} needs a numeric 'code' or a one-character 'label' (got {:?})",
                idx, label
            ))),
        }
    }
}

/// Reads a layout JSON: `{ "name": "...", "keys": [{ "label": "q", "center_x": .., "center_y": .., "width": .., "height": .. }] }`.
pub fn load_layout<P: AsRef<Path>>(path: P) -> GlideResult<KeyboardGeometry> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let file: LayoutFile = serde_json::from_str(&content)?;

    let mut keys = Vec::with_capacity(file.keys.len());
    for (idx, entry) in file.keys.iter().enumerate() {
        let code = entry.resolve_code(idx)?;
        let dims = [entry.center_x, entry.center_y, entry.width, entry.height];
        if dims.iter().any(|v| !v.is_finite()) || entry.width <= 0.0 || entry.height <= 0.0 {
            return Err(GlideError::Validation(format!(
                "Key #{} in '{}' has invalid geometry",
                idx,
                path.display()
            )));
        }
        keys.push(KeyGeometry::new(
            code,
            entry.center_x,
            entry.center_y,
            entry.width,
            entry.height,
        ));
    }

    if keys.is_empty() {
        return Err(GlideError::Validation(format!(
            "Layout '{}' has no keys",
            path.display()
        )));
    }

    debug!("Loaded layout '{}' with {} keys", file.name, keys.len());
    Ok(KeyboardGeometry::new(file.name, keys))
}

/// Reads a `word,frequency` list. Tab separated when the extension is `.tsv` or `.txt`.
/// The table is named after the file stem. Unparseable rows are skipped.
pub fn load_words<P: AsRef<Path>>(path: P) -> GlideResult<WordFrequencyTable> {
    let path = path.as_ref();
    let delimiter = match path.extension().and_then(|e| e.to_str()) {
        Some("tsv") | Some("txt") => b'\t',
        _ => b',',
    };

    let file = File::open(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut words = Vec::new();
    let mut skipped = 0;
    for (row, result) in rdr.records().enumerate() {
        let rec = match result {
            Ok(rec) => rec,
            Err(e) => {
                warn!("[Row {}] {}", row + 1, e);
                skipped += 1;
                continue;
            }
        };
        if rec.len() < 2 {
            skipped += 1;
            continue;
        }
        match rec[1].trim().parse::<u64>() {
            Ok(freq) => words.push((rec[0].trim().to_string(), freq)),
            Err(_) => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!("Skipped {} invalid rows in '{}'", skipped, path.display());
    }

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("words")
        .to_string();
    let table = WordFrequencyTable::new(name, words);
    if table.is_empty() {
        return Err(GlideError::Validation(format!(
            "No words found in '{}'",
            path.display()
        )));
    }
    Ok(table)
}

/// Reads a recorded trace of `x,y[,t]` rows. Rows that are not numbers (headers) are ignored.
pub fn load_trace<P: AsRef<Path>>(path: P) -> GlideResult<Vec<Point2D>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut points = Vec::new();
    for result in rdr.records() {
        let rec = result?;
        if rec.len() < 2 {
            continue;
        }
        if let (Ok(x), Ok(y)) = (rec[0].parse::<f32>(), rec[1].parse::<f32>()) {
            points.push(Point2D::new(x, y));
        }
    }

    if points.is_empty() {
        return Err(GlideError::Validation(format!(
            "No points found in '{}'",
            path.display()
        )));
    }
    Ok(points)
}
