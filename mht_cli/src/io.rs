//! CSV ingestion and emission.
//!
//! Input rows are `frame,u,v` (2D) or `frame,u,v,w` (3D), grouped by
//! ascending frame number; a change in the frame column starts the next
//! frame's detection list. Output rows are `frame,track,u,v[,w]` with the
//! literal `None` in every coordinate column of a missed slot, sorted by
//! frame with track order preserved.

use std::path::Path;

use mht_core::{Track, Vector};
use nalgebra::DVector;
use tracing::info;

use crate::error::CliError;

/// Check the three command-line paths before anything is read: the input and
/// parameter files must exist, and the extensions must be `.csv`, `.csv`,
/// `.txt` respectively.
pub fn validate_args(input: &Path, output: &Path, params: &Path) -> Result<(), CliError> {
    if !input.is_file() {
        return Err(CliError::InvalidArgument(format!(
            "Input file does not exist: {}",
            input.display()
        )));
    }
    if !params.is_file() {
        return Err(CliError::InvalidArgument(format!(
            "Parameter file does not exist: {}",
            params.display()
        )));
    }
    expect_extension(input, "csv", "Input")?;
    expect_extension(output, "csv", "Output")?;
    expect_extension(params, "txt", "Parameter")?;
    Ok(())
}

fn expect_extension(path: &Path, extension: &str, label: &str) -> Result<(), CliError> {
    if path.extension().and_then(|e| e.to_str()) != Some(extension) {
        return Err(CliError::InvalidArgument(format!(
            "{} file is not {}: {}",
            label,
            extension.to_uppercase(),
            path.display()
        )));
    }
    Ok(())
}

/// Read per-frame detection lists from a CSV file. `max_frames` caps the
/// number of frames ingested.
pub fn read_detections_csv(
    path: &Path,
    max_frames: Option<usize>,
) -> Result<Vec<Vec<Vector>>, CliError> {
    info!("Reading input CSV...");
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;

    let dims = reader.headers()?.len().saturating_sub(1);
    if !(2..=3).contains(&dims) {
        return Err(CliError::InvalidArgument(format!(
            "input CSV must have 2 or 3 coordinate columns, found {dims}"
        )));
    }

    let mut frames: Vec<Vec<Vector>> = Vec::new();
    let mut current_frame = None;
    let mut rows = 0usize;
    for result in reader.records() {
        let record = result?;
        if record.len() != dims + 1 {
            return Err(CliError::InvalidArgument(format!(
                "input CSV row {} has {} columns, expected {}",
                rows + 1,
                record.len(),
                dims + 1
            )));
        }
        let frame = parse_field::<u64>(&record[0], "frame")?;
        if current_frame != Some(frame) {
            if max_frames.is_some_and(|cap| frames.len() == cap) {
                break;
            }
            frames.push(Vec::new());
            current_frame = Some(frame);
        }
        let mut coords = Vec::with_capacity(dims);
        for field in record.iter().skip(1) {
            coords.push(parse_field::<f64>(field, "coordinate")?);
        }
        if let Some(detections) = frames.last_mut() {
            detections.push(DVector::from_vec(coords));
        }
        rows += 1;
    }

    info!("Reading inputs complete. Processed {rows} rows.");
    Ok(frames)
}

fn parse_field<T: std::str::FromStr>(field: &str, label: &str) -> Result<T, CliError> {
    field.trim().parse().map_err(|_| {
        CliError::InvalidArgument(format!("invalid {label} value in CSV: {field:?}"))
    })
}

/// Write the solution tracks to a CSV file. `dims` selects the 2D or 3D
/// header; missed slots emit `None` in every coordinate column.
pub fn write_tracks_csv(path: &Path, tracks: &[Track], dims: usize) -> Result<(), CliError> {
    info!("Writing output CSV...");
    let mut rows = Vec::new();
    for (track_index, track) in tracks.iter().enumerate() {
        for (frame_index, slot) in track.iter().enumerate() {
            let coords: Vec<String> = match slot {
                Some(point) => point.iter().map(|c| c.to_string()).collect(),
                None => vec!["None".to_string(); dims],
            };
            rows.push((frame_index, track_index, coords));
        }
    }
    // Stable sort: within a frame, tracks stay in ascending order.
    rows.sort_by_key(|&(frame, _, _)| frame);

    let mut writer = csv::Writer::from_path(path)?;
    let mut header = vec!["frame", "track", "u", "v"];
    if dims == 3 {
        header.push("w");
    }
    writer.write_record(&header)?;
    for (frame, track, coords) in rows {
        let mut record = vec![frame.to_string(), track.to_string()];
        record.extend(coords);
        writer.write_record(&record)?;
    }
    writer.flush()?;
    info!("CSV saved to {}", path.display());
    Ok(())
}

/// Read an output CSV back into per-track coordinate sequences. Inverse of
/// [`write_tracks_csv`] for well-formed files.
pub fn read_tracks_csv(path: &Path) -> Result<(Vec<Track>, usize), CliError> {
    let mut reader = csv::Reader::from_path(path)?;
    let dims = reader.headers()?.len().saturating_sub(2);
    if !(2..=3).contains(&dims) {
        return Err(CliError::InvalidArgument(format!(
            "output CSV must have 2 or 3 coordinate columns, found {dims}"
        )));
    }

    let mut slots: Vec<(usize, usize, Option<Vector>)> = Vec::new();
    let mut frame_count = 0usize;
    let mut track_count = 0usize;
    for result in reader.records() {
        let record = result?;
        let frame = parse_field::<usize>(&record[0], "frame")?;
        let track = parse_field::<usize>(&record[1], "track")?;
        let coordinate = if record.iter().skip(2).any(|field| field.trim() == "None") {
            None
        } else {
            let mut coords = Vec::with_capacity(dims);
            for field in record.iter().skip(2) {
                coords.push(parse_field::<f64>(field, "coordinate")?);
            }
            Some(DVector::from_vec(coords))
        };
        frame_count = frame_count.max(frame + 1);
        track_count = track_count.max(track + 1);
        slots.push((frame, track, coordinate));
    }

    let mut tracks = vec![vec![None; frame_count]; track_count];
    for (frame, track, coordinate) in slots {
        tracks[track][frame] = coordinate;
    }
    Ok((tracks, dims))
}
