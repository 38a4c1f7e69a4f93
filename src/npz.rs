//! Reader for the `.npz` port of the BCI IV 2a recordings (`A01T.npz` …).
//!
//! Same keys as the safetensors layout in [`crate::io`]: `s` is `[T, C]`
//! float, `etyp` / `epos` / `edur` are `[N, 1]` columns, `artifacts` is
//! optional.  The archive carries no sampling rate, so 250 Hz is assumed.
//!
//! Array dtypes differ between exports of the dataset; every integer and
//! float element type numpy writes is accepted and widened.
use ndarray::{Array2, ArrayD, Ix2, IxDyn, OwnedRepr};
use ndarray_npy::{NpzReader, ReadableElement};
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use tracing::debug;

use crate::constants::DEFAULT_SFREQ;
use crate::error::{Error, Result};
use crate::io::{event_log, require_vector};
use crate::recording::Recording;

pub fn load_npz(path: &Path) -> Result<Recording> {
    let file = File::open(path).map_err(|e| Error::io("opening npz", e))?;
    read_npz(file)
}

pub fn read_npz<R: Read + Seek>(reader: R) -> Result<Recording> {
    let mut npz = NpzReader::new(reader).map_err(|e| Error::npz("opening archive", e))?;
    let names = npz.names().map_err(|e| Error::npz("listing arrays", e))?;

    let signal = read_signal(&mut npz, &require_entry(&names, "s")?)?;
    let types = read_column(&mut npz, &require_entry(&names, "etyp")?)?;
    let positions = read_column(&mut npz, &require_entry(&names, "epos")?)?;
    let durations = read_column(&mut npz, &require_entry(&names, "edur")?)?;
    let events = event_log(types, positions, durations)?;

    let artifacts = match entry(&names, "artifacts") {
        Some(name) => Some(read_column(&mut npz, name)?.into_iter().map(|v| v as u8).collect()),
        None => None,
    };

    debug!(
        channels = signal.nrows(),
        samples = signal.ncols(),
        events = events.len(),
        "loaded npz recording"
    );
    Ok(Recording { signal, events, artifacts, sfreq: DEFAULT_SFREQ })
}

/// Archive entry for `key`, stored either bare or as `key.npy`.
fn entry<'a>(names: &'a [String], key: &str) -> Option<&'a str> {
    names
        .iter()
        .find(|n| n.as_str() == key || n.strip_suffix(".npy") == Some(key))
        .map(String::as_str)
}

fn require_entry(names: &[String], key: &str) -> Result<String> {
    entry(names, key)
        .map(str::to_string)
        .ok_or_else(|| Error::MissingTensor(key.to_string()))
}

fn read_as<T: ReadableElement, R: Read + Seek>(
    npz: &mut NpzReader<R>,
    name: &str,
) -> Option<ArrayD<T>> {
    npz.by_name::<OwnedRepr<T>, IxDyn>(name).ok()
}

macro_rules! read_widened {
    ($npz:expr, $name:expr, $out:ty; $($ty:ty),+ $(,)?) => {{
        let mut found: Option<ArrayD<$out>> = None;
        $(
            if found.is_none() {
                found = read_as::<$ty, _>($npz, $name).map(|a| a.mapv(|v| v as $out));
            }
        )+
        found
    }};
}

fn unsupported(name: &str) -> Error {
    Error::UnsupportedDtype { name: name.to_string(), dtype: "npy".to_string() }
}

/// `[T, C]` samples, transposed to `[C, T]`.
fn read_signal<R: Read + Seek>(npz: &mut NpzReader<R>, name: &str) -> Result<Array2<f32>> {
    let s = read_widened!(npz, name, f32; f64, f32, i16, i32)
        .ok_or_else(|| unsupported(name))?;
    let shape = s.shape().to_vec();
    let s = s
        .into_dimensionality::<Ix2>()
        .map_err(|_| Error::bad_shape(name, &shape))?;
    Ok(s.reversed_axes().as_standard_layout().into_owned())
}

fn read_column<R: Read + Seek>(npz: &mut NpzReader<R>, name: &str) -> Result<Vec<i64>> {
    let col = read_widened!(npz, name, i64; i64, i32, u32, i16, u16, i8, u8, f64, f32)
        .ok_or_else(|| unsupported(name))?;
    require_vector(name, col.shape())?;
    Ok(col.iter().copied().collect())
}
