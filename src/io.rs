//! Safetensors I/O for recordings and extracted trials.
//!
//! Recording layout (the arrays of the BCI IV 2a `.npz` port, one tensor
//! each):
//!
//! | key         | shape            | dtype                    |
//! |-------------|------------------|--------------------------|
//! | `s`         | `[T, C]`         | F32 / F64                |
//! | `etyp`      | `[N]` or `[N,1]` | any integer or float     |
//! | `epos`      | `[N]` or `[N,1]` | any integer or float     |
//! | `edur`      | `[N]` or `[N,1]` | any integer or float     |
//! | `artifacts` | `[K]` or `[K,1]` | optional, integer        |
//! | `sfreq`     | `[1]`            | optional, F32 / F64      |
//!
//! `s` is stored samples-major and transposed to `[C, T]` on load.
//!
//! Unlike per-trial extraction, every problem here is an error.
use ndarray::Array2;
use std::path::Path;
use tracing::debug;

use crate::constants::DEFAULT_SFREQ;
use crate::error::{Error, Result};
use crate::events::EventLog;
use crate::extract::TrialSet;
use crate::recording::Recording;

// ── Low-level safetensors parser ─────────────────────────────────────────────

type Header = serde_json::Map<String, serde_json::Value>;

fn parse_header(bytes: &[u8]) -> Result<(Header, usize)> {
    let len_bytes: [u8; 8] = bytes
        .get(..8)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| Error::truncated("safetensors header length"))?;
    let n = u64::from_le_bytes(len_bytes) as usize;
    let end = 8usize
        .checked_add(n)
        .filter(|&e| e <= bytes.len())
        .ok_or_else(|| Error::truncated("safetensors header"))?;
    let header: Header = serde_json::from_slice(&bytes[8..end])
        .map_err(|e| Error::json("parsing safetensors header", e))?;
    Ok((header, end))
}

/// One tensor's metadata plus a borrow of its payload.
struct Tensor<'a> {
    name: &'a str,
    dtype: &'a str,
    shape: Vec<usize>,
    data: &'a [u8],
}

fn dtype_size(dtype: &str) -> Option<usize> {
    Some(match dtype {
        "U8" | "I8" => 1,
        "U16" | "I16" => 2,
        "U32" | "I32" | "F32" => 4,
        "U64" | "I64" | "F64" => 8,
        _ => return None,
    })
}

fn tensor<'a>(
    header: &'a Header,
    bytes: &'a [u8],
    data_start: usize,
    name: &'a str,
) -> Result<Option<Tensor<'a>>> {
    let Some(entry) = header.get(name) else {
        return Ok(None);
    };
    let bad = || Error::Malformed { message: format!("header entry '{name}'") };

    let dtype = entry["dtype"].as_str().ok_or_else(bad)?;
    let as_usize = |v: &serde_json::Value| {
        v.as_u64().and_then(|d| usize::try_from(d).ok()).ok_or_else(bad)
    };
    let shape: Vec<usize> = entry["shape"]
        .as_array()
        .ok_or_else(bad)?
        .iter()
        .map(as_usize)
        .collect::<Result<_>>()?;
    let offsets = entry["data_offsets"].as_array().ok_or_else(bad)?;
    let (s, e) = match offsets.as_slice() {
        [s, e] => (as_usize(s)?, as_usize(e)?),
        _ => return Err(bad()),
    };
    let end = data_start.checked_add(e).filter(|&end| s <= e && end <= bytes.len());
    let Some(end) = end else {
        return Err(Error::truncated(format!("tensor '{name}'")));
    };

    let size = dtype_size(dtype).ok_or_else(|| Error::UnsupportedDtype {
        name: name.to_string(),
        dtype: dtype.to_string(),
    })?;
    let n_bytes = shape
        .iter()
        .try_fold(size, |acc, &d| acc.checked_mul(d));
    if n_bytes != Some(e - s) {
        return Err(Error::bad_shape(name, &shape));
    }
    Ok(Some(Tensor { name, dtype, shape, data: &bytes[data_start + s..end] }))
}

fn require<'a>(
    header: &'a Header,
    bytes: &'a [u8],
    data_start: usize,
    name: &'a str,
) -> Result<Tensor<'a>> {
    tensor(header, bytes, data_start, name)?.ok_or_else(|| Error::MissingTensor(name.to_string()))
}

macro_rules! le_chunks {
    ($data:expr, $ty:ty) => {
        $data
            .chunks_exact(std::mem::size_of::<$ty>())
            .map(|b| <$ty>::from_le_bytes(b.try_into().unwrap_or_default()))
    };
}

impl Tensor<'_> {
    fn unsupported(&self) -> Error {
        Error::UnsupportedDtype { name: self.name.to_string(), dtype: self.dtype.to_string() }
    }

    fn to_f32(&self) -> Result<Vec<f32>> {
        Ok(match self.dtype {
            "F32" => le_chunks!(self.data, f32).collect(),
            "F64" => le_chunks!(self.data, f64).map(|v| v as f32).collect(),
            _ => return Err(self.unsupported()),
        })
    }

    /// Integer view; float payloads are truncated toward zero.
    fn to_i64(&self) -> Result<Vec<i64>> {
        Ok(match self.dtype {
            "U8" => self.data.iter().map(|&b| b as i64).collect(),
            "I8" => self.data.iter().map(|&b| b as i8 as i64).collect(),
            "U16" => le_chunks!(self.data, u16).map(i64::from).collect(),
            "I16" => le_chunks!(self.data, i16).map(i64::from).collect(),
            "U32" => le_chunks!(self.data, u32).map(i64::from).collect(),
            "I32" => le_chunks!(self.data, i32).map(i64::from).collect(),
            "I64" => le_chunks!(self.data, i64).collect(),
            "F32" => le_chunks!(self.data, f32).map(|v| v as i64).collect(),
            "F64" => le_chunks!(self.data, f64).map(|v| v as i64).collect(),
            _ => return Err(self.unsupported()),
        })
    }

    /// Accept `[N]` or a column/row vector `[N, 1]` / `[1, N]`.
    fn require_vector(&self) -> Result<()> {
        require_vector(self.name, &self.shape)
    }
}

pub(crate) fn require_vector(name: &str, shape: &[usize]) -> Result<()> {
    match shape {
        [_] | [_, 1] | [1, _] => Ok(()),
        _ => Err(Error::bad_shape(name, shape)),
    }
}

/// Build the event log from widened columns; codes must fit in `i32`.
pub(crate) fn event_log(types: Vec<i64>, positions: Vec<i64>, durations: Vec<i64>) -> Result<EventLog> {
    let types = types
        .into_iter()
        .map(|c| {
            i32::try_from(c).map_err(|_| Error::Malformed {
                message: format!("event code {c} does not fit in i32"),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    EventLog::new(types, positions, durations)
}

// ── Recording reader ─────────────────────────────────────────────────────────

/// Load a [`Recording`] from a safetensors file.
///
/// [`Recording::load`] picks this or [`crate::npz::load_npz`] by extension.
pub fn load_recording(path: &Path) -> Result<Recording> {
    let bytes = std::fs::read(path).map_err(|e| Error::io("reading recording", e))?;
    read_recording(&bytes)
}

/// Parse a [`Recording`] from an in-memory safetensors buffer.
pub fn read_recording(bytes: &[u8]) -> Result<Recording> {
    let (header, data_start) = parse_header(bytes)?;

    let s = require(&header, bytes, data_start, "s")?;
    let (n_t, n_ch) = match s.shape.as_slice() {
        &[t, c] => (t, c),
        _ => return Err(Error::bad_shape("s", &s.shape)),
    };
    let samples = s.to_f32()?;
    let signal = Array2::from_shape_fn((n_ch, n_t), |(c, t)| samples[t * n_ch + c]);

    let event_field = |name: &'static str| -> Result<Vec<i64>> {
        let t = require(&header, bytes, data_start, name)?;
        t.require_vector()?;
        t.to_i64()
    };
    let types = event_field("etyp")?;
    let positions = event_field("epos")?;
    let durations = event_field("edur")?;
    let events = event_log(types, positions, durations)?;

    let artifacts = match tensor(&header, bytes, data_start, "artifacts")? {
        Some(t) => {
            t.require_vector()?;
            Some(t.to_i64()?.into_iter().map(|v| v as u8).collect())
        }
        None => None,
    };
    let sfreq = match tensor(&header, bytes, data_start, "sfreq")? {
        Some(t) => t.to_f32()?.first().copied().unwrap_or(DEFAULT_SFREQ),
        None => DEFAULT_SFREQ,
    };

    debug!(
        channels = n_ch,
        samples = n_t,
        events = events.len(),
        sfreq,
        "loaded recording"
    );
    Ok(Recording { signal, events, artifacts, sfreq })
}

// ── Generic safetensors builder ──────────────────────────────────────────────

/// Minimal safetensors writer.
///
/// Every tensor goes through [`StWriter::add_bytes`]; the typed helpers only
/// encode their slice little-endian first.
///
/// ```rust,no_run
/// use mitrials::io::StWriter;
/// use std::path::Path;
/// let mut w = StWriter::new();
/// w.add_f32("signal", &[1.0f32, 2.0, 3.0], &[1, 3]);
/// w.add_i32("codes", &[768, 769], &[2]);
/// w.write(Path::new("/tmp/out.safetensors")).unwrap();
/// ```
#[derive(Default)]
pub struct StWriter {
    entries: Vec<Entry>,
}

struct Entry {
    name: String,
    dtype: &'static str,
    shape: Vec<usize>,
    bytes: Vec<u8>,
}

macro_rules! le_bytes {
    ($data:expr) => {
        $data.iter().flat_map(|v| v.to_le_bytes()).collect::<Vec<u8>>()
    };
}

impl StWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw little-endian payload.  `bytes` must hold exactly
    /// `product(shape)` elements of `dtype`.
    pub fn add_bytes(&mut self, name: &str, dtype: &'static str, bytes: Vec<u8>, shape: &[usize]) {
        self.entries.push(Entry { name: name.to_string(), dtype, shape: shape.to_vec(), bytes });
    }

    pub fn add_f32(&mut self, name: &str, data: &[f32], shape: &[usize]) {
        self.add_bytes(name, "F32", le_bytes!(data), shape);
    }

    pub fn add_i32(&mut self, name: &str, data: &[i32], shape: &[usize]) {
        self.add_bytes(name, "I32", le_bytes!(data), shape);
    }

    pub fn add_i64(&mut self, name: &str, data: &[i64], shape: &[usize]) {
        self.add_bytes(name, "I64", le_bytes!(data), shape);
    }

    pub fn add_u8(&mut self, name: &str, data: &[u8], shape: &[usize]) {
        self.add_bytes(name, "U8", data.to_vec(), shape);
    }

    /// Serialize to a safetensors byte buffer: 8-byte header length, JSON
    /// header space-padded to a multiple of 8, then the payloads in order.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut offset: usize = 0;
        let header: Header = self
            .entries
            .iter()
            .map(|en| {
                let begin = offset;
                offset += en.bytes.len();
                let meta = serde_json::json!({
                    "dtype": en.dtype,
                    "shape": en.shape,
                    "data_offsets": [begin, offset],
                });
                (en.name.clone(), meta)
            })
            .collect();
        let mut hdr = serde_json::to_vec(&header)
            .map_err(|e| Error::json("encoding safetensors header", e))?;
        hdr.resize(hdr.len().next_multiple_of(8), b' ');

        let mut out = Vec::with_capacity(8 + hdr.len() + offset);
        out.extend_from_slice(&(hdr.len() as u64).to_le_bytes());
        out.extend_from_slice(&hdr);
        for en in &self.entries {
            out.extend_from_slice(&en.bytes);
        }
        Ok(out)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_bytes()?).map_err(|e| Error::io("writing safetensors", e))
    }
}

// ── Recording / trial writers ────────────────────────────────────────────────

/// Encode `rec` in the layout read by [`read_recording`].
pub fn recording_to_bytes(rec: &Recording) -> Result<Vec<u8>> {
    let (n_ch, n_t) = rec.signal.dim();
    // Samples-major, as in the source arrays.
    let s: Vec<f32> = rec.signal.t().iter().copied().collect();
    let n_ev = rec.events.len();

    let mut w = StWriter::new();
    w.add_f32("s", &s, &[n_t, n_ch]);
    w.add_i32("etyp", rec.events.types(), &[n_ev, 1]);
    w.add_i64("epos", rec.events.positions(), &[n_ev, 1]);
    w.add_i64("edur", rec.events.durations(), &[n_ev, 1]);
    if let Some(a) = &rec.artifacts {
        w.add_u8("artifacts", a, &[a.len(), 1]);
    }
    w.add_f32("sfreq", &[rec.sfreq], &[1]);
    w.to_bytes()
}

pub fn write_recording(rec: &Recording, path: &Path) -> Result<()> {
    std::fs::write(path, recording_to_bytes(rec)?).map_err(|e| Error::io("writing recording", e))
}

/// Encode per-channel trial sets.
///
/// Keys: `channels` (I32, `[C]`), `ch{c}_trial{i}` (F32, `[T_i]`) and
/// `classes_ch{c}` (U8, a UTF-8 JSON array of labels, one per trial).
/// `sets[k]` belongs to `channels[k]`; the two must have equal length.
pub fn trials_to_bytes(sets: &[TrialSet], channels: &[usize]) -> Result<Vec<u8>> {
    if sets.len() != channels.len() {
        return Err(Error::Malformed {
            message: format!("{} trial sets for {} channels", sets.len(), channels.len()),
        });
    }
    let mut w = StWriter::new();
    let ch_i32: Vec<i32> = channels.iter().map(|&c| c as i32).collect();
    w.add_i32("channels", &ch_i32, &[ch_i32.len()]);

    for (set, &ch) in sets.iter().zip(channels) {
        for (i, trial) in set.trials().iter().enumerate() {
            let data: Vec<f32> = trial.iter().copied().collect();
            w.add_f32(&format!("ch{ch}_trial{i}"), &data, &[data.len()]);
        }
        let labels = serde_json::to_vec(set.classes())
            .map_err(|e| Error::json("encoding trial labels", e))?;
        w.add_u8(&format!("classes_ch{ch}"), &labels, &[labels.len()]);
    }
    w.to_bytes()
}

pub fn write_trials(sets: &[TrialSet], channels: &[usize], path: &Path) -> Result<()> {
    std::fs::write(path, trials_to_bytes(sets, channels)?)
        .map_err(|e| Error::io("writing trials", e))
}

/// Read back the labels written by [`write_trials`] for one channel.
pub fn read_trial_classes(bytes: &[u8], channel: usize) -> Result<Vec<String>> {
    let (header, data_start) = parse_header(bytes)?;
    let name = format!("classes_ch{channel}");
    let t = require(&header, bytes, data_start, &name)?;
    serde_json::from_slice(t.data).map_err(|e| Error::json("decoding trial labels", e))
}

/// Number of `ch{channel}_trial{i}` tensors in a trials file.
pub fn count_trials(bytes: &[u8], channel: usize) -> Result<usize> {
    let (header, _) = parse_header(bytes)?;
    let prefix = format!("ch{channel}_trial");
    Ok(header
        .keys()
        .filter(|k| k.strip_prefix(&prefix).is_some_and(|i| i.parse::<usize>().is_ok()))
        .count())
}
