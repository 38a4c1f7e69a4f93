mod common;
use common::session;
use mitrials::{read_npz, Error, Recording};
use ndarray::{Array1, Array2};
use ndarray_npy::NpzWriter;
use std::io::Cursor;
use std::path::{Path, PathBuf};

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("mitrials_{}_{name}", std::process::id()))
}

/// Write `rec` the way the dataset port stores it: `s` as f64 `[T, C]`,
/// event columns `[N, 1]` with mixed integer dtypes.
fn write_dataset_npz(rec: &Recording, path: &Path, with_edur: bool) {
    let file = std::fs::File::create(path).unwrap();
    let mut npz = NpzWriter::new(file);

    let s: Array2<f64> = rec.signal.t().mapv(|v| v as f64);
    npz.add_array("s", &s).unwrap();

    let n = rec.events.len();
    let etyp = Array2::from_shape_fn((n, 1), |(i, _)| rec.events.types()[i] as u16);
    let epos = Array2::from_shape_fn((n, 1), |(i, _)| rec.events.positions()[i] as i32);
    npz.add_array("etyp", &etyp).unwrap();
    npz.add_array("epos", &epos).unwrap();
    if with_edur {
        let edur = Array2::from_shape_fn((n, 1), |(i, _)| rec.events.durations()[i] as u16);
        npz.add_array("edur", &edur).unwrap();
    }
    npz.add_array("artifacts", &Array1::<u8>::from(vec![0, 1])).unwrap();
    npz.finish().unwrap();
}

#[test]
fn npz_recording_loads_like_the_dataset() {
    let rec = session(4, &[Some(772), None]);
    let path = temp_path("A01T.npz");
    write_dataset_npz(&rec, &path, true);

    let loaded = Recording::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded.signal.dim(), rec.signal.dim());
    assert_eq!(loaded.signal[[2, 1500]], rec.signal[[2, 1500]]);
    assert_eq!(loaded.events, rec.events);
    assert_eq!(loaded.artifacts, Some(vec![0, 1]));
    assert_eq!(loaded.sfreq, mitrials::DEFAULT_SFREQ);
}

#[test]
fn missing_extension_means_npz() {
    let rec = session(2, &[Some(769)]);
    let path = temp_path("A02T.npz");
    write_dataset_npz(&rec, &path, true);

    let loaded = Recording::load(path.with_extension(""));
    std::fs::remove_file(&path).ok();
    assert_eq!(loaded.unwrap().events, rec.events);
}

#[test]
fn npz_without_durations_is_an_error() {
    let rec = session(2, &[Some(769)]);
    let path = temp_path("no_edur.npz");
    write_dataset_npz(&rec, &path, false);

    let bytes = std::fs::read(&path).unwrap();
    std::fs::remove_file(&path).ok();
    let err = read_npz(Cursor::new(bytes)).unwrap_err();
    assert!(matches!(err, Error::MissingTensor(ref k) if k == "edur"));
}

#[test]
fn not_an_archive_is_an_error() {
    let err = read_npz(Cursor::new(b"definitely not a zip".to_vec())).unwrap_err();
    assert!(matches!(err, Error::Npz { .. }));
}
