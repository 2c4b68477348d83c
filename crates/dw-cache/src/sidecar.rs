//! Plain-text sidecar files holding one value per frame.

use std::fs;
use std::path::{Path, PathBuf};

use dw_core::errors::{DwError, ErrorInfo};
use dw_core::measure::{ErrorKind, Field, RefFilterMode, VariantFlags};

/// File name of the sidecar caching `field` under `kind` and `variant`.
pub fn sidecar_name(field: Field, kind: ErrorKind, variant: &VariantFlags) -> String {
    let mut name = format!("{}_{}", field.stem(), kind.name());
    if variant.fovea {
        name.push_str("_fovea");
    }
    if variant.ref_filter != RefFilterMode::None {
        name.push('_');
        name.push_str(variant.ref_filter.name());
    }
    if variant.fast {
        name.push_str("_fast");
    }
    if variant.no_filter_reference {
        name.push_str("_NoFilterReference");
    }
    name.push_str(".txt");
    name
}

/// Sidecar path inside the candidate directory `dir`.
pub fn sidecar_path(dir: &Path, field: Field, kind: ErrorKind, variant: &VariantFlags) -> PathBuf {
    dir.join(sidecar_name(field, kind, variant))
}

/// Writes `values` one per line in scientific notation.
///
/// The text lands in a sibling `.tmp` file first and is renamed over `path`,
/// so readers never observe a truncated series.
pub fn write_sidecar(path: &Path, values: &[f64]) -> Result<(), DwError> {
    let mut text = String::with_capacity(values.len() * 26);
    for value in values {
        text.push_str(&format!("{value:.18e}\n"));
    }
    let staging = staging_path(path);
    fs::write(&staging, text).map_err(|err| DwError::io("sidecar-write", &staging, err))?;
    fs::rename(&staging, path).map_err(|err| DwError::io("sidecar-rename", path, err))
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|name| name.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Reads a sidecar written by [`write_sidecar`]; blank lines are skipped.
pub fn read_sidecar(path: &Path) -> Result<Vec<f64>, DwError> {
    let text = fs::read_to_string(path).map_err(|err| DwError::io("sidecar-read", path, err))?;
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(number, line)| {
            line.trim().parse::<f64>().map_err(|err| {
                DwError::Parse(
                    ErrorInfo::new("sidecar-parse", err.to_string())
                        .with_path(path)
                        .with_context("line", (number + 1).to_string()),
                )
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_carry_only_active_flags() {
        let plain = VariantFlags::default();
        assert_eq!(sidecar_name(Field::Mean, ErrorKind::RelMse, &plain), "mean_RelMSE.txt");
        let all = VariantFlags {
            fovea: true,
            ref_filter: RefFilterMode::SpatialTemporal,
            fast: true,
            no_filter_reference: true,
        };
        assert_eq!(
            sidecar_name(Field::P99, ErrorKind::L1, &all),
            "99-th percentile_L1_fovea_SPATIAL_TEMPORAL_fast_NoFilterReference.txt"
        );
    }

    #[test]
    fn values_survive_disk_with_nan() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mean_L2.txt");
        write_sidecar(&path, &[0.1, 1e-300, f64::NAN]).unwrap();
        let values = read_sidecar(&path).unwrap();
        assert_eq!(&values[..2], &[0.1, 1e-300]);
        assert!(values[2].is_nan());
    }

    #[test]
    fn rewrite_replaces_series_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mean_L2.txt");
        write_sidecar(&path, &[1.0, 2.0, 3.0]).unwrap();
        write_sidecar(&path, &[4.0]).unwrap();
        assert_eq!(read_sidecar(&path).unwrap(), vec![4.0]);
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("mean_L2.txt")]);
    }

    #[test]
    fn garbage_line_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mean_L2.txt");
        fs::write(&path, "1.0\nhalf\n").unwrap();
        let err = read_sidecar(&path).unwrap_err();
        assert!(matches!(err, DwError::Parse(_)));
        assert_eq!(err.info().context.get("line").map(String::as_str), Some("2"));
    }
}
