//! Tests against real HDF5 files

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use hdf5::types::VarLenUnicode;
use tempfile::TempDir;

use h5ndiff::application::services::DatasetEnumerator;
use h5ndiff::cli::commands::execute_command;
use h5ndiff::cli::Cli;
use h5ndiff::config::Settings;
use h5ndiff::domain::{Column, ElementKind, Scalar};
use h5ndiff::exitcode;
use h5ndiff::infrastructure::di::ServiceContainer;
use h5ndiff::infrastructure::traits::Container;
use h5ndiff::infrastructure::{Hdf5Container, InfraError};
use h5ndiff::util::testing::init_test_setup;

use clap::Parser;
use hdf5::H5Type;

#[derive(H5Type, Clone, Copy, Debug, PartialEq)]
#[repr(u8)]
enum Level {
    Low = 1,
    Mid = 2,
    High = 3,
}

/// Helper to create an HDF5 file; the handle is closed before returning
fn create_h5(dir: &TempDir, name: &str, build: impl FnOnce(&hdf5::File) -> hdf5::Result<()>) -> PathBuf {
    let path = dir.path().join(name);
    let file = hdf5::File::create(&path).expect("create hdf5 file");
    build(&file).expect("populate hdf5 file");
    file.close().expect("close hdf5 file");
    path
}

fn write_f64(group: &hdf5::Group, name: &str, data: &[f64]) -> hdf5::Result<()> {
    let ds = group.new_dataset::<f64>().shape(data.len()).create(name)?;
    ds.write_raw(data)
}

fn write_i32(group: &hdf5::Group, name: &str, data: &[i32]) -> hdf5::Result<()> {
    let ds = group.new_dataset::<i32>().shape(data.len()).create(name)?;
    ds.write_raw(data)
}

fn sample_pair(dir: &TempDir) -> (PathBuf, PathBuf) {
    let file1 = create_h5(dir, "file1.h5", |f| {
        write_f64(f, "a", &[1.0, 2.0, 3.0])?;
        write_i32(f, "b", &[10, 20, 30])?;
        let grp = f.create_group("grp")?;
        write_f64(&grp, "c", &[1.0, 2.0, 3.0])?;
        write_f64(&grp, "d", &[5.0, 5.0, 5.0])?;
        Ok(())
    });
    let file2 = create_h5(dir, "file2.h5", |f| {
        write_f64(f, "a", &[1.0, 2.0, 30.0])?;
        write_i32(f, "b", &[10, 20, 31])?;
        let grp = f.create_group("grp")?;
        write_f64(&grp, "c", &[1.0, 2.0, 3.0, 4.0])?;
        write_f64(&grp, "d", &[5.0, 5.0, 6.0])?;
        Ok(())
    });
    (file1, file2)
}

fn run(file1: &Path, file2: &Path, precision: f64) -> Vec<String> {
    init_test_setup();
    let settings = Settings {
        precision,
        ..Settings::default()
    };
    let container = ServiceContainer::open(settings, file1, file2).expect("open files");
    let report = container.diff_service().run().expect("run diff");
    report.diffs().map(|d| d.to_string()).collect()
}

#[test]
fn given_nested_file_when_enumerating_then_lists_datasets_pre_order() {
    init_test_setup();
    let temp = TempDir::new().unwrap();
    let path = create_h5(&temp, "nested.h5", |f| {
        write_f64(f, "z", &[0.0])?;
        let outer = f.create_group("outer")?;
        let inner = outer.create_group("inner")?;
        write_i32(&inner, "deep", &[1])?;
        write_f64(&outer, "x", &[0.0])?;
        f.create_group("empty")?;
        Ok(())
    });

    let container = Hdf5Container::open(&path).unwrap();
    let paths = DatasetEnumerator::new(64).datasets(&container).unwrap();

    assert_eq!(paths, vec!["outer/inner/deep", "outer/x", "z"]);
}

#[test]
fn given_dangling_soft_link_when_enumerating_then_skipped() {
    init_test_setup();
    let temp = TempDir::new().unwrap();
    let path = create_h5(&temp, "links.h5", |f| {
        write_f64(f, "real", &[1.0])?;
        f.link_soft("/nowhere", "dangling")?;
        Ok(())
    });

    let container = Hdf5Container::open(&path).unwrap();
    let paths = DatasetEnumerator::new(64).datasets(&container).unwrap();

    assert_eq!(paths, vec!["real"]);
}

#[test]
fn given_hard_link_cycle_when_enumerating_then_lists_each_dataset_once() {
    init_test_setup();
    let temp = TempDir::new().unwrap();
    let path = create_h5(&temp, "cyclic.h5", |f| {
        let g = f.create_group("g")?;
        write_f64(&g, "x", &[1.0, 2.0])?;
        f.link_hard("/", "g/back")?;
        Ok(())
    });

    let container = Hdf5Container::open(&path).unwrap();
    let paths = DatasetEnumerator::new(64).datasets(&container).unwrap();

    assert_eq!(paths, vec!["g/x"]);
}

#[test]
fn given_cyclic_file_against_itself_when_diffing_then_run_succeeds() {
    let temp = TempDir::new().unwrap();
    let path = create_h5(&temp, "cyclic.h5", |f| {
        let g = f.create_group("g")?;
        write_f64(&g, "x", &[1.0, 2.0])?;
        f.link_hard("/", "g/back")?;
        Ok(())
    });

    assert!(run(&path, &path, 0.0).is_empty());
}

#[test]
fn given_enum_datasets_when_diffing_then_compared_as_raw_integers() {
    init_test_setup();
    let temp = TempDir::new().unwrap();
    let file1 = create_h5(&temp, "e1.h5", |f| {
        let ds = f.new_dataset::<Level>().shape(3).create("level")?;
        ds.write_raw(&[Level::Low, Level::Mid, Level::High])
    });
    let file2 = create_h5(&temp, "e2.h5", |f| {
        let ds = f.new_dataset::<Level>().shape(3).create("level")?;
        ds.write_raw(&[Level::Low, Level::High, Level::High])
    });

    let container = Hdf5Container::open(&file1).unwrap();
    assert_eq!(container.describe("level").unwrap().kind, ElementKind::Unsigned);
    assert_eq!(container.read("level").unwrap(), Column::Unsigned(vec![1, 2, 3]));

    let lines = run(&file1, &file2, 0.0);
    assert_eq!(
        lines,
        vec!["# DIFF : (dataset: level, id: 1, x (file1): 2, y (file2): 3)"]
    );
}

#[test]
fn given_typed_datasets_when_describing_then_maps_element_kinds() {
    init_test_setup();
    let temp = TempDir::new().unwrap();
    let path = create_h5(&temp, "kinds.h5", |f| {
        f.new_dataset::<i16>().shape(2).create("signed")?;
        f.new_dataset::<u8>().shape(2).create("unsigned")?;
        f.new_dataset::<f32>().shape((2, 3)).create("float")?;
        f.new_dataset::<bool>().shape(1).create("flag")?;
        f.new_dataset::<VarLenUnicode>().shape(1).create("text")?;
        Ok(())
    });

    let container = Hdf5Container::open(&path).unwrap();

    assert_eq!(container.describe("signed").unwrap().kind, ElementKind::Signed);
    assert_eq!(container.describe("unsigned").unwrap().kind, ElementKind::Unsigned);
    assert_eq!(container.describe("flag").unwrap().kind, ElementKind::Boolean);
    let float = container.describe("float").unwrap();
    assert_eq!(float.kind, ElementKind::Float);
    assert_eq!(float.shape, vec![2, 3]);
    assert!(matches!(
        container.describe("text").unwrap().kind,
        ElementKind::Unsupported(_)
    ));
}

#[test]
fn given_two_dimensional_dataset_when_reading_then_row_major_column() {
    init_test_setup();
    let temp = TempDir::new().unwrap();
    let path = create_h5(&temp, "matrix.h5", |f| {
        let ds = f.new_dataset::<u16>().shape((2, 2)).create("m")?;
        ds.write_raw(&[1u16, 2, 3, 4])?;
        let flags = f.new_dataset::<bool>().shape(2).create("flags")?;
        flags.write_raw(&[true, false])?;
        Ok(())
    });

    let container = Hdf5Container::open(&path).unwrap();

    assert_eq!(container.read("m").unwrap(), Column::Unsigned(vec![1, 2, 3, 4]));
    assert_eq!(container.read("flags").unwrap(), Column::Unsigned(vec![1, 0]));
}

#[test]
fn given_paths_when_checking_contains_then_only_datasets_match() {
    init_test_setup();
    let temp = TempDir::new().unwrap();
    let path = create_h5(&temp, "contains.h5", |f| {
        let grp = f.create_group("grp")?;
        write_f64(&grp, "x", &[1.0])?;
        Ok(())
    });

    let container = Hdf5Container::open(&path).unwrap();

    assert!(container.contains_dataset("grp/x"));
    assert!(!container.contains_dataset("grp"));
    assert!(!container.contains_dataset("grp/missing"));
    assert!(!container.contains_dataset("nogroup/x"));
}

#[test]
fn given_missing_file_when_opening_then_open_error() {
    let temp = TempDir::new().unwrap();
    let result = Hdf5Container::open(&temp.path().join("absent.h5"));
    assert!(matches!(result, Err(InfraError::Open { .. })));
}

#[test]
fn given_non_hdf5_file_when_opening_then_open_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("plain.txt");
    std::fs::write(&path, "not hdf5").unwrap();

    let result = Hdf5Container::open(&path);

    assert!(matches!(result, Err(InfraError::Open { .. })));
}

#[test]
fn given_sample_files_when_diffing_then_expected_lines() {
    let temp = TempDir::new().unwrap();
    let (file1, file2) = sample_pair(&temp);

    let lines = run(&file1, &file2, 0.1);

    assert_eq!(
        lines,
        vec![
            "# DIFF : (dataset: a, id: 1, x (file1): 2.0, y (file2): 2.0)",
            "# DIFF : (dataset: b, id: 2, x (file1): 30, y (file2): 31)",
            "# DIFF : (dataset: grp/d, id: 2, x (file1): 5.0, y (file2): 6.0)",
        ]
    );
}

#[test]
fn given_same_file_twice_when_diffing_then_no_lines() {
    let temp = TempDir::new().unwrap();
    let (file1, _) = sample_pair(&temp);

    assert!(run(&file1, &file1, 0.0).is_empty());
}

#[test]
fn given_cli_with_missing_input_when_executing_then_noinput_exit() {
    init_test_setup();
    let temp = TempDir::new().unwrap();
    let (file1, _) = sample_pair(&temp);
    let absent = temp.path().join("absent.h5");

    let cli = Cli::try_parse_from([
        OsStr::new("h5ndiff"),
        file1.as_os_str(),
        absent.as_os_str(),
    ])
    .unwrap();
    let err = execute_command(&cli).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::NOINPUT);
}

#[test]
fn given_cli_with_exit_code_flag_when_files_differ_then_exit_one() {
    init_test_setup();
    let temp = TempDir::new().unwrap();
    let (file1, file2) = sample_pair(&temp);

    let with_flag = Cli::try_parse_from([
        OsStr::new("h5ndiff"),
        OsStr::new("-e"),
        file1.as_os_str(),
        file2.as_os_str(),
    ])
    .unwrap();
    let without_flag =
        Cli::try_parse_from([OsStr::new("h5ndiff"), file1.as_os_str(), file2.as_os_str()]).unwrap();

    assert_eq!(execute_command(&with_flag).unwrap(), exitcode::DIFFERENT);
    assert_eq!(execute_command(&without_flag).unwrap(), exitcode::OK);
}

#[test]
fn given_integer_dataset_when_diffing_then_unscaled_values_reported() {
    let temp = TempDir::new().unwrap();
    let file1 = create_h5(&temp, "i1.h5", |f| write_i32(f, "codes", &[100, 200, 300]));
    let file2 = create_h5(&temp, "i2.h5", |f| write_i32(f, "codes", &[100, 201, 300]));

    init_test_setup();
    let settings = Settings::default();
    let container = ServiceContainer::open(settings, &file1, &file2).unwrap();
    let report = container.diff_service().run().unwrap();
    let diff = report.diffs().next().expect("one diff");

    assert_eq!(diff.index, 1);
    assert_eq!(diff.x, Scalar::Signed(200));
    assert_eq!(diff.y, Scalar::Signed(201));
}
