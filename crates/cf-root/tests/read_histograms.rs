use cf_root::fixture::{FixtureFile, FixtureHist};
use cf_root::{RootError, RootFile};

const CUTS: [&str; 4] = ["all", "trigger", "met", "track"];

fn cutflow(contents: &[f64]) -> FixtureHist {
    FixtureHist::new("EventCutFlow", contents).with_labels(&CUTS).with_x_title("selection step")
}

fn sample_file() -> FixtureFile {
    FixtureFile::new()
        .histogram("HSCPMiniAODAnalyzer/EventCutFlow", cutflow(&[100.0, 50.0, 25.0, 10.0]))
        .histogram(
            "HSCPMiniAODAnalyzer/Weighted",
            FixtureHist::new("Weighted", &[2.0, 1.0]).with_sumw2(&[4.0, 0.5]),
        )
        .note("HSCPMiniAODAnalyzer/Comment", "not a histogram")
        .histogram("TopLevel", FixtureHist::new("TopLevel", &[1.0, 2.0, 3.0]).as_float())
        .directory("Empty")
}

fn open(f: FixtureFile) -> RootFile {
    RootFile::from_bytes(f.to_bytes(), "fixture.root").unwrap()
}

#[test]
fn reads_labelled_histogram_from_subdirectory() {
    let f = open(sample_file());
    let h = f.get_histogram("HSCPMiniAODAnalyzer/EventCutFlow").unwrap();

    assert_eq!(h.name, "EventCutFlow");
    assert_eq!(h.class_name, "TH1D");
    assert_eq!(h.n_bins, 4);
    assert_eq!(h.bin_content, vec![100.0, 50.0, 25.0, 10.0]);
    assert_eq!(h.bin_edges, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    assert_eq!(h.x_title, "selection step");
    assert_eq!(h.bin_labels, CUTS.to_vec());
    assert_eq!(h.entries, 185.0);
    assert_eq!((h.underflow, h.overflow), (0.0, 0.0));
    assert!(h.sumw2.is_none());
}

#[test]
fn reads_sumw2_and_float_storage() {
    let f = open(sample_file());
    let w = f.get_histogram("HSCPMiniAODAnalyzer/Weighted").unwrap();
    assert_eq!(w.sumw2, Some(vec![4.0, 0.5]));
    assert!(w.bin_labels.is_empty());

    let t = f.get_histogram("TopLevel").unwrap();
    assert_eq!(t.class_name, "TH1F");
    assert_eq!(t.bin_content, vec![1.0, 2.0, 3.0]);
}

#[test]
fn compressed_file_reads_the_same() {
    let plain = open(sample_file()).get_histogram("HSCPMiniAODAnalyzer/EventCutFlow").unwrap();
    let zipped = open(sample_file().compressed())
        .get_histogram("HSCPMiniAODAnalyzer/EventCutFlow")
        .unwrap();
    assert_eq!(plain, zipped);
}

#[test]
fn partial_labels_leave_gaps() {
    let hist = FixtureHist::new("h", &[1.0, 2.0, 3.0]).with_labels(&["first", "", "third"]);
    let f = open(FixtureFile::new().histogram("d/h", hist));
    let h = f.get_histogram("d/h").unwrap();
    assert_eq!(h.bin_labels, vec!["first", "", "third"]);
}

#[test]
fn lists_keys() {
    let f = open(sample_file());
    let top: Vec<String> = f.list_keys().unwrap().into_iter().map(|k| k.path).collect();
    assert_eq!(top, vec!["TopLevel", "HSCPMiniAODAnalyzer", "Empty"]);

    let all = f.list_keys_recursive().unwrap();
    let paths: Vec<&str> = all.iter().map(|k| k.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "TopLevel",
            "HSCPMiniAODAnalyzer",
            "HSCPMiniAODAnalyzer/EventCutFlow",
            "HSCPMiniAODAnalyzer/Weighted",
            "HSCPMiniAODAnalyzer/Comment",
            "Empty",
        ]
    );
    assert_eq!(all[1].class_name, "TDirectoryFile");

    assert!(f.has_directory("HSCPMiniAODAnalyzer"));
    assert!(!f.has_directory("HSCPFullAODAnalyzer"));
    assert!(f.list_directory("Empty").unwrap().is_empty());
}

#[test]
fn corrupt_bin_count_is_an_error() {
    let mut bytes = FixtureFile::new()
        .histogram("d/h", cutflow(&[100.0, 50.0, 25.0, 10.0]))
        .to_bytes();
    // x axis: fNbins, fXmin, fXmax
    let needle: Vec<u8> =
        [&4i32.to_be_bytes()[..], &0f64.to_be_bytes(), &4f64.to_be_bytes()].concat();
    let at = bytes.windows(needle.len()).position(|w| w == needle).unwrap();
    bytes[at..at + 4].copy_from_slice(&i32::MAX.to_be_bytes());

    let f = RootFile::from_bytes(bytes, "corrupt.root").unwrap();
    assert!(matches!(f.get_histogram("d/h"), Err(RootError::Deserialization(_))));
}

#[test]
fn lookup_errors() {
    let f = open(sample_file());
    assert!(matches!(
        f.get_histogram("HSCPFullAODAnalyzer/EventCutFlow"),
        Err(RootError::KeyNotFound(_))
    ));
    assert!(matches!(
        f.get_histogram("HSCPMiniAODAnalyzer/Missing"),
        Err(RootError::KeyNotFound(_))
    ));
    assert!(matches!(
        f.get_histogram("HSCPMiniAODAnalyzer/Comment"),
        Err(RootError::UnsupportedClass(_))
    ));
    assert!(matches!(
        f.get_histogram("TopLevel/EventCutFlow"),
        Err(RootError::NotADirectory { .. })
    ));
}

#[test]
fn open_from_disk() {
    let dir = std::env::temp_dir().join(format!("cf_root_open_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("sample.root");
    sample_file().compressed().write(&path).unwrap();

    let f = RootFile::open(&path).unwrap();
    assert_eq!(f.path(), path.as_path());
    let h = f.get_histogram("/HSCPMiniAODAnalyzer/EventCutFlow/").unwrap();
    assert_eq!(h.bin_labels[3], "track");

    std::fs::remove_dir_all(&dir).ok();
}
