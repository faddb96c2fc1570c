use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use cf_analysis::{
    BuildError, GridRequest, HistogramLoader, LoadError, RatioRequest, build_grid, build_ratio,
    collect_rows,
};
use cf_core::{CTau, DEFAULT_ERA, DecayChannel, DecaySelection, SignalPoint};
use cf_root::fixture::{FixtureFile, FixtureHist};

const CUTS: [&str; 4] = ["all", "trigger", "met", "track"];

fn tmp_dir(tag: &str) -> PathBuf {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    let p = std::env::temp_dir().join(format!("cf_analysis_{tag}_{}_{nanos}", std::process::id()));
    std::fs::create_dir_all(&p).unwrap();
    p
}

fn point(ctau: &str, decay: DecayChannel) -> SignalPoint {
    SignalPoint {
        gluino_mass: 1800,
        neutralino_mass: 1300,
        ctau: CTau::new(ctau).unwrap(),
        decay,
        era: DEFAULT_ERA.into(),
    }
}

/// Write an ntuple holding `EventCutFlow` under `prefix`.
fn write_ntuple(dir: &Path, p: &SignalPoint, prefix: &str, contents: &[f64]) {
    let hist = FixtureHist::new("EventCutFlow", contents).with_labels(&CUTS).with_x_title("cut");
    FixtureFile::new()
        .compressed()
        .histogram(&format!("{prefix}/EventCutFlow"), hist)
        .write(dir.join(p.file_name()))
        .unwrap();
}

fn ratio_request() -> RatioRequest {
    RatioRequest {
        hist_name: "EventCutFlow".into(),
        gluino_mass: 1800,
        neutralino_mass: 1300,
        numerator: CTau::new("0p1mm").unwrap(),
        denominator: CTau::new("10000mm").unwrap(),
        decay: DecayChannel::Light,
        era: DEFAULT_ERA.into(),
        log_scale: true,
        ratio_y_ticks: Some(vec![0.5, 1.0, 1.5, 2.0]),
        overlay_y_ticks: None,
    }
}

fn grid_request(ctaus: &str, decays: DecaySelection) -> GridRequest {
    GridRequest {
        hist_name: "EventCutFlow".into(),
        gluino_mass: 1800,
        neutralino_mass: 1300,
        ctaus: CTau::parse_list(ctaus).unwrap(),
        decays,
        era: DEFAULT_ERA.into(),
        normalize: false,
        log_z: true,
    }
}

#[test]
fn loader_falls_back_to_second_prefix_and_renames() {
    let dir = tmp_dir("fallback");
    let p = point("1mm", DecayChannel::Heavy);
    write_ntuple(&dir, &p, "HSCPFullAODAnalyzer", &[8.0, 4.0, 2.0, 1.0]);

    let loader = HistogramLoader::new(&dir);
    let h = loader.try_load(&p.file_name(), "EventCutFlow").unwrap();
    let stem = p.file_name().trim_end_matches(".root").to_string();
    assert_eq!(h.name, format!("EventCutFlow_{stem}"));
    assert_eq!(h.contents, vec![8.0, 4.0, 2.0, 1.0]);
    assert_eq!(h.axis.labels, CUTS.to_vec());
    let src = h.source.as_ref().unwrap();
    assert_eq!(src.directory, "HSCPFullAODAnalyzer");
    assert_eq!(src.file, dir.join(p.file_name()));

    let normalized = loader.clone().normalized(true).load(&p.file_name(), "EventCutFlow").unwrap();
    assert_eq!(normalized.contents, vec![1.0, 0.5, 0.25, 0.125]);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn loader_skips_non_histogram_under_first_prefix() {
    let dir = tmp_dir("wrong_class");
    let p = point("10mm", DecayChannel::Light);
    FixtureFile::new()
        .note("HSCPMiniAODAnalyzer/EventCutFlow", "not a histogram")
        .histogram(
            "HSCPFullAODAnalyzer/EventCutFlow",
            FixtureHist::new("EventCutFlow", &[6.0, 3.0]),
        )
        .write(dir.join(p.file_name()))
        .unwrap();

    let file = cf_root::RootFile::open(dir.join(p.file_name())).unwrap();
    assert!(matches!(
        file.get_histogram("HSCPMiniAODAnalyzer/EventCutFlow"),
        Err(cf_root::RootError::UnsupportedClass(_))
    ));

    let h = HistogramLoader::new(&dir).try_load(&p.file_name(), "EventCutFlow").unwrap();
    assert_eq!(h.contents, vec![6.0, 3.0]);
    assert_eq!(h.source.as_ref().unwrap().directory, "HSCPFullAODAnalyzer");

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn loader_reports_missing_histogram_and_bad_file() {
    let dir = tmp_dir("missing");
    let p = point("1mm", DecayChannel::Light);
    write_ntuple(&dir, &p, "SomeOtherAnalyzer", &[1.0, 1.0, 1.0, 1.0]);
    std::fs::write(dir.join("garbage.root"), b"this is not a ROOT file, not even close").unwrap();

    let loader = HistogramLoader::new(&dir);
    match loader.try_load(&p.file_name(), "EventCutFlow") {
        Err(LoadError::HistogramNotFound { tried, .. }) => assert_eq!(
            tried,
            vec!["HSCPMiniAODAnalyzer/EventCutFlow", "HSCPFullAODAnalyzer/EventCutFlow"]
        ),
        other => panic!("expected HistogramNotFound, got {other:?}"),
    }
    assert!(matches!(loader.try_load("garbage.root", "EventCutFlow"), Err(LoadError::Open { .. })));
    assert!(loader.load("garbage.root", "EventCutFlow").is_none());

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn ratio_matches_worked_example() {
    let dir = tmp_dir("ratio");
    write_ntuple(
        &dir,
        &point("0p1mm", DecayChannel::Light),
        "HSCPMiniAODAnalyzer",
        &[100.0, 50.0, 25.0, 10.0],
    );
    write_ntuple(
        &dir,
        &point("10000mm", DecayChannel::Light),
        "HSCPMiniAODAnalyzer",
        &[200.0, 80.0, 40.0, 10.0],
    );

    let art = build_ratio(&HistogramLoader::new(&dir), &ratio_request()).unwrap();
    let want_num = [1.0, 0.5, 0.25, 0.1];
    let want_ratio = [1.0, 1.25, 1.25, 2.0];
    for i in 0..4 {
        assert!((art.numerator.y[i] - want_num[i]).abs() < 1e-12);
        assert!((art.ratio_y[i] - want_ratio[i]).abs() < 1e-12, "bin {i}");
    }
    assert_eq!(art.title, "EventCutFlow Ratio: 0p1mm / 10000mm");
    assert_eq!(art.numerator.label, "c\u{03C4} = 0.1 mm (L)");
    assert_eq!(art.denominator.label, "c\u{03C4} = 10k mm (L)");
    assert_eq!(art.bin_labels, CUTS.to_vec());
    assert!(art.log_y);
    assert_eq!(art.ratio_y_ticks.as_deref(), Some(&[0.5, 1.0, 1.5, 2.0][..]));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn ratio_with_missing_denominator_aborts() {
    let dir = tmp_dir("ratio_missing");
    write_ntuple(
        &dir,
        &point("0p1mm", DecayChannel::Light),
        "HSCPMiniAODAnalyzer",
        &[100.0, 50.0, 25.0, 10.0],
    );
    let err = build_ratio(&HistogramLoader::new(&dir), &ratio_request()).unwrap_err();
    assert!(matches!(err, BuildError::MissingInput { role: "denominator", .. }));
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn grid_skips_missing_points_and_keeps_order() {
    let dir = tmp_dir("grid");
    let inputs = [
        ("0p1mm", DecayChannel::Light, [10.0, 8.0, 5.0, 1.0]),
        ("10000mm", DecayChannel::Light, [12.0, 9.0, 4.0, 2.0]),
        ("1mm", DecayChannel::Heavy, [11.0, 7.0, 3.0, 0.0]),
    ];
    for (ctau, decay, contents) in &inputs {
        write_ntuple(&dir, &point(ctau, *decay), "HSCPMiniAODAnalyzer", contents);
    }

    let req = grid_request("0p1mm,1mm,10000mm", DecaySelection::Both);
    let loader = HistogramLoader::new(&dir);
    assert_eq!(collect_rows(&loader, &req).len(), 3);

    let art = build_grid(&loader, &req).unwrap();
    assert_eq!(art.y_labels, vec!["0.1 (L)", "10k (L)", "1 (H)"]);
    assert_eq!(art.values.len(), 3);
    assert_eq!(art.values[0], inputs[0].2.to_vec());
    assert_eq!(art.values[1], inputs[1].2.to_vec());
    assert_eq!(art.values[2], inputs[2].2.to_vec());
    assert_eq!(art.x_labels, CUTS.to_vec());
    assert_eq!(art.x_title, "cut");
    assert_eq!(art.z_title, "Counts");

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn grid_normalized_rows() {
    let dir = tmp_dir("grid_norm");
    write_ntuple(
        &dir,
        &point("1mm", DecayChannel::Light),
        "HSCPMiniAODAnalyzer",
        &[4.0, 2.0, 1.0, 0.0],
    );
    let mut req = grid_request("1mm", DecaySelection::One(DecayChannel::Light));
    req.normalize = true;
    let art = build_grid(&HistogramLoader::new(&dir), &req).unwrap();
    assert_eq!(art.values, vec![vec![1.0, 0.5, 0.25, 0.0]]);
    assert_eq!(art.z_title, "Fraction of events");
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn grid_with_nothing_loaded_fails() {
    let dir = tmp_dir("grid_empty");
    let req = grid_request("0p1mm,1mm", DecaySelection::Both);
    let err = build_grid(&HistogramLoader::new(&dir), &req).unwrap_err();
    assert!(matches!(err, BuildError::NoHistograms { attempted: 4, .. }));
    std::fs::remove_dir_all(&dir).ok();
}
