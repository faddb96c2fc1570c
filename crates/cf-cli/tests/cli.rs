use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

use cf_root::fixture::{FixtureFile, FixtureHist};

const ERA: &str = "130X_mcRun3_2023_realistic_postBPix_v2";
const CUTS: [&str; 4] = ["AllEvents", "Trigger", "MET", "Track"];

fn bin_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_cutflow"))
}

fn tmp_base(tag: &str) -> PathBuf {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    let p = std::env::temp_dir().join(format!("cf_cli_{tag}_{}_{nanos}", std::process::id()));
    std::fs::create_dir_all(p.join("ntuples")).unwrap();
    p
}

fn ntuple_name(ctau: &str, decay: &str) -> String {
    format!("gluino1800_chi101300_{ctau}_{decay}_{ERA}.root")
}

fn write_ntuple(base: &Path, ctau: &str, decay: &str, contents: &[f64]) -> PathBuf {
    let path = base.join("ntuples").join(ntuple_name(ctau, decay));
    FixtureFile::new()
        .compressed()
        .histogram(
            "HSCPMiniAODAnalyzer/EventCutFlow",
            FixtureHist::new("EventCutFlow", contents).with_labels(&CUTS),
        )
        .write(&path)
        .unwrap();
    path
}

fn run(base: &Path, args: &[&str]) -> Output {
    let base_s = base.to_string_lossy();
    let mut full = vec!["--base-dir", base_s.as_ref()];
    full.extend_from_slice(args);
    Command::new(bin_path())
        .args(&full)
        .output()
        .unwrap_or_else(|e| panic!("failed to run {:?} {:?}: {}", bin_path(), full, e))
}

fn plots(base: &Path) -> Vec<PathBuf> {
    match std::fs::read_dir(base.join("plots")) {
        Ok(rd) => rd.map(|e| e.unwrap().path()).collect(),
        Err(_) => Vec::new(),
    }
}

#[test]
fn ratio_writes_one_plot_and_artifact() {
    let base = tmp_base("ratio_ok");
    write_ntuple(&base, "0p1mm", "lightDecay", &[1000.0, 500.0, 200.0, 50.0]);
    write_ntuple(&base, "10000mm", "lightDecay", &[800.0, 300.0, 100.0, 40.0]);
    let artifact = base.join("artifacts").join("ratio.json");

    let out = run(
        &base,
        &[
            "ratio",
            "--format",
            "svg",
            "--log-scale",
            "--y-range",
            "2,1.5,1,0.5",
            "--artifact",
            artifact.to_string_lossy().as_ref(),
        ],
    );
    assert!(out.status.success(), "stderr={}", String::from_utf8_lossy(&out.stderr));

    let files = plots(&base);
    assert_eq!(files.len(), 1);
    let expected = base
        .join("plots")
        .join("ratio_EventCutFlow_gluino1800_chi101300_0p1mm_vs_10000mm_lightDecay.svg");
    assert_eq!(files[0], expected);
    let svg = std::fs::read_to_string(&expected).unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.contains(">Trigger</text>"));

    let v: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&artifact).unwrap()).unwrap();
    assert_eq!(v["schema_version"], "cutflow.ratio.v1");
    assert_eq!(v["ratio_y_ticks"], serde_json::json!([2.0, 1.5, 1.0, 0.5]));
    assert_eq!(v["numerator"]["y"][0], 1.0);
    let r1 = v["ratio_y"][1].as_f64().unwrap();
    assert!((r1 - 0.5 / 0.375).abs() < 1e-12);

    std::fs::remove_dir_all(&base).unwrap();
}

#[test]
fn ratio_missing_input_exits_1_without_output() {
    let base = tmp_base("ratio_missing");
    write_ntuple(&base, "0p1mm", "lightDecay", &[10.0, 5.0, 2.0, 1.0]);

    let out = run(&base, &["ratio", "--format", "svg"]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("denominator"), "stderr={stderr}");
    assert!(!base.join("plots").exists());

    std::fs::remove_dir_all(&base).unwrap();
}

#[test]
fn ratio_malformed_y_range_exits_1_without_output() {
    let base = tmp_base("ratio_yrange");
    write_ntuple(&base, "0p1mm", "lightDecay", &[10.0, 5.0, 2.0, 1.0]);
    write_ntuple(&base, "10000mm", "lightDecay", &[10.0, 5.0, 2.0, 1.0]);

    for bad in ["1,abc", "1,,0.5", "1,inf"] {
        let out = run(&base, &["ratio", "--format", "svg", "--y-range", bad]);
        assert_eq!(out.status.code(), Some(1), "accepted {bad}");
        assert!(String::from_utf8_lossy(&out.stderr).contains("--y-range"));
    }
    assert!(plots(&base).is_empty());

    std::fs::remove_dir_all(&base).unwrap();
}

#[test]
fn ratio_blank_y_range_means_no_override() {
    let base = tmp_base("ratio_blank_range");
    write_ntuple(&base, "0p1mm", "lightDecay", &[10.0, 5.0, 2.0, 1.0]);
    write_ntuple(&base, "10000mm", "lightDecay", &[10.0, 4.0, 2.0, 2.0]);
    let artifact = base.join("ratio.json");

    let out = run(
        &base,
        &[
            "ratio",
            "--format",
            "svg",
            "--y-range",
            "",
            "--overlay-y-range",
            " ",
            "--artifact",
            artifact.to_string_lossy().as_ref(),
        ],
    );
    assert!(out.status.success(), "stderr={}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(plots(&base).len(), 1);

    let v: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&artifact).unwrap()).unwrap();
    assert!(v.get("ratio_y_ticks").is_none());
    assert!(v.get("overlay_y_ticks").is_none());

    std::fs::remove_dir_all(&base).unwrap();
}

#[test]
fn grid_skips_missing_points() {
    let base = tmp_base("grid_skip");
    write_ntuple(&base, "0p1mm", "lightDecay", &[100.0, 50.0, 20.0, 5.0]);
    write_ntuple(&base, "10mm", "lightDecay", &[100.0, 40.0, 0.0, 0.0]);

    let out = run(
        &base,
        &["grid", "--ctaus", "0p1mm,1mm,10mm", "--output-name", "grid_test", "--format", "svg"],
    );
    assert!(out.status.success(), "stderr={}", String::from_utf8_lossy(&out.stderr));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Skipping 1mm lightDecay due to loading failure"), "{stderr}");

    let files = plots(&base);
    assert_eq!(files, vec![base.join("plots").join("grid_test.svg")]);
    let svg = std::fs::read_to_string(&files[0]).unwrap();
    assert!(svg.contains(">0.1 (L)</text>"));
    assert!(svg.contains(">10 (L)</text>"));
    assert!(!svg.contains(">1 (L)</text>"));

    std::fs::remove_dir_all(&base).unwrap();
}

#[test]
fn grid_without_inputs_exits_1() {
    let base = tmp_base("grid_empty");
    let out = run(&base, &["grid", "--decay-types", "both", "--format", "svg"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("no histograms named 'EventCutFlow'"));
    assert!(!base.join("plots").exists());

    std::fs::remove_dir_all(&base).unwrap();
}

#[test]
fn unknown_selection_or_format_exits_1() {
    let base = tmp_base("bad_args");
    write_ntuple(&base, "0p1mm", "lightDecay", &[1.0, 1.0, 1.0, 1.0]);

    let out = run(&base, &["grid", "--decay-types", "mediumDecay"]);
    assert_eq!(out.status.code(), Some(1));
    let out = run(&base, &["grid", "--format", "gif"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(!base.join("plots").exists());

    std::fs::remove_dir_all(&base).unwrap();
}

#[test]
fn render_reproduces_plot_from_artifact() {
    let base = tmp_base("render");
    write_ntuple(&base, "0p1mm", "heavyDecay", &[10.0, 8.0, 4.0, 1.0]);
    let artifact = base.join("grid.json");

    let out = run(
        &base,
        &[
            "grid",
            "--decay-types",
            "heavyDecay",
            "--linear-scale-z",
            "--format",
            "svg",
            "--artifact",
            artifact.to_string_lossy().as_ref(),
        ],
    );
    assert!(out.status.success(), "stderr={}", String::from_utf8_lossy(&out.stderr));

    let again = base.join("again").join("grid.svg");
    let out = run(
        &base,
        &[
            "render",
            artifact.to_string_lossy().as_ref(),
            "-o",
            again.to_string_lossy().as_ref(),
        ],
    );
    assert!(out.status.success(), "stderr={}", String::from_utf8_lossy(&out.stderr));
    let svg = std::fs::read_to_string(&again).unwrap();
    assert!(svg.contains(">0.1 (H)</text>"));

    std::fs::remove_dir_all(&base).unwrap();
}

#[test]
fn png_output() {
    let base = tmp_base("png");
    write_ntuple(&base, "0p1mm", "lightDecay", &[10.0, 5.0, 2.0, 1.0]);
    write_ntuple(&base, "10000mm", "lightDecay", &[10.0, 4.0, 2.0, 2.0]);

    let out = run(&base, &["ratio", "--output-name", "r.png"]);
    assert!(out.status.success(), "stderr={}", String::from_utf8_lossy(&out.stderr));
    let bytes = std::fs::read(base.join("plots").join("r.png")).unwrap();
    assert_eq!(&bytes[..4], b"\x89PNG");

    std::fs::remove_dir_all(&base).unwrap();
}

#[test]
fn ls_lists_nested_keys() {
    let base = tmp_base("ls");
    let file = write_ntuple(&base, "0p1mm", "lightDecay", &[1.0, 2.0, 3.0, 4.0]);

    let out =
        Command::new(bin_path()).args(["ls", file.to_string_lossy().as_ref()]).output().unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("HSCPMiniAODAnalyzer/EventCutFlow"));
    assert!(stdout.contains("TH1D"));
    assert!(stdout.contains("TDirectoryFile"));

    std::fs::remove_dir_all(&base).unwrap();
}

#[test]
fn custom_prefix() {
    let base = tmp_base("prefix");
    for ctau in ["0p1mm", "10000mm"] {
        FixtureFile::new()
            .histogram("MyAnalyzer/EventCutFlow", FixtureHist::new("EventCutFlow", &[4.0, 2.0]))
            .write(base.join("ntuples").join(ntuple_name(ctau, "lightDecay")))
            .unwrap();
    }

    let out = run(&base, &["ratio", "--format", "svg"]);
    assert_eq!(out.status.code(), Some(1));

    let out = run(&base, &["--prefix", "MyAnalyzer", "ratio", "--format", "svg"]);
    assert!(out.status.success(), "stderr={}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(plots(&base).len(), 1);

    std::fs::remove_dir_all(&base).unwrap();
}
