use std::fs;
use std::path::{Path, PathBuf};

use tempfile::tempdir;
use zdecay_gen::generate;
use zdecay_hist::JsonRenderer;
use zdecay_sim::{analyze, load_run, run_generation, RunConfig, MANIFEST_FILE};
use zdecay_store::StoreFormat;

fn small_config(format: StoreFormat, workers: usize) -> RunConfig {
    let mut config = RunConfig::default();
    config.generator.events = 5_000;
    config.generator.chunk_size = 700;
    config.generator.workers = workers;
    config.generator.seed_policy.master_seed = 42;
    config.store.format = format;
    config
}

#[test]
fn stored_events_match_in_memory_generation() {
    for format in [StoreFormat::Csv, StoreFormat::Binary] {
        let dir = tempdir().expect("tempdir");
        let config = small_config(format, 1);
        let outcome = run_generation(&config, dir.path()).expect("generate");
        assert_eq!(outcome.summary.events, 5_000);
        assert_eq!(outcome.summary.chunks, 8);
        assert_eq!(outcome.manifest.event_count, 5_000);
        assert_eq!(outcome.manifest.format, format);
        assert!(outcome.manifest_path.ends_with(MANIFEST_FILE));

        let (manifest, events) = load_run(dir.path()).expect("load");
        assert_eq!(manifest.config, config);
        assert_eq!(events, generate(&config.generator).expect("regenerate"));
    }
}

#[test]
fn worker_count_does_not_change_the_store() {
    let sequential = tempdir().expect("tempdir");
    let parallel = tempdir().expect("tempdir");
    let a = run_generation(&small_config(StoreFormat::Binary, 1), sequential.path())
        .expect("sequential");
    let b = run_generation(&small_config(StoreFormat::Binary, 4), parallel.path())
        .expect("parallel");
    assert_eq!(a.manifest.events_sha256, b.manifest.events_sha256);
}

#[test]
fn tampered_store_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let outcome = run_generation(&small_config(StoreFormat::Csv, 1), dir.path()).expect("generate");
    let events_path = outcome.manifest.events_path(&outcome.manifest_path);
    let mut contents = fs::read_to_string(&events_path).expect("read");
    contents.push_str("1,2,3,4,5,6,7,8,9,10\n");
    fs::write(&events_path, contents).expect("write");
    let err = load_run(dir.path()).expect_err("digest");
    assert_eq!(err.info().code, "digest-mismatch");
}

#[test]
fn analysis_renders_every_histogram() {
    let dir = tempdir().expect("tempdir");
    let config = small_config(StoreFormat::Binary, 2);
    run_generation(&config, &dir.path().join("run")).expect("generate");
    let (manifest, events) = load_run(&dir.path().join("run")).expect("load");

    let analysis = analyze(&events, &manifest.config.analysis).expect("analyze");
    for hist in &analysis.histograms {
        assert_eq!(hist.entries(), 5_000, "{}", hist.name());
    }
    let mut renderer = JsonRenderer::new(dir.path().join("plots"));
    analysis
        .render(&mut renderer, "mass", 50)
        .expect("render");
    assert_eq!(renderer.written().len(), 5);

    let mass: serde_json::Value =
        serde_json::from_slice(&fs::read(dir.path().join("plots/mass.json")).expect("read"))
            .expect("json");
    assert_eq!(mass["overlay"]["points"].as_array().expect("points").len(), 50);
    let pt: serde_json::Value =
        serde_json::from_slice(&fs::read(dir.path().join("plots/lepton_pt.json")).expect("read"))
            .expect("json");
    assert!(pt.get("overlay").is_none());

    let report = analysis.report(events.len(), "mass");
    assert_eq!(report.histograms.len(), 5);
    assert_eq!(report.fit.degrees_of_freedom, 57);
}

#[test]
fn invalid_configuration_fails_before_writing() {
    let dir = tempdir().expect("tempdir");
    let mut config = small_config(StoreFormat::Csv, 1);
    config.generator.physics.central_mass = 0.0001;
    let err = run_generation(&config, &dir.path().join("run")).expect_err("config");
    assert_eq!(err.info().code, "below-threshold");
    assert!(!dir.path().join("run").exists());
}

#[test]
fn nested_events_file_survives_moving_the_run() {
    let dir = tempdir().expect("tempdir");
    let mut config = small_config(StoreFormat::Csv, 1);
    config.generator.events = 300;
    config.store.events_file = Some(PathBuf::from("data/events.csv"));
    let outcome = run_generation(&config, &dir.path().join("run")).expect("generate");
    assert_eq!(outcome.manifest.events_file, Path::new("data").join("events.csv"));
    assert!(dir.path().join("run/data/events.csv").is_file());

    fs::rename(dir.path().join("run"), dir.path().join("moved")).expect("rename");
    let (_, events) = load_run(&dir.path().join("moved")).expect("load");
    assert_eq!(events.len(), 300);
}

#[test]
fn absolute_events_file_fails_before_writing() {
    let dir = tempdir().expect("tempdir");
    let mut config = small_config(StoreFormat::Csv, 1);
    config.store.events_file = Some(dir.path().join("elsewhere.csv"));
    let err = run_generation(&config, &dir.path().join("run")).expect_err("config");
    assert_eq!(err.info().code, "events-file");
    assert!(!dir.path().join("run").exists());
    assert!(!dir.path().join("elsewhere.csv").exists());
}
