use cosmic_flip::{
    corrupt_file, Corruptor, FlipEngine, FlipError, ProbabilityPolicy, RateRequest, RateSource,
    ResolvedRate, RunConfig, Semantics,
};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tempfile::TempDir;

fn write_input(dir: &TempDir, name: &str, len: usize) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let data: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
    std::fs::write(&path, data).unwrap();
    path
}

fn physical(flux: &str, cross_section: &str, years: f64) -> RateRequest {
    RateRequest {
        flux: Some(flux.to_string()),
        cross_section: Some(cross_section.to_string()),
        years: Some(years),
        ..Default::default()
    }
}

#[test]
fn test_end_to_end_physical_model() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(&temp_dir, "image.bin", 100_000);
    let output = temp_dir.path().join("image.flipped.bin");

    let config = RunConfig::new(&input, &output, physical("LEO", "MEDIUM", 100.0)).with_seed(42);
    let report = FlipEngine::new(config).run().unwrap();

    assert_eq!(report.rate.probability, 10.0 * 1e-12 * 100.0 * 31_536_000.0);
    assert_eq!(report.seed, 42);
    assert_eq!(report.semantics, Semantics::PerBit);
    assert_eq!(report.stats.bytes_processed, 100_000);

    let original = std::fs::read(&input).unwrap();
    let mutated = std::fs::read(&output).unwrap();
    assert_eq!(mutated.len(), original.len());

    let changed = original
        .iter()
        .zip(&mutated)
        .filter(|(a, b)| a != b)
        .count() as u64;
    assert_eq!(changed, report.stats.bytes_flipped);
    assert!(changed > 0);
}

#[test]
fn test_zero_probability_copies_file_exactly() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(&temp_dir, "in.bin", 10_000);
    let output = temp_dir.path().join("out.bin");

    let request = RateRequest {
        flip_probability: Some(0.0),
        ..Default::default()
    };
    let report = FlipEngine::new(RunConfig::new(&input, &output, request))
        .run()
        .unwrap();

    assert_eq!(report.stats.bytes_flipped, 0);
    assert_eq!(std::fs::read(&input).unwrap(), std::fs::read(&output).unwrap());
}

#[test]
fn test_same_seed_reproduces_output() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(&temp_dir, "in.bin", 50_000);
    let first = temp_dir.path().join("first.bin");
    let second = temp_dir.path().join("second.bin");

    let request = RateRequest {
        flip_probability: Some(0.01),
        ..Default::default()
    };
    FlipEngine::new(RunConfig::new(&input, &first, request.clone()).with_seed(7))
        .run()
        .unwrap();
    FlipEngine::new(RunConfig::new(&input, &second, request).with_seed(7))
        .run()
        .unwrap();

    assert_eq!(std::fs::read(first).unwrap(), std::fs::read(second).unwrap());
}

#[test]
fn test_missing_input_is_not_found_and_output_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("does-not-exist.bin");
    let output = temp_dir.path().join("out.bin");

    let request = RateRequest {
        flip_probability: Some(0.1),
        ..Default::default()
    };
    let err = FlipEngine::new(RunConfig::new(&input, &output, request.clone()))
        .run()
        .unwrap_err();
    assert!(matches!(err, FlipError::NotFoundError { .. }));
    assert!(err.user_friendly_message().contains("not found"));
    assert!(!output.exists());

    // An existing output survives a failed run
    std::fs::write(&output, b"previous").unwrap();
    let err = FlipEngine::new(RunConfig::new(&input, &output, request))
        .run()
        .unwrap_err();
    assert!(matches!(err, FlipError::NotFoundError { .. }));
    assert_eq!(std::fs::read(&output).unwrap(), b"previous");
}

#[cfg(unix)]
#[test]
fn test_output_permissions_match_a_plain_create() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().unwrap();
    let input = write_input(&temp_dir, "in.bin", 256);

    // An existing output keeps its mode
    let existing = temp_dir.path().join("existing.bin");
    std::fs::write(&existing, b"previous").unwrap();
    std::fs::set_permissions(&existing, std::fs::Permissions::from_mode(0o644)).unwrap();

    let mut corruptor = Corruptor::new(ChaCha20Rng::seed_from_u64(1), Semantics::PerByte);
    corrupt_file(&input, &existing, 0.0, &mut corruptor).unwrap();
    let mode = std::fs::metadata(&existing).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o644);

    // A new output gets what File::create would give under the current umask
    let reference = temp_dir.path().join("reference.bin");
    std::fs::File::create(&reference).unwrap();
    let expected = std::fs::metadata(&reference).unwrap().permissions().mode() & 0o777;

    let fresh = temp_dir.path().join("fresh.bin");
    corrupt_file(&input, &fresh, 0.0, &mut corruptor).unwrap();
    let mode = std::fs::metadata(&fresh).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, expected);
}

#[cfg(unix)]
#[test]
fn test_read_failure_leaves_output_and_directory_clean() {
    let temp_dir = TempDir::new().unwrap();
    // A directory opens fine but fails on read
    let input = temp_dir.path().join("input_dir");
    std::fs::create_dir(&input).unwrap();
    let out_dir = temp_dir.path().join("out");
    std::fs::create_dir(&out_dir).unwrap();
    let output = out_dir.join("out.bin");
    std::fs::write(&output, b"previous").unwrap();

    let mut corruptor = Corruptor::new(ChaCha20Rng::seed_from_u64(1), Semantics::PerByte);
    let err = corrupt_file(&input, &output, 0.5, &mut corruptor).unwrap_err();

    assert!(matches!(err, FlipError::IoError(_)));
    assert_eq!(err.exit_code(), 3);
    assert_eq!(std::fs::read(&output).unwrap(), b"previous");

    let entries: Vec<String> = std::fs::read_dir(&out_dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(entries, vec!["out.bin".to_string()]);
}

#[test]
fn test_rate_resolves_before_any_file_io() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("missing.bin");
    let output = temp_dir.path().join("out.bin");

    let engine = FlipEngine::new(RunConfig::new(&input, &output, physical("LEO", "LOW", 2.0)));
    let rate = engine.resolve_rate().unwrap();
    assert_eq!(rate.probability, 10.0 * 1e-15 * 2.0 * 31_536_000.0);
    assert!(!output.exists());

    let err = engine.run_with_rate(rate).unwrap_err();
    assert!(matches!(err, FlipError::NotFoundError { .. }));
}

#[test]
fn test_run_with_rate_uses_the_given_rate() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(&temp_dir, "in.bin", 2_048);
    let output = temp_dir.path().join("out.bin");

    // The request alone would flip every byte
    let request = RateRequest {
        flip_probability: Some(1.0),
        ..Default::default()
    };
    let engine = FlipEngine::new(RunConfig::new(&input, &output, request).with_seed(11));
    let rate = ResolvedRate {
        probability: 0.0,
        source: RateSource::Explicit,
        adjusted: false,
    };
    let report = engine.run_with_rate(rate.clone()).unwrap();

    assert_eq!(report.rate, rate);
    assert_eq!(report.stats.bytes_flipped, 0);
    assert_eq!(std::fs::read(&input).unwrap(), std::fs::read(&output).unwrap());
}

#[test]
fn test_conflicting_flags_fail_before_any_file_io() {
    let temp_dir = TempDir::new().unwrap();
    // The input does not exist either: the config error must win
    let input = temp_dir.path().join("missing.bin");
    let output = temp_dir.path().join("out.bin");

    let mut request = physical("MARS", "LOW", 1.0);
    request.flip_probability = Some(0.2);

    let err = FlipEngine::new(RunConfig::new(&input, &output, request))
        .run()
        .unwrap_err();
    assert!(matches!(err, FlipError::ConflictingConfigError { .. }));
    assert_eq!(err.exit_code(), 2);
    assert!(!output.exists());
}

#[test]
fn test_invalid_flux_choice_is_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(&temp_dir, "in.bin", 16);
    let output = temp_dir.path().join("out.bin");

    let err = FlipEngine::new(RunConfig::new(&input, &output, physical("SATURN", "LOW", 1.0)))
        .run()
        .unwrap_err();
    assert!(matches!(err, FlipError::InvalidChoiceError { .. }));
    assert!(!output.exists());
}

#[test]
fn test_unknown_location_falls_back_to_default_probability() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(&temp_dir, "in.bin", 1_000);
    let output = temp_dir.path().join("out.bin");

    let request = RateRequest {
        location: Some("NEPTUNE".to_string()),
        years: Some(1.0),
        ..Default::default()
    };
    let report = FlipEngine::new(RunConfig::new(&input, &output, request).with_seed(3))
        .run()
        .unwrap();

    assert_eq!(report.rate.probability, 0.5);
    assert!(matches!(report.rate.source, RateSource::LocationFallback { .. }));
    // 8 * 0.5 saturates under per-bit semantics
    assert_eq!(report.stats.bytes_flipped, 1_000);
}

#[test]
fn test_out_of_range_probability_per_policy() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(&temp_dir, "in.bin", 512);
    let output = temp_dir.path().join("out.bin");
    let request = physical("JUPITER_BELT", "HIGH", 10.0);

    let report = FlipEngine::new(
        RunConfig::new(&input, &output, request.clone()).with_semantics(Semantics::PerByte),
    )
    .run()
    .unwrap();
    assert_eq!(report.rate.probability, 1.0);
    assert!(report.rate.adjusted);
    assert_eq!(report.stats.bytes_flipped, 512);

    let err = FlipEngine::new(
        RunConfig::new(&input, &output, request.clone()).with_policy(ProbabilityPolicy::Reject),
    )
    .run()
    .unwrap_err();
    assert!(matches!(err, FlipError::InvalidConfigValueError { .. }));

    let report = FlipEngine::new(
        RunConfig::new(&input, &output, request).with_policy(ProbabilityPolicy::Passthrough),
    )
    .resolve_rate()
    .unwrap();
    assert!(report.probability > 1.0);
}

#[test]
fn test_output_parent_directories_are_created() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(&temp_dir, "in.bin", 64);
    let output = temp_dir.path().join("nested").join("deeper").join("out.bin");

    let mut corruptor = Corruptor::new(ChaCha20Rng::seed_from_u64(1), Semantics::PerByte);
    let stats = corrupt_file(&input, &output, 0.0, &mut corruptor).unwrap();

    assert_eq!(stats.bytes_processed, 64);
    assert_eq!(std::fs::read(&output).unwrap().len(), 64);
}

#[test]
fn test_in_place_corruption_keeps_length() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_input(&temp_dir, "same.bin", 4_096);

    let mut corruptor = Corruptor::new(ChaCha20Rng::seed_from_u64(5), Semantics::PerByte);
    let stats = corrupt_file(&path, &path, 1.0, &mut corruptor).unwrap();

    assert_eq!(stats.bytes_flipped, 4_096);
    assert_eq!(std::fs::read(&path).unwrap().len(), 4_096);
}

#[test]
fn test_report_serializes_to_json() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(&temp_dir, "in.bin", 128);
    let output = temp_dir.path().join("out.bin");

    let request = RateRequest {
        location: Some("LEO".to_string()),
        years: Some(5.0),
        ..Default::default()
    };
    let report = FlipEngine::new(RunConfig::new(&input, &output, request).with_seed(9))
        .run()
        .unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["seed"], 9);
    assert_eq!(json["semantics"], "per-bit");
    assert_eq!(json["rate"]["source"]["mode"], "location");
    assert_eq!(json["rate"]["source"]["location"], "LEO");
    assert_eq!(json["stats"]["bytes_processed"], 128);
}
