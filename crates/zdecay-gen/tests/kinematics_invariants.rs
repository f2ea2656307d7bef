use proptest::prelude::*;
use zdecay_core::{Event, RngHandle, ThreeVector};
use zdecay_gen::{
    decay_event, rest_frame_pair, EventGenerator, GeneratorConfig, PhysicsParams, SeedPolicy,
};

fn unsmeared_config(seed: u64) -> GeneratorConfig {
    GeneratorConfig {
        events: 5_000,
        chunk_size: 512,
        physics: PhysicsParams::default().without_smearing(),
        seed_policy: SeedPolicy {
            master_seed: seed,
            label: None,
        },
        ..GeneratorConfig::default()
    }
}

#[test]
fn pair_mass_matches_resonance_mass_without_smearing() {
    let events = EventGenerator::new(unsmeared_config(2024))
        .unwrap()
        .generate()
        .unwrap();
    for event in &events {
        let m = event.resonance_mass;
        let reconstructed = event.dilepton_mass();
        assert!(
            (reconstructed - m).abs() <= 1e-9 * m.abs().max(1.0),
            "mass {m} reconstructed as {reconstructed}"
        );
    }
}

#[test]
fn negative_tail_mass_reconstructs_with_its_sign() {
    let mut rng = RngHandle::from_seed(5);
    let (a, b) = rest_frame_pair(-90.0, 0.000511, &mut rng).unwrap();
    let beta = ThreeVector::new(0.3, 0.0, 0.4);
    let event = Event {
        resonance_mass: -90.0,
        lepton_a: a.boost(beta).unwrap(),
        lepton_b: b.boost(beta).unwrap(),
        transverse_momentum: 0.0,
    };
    assert!(event.pair().e < 0.0);
    let reconstructed = event.dilepton_mass();
    assert!(
        (reconstructed + 90.0).abs() <= 1e-9 * 90.0,
        "reconstructed {reconstructed}"
    );
}

#[test]
fn wide_lineshape_run_reconstructs_negative_masses() {
    let mut config = unsmeared_config(2024);
    config.physics.natural_width = 200.0;
    config.physics.lepton_mass = 0.0;
    let events = EventGenerator::new(config).unwrap().generate().unwrap();
    // Masses within 1 GeV of zero lose digits to cancellation in E² - p².
    let negative: Vec<_> = events.iter().filter(|e| e.resonance_mass < -1.0).collect();
    assert!(!negative.is_empty());
    for event in negative {
        let m = event.resonance_mass;
        let reconstructed = event.dilepton_mass();
        assert!(
            (reconstructed - m).abs() <= 1e-9 * m.abs(),
            "mass {m} reconstructed as {reconstructed}"
        );
    }
}

#[test]
fn leptons_stay_on_mass_shell_without_smearing() {
    let events = EventGenerator::new(unsmeared_config(7))
        .unwrap()
        .generate()
        .unwrap();
    for event in &events {
        for lepton in [event.lepton_a, event.lepton_b] {
            let scale = lepton.e * lepton.e;
            assert!((lepton.mass2() - 0.000511f64.powi(2)).abs() <= 1e-12 * scale.max(1.0));
        }
    }
}

#[test]
fn pair_transverse_momentum_matches_resonance() {
    let events = EventGenerator::new(unsmeared_config(99))
        .unwrap()
        .generate()
        .unwrap();
    for event in &events {
        let pair = event.pair();
        assert!((pair.pt() - event.transverse_momentum).abs() < 1e-9 * pair.e.max(1.0));
    }
}

#[test]
fn resting_resonance_decays_back_to_back() {
    let physics = PhysicsParams {
        central_mass: 91.1876,
        natural_width: 2.4952,
        lepton_mass: 0.000511,
        pt_mean: 0.0,
        rapidity_max: 0.0,
        smearing_fraction: 0.0,
    };
    let config = GeneratorConfig {
        events: 1,
        physics,
        seed_policy: SeedPolicy {
            master_seed: 12345,
            label: None,
        },
        ..GeneratorConfig::default()
    };
    let events = EventGenerator::new(config).unwrap().generate().unwrap();
    assert_eq!(events.len(), 1);
    let event = events[0];

    assert_eq!(event.transverse_momentum, 0.0);
    assert_eq!(event.lepton_a.e, event.lepton_b.e);
    assert_eq!(event.lepton_a.e, event.resonance_mass / 2.0);
    assert_eq!(event.lepton_a.momentum(), -event.lepton_b.momentum());
}

proptest! {
    #[test]
    fn smeared_energy_tracks_unsmeared_energy(seed in any::<u64>()) {
        let physics = PhysicsParams::default();
        let mut smeared_rng = RngHandle::from_seed(seed);
        let mut clean_rng = RngHandle::from_seed(seed);
        let smeared = decay_event(&physics, &mut smeared_rng).unwrap();
        let clean = decay_event(&physics.without_smearing(), &mut clean_rng).unwrap();
        // 2% resolution: a 10 sigma excursion would be a 20% shift.
        prop_assert!((smeared.lepton_a.e / clean.lepton_a.e - 1.0).abs() < 0.2);
        prop_assert!((smeared.lepton_b.e / clean.lepton_b.e - 1.0).abs() < 0.2);
    }
}

#[test]
fn below_threshold_sample_names_event_and_chunk() {
    for workers in [1, 4] {
        let config = GeneratorConfig {
            events: 200,
            chunk_size: 16,
            workers,
            physics: PhysicsParams {
                central_mass: 2.0,
                natural_width: 4.0,
                lepton_mass: 0.9,
                ..PhysicsParams::default()
            },
            seed_policy: SeedPolicy {
                master_seed: 11,
                label: None,
            },
        };
        let err = EventGenerator::new(config).unwrap().generate().unwrap_err();
        let info = err.info();
        assert_eq!(info.code, "negative-radicand");
        assert_eq!(info.context["stage"], "generate");
        let event: usize = info.context["event"].parse().unwrap();
        let chunk: usize = info.context["chunk"].parse().unwrap();
        assert!(event < 200);
        assert_eq!(event / 16, chunk);
        let mass: f64 = info.context["resonance_mass"].parse().unwrap();
        assert!(mass.abs() < 1.8, "mass {mass}");
    }
}
