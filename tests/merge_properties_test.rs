use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustml_profile::*;

const LABELS: [&str; 6] = ["ant", "bee", "cat", "dog", "eel", "fox"];

fn random_batch(rng: &mut StdRng, len: usize, pool: usize) -> Batch {
    let targets: Vec<&str> = (0..len).map(|_| LABELS[rng.gen_range(0..pool)]).collect();
    let predictions: Vec<&str> = (0..len).map(|_| LABELS[rng.gen_range(0..pool)]).collect();
    let scores: Vec<f64> = (0..len).map(|_| rng.gen_range(0.0..1.0)).collect();
    Batch::new(targets, predictions).with_scores(scores)
}

fn profile_of(batch: &Batch) -> ModelProfile {
    let mut profile = ModelProfile::new();
    profile
        .compute_metrics(&batch.targets, &batch.predictions, batch.scores.as_deref())
        .unwrap();
    profile
}

/// Labels and counts, the parts of a matrix that must match exactly.
fn counts(profile: &ModelProfile) -> (Vec<String>, Vec<Vec<u64>>) {
    match profile.metrics().confusion_matrix() {
        Some(cm) => (cm.labels().to_vec(), cm.count_table()),
        None => (Vec::new(), Vec::new()),
    }
}

#[test]
fn test_sequential_batches_match_concatenation() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..20 {
        let len_a = rng.gen_range(1..30);
        let len_b = rng.gen_range(1..30);
        let a = random_batch(&mut rng, len_a, 4);
        let b = random_batch(&mut rng, len_b, 6);

        let mut incremental = ModelProfile::new();
        for batch in [&a, &b] {
            incremental
                .compute_metrics(&batch.targets, &batch.predictions, batch.scores.as_deref())
                .unwrap();
        }

        let mut joined = a.clone();
        joined.extend(&b);
        assert_eq!(counts(&incremental), counts(&profile_of(&joined)));
    }
}

#[test]
fn test_merge_is_commutative_on_counts() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..20 {
        let len_a = rng.gen_range(1..40);
        let len_b = rng.gen_range(1..40);
        let pa = profile_of(&random_batch(&mut rng, len_a, 3));
        let pb = profile_of(&random_batch(&mut rng, len_b, 6));

        let ab = pa.merge(&pb).unwrap();
        let ba = pb.merge(&pa).unwrap();
        assert_eq!(counts(&ab), counts(&ba));
        assert_eq!(ab.model_type(), ba.model_type());
    }
}

#[test]
fn test_merge_is_associative_on_counts() {
    let mut rng = StdRng::seed_from_u64(23);
    for _ in 0..20 {
        let len_a = rng.gen_range(1..25);
        let len_b = rng.gen_range(1..25);
        let len_c = rng.gen_range(1..25);
        let p1 = profile_of(&random_batch(&mut rng, len_a, 2));
        let p2 = profile_of(&random_batch(&mut rng, len_b, 5));
        let p3 = profile_of(&random_batch(&mut rng, len_c, 6));

        let left = p1.merge(&p2).unwrap().merge(&p3).unwrap();
        let right = p1.merge(&p2.merge(&p3).unwrap()).unwrap();
        assert_eq!(counts(&left), counts(&right));
    }
}

#[test]
fn test_merge_matches_single_profile_over_all_data() {
    let mut rng = StdRng::seed_from_u64(42);
    let shards: Vec<Batch> = (0..8)
        .map(|_| {
            let len = rng.gen_range(1..50);
            random_batch(&mut rng, len, 6)
        })
        .collect();

    let profiles: Vec<ModelProfile> = shards.iter().map(profile_of).collect();
    let merged = ModelProfile::merge_all(&profiles).unwrap();

    let mut all = shards[0].clone();
    for shard in &shards[1..] {
        all.extend(shard);
    }
    let single = profile_of(&all);
    assert_eq!(counts(&merged), counts(&single));

    let cm = merged.metrics().confusion_matrix().unwrap();
    assert_eq!(cm.total(), all.len() as u64);
    let scored: u64 = cm
        .labels()
        .iter()
        .flat_map(|t| cm.labels().iter().map(move |p| (t, p)))
        .filter_map(|(t, p)| cm.cell(t, p))
        .map(Cell::score_count)
        .sum();
    assert_eq!(scored, all.len() as u64);

    let parallel = profile_shards(ModelType::Unknown, &shards, ProfileConfig::default()).unwrap();
    assert_eq!(counts(&parallel), counts(&single));
}

#[test]
fn test_empty_profile_is_identity() {
    let mut rng = StdRng::seed_from_u64(3);
    let profile = profile_of(&random_batch(&mut rng, 25, 6));
    let empty = ModelProfile::default();
    assert_eq!(profile.merge(&empty).unwrap(), profile);
    assert_eq!(empty.merge(&profile).unwrap(), profile);
}

#[test]
fn test_regression_merge_commutes() {
    let mut rng = StdRng::seed_from_u64(99);
    let mut batch = || {
        let len = rng.gen_range(1..30);
        let targets: Vec<f64> = (0..len).map(|_| rng.gen_range(-10.0..10.0)).collect();
        let predictions: Vec<f64> = (0..len).map(|_| rng.gen_range(-10.0..10.0)).collect();
        let mut profile = ModelProfile::new();
        profile.compute_metrics(&targets, &predictions, None).unwrap();
        profile
    };
    let (a, b, c) = (batch(), batch(), batch());

    let ab = a.merge(&b).unwrap();
    let ba = b.merge(&a).unwrap();
    let (x, y) = (ab.metrics().regression_metrics().unwrap(), ba.metrics().regression_metrics().unwrap());
    assert_eq!(x.count(), y.count());
    assert!((x.mean_squared_error() - y.mean_squared_error()).abs() < 1e-9);

    let left = ab.merge(&c).unwrap();
    let right = a.merge(&b.merge(&c).unwrap()).unwrap();
    let (l, r) = (left.metrics().regression_metrics().unwrap(), right.metrics().regression_metrics().unwrap());
    assert_eq!(l.count(), r.count());
    assert!((l.mean_absolute_error() - r.mean_absolute_error()).abs() < 1e-9);
    assert!((l.r_squared() - r.r_squared()).abs() < 1e-9);
}
