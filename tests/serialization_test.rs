use rustml_profile::*;

fn classification_profile() -> ModelProfile {
    let mut profile = ModelProfile::with_output_fields(["test"]);
    let fields = FieldNames::new("label", "predicted").with_score("confidence");
    profile
        .compute_metrics_with_fields(
            &["cat", "dog", "pig", "dog"],
            &["cat", "dog", "dog", "cat"],
            Some(&[0.1, 0.2, 0.4, 0.9][..]),
            &fields,
        )
        .unwrap();
    profile
}

#[test]
fn test_output_fields_survive_bytes() {
    let profile = ModelProfile::with_output_fields(["test"]);
    let decoded = ModelProfile::from_bytes(&profile.to_bytes().unwrap()).unwrap();
    assert_eq!(decoded.output_fields(), &["test"]);
    assert_eq!(decoded.model_type(), ModelType::Unknown);
}

#[test]
fn test_declared_type_survives_bytes() {
    let profile = ModelProfile::new().with_model_type(ModelType::Nlp);
    let decoded = ModelProfile::from_bytes(&profile.to_bytes().unwrap()).unwrap();
    assert_eq!(decoded.model_type(), ModelType::Nlp);
    assert!(!decoded.metrics().is_populated());
}

#[test]
fn test_confusion_matrix_survives_bytes() {
    let profile = classification_profile();
    let decoded = ModelProfile::from_bytes(&profile.to_bytes().unwrap()).unwrap();
    assert_eq!(decoded, profile);

    let cm = decoded.metrics().confusion_matrix().unwrap();
    assert_eq!(cm.labels(), &["cat", "dog", "pig"]);
    assert_eq!(cm.score_field(), Some("confidence"));
    let cell = cm.cell("pig", "dog").unwrap();
    assert_eq!(cell.count(), 1);
    assert_eq!(cell.score_min(), Some(0.4));
    assert_eq!(cell.score_max(), Some(0.4));
    assert_eq!(cm.cell("cat", "pig").unwrap().score_count(), 0);
}

#[test]
fn test_regression_survives_bytes() {
    let mut profile = ModelProfile::new();
    profile
        .compute_metrics(&[1.5, 2.0, -3.0], &[1.0, 2.5, -2.0], None)
        .unwrap();
    let decoded = ModelProfile::from_bytes(&profile.to_bytes().unwrap()).unwrap();
    assert_eq!(decoded, profile);
    let rm = decoded.metrics().regression_metrics().unwrap();
    assert_eq!(rm.count(), 3);
    assert!((rm.mean_absolute_error() - 2.0 / 3.0).abs() < 1e-12);
}

#[test]
fn test_decoded_profiles_keep_merging() {
    let a = classification_profile();
    let b = ModelProfile::from_bytes(&classification_profile().to_bytes().unwrap()).unwrap();
    let merged = a.merge(&b).unwrap();
    let restored = ModelProfile::from_bytes(&merged.to_bytes().unwrap()).unwrap();

    let again = restored.merge(&a).unwrap();
    let cm = again.metrics().confusion_matrix().unwrap();
    assert_eq!(cm.total(), 12);
    assert_eq!(cm.count("dog", "dog"), 3);
    assert_eq!(again.output_fields(), &["test", "test", "test"]);
}

#[test]
fn test_garbage_bytes_rejected() {
    assert!(matches!(
        ModelProfile::from_bytes(&[0xff, 0xff, 0xff]),
        Err(ProfileError::Decode(_))
    ));
}

#[test]
fn test_unsorted_labels_rejected() {
    let mut message = classification_profile().to_message();
    let matrix = message
        .metrics
        .as_mut()
        .and_then(|m| m.scored_matrix.as_mut())
        .unwrap();
    matrix.labels.swap(0, 1);
    assert!(matches!(
        ModelProfile::from_message(&message),
        Err(ProfileError::Decode(_))
    ));
}

#[test]
fn test_wrong_cell_count_rejected() {
    let mut message = classification_profile().to_message();
    let matrix = message
        .metrics
        .as_mut()
        .and_then(|m| m.scored_matrix.as_mut())
        .unwrap();
    matrix.cells.pop();
    let bytes = message.to_bytes().unwrap();
    assert!(matches!(
        ModelProfile::from_bytes(&bytes),
        Err(ProfileError::Decode(_))
    ));
}

#[test]
fn test_inconsistent_cell_rejected() {
    let mut message = classification_profile().to_message();
    let matrix = message
        .metrics
        .as_mut()
        .and_then(|m| m.scored_matrix.as_mut())
        .unwrap();
    matrix.cells[0].score_count = matrix.cells[0].count + 1;
    assert!(matches!(
        ModelProfile::from_message(&message),
        Err(ProfileError::Decode(_))
    ));
}

#[test]
fn test_regression_under_classification_rejected() {
    let message = ModelProfileMessage {
        output_fields: Vec::new(),
        metrics: Some(ModelMetricsMessage {
            model_type: ModelType::Classification,
            scored_matrix: None,
            regression_metrics: Some(RegressionMetricsMessage::default()),
        }),
    };
    assert!(matches!(
        ModelProfile::from_message(&message),
        Err(ProfileError::Decode(_))
    ));
}

#[test]
fn test_message_json_uses_snake_case_model_type() {
    let json = serde_json::to_value(classification_profile().to_message()).unwrap();
    assert_eq!(json["metrics"]["model_type"], "classification");
    assert_eq!(json["output_fields"][0], "test");
}

#[test]
fn test_huge_length_prefix_is_an_error_not_a_crash() {
    let corrupt = [0xFDu8, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x0f];
    assert!(matches!(
        ModelProfile::from_bytes(&corrupt),
        Err(ProfileError::Decode(_))
    ));
}
