use ingest::GroundTruthExample;

/// Built-in expert-annotated examples used when no ground-truth file is
/// supplied. Kept small on purpose; real runs load a curated set.
pub fn default_test_set() -> Vec<GroundTruthExample> {
    vec![
        GroundTruthExample::new(
            "Can I take aspirin and warfarin together?",
            &["aspirin", "warfarin"],
            "HIGH",
            &["bleeding", "anticoagulant"],
        ),
        GroundTruthExample::new(
            "Is it safe to combine ibuprofen with lisinopril?",
            &["ibuprofen", "lisinopril"],
            "MODERATE",
            &["blood pressure", "kidney"],
        ),
        GroundTruthExample::new(
            "What happens if I take metformin with insulin?",
            &["metformin", "insulin"],
            "LOW",
            &["blood sugar", "hypoglycemia"],
        ),
        GroundTruthExample::new(
            "Can I drink alcohol while on metronidazole?",
            &["alcohol", "metronidazole"],
            "MODERATE",
            &["nausea", "reaction"],
        ),
        GroundTruthExample::new(
            "Does vitamin C interact with aspirin?",
            &["vitamin c", "aspirin"],
            "LOW",
            &["absorption"],
        ),
        GroundTruthExample::new(
            "Is sertraline dangerous with naproxen?",
            &["sertraline", "naproxen"],
            "MODERATE",
            &["bleeding", "serotonin"],
        ),
        GroundTruthExample::new(
            "Can I eat grapefruit while taking simvastatin?",
            &["grapefruit", "simvastatin"],
            "HIGH",
            &["muscle", "statin"],
        ),
        GroundTruthExample::new(
            "Is acetaminophen safe with ibuprofen?",
            &["acetaminophen", "ibuprofen"],
            "LOW",
            &["safe", "pain"],
        ),
    ]
}
