//! Query expansion from fixed drug-class and synonym lookup tables.
//!
//! A question about "blood thinners" never mentions "warfarin" by name;
//! appending representative class members and brand/generic synonyms to the
//! query text is what lets the vector store find the right records.

/// Drug classes and representative members. The first three members of a
/// matched class are appended to the query.
const DRUG_CLASSES: &[(&str, &[&str])] = &[
    ("anticoagulant", &["warfarin", "heparin", "apixaban", "rivaroxaban"]),
    ("blood thinner", &["warfarin", "heparin", "aspirin", "clopidogrel"]),
    ("nsaid", &["ibuprofen", "naproxen", "diclofenac", "celecoxib"]),
    ("anti-inflammatory", &["ibuprofen", "naproxen", "aspirin"]),
    ("ssri", &["fluoxetine", "sertraline", "paroxetine", "citalopram"]),
    ("antidepressant", &["fluoxetine", "sertraline", "paroxetine", "amitriptyline"]),
    ("antihypertensive", &["lisinopril", "amlodipine", "metoprolol", "losartan"]),
    ("blood pressure medication", &["lisinopril", "amlodipine", "metoprolol"]),
    ("ace inhibitor", &["lisinopril", "enalapril", "ramipril"]),
    ("beta blocker", &["metoprolol", "atenolol", "propranolol"]),
    ("statin", &["atorvastatin", "simvastatin", "rosuvastatin"]),
    ("cholesterol medication", &["atorvastatin", "simvastatin", "rosuvastatin"]),
    ("antidiabetic", &["metformin", "insulin", "glipizide"]),
    ("diabetes medication", &["metformin", "insulin", "glipizide"]),
    ("antibiotic", &["amoxicillin", "azithromycin", "ciprofloxacin"]),
];

/// Generic-name to brand/alternate-name synonyms. The first two synonyms of
/// a matched drug are appended to the query.
const DRUG_SYNONYMS: &[(&str, &[&str])] = &[
    ("acetaminophen", &["paracetamol", "tylenol"]),
    ("paracetamol", &["acetaminophen", "tylenol"]),
    ("aspirin", &["acetylsalicylic acid", "asa"]),
    ("ibuprofen", &["advil", "motrin"]),
    ("warfarin", &["coumadin", "jantoven"]),
    ("metformin", &["glucophage", "fortamet"]),
    ("atorvastatin", &["lipitor"]),
    ("simvastatin", &["zocor"]),
    ("lisinopril", &["prinivil", "zestril"]),
    ("amlodipine", &["norvasc"]),
    ("metoprolol", &["lopressor", "toprol"]),
    ("omeprazole", &["prilosec"]),
    ("fluoxetine", &["prozac"]),
    ("sertraline", &["zoloft"]),
    ("insulin", &["humalog", "lantus"]),
];

/// Expand a query with class members and synonyms for any class name or
/// drug name it mentions. Returns the query unchanged when nothing matches.
pub fn expand_query(query: &str) -> String {
    let query_lower = query.to_lowercase();
    let mut expansions: Vec<&str> = Vec::new();

    for (class_name, members) in DRUG_CLASSES {
        if query_lower.contains(class_name) {
            expansions.extend(members.iter().take(3));
        }
    }

    for (drug, synonyms) in DRUG_SYNONYMS {
        if query_lower.contains(drug) {
            expansions.extend(synonyms.iter().take(2));
        }
    }

    if expansions.is_empty() {
        return query.to_string();
    }

    format!("{} {}", query, expansions.join(" "))
}
