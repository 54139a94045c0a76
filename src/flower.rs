use chrono::{DateTime, Utc};

/// One flashcard: a flower's names, its reference image, and how often it
/// has been answered fully correctly. `common_name` is the unique key.
#[derive(Clone, Debug, PartialEq)]
pub struct Flower {
    pub common_name: String,
    pub scientific_name: String,
    pub family: String,
    pub image_path: String,
    pub correct_count: u32,
}

impl Flower {
    pub fn new(
        common_name: impl Into<String>,
        scientific_name: impl Into<String>,
        family: impl Into<String>,
        image_path: impl Into<String>,
    ) -> Self {
        Flower {
            common_name: common_name.into(),
            scientific_name: scientific_name.into(),
            family: family.into(),
            image_path: image_path.into(),
            correct_count: 0,
        }
    }
}

/// The three name fields a card asks for, in prompt order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    CommonName,
    ScientificName,
    Family,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::CommonName, Field::ScientificName, Field::Family];

    pub fn label(&self) -> &'static str {
        match self {
            Field::CommonName => "Common name",
            Field::ScientificName => "Scientific name",
            Field::Family => "Family",
        }
    }

    pub fn solution<'a>(&self, flower: &'a Flower) -> &'a str {
        match self {
            Field::CommonName => &flower.common_name,
            Field::ScientificName => &flower.scientific_name,
            Field::Family => &flower.family,
        }
    }
}

/// One evaluated attempt: what was guessed, what would have been right,
/// and whether the whole card passed. Append-only.
#[derive(Clone, Debug, PartialEq)]
pub struct AnswerLogEntry {
    pub guess_common_name: String,
    pub guess_scientific_name: String,
    pub guess_family: String,
    pub common_name: String,
    pub scientific_name: String,
    pub family: String,
    pub all_correct: bool,
    pub answered_at: DateTime<Utc>,
}
