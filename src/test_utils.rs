//! Shared fixtures for unit tests.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::grading::types::{Evaluation, Grade};

pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// A short essay with six distinct sentences.
pub fn sample_essay() -> String {
    [
        "Industrialiseringen ændrede det danske samfund markant.",
        "Mange flyttede fra landet til byerne for at finde arbejde.",
        "Fabrikkerne krævede lange arbejdsdage under hårde forhold.",
        "Arbejderbevægelsen voksede som en reaktion på disse vilkår.",
        "Jeg mener at reformerne kom for sent for mange familier!",
        "Hvordan ville udviklingen have set ud uden jernbanen?",
    ]
    .join(" ")
}

/// A longer essay with enough distinct sentences to feed several synthesized items.
pub fn long_essay() -> String {
    let topics = [
        "klimaforandringerne",
        "havstigningen",
        "landbrugets udledning",
        "vindenergien",
        "elbilerne",
        "skovrejsningen",
        "fjernvarmen",
        "biodiversiteten",
    ];
    let mut sentences: Vec<String> = topics
        .iter()
        .enumerate()
        .map(|(i, topic)| format!("Afsnit {} handler om {} og dens betydning for Danmark.", i + 1, topic))
        .collect();
    sentences.extend(topics.iter().map(|topic| {
        format!("Kilderne viser tydeligt at {} kræver politisk handling nu.", topic)
    }));
    sentences.join(" ")
}

pub fn make_evaluation(grade: Grade, strengths: &[&str], improvements: &[&str]) -> Evaluation {
    Evaluation::new(
        grade,
        "Samlet vurdering",
        strengths.iter().map(|s| s.to_string()).collect(),
        improvements.iter().map(|s| s.to_string()).collect(),
    )
}
