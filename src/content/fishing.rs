use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

pub const FISHING_FACTS: [&str; 10] = [
    "There are over 32,000 known species of fish in the world!",
    "The oldest known fishing hook is about 42,000 years old.",
    "Some fish can recognize themselves in mirrors, showing self-awareness.",
    "The largest fish ever caught was a great white shark weighing 3,427 pounds.",
    "Fish have been on Earth for more than 500 million years.",
    "Some fish, like the cleaner wrasse, use tools to open shellfish.",
    "The fastest fish is the sailfish, which can swim up to 68 mph.",
    "Many fish can see ultraviolet and polarized light.",
    "The oldest known fishing reel appeared in China around 300 AD.",
    "Some fish, like salmon, can jump up to 12 feet high!",
];

pub fn random_fact() -> &'static str {
    FISHING_FACTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(FISHING_FACTS[0])
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FishingSpot {
    pub name: String,
    pub location: String,
    pub fish: Vec<String>,
    pub description: String,
    pub coordinates: Coordinates,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

fn spot(
    name: &str,
    location: &str,
    fish: &[&str],
    description: &str,
    lat: f64,
    lng: f64,
) -> FishingSpot {
    FishingSpot {
        name: name.to_string(),
        location: location.to_string(),
        fish: fish.iter().map(|f| f.to_string()).collect(),
        description: description.to_string(),
        coordinates: Coordinates { lat, lng },
    }
}

/// Spots around Knoxville.
pub fn local_spots() -> Vec<FishingSpot> {
    vec![
        spot(
            "Holston River Park",
            "Knoxville, TN",
            &["Bass", "Catfish", "Crappie"],
            "Great spot with easy access and plenty of fish",
            35.9606,
            -83.9207,
        ),
        spot(
            "Volunteer Landing Park",
            "Knoxville, TN",
            &["Bluegill", "Bass", "Catfish"],
            "Family-friendly with picnic areas",
            35.9634,
            -83.9180,
        ),
        spot(
            "Concord Park",
            "Farragut, TN",
            &["Trout", "Bass", "Sunfish"],
            "Beautiful lakeside fishing with trails",
            35.8845,
            -84.1513,
        ),
        spot(
            "Fort Loudoun Lake",
            "Lenoir City, TN",
            &["Striped Bass", "Crappie", "Walleye"],
            "Large lake with boat ramps available",
            35.7956,
            -84.2503,
        ),
    ]
}
