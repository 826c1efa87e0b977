use serde::{Deserialize, Serialize};

/// A named point of the collection registry. Loaded once at startup,
/// never mutated during a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub fn new(name: &str, lat: f64, lng: f64) -> Self {
        Location {
            name: name.to_string(),
            lat,
            lng,
        }
    }
}

/// 20 key locations across Kerala covering major cities, tourist spots and
/// transit hubs, spread across the state for good geographic coverage.
const KERALA_REGISTRY: [(&str, f64, f64); 20] = [
    // Northern Kerala
    ("Kasaragod", 12.4996, 74.9869),
    ("Kannur", 11.8745, 75.3704),
    ("Wayanad_Kalpetta", 11.6087, 76.0837),
    ("Kozhikode", 11.2588, 75.7804),
    // Central Kerala
    ("Malappuram", 11.0510, 76.0711),
    ("Palakkad", 10.7867, 76.6548),
    ("Thrissur", 10.5276, 76.2144),
    ("Guruvayur", 10.5943, 76.0410),
    // Kochi region
    ("Kochi_Ernakulam", 9.9312, 76.2673),
    ("Fort_Kochi", 9.9639, 76.2432),
    ("Aluva", 10.1004, 76.3570),
    // Southern Kerala
    ("Kottayam", 9.5916, 76.5222),
    ("Idukki_Munnar", 10.0889, 77.0595),
    ("Thekkady", 9.6000, 77.1667),
    ("Alappuzha", 9.4981, 76.3388),
    ("Pathanamthitta", 9.2648, 76.7870),
    ("Kollam", 8.8932, 76.6141),
    // Trivandrum region
    ("Thiruvananthapuram", 8.5241, 76.9366),
    ("Kovalam", 8.3988, 76.9780),
    ("Varkala", 8.7379, 76.7163),
];

pub fn kerala_locations() -> Vec<Location> {
    KERALA_REGISTRY
        .iter()
        .map(|&(name, lat, lng)| Location::new(name, lat, lng))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_size() {
        assert_eq!(kerala_locations().len(), 20);
    }

    #[test]
    fn test_registry_names_unique() {
        let locations = kerala_locations();
        for (i, a) in locations.iter().enumerate() {
            for b in &locations[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }
}
