//! Room id generation
//!
//! Short human-readable ids in the `adjective-noun-number` pattern,
//! e.g. `quiet-harbor-482`. The combination space is large enough that
//! collisions against live rooms are a retry case, not an expected path.

use rand::Rng;

/// Pluggable source of candidate room ids
///
/// Uniqueness against live rooms is the `RoomManager`'s job, not the
/// generator's.
pub trait IdGenerator: Send + Sync {
    /// Produce one candidate id
    fn generate(&self) -> String;
}

const ADJECTIVES: &[&str] = &[
    "amber", "bold", "brave", "bright", "calm", "clever", "crisp", "eager",
    "faint", "fancy", "gentle", "golden", "happy", "humble", "jolly", "keen",
    "lively", "lucky", "mellow", "misty", "noble", "plain", "proud", "quiet",
    "rapid", "rustic", "silent", "silver", "sturdy", "sunny", "swift", "vivid",
];

const NOUNS: &[&str] = &[
    "anchor", "badger", "beacon", "brook", "canyon", "cedar", "comet", "coral",
    "falcon", "fern", "garden", "glacier", "harbor", "heron", "island", "lagoon",
    "lantern", "maple", "meadow", "orchid", "otter", "pebble", "pine", "prairie",
    "raven", "reef", "river", "sparrow", "summit", "thicket", "tide", "willow",
];

/// Word-based id generator: `adjective-noun-number`
///
/// Words come from embedded lists; the numeric suffix is a fixed-width
/// random decimal.
pub struct WordIdGenerator {
    number_len: u32,
}

impl WordIdGenerator {
    /// Default 3-digit suffix
    pub fn new() -> Self {
        Self::with_number_len(3)
    }

    /// Custom suffix width
    pub fn with_number_len(number_len: u32) -> Self {
        Self { number_len }
    }
}

impl Default for WordIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for WordIdGenerator {
    fn generate(&self) -> String {
        let mut rng = rand::thread_rng();
        let adjective = ADJECTIVES[rng.gen_range(0..ADJECTIVES.len())];
        let noun = NOUNS[rng.gen_range(0..NOUNS.len())];
        let number = rng.gen_range(0..10u64.pow(self.number_len));
        format!(
            "{}-{}-{:0width$}",
            adjective,
            noun,
            number,
            width = self.number_len as usize
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_pattern() {
        let generator = WordIdGenerator::new();
        for _ in 0..100 {
            let id = generator.generate();
            let parts: Vec<&str> = id.split('-').collect();
            assert_eq!(parts.len(), 3, "unexpected id shape: {}", id);
            assert!(ADJECTIVES.contains(&parts[0]));
            assert!(NOUNS.contains(&parts[1]));
            assert_eq!(parts[2].len(), 3);
            assert!(parts[2].chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_custom_number_len() {
        let generator = WordIdGenerator::with_number_len(5);
        let id = generator.generate();
        let suffix = id.rsplit('-').next().unwrap();
        assert_eq!(suffix.len(), 5);
    }
}
