use rand::Rng;
use rand::seq::SliceRandom;

const PREFIXES: &[&str] = &[
    "amber", "bold", "brisk", "cosmic", "dapper", "eager", "fancy", "fuzzy", "gentle", "giddy",
    "happy", "jolly", "lucky", "mellow", "nimble", "plucky", "quirky", "rapid", "silly", "snappy",
    "sunny", "swift", "tidy", "witty", "zesty",
];

const SUFFIXES: &[&str] = &[
    "badger", "beaver", "cobra", "crane", "falcon", "ferret", "gecko", "heron", "ibis", "koala",
    "lemur", "lynx", "marmot", "narwhal", "otter", "panda", "puffin", "quokka", "raven", "salmon",
    "tapir", "toucan", "walrus", "wombat", "yak",
];

/// Generate a random lowercase cluster name such as `fuzzyotter`
pub fn generate_cluster_name() -> String {
    generate_cluster_name_with(&mut rand::thread_rng())
}

pub fn generate_cluster_name_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    let prefix = PREFIXES.choose(rng).copied().unwrap_or("silly");
    let suffix = SUFFIXES.choose(rng).copied().unwrap_or("otter");
    format!("{}{}", prefix, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_generated_name_is_lowercase_word() {
        for _ in 0..50 {
            let name = generate_cluster_name();
            assert!(!name.is_empty());
            assert!(name.chars().all(|c| c.is_ascii_lowercase()), "{}", name);
        }
    }

    #[test]
    fn test_same_seed_same_name() {
        let a = generate_cluster_name_with(&mut StdRng::seed_from_u64(7));
        let b = generate_cluster_name_with(&mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_word_lists_are_clean() {
        for word in PREFIXES.iter().chain(SUFFIXES.iter()) {
            assert!(word.chars().all(|c| c.is_ascii_lowercase()), "{}", word);
        }
    }
}
