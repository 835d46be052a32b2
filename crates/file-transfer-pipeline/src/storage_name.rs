//! Storage name generation.

use rand::Rng;
use std::time::{SystemTime, UNIX_EPOCH};

const FALLBACK_NAME: &str = "file";

/// Build a storage name `{unix_nanos}-{64 random bits}-{base name}`.
///
/// The random component keeps names distinct even when two uploads of the
/// same file land within one clock tick.
pub fn generate_storage_name(original_name: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let random: u64 = rand::thread_rng().gen();

    format!("{}-{:016x}-{}", nanos, random, base_name(original_name))
}

/// Last path component of a client-supplied file name.
fn base_name(original_name: &str) -> &str {
    let name = original_name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim();
    if name.is_empty() || name == "." || name == ".." {
        FALLBACK_NAME
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn keeps_original_base_name() {
        let name = generate_storage_name("report.pdf");
        assert!(name.ends_with("-report.pdf"));
        assert_eq!(name.splitn(3, '-').count(), 3);
    }

    #[test]
    fn strips_directories_from_client_names() {
        assert!(generate_storage_name("../../etc/passwd").ends_with("-passwd"));
        assert!(generate_storage_name("C:\\Users\\me\\photo.jpg").ends_with("-photo.jpg"));
        assert!(generate_storage_name("dir/").ends_with("-file"));
        assert!(generate_storage_name("..").ends_with("-file"));
    }

    #[test]
    fn concurrent_identical_names_never_collide() {
        let names: Vec<String> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| {
                        (0..500)
                            .map(|_| generate_storage_name("same.txt"))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect()
        });

        let unique: HashSet<&String> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
    }
}
