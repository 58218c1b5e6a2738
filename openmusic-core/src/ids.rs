use uuid::Uuid;

/// Generate a record id like `album-3f2a...`.
///
/// Ids are stored as text so the prefix makes rows self-describing in logs
/// and queue messages.
pub fn generate_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_carry_prefix() {
        let id = generate_id("album");
        assert!(id.starts_with("album-"));
        assert_eq!(id.len(), "album-".len() + 32);
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(generate_id("song"), generate_id("song"));
    }
}
