use rand::Rng;

/// Short, user-typable campaign id: 6 lowercase hex characters drawn from
/// process entropy. Collisions are unlikely at this product's scale but
/// not impossible; the id is only unique for practical purposes.
pub fn generate_giveaway_id() -> String {
    let bytes: [u8; 3] = rand::rng().random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_six_hex_chars() {
        for _ in 0..100 {
            let id = generate_giveaway_id();
            assert_eq!(id.len(), 6);
            assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        }
    }
}
