//! Random token generation

use rand::Rng;

use crate::constants::QR_CODE_LENGTH;

const QR_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate a random uppercase alphanumeric token of `length` characters
pub fn generate_token<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..QR_CHARSET.len());
            QR_CHARSET[idx] as char
        })
        .collect()
}

/// Generate a candidate QR code identifier
pub fn generate_qr_code() -> String {
    generate_token(&mut rand::rng(), QR_CODE_LENGTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn test_generate_qr_code() {
        let code = generate_qr_code();

        assert_eq!(code.len(), QR_CODE_LENGTH);
        assert!(
            code.chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        );
    }

    #[test]
    fn test_seeded_tokens_repeat() {
        let a = generate_token(&mut StdRng::seed_from_u64(7), 12);
        let b = generate_token(&mut StdRng::seed_from_u64(7), 12);
        assert_eq!(a, b);
    }
}
