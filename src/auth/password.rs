use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::Rng;

/// Hash a password for storage as a PHC string.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Verify a password against a stored PHC hash. An unparseable hash counts
/// as a failed verification rather than an error the caller must handle.
pub fn verify_password(hash: &str, password: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

const TEMP_PASSWORD_LEN: usize = 12;
const TEMP_PASSWORD_CHARSET: &[u8] =
    b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghjkmnpqrstuvwxyz23456789";

/// Generate a temporary credential for admin-created author accounts.
/// Ambiguous characters (0/O, 1/l/I) are excluded since these get handed
/// off out-of-band.
pub fn generate_temp_password() -> String {
    let mut rng = rand::thread_rng();
    (0..TEMP_PASSWORD_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..TEMP_PASSWORD_CHARSET.len());
            TEMP_PASSWORD_CHARSET[idx] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{generate_temp_password, hash_password, verify_password};

    #[test]
    fn test_hash_password() {
        let hashed = hash_password("secret").unwrap();
        assert!(verify_password(&hashed, "secret"));
        assert!(!verify_password(&hashed, "wrong"));
    }

    #[test]
    fn test_bad_hash_fails_closed() {
        assert!(!verify_password("not-a-phc-string", "secret"));
    }

    #[test]
    fn test_temp_password_shape() {
        let pw = generate_temp_password();
        assert_eq!(pw.len(), 12);
        assert!(pw.bytes().all(|b| b.is_ascii_alphanumeric()));
    }
}
