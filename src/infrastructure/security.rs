use actix_web::cookie::{Cookie, CookieJar, Key};
use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use rand_core::OsRng;
use sha2::{Digest, Sha512};
use uuid::Uuid;

// Argon2 parameters for 50-150ms target latency
const ARGON2_M_COST: u32 = 19456; // 19 MB
const ARGON2_T_COST: u32 = 2; // 2 iterations
const ARGON2_P_COST: u32 = 1; // 1 parallelism

fn argon2() -> Result<Argon2<'static>, argon2::password_hash::Error> {
    Ok(Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        argon2::Params::new(ARGON2_M_COST, ARGON2_T_COST, ARGON2_P_COST, None)
            .map_err(argon2::password_hash::Error::from)?,
    ))
}

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = argon2()?.hash_password(password.as_bytes(), &salt)?;
    Ok(password_hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    match argon2()?.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(_) => Ok(false),
    }
}

/// Opaque, unguessable session id (122 random bits).
pub fn generate_session_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Derives the cookie signing key from the configured session secret.
/// SHA-512 stretches secrets of any length to the 64 bytes `Key` needs.
pub fn derive_cookie_key(secret: &str) -> Result<Key, actix_web::cookie::KeyError> {
    let digest = Sha512::digest(secret.as_bytes());
    Key::try_from(digest.as_slice())
}

/// Returns a copy of `cookie` whose value carries an HMAC signature.
pub fn sign_cookie(key: &Key, cookie: Cookie<'static>) -> Option<Cookie<'static>> {
    let name = cookie.name().to_string();
    let mut jar = CookieJar::new();
    jar.signed_mut(key).add(cookie);
    jar.get(&name).cloned()
}

/// Verifies a signed cookie and returns its original value.
pub fn verify_cookie(key: &Key, cookie: Cookie<'static>) -> Option<String> {
    let name = cookie.name().to_string();
    let mut jar = CookieJar::new();
    jar.add_original(cookie);
    jar.signed(key).get(&name).map(|c| c.value().to_string())
}
