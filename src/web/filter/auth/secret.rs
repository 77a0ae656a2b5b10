use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use constant_time_eq::constant_time_eq;
use digest::Digest;
use md5::Md5;
use sha1::Sha1;

const SHA_PREFIX: &str = "{SHA}";
const APR1_PREFIX: &str = "$apr1$";
const MD5_CRYPT_PREFIX: &str = "$1$";

const SALT_LEN_MAX: usize = 8;
const MD5_LENGTH: usize = 16;
const CRYPT_HASH_LEN: usize = 22;

const CRYPT_B64: &[u8; 64] = b"./0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// 저장된 비밀값의 형식
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretKind {
    /// `$2a$`, `$2b$`, `$2y$`
    Bcrypt,
    /// `{SHA}` + base64(sha1)
    Sha1,
    /// `$apr1$` 또는 `$1$` MD5-crypt
    Md5Crypt,
    Plain,
}

impl SecretKind {
    pub fn detect(secret: &str) -> Self {
        if secret.starts_with("$2") {
            SecretKind::Bcrypt
        } else if secret.starts_with(SHA_PREFIX) {
            SecretKind::Sha1
        } else if secret.starts_with(APR1_PREFIX) || secret.starts_with(MD5_CRYPT_PREFIX) {
            SecretKind::Md5Crypt
        } else {
            SecretKind::Plain
        }
    }
}

/// 평문 비밀번호가 저장된 비밀값과 일치하는지 검사합니다.
///
/// 형식이 깨진 해시는 어떤 비밀번호와도 일치하지 않습니다.
pub fn check_secret(password: &str, secret: &str) -> bool {
    match SecretKind::detect(secret) {
        SecretKind::Bcrypt => bcrypt::verify(password, secret).unwrap_or(false),
        SecretKind::Sha1 => {
            let digest = Sha1::digest(password.as_bytes());
            let encoded = BASE64.encode(digest);
            constant_time_eq(encoded.as_bytes(), secret[SHA_PREFIX.len()..].as_bytes())
        }
        SecretKind::Md5Crypt => {
            let magic = if secret.starts_with(APR1_PREFIX) {
                APR1_PREFIX
            } else {
                MD5_CRYPT_PREFIX
            };
            match parse_md5_crypt(&secret[magic.len()..]) {
                Some((salt, hash)) => {
                    let computed = md5_crypt_hash(password.as_bytes(), magic, salt);
                    constant_time_eq(computed.as_bytes(), hash.as_bytes())
                }
                None => false,
            }
        }
        SecretKind::Plain => constant_time_eq(password.as_bytes(), secret.as_bytes()),
    }
}

/// `salt$hash` 를 분리합니다.
fn parse_md5_crypt(v: &str) -> Option<(&str, &str)> {
    let (salt, hash) = v.split_once('$')?;
    if salt.is_empty() || salt.len() > SALT_LEN_MAX || hash.len() != CRYPT_HASH_LEN {
        return None;
    }
    Some((salt, hash))
}

/// `magic + salt + '$' + hash` 형태의 MD5-crypt 문자열을 만듭니다.
pub fn md5_crypt(password: &str, magic: &str, salt: &str) -> String {
    let salt = salt.char_indices()
        .nth(SALT_LEN_MAX)
        .map(|(i, _)| &salt[..i])
        .unwrap_or(salt);
    format!("{}{}${}", magic, salt, md5_crypt_hash(password.as_bytes(), magic, salt))
}

/// htpasswd `-m` 로 만든 것과 같은 형식의 `$apr1$` 해시를 만듭니다.
pub fn apr1(password: &str, salt: &str) -> String {
    md5_crypt(password, APR1_PREFIX, salt)
}

/// `{SHA}` 형식의 해시를 만듭니다.
pub fn sha1(password: &str) -> String {
    format!("{}{}", SHA_PREFIX, BASE64.encode(Sha1::digest(password.as_bytes())))
}

fn md5_crypt_hash(phrase: &[u8], magic: &str, salt: &str) -> String {
    let mut digest = Md5::new();
    digest.update(phrase);
    digest.update(salt.as_bytes());
    digest.update(phrase);
    let alternate = digest.finalize();

    let mut digest = Md5::new();
    digest.update(phrase);
    digest.update(magic.as_bytes());
    digest.update(salt.as_bytes());

    let mut plen = phrase.len();
    while plen > MD5_LENGTH {
        digest.update(alternate);
        plen -= MD5_LENGTH;
    }
    if plen > 0 {
        digest.update(&alternate[..plen]);
    }

    // 비밀번호 길이의 각 비트마다 0 바이트 또는 첫 글자를 넣는다 (원 구현과의 호환)
    plen = phrase.len();
    while plen > 0 {
        if plen & 1 == 0 {
            digest.update(&phrase[..1]);
        } else {
            digest.update([0u8]);
        }
        plen >>= 1;
    }

    let mut hash = digest.finalize();

    for r in 0..1000 {
        let mut digest = Md5::new();
        if r & 1 == 0 {
            digest.update(hash);
        } else {
            digest.update(phrase);
        }
        if r % 3 != 0 {
            digest.update(salt.as_bytes());
        }
        if r % 7 != 0 {
            digest.update(phrase);
        }
        if r & 1 == 0 {
            digest.update(phrase);
        } else {
            digest.update(hash);
        }
        hash = digest.finalize();
    }

    let mut out = String::with_capacity(CRYPT_HASH_LEN);
    push_b64(&mut out, hash[0], hash[6], hash[12], 4);
    push_b64(&mut out, hash[1], hash[7], hash[13], 4);
    push_b64(&mut out, hash[2], hash[8], hash[14], 4);
    push_b64(&mut out, hash[3], hash[9], hash[15], 4);
    push_b64(&mut out, hash[4], hash[10], hash[5], 4);
    push_b64(&mut out, 0, 0, hash[11], 2);
    out
}

fn push_b64(out: &mut String, b2: u8, b1: u8, b0: u8, n: usize) {
    let mut w = ((b2 as u32) << 16) | ((b1 as u32) << 8) | (b0 as u32);
    for _ in 0..n {
        out.push(CRYPT_B64[(w & 0x3f) as usize] as char);
        w >>= 6;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_kind() {
        assert_eq!(SecretKind::detect("$2y$05$abc"), SecretKind::Bcrypt);
        assert_eq!(SecretKind::detect("{SHA}qvTGHdzF6KLavt4PO0gs2a6pQ00="), SecretKind::Sha1);
        assert_eq!(SecretKind::detect("$apr1$salt$hash"), SecretKind::Md5Crypt);
        assert_eq!(SecretKind::detect("$1$salt$hash"), SecretKind::Md5Crypt);
        assert_eq!(SecretKind::detect("hunter2"), SecretKind::Plain);
    }

    #[test]
    fn test_plain_secret() {
        assert!(check_secret("hunter2", "hunter2"));
        assert!(!check_secret("hunter3", "hunter2"));
        assert!(!check_secret("", "hunter2"));
    }

    #[test]
    fn test_sha1_secret() {
        // sha1("hello")
        let secret = "{SHA}qvTGHdzF6KLavt4PO0gs2a6pQ00=";
        assert_eq!(sha1("hello"), secret);
        assert!(check_secret("hello", secret));
        assert!(!check_secret("hell0", secret));
    }

    #[test]
    fn test_md5_crypt_secret() {
        let secret = apr1("hello", "a0j62R97");
        assert!(secret.starts_with("$apr1$a0j62R97$"));
        assert_eq!(secret.len(), "$apr1$a0j62R97$".len() + CRYPT_HASH_LEN);
        assert!(check_secret("hello", &secret));
        assert!(!check_secret("hello!", &secret));

        // magic 이 다르면 같은 salt 라도 다른 해시
        let classic = md5_crypt("hello", MD5_CRYPT_PREFIX, "a0j62R97");
        assert_ne!(&classic[3..], &secret[6..]);
        assert!(check_secret("hello", &classic));
    }

    #[test]
    fn test_long_password_md5_crypt() {
        let password = "a-password-longer-than-sixteen-bytes";
        let secret = apr1(password, "xyz");
        assert!(check_secret(password, &secret));
        assert!(!check_secret(&password[1..], &secret));
    }

    #[test]
    fn test_md5_crypt_matches_openssl_output() {
        // openssl passwd -apr1 / -1 결과
        assert_eq!(apr1("hello", "a0j62R97"), "$apr1$a0j62R97$CmCSzMOCTKR9qlMaLtgD3.");
        assert_eq!(
            md5_crypt("hello", MD5_CRYPT_PREFIX, "a0j62R97"),
            "$1$a0j62R97$uPy90S8k7QeQNbx97kWC71"
        );
        assert_eq!(
            apr1("a-password-longer-than-sixteen-bytes", "xyz"),
            "$apr1$xyz$bIbO5Plz8SNreisSzU5yi/"
        );
        assert!(check_secret("", "$apr1$fHxP13Ee$6MieUS7WPR9TLru8soHDS0"));
        assert!(check_secret("hello", "$apr1$a0j62R97$CmCSzMOCTKR9qlMaLtgD3."));
    }

    #[test]
    fn test_malformed_hashes_never_match() {
        assert!(!check_secret("hello", "$apr1$nohash"));
        assert!(!check_secret("hello", "$apr1$$AmhephVqLTUyAVpFQeHZC0"));
        assert!(!check_secret("hello", "$2y$05$broken"));
        assert!(!check_secret("hello", "{SHA}"));
    }

    #[test]
    fn test_bcrypt_secret() {
        let hash = bcrypt::hash("password", 4).unwrap();
        assert!(check_secret("password", &hash));
        assert!(!check_secret("wrong", &hash));
    }
}
