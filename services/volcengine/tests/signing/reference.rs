//! A straightforward rendition of the signing scheme built directly on
//! `hmac` and `sha2`, used to cross check the library.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

fn hmac(key: &[u8], data: &str) -> Vec<u8> {
    let mut mac = Hmac::<Sha256>::new_from_slice(key).expect("hmac accepts any key size");
    mac.update(data.as_bytes());
    mac.finalize().into_bytes().to_vec()
}

#[allow(clippy::too_many_arguments)]
pub fn authorization(
    ak: &str,
    sk: &str,
    region: &str,
    service: &str,
    host: &str,
    query: &str,
    body: &[u8],
    x_date: &str,
) -> String {
    let date = &x_date[..8];
    let payload_hash = hex::encode(Sha256::digest(body));

    let canonical_request = format!(
        "POST\n/\n{query}\ncontent-type:application/json\nhost:{host}\nx-content-sha256:{payload_hash}\nx-date:{x_date}\n\ncontent-type;host;x-content-sha256;x-date\n{payload_hash}"
    );
    let scope = format!("{date}/{region}/{service}/request");
    let string_to_sign = format!(
        "HMAC-SHA256\n{x_date}\n{scope}\n{}",
        hex::encode(Sha256::digest(canonical_request.as_bytes()))
    );

    let k_date = hmac(sk.as_bytes(), date);
    let k_region = hmac(&k_date, region);
    let k_service = hmac(&k_region, service);
    let k_signing = hmac(&k_service, "request");
    let signature = hex::encode(hmac(&k_signing, &string_to_sign));

    format!(
        "HMAC-SHA256 Credential={ak}/{scope}, SignedHeaders=content-type;host;x-content-sha256;x-date, Signature={signature}"
    )
}
