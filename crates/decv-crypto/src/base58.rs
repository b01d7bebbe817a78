//! Base58Check encoding for extended key identifiers.
//!
//! Uses the Bitcoin alphabet (excludes 0, O, I, l to avoid confusion) and
//! appends the first four bytes of SHA256(SHA256(payload)) as a checksum.

#![forbid(unsafe_code)]

/// Encode bytes to a Base58Check string.
pub fn encode_check(data: &[u8]) -> String {
    bs58::encode(data).with_check().into_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_zeros_become_ones() {
        assert_eq!(encode_check(&[0, 0, 0, 0]), "11114bdQda");
    }

    #[test]
    fn test_small_payload() {
        assert_eq!(encode_check(&[0, 1, 2, 3]), "13DV5niCGP");
    }

    #[test]
    fn test_bip32_vector_1_master_xpub() {
        // version || depth || parent fingerprint || child number || chain code || pubkey
        let payload = hex::decode(
            "0488b21e000000000000000000\
             873dff81c02f525623fd1fe5167eac3a55a049de3d314bb42ee227ffed37d508\
             0339a36013301597daef41fbe593a02cc513d0b55527ec2df1050e2e8ff49c85c2",
        )
        .unwrap();
        assert_eq!(payload.len(), 78);
        assert_eq!(
            encode_check(&payload),
            "xpub661MyMwAqRbcFtXgS5sYJABqqG9YLmC4Q1Rdap9gSE8NqtwybGhe\
             PY2gZ29ESFjqJoCu1Rupje8YtGqsefD265TMg7usUDFdp6W1EGMcet8"
        );
    }
}
