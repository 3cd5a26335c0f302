//! Fuzz target for single certificate records.
//!
//! Every record that decodes must re-encode to the bytes it was read from,
//! padding aside, and decode again to the same certificate.

#![no_main]

use certdb::Certificate;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let offset = data.first().map_or(0, |b| usize::from(*b) % 8);

    if let Ok((cert, consumed)) = Certificate::decode(data, offset) {
        assert_eq!(consumed, cert.encoded_len());

        let bytes = cert.to_bytes();
        let (again, again_consumed) = Certificate::decode(&bytes, 0).unwrap();
        assert_eq!(again, cert);
        assert_eq!(again_consumed, bytes.len());
    }
});
