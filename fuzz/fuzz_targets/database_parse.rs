//! Fuzz target for whole database blocks.
//!
//! Security concerns:
//! - Declared sizes larger than the block
//! - Records straddling the declared end
//! - Unknown algorithm codes mid-stream

#![no_main]

use certdb::{CertificateDatabase, CertificateRegistry, LoaderConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(db) = CertificateDatabase::parse(data) {
        let bytes = db.to_bytes().unwrap();
        let reparsed = CertificateDatabase::parse(&bytes).unwrap();
        assert_eq!(reparsed, db);
    }

    let config = LoaderConfig::default().with_required(Vec::<String>::new());
    let mut registry = CertificateRegistry::new(config);
    if registry.load_bytes(data).is_err() {
        assert!(!registry.is_loaded());
        assert!(registry.is_empty());
    }
});
