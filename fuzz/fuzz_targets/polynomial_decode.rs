#![no_main]

use libfuzzer_sys::fuzz_target;

use pqkit::polynomial::{IntegerPolynomial, ProductFormPolynomial, SparseTernaryPolynomial};

fuzz_target!(|data: &[u8]| {
    // Decoders must reject or accept, never panic.
    if let Ok(poly) = IntegerPolynomial::from_binary(data, 11, 2048) {
        let encoded = poly.to_binary(2048).expect("decoded coefficients re-encode");
        assert_eq!(encoded.len(), data.len());
        assert!(poly.coeffs().iter().all(|&c| (0..2048).contains(&c)));
    }
    if let Ok(poly) = IntegerPolynomial::from_binary3_tight(data, 17) {
        assert!(poly.coeffs().iter().all(|&c| (-1..=1).contains(&c)));
    }
    let _ = IntegerPolynomial::from_binary3_sves(data, 16);

    if let Ok(sparse) = SparseTernaryPolynomial::from_binary(data, 32, 2, 2) {
        let again = SparseTernaryPolynomial::from_binary(&sparse.to_binary(), 32, 2, 2)
            .expect("sparse polynomial re-decodes");
        assert_eq!(again, sparse);
    }
    let _ = ProductFormPolynomial::from_binary(data, 32, 1, 1, 1, 1);
});
