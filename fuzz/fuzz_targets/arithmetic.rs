#![no_main]

use libfuzzer_sys::fuzz_target;

use pqkit::polynomial::{IntegerPolynomial, LongPolynomial2};

const N: usize = 11;
const Q: i32 = 2048;

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 * N {
        return;
    }
    let coeffs: Vec<i32> = data
        .chunks_exact(2)
        .take(2 * N)
        .map(|c| i32::from(u16::from_be_bytes([c[0], c[1]])) % Q)
        .collect();
    let a = IntegerPolynomial::new(coeffs[..N].to_vec());
    let b = IntegerPolynomial::new(coeffs[N..].to_vec());

    // Schoolbook/Karatsuba and the packed representation must agree mod q.
    let expected = a.mult_mod(&b, Q).expect("equal lengths");
    let packed = LongPolynomial2::from_integer(&a)
        .mult(&LongPolynomial2::from_integer(&b))
        .expect("equal lengths")
        .to_integer_polynomial();
    assert_eq!(packed.mod_positive(Q), expected.mod_positive(Q));

    if let Some(inverse) = a.invert_fq(Q).expect("valid modulus") {
        let product = a.mult_mod(&inverse, Q).expect("equal lengths");
        assert!(product.mod_positive(Q).equals_one());
    }
});
