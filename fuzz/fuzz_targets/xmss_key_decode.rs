#![no_main]

use libfuzzer_sys::fuzz_target;

use pqkit::xmss::{
    DigestKind, XmssMtParameters, XmssMtPrivateKey, XmssMtSignature, XmssParameters, XmssPrivateKey,
    XmssSignature,
};

fuzz_target!(|data: &[u8]| {
    let params = XmssParameters::new(4, DigestKind::Sha256).expect("valid parameters");
    if let Ok(key) = XmssPrivateKey::from_bytes(&params, data) {
        // Anything accepted must serialize back to the same bytes.
        assert_eq!(key.to_bytes(), data);
    }
    let _ = XmssSignature::from_bytes(&params, data);

    let mt = XmssMtParameters::new(4, 2, DigestKind::Sha256).expect("valid parameters");
    if let Ok(key) = XmssMtPrivateKey::from_bytes(&mt, data) {
        assert_eq!(key.to_bytes(), data);
    }
    let _ = XmssMtSignature::from_bytes(&mt, data);
});
