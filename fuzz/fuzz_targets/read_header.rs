#![no_main]
use citrix::NiftiHeader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(header) = NiftiHeader::from_reader(data) {
        let _ = header.dim();
        let _ = header.data_type();
        let _ = header.qform();
        let _ = header.sform();
        let _ = header.intent();
        let _ = header.affine();
    }
});
