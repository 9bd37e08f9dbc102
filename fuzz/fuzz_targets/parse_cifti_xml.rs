#![no_main]
use citrix::CiftiHeader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(header) = CiftiHeader::from_bytes(data) {
        let _ = header.matrix_size();
        let _ = header.intersection(&header);
        let _ = header.to_xml();
    }
});
