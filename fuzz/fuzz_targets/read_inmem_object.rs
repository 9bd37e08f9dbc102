#![no_main]
use citrix::NiftiObject;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(object) = NiftiObject::from_reader(data) {
        let _ = citrix::cifti::extract_cifti_header(object.extensions());
    }
});
