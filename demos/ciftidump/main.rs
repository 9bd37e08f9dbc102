//! An application for printing the CIFTI-2 XML document of a file.

extern crate citrix;

use citrix::cifti::extract_cifti_header;
use citrix::ReaderOptions;
use std::env;

fn main() {
    let mut args = env::args().skip(1);
    let filename = args.next().expect("Path to CIFTI file is required");
    let (_, extensions) = ReaderOptions::new()
        .read_header_file(&filename)
        .expect("Failed to read NIfTI header");
    let header = extract_cifti_header(&extensions).expect("Failed to read CIFTI header");
    println!("{:#?}", header.matrix_size());
    println!("{}", header.to_xml().expect("Failed to write CIFTI header"));
}
