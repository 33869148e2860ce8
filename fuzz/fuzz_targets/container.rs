#![no_main]

use asfscope::container::ContainerHeader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(header) = ContainerHeader::parse(data) {
        assert!(header.code(data).is_ok());
    }
});
