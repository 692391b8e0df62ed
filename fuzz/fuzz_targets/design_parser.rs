#![no_main]

use libfuzzer_sys::fuzz_target;
use sourpea::design_dsl::DesignFile;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Parsing and building must reject bad designs without panicking
        if let Ok(design) = DesignFile::from_toml_str(input) {
            let _ = design.build();
        }
    }
});
