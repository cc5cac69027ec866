#![no_main]

use libfuzzer_sys::fuzz_target;
use dexshadow::{collect_ranges, DexFile, TrackingConfig};

fuzz_target!(|data: &[u8]| {
    if let Ok(dex) = DexFile::from_mem(data.to_vec(), "fuzz") {
        let _ = collect_ranges(&dex, &TrackingConfig::code_items_except_insns_no_clinit());
    }
});
