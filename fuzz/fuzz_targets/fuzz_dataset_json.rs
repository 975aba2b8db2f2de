#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    if let Ok(ds) = irmap_config::parse_dataset_json(data) {
        // Anything accepted must be a usable pairing
        assert_eq!(ds.distance.len(), ds.response.len());
        assert!(ds.len() >= irmap_config::MIN_DATASET_POINTS);
    }
});
