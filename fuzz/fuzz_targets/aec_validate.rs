#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use resona::aec3::{EchoCancellerConfig, EchoCancellerOverride};

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    multichannel_baseline: bool,
    erle_min: Option<f32>,
    erle_max_l: Option<f32>,
    down_sampling_factor: Option<u8>,
    default_delay: Option<u16>,
    refined_length: Option<u8>,
    refined_initial_length: Option<u8>,
    coarse_rate: Option<f32>,
    first_hf_band: Option<i16>,
    last_lf_band: Option<i16>,
    noise_floor_dbfs: Option<f32>,
    enr_threshold: Option<f32>,
    subband1_low: Option<u8>,
    subband1_high: Option<u8>,
}

fuzz_target!(|input: FuzzInput| {
    let mut ov = EchoCancellerOverride::default();
    ov.erle.min = input.erle_min;
    ov.erle.max_l = input.erle_max_l;
    ov.delay.down_sampling_factor = input.down_sampling_factor.map(usize::from);
    ov.delay.default_delay = input.default_delay.map(usize::from);
    ov.filter.refined.length_blocks = input.refined_length.map(usize::from);
    ov.filter.refined_initial.length_blocks = input.refined_initial_length.map(usize::from);
    ov.filter.coarse.rate = input.coarse_rate;
    ov.suppressor.first_hf_band = input.first_hf_band.map(i32::from);
    ov.suppressor.last_lf_band = input.last_lf_band.map(i32::from);
    ov.comfort_noise.noise_floor_dbfs = input.noise_floor_dbfs;
    ov.suppressor.dominant_nearend_detection.enr_threshold = input.enr_threshold;
    ov.suppressor.subband_nearend_detection.subband1_low = input.subband1_low.map(usize::from);
    ov.suppressor.subband_nearend_detection.subband1_high = input.subband1_high.map(usize::from);

    let baseline = if input.multichannel_baseline {
        EchoCancellerConfig::multichannel()
    } else {
        EchoCancellerConfig::default()
    };
    let mut merged = ov.merged_with(&baseline);

    // Clamping must converge in one pass: a validated config revalidates
    // cleanly and is left untouched by the second pass.
    merged.validate();
    let clamped = merged;
    assert!(merged.validate());
    assert_eq!(merged, clamped);

    // An empty override is the identity.
    assert_eq!(
        EchoCancellerOverride::default().merged_with(&baseline),
        baseline
    );
});
