#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use resona::aec3::{EchoCancellerConfig, EchoCancellerOverride};
use resona::config::{EchoCanceller, NoiseSuppression, NoiseSuppressionLevel};
use resona::{Config, Processor};

#[derive(Debug, Arbitrary)]
enum FuzzOp {
    ApplyConfig {
        ec: bool,
        ec_mobile: bool,
        ec_export: bool,
        ns: bool,
        ns_level: u8,
        ns_analyze: bool,
    },
    SetAecDefault,
    SetAecMultichannel,
    SetAecTweaked { default_delay: u16, erle_min: f32 },
    ClearAec,
    SetDelay(i16),
    ProcessCapture,
    GetStats,
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    sample_rate_idx: u8,
    operations: Vec<FuzzOp>,
}

fn ns_level(idx: u8) -> NoiseSuppressionLevel {
    match idx % 4 {
        0 => NoiseSuppressionLevel::Low,
        1 => NoiseSuppressionLevel::Moderate,
        2 => NoiseSuppressionLevel::High,
        _ => NoiseSuppressionLevel::VeryHigh,
    }
}

fuzz_target!(|input: FuzzInput| {
    let rate = match input.sample_rate_idx % 4 {
        0 => 8000,
        1 => 16000,
        2 => 32000,
        _ => 48000,
    };
    let Ok(processor) = Processor::builder().sample_rate_hz(rate).build() else {
        return;
    };
    let frames = processor.num_samples_per_frame();

    for op in input.operations {
        match op {
            FuzzOp::ApplyConfig {
                ec,
                ec_mobile,
                ec_export,
                ns,
                ns_level: level,
                ns_analyze,
            } => {
                processor.apply_config(Config {
                    echo_canceller: ec.then(|| EchoCanceller {
                        mobile_mode: ec_mobile,
                        export_linear_aec_output: ec_export,
                        ..Default::default()
                    }),
                    noise_suppression: ns.then(|| NoiseSuppression {
                        level: ns_level(level),
                        analyze_linear_aec_output: ns_analyze,
                    }),
                    ..Default::default()
                });
                // The export/analyze coupling must hold after every apply.
                let stored = processor.config();
                let export = stored
                    .echo_canceller
                    .as_ref()
                    .is_some_and(|ec| ec.export_linear_aec_output);
                if export {
                    assert_eq!(rate, 16000);
                }
                if !export {
                    assert!(
                        !stored
                            .noise_suppression
                            .as_ref()
                            .is_some_and(|ns| ns.analyze_linear_aec_output)
                    );
                }
            }
            FuzzOp::SetAecDefault => {
                processor
                    .set_aec_config(Some(EchoCancellerConfig::default()))
                    .unwrap();
            }
            FuzzOp::SetAecMultichannel => {
                processor
                    .set_aec_config(Some(EchoCancellerConfig::multichannel()))
                    .unwrap();
            }
            FuzzOp::SetAecTweaked {
                default_delay,
                erle_min,
            } => {
                let mut ov = EchoCancellerOverride::default();
                ov.delay.default_delay = Some(usize::from(default_delay));
                ov.erle.min = Some(erle_min);
                let merged = ov.merged_with(&EchoCancellerConfig::default());
                // Either accepted whole or rejected whole.
                match processor.set_aec_config(Some(merged)) {
                    Ok(_) => assert_eq!(processor.aec_config(), Some(merged)),
                    Err(_) => {}
                }
            }
            FuzzOp::ClearAec => {
                processor.set_aec_config(None).unwrap();
            }
            FuzzOp::SetDelay(delay) => {
                let _ = processor.set_stream_delay_ms(i32::from(delay));
                let stored = processor.stream_delay_ms().unwrap();
                assert!((0..=500).contains(&stored));
            }
            FuzzOp::ProcessCapture => {
                let mut samples = vec![0.0f32; frames];
                processor.process_capture_frame(&mut [&mut samples]).unwrap();
            }
            FuzzOp::GetStats => {
                let _ = processor.get_stats();
            }
        }
    }
});
