use encircle_algorithms::enclosing_circle::circle_ga::Config;
use encircle_challenges::enclosing_circle::{Challenge, Track};
use encircle_runtime::{measure, memory, PeakAlloc};

#[global_allocator]
static ALLOC: PeakAlloc = PeakAlloc;

// Counters are process-wide; this stays the only test in its binary.
#[test]
fn test_peak_memory_tracking() {
    memory::reset_peak();
    let before = memory::current_bytes();
    let block = vec![0u8; 8 << 20];
    assert!(memory::current_bytes() >= before + block.len());
    drop(block);
    assert!(memory::peak_bytes() >= 8 << 20);
    assert!(memory::peak_memory_mb() >= 8.0);

    memory::reset_peak();
    assert!(memory::peak_bytes() < 8 << 20);

    let track = Track {
        num_points: 2000,
        ..Track::default()
    };
    let points = Challenge::generate_instance(&[3; 32], &track).unwrap().points;
    let config = Config {
        population_size: 20,
        generations: 5,
        ..Config::default()
    };
    let m = measure(&points, config, &[3; 32]).unwrap();
    // The optimizer holds its own copy of the cloud.
    assert!(m.peak_memory_mb * 1024.0 * 1024.0 >= (points.len() * 8) as f64);
}
