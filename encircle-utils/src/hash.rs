pub fn u8s_from_str(input: &str) -> [u8; 32] {
    blake3::hash(input.as_bytes()).into()
}

/// Seed for repeat `trial` of the experiment identified by `label`.
pub fn seed_for_trial(label: &str, trial: usize) -> [u8; 32] {
    u8s_from_str(&format!("{}_{}", label, trial))
}
