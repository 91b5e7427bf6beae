use std::sync::{Mutex, PoisonError};

pub(crate) fn next_random_u32(state: &mut u32) -> u32 {
    let mut next = state.wrapping_add(0x6d2b79f5);
    *state = next;
    next = (next ^ (next >> 15)).wrapping_mul(next | 1);
    next ^= next.wrapping_add((next ^ (next >> 7)).wrapping_mul(next | 61));
    next ^ (next >> 14)
}

pub(crate) fn next_random_bounded(state: &mut u32, bound: u32) -> u32 {
    next_random_bounded_with(state, bound, next_random_u32)
}

pub(crate) fn next_random_bounded_with<F>(state: &mut u32, bound: u32, mut next: F) -> u32
where
    F: FnMut(&mut u32) -> u32,
{
    let threshold = (u64::from(u32::MAX) + 1) / u64::from(bound) * u64::from(bound);
    let mut candidate = next(state);
    while u64::from(candidate) >= threshold {
        candidate = next(state);
    }
    candidate % bound
}

/// Shared generator behind the script-facing `rand_*` helpers.
#[derive(Debug)]
pub(crate) struct ScriptRng {
    state: Mutex<u32>,
}

impl ScriptRng {
    pub(crate) fn new(seed: u32) -> Self {
        Self {
            state: Mutex::new(seed),
        }
    }

    /// Uniform integer in `low..=high`; callers guarantee `low <= high`.
    pub(crate) fn int_inclusive(&self, low: i32, high: i32) -> i32 {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let span = i64::from(high) - i64::from(low) + 1;
        let offset = match u32::try_from(span) {
            Ok(bound) => i64::from(next_random_bounded(&mut state, bound)),
            Err(_) => i64::from(next_random_u32(&mut state)),
        };
        (i64::from(low) + offset) as i32
    }

    /// Uniform float in `[0, 1)`.
    pub(crate) fn unit_float(&self) -> f32 {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        (next_random_u32(&mut state) >> 8) as f32 / 16_777_216.0
    }
}
