//! Random sources for quests and battles.
//!
//! Every engine decision point draws through [`RollSource`]. Any `rand::RngCore`
//! qualifies, [`ScriptedRolls`] replays fixed sequences in tests, and [`RngBundle`]
//! derives independent seeded streams for reproducible headless runs.
use hmac::{Hmac, Mac};
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
use sha2::Sha256;
use std::cell::{RefCell, RefMut};
use std::collections::VecDeque;

/// Uniform draws needed by the engine.
pub trait RollSource {
    /// Percentage in `[0, 100)`.
    fn roll_percent(&mut self) -> f64;

    /// Real factor in `[min, max)`.
    fn roll_factor(&mut self, min: f64, max: f64) -> f64;

    /// Integer in `[low, high]`.
    fn roll_between(&mut self, low: i32, high: i32) -> i32;

    /// Index in `[0, len)`; returns 0 when `len` is 0.
    fn pick_index(&mut self, len: usize) -> usize;
}

impl<R: RngCore> RollSource for R {
    fn roll_percent(&mut self) -> f64 {
        self.gen_range(0.0..100.0)
    }

    fn roll_factor(&mut self, min: f64, max: f64) -> f64 {
        if min < max {
            self.gen_range(min..max)
        } else {
            min
        }
    }

    fn roll_between(&mut self, low: i32, high: i32) -> i32 {
        if low < high {
            self.gen_range(low..=high)
        } else {
            low
        }
    }

    fn pick_index(&mut self, len: usize) -> usize {
        if len <= 1 { 0 } else { self.gen_range(0..len) }
    }
}

/// Replays queued draws in order.
///
/// Once a queue runs dry the source falls back to a fixed value: percent `0.0`,
/// factor `1.0` (clamped into the requested window), integer `low`, index `0`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRolls {
    percents: VecDeque<f64>,
    factors: VecDeque<f64>,
    integers: VecDeque<i32>,
    picks: VecDeque<usize>,
}

impl ScriptedRolls {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_percents(mut self, values: impl IntoIterator<Item = f64>) -> Self {
        self.percents.extend(values);
        self
    }

    #[must_use]
    pub fn with_factors(mut self, values: impl IntoIterator<Item = f64>) -> Self {
        self.factors.extend(values);
        self
    }

    #[must_use]
    pub fn with_integers(mut self, values: impl IntoIterator<Item = i32>) -> Self {
        self.integers.extend(values);
        self
    }

    #[must_use]
    pub fn with_picks(mut self, values: impl IntoIterator<Item = usize>) -> Self {
        self.picks.extend(values);
        self
    }

    /// True when every queued draw has been consumed.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.percents.is_empty()
            && self.factors.is_empty()
            && self.integers.is_empty()
            && self.picks.is_empty()
    }
}

impl RollSource for ScriptedRolls {
    fn roll_percent(&mut self) -> f64 {
        self.percents.pop_front().unwrap_or(0.0)
    }

    fn roll_factor(&mut self, min: f64, max: f64) -> f64 {
        let value = self.factors.pop_front().unwrap_or(1.0);
        if min <= max { value.clamp(min, max) } else { value }
    }

    fn roll_between(&mut self, low: i32, high: i32) -> i32 {
        let value = self.integers.pop_front().unwrap_or(low);
        if low <= high { value.clamp(low, high) } else { low }
    }

    fn pick_index(&mut self, len: usize) -> usize {
        let value = self.picks.pop_front().unwrap_or(0);
        value.min(len.saturating_sub(1))
    }
}

/// Deterministic RNG streams derived from a single user seed.
#[derive(Debug)]
pub struct RngBundle {
    quest: RefCell<CountingRng<SmallRng>>,
    battle: RefCell<CountingRng<SmallRng>>,
}

impl RngBundle {
    /// Construct the bundle from a user-visible seed.
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        let quest = CountingRng::new(derive_stream_seed(seed, b"quest"));
        let battle = CountingRng::new(derive_stream_seed(seed, b"battle"));
        Self {
            quest: RefCell::new(quest),
            battle: RefCell::new(battle),
        }
    }

    /// Access the quest RNG stream.
    #[must_use]
    pub fn quest(&self) -> RefMut<'_, CountingRng<SmallRng>> {
        self.quest.borrow_mut()
    }

    /// Access the battle RNG stream (opponent generation, rolls, opponent policy).
    #[must_use]
    pub fn battle(&self) -> RefMut<'_, CountingRng<SmallRng>> {
        self.battle.borrow_mut()
    }

    /// Total draws across all streams.
    #[must_use]
    pub fn total_draws(&self) -> u64 {
        self.quest
            .borrow()
            .draws()
            .saturating_add(self.battle.borrow().draws())
    }
}

/// Counting wrapper for RNG streams providing instrumentation.
#[derive(Debug, Clone)]
pub struct CountingRng<R> {
    rng: R,
    draws: u64,
}

impl CountingRng<SmallRng> {
    fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            draws: 0,
        }
    }
}

impl<R: RngCore> CountingRng<R> {
    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl<R: RngCore> RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.draws = self.draws.saturating_add(1);
        self.rng.try_fill_bytes(dest)
    }
}

fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()) else {
        return user_seed;
    };
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}
