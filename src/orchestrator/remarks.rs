//! Canned "still waiting" commentary for long wakes.

use rand::Rng;

/// Remarks posted once per session when a wake drags on. Picked uniformly at
/// random so concurrent sessions don't chant in lockstep.
pub const PATIENCE_REMARKS: [&str; 5] = [
    "🐭 Still on it! This machine is a deep sleeper today, but I am a patient mouse.",
    "🔮 Another peek at the health checks... not green yet. Some machines need extra time to wake up properly.",
    "*squeak* The wake-up call went through, the machine is just taking its time. Holding the line!",
    "⏳ This is taking longer than usual, but no cause for alarm. I will keep nudging until it is up.",
    "🐭 My whiskers say we are getting close. Not ready yet, checking again shortly!",
];

/// Pick one patience remark uniformly at random.
pub fn pick_patience_remark() -> &'static str {
    let idx = rand::rng().random_range(0..PATIENCE_REMARKS.len());
    PATIENCE_REMARKS[idx]
}
