use crate::policy::session::SessionState;

/// Escalating remedies for a stuck session, keyed by the stuck counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remedy {
    /// Single back press.
    Back,
    /// Two back presses.
    DoubleBack,
    /// Upward swipe, then a back press.
    SwipeBack,
    /// Home key, then relaunch the target app.
    HomeRelaunch,
    /// Force-stop, home, relaunch, zero out the stuck counters.
    FullRecovery,
}

/// Rung N of the ladder handles stuck counter N (1-based), capped at the end.
pub const RECOVERY_RUNGS: &[Remedy] = &[
    Remedy::Back,
    Remedy::DoubleBack,
    Remedy::SwipeBack,
    Remedy::HomeRelaunch,
    Remedy::FullRecovery,
];

/// Past this the ladder is skipped entirely and full recovery runs.
pub const MAX_STUCK: u32 = 10;

/// One recovery attempt advances the ladder by one rung. The counter moves
/// here, not per failed action, so a frozen screen walks Back, DoubleBack,
/// SwipeBack, HomeRelaunch and only then full recovery.
pub fn escalate(session: &mut SessionState) -> Remedy {
    session.stuck_count += 1;
    remedy_for(session.stuck_count)
}

pub fn remedy_for(stuck_count: u32) -> Remedy {
    if stuck_count > MAX_STUCK {
        return Remedy::FullRecovery;
    }
    let index = (stuck_count.max(1) as usize - 1).min(RECOVERY_RUNGS.len() - 1);
    RECOVERY_RUNGS[index]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ladder_is_monotonic_and_caps_at_full_recovery() {
        assert_eq!(remedy_for(1), Remedy::Back);
        assert_eq!(remedy_for(2), Remedy::DoubleBack);
        assert_eq!(remedy_for(3), Remedy::SwipeBack);
        assert_eq!(remedy_for(4), Remedy::HomeRelaunch);
        assert_eq!(remedy_for(5), Remedy::FullRecovery);
        assert_eq!(remedy_for(7), Remedy::FullRecovery);
    }

    #[test]
    fn excessive_stuck_short_circuits_to_full_recovery() {
        assert_eq!(remedy_for(11), Remedy::FullRecovery);
        assert_eq!(remedy_for(100), Remedy::FullRecovery);
    }
}
