//! Idle-timeout status rules
//!
//! A status set by an explicit request is never overridden here. Only a
//! status this module set itself may be flipped back when the user is
//! active again.

use std::time::{Duration, Instant};

use crate::presence::UserStatus;
use crate::registry::User;

/// Applies the idle rules to `user` as of `now`.
///
/// - Online and idle longer than `threshold` becomes Offline (auto).
/// - Offline (auto) and active within `threshold` becomes Online (auto).
/// - Offline set explicitly stays Offline.
///
/// Returns `true` when the status changed.
pub fn refresh_status(user: &mut User, now: Instant, threshold: Duration) -> bool {
    let idle = now.saturating_duration_since(user.last_interaction_at());

    match user.status() {
        UserStatus::Online if idle > threshold => {
            user.set_auto_status(UserStatus::Offline);
            true
        }
        UserStatus::Offline if user.status_auto_updated() && idle < threshold => {
            user.set_auto_status(UserStatus::Online);
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ConnectionHandle;

    const THRESHOLD: Duration = Duration::from_secs(60);

    fn idle_user(idle_for: Duration) -> User {
        let mut user = User::new(ConnectionHandle::new(1), "alice".into(), "10.0.0.1".into());
        let last = Instant::now()
            .checked_sub(idle_for)
            .expect("monotonic clock too close to its origin");
        user.set_last_interaction_at(last);
        user
    }

    #[test]
    fn online_user_past_threshold_goes_offline() {
        let mut user = idle_user(THRESHOLD + Duration::from_secs(1));

        assert!(refresh_status(&mut user, Instant::now(), THRESHOLD));
        assert_eq!(user.status(), UserStatus::Offline);
        assert!(user.status_auto_updated());
    }

    #[test]
    fn online_user_within_threshold_is_unchanged() {
        let mut user = idle_user(Duration::from_secs(5));

        assert!(!refresh_status(&mut user, Instant::now(), THRESHOLD));
        assert_eq!(user.status(), UserStatus::Online);
        assert!(!user.status_auto_updated());
    }

    #[test]
    fn auto_offline_user_snaps_back_after_activity() {
        let mut user = idle_user(THRESHOLD + Duration::from_secs(1));
        refresh_status(&mut user, Instant::now(), THRESHOLD);

        user.update_last_interaction();
        assert!(refresh_status(&mut user, Instant::now(), THRESHOLD));
        assert_eq!(user.status(), UserStatus::Online);
        assert!(user.status_auto_updated());
    }

    #[test]
    fn manual_offline_is_sticky() {
        let mut user = idle_user(Duration::ZERO);
        user.set_status(UserStatus::Offline);

        user.update_last_interaction();
        assert!(!refresh_status(&mut user, Instant::now(), THRESHOLD));
        assert_eq!(user.status(), UserStatus::Offline);
        assert!(!user.status_auto_updated());
    }

    #[test]
    fn auto_offline_user_still_idle_stays_offline() {
        let mut user = idle_user(THRESHOLD * 2);
        refresh_status(&mut user, Instant::now(), THRESHOLD);

        assert!(!refresh_status(&mut user, Instant::now(), THRESHOLD));
        assert_eq!(user.status(), UserStatus::Offline);
    }
}
