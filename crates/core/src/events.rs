//! Ordered, deduplicated subscriber lists
//!
//! Components that broadcast notifications (abort, autopilot arrival and
//! target changes) keep their listeners as a list of [`SubscriberId`]s. The
//! broadcaster snapshots the list before dispatching, so a listener that
//! unsubscribes from inside its own callback does not disturb the iteration.

use core::fmt;

use heapless::Vec;

/// Identity of a listener
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(pub u8);

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subscriber#{}", self.0)
    }
}

/// Errors from subscribing or unsubscribing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionError {
    /// Listener is already in the list
    AlreadySubscribed,
    /// Listener was never subscribed (or already removed)
    NotSubscribed,
    /// List is at capacity
    Full,
}

impl fmt::Display for SubscriptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubscriptionError::AlreadySubscribed => write!(f, "already subscribed"),
            SubscriptionError::NotSubscribed => write!(f, "not subscribed"),
            SubscriptionError::Full => write!(f, "subscriber list full"),
        }
    }
}

/// Ordered set of listeners, in subscription order
#[derive(Clone, Debug, Default)]
pub struct Subscribers<const N: usize> {
    ids: Vec<SubscriberId, N>,
}

impl<const N: usize> Subscribers<N> {
    pub const fn new() -> Self {
        Self { ids: Vec::new() }
    }

    pub fn subscribe(&mut self, id: SubscriberId) -> Result<(), SubscriptionError> {
        if self.contains(id) {
            return Err(SubscriptionError::AlreadySubscribed);
        }
        self.ids.push(id).map_err(|_| SubscriptionError::Full)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> Result<(), SubscriptionError> {
        let index = self
            .ids
            .iter()
            .position(|s| *s == id)
            .ok_or(SubscriptionError::NotSubscribed)?;
        // keep subscription order
        self.ids.remove(index);
        Ok(())
    }

    pub fn contains(&self, id: SubscriberId) -> bool {
        self.ids.contains(&id)
    }

    /// Copy of the current list for dispatching.
    pub fn snapshot(&self) -> Vec<SubscriberId, N> {
        self.ids.clone()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_keeps_order() {
        let mut subs: Subscribers<4> = Subscribers::new();
        subs.subscribe(SubscriberId(3)).unwrap();
        subs.subscribe(SubscriberId(1)).unwrap();
        subs.subscribe(SubscriberId(2)).unwrap();
        let snap = subs.snapshot();
        assert_eq!(snap.as_slice(), &[SubscriberId(3), SubscriberId(1), SubscriberId(2)]);
    }

    #[test]
    fn test_double_subscribe_is_rejected() {
        let mut subs: Subscribers<4> = Subscribers::new();
        subs.subscribe(SubscriberId(1)).unwrap();
        assert_eq!(
            subs.subscribe(SubscriberId(1)),
            Err(SubscriptionError::AlreadySubscribed)
        );
        assert_eq!(subs.len(), 1);
    }

    #[test]
    fn test_unsubscribe_unknown_is_reported() {
        let mut subs: Subscribers<4> = Subscribers::new();
        assert_eq!(
            subs.unsubscribe(SubscriberId(9)),
            Err(SubscriptionError::NotSubscribed)
        );
    }

    #[test]
    fn test_unsubscribe_twice_reports_second_time() {
        let mut subs: Subscribers<4> = Subscribers::new();
        subs.subscribe(SubscriberId(1)).unwrap();
        assert!(subs.unsubscribe(SubscriberId(1)).is_ok());
        assert_eq!(
            subs.unsubscribe(SubscriberId(1)),
            Err(SubscriptionError::NotSubscribed)
        );
        assert!(subs.is_empty());
    }

    #[test]
    fn test_unsubscribe_preserves_remaining_order() {
        let mut subs: Subscribers<4> = Subscribers::new();
        for id in 1..=4 {
            subs.subscribe(SubscriberId(id)).unwrap();
        }
        subs.unsubscribe(SubscriberId(2)).unwrap();
        assert_eq!(
            subs.snapshot().as_slice(),
            &[SubscriberId(1), SubscriberId(3), SubscriberId(4)]
        );
    }

    #[test]
    fn test_full_list() {
        let mut subs: Subscribers<2> = Subscribers::new();
        subs.subscribe(SubscriberId(1)).unwrap();
        subs.subscribe(SubscriberId(2)).unwrap();
        assert_eq!(subs.subscribe(SubscriberId(3)), Err(SubscriptionError::Full));
    }

    #[test]
    fn test_snapshot_is_independent_of_later_changes() {
        let mut subs: Subscribers<4> = Subscribers::new();
        subs.subscribe(SubscriberId(1)).unwrap();
        subs.subscribe(SubscriberId(2)).unwrap();
        let snap = subs.snapshot();
        for id in snap.iter() {
            // a listener removing itself mid-dispatch
            subs.unsubscribe(*id).unwrap();
        }
        assert_eq!(snap.len(), 2);
        assert!(subs.is_empty());
    }
}
