use std::sync::atomic::{AtomicU8, Ordering};

/// Where the application is in its proxy-driven lifecycle.
///
/// `Starting -> Ready -> Subscribed -> ShuttingDown`. Building the app moves
/// it to `Ready`; the proxy's subscription query moves it to `Subscribed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Lifecycle {
    Starting = 0,
    Ready = 1,
    Subscribed = 2,
    ShuttingDown = 3,
}

impl Lifecycle {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Lifecycle::Starting,
            1 => Lifecycle::Ready,
            2 => Lifecycle::Subscribed,
            _ => Lifecycle::ShuttingDown,
        }
    }
}

/// Lock-free holder for the current [`Lifecycle`].
#[derive(Debug)]
pub(crate) struct LifecycleCell(AtomicU8);

impl LifecycleCell {
    pub(crate) fn new(state: Lifecycle) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    pub(crate) fn get(&self) -> Lifecycle {
        Lifecycle::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Move `from -> to`. Returns false if the state was not `from`.
    pub(crate) fn advance(&self, from: Lifecycle, to: Lifecycle) -> bool {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub(crate) fn set(&self, state: Lifecycle) {
        self.0.store(state as u8, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_only_from_expected_state() {
        let cell = LifecycleCell::new(Lifecycle::Ready);

        assert!(cell.advance(Lifecycle::Ready, Lifecycle::Subscribed));
        assert_eq!(cell.get(), Lifecycle::Subscribed);

        assert!(!cell.advance(Lifecycle::Ready, Lifecycle::Subscribed));
        assert_eq!(cell.get(), Lifecycle::Subscribed);

        cell.set(Lifecycle::ShuttingDown);
        assert_eq!(cell.get(), Lifecycle::ShuttingDown);
    }

    #[test]
    fn ordering_follows_lifecycle() {
        assert!(Lifecycle::Starting < Lifecycle::Ready);
        assert!(Lifecycle::Subscribed < Lifecycle::ShuttingDown);
    }
}
