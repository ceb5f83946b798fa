//! Value streams with explicit callback registration.
//!
//! An [`Observable`] holds a current value and replays it to every new
//! subscriber, then delivers each emitted value. Every subscription is backed
//! by one [`CancellationToken`]; once it is cancelled the callback never runs
//! again. Subscriptions created with [`Observable::subscribe_until`] are child
//! tokens of an owner's token, so cancelling the owner releases all of them.

use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Subscriber<T> {
    token: CancellationToken,
    /// Deliveries left before the subscription cancels itself.
    remaining: Option<usize>,
    callback: Callback<T>,
}

struct Inner<T> {
    current: T,
    subscribers: Vec<Subscriber<T>>,
}

/// Handle for one registered callback.
///
/// Dropping the handle does not cancel the subscription; call
/// [`Subscription::cancel`] or cancel the owner's token.
#[derive(Debug, Clone)]
pub struct Subscription {
    token: CancellationToken,
}

impl Subscription {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

/// A replaying value stream. Cloning yields another handle to the same stream.
pub struct Observable<T> {
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Default + Clone + Send + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + Send + 'static> Observable<T> {
    pub fn new(initial: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                current: initial,
                subscribers: Vec::new(),
            })),
        }
    }

    /// The most recently emitted value.
    pub fn get(&self) -> T {
        self.lock().current.clone()
    }

    /// Store `value` as current and deliver it to every live subscriber.
    ///
    /// Callbacks run after the internal lock is released, so a callback may
    /// emit to or subscribe on the same observable.
    pub fn emit(&self, value: T) {
        let deliveries = {
            let mut inner = self.lock();
            inner.current = value.clone();
            inner.subscribers.retain(|s| !s.token.is_cancelled());
            inner
                .subscribers
                .iter_mut()
                .map(|s| {
                    let last = match s.remaining.as_mut() {
                        Some(left) => {
                            *left = left.saturating_sub(1);
                            *left == 0
                        }
                        None => false,
                    };
                    (Arc::clone(&s.callback), s.token.clone(), last)
                })
                .collect::<Vec<_>>()
        };

        for (callback, token, last) in deliveries {
            deliver(&callback, &token, &value, last);
        }
    }

    /// Register `callback` until the returned handle is cancelled.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.register(CancellationToken::new(), None, Arc::new(callback))
    }

    /// Register `callback` until the handle or `owner` is cancelled.
    pub fn subscribe_until<F>(&self, owner: &CancellationToken, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.register(owner.child_token(), None, Arc::new(callback))
    }

    /// Like [`Observable::subscribe_until`], but the subscription cancels
    /// itself after `max_deliveries` values (the replayed current value
    /// counts as the first).
    pub fn subscribe_bounded<F>(
        &self,
        max_deliveries: usize,
        owner: &CancellationToken,
        callback: F,
    ) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let token = owner.child_token();
        if max_deliveries == 0 {
            token.cancel();
        }
        self.register(token, Some(max_deliveries), Arc::new(callback))
    }

    /// Number of subscriptions that are still live.
    pub fn subscriber_count(&self) -> usize {
        let mut inner = self.lock();
        inner.subscribers.retain(|s| !s.token.is_cancelled());
        inner.subscribers.len()
    }

    fn register(
        &self,
        token: CancellationToken,
        remaining: Option<usize>,
        callback: Callback<T>,
    ) -> Subscription {
        let subscription = Subscription {
            token: token.clone(),
        };
        if token.is_cancelled() {
            return subscription;
        }

        let (current, last) = {
            let mut inner = self.lock();
            let remaining = remaining.map(|n| n - 1);
            inner.subscribers.push(Subscriber {
                token: token.clone(),
                remaining,
                callback: Arc::clone(&callback),
            });
            (inner.current.clone(), remaining == Some(0))
        };

        deliver(&callback, &token, &current, last);
        subscription
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn deliver<T>(callback: &Callback<T>, token: &CancellationToken, value: &T, last: bool) {
    if token.is_cancelled() {
        return;
    }
    callback(value);
    if last {
        token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn recorder() -> (Arc<Mutex<Vec<i32>>>, impl Fn(&i32) + Send + Sync + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |v: &i32| sink.lock().unwrap().push(*v))
    }

    #[test]
    fn subscribe_replays_current_value() {
        let observable = Observable::new(1);
        let (seen, callback) = recorder();
        let _sub = observable.subscribe(callback);
        assert_eq!(*seen.lock().unwrap(), vec![1]);
    }

    #[test]
    fn emit_updates_current_and_notifies() {
        let observable = Observable::new(0);
        let (seen, callback) = recorder();
        let _sub = observable.subscribe(callback);
        observable.emit(5);
        observable.emit(6);
        assert_eq!(observable.get(), 6);
        assert_eq!(*seen.lock().unwrap(), vec![0, 5, 6]);
    }

    #[test]
    fn cancelled_subscription_receives_nothing() {
        let observable = Observable::new(0);
        let (seen, callback) = recorder();
        let sub = observable.subscribe(callback);
        sub.cancel();
        observable.emit(1);
        assert_eq!(*seen.lock().unwrap(), vec![0]);
        assert_eq!(observable.subscriber_count(), 0);
    }

    #[test]
    fn owner_cancellation_releases_children() {
        let observable = Observable::new(0);
        let owner = CancellationToken::new();
        let (seen_a, a) = recorder();
        let (seen_b, b) = recorder();
        let _sa = observable.subscribe_until(&owner, a);
        let _sb = observable.subscribe_until(&owner, b);
        assert_eq!(observable.subscriber_count(), 2);

        owner.cancel();
        observable.emit(9);

        assert_eq!(*seen_a.lock().unwrap(), vec![0]);
        assert_eq!(*seen_b.lock().unwrap(), vec![0]);
        assert_eq!(observable.subscriber_count(), 0);
    }

    #[test]
    fn subscribe_until_cancelled_owner_never_runs() {
        let observable = Observable::new(0);
        let owner = CancellationToken::new();
        owner.cancel();
        let (seen, callback) = recorder();
        let sub = observable.subscribe_until(&owner, callback);
        assert!(sub.is_cancelled());
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn bounded_subscription_stops_after_limit() {
        let observable = Observable::new(0);
        let owner = CancellationToken::new();
        let (seen, callback) = recorder();
        let sub = observable.subscribe_bounded(2, &owner, callback);
        assert!(!sub.is_cancelled());

        observable.emit(1);
        assert!(sub.is_cancelled());
        observable.emit(2);

        assert_eq!(*seen.lock().unwrap(), vec![0, 1]);
        assert!(!owner.is_cancelled());
    }

    #[test]
    fn bounded_subscription_of_one_only_sees_replay() {
        let observable = Observable::new(3);
        let owner = CancellationToken::new();
        let (seen, callback) = recorder();
        let sub = observable.subscribe_bounded(1, &owner, callback);
        observable.emit(4);
        assert!(sub.is_cancelled());
        assert_eq!(*seen.lock().unwrap(), vec![3]);
    }

    #[test]
    fn bounded_zero_never_runs() {
        let observable = Observable::new(3);
        let owner = CancellationToken::new();
        let (seen, callback) = recorder();
        let sub = observable.subscribe_bounded(0, &owner, callback);
        assert!(sub.is_cancelled());
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn callback_may_emit_reentrantly() {
        let observable = Observable::new(0);
        let handle = observable.clone();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let _sub = observable.subscribe(move |v: &i32| {
            counter.fetch_add(1, Ordering::SeqCst);
            if *v == 1 {
                handle.emit(2);
            }
        });
        observable.emit(1);
        assert_eq!(observable.get(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn clones_share_state() {
        let a = Observable::new(String::from("x"));
        let b = a.clone();
        b.emit("y".to_string());
        assert_eq!(a.get(), "y");
    }
}
