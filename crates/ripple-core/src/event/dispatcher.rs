use std::any::{Any, TypeId};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, RwLock, Weak};
use std::task::{Context, Poll};
use std::thread;

use log::{debug, error, trace, warn};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::config::DispatcherConfig;
use crate::event::error::EventSystemError;
use crate::event::{BoxedEvent, Event, EventPriority, EventResult};

/// Opaque token identifying one subscription on one dispatcher.
///
/// Handles come from one process-wide counter, so a handle is never reused
/// and never names a subscription on a different dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionHandle(u64);

impl SubscriptionHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which part of a subscription panicked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureSource {
    Filter,
    Handler,
}

/// Diagnostic record for a subscriber that panicked during dispatch
#[derive(Debug, Clone)]
pub struct HandlerFailure {
    pub handle: SubscriptionHandle,
    pub event_name: &'static str,
    pub source: FailureSource,
    pub message: String,
}

type FailureHook = Arc<dyn Fn(&HandlerFailure) + Send + Sync>;
type Handler<E> = Box<dyn Fn(&E) + Send + Sync>;
type Filter<E> = Box<dyn Fn(&E) -> bool + Send + Sync>;

//--------------------------------------------------
// Type-erased subscriptions (Internal)
//--------------------------------------------------

/// Handler stored without its event type; each call re-checks the type.
trait ErasedHandler: Send + Sync {
    /// Right type and the filter (if any) lets it through
    fn accepts(&self, event: &dyn Event) -> bool;
    fn invoke(&self, event: &dyn Event);
}

struct TypedHandler<E: Event> {
    handler: Handler<E>,
    filter: Option<Filter<E>>,
}

impl<E: Event> ErasedHandler for TypedHandler<E> {
    fn accepts(&self, event: &dyn Event) -> bool {
        match event.as_any().downcast_ref::<E>() {
            Some(e) => self.filter.as_ref().map_or(true, |filter| filter(e)),
            None => false,
        }
    }

    fn invoke(&self, event: &dyn Event) {
        if let Some(e) = event.as_any().downcast_ref::<E>() {
            (self.handler)(e)
        }
    }
}

struct Subscription {
    handle: SubscriptionHandle,
    priority: EventPriority,
    handler: Box<dyn ErasedHandler>,
}

/// Per-type subscription lists.
///
/// Each bucket is sorted by descending priority; entries of equal priority
/// keep the order they were added in.
#[derive(Default)]
struct SubscriptionRegistry {
    buckets: HashMap<TypeId, Vec<Subscription>>,
}

impl SubscriptionRegistry {
    fn insert(&mut self, type_id: TypeId, subscription: Subscription) {
        let bucket = self.buckets.entry(type_id).or_default();
        let at = bucket.partition_point(|s| s.priority >= subscription.priority);
        bucket.insert(at, subscription);
    }

    fn remove(&mut self, handle: SubscriptionHandle) -> Option<Subscription> {
        self.buckets.values_mut().find_map(|bucket| {
            let pos = bucket.iter().position(|s| s.handle == handle)?;
            Some(bucket.remove(pos))
        })
    }

    fn bucket(&self, type_id: &TypeId) -> &[Subscription] {
        self.buckets.get(type_id).map(Vec::as_slice).unwrap_or(&[])
    }

    fn count(&self, type_id: &TypeId) -> usize {
        self.bucket(type_id).len()
    }

    fn total(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    fn take(&mut self, type_id: &TypeId) -> Vec<Subscription> {
        self.buckets.remove(type_id).unwrap_or_default()
    }

    fn take_all(&mut self) -> HashMap<TypeId, Vec<Subscription>> {
        std::mem::take(&mut self.buckets)
    }
}

fn lock_or_recover<'a, T>(mutex: &'a Mutex<T>, component: &str) -> MutexGuard<'a, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        warn!("Recovering poisoned event dispatcher {} lock", component);
        poisoned.into_inner()
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic reason".to_string()
    }
}

//--------------------------------------------------
// Shared state (Internal, wrapped by EventDispatcher)
//--------------------------------------------------

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

struct Shared {
    config: DispatcherConfig,
    registry: Mutex<SubscriptionRegistry>,
    // Separate lock so handlers can queue follow-up events mid-dispatch.
    queue: Mutex<VecDeque<BoxedEvent>>,
    failure_hook: RwLock<Option<FailureHook>>,
}

impl Shared {
    fn new(config: DispatcherConfig) -> Self {
        Self {
            config,
            registry: Mutex::new(SubscriptionRegistry::default()),
            queue: Mutex::new(VecDeque::new()),
            failure_hook: RwLock::new(None),
        }
    }

    fn registry(&self) -> MutexGuard<'_, SubscriptionRegistry> {
        lock_or_recover(&self.registry, "registry")
    }

    fn register<E: Event>(&self, priority: EventPriority, handler: TypedHandler<E>) -> SubscriptionHandle {
        let handle = SubscriptionHandle(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed));
        let subscription = Subscription { handle, priority, handler: Box::new(handler) };
        self.registry().insert(TypeId::of::<E>(), subscription);
        debug!(
            "[{}] subscribed {} to {} at {:?} priority",
            self.config.name,
            handle,
            std::any::type_name::<E>(),
            priority
        );
        handle
    }

    fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        // Bind first so the handler is dropped after the guard is released.
        let removed = self.registry().remove(handle);
        match removed {
            Some(_) => {
                debug!("[{}] unsubscribed {}", self.config.name, handle);
                true
            }
            None => false,
        }
    }

    fn dispatch_erased(&self, type_id: TypeId, event: &dyn Event) -> usize {
        let registry = self.registry();
        let mut invoked = 0;
        for subscription in registry.bucket(&type_id) {
            if event.is_consumed() {
                break;
            }
            match panic::catch_unwind(AssertUnwindSafe(|| subscription.handler.accepts(event))) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(payload) => {
                    self.report_failure(subscription.handle, event, FailureSource::Filter, payload.as_ref());
                    continue;
                }
            }
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| subscription.handler.invoke(event))) {
                self.report_failure(subscription.handle, event, FailureSource::Handler, payload.as_ref());
            }
            invoked += 1;
        }
        trace!(
            "[{}] dispatched '{}' to {} handler(s){}",
            self.config.name,
            event.name(),
            invoked,
            if event.is_consumed() { " (consumed)" } else { "" }
        );
        invoked
    }

    fn report_failure(
        &self,
        handle: SubscriptionHandle,
        event: &dyn Event,
        source: FailureSource,
        payload: &(dyn Any + Send),
    ) {
        let failure = HandlerFailure {
            handle,
            event_name: event.name(),
            source,
            message: panic_message(payload),
        };
        if self.config.report_handler_panics {
            error!(
                "[{}] {:?} of subscription {} panicked while handling '{}': {}",
                self.config.name, failure.source, failure.handle, failure.event_name, failure.message
            );
        }
        let hook = self
            .failure_hook
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        if let Some(hook) = hook {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| hook(&failure))) {
                error!(
                    "[{}] failure hook panicked while reporting {}: {}",
                    self.config.name,
                    failure.handle,
                    panic_message(payload.as_ref())
                );
            }
        }
    }
}

//--------------------------------------------------
// EventDispatcher (Public API)
//--------------------------------------------------

/// Thread-safe registry of typed event handlers.
///
/// Subscriptions are keyed by the concrete event type given at the call site.
/// Within one type, handlers run in descending [`EventPriority`] order, ties
/// in subscription order. A handler can stop propagation by calling
/// [`Event::consume`]; the flag is checked before every handler.
///
/// # Locking
///
/// One mutex guards every event type's list. `dispatch` holds it for the whole
/// handler loop, so two dispatches never interleave handler by handler, and a
/// slow handler holds up every other subscribe, unsubscribe and dispatch on
/// this dispatcher. The lock is not reentrant: a handler must not subscribe,
/// unsubscribe, dispatch, or drop a [`ScopedSubscription`] on the dispatcher
/// that is calling it. Use [`queue`](EventDispatcher::queue) to emit follow-up
/// events from inside a handler.
///
/// Cloning is cheap and every clone shares the same subscriptions.
#[derive(Clone)]
pub struct EventDispatcher {
    shared: Arc<Shared>,
}

static GLOBAL: OnceLock<EventDispatcher> = OnceLock::new();

impl EventDispatcher {
    pub fn new() -> Self {
        Self::with_config(DispatcherConfig::default())
    }

    pub fn with_config(config: DispatcherConfig) -> Self {
        Self { shared: Arc::new(Shared::new(config)) }
    }

    /// Process-wide default dispatcher, created on first use and never torn down.
    pub fn global() -> &'static EventDispatcher {
        GLOBAL.get_or_init(|| {
            EventDispatcher::with_config(DispatcherConfig { name: "global".to_string(), ..Default::default() })
        })
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.shared.config
    }

    /// Start a subscription with a filter and/or priority other than the defaults
    pub fn subscription<E: Event>(&self) -> SubscriptionBuilder<'_, E> {
        SubscriptionBuilder { dispatcher: self, priority: EventPriority::default(), filter: None }
    }

    pub fn subscribe<E, F>(&self, priority: EventPriority, handler: F) -> SubscriptionHandle
    where
        E: Event,
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.subscription::<E>().priority(priority).subscribe(handler)
    }

    /// Subscribe a handler that returns [`EventResult`] (or `bool`, `true` = keep
    /// going). Returning `Stop`/`false` consumes the event.
    pub fn subscribe_with_propagation<E, F, R>(&self, priority: EventPriority, handler: F) -> SubscriptionHandle
    where
        E: Event,
        F: Fn(&E) -> R + Send + Sync + 'static,
        R: Into<EventResult>,
    {
        self.subscription::<E>().priority(priority).subscribe_with_propagation(handler)
    }

    /// Like [`subscribe`](Self::subscribe) but unsubscribes when the guard is dropped.
    pub fn subscribe_scoped<E, F>(&self, priority: EventPriority, handler: F) -> ScopedSubscription
    where
        E: Event,
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.subscription::<E>().priority(priority).subscribe_scoped(handler)
    }

    /// Returns `true` if the handle was registered and is now removed.
    pub fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        self.shared.unsubscribe(handle)
    }

    /// Deliver `event` to the subscribers of `E`, returning how many handlers ran.
    ///
    /// Handlers rejected by their filter, and handlers left over once the
    /// event is consumed, are not counted. A handler that panics is counted;
    /// the panic is reported and the remaining handlers still run.
    pub fn dispatch<E: Event>(&self, event: &E) -> usize {
        self.shared.dispatch_erased(TypeId::of::<E>(), event)
    }

    /// Dispatch routed on the runtime type of a type-erased event
    pub fn dispatch_dyn(&self, event: &dyn Event) -> usize {
        self.shared.dispatch_erased(event.as_any().type_id(), event)
    }

    /// Run [`dispatch`](Self::dispatch) on another execution context.
    ///
    /// Inside a Tokio runtime the work goes to the runtime's blocking pool,
    /// elsewhere to a dedicated thread. Concurrent async dispatches are not
    /// ordered relative to each other. Dropping the handle does not cancel
    /// the dispatch.
    pub fn dispatch_async<E: Event>(&self, event: E) -> DispatchHandle {
        let dispatcher = self.clone();
        let event_name = event.name();
        let pending = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => Pending::Task(runtime.spawn_blocking(move || dispatcher.dispatch(&event))),
            Err(_) => {
                let (tx, rx) = oneshot::channel();
                let spawned = thread::Builder::new()
                    .name("ripple-dispatch".to_string())
                    .spawn(move || {
                        // Receiver may already be gone; the dispatch itself happened.
                        let _ = tx.send(dispatcher.dispatch(&event));
                    });
                match spawned {
                    Ok(_) => Pending::Thread(rx),
                    Err(e) => {
                        warn!("[{}] could not spawn dispatch thread for '{}': {}", self.config().name, event_name, e);
                        Pending::Failed(Some(e.to_string()))
                    }
                }
            }
        };
        DispatchHandle { event_name, pending }
    }

    /// Number of live subscriptions for `E`
    pub fn subscription_count<E: Event>(&self) -> usize {
        self.shared.registry().count(&TypeId::of::<E>())
    }

    pub fn total_subscription_count(&self) -> usize {
        self.shared.registry().total()
    }

    /// Remove every subscription for `E`; returns how many were removed.
    pub fn clear_subscriptions<E: Event>(&self) -> usize {
        let removed = self.shared.registry().take(&TypeId::of::<E>());
        debug!(
            "[{}] cleared {} subscription(s) for {}",
            self.shared.config.name,
            removed.len(),
            std::any::type_name::<E>()
        );
        removed.len()
    }

    /// Remove every subscription for every type; returns how many were removed.
    pub fn clear_all_subscriptions(&self) -> usize {
        let removed = self.shared.registry().take_all();
        let count = removed.values().map(Vec::len).sum();
        debug!("[{}] cleared all {} subscription(s)", self.shared.config.name, count);
        count
    }

    /// Install a callback that sees every handler/filter panic caught during dispatch.
    ///
    /// The hook runs on the dispatching thread while the registry lock is held,
    /// so the same reentrancy rules as for handlers apply. A panic in the hook
    /// is logged and swallowed.
    pub fn set_failure_hook<F>(&self, hook: F)
    where
        F: Fn(&HandlerFailure) + Send + Sync + 'static,
    {
        *self.shared.failure_hook.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(Arc::new(hook));
    }

    pub fn clear_failure_hook(&self) {
        *self.shared.failure_hook.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }

    /// Defer `event` until the next [`process_queue`](Self::process_queue).
    pub fn queue<E: Event>(&self, event: E) -> Result<(), EventSystemError> {
        self.queue_boxed(Box::new(event))
    }

    pub fn queue_boxed(&self, event: BoxedEvent) -> Result<(), EventSystemError> {
        let mut queue = lock_or_recover(&self.shared.queue, "event_queue");
        if let Some(capacity) = self.shared.config.queue_capacity {
            if queue.len() >= capacity {
                warn!("[{}] dropping '{}': event queue full ({})", self.shared.config.name, event.name(), capacity);
                return Err(EventSystemError::QueueFull { capacity });
            }
        }
        queue.push_back(event);
        Ok(())
    }

    /// Dispatch every event queued before this call, oldest first.
    ///
    /// Events queued by handlers while this runs stay queued for the next call.
    /// Returns the number of events processed.
    pub fn process_queue(&self) -> usize {
        let pending = std::mem::take(&mut *lock_or_recover(&self.shared.queue, "event_queue"));
        let count = pending.len();
        for event in pending {
            self.dispatch_dyn(&*event);
        }
        count
    }

    pub fn queue_len(&self) -> usize {
        lock_or_recover(&self.shared.queue, "event_queue").len()
    }

    fn scoped(&self, handle: SubscriptionHandle) -> ScopedSubscription {
        ScopedSubscription { handle, dispatcher: Some(Arc::downgrade(&self.shared)) }
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

// Manual Debug impl; never blocks, so it is safe to call from a handler.
impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("EventDispatcher");
        s.field("name", &self.shared.config.name);
        match self.shared.registry.try_lock() {
            Ok(registry) => s.field("subscriptions", &registry.total()),
            Err(_) => s.field("subscriptions", &"<locked>"),
        };
        s.finish_non_exhaustive()
    }
}

//--------------------------------------------------
// SubscriptionBuilder
//--------------------------------------------------

/// Collects priority and filter before registering a handler.
///
/// ```
/// use ripple_core::event::{EventDispatcher, EventPriority, KeyboardEvent};
///
/// let dispatcher = EventDispatcher::new();
/// let handle = dispatcher
///     .subscription::<KeyboardEvent>()
///     .priority(EventPriority::High)
///     .filter(|e| e.is_press())
///     .subscribe(|e| println!("pressed {}", e.key));
/// assert!(dispatcher.unsubscribe(handle));
/// ```
#[must_use = "a subscription builder does nothing until one of the subscribe methods is called"]
pub struct SubscriptionBuilder<'a, E: Event> {
    dispatcher: &'a EventDispatcher,
    priority: EventPriority,
    filter: Option<Filter<E>>,
}

impl<'a, E: Event> SubscriptionBuilder<'a, E> {
    pub fn priority(mut self, priority: EventPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Only invoke the handler for events the predicate accepts
    pub fn filter<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    pub fn subscribe<F>(self, handler: F) -> SubscriptionHandle
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let typed = TypedHandler { handler: Box::new(handler), filter: self.filter };
        self.dispatcher.shared.register(self.priority, typed)
    }

    pub fn subscribe_with_propagation<F, R>(self, handler: F) -> SubscriptionHandle
    where
        F: Fn(&E) -> R + Send + Sync + 'static,
        R: Into<EventResult>,
    {
        self.subscribe(move |event: &E| {
            if handler(event).into() == EventResult::Stop {
                event.consume();
            }
        })
    }

    pub fn subscribe_scoped<F>(self, handler: F) -> ScopedSubscription
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let dispatcher = self.dispatcher;
        let handle = self.subscribe(handler);
        dispatcher.scoped(handle)
    }

    pub fn subscribe_scoped_with_propagation<F, R>(self, handler: F) -> ScopedSubscription
    where
        F: Fn(&E) -> R + Send + Sync + 'static,
        R: Into<EventResult>,
    {
        let dispatcher = self.dispatcher;
        let handle = self.subscribe_with_propagation(handler);
        dispatcher.scoped(handle)
    }
}

//--------------------------------------------------
// ScopedSubscription
//--------------------------------------------------

/// Guard that unsubscribes its handle when dropped, including during unwinding.
///
/// It holds only a weak reference: it never keeps the dispatcher alive, and
/// dropping it after the dispatcher is gone does nothing.
#[must_use = "dropping a ScopedSubscription unsubscribes it immediately"]
pub struct ScopedSubscription {
    handle: SubscriptionHandle,
    dispatcher: Option<Weak<Shared>>,
}

impl ScopedSubscription {
    pub fn handle(&self) -> SubscriptionHandle {
        self.handle
    }

    /// Unsubscribe now. Same result as [`EventDispatcher::unsubscribe`].
    pub fn unsubscribe(mut self) -> bool {
        self.release()
    }

    /// Give up the guard without unsubscribing; the subscription stays live.
    pub fn detach(mut self) -> SubscriptionHandle {
        self.dispatcher = None;
        self.handle
    }

    fn release(&mut self) -> bool {
        match self.dispatcher.take().and_then(|weak| weak.upgrade()) {
            Some(shared) => shared.unsubscribe(self.handle),
            None => false,
        }
    }
}

impl Drop for ScopedSubscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for ScopedSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedSubscription")
            .field("handle", &self.handle)
            .field("armed", &self.dispatcher.is_some())
            .finish()
    }
}

//--------------------------------------------------
// DispatchHandle
//--------------------------------------------------

enum Pending {
    Task(JoinHandle<usize>),
    Thread(oneshot::Receiver<usize>),
    Failed(Option<String>),
}

/// Completion of a [`dispatch_async`](EventDispatcher::dispatch_async) call.
///
/// Resolves to the number of handlers invoked. Await it, or call
/// [`wait`](DispatchHandle::wait) from synchronous code.
#[must_use = "the dispatch still runs if dropped, but its result is lost"]
pub struct DispatchHandle {
    event_name: &'static str,
    pending: Pending,
}

impl DispatchHandle {
    /// Block the current thread until the dispatch finishes.
    ///
    /// Do not call this from inside an async task; await the handle instead.
    pub fn wait(self) -> Result<usize, EventSystemError> {
        futures::executor::block_on(self)
    }

    fn failed(&self, reason: String) -> EventSystemError {
        EventSystemError::AsyncDispatchFailed { event_name: self.event_name, reason }
    }
}

impl Future for DispatchHandle {
    type Output = Result<usize, EventSystemError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let outcome = match &mut this.pending {
            Pending::Task(task) => match Pin::new(task).poll(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(result) => result.map_err(|e| e.to_string()),
            },
            Pending::Thread(rx) => match Pin::new(rx).poll(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(result) => result.map_err(|_| "dispatch thread exited without a result".to_string()),
            },
            Pending::Failed(reason) => Err(reason.take().unwrap_or_else(|| "already reported".to_string())),
        };
        Poll::Ready(outcome.map_err(|reason| this.failed(reason)))
    }
}

impl fmt::Debug for DispatchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchHandle").field("event_name", &self.event_name).finish_non_exhaustive()
    }
}
