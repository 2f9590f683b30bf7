//! End-to-end resolution scenarios.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rabt::prelude::*;

// === Clock ===

trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

#[derive(Default)]
struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        1_700_000_000
    }
}

implements!(SystemClock => dyn Clock);

// === Config ===

struct Config {
    timeout: AtomicUsize,
}

struct HttpClient {
    config: Arc<Config>,
}

struct Poller {
    config: Arc<Config>,
}

#[test]
fn shared_binding_builds_a_new_instance_per_resolve() {
    let container = Container::new();
    container.register_shared::<dyn Clock, SystemClock, ()>();

    let a: Arc<dyn Clock> = container.resolve().unwrap();
    let b: Arc<dyn Clock> = container.resolve().unwrap();

    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(a.now(), b.now());
    assert_eq!(container.binding_of::<Arc<dyn Clock>>(""), Some(Binding::Shared));
}

#[test]
fn instance_is_shared_between_unrelated_chains() {
    let container = Container::new();
    container
        .register_instance(Arc::new(Config {
            timeout: AtomicUsize::new(30),
        }))
        .register::<HttpClient>(|r| Ok(HttpClient { config: r.resolve()? }))
        .register::<Poller>(|r| Ok(Poller { config: r.resolve()? }));

    let client: HttpClient = container.resolve().unwrap();
    let poller: Poller = container.resolve().unwrap();
    assert!(Arc::ptr_eq(&client.config, &poller.config));

    // a change through one handle is visible through the other
    client.config.timeout.store(45, Ordering::SeqCst);
    assert_eq!(poller.config.timeout.load(Ordering::SeqCst), 45);

    let direct: Arc<Config> = container.resolve().unwrap();
    assert_eq!(direct.timeout.load(Ordering::SeqCst), 45);
}

// === Misconfigured cycle ===

static BUILT: AtomicUsize = AtomicUsize::new(0);

struct ServiceA {
    _b: Arc<ServiceB>,
}

struct ServiceB {
    _a: Arc<ServiceA>,
}

impl Inject<(Arc<ServiceB>,)> for ServiceA {
    fn inject((b,): (Arc<ServiceB>,)) -> Self {
        BUILT.fetch_add(1, Ordering::SeqCst);
        ServiceA { _b: b }
    }
}

impl Inject<(Arc<ServiceA>,)> for ServiceB {
    fn inject((a,): (Arc<ServiceA>,)) -> Self {
        BUILT.fetch_add(1, Ordering::SeqCst);
        ServiceB { _a: a }
    }
}

#[test]
fn cycle_is_rejected_before_anything_is_built() {
    let container = Container::new();
    container
        .register_shared::<ServiceA, ServiceA, (Arc<ServiceB>,)>()
        .register_shared::<ServiceB, ServiceB, (Arc<ServiceA>,)>();

    match container.resolve::<Arc<ServiceA>>().err() {
        Some(RabtError::CircularDependency(e)) => {
            assert_eq!(e.key, ServiceKey::of::<Arc<ServiceA>>());
            assert_eq!(
                e.chain,
                vec![
                    ServiceKey::of::<Arc<ServiceA>>(),
                    ServiceKey::of::<Arc<ServiceB>>(),
                    ServiceKey::of::<Arc<ServiceA>>(),
                ]
            );
            assert!(e.to_string().contains("Arc<ServiceA> → Arc<ServiceB> → Arc<ServiceA>"));
        }
        other => panic!("Expected CircularDependency, got: {other:?}"),
    }

    assert_eq!(BUILT.load(Ordering::SeqCst), 0);

    // the declared lists expose the same cycle without resolving
    assert!(matches!(
        container.validate(),
        Err(RabtError::CircularDependency(_))
    ));
}

#[test]
fn cycle_through_raw_resolvers_does_not_overflow() {
    struct Left;
    struct Right;

    let container = Container::new();
    container
        .register::<Left>(|r| r.resolve::<Right>().map(|_| Left))
        .register::<Right>(|r| r.resolve::<Left>().map(|_| Right));

    for _ in 0..3 {
        let err = container.resolve::<Right>().err().map(|e| e.key().clone());
        assert_eq!(err, Some(ServiceKey::of::<Right>()));
    }
}

#[test]
fn unrelated_resolves_work_after_a_cycle() {
    struct Loop;

    let container = Container::new();
    container
        .register::<Loop>(|r| r.resolve::<Loop>())
        .register_instance(Arc::new(7u32));

    assert!(container.resolve::<Loop>().is_err());
    assert_eq!(*container.resolve::<Arc<u32>>().unwrap(), 7);
}

// === Names ===

#[test]
fn names_select_bindings() {
    let container = Container::new();
    container
        .register_named::<String>("primary", |_| Ok("db-1".into()))
        .register_named::<String>("replica", |_| Ok("db-2".into()));

    assert_eq!(container.resolve_named::<String>("primary").unwrap(), "db-1");
    assert_eq!(container.resolve_named::<String>("replica").unwrap(), "db-2");

    match container.resolve_named::<String>("archive").unwrap_err() {
        RabtError::NotRegistered(e) => {
            assert_eq!(e.requested.name(), Some("archive"));
        }
        other => panic!("Expected NotRegistered, got: {other:?}"),
    }
}

#[test]
fn named_interface_bindings() {
    struct UtcClock;
    impl Clock for UtcClock {
        fn now(&self) -> u64 {
            0
        }
    }
    implements!(UtcClock => dyn Clock);

    let container = Container::new();
    container
        .register_shared::<dyn Clock, SystemClock, ()>()
        .register_as_named::<dyn Clock, UtcClock>("utc", |_| Ok(Arc::new(UtcClock)));

    let system: Arc<dyn Clock> = container.resolve().unwrap();
    let utc: Arc<dyn Clock> = container.resolve_named("utc").unwrap();
    assert_eq!(system.now(), 1_700_000_000);
    assert_eq!(utc.now(), 0);
}

#[test]
fn reregistering_replaces_the_binding() {
    struct FrozenClock;
    impl Clock for FrozenClock {
        fn now(&self) -> u64 {
            42
        }
    }
    implements!(FrozenClock => dyn Clock);

    let container = Container::new();
    container.register_shared::<dyn Clock, SystemClock, ()>();
    container.register_as::<dyn Clock, FrozenClock>(|_| Ok(Arc::new(FrozenClock)));

    let clock: Arc<dyn Clock> = container.resolve().unwrap();
    assert_eq!(clock.now(), 42);
    assert_eq!(container.len(), 1);
}

// === Factories ===

struct Report {
    id: u32,
    generated_at: u64,
}

#[test]
fn factories_defer_construction() {
    let built = Arc::new(AtomicUsize::new(0));

    let container = Container::new();
    container.register_factory({
        let built = built.clone();
        move || {
            built.fetch_add(1, Ordering::SeqCst);
            Report { id: 0, generated_at: 0 }
        }
    });

    let make: Factory<Report> = container.resolve().unwrap();
    assert_eq!(built.load(Ordering::SeqCst), 0);

    let _first = make();
    let _second = make();
    assert_eq!(built.load(Ordering::SeqCst), 2);
}

#[test]
fn arg_factories_take_runtime_arguments() {
    let container = Container::new();
    container.register_shared::<dyn Clock, SystemClock, ()>();

    let clock: Arc<dyn Clock> = container.resolve().unwrap();
    container.register_arg_factory(move |id: u32| Report {
        id,
        generated_at: clock.now(),
    });

    let make: ArgFactory<u32, Report> = container.resolve().unwrap();
    let report = make(17);
    assert_eq!(report.id, 17);
    assert_eq!(report.generated_at, 1_700_000_000);
}

// === Modules ===

#[derive(Default)]
struct ClockModule;

impl Module for ClockModule {
    fn load(&self, container: &Container) {
        container
            .register_shared::<dyn Clock, SystemClock, ()>()
            .register_singleton::<Config>(|_| {
                Ok(Config {
                    timeout: AtomicUsize::new(30),
                })
            });
    }
}

#[test]
fn module_loads_its_batch() {
    let container = Container::new();
    container.register_module::<ClockModule>();

    assert_eq!(container.len(), 2);
    let clock: Arc<dyn Clock> = container.resolve().unwrap();
    assert_eq!(clock.now(), 1_700_000_000);

    let a: Arc<Config> = container.resolve().unwrap();
    let b: Arc<Config> = container.resolve().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert!(container.validate().is_ok());
}

// === Dependencies ===

struct Scheduler {
    clock: Arc<dyn Clock>,
    config: Arc<Config>,
}

impl Inject<(Arc<dyn Clock>, Arc<Config>)> for Scheduler {
    fn inject((clock, config): (Arc<dyn Clock>, Arc<Config>)) -> Self {
        Scheduler { clock, config }
    }
}

#[test]
fn shared_binding_resolves_declared_dependencies() {
    let container = Container::new();
    container
        .register_module::<ClockModule>()
        .register_shared::<Scheduler, Scheduler, (Arc<dyn Clock>, Arc<Config>)>();

    let scheduler: Arc<Scheduler> = container.resolve().unwrap();
    assert_eq!(scheduler.clock.now(), 1_700_000_000);
    assert_eq!(scheduler.config.timeout.load(Ordering::SeqCst), 30);
    assert!(container.validate().is_ok());
}

#[test]
fn missing_dependency_is_reported_with_its_consumer() {
    let container = Container::new();
    container.register_shared::<Scheduler, Scheduler, (Arc<dyn Clock>, Arc<Config>)>();

    match container.resolve::<Arc<Scheduler>>().err() {
        Some(RabtError::NotRegistered(e)) => {
            assert_eq!(e.requested, ServiceKey::of::<Arc<dyn Clock>>());
            assert_eq!(e.required_by, Some(ServiceKey::of::<Arc<Scheduler>>()));
        }
        other => panic!("Expected NotRegistered, got: {other:?}"),
    }
}

#[test]
fn resolver_errors_propagate() {
    let container = Container::new();
    container.register::<u16>(|_| Err(RabtError::construction::<u16>("port out of range")));
    container.register::<String>(|r| r.resolve::<u16>().map(|p| p.to_string()));

    match container.resolve::<String>().unwrap_err() {
        RabtError::ConstructionFailed { key, source } => {
            assert_eq!(key, ServiceKey::of::<u16>());
            assert_eq!(source.to_string(), "port out of range");
        }
        other => panic!("Expected ConstructionFailed, got: {other:?}"),
    }
}

#[test]
fn suggestions_point_at_near_misses() {
    struct UserService;

    let container = Container::with_settings(ContainerSettings {
        max_suggestions: 1,
        ..ContainerSettings::default()
    });
    container.register_instance(Arc::new(UserService));

    match container.resolve::<UserService>().err() {
        Some(RabtError::NotRegistered(e)) => {
            assert_eq!(e.suggestions, vec![ServiceKey::of::<Arc<UserService>>()]);
            assert!(e.to_string().contains("Did you mean"));
        }
        other => panic!("Expected NotRegistered, got: {other:?}"),
    }
}
