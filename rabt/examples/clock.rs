//! A scheduler wired through the rabt container.

use std::sync::Arc;

use rabt::prelude::*;

// === Define your traits and types ===

trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

#[derive(Default)]
struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
    }
}

implements!(SystemClock => dyn Clock);

struct Config {
    timeout: u64,
}

struct Job {
    name: String,
    due_at: u64,
}

struct Scheduler {
    clock: Arc<dyn Clock>,
    config: Arc<Config>,
}

impl Inject<(Arc<dyn Clock>, Arc<Config>)> for Scheduler {
    fn inject((clock, config): (Arc<dyn Clock>, Arc<Config>)) -> Self {
        Scheduler { clock, config }
    }
}

impl Scheduler {
    fn schedule(&self, name: &str) -> Job {
        Job {
            name: name.to_string(),
            due_at: self.clock.now() + self.config.timeout,
        }
    }
}

// === Group the infrastructure bindings ===

#[derive(Default)]
struct InfrastructureModule;

impl Module for InfrastructureModule {
    fn load(&self, container: &Container) {
        container
            .register_instance(Arc::new(Config { timeout: 30 }))
            .register_shared::<dyn Clock, SystemClock, ()>();
    }
}

fn main() -> Result<()> {
    // Initialize tracing (logging)
    tracing_subscriber::fmt()
        .with_env_filter("rabt_container=debug")
        .init();

    // Build the container
    let container = Container::new();
    container
        .register_module::<InfrastructureModule>()
        .register_shared::<Scheduler, Scheduler, (Arc<dyn Clock>, Arc<Config>)>()
        .register_arg_factory(|name: String| Job { name, due_at: 0 });

    container.validate()?;

    // Resolve and use
    let scheduler: Arc<Scheduler> = container.resolve()?;
    let job = scheduler.schedule("nightly-backup");
    println!("{} due at {}", job.name, job.due_at);

    let draft: ArgFactory<String, Job> = container.resolve()?;
    let job = draft("adhoc".to_string());
    println!("{} due at {}", job.name, job.due_at);

    // A missing binding is an error, not a panic
    match container.resolve_named::<Arc<dyn Clock>>("utc") {
        Ok(_) => println!("unexpected: utc clock is registered"),
        Err(e) => println!("\n{e}"),
    }

    tracing::info!(services = container.len(), "Done");
    Ok(())
}
