//! Command dispatch over the core services.

use crate::{Cli, Command, DomainCommand, GlobalArgs, TaskCommand};
use log::info;
use serde::Serialize;
use std::error::Error;
use std::io::BufRead;
use std::sync::Arc;
use taskflow_core::{
    init_logging, now_epoch_ms, seed_defaults, AppConfig, AuthService, Blake3Hasher,
    CreateTaskRequest, CredentialHasher, DeadlineMonitor, DomainService, MemoryStore,
    MonitorScheduler, RegisterRequest, ServiceError, SqliteStore, StatsService, Store, TaskFilter,
    TaskService, TaskStatus, User, UserService,
};

type CliResult<T> = Result<T, Box<dyn Error>>;

const HOUR_MS: i64 = 60 * 60 * 1000;

struct Context {
    config: AppConfig,
    store: Arc<dyn Store>,
    hasher: Arc<dyn CredentialHasher>,
    auth: AuthService<dyn Store>,
    global: GlobalArgs,
}

impl Context {
    fn open(global: GlobalArgs) -> CliResult<Self> {
        let mut config = AppConfig::from_env()?;
        if let Some(db) = &global.db {
            config.db_path = Some(db.clone());
        }
        if let Some(level) = &global.log_level {
            config.log.level = level.clone();
        }
        if let Some(dir) = &global.log_dir {
            config.log.dir = Some(dir.clone());
        }
        init_logging(&config.log)?;

        let hasher: Arc<dyn CredentialHasher> = Arc::new(Blake3Hasher);
        let store: Arc<dyn Store> = match &config.db_path {
            Some(path) => Arc::new(SqliteStore::open(path)?),
            None => {
                let store = Arc::new(MemoryStore::new());
                seed_defaults(&*store, hasher.as_ref())?;
                store
            }
        };
        info!(
            "event=store_open module=cli status=ok backend={}",
            if config.db_path.is_some() { "sqlite" } else { "memory" }
        );

        Ok(Self {
            auth: AuthService::new(Arc::clone(&store), Arc::clone(&hasher)),
            config,
            store,
            hasher,
            global,
        })
    }

    /// Signs in with `--as` / `--password` and returns the acting user.
    fn actor(&self) -> CliResult<User> {
        let (Some(email), Some(password)) = (&self.global.actor, &self.global.password) else {
            return Err(ServiceError::Unauthenticated.into());
        };
        let session = self.auth.login(email, password)?;
        Ok(self.auth.authenticate(&session.token)?)
    }
}

pub(crate) fn run(cli: Cli) -> CliResult<()> {
    let ctx = Context::open(cli.global)?;

    match cli.command {
        Command::Seed => print_json(&seed_defaults(&*ctx.store, ctx.hasher.as_ref())?),
        Command::Register {
            name,
            email,
            password,
            role,
            domain,
        } => print_json(&ctx.auth.register(&RegisterRequest {
            name,
            email,
            password,
            role,
            preferred_domain: domain,
        })?),
        Command::Login => {
            let (Some(email), Some(password)) = (&ctx.global.actor, &ctx.global.password) else {
                return Err(ServiceError::Unauthenticated.into());
            };
            print_json(&ctx.auth.login(email, password)?)
        }
        Command::Domains { command } => run_domains(&ctx, command),
        Command::SetDomain { domain } => {
            let actor = ctx.actor()?;
            let users = UserService::new(Arc::clone(&ctx.store));
            print_json(&users.set_preferred_domain(&actor, &domain)?)
        }
        Command::Users { domain } => {
            let actor = ctx.actor()?;
            let users = UserService::new(Arc::clone(&ctx.store));
            print_json(&users.list(&actor, domain.as_deref())?)
        }
        Command::Tasks { command } => run_tasks(&ctx, command),
        Command::Stats => {
            let actor = ctx.actor()?;
            let stats = StatsService::new(Arc::clone(&ctx.store));
            print_json(&stats.stats(&actor, now_epoch_ms())?)
        }
        Command::Sweep => {
            let monitor = DeadlineMonitor::new(Arc::clone(&ctx.store));
            print_json(&monitor.tick()?)
        }
        Command::Monitor { interval } => {
            let interval = interval.unwrap_or(ctx.config.monitor_interval);
            let monitor = DeadlineMonitor::new(Arc::clone(&ctx.store));
            let handle = MonitorScheduler::start(monitor, interval)?;
            eprintln!(
                "deadline monitor running every {}s; press Enter or close stdin to stop",
                interval.as_secs()
            );
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)?;
            let completed = handle.completed_ticks();
            handle.stop();
            print_json(&serde_json::json!({ "completedTicks": completed }))
        }
    }
}

fn run_domains(ctx: &Context, command: DomainCommand) -> CliResult<()> {
    let domains = DomainService::new(Arc::clone(&ctx.store));
    match command {
        DomainCommand::List => print_json(&domains.list()?),
        DomainCommand::Create { name, description } => {
            let actor = ctx.actor()?;
            print_json(&domains.create(&actor, &name, description.as_deref())?)
        }
    }
}

fn run_tasks(ctx: &Context, command: TaskCommand) -> CliResult<()> {
    let actor = ctx.actor()?;
    let tasks = TaskService::new(Arc::clone(&ctx.store));
    let now_ms = now_epoch_ms();

    match command {
        TaskCommand::Create {
            title,
            domain,
            description,
            priority,
            deadline,
            due_in_hours,
        } => {
            let deadline = match deadline {
                Some(deadline) => deadline,
                None => deadline_after_hours(now_ms, due_in_hours)?,
            };
            let request = CreateTaskRequest {
                title,
                description,
                domain,
                deadline,
                priority,
            };
            print_json(&tasks.create(&actor, &request, now_ms)?)
        }
        TaskCommand::List {
            assigned_to,
            domain,
        } => print_json(&tasks.list(
            &actor,
            &TaskFilter {
                assigned_to,
                domain,
            },
        )?),
        TaskCommand::Show { id } => print_json(&tasks.get(id)?),
        TaskCommand::Complete { id } => {
            print_json(&tasks.update_status(&actor, id, TaskStatus::Completed, now_ms)?)
        }
        TaskCommand::Reopen { id } => {
            print_json(&tasks.update_status(&actor, id, TaskStatus::Pending, now_ms)?)
        }
    }
}

/// `now_ms` shifted by `hours`; rejects shifts outside the `i64` millisecond range.
fn deadline_after_hours(now_ms: i64, hours: i64) -> CliResult<i64> {
    hours
        .checked_mul(HOUR_MS)
        .and_then(|offset| now_ms.checked_add(offset))
        .ok_or_else(|| format!("--due-in-hours {hours} is out of range").into())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
