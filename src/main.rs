use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taskman::render::render_process_list;
use taskman::{
    Process, ProcessPriority, SortCriteria, SortOrder, StorageKind, TaskManager, TaskmanConfig,
};

#[derive(Parser)]
#[command(name = "taskman", version)]
#[command(about = "In-memory task manager for simulated processes")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk through add/kill/list on one storage (all three when omitted)
    Demo {
        /// Storage variant: hash, fifo or priority
        #[arg(short, long)]
        storage: Option<String>,

        /// Maximum number of live processes
        #[arg(short, long)]
        capacity: Option<usize>,

        /// Wait this long before issuing the first request
        #[arg(long)]
        startup_delay_ms: Option<u64>,

        /// Print listings as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the resolved configuration
    Config,
}

/// Logs go to stderr so listings on stdout stay clean.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "taskman=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = TaskmanConfig::load()?;

    let (kinds, json) = match cli.command {
        Some(Commands::Demo {
            storage,
            capacity,
            startup_delay_ms,
            json,
        }) => {
            if capacity.is_some() {
                config.capacity = capacity;
            }
            if let Some(delay) = startup_delay_ms {
                config.startup_delay_ms = delay;
            }
            let kinds = match storage {
                Some(name) => vec![StorageKind::parse(&name)?],
                None => StorageKind::ALL.to_vec(),
            };
            (kinds, json)
        }
        Some(Commands::Config) => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            return Ok(());
        }
        None => (vec![config.storage], false),
    };

    if config.startup_delay_ms > 0 {
        tracing::info!("Waiting {} ms before start", config.startup_delay_ms);
        tokio::time::sleep(Duration::from_millis(config.startup_delay_ms)).await;
    }

    for kind in kinds {
        config.storage = kind;
        run_demo(&config, json)?;
    }

    Ok(())
}

fn run_demo(config: &TaskmanConfig, json: bool) -> anyhow::Result<()> {
    println!(
        "---------------- {} ----------------",
        config.storage.as_str().to_uppercase()
    );
    let manager = config.build_manager();
    match config.storage {
        StorageKind::Hash => hash_demo(&manager, json),
        StorageKind::Fifo => fifo_demo(&manager, json),
        StorageKind::Priority => priority_demo(&manager, json),
    }
}

fn print_list(processes: &[Process], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(processes)?);
    } else {
        print!("{}", render_process_list(processes));
    }
    Ok(())
}

fn try_add(manager: &TaskManager, command: &str, priority: ProcessPriority) -> Option<Process> {
    match manager.add(command, priority) {
        Ok(process) => Some(process),
        Err(e) => {
            println!("Process {} was not added: {}", command, e);
            None
        }
    }
}

fn hash_demo(manager: &TaskManager, json: bool) -> anyhow::Result<()> {
    try_add(manager, "cmd_1", ProcessPriority::Low);
    let to_remove = try_add(manager, "cmd_2", ProcessPriority::Medium);
    try_add(manager, "cmd_3", ProcessPriority::High);
    try_add(manager, "cmd_4", ProcessPriority::Low);
    try_add(manager, "cmd_5", ProcessPriority::Low);
    print_list(
        &manager.list_sorted(SortCriteria::Priority, SortOrder::Desc),
        json,
    )?;

    // Rejected once the storage is full.
    try_add(manager, "cmd_6", ProcessPriority::High);

    if let Some(process) = to_remove {
        println!("Process {} killed with result: {}", process.id(), process.kill());
    }
    print_list(
        &manager.list_sorted(SortCriteria::Priority, SortOrder::Desc),
        json,
    )
}

fn fifo_demo(manager: &TaskManager, json: bool) -> anyhow::Result<()> {
    for (command, priority) in [
        ("cmd_1", ProcessPriority::Low),
        ("cmd_2", ProcessPriority::Medium),
        ("cmd_3", ProcessPriority::High),
        ("cmd_4", ProcessPriority::Low),
        ("cmd_5", ProcessPriority::Low),
    ] {
        try_add(manager, command, priority);
    }
    print_list(&manager.list(), json)?;

    // cmd_1 makes room for cmd_6 once the storage is full.
    if let Some(process) = try_add(manager, "cmd_6", ProcessPriority::Low) {
        println!("Process {} was added with FIFO eviction", process.id());
    }
    print_list(&manager.list(), json)?;

    println!("Terminated all {} processes", manager.kill_all());
    Ok(())
}

fn priority_demo(manager: &TaskManager, json: bool) -> anyhow::Result<()> {
    try_add(manager, "cmd_1", ProcessPriority::High);
    let to_remove1 = try_add(manager, "cmd_2", ProcessPriority::High);
    let to_remove2 = try_add(manager, "cmd_3", ProcessPriority::High);
    try_add(manager, "cmd_4", ProcessPriority::High);
    let to_stop_by_itself = try_add(manager, "cmd_5", ProcessPriority::High);
    print_list(
        &manager.list_sorted(SortCriteria::Priority, SortOrder::Asc),
        json,
    )?;

    // Nothing outranks a full storage of high priority processes.
    try_add(manager, "cmd_6", ProcessPriority::Medium);
    try_add(manager, "cmd_7", ProcessPriority::Low);
    try_add(manager, "cmd_8", ProcessPriority::High);
    print_list(
        &manager.list_sorted(SortCriteria::Priority, SortOrder::Asc),
        json,
    )?;

    for process in [to_remove1, to_remove2].into_iter().flatten() {
        manager.kill(&process.id());
    }
    try_add(manager, "cmd_9", ProcessPriority::Medium);
    try_add(manager, "cmd_10", ProcessPriority::Low);
    print_list(
        &manager.list_sorted(SortCriteria::Priority, SortOrder::Asc),
        json,
    )?;

    // cmd_11 outranks cmd_10 and takes its place.
    try_add(manager, "cmd_11", ProcessPriority::Medium);
    print_list(
        &manager.list_sorted(SortCriteria::Priority, SortOrder::Asc),
        json,
    )?;

    if let Some(process) = to_stop_by_itself {
        process.kill();
    }
    print_list(
        &manager.list_sorted(SortCriteria::Priority, SortOrder::Asc),
        json,
    )?;

    for priority in ProcessPriority::ALL {
        let killed = manager.kill_group(priority);
        println!(
            "Killed {} processes with {} priority and {} left",
            killed,
            priority,
            manager.len()
        );
    }
    Ok(())
}
