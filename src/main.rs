//! Demo surface for the steelgrip robot.
//!
//! Plays the collaborator roles the core leaves external: order
//! intake, bootstrap inventory loading, operator confirmation in
//! semi-automatic mode, and status presentation.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use steelgrip::{
    Approval, AutoApprove, AutomationMode, CycleOutcome, Inventory, Item, ItemSpec, Navigator,
    Order, OrderLine, Robot, RobotConfig, RobotDeps, SharedInventory, SimulatedGripper,
    SimulatedNavigator, SimulatedSensor, SimulationProfile,
};

#[derive(Parser)]
#[command(name = "steelgrip", about = "Autonomous warehouse fulfilment robot")]
struct Cli {
    /// Automation mode
    #[arg(long, value_enum, default_value = "auto", env = "STEELGRIP_MODE")]
    mode: ModeArg,

    /// JSON file with bootstrap inventory records
    #[arg(long, env = "STEELGRIP_INVENTORY")]
    inventory: Option<PathBuf>,

    /// JSON file with robot configuration overrides
    #[arg(long, env = "STEELGRIP_CONFIG")]
    config: Option<PathBuf>,

    /// Disable simulated obstacles and sensor/gripper faults
    #[arg(long)]
    reliable: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Auto,
    Semi,
}

#[derive(Subcommand)]
enum Command {
    /// Submit two demo orders and run them to completion
    Demo,
    /// Submit demo orders, then run at most N fulfilment cycles
    Run {
        #[arg(default_value_t = 3)]
        cycles: usize,
    },
    /// Print the bootstrap inventory and exit
    Items,
}

/// Operator confirmation over stdin for semi-automatic mode.
struct StdinApproval;

#[async_trait]
impl Approval for StdinApproval {
    async fn confirm(&self, action: &str) -> bool {
        let action = action.to_string();
        tokio::task::spawn_blocking(move || {
            use std::io::Write;
            print!("[CONFIRM] {action}? (y/n): ");
            std::io::stdout().flush().ok();
            let mut line = String::new();
            if std::io::stdin().read_line(&mut line).is_err() {
                return false;
            }
            matches!(line.trim().to_lowercase().as_str(), "y" | "yes")
        })
        .await
        .unwrap_or(false)
    }
}

fn demo_items() -> Vec<ItemSpec> {
    let raw = [
        ("SKU001", "Laptop", 2.5, true, "A1"),
        ("SKU002", "Cable", 0.1, false, "A2"),
        ("SKU003", "Monitor", 5.0, true, "B1"),
        ("SKU004", "Keyboard", 0.8, false, "B2"),
        ("SKU005", "Adapter", 0.5, false, "A3"),
    ];
    raw.into_iter()
        .map(|(id, name, weight, fragile, location)| ItemSpec {
            id: id.to_string(),
            name: name.to_string(),
            weight,
            fragile,
            location: location.to_string(),
        })
        .collect()
}

fn load_item_specs(path: Option<&PathBuf>) -> anyhow::Result<Vec<ItemSpec>> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading inventory file {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("parsing inventory file {}", path.display()))
        }
        None => Ok(demo_items()),
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<RobotConfig> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading config file {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("parsing config file {}", path.display()))
        }
        None => Ok(RobotConfig::default()),
    }
}

fn build_inventory(specs: Vec<ItemSpec>, max_item_weight: f64) -> anyhow::Result<SharedInventory> {
    let mut inventory = Inventory::with_max_weight(max_item_weight);
    for spec in specs {
        let item = Item::try_from(spec).context("invalid bootstrap item")?;
        inventory
            .add_item(item)
            .context("loading bootstrap inventory")?;
    }
    Ok(SharedInventory::new(inventory))
}

fn print_inventory(inventory: &SharedInventory) {
    let items = inventory.items();
    if items.is_empty() {
        println!("Warehouse is empty");
        return;
    }
    println!("ID       | NAME      | WEIGHT | FRAGILE | LOCATION");
    println!("---------+-----------+--------+---------+---------");
    for item in &items {
        println!(
            "{:<8} | {:<9} | {:>6.1} | {:<7} | {}",
            item.id(),
            item.name(),
            item.weight(),
            item.fragile(),
            item.location()
        );
    }
    println!("\nTotal items: {}", items.len());
}

fn print_summary(robot: &Robot, outcomes: &[CycleOutcome]) {
    println!("\nRUN SUMMARY");
    for outcome in outcomes {
        match outcome {
            CycleOutcome::QueueEmpty => println!("  queue empty"),
            CycleOutcome::TaskCompleted { order_status, .. } => {
                println!("  task completed (order now {order_status:?})");
            }
            CycleOutcome::TaskFailed { reason, .. } => println!("  task failed: {reason}"),
        }
    }
    let snapshot = robot.snapshot(10);
    println!(
        "\nstatus={:?} battery={:.1}/{:.1} queue_depth={} packed_orders={:?}",
        snapshot.status,
        snapshot.battery_level,
        snapshot.battery_capacity,
        snapshot.queue_depth,
        robot.packed_orders()
    );
    println!("\nRecent operations:");
    for entry in &snapshot.recent_log {
        println!("  [{}] {}", entry.at.format("%H:%M:%S"), entry.message);
    }
}

fn print_environment(navigator: &SimulatedNavigator, sensor: &SimulatedSensor) {
    println!("\nEnvironment:");
    println!("  location: {}", navigator.location());
    let obstacles = navigator.obstacle_events();
    if obstacles.is_empty() {
        println!("  obstacle events: (none)");
    } else {
        println!("  obstacle events:");
        for event in &obstacles {
            println!("    - {event}");
        }
    }
    let readings = sensor.readings();
    if readings.is_empty() {
        println!("  sensor readings: (none)");
    } else {
        println!("  sensor readings:");
        for reading in &readings {
            println!("    - {reading}");
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_ref())?;
    config.automation_mode = match cli.mode {
        ModeArg::Auto => AutomationMode::FullAuto,
        ModeArg::Semi => AutomationMode::SemiAuto,
    };

    let specs = load_item_specs(cli.inventory.as_ref())?;
    let inventory = build_inventory(specs, config.max_item_weight)?;

    if let Command::Items = cli.command {
        print_inventory(&inventory);
        return Ok(());
    }

    let profile = if cli.reliable {
        SimulationProfile::reliable()
    } else {
        SimulationProfile::default()
    };
    let approval: Arc<dyn Approval> = match config.automation_mode {
        AutomationMode::FullAuto => Arc::new(AutoApprove),
        AutomationMode::SemiAuto => Arc::new(StdinApproval),
    };
    let navigator = Arc::new(SimulatedNavigator::new("DOCK", config.move_cost, &profile));
    let sensor = Arc::new(SimulatedSensor::new(1.0, &profile));
    let deps = RobotDeps {
        inventory: inventory.clone(),
        navigator: navigator.clone(),
        sensor: sensor.clone(),
        gripper: Arc::new(SimulatedGripper::new(1.0, &profile)),
        approval,
    };
    let mut robot = Robot::new(config, deps).context("building robot")?;

    println!("steelgrip ready: {} item(s) in the warehouse\n", inventory.len());
    print_inventory(&inventory);

    let demo_orders = vec![
        Order::new(
            "WALK-IN",
            vec![OrderLine::new("SKU001", 2), OrderLine::new("SKU003", 1)],
        ),
        Order::new("WEB-817", vec![OrderLine::new("SKU004", 1)]),
    ];
    for order in demo_orders {
        match robot.submit_order(order) {
            Ok(receipt) => println!(
                "\nadmitted {} with {} task(s)",
                receipt.reference, receipt.tasks_queued
            ),
            Err(reason) => println!("\norder rejected: {reason}"),
        }
    }

    let outcomes = match cli.command {
        Command::Demo => robot.drain_queue().await?,
        Command::Run { cycles } => {
            let mut outcomes = Vec::new();
            for _ in 0..cycles {
                match robot.run_cycle().await? {
                    CycleOutcome::QueueEmpty => break,
                    outcome => outcomes.push(outcome),
                }
            }
            outcomes
        }
        Command::Items => unreachable!("handled above"),
    };

    print_summary(&robot, &outcomes);
    print_environment(&navigator, &sensor);
    Ok(())
}
