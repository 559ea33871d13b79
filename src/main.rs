//! Blocks-World Planner
//!
//! Plans the arm actions that carry lettered blocks from an initial table
//! arrangement into a goal arrangement across four locations, the fourth
//! doubling as the solver's buffer. Prints the executed plan and the
//! resulting table, or a diagnostic naming where planning got stuck.

use clap::{Args, Parser, Subcommand};
use log::LevelFilter;

use blockworld::{actions, arm, blocks, render, session};

use actions::Step;
use arm::RobotArm;
use blocks::{Symbol, TableState};
use render::{format_plan, format_table};
use session::{Session, StateObserver};

/// Plans arm actions that rearrange blocks into a goal arrangement.
#[derive(Parser)]
#[command(name = "blockworld")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace) and print each step.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Solve a problem given as per-location stacks.
    Solve {
        #[command(flatten)]
        layouts: Layouts,
    },
    /// Report whether the initial arrangement already matches the goal.
    Check {
        #[command(flatten)]
        layouts: Layouts,
    },
    /// Walk through the built-in demonstration problem.
    Demo,
}

/// Per-location stacks for the initial and goal arrangements. Each value
/// lists one stack bottom-first, so "A,B" puts A on the table and B on A.
#[derive(Args)]
struct Layouts {
    /// Initial stack at L1.
    #[arg(long, value_name = "BLOCKS", default_value = "")]
    init_l1: String,
    /// Initial stack at L2.
    #[arg(long, value_name = "BLOCKS", default_value = "")]
    init_l2: String,
    /// Initial stack at L3.
    #[arg(long, value_name = "BLOCKS", default_value = "")]
    init_l3: String,
    /// Initial stack at L4.
    #[arg(long, value_name = "BLOCKS", default_value = "")]
    init_l4: String,
    /// Goal stack at L1.
    #[arg(long, value_name = "BLOCKS", default_value = "")]
    goal_l1: String,
    /// Goal stack at L2.
    #[arg(long, value_name = "BLOCKS", default_value = "")]
    goal_l2: String,
    /// Goal stack at L3.
    #[arg(long, value_name = "BLOCKS", default_value = "")]
    goal_l3: String,
    /// Goal stack at L4.
    #[arg(long, value_name = "BLOCKS", default_value = "")]
    goal_l4: String,
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);
    let trace = cli.verbose > 0;

    let outcome = match &cli.command {
        Some(Command::Solve { layouts }) => run_solve(layouts, trace),
        Some(Command::Check { layouts }) => run_check(layouts),
        Some(Command::Demo) => run_demo(trace),
        // default: walk through the demonstration problem
        None => run_demo(trace),
    };

    if let Err(message) = outcome {
        eprintln!("{message}");
        std::process::exit(1);
    }
}

/// Routes log records to stderr with a timestamp, keeping stdout free
/// for the plan and table output.
fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let configured = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply();
    if let Err(error) = configured {
        eprintln!("logger setup failed: {error}");
    }
}

/// Prints each executed step and the table after it.
struct TraceObserver;

impl StateObserver for TraceObserver {
    fn on_step(&mut self, step: &Step, table: &TableState, arm: &RobotArm) {
        println!();
        println!("-> {step}");
        println!("{}", format_table(table));
        if let Some(symbol) = arm.holding() {
            println!("arm holds {symbol}");
        }
    }
}

/// Solves the problem described by the layout flags.
fn run_solve(layouts: &Layouts, trace: bool) -> Result<(), String> {
    let (initial, goal) = parse_layouts(layouts)?;
    solve_and_report(initial, goal, trace)
}

/// Reports whether the initial arrangement already satisfies the goal.
fn run_check(layouts: &Layouts) -> Result<(), String> {
    let (initial, goal) = parse_layouts(layouts)?;
    let mut session = Session::new();
    session
        .configure(initial, goal)
        .map_err(|error| error.to_string())?;
    if session.is_solved() {
        println!("Already solved");
    } else {
        println!("Not solved yet");
    }
    Ok(())
}

/// Solves the built-in demonstration problem.
fn run_demo(trace: bool) -> Result<(), String> {
    let (initial, goal) = demo_states();
    solve_and_report(initial, goal, trace)
}

/// Configures a session, runs the solver and prints the plan and the
/// final table. A planning failure still shows the steps taken so far.
fn solve_and_report(initial: TableState, goal: TableState, trace: bool) -> Result<(), String> {
    println!("Initial arrangement:");
    println!("{}", format_table(&initial));

    let mut session = Session::new();
    session
        .configure(initial, goal)
        .map_err(|error| error.to_string())?;
    if trace {
        session.set_observer(Box::new(TraceObserver));
    }

    if let Err(error) = session.run() {
        if !session.plan().is_empty() {
            eprintln!("Steps taken before the failure:");
            eprintln!("{}", format_plan(session.plan()));
        }
        return Err(format!("planning failed: {error}"));
    }

    println!();
    if session.plan().is_empty() {
        println!("Already at the goal, no steps required");
    } else {
        println!("Plan, {} steps:", session.plan().len());
        println!("{}", format_plan(session.plan()));
    }
    println!();
    println!("Final arrangement:");
    println!("{}", format_table(session.current()));
    Ok(())
}

/// The demonstration problem: two single blocks and one two-block stack
/// regroup into two stacks on previously empty locations.
fn demo_states() -> (TableState, TableState) {
    let a = Symbol::new('A');
    let b = Symbol::new('B');
    let c = Symbol::new('C');
    let d = Symbol::new('D');
    let initial = TableState::from_layout([vec![a], vec![b], vec![c, d], vec![]]);
    let goal = TableState::from_layout([vec![], vec![c, d], vec![], vec![a, b]]);
    (initial, goal)
}

fn parse_layouts(layouts: &Layouts) -> Result<(TableState, TableState), String> {
    let initial = parse_layout(
        &layouts.init_l1,
        &layouts.init_l2,
        &layouts.init_l3,
        &layouts.init_l4,
    )?;
    let goal = parse_layout(
        &layouts.goal_l1,
        &layouts.goal_l2,
        &layouts.goal_l3,
        &layouts.goal_l4,
    )?;
    Ok((initial, goal))
}

fn parse_layout(l1: &str, l2: &str, l3: &str, l4: &str) -> Result<TableState, String> {
    Ok(TableState::from_layout([
        parse_stack(l1)?,
        parse_stack(l2)?,
        parse_stack(l3)?,
        parse_stack(l4)?,
    ]))
}

/// Parses one stack: single-character labels separated by commas or
/// spaces, bottom block first, lowercase folded to uppercase.
fn parse_stack(input: &str) -> Result<Vec<Symbol>, String> {
    input
        .split([',', ' '])
        .filter(|token| !token.is_empty())
        .map(|token| {
            let mut chars = token.chars();
            match (chars.next(), chars.next()) {
                (Some(label), None) if label.is_ascii_alphanumeric() => {
                    Ok(Symbol::new(label.to_ascii_uppercase()))
                }
                _ => Err(format!("'{token}' is not a block label")),
            }
        })
        .collect()
}
