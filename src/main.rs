use clap::Parser;
use junction_sim::simulation::{JunctionConfig, SimWorld};

#[derive(Parser)]
#[command(name = "junction_sim")]
#[command(about = "Signal-controlled intersection, simulated as discrete events")]
struct Cli {
    /// Number of simulated seconds to run
    #[arg(allow_negative_numbers = true)]
    seconds: f64,

    /// Length of the yellow phase of every light
    #[arg(long, allow_negative_numbers = true)]
    transition_delay: Option<f64>,

    /// How long a group stays green before the next switch
    #[arg(long, allow_negative_numbers = true)]
    switch_group_delay: Option<f64>,

    /// Starting value of the simulation clock
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    epoch: f64,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    if !cli.seconds.is_finite() || cli.seconds < 0.0 {
        anyhow::bail!("Run duration must be a non-negative number of seconds");
    }

    let mut config = JunctionConfig::four_way().with_epoch(cli.epoch);
    if let Some(delay) = cli.transition_delay {
        config = config.with_transition_delay(delay);
    }
    if let Some(delay) = cli.switch_group_delay {
        config = config.with_switch_group_delay(delay);
    }

    let mut world = SimWorld::from_config(&config)?;

    println!("Running junction simulation for {}s...", cli.seconds);
    println!();

    let horizon = cli.epoch + cli.seconds;
    let summary = world.run_until(horizon);

    println!();
    world.print_summary();
    println!();
    if summary.drained {
        println!("SIMULATION STOPPED EARLY: no pending events");
    } else {
        println!("SIMULATION COMPLETE");
    }
    Ok(())
}
