//! Setun Circuit Simulator - CLI Entry Point
//!
//! Commands:
//! - `setun-sim run <scheme>` - Run a scheme for a number of steps
//! - `setun-sim monitor <scheme>` - Interactive terminal monitor
//! - `setun-sim info <scheme>` - Describe a scheme's elements and connections
//! - `setun-sim libs` - List the built-in element libraries
//! - `setun-sim demo <out>` - Write a sample scheme
//! - `setun-sim test` - Built-in self-test

use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use clap::{Parser, Subcommand};
use log::{info, LevelFilter};
use setun_sim::{Circuit, PortRef, Registry, SimConfig, Simulator};

#[derive(Parser)]
#[command(name = "setun-sim")]
#[command(author = "Yigit")]
#[command(version)]
#[command(about = "A ternary logic circuit simulator built from the Setun element set")]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scheme for a number of steps
    Run {
        /// Path to the scheme file
        scheme: PathBuf,
        /// Number of steps (default: max_steps from the config)
        #[arg(short = 'n', long)]
        steps: Option<u64>,
        /// Wait this long between steps
        #[arg(short, long)]
        interval_ms: Option<u64>,
        /// Print element values after every step
        #[arg(short, long)]
        trace: bool,
        /// Print the final values as JSON
        #[arg(long)]
        json: bool,
    },
    /// Interactive terminal monitor
    Monitor {
        /// Path to the scheme file
        scheme: PathBuf,
    },
    /// Describe a scheme's elements and connections
    Info {
        /// Path to the scheme file
        scheme: PathBuf,
    },
    /// List the built-in element libraries
    Libs,
    /// Write a sample scheme
    Demo {
        /// Output scheme file
        output: PathBuf,
    },
    /// Run the built-in self-test
    Test,
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(if cli.verbose { LevelFilter::Debug } else { LevelFilter::Warn })
        .parse_default_env()
        .format_timestamp(None)
        .init();

    let config = match &cli.config {
        Some(path) => match SimConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("❌ Failed to load config {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => SimConfig::default(),
    };

    match cli.command {
        Some(Commands::Run { scheme, steps, interval_ms, trace, json }) => {
            let steps = steps.unwrap_or(config.max_steps);
            let interval = interval_ms.map(Duration::from_millis);
            run_scheme(&scheme, steps, interval, trace || config.trace, json);
        }
        Some(Commands::Monitor { scheme }) => {
            monitor_scheme(&scheme, &config);
        }
        Some(Commands::Info { scheme }) => {
            describe_scheme(&scheme);
        }
        Some(Commands::Libs) => {
            list_libraries(&config);
        }
        Some(Commands::Demo { output }) => {
            write_demo(&output, &config);
        }
        Some(Commands::Test) => {
            run_self_test();
        }
        None => {
            println!("Setun Circuit Simulator v{}", env!("CARGO_PKG_VERSION"));
            println!("A ternary logic circuit simulator");
            println!();
            println!("Use --help for available commands");
            println!();
            demo_circuit(&config);
        }
    }
}

fn load_or_exit(path: &Path) -> Simulator {
    let mut sim = Simulator::new();
    if let Err(e) = sim.load(path) {
        eprintln!("❌ Failed to load {}: {}", path.display(), e);
        std::process::exit(1);
    }
    sim
}

fn run_scheme(path: &Path, steps: u64, interval: Option<Duration>, trace: bool, json: bool) {
    let mut sim = load_or_exit(path);

    if !json {
        println!("🔧 Running: {}", path.display());
        println!("📂 Loaded {} elements, {} connections", sim.circuit().len(), sim.circuit().connections().len());
        println!();
        println!("━━━ Simulation ━━━");
    }

    let started = Instant::now();
    for _ in 0..steps {
        let tick = Instant::now();
        let n = sim.step();
        if trace && !json {
            print_values(n, &sim);
        }
        if let Some(period) = interval {
            // sleep out the rest of the period
            if let Some(rest) = period.checked_sub(tick.elapsed()) {
                thread::sleep(rest);
            }
        }
    }
    info!("ran {} steps in {:?}", steps, started.elapsed());

    if json {
        match serde_json::to_string_pretty(&sim.snapshot()) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("❌ Failed to encode snapshot: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    println!();
    println!("━━━ Result ━━━");
    println!("Steps: {}", sim.steps());
    print_values(sim.steps(), &sim);
}

fn print_values(step: u64, sim: &Simulator) {
    for el in sim.snapshot() {
        let ins: String = el.inputs.iter().map(|t| t.symbol()).collect();
        let outs: String = el.outputs.iter().map(|t| t.symbol()).collect();
        println!("{:>5}  #{:<4} {:<20} in [{}]  out [{}]", step, el.id, el.name, ins, outs);
    }
}

fn monitor_scheme(path: &Path, config: &SimConfig) {
    let sim = load_or_exit(path);

    #[cfg(feature = "tui")]
    {
        println!("🚀 Launching monitor...");
        if let Err(e) = setun_sim::run_monitor(sim, Duration::from_millis(config.step_interval_ms)) {
            eprintln!("❌ Monitor error: {}", e);
            std::process::exit(1);
        }
    }

    #[cfg(not(feature = "tui"))]
    {
        let _ = (sim, config);
        eprintln!("❌ Built without the 'tui' feature");
        std::process::exit(1);
    }
}

fn describe_scheme(path: &Path) {
    let sim = load_or_exit(path);
    let circuit = sim.circuit();

    println!("📖 {}", path.display());
    println!();
    println!("━━━ Elements ({}) ━━━", circuit.len());
    for el in circuit.elements() {
        let b = el.bounds();
        print!(
            "#{:<4} {:<20} {:<18} {}x{} at ({}, {})  {} in / {} out",
            el.id(),
            el.name,
            el.kind().tag(),
            b.width,
            b.height,
            b.x,
            b.y,
            el.inputs().len(),
            el.outputs().len()
        );
        if let Some(sub) = el.subcircuit() {
            print!("  [{} inner elements]", sub.circuit().len());
        }
        println!();
    }
    println!();
    println!("━━━ Connections ({}) ━━━", circuit.connections().len());
    for conn in circuit.connections() {
        println!("{} -> {}", conn.from, conn.to);
    }
}

fn list_libraries(config: &SimConfig) {
    let registry = config.registry();
    let current = registry.current().map(|l| l.name().to_string());

    for lib in registry.libraries() {
        let marker = if current.as_deref() == Some(lib.name()) { " (current)" } else { "" };
        println!("━━━ {}{} ━━━", lib.name(), marker);
        for entry in lib.entries() {
            println!("  {:<20} {}", entry.name(), entry.category().unwrap_or("-"));
        }
        println!();
    }
}

/// Generator → counter → decoder → trigger, with the counter and trigger
/// summed by a half adder.
fn build_demo(registry: &Registry) -> Result<Circuit, Box<dyn std::error::Error>> {
    let mut circuit = Circuit::new();
    let parts = [
        ("Generator", 0, 0),
        ("Counter 0..8", 100, 0),
        ("Decoder 1x3", 200, 0),
        ("Ternary Trigger", 300, 0),
        ("Half Adder", 400, 0),
    ];
    let mut ids = Vec::new();
    for (name, x, y) in parts {
        let id = circuit.issue_id();
        ids.push(circuit.add_element(registry.create_any(name, id, x, y)?)?);
    }
    let (gen, counter, decoder, trigger, adder) = (ids[0], ids[1], ids[2], ids[3], ids[4]);
    circuit.connect(PortRef::output(gen, 0), PortRef::input(counter, 0))?;
    circuit.connect(PortRef::output(counter, 0), PortRef::input(decoder, 0))?;
    circuit.connect(PortRef::output(decoder, 2), PortRef::input(trigger, 0))?;
    circuit.connect(PortRef::output(decoder, 0), PortRef::input(trigger, 1))?;
    circuit.connect(PortRef::output(counter, 0), PortRef::input(adder, 0))?;
    circuit.connect(PortRef::output(trigger, 0), PortRef::input(adder, 1))?;
    Ok(circuit)
}

fn write_demo(path: &Path, config: &SimConfig) {
    let circuit = match build_demo(&config.registry()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("❌ Failed to build demo: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = setun_sim::save_scheme(path, &circuit) {
        eprintln!("❌ Failed to save {}: {}", path.display(), e);
        std::process::exit(1);
    }
    println!("✓ Wrote {} elements to {}", circuit.len(), path.display());
}

fn demo_circuit(config: &SimConfig) {
    println!("━━━ Demo Circuit ━━━");
    println!();
    match build_demo(&config.registry()) {
        Ok(circuit) => {
            let mut sim = Simulator::with_circuit(circuit);
            for _ in 0..12 {
                let n = sim.step();
                print_values(n, &sim);
                println!();
            }
        }
        Err(e) => {
            eprintln!("❌ Failed to build demo: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_self_test() {
    use setun_sim::{Element, ElementKind, SchemeError, Trit};
    use setun_sim::ternary::logic;

    println!("━━━ Setun Simulator Self-Test ━━━");
    println!();

    let mut passed = 0;
    let mut failed = 0;

    let mut check = |name: &str, ok: bool| {
        print!("{}... ", name);
        if ok { println!("✓"); passed += 1; }
        else { println!("✗"); failed += 1; }
    };

    check("Trit negation involution", Trit::ALL.iter().all(|t| t.neg().neg() == *t));

    check(
        "Half adder table",
        logic::half_adder(Trit::P, Trit::P) == (Trit::O, Trit::P)
            && logic::half_adder(Trit::P, Trit::N) == (Trit::O, Trit::O)
            && logic::half_adder(Trit::N, Trit::O) == (Trit::N, Trit::O),
    );

    let one_hot = Trit::ALL.iter().all(|a| {
        Trit::ALL.iter().all(|b| {
            let mut el = Element::new(1, ElementKind::Decoder { select: 2 }, 0, 0);
            for (n, v) in [*a, *b].into_iter().enumerate() {
                if let Some(p) = el.port_mut(setun_sim::circuit::Direction::Input, n) {
                    p.value = v;
                }
            }
            el.calculate();
            el.outputs().iter().filter(|p| p.value == Trit::P).count() == 1
        })
    });
    check("Decoder one-hot", one_hot);

    let mut latch = Circuit::new();
    let wired = latch.add_element(Element::new(2, ElementKind::TernaryElement, 100, 0)).is_ok()
        && latch.add_element(Element::new(1, ElementKind::Generator, 0, 0)).is_ok()
        && latch.connect(PortRef::output(1, 0), PortRef::input(2, 0)).is_ok();
    check("Latch circuit wiring", wired);
    let mut sim = Simulator::with_circuit(latch);
    sim.step();
    let first = sim.circuit().value(PortRef::output(2, 0));
    sim.step();
    let second = sim.circuit().value(PortRef::output(2, 0));
    check("One-step latch", first == Some(Trit::O) && second == Some(Trit::P));

    let registry = Registry::with_builtins();
    match build_demo(&registry) {
        Ok(circuit) => {
            let mut sim = Simulator::with_circuit(circuit);
            sim.run(7);
            sim.reset();
            let once = sim.snapshot();
            sim.reset();
            check("Reset idempotence", sim.snapshot() == once);

            sim.run(5);
            let text = setun_sim::scheme::to_string(sim.circuit());
            let same = setun_sim::scheme::from_str(&text)
                .map(|back| Simulator::with_circuit(back).snapshot() == sim.snapshot())
                .unwrap_or(false);
            check("Scheme round-trip", same);
        }
        Err(_) => {
            check("Reset idempotence", false);
            check("Scheme round-trip", false);
        }
    }

    let obsolete = setun_sim::scheme::from_str("[Scheme]\nVersion=1.0\n");
    check("Obsolete format rejected", matches!(obsolete, Err(SchemeError::ObsoleteFormat(_))));

    println!();
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Results: {} passed, {} failed", passed, failed);

    if failed == 0 {
        println!("✓ All tests passed!");
    } else {
        std::process::exit(1);
    }
}
