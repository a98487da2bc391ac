use af_core::units::{Temperature, celsius, k};
use af_reaction::{DEFAULT_SWEEP_RESOLUTION, FlameTemp, Reaction};
use af_thermo::{PropertySeries, SpeciesId, SpeciesRegistry};
use clap::{Parser, Subcommand};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "af-cli")]
#[command(about = "Adiabatic flame temperature calculator", long_about = None)]
struct Cli {
    /// Path to the thermochemical data CSV
    #[arg(long, global = true, default_value = "data/thermochemical_data.csv")]
    data: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List known species and their temperature ranges
    Species {
        /// Filter by id, name, or formula substring
        #[arg(short, long)]
        query: Option<String>,
    },
    /// Print a raw data series for one species (T vs SH, Hf, or logKf)
    Series {
        /// Species id (e.g. Carbon_Dioxide)
        species: String,
        /// Series name: sh, hf, or logkf
        series: String,
    },
    /// Compute the flame temperature for one mixture
    Flame {
        /// Reactant spec: <id>=<mole fraction>@<temperature>, e.g.
        /// Methane=0.2@298.15K (temperatures accept K or C suffixes)
        #[arg(short, long = "reactant", required = true)]
        reactants: Vec<String>,
        /// Reserved flag; currently routes to the same product table
        #[arg(long)]
        dissociation: bool,
    },
    /// Sweep one reactant's mole fraction and tabulate flame temperature
    Sweep {
        /// Id of the reactant to vary
        #[arg(short, long)]
        variable: String,
        /// Reactant spec: <id>=<ratio>@<temperature>; ratios of the
        /// non-variable reactants are held fixed
        #[arg(short, long = "reactant", required = true)]
        reactants: Vec<String>,
        /// Number of sweep points strictly inside (0, 1)
        #[arg(long, default_value_t = DEFAULT_SWEEP_RESOLUTION)]
        resolution: usize,
        /// Reserved flag; currently routes to the same product table
        #[arg(long)]
        dissociation: bool,
    },
}

/// One parsed `<id>=<amount>@<temperature>` argument.
struct ReactantSpec {
    id: SpeciesId,
    amount: f64,
    entry_temp: Temperature,
}

fn parse_reactant_spec(text: &str) -> Result<ReactantSpec, String> {
    let (id, rest) = text
        .split_once('=')
        .ok_or_else(|| format!("expected <id>=<amount>@<temperature>, got {text:?}"))?;
    let (amount, temp) = rest
        .split_once('@')
        .ok_or_else(|| format!("missing @<temperature> in {text:?}"))?;
    let amount: f64 = amount
        .parse()
        .map_err(|_| format!("bad amount {amount:?} in {text:?}"))?;
    Ok(ReactantSpec {
        id: SpeciesId::new(id.trim()),
        amount,
        entry_temp: parse_temperature(temp)?,
    })
}

/// Parse a temperature with an optional unit suffix; bare numbers are
/// kelvin.
fn parse_temperature(text: &str) -> Result<Temperature, String> {
    let trimmed = text.trim();
    let (value, unit) = match trimmed.char_indices().rfind(|(_, c)| c.is_ascii_digit()) {
        Some((i, _)) => trimmed.split_at(i + 1),
        None => return Err(format!("no numeric value in temperature {text:?}")),
    };
    let value: f64 = value
        .parse()
        .map_err(|_| format!("bad temperature value {value:?}"))?;
    match unit.trim() {
        "" | "K" | "k" => Ok(k(value)),
        "C" | "c" => Ok(celsius(value)),
        other => Err(format!("unknown temperature unit {other:?} (use K or C)")),
    }
}

fn parse_specs(texts: &[String]) -> Result<Vec<ReactantSpec>, String> {
    texts.iter().map(|t| parse_reactant_spec(t)).collect()
}

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let registry = SpeciesRegistry::from_csv_path(&cli.data)?;

    match cli.command {
        Commands::Species { query } => {
            let query = query.unwrap_or_default().to_ascii_lowercase();
            println!("{:<16} {:<16} {:<8} {}", "id", "name", "formula", "T range (K)");
            for species in registry.iter() {
                let matches = query.is_empty()
                    || species.id().as_str().to_ascii_lowercase().contains(&query)
                    || species.name().to_ascii_lowercase().contains(&query)
                    || species.formula().to_ascii_lowercase().contains(&query);
                if matches {
                    let table = species.table();
                    println!(
                        "{:<16} {:<16} {:<8} {}..{}",
                        species.id(),
                        species.name(),
                        species.formula(),
                        table.min_temperature(),
                        table.max_temperature(),
                    );
                }
            }
        }

        Commands::Series { species, series } => {
            let series: PropertySeries = series
                .parse()
                .map_err(|e| format!("{e} (expected sh, hf, or logkf)"))?;
            let species = registry.get(&SpeciesId::new(species))?;
            let table = species.table();
            println!("T,{series}");
            for (t, value) in table
                .temperatures()
                .iter()
                .zip(table.raw_series(series))
            {
                println!("{t},{value}");
            }
        }

        Commands::Flame {
            reactants,
            dissociation,
        } => {
            let specs = parse_specs(&reactants)?;
            let reaction = build_reaction(&registry, &specs, dissociation)?;
            let concentrations: BTreeMap<SpeciesId, f64> = specs
                .iter()
                .map(|s| (s.id.clone(), s.amount))
                .collect();
            match reaction.calc_flame_temp(&concentrations)? {
                FlameTemp::Reached(t) => {
                    println!("flame temperature: {:.2} K", af_core::units::kelvin_of(t));
                }
                FlameTemp::Unreachable => {
                    let (lo, hi) = reaction.temperature_bounds();
                    println!("flame temperature: unreachable within data bounds [{lo}, {hi}] K");
                }
            }
        }

        Commands::Sweep {
            variable,
            reactants,
            resolution,
            dissociation,
        } => {
            let specs = parse_specs(&reactants)?;
            let reaction = build_reaction(&registry, &specs, dissociation)?;
            let base_ratios: BTreeMap<SpeciesId, f64> = specs
                .iter()
                .map(|s| (s.id.clone(), s.amount))
                .collect();
            let variable = SpeciesId::new(variable);
            let table = reaction.calc_flame_table(&variable, &base_ratios, resolution)?;

            println!("{variable}_fraction,flame_temp_K");
            for (x, temp) in table.iter() {
                println!("{x:.6},{}", temp.kelvin());
            }
            tracing::info!(
                points = table.len(),
                unreachable = table.num_unreachable(),
                "sweep complete"
            );
        }
    }

    Ok(())
}

fn build_reaction<'r>(
    registry: &'r SpeciesRegistry,
    specs: &[ReactantSpec],
    dissociation: bool,
) -> Result<Reaction<'r>, Box<dyn std::error::Error>> {
    let reactants: BTreeSet<SpeciesId> = specs.iter().map(|s| s.id.clone()).collect();
    let entry_temps: BTreeMap<SpeciesId, Temperature> = specs
        .iter()
        .map(|s| (s.id.clone(), s.entry_temp))
        .collect();
    Ok(Reaction::new(registry, reactants, &entry_temps, dissociation)?)
}
