//! Political evolution simulation
//!
//! Usage:
//!   political_evolution [CONFIG.toml] [--preset detailed|coalition]
//!                       [--rule plurality|coalition_quota] [--seed N]
//!                       [--out DIR] [--example]
//!
//! Without a config file the `detailed` preset runs. A config file replaces
//! the preset, so the two cannot be combined. `--rule` also switches the
//! inclusion policy and private-goods divisor to the ones that rule runs
//! with. Set `RUST_LOG=debug` to see every generation's winner.

use std::process;

use political_evolution::analysis::TrajectorySummary;
use political_evolution::output::SimulationOutput;
use political_evolution::scenarios::{run_scenario, ScenarioConfig};
use political_evolution::{ModelParams, SelectionRule};

struct CliArgs {
    config_path: Option<String>,
    preset: Option<String>,
    rule: Option<SelectionRule>,
    seed: u64,
    out_dir: String,
    print_example: bool,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<CliArgs, String> {
    let mut cli = CliArgs {
        config_path: None,
        preset: None,
        rule: None,
        seed: 42,
        out_dir: "output".to_string(),
        print_example: false,
    };

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--example" => cli.print_example = true,
            "--preset" => {
                cli.preset = Some(args.next().ok_or("--preset needs a value")?);
            }
            "--rule" => {
                let value = args.next().ok_or("--rule needs a value")?;
                cli.rule = Some(value.parse().map_err(|e| format!("{}", e))?);
            }
            "--seed" => {
                let value = args.next().ok_or("--seed needs a value")?;
                cli.seed = value
                    .parse()
                    .map_err(|_| format!("invalid seed '{}'", value))?;
            }
            "--out" => {
                cli.out_dir = args.next().ok_or("--out needs a value")?;
            }
            flag if flag.starts_with("--") => return Err(format!("unknown flag {}", flag)),
            path => {
                if cli.config_path.is_some() {
                    return Err(format!("unexpected argument '{}'", path));
                }
                cli.config_path = Some(path.to_string());
            }
        }
    }
    if cli.config_path.is_some() && cli.preset.is_some() {
        return Err("--preset cannot be combined with a config file".to_string());
    }
    Ok(cli)
}

fn build_config(cli: &CliArgs) -> Result<ScenarioConfig, String> {
    let mut config = match cli.preset.as_deref() {
        None | Some("detailed") => ScenarioConfig::detailed(cli.seed),
        Some("coalition") => ScenarioConfig::coalition(cli.seed),
        Some("fixed_policy") => ScenarioConfig::fixed_policy(cli.seed),
        Some(other) => return Err(format!("unknown preset '{}'", other)),
    };

    if let Some(path) = &cli.config_path {
        config.params = ModelParams::from_toml_file(path)
            .map_err(|e| format!("failed to load {}: {}", path, e))?;
        config.name = format!("Config {}", path);
    }
    if let Some(rule) = cli.rule {
        config.params = config.params.with_rule(rule);
        config.params.validate().map_err(|e| e.to_string())?;
    }
    Ok(config)
}

fn main() {
    env_logger::init();

    let cli = match parse_args(std::env::args().skip(1)) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if cli.print_example {
        match config.params.to_toml_string() {
            Ok(toml) => print!("{}", toml),
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    println!("========================================");
    println!("Evolution of Political Candidates");
    println!("========================================");
    println!("Scenario: {}", config.name);
    println!("  Voters: {}", config.params.n_voters);
    println!("  Candidates: {}", config.params.n_candidates);
    println!("  Generations: {}", config.params.n_generations);
    println!("  Selection rule: {}", config.params.selection_rule);
    println!("  Resource pool (R): {}", config.params.resource_pool);
    println!("  Coalition target: {}", config.params.target_coalition_size);
    println!("  Seed: {}", config.seed);

    let n_voters = config.params.n_voters;
    let result = match run_scenario(config) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    result.print_summary();
    println!();
    TrajectorySummary::from_history(&result.stats.history, n_voters).print_summary();

    let output = SimulationOutput::from_result(&result);
    if let Err(e) = output.write_all(&cli.out_dir) {
        eprintln!("Error writing output: {}", e);
        process::exit(1);
    }
    println!("\nResults written to {}/", cli.out_dir);
}

#[cfg(test)]
mod tests {
    use super::*;
    use political_evolution::{InclusionPolicy, PrivateGoodsDivisor};

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn rule_flag_brings_paired_policy() {
        let cli = parse_args(args(&["--rule", "coalition_quota"])).unwrap();
        let config = build_config(&cli).unwrap();

        assert_eq!(config.params.selection_rule, SelectionRule::CoalitionQuota);
        assert_eq!(
            config.params.inclusion_policy,
            InclusionPolicy::ObservedSupport
        );
        assert_eq!(
            config.params.private_goods_divisor,
            PrivateGoodsDivisor::VoterPopulation
        );
    }

    #[test]
    fn rule_flag_on_coalition_preset() {
        let cli = parse_args(args(&["--preset", "coalition", "--rule", "plurality"])).unwrap();
        let config = build_config(&cli).unwrap();

        assert_eq!(config.params.inclusion_policy, InclusionPolicy::FixedQuota);
        assert!(config.params.validate().is_ok());
    }

    #[test]
    fn preset_and_config_file_conflict() {
        let result = parse_args(args(&["run.toml", "--preset", "coalition"]));
        assert!(result.is_err());
    }

    #[test]
    fn unknown_flag_rejected() {
        assert!(parse_args(args(&["--verbose"])).is_err());
        assert!(parse_args(args(&["--seed", "abc"])).is_err());
    }

    #[test]
    fn defaults() {
        let cli = parse_args(Vec::new()).unwrap();
        assert_eq!(cli.seed, 42);
        assert_eq!(cli.out_dir, "output");
        assert!(!cli.print_example);
        assert_eq!(build_config(&cli).unwrap().params, ModelParams::detailed());
    }
}
