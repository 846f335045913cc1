use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use fatigue_sim::{run_simulation, SimulationConfig};

fn main() -> ExitCode {
    env_logger::init();

    let config = match env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => match SimulationConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Cannot load {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => SimulationConfig::default(),
    };

    match run_simulation(config) {
        Ok((result, _)) => {
            println!("Stop reason:  {}", result.reason);
            println!("Cycles:       {}", result.final_state.cycle_count);
            println!("Samples:      {}", result.total_samples);
            println!("Elapsed:      {:.1}s", result.elapsed_secs);
            if let Some(path) = &result.log_path {
                println!("Log:          {}", path.display());
            }
            if let Some(checksum) = &result.checksum {
                println!("SHA-256:      {}", checksum);
            }
            if result.is_failure() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Simulation failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
