use clap::Parser;
use std::io;
use std::process::ExitCode;

use pn_proto::Session;
use pn_solver::{Backend, DenseBackend, DenseRoutine, DensifyBackend, SparseBackend};
use tracing::info;

#[derive(Parser)]
#[command(name = "pn-cli")]
#[command(
    about = "Resistive flow network pressure solver driven over a binary stdio protocol",
    long_about = None
)]
struct Cli {
    /// Store the incidence structure sparsely and solve with the sparse
    /// direct routine
    #[arg(short, long)]
    sparse: bool,

    /// Named dense solve routine (lu, full-lu, qr, cholesky)
    #[arg(short = 'S', long)]
    solver: Option<String>,

    /// Store sparsely but densify the reduced system before solving
    #[arg(short, long)]
    densify: bool,

    /// Log policy selection and shutdown to the diagnostic stream
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    let backend = match select_backend(&cli) {
        Ok(backend) => backend,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::FAILURE;
        }
    };
    info!(policy = backend.name(), "storage and solve policy bound");

    let stdin = io::stdin();
    let stdout = io::stdout();
    let session = Session::new(stdin.lock(), stdout.lock(), io::stderr(), backend);
    match session.run() {
        Ok(end) => {
            info!(?end, "session ended");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("unhandled stream failure: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Translate the flags into one of the three storage/solve policies.
fn select_backend(cli: &Cli) -> Result<Box<dyn Backend>, String> {
    let routine = match &cli.solver {
        None => DenseRoutine::default(),
        Some(name) => name.parse::<DenseRoutine>()?,
    };
    if cli.densify {
        Ok(Box::new(DensifyBackend::new(routine)))
    } else if cli.sparse {
        if cli.solver.is_some() {
            return Err(format!(
                "the sparse direct policy has a fixed routine; '--solver {}' only applies to the dense paths",
                routine.name()
            ));
        }
        Ok(Box::new(SparseBackend))
    } else {
        Ok(Box::new(DenseBackend::new(routine)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(sparse: bool, solver: Option<&str>, densify: bool) -> Cli {
        Cli {
            sparse,
            solver: solver.map(str::to_owned),
            densify,
            verbose: false,
        }
    }

    #[test]
    fn flags_select_the_three_policies() {
        assert_eq!(
            select_backend(&cli(false, None, false)).unwrap().name(),
            "dense-direct"
        );
        assert_eq!(
            select_backend(&cli(true, None, false)).unwrap().name(),
            "sparse-direct"
        );
        assert_eq!(
            select_backend(&cli(true, None, true)).unwrap().name(),
            "sparse-densify"
        );
        assert_eq!(
            select_backend(&cli(false, None, true)).unwrap().name(),
            "sparse-densify"
        );
    }

    #[test]
    fn named_routine_applies_to_dense_paths_only() {
        assert!(select_backend(&cli(false, Some("qr"), false)).is_ok());
        assert!(select_backend(&cli(false, Some("qr"), true)).is_ok());
        assert!(select_backend(&cli(true, Some("qr"), false)).is_err());
        assert!(select_backend(&cli(false, Some("spsolve"), false)).is_err());
    }
}
