use hypercal::job::{run_job, JobConfig};
use hypercal::StrError;
use structopt::StructOpt;

/// Command line options
#[derive(StructOpt, Debug)]
#[structopt(
    name = "hypercal",
    about = "Calibrates a hyperelastic model against uniaxial data and generates the VUMAT subroutine"
)]
struct Options {
    /// JSON file with the job description
    job: String,

    /// Overrides the output directory
    #[structopt(short, long)]
    out_dir: Option<String>,

    /// Prints the iterations of the optimizer
    #[structopt(short, long)]
    verbose: bool,

    /// Writes a JSON file with the default job description and exits
    #[structopt(long)]
    write_default: bool,
}

fn main() -> Result<(), StrError> {
    // parse options
    let options = Options::from_args();

    // sample job
    if options.write_default {
        JobConfig::new().write_json(&options.job)?;
        println!("default job written to {}", options.job);
        return Ok(());
    }

    // load job
    let mut config = JobConfig::read_json(&options.job)?;
    if let Some(out_dir) = options.out_dir {
        config.output_dir = out_dir;
    }
    if options.verbose {
        config.solver.verbose = true;
    }

    // run
    let output = run_job(&config)?;
    if !output.calibration.status.converged() {
        return Err("the calibration did not converge");
    }
    Ok(())
}
