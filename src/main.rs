use anyhow::Result;
use servicemap::cli::{
    configure_thread_pool, get_worker_count, init_logging, parse_args, Commands, RunArgs,
};
use servicemap::commands::{
    handle_ahca, handle_evaluate, handle_moeca, init_config, list_runs, AhcaOverrides,
    MoecaOverrides,
};
use servicemap::observability::install_panic_hook;

fn setup(run: &RunArgs) {
    configure_thread_pool(run.jobs);
    log::info!("Using {} worker threads", get_worker_count(run.jobs));
}

fn main() -> Result<()> {
    let cli = parse_args();
    init_logging(cli.command.verbosity());
    install_panic_hook();

    match cli.command {
        Commands::Ahca {
            run,
            shared_edges,
            normalize,
        } => {
            setup(&run);
            let overrides = AhcaOverrides {
                min: run.min,
                max: run.max,
                shared_edges,
                normalize,
            };
            handle_ahca(run, overrides)
        }
        Commands::Moeca {
            run,
            encoding,
            population,
            evaluations,
            max_time,
            seed,
            algorithm,
        } => {
            setup(&run);
            let overrides = MoecaOverrides {
                min: run.min,
                max: run.max,
                encoding,
                population,
                evaluations,
                max_time,
                seed,
                algorithm,
            };
            handle_moeca(run, overrides)
        }
        Commands::Evaluate {
            graph,
            solution,
            index,
            config,
            verbosity: _,
        } => handle_evaluate(graph, solution, index, config),
        Commands::Runs { dir } => list_runs(&dir),
        Commands::Init { force } => init_config(force),
    }
}
