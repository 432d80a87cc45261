mod app;
mod bridge;
mod cli;

use cli::Cli;

// one thread: dispatches interleave cooperatively on the coordinator's runtime
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::from_args();
    app::init_tracing(&cli.log_level);

    let result = match cli.into_config() {
        Ok(config) => app::run(config).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        app::report_fatal(&mut std::io::stderr(), &e);
        // exit without dropping the runtime: a blocked stdin read would hold shutdown open
        std::process::exit(1);
    }
}
