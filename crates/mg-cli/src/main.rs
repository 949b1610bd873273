fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    std::process::exit(mg_cli::run_cli_from_args(std::env::args_os()));
}
