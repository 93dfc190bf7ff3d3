fn main() {
    if let Err(error) = flim_session::run_cli() {
        eprintln!("{error}");
        std::process::exit(1);
    }
}
