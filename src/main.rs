fn main() {
    if let Err(err) = walletrisk::cli::run() {
        if !walletrisk::exit::is_reported(&err) {
            walletrisk::ui::eprintln_error(&err);
        }
        std::process::exit(walletrisk::exit::exit_code(&err));
    }
}
