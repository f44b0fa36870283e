fn main() {
    if let Err(err) = form_cli::cli::main() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
