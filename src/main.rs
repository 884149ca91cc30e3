fn main() {
    if let Err(err) = csv_insights::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
