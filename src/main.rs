fn main() {
    if let Err(err) = schema_allowed::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
