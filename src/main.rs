fn main() {
    if let Err(err) = placeholder_rs::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
