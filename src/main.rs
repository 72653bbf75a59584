fn main() {
    if let Err(e) = faddit_canvas::run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}
