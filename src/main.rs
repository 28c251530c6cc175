use std::process;

fn main() {
    if let Err(e) = levva_deploy::run() {
        eprintln!("Error: {e:?}");
        process::exit(1);
    }
}
