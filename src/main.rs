fn main() {
    cadence::cli::run();
}
