fn main() {
    sutra_fmt::cli::run();
}
