#[tokio::main]
async fn main() {
    let exit_code = rebuddy_cli::run().await;
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}
