#[tokio::main]
async fn main() {
    if let Err(e) = bucketfs_lib::run().await {
        eprintln!("bucketfs: {}", e);
        std::process::exit(1);
    }
}
