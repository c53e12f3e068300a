//! Binary entrypoint for `strata-admin`.

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let code = strata_admin::run().await;
    std::process::exit(code);
}
