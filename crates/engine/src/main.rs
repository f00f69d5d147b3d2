//! Coup Engine — session-scheduling core and REST façade for a
//! play-by-post Coup game. This crate is the composition root.

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    coup_engine::run::run().await
}
