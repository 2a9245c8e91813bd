//! Accepts whatever logmetrics POSTs and logs what arrived.

use std::net::SocketAddr;

use clap::Parser;
use hyper::{body::Incoming, server::conn::http1, service::service_fn, Request};
use hyper_util::rt::TokioIo;
use logmetrics::error::StdError;
use tokio::net::{TcpListener, TcpStream};

mod handler;

#[derive(Parser, Debug)]
#[command(name = "test_server", version, about)]
struct Args {
    /// Address to listen on
    #[arg(long, env = "TEST_SERVER_LISTEN", default_value = "0.0.0.0:8080")]
    listen: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<(), StdError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let listener = TcpListener::bind(args.listen).await?;
    log::info!("test server listening on http://{}", listener.local_addr()?);
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                tokio::spawn(async move {
                    if let Err(err) = serve_connection(stream).await {
                        log::warn!("connection from {peer} failed: {err}");
                    }
                });
            }
            Err(err) => log::error!("accept failed: {err}"),
        }
    }
}

async fn serve_connection(stream: TcpStream) -> Result<(), hyper::Error> {
    let service = service_fn(|request: Request<Incoming>| async move {
        Ok::<_, hyper::Error>(handler::handle(request).await)
    });
    http1::Builder::new()
        .serve_connection(TokioIo::new(stream), service)
        .await
}
