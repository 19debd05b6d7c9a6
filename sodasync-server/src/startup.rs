use std::net::TcpListener;

use actix_web::{App, HttpServer, dev::Server, web};
use tracing_actix_web::TracingLogger;

use crate::config::ServerConfig;
use crate::routes::health_check::health_check;
use crate::routes::sync_runs::{RunLock, create_sync_run};

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(config: ServerConfig) -> Result<Self, anyhow::Error> {
        config.validate()?;

        let address = config.application.to_string();
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();

        let server = run(config, listener)?;

        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn run(config: ServerConfig, listener: TcpListener) -> Result<Server, anyhow::Error> {
    let config = web::Data::new(config);
    let run_lock = web::Data::new(RunLock::new());

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .service(health_check)
            .service(web::scope("v1").service(create_sync_run))
            .app_data(config.clone())
            .app_data(run_lock.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
