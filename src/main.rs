//! # File Server - Entry Point
//! src/main.rs
//!
//! Punto de entrada: parsea la configuración (CLI + env), la valida y
//! arranca el servidor en el thread principal.

use file_server::config::Config;
use file_server::server::Server;

fn main() {
    println!("=================================");
    println!("  File Server HTTP/1.x");
    println!("=================================\n");

    let config = Config::new();

    if let Err(e) = config.validate() {
        eprintln!("💥 Configuración inválida: {}", e);
        std::process::exit(1);
    }

    config.print_summary();

    let server = Server::new(config);

    // run() bloquea hasta que el servidor se detenga
    if let Err(e) = server.run() {
        eprintln!("💥 Error fatal: {}", e);
        std::process::exit(1);
    }
}
