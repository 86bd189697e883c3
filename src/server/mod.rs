//! # Módulo del Servidor
//! src/server/mod.rs
//!
//! Todo lo que vive del socket para adentro:
//! 1. `tcp`: dispatcher que acepta conexiones y lanza threads
//! 2. `handler`: ciclo request/response de una conexión persistente
//! 3. `dos`: control de admisión por IP con blacklist
//! 4. `stats`: totales de conexiones y tiempo de servicio
//! 5. `access`: listas de rutas ocultas (404) y prohibidas (403)

pub mod access;
pub mod dos;
pub mod handler;
pub mod stats;
pub mod tcp;

// Re-exportar para facilitar el uso
pub use access::AccessLists;
pub use dos::{BlacklistSweeper, DosGuard};
pub use handler::ConnectionHandler;
pub use stats::{ServiceStats, StatsSnapshot};
pub use tcp::Server;
