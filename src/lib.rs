//! # File Server
//! src/lib.rs
//!
//! Servidor HTTP/1.x de archivos estáticos con conexiones persistentes,
//! GET condicional (`If-Modified-Since`), cache LRU de archivos en
//! memoria y control de admisión por IP con blacklist temporal.
//!
//! ## Arquitectura
//!
//! El servidor está dividido en módulos especializados:
//! - `http`: parsing de requests y serialización de responses HTTP/1.x
//! - `server`: dispatcher TCP, handler por conexión, admisión y stats
//! - `cache`: cache LRU acotado de contenidos de archivo
//! - `config`: configuración por CLI y variables de entorno
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use file_server::config::Config;
//! use file_server::server::Server;
//!
//! let config = Config::default();
//! let server = Server::new(config);
//! server.run().expect("Error al iniciar servidor");
//! ```

pub mod cache;
pub mod config;
pub mod http;
pub mod server;
