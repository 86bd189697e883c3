//! # Módulo HTTP
//!
//! Este módulo implementa la capa de protocolo HTTP/1.x desde cero, sin
//! usar librerías de alto nivel. Incluye:
//!
//! - Lectura bloqueante de un request desde un stream (con fallos clasificados)
//! - Construcción y escritura de responses (a través del cache de archivos)
//! - Manejo de status codes
//! - Constantes del protocolo (versión soportada, tokens de conexión)
//!
//! El resto del servidor solo consume dos operaciones de esta capa:
//! `Request::read` y `Response::write`; la gramática del wire vive
//! completa aquí.
//!
//! ### Formato de Request
//!
//! ```text
//! GET /index.html HTTP/1.1\r\n
//! Connection: Keep-Alive\r\n
//! If-Modified-Since: Mon Jan 01 00:00:00 UTC 2024\r\n
//! \r\n
//! ```
//!
//! ### Formato de Response
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Connection: Keep-Alive\r\n
//! Content-Type: text/html\r\n
//! Content-Length: 13\r\n
//! \r\n
//! <html>...</html>
//! ```

// Submódulos del módulo HTTP
pub mod request;   // Lectura y parsing de HTTP requests
pub mod response;  // Construcción de HTTP responses
pub mod status;    // Códigos de estado HTTP

// Re-exportamos los tipos principales para facilitar su uso
pub use request::{ReadError, Request};
pub use response::Response;
pub use status::StatusCode;

use chrono::{DateTime, Utc};
use std::time::SystemTime;

/// Única versión HTTP que el servidor soporta
pub const VERSION: &str = "HTTP/1.1";

/// Método soportado
pub const GET: &str = "GET";

/// Archivo índice por defecto al pedir un directorio
pub const DEFAULT_FILE: &str = "index.html";

/// Token del header `Connection` que activa una conexión persistente
pub const KEEP_ALIVE: &str = "keep-alive";

/// Valor del header `Connection` en respuestas persistentes
pub const CONNECTION_OPEN: &str = "Keep-Alive";

/// Valor del header `Connection` en respuestas que cierran
pub const CONNECTION_CLOSE: &str = "Close";

/// Formatea la fecha de modificación de un archivo con el patrón fijo
/// del servidor: `"Mon Jan 01 00:00:00 UTC 2024"`.
///
/// La frescura de un GET condicional se decide por igualdad *textual*
/// entre este formato y el header `if-modified-since` del cliente;
/// cualquier diferencia de formato cuenta como "modificado" y produce
/// un 200 completo en lugar de 304.
///
/// # Ejemplo
/// ```
/// use std::time::SystemTime;
/// use file_server::http::format_last_modified;
///
/// let formatted = format_last_modified(SystemTime::UNIX_EPOCH);
/// assert_eq!(formatted, "Thu Jan 01 00:00:00 UTC 1970");
/// ```
pub fn format_last_modified(mtime: SystemTime) -> String {
    let datetime: DateTime<Utc> = mtime.into();
    datetime.format("%a %b %d %H:%M:%S %Z %Y").to_string()
}
