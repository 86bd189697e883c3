//! # Construcción de Respuestas HTTP
//! src/http/response.rs
//!
//! Este módulo proporciona los constructores de respuesta que usa el
//! handler (200 con archivo, 304, 400, 403, 404, 408, 501, 505) y la
//! escritura de la respuesta al socket.
//!
//! El cuerpo de un 200 no se carga al construir la respuesta: se guarda
//! la ruta del archivo y los bytes se resuelven a través del
//! [`FileCache`](crate::cache::FileCache) recién al escribir. La
//! resolución ocurre *antes* de emitir la status line, de modo que un
//! fallo de lectura nunca produce un 200 con cuerpo truncado.
//!
//! ## Formato de una respuesta
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Connection: Close\r\n
//! Content-Type: text/html\r\n
//! Content-Length: 13\r\n
//! \r\n
//! <html>...</html>
//! ```

use super::{StatusCode, CONNECTION_CLOSE, VERSION};
use crate::cache::FileCache;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Origen del cuerpo de la respuesta
#[derive(Debug, Clone)]
enum Body {
    /// Sin cuerpo (304 Not Modified)
    Empty,

    /// Bytes en memoria (páginas de error)
    Bytes(Vec<u8>),

    /// Archivo a servir a través del cache al escribir
    File(PathBuf),
}

/// Representa una respuesta HTTP completa
#[derive(Debug, Clone)]
pub struct Response {
    /// Código de estado HTTP (200, 404, etc.)
    status: StatusCode,

    /// Headers HTTP (Connection siempre presente)
    headers: HashMap<String, String>,

    /// Cuerpo de la respuesta
    body: Body,
}

impl Response {
    /// Crea una respuesta sin cuerpo con el estado y directiva de conexión dados
    fn new(status: StatusCode, connection: &str) -> Self {
        let mut headers = HashMap::new();
        headers.insert("Connection".to_string(), connection.to_string());
        Self {
            status,
            headers,
            body: Body::Empty,
        }
    }

    /// Crea una respuesta de error con una página de texto mínima
    fn error_page(status: StatusCode, connection: &str) -> Self {
        let mut response = Self::new(status, connection);
        let body = format!("{} {}\n", status.as_u16(), status.reason_phrase());
        response
            .headers
            .insert("Content-Type".to_string(), "text/plain".to_string());
        response.body = Body::Bytes(body.into_bytes());
        response
    }

    // === Constructores que usa el handler ===

    /// 200 OK sirviendo `file` a través del cache
    ///
    /// # Ejemplo
    /// ```
    /// use std::path::Path;
    /// use file_server::http::{Response, StatusCode};
    ///
    /// let response = Response::ok_with_file(Path::new("./web/index.html"), "Close");
    /// assert_eq!(response.status(), StatusCode::Ok);
    /// ```
    pub fn ok_with_file(file: &Path, connection: &str) -> Self {
        let mut response = Self::new(StatusCode::Ok, connection);
        response.headers.insert(
            "Content-Type".to_string(),
            content_type_for(file).to_string(),
        );
        response.body = Body::File(file.to_path_buf());
        response
    }

    /// 304 Not Modified (sin cuerpo)
    pub fn not_modified(connection: &str) -> Self {
        Self::new(StatusCode::NotModified, connection)
    }

    /// 400 Bad Request (siempre cierra la conexión)
    pub fn bad_request() -> Self {
        Self::error_page(StatusCode::BadRequest, CONNECTION_CLOSE)
    }

    /// 403 Forbidden
    pub fn forbidden(connection: &str) -> Self {
        Self::error_page(StatusCode::Forbidden, connection)
    }

    /// 404 Not Found
    pub fn not_found(connection: &str) -> Self {
        Self::error_page(StatusCode::NotFound, connection)
    }

    /// 408 Request Timeout (siempre cierra la conexión)
    pub fn request_timeout() -> Self {
        Self::error_page(StatusCode::RequestTimeout, CONNECTION_CLOSE)
    }

    /// 501 Not Implemented (siempre cierra la conexión)
    pub fn not_implemented() -> Self {
        Self::error_page(StatusCode::NotImplemented, CONNECTION_CLOSE)
    }

    /// 505 HTTP Version Not Supported (siempre cierra la conexión)
    pub fn version_not_supported() -> Self {
        Self::error_page(StatusCode::HttpVersionNotSupported, CONNECTION_CLOSE)
    }

    /// Escribe la respuesta completa al stream
    ///
    /// Para cuerpos de archivo, los bytes se obtienen del cache (o
    /// directamente del disco si no hay cache) antes de escribir la
    /// status line; si esa lectura falla se retorna el error sin haber
    /// emitido ni un byte, y el caller puede sustituir otra respuesta.
    pub fn write<W: Write>(&self, out: &mut W, cache: Option<&FileCache>) -> std::io::Result<()> {
        // 1. Resolver el cuerpo primero (puede fallar)
        let file_data;
        let body: Option<&[u8]> = match &self.body {
            Body::Empty => None,
            Body::Bytes(bytes) => Some(&bytes[..]),
            Body::File(path) => {
                file_data = match cache {
                    Some(cache) => cache.get(path)?,
                    None => std::sync::Arc::new(std::fs::read(path)?),
                };
                Some(&file_data[..])
            }
        };

        // 2. Status line
        let mut head = format!("{} {}\r\n", VERSION, self.status);

        // 3. Headers (más Content-Length calculado sobre los bytes reales)
        for (name, value) in &self.headers {
            head.push_str(&format!("{}: {}\r\n", name, value));
        }
        if let Some(bytes) = body {
            head.push_str(&format!("Content-Length: {}\r\n", bytes.len()));
        }
        head.push_str("\r\n");

        out.write_all(head.as_bytes())?;

        // 4. Body (si existe)
        if let Some(bytes) = body {
            out.write_all(bytes)?;
        }
        out.flush()
    }

    /// Obtiene el código de estado de la respuesta
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Obtiene la directiva de conexión ("Keep-Alive" o "Close")
    pub fn connection(&self) -> &str {
        self.headers
            .get("Connection")
            .map(|s| s.as_str())
            .unwrap_or(CONNECTION_CLOSE)
    }

    /// Obtiene una referencia a los headers
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }
}

/// Content-Type según la extensión del archivo
///
/// Cobertura mínima para un servidor de archivos estáticos; cualquier
/// extensión desconocida se sirve como binario genérico.
fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") | Some("htm") => "text/html",
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("json") => "application/json",
        Some("txt") => "text/plain",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("ico") => "image/x-icon",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_to_string(response: &Response) -> String {
        let mut out = Vec::new();
        response.write(&mut out, None).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_not_found_response() {
        let response = Response::not_found("Close");
        assert_eq!(response.status(), StatusCode::NotFound);

        let text = write_to_string(&response);
        assert!(text.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(text.contains("Connection: Close\r\n"));
        assert!(text.contains("Content-Length: "));
        assert!(text.ends_with("404 Not Found\n"));
    }

    #[test]
    fn test_not_modified_has_no_body() {
        let response = Response::not_modified("Keep-Alive");
        let text = write_to_string(&response);

        assert!(text.starts_with("HTTP/1.1 304 Not Modified\r\n"));
        assert!(text.contains("Connection: Keep-Alive\r\n"));
        assert!(!text.contains("Content-Length"));
        assert!(text.ends_with("\r\n\r\n"));
    }

    #[test]
    fn test_error_responses_close_connection() {
        assert_eq!(Response::bad_request().connection(), "Close");
        assert_eq!(Response::request_timeout().connection(), "Close");
        assert_eq!(Response::not_implemented().connection(), "Close");
        assert_eq!(Response::version_not_supported().connection(), "Close");
    }

    #[test]
    fn test_version_not_supported_status() {
        let text = write_to_string(&Response::version_not_supported());
        assert!(text.starts_with("HTTP/1.1 505 HTTP Version Not Supported\r\n"));
    }

    #[test]
    fn test_ok_with_file_serves_disk_bytes() {
        let dir = std::env::temp_dir().join(format!("fs_resp_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("hello.html");
        std::fs::write(&file, b"<h1>hola</h1>").unwrap();

        let response = Response::ok_with_file(&file, "Close");
        let text = write_to_string(&response);

        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("Content-Type: text/html\r\n"));
        assert!(text.contains("Content-Length: 13\r\n"));
        assert!(text.ends_with("<h1>hola</h1>"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_ok_with_missing_file_writes_nothing() {
        let response = Response::ok_with_file(Path::new("/no/existe/x.html"), "Close");
        let mut out = Vec::new();

        let result = response.write(&mut out, None);
        assert!(result.is_err());
        // El fallo ocurre antes de emitir la status line
        assert!(out.is_empty());
    }

    #[test]
    fn test_content_type_detection() {
        assert_eq!(content_type_for(Path::new("a.html")), "text/html");
        assert_eq!(content_type_for(Path::new("a.css")), "text/css");
        assert_eq!(content_type_for(Path::new("a.png")), "image/png");
        assert_eq!(
            content_type_for(Path::new("a.bin")),
            "application/octet-stream"
        );
        assert_eq!(
            content_type_for(Path::new("sin_extension")),
            "application/octet-stream"
        );
    }
}
