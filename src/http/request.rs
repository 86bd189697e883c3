//! # Lectura y Parsing de Requests HTTP/1.x
//! src/http/request.rs
//!
//! Este módulo implementa la lectura bloqueante de *un* request HTTP
//! desde un stream de bytes. A diferencia de un parser sobre un buffer
//! completo, aquí se lee línea por línea para soportar conexiones
//! persistentes: cada llamada consume exactamente un request y deja el
//! stream posicionado al inicio del siguiente.
//!
//! ## Formato de un Request
//!
//! ```text
//! GET /index.html HTTP/1.1\r\n
//! Host: localhost:8080\r\n
//! Connection: Keep-Alive\r\n
//! \r\n
//! ```
//!
//! Los nombres de headers se normalizan a minúsculas al parsear, de modo
//! que `request.header("if-modified-since")` funciona sin importar cómo
//! los escribió el cliente.

use std::collections::HashMap;
use std::io::{BufRead, ErrorKind};

/// Resultado fallido al leer un request del stream
///
/// Clasifica el fallo para que el handler decida qué respuesta enviar
/// (400, 408) o si debe terminar en silencio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadError {
    /// Request malformado (línea de request o header inválido)
    BadRequest(String),

    /// No llegó un request completo dentro del timeout de lectura
    Timeout,

    /// El cliente cerró la conexión limpiamente antes de enviar nada
    Closed,

    /// Cualquier otro fallo de I/O durante la lectura
    Other(String),
}

impl std::fmt::Display for ReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadError::BadRequest(reason) => write!(f, "Bad request: {}", reason),
            ReadError::Timeout => write!(f, "Read timed out"),
            ReadError::Closed => write!(f, "Connection closed by peer"),
            ReadError::Other(reason) => write!(f, "Read failed: {}", reason),
        }
    }
}

impl std::error::Error for ReadError {}

/// Representa un request HTTP parseado
#[derive(Debug, Clone)]
pub struct Request {
    /// Método HTTP tal como llegó (ej: "GET")
    method: String,

    /// URI de la petición (ej: "/index.html")
    uri: String,

    /// Versión HTTP (ej: "HTTP/1.1")
    version: String,

    /// Headers HTTP con nombres en minúsculas
    headers: HashMap<String, String>,
}

impl Request {
    /// Lee exactamente un request HTTP desde el stream
    ///
    /// Bloquea hasta recibir la request line y todos los headers (hasta
    /// la línea vacía). El timeout lo impone el socket subyacente vía
    /// `set_read_timeout`; aquí solo se clasifica el error resultante.
    ///
    /// # Retorna
    ///
    /// * `Ok(Request)` - Request leído y parseado
    /// * `Err(ReadError)` - Fallo clasificado (ver [`ReadError`])
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use std::io::Cursor;
    /// use file_server::http::Request;
    ///
    /// let mut stream = Cursor::new(b"GET /index.html HTTP/1.1\r\n\r\n".to_vec());
    /// let request = Request::read(&mut stream).unwrap();
    ///
    /// assert_eq!(request.method(), "GET");
    /// assert_eq!(request.uri(), "/index.html");
    /// ```
    pub fn read<R: BufRead>(reader: &mut R) -> Result<Self, ReadError> {
        // 1. Leer la request line
        let request_line = Self::read_line(reader)?;
        if request_line.is_empty() {
            // El peer cerró sin enviar nada
            return Err(ReadError::Closed);
        }

        let (method, uri, version) = Self::parse_request_line(&request_line)?;

        // 2. Leer headers hasta la línea vacía
        let headers = Self::read_headers(reader)?;

        Ok(Request {
            method,
            uri,
            version,
            headers,
        })
    }

    /// Lee una línea terminada en CRLF y la retorna sin el terminador
    ///
    /// Retorna cadena vacía si el stream llegó a EOF sin datos.
    fn read_line<R: BufRead>(reader: &mut R) -> Result<String, ReadError> {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(_) => Ok(line.trim_end_matches(|c| c == '\r' || c == '\n').to_string()),
            Err(e) => Err(Self::classify_io_error(e)),
        }
    }

    /// Traduce errores de I/O a la taxonomía de [`ReadError`]
    fn classify_io_error(e: std::io::Error) -> ReadError {
        match e.kind() {
            // set_read_timeout produce WouldBlock en Unix y TimedOut en Windows
            ErrorKind::WouldBlock | ErrorKind::TimedOut => ReadError::Timeout,
            ErrorKind::UnexpectedEof => ReadError::Closed,
            ErrorKind::InvalidData => ReadError::BadRequest("non UTF-8 bytes".to_string()),
            _ => ReadError::Other(e.to_string()),
        }
    }

    /// Parsea la request line: `METHOD URI VERSION`
    fn parse_request_line(line: &str) -> Result<(String, String, String), ReadError> {
        let parts: Vec<&str> = line.split_whitespace().collect();

        // Debe tener exactamente 3 partes: METHOD URI VERSION
        if parts.len() != 3 {
            return Err(ReadError::BadRequest(format!(
                "invalid request line: {}",
                line
            )));
        }

        Ok((
            parts[0].to_string(),
            parts[1].to_string(),
            parts[2].to_string(),
        ))
    }

    /// Lee y parsea los headers hasta encontrar la línea vacía
    ///
    /// Cada header tiene formato `Name: Value`; el nombre se guarda en
    /// minúsculas.
    fn read_headers<R: BufRead>(reader: &mut R) -> Result<HashMap<String, String>, ReadError> {
        let mut headers = HashMap::new();

        loop {
            let line = Self::read_line(reader)?;

            // La línea vacía marca el fin de los headers
            if line.is_empty() {
                break;
            }

            if let Some(colon_pos) = line.find(':') {
                let name = line[..colon_pos].trim().to_ascii_lowercase();
                let value = line[colon_pos + 1..].trim().to_string();
                headers.insert(name, value);
            } else {
                // Header sin ':' es inválido
                return Err(ReadError::BadRequest(format!("invalid header: {}", line)));
            }
        }

        Ok(headers)
    }

    // === Métodos públicos para acceder a los campos ===

    /// Obtiene el método HTTP del request (token sin interpretar)
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Obtiene el URI del request
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Obtiene la versión HTTP
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Obtiene todos los headers (nombres en minúsculas)
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Obtiene un header específico (el nombre se busca en minúsculas)
    ///
    /// # Ejemplo
    /// ```
    /// use std::io::Cursor;
    /// use file_server::http::Request;
    ///
    /// let raw = b"GET / HTTP/1.1\r\nConnection: Keep-Alive\r\n\r\n".to_vec();
    /// let request = Request::read(&mut Cursor::new(raw)).unwrap();
    ///
    /// assert_eq!(request.header("connection"), Some("Keep-Alive"));
    /// assert_eq!(request.header("missing"), None);
    /// ```
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(|s| s.as_str())
    }
}
